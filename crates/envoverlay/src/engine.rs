//! Overlay entry points tying the walker, matcher and merger together.

use tracing::debug;

use crate::env;
use crate::error::OverlayResult;
use crate::matcher::resolve;
use crate::merger::apply;
use crate::shape::Overlay;
use crate::walker::templates_for;

/// Overlays variables from `env` starting with `prefix` onto `target`.
///
/// `env` is a listing of `NAME=VALUE` entries, typically from
/// [`env::snapshot`].
pub fn overlay_from<T, I>(env: I, prefix: &str, target: &mut T) -> OverlayResult<()>
where
    T: Overlay,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let templates = templates_for::<T>()?;
    let assignments = resolve(env, prefix, &templates);

    debug!(
        prefix,
        templates = templates.len(),
        assignments = assignments.len(),
        config_type = std::any::type_name::<T>(),
        "Overlaying environment"
    );

    apply(&assignments, target)
}

/// Overlays the current process environment onto `target`.
pub fn overlay_env<T: Overlay>(prefix: &str, target: &mut T) -> OverlayResult<()> {
    overlay_from(env::snapshot(), prefix, target)
}
