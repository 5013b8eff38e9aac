//! Matching environment variable names against path templates.
//!
//! A variable matches a template when, after the prefix is stripped, every
//! template character lines up with the upper-cased name:
//!
//! - a literal character matches its upper-case form, and `.` matches `_`
//! - `*` consumes any run of characters up to the next `_`
//! - `#` consumes a run of decimal digits up to the next `_`
//!
//! ```text
//! APP_MAP_ONE_FLOAT=4.5   + map.*.float    -> map.one.float = 4.5
//! APP_SLICE_10_FLOAT=1    + slice.#.float  -> slice.10.float = 1
//! ```

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::walker::{MAP_WILDCARD, PathTemplate, SEQ_WILDCARD};

/// Canonical dotted paths mapped to raw values, in lexicographic path order.
pub type Assignments = BTreeMap<String, String>;

/// Separator between the prefix and the path in a variable name.
const SEPARATOR: char = '_';

/// Resolves `NAME=VALUE` entries starting with `prefix` into canonical path
/// assignments.
///
/// Entries without `=`, with an empty name or value, without the prefix, or
/// matching no template are dropped. When several templates produce the same
/// canonical path, the last template in `templates` wins.
pub fn resolve<I>(env: I, prefix: &str, templates: &[PathTemplate]) -> Assignments
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let prefix = format!(
        "{}{SEPARATOR}",
        prefix.trim_end_matches(SEPARATOR).to_uppercase()
    );
    let rendered: Vec<String> = templates.iter().map(ToString::to_string).collect();
    let mut assignments = Assignments::new();

    for entry in env {
        let Some((name, value)) = entry.as_ref().split_once('=') else {
            continue;
        };
        if name.is_empty() || value.is_empty() {
            continue;
        }
        let Some(key) = name.strip_prefix(&prefix) else {
            continue;
        };
        if key.is_empty() {
            continue;
        }

        for template in &rendered {
            if let Some(path) = compare(key, template) {
                trace!(variable = name, template = %template, path = %path, "Matched environment variable");
                assignments.insert(path, value.to_string());
            }
        }
    }

    debug!(
        prefix = %prefix,
        templates = templates.len(),
        assignments = assignments.len(),
        "Resolved environment overrides"
    );
    assignments
}

/// Compares a prefix-stripped variable name with a rendered template.
///
/// Returns the canonical path on a match: literal characters as written in
/// the template, wildcard characters lower-cased.
pub fn compare(env_key: &str, template: &str) -> Option<String> {
    let env: Vec<char> = env_key.chars().collect();
    let pattern: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(env_key.len());
    let (mut i, mut j) = (0, 0);

    while i < env.len() && j < pattern.len() {
        let (e, p) = (env[i], pattern[j]);

        if e == p.to_ascii_uppercase() || (e == SEPARATOR && p == '.') {
            out.push(p);
            i += 1;
            j += 1;
            continue;
        }

        match p {
            MAP_WILDCARD => {
                if e == SEPARATOR {
                    j += 1;
                } else {
                    out.push(e.to_ascii_lowercase());
                    i += 1;
                }
            }
            SEQ_WILDCARD => {
                if e == SEPARATOR {
                    j += 1;
                } else if e.is_ascii_digit() {
                    out.push(e);
                    i += 1;
                } else {
                    return None;
                }
            }
            _ => return None,
        }
    }

    let env_done = i == env.len();
    // A trailing `*` may still be open when the name runs out.
    let template_done =
        j == pattern.len() || (j + 1 == pattern.len() && pattern[j] == MAP_WILDCARD);

    (env_done && template_done).then_some(out)
}
