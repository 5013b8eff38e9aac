//! Process environment snapshots.

/// Reads the process environment once and renders each entry as
/// `NAME=VALUE`.
///
/// Entries whose name or value is not valid Unicode are skipped.
pub fn snapshot() -> Vec<String> {
    std::env::vars_os()
        .filter_map(|(name, value)| {
            let name = name.into_string().ok()?;
            let value = value.into_string().ok()?;
            Some(format!("{name}={value}"))
        })
        .collect()
}

/// Renders name/value pairs as a listing accepted by [`resolve`](crate::resolve).
///
/// # Example
///
/// ```rust,ignore
/// let env = envoverlay::env::listing([("APP_PORT", "8080")]);
/// assert_eq!(env, vec!["APP_PORT=8080".to_string()]);
/// ```
pub fn listing<I, K, V>(pairs: I) -> Vec<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .into_iter()
        .map(|(name, value)| format!("{}={}", name.as_ref(), value.as_ref()))
        .collect()
}
