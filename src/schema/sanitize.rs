/// Reduce an arbitrary string to an identifier safe to use unquoted in SQL.
///
/// Every character outside `[a-zA-Z0-9_]` is replaced with `_` and the
/// result is lower-cased. Total and deterministic; applying it twice changes
/// nothing. An empty input stays empty, so callers must reject empty table
/// and column names themselves. Distinct inputs may collide on the same
/// output; collisions are not detected here.
pub fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
