/// Turn a human-readable permission name into an identifier the backend
/// schema accepts.
///
/// Lowercases, maps `-`, `.`, `:` and space to `_`, and spells `*` as
/// `all`. Total and idempotent.
pub fn normalize(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut out = String::with_capacity(lowered.len());

    for c in lowered.chars() {
        match c {
            '-' | '.' | ':' | ' ' => out.push('_'),
            '*' => out.push_str("all"),
            other => out.push(other),
        }
    }

    out
}
