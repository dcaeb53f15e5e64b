/// Reverses the escapes the profile writer puts into key segments.
///
/// Replacements run in a fixed order and `\\` goes last, so a literal
/// backslash is never consumed as the start of another escape.
pub fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }
    raw.replace("\\ ", " ")
        .replace("\\:", ":")
        .replace("\\=", "=")
        .replace("\\\\", "\\")
}
