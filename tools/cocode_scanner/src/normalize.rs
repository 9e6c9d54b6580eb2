/// Strip comment decoration before re-lexing a comment body.
///
/// Line comments lose every leading `/`; block comments lose every leading
/// `/` or `*` and every trailing `*` or `/`. Whole runs are stripped, not just
/// the two-character markers. Comments mentioning "copyright" (any case) are
/// returned untouched.
pub fn normalize_comment(spelling: &str) -> &str {
    if spelling.to_ascii_lowercase().contains("copyright") {
        return spelling;
    }

    if spelling.starts_with("//") {
        spelling.trim_start_matches('/')
    } else if spelling.starts_with("/*") {
        spelling
            .trim_start_matches(&['/', '*'][..])
            .trim_end_matches(&['*', '/'][..])
    } else {
        spelling
    }
}
