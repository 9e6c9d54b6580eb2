use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{CocodeError, Result};

/// Delete every literal occurrence of each comment text from the file at
/// `path`, rewriting it in place. Returns the number of bytes removed.
///
/// Matching is purely textual: identical text elsewhere in the file, string
/// literals included, is removed as well. A line comment's trailing `\r` is
/// left in place so CRLF line endings survive.
pub fn remove_comments(path: &Path, comments: &[String]) -> Result<usize> {
    let original = fs::read_to_string(path).map_err(|e| CocodeError::io(path, e))?;

    let mut content = original.clone();
    for comment in comments.iter().map(|c| removal_text(c)).filter(|c| !c.is_empty()) {
        content = content.replace(comment, "");
    }

    let removed = original.len() - content.len();
    if removed > 0 {
        fs::write(path, &content).map_err(|e| CocodeError::io(path, e))?;
    }
    info!(file = %path.display(), comments = comments.len(), bytes = removed, "removed commented-out code");
    Ok(removed)
}

fn removal_text(comment: &str) -> &str {
    if comment.starts_with("//") {
        comment.trim_end_matches('\r')
    } else {
        comment
    }
}
