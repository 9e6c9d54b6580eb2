use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::classify::classify_comment;
use crate::error::{CocodeError, Result};
use crate::lexer::{LangStandard, Tokenizer};
use crate::models::{FileScan, FlaggedComment, TokenKind, Verdict};

pub const DEFAULT_EXTENSIONS: &str = "cpp,hpp,cc,h,cxx,c";

/// Scan the bytes of one C/C++ file for commented-out code.
///
/// `frontend` performs the full-file pass; each comment it yields is then
/// classified on its own. Reported locations are the comment's location in
/// the file, never a location from re-lexing the body. A comment whose bytes
/// are not valid UTF-8 is skipped without affecting the rest of the file.
pub fn scan_source<T: Tokenizer + ?Sized>(
    frontend: &mut T,
    source: &[u8],
    standard: LangStandard,
) -> Result<Vec<FlaggedComment>> {
    let tokens = frontend.tokenize(source)?;
    let mut flagged = Vec::new();

    for token in tokens.iter().filter(|t| t.kind == TokenKind::Comment) {
        let loc = token.location;
        let spelling = match token.text() {
            Ok(s) => s,
            Err(err) => {
                debug!(line = loc.line, column = loc.column, %err, "skipping undecodable comment");
                continue;
            }
        };

        match classify_comment(spelling, standard) {
            Verdict::CodeLike => {
                debug!(line = loc.line, column = loc.column, comment = spelling, "commented-out code");
                flagged.push(FlaggedComment {
                    location: loc,
                    text: spelling.to_string(),
                });
            }
            verdict => {
                debug!(line = loc.line, column = loc.column, ?verdict, "comment kept");
            }
        }
    }

    Ok(flagged)
}

/// Read and scan a single file. The file is identified by `path` as given.
pub fn scan_file<T: Tokenizer + ?Sized>(
    frontend: &mut T,
    path: &Path,
    standard: LangStandard,
) -> Result<FileScan> {
    let source = fs::read(path).map_err(|e| CocodeError::io(path, e))?;
    let comments = scan_source(frontend, &source, standard)?;
    Ok(FileScan {
        file: path.to_path_buf(),
        comments,
    })
}

/// Recursively collect files under `dir` whose extension is in `extensions`
/// (comma separated, case-insensitive), sorted by path.
pub fn collect_source_files(dir: &Path, extensions: &str) -> Vec<PathBuf> {
    let exts: Vec<&str> = extensions
        .split(',')
        .map(|e| e.trim().trim_start_matches('.'))
        .filter(|e| !e.is_empty())
        .collect();
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() {
            if let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) {
                if exts.iter().any(|&e2| e2.eq_ignore_ascii_case(ext)) {
                    files.push(entry.into_path());
                }
            }
        }
    }

    files.sort();
    files
}

/// Scan every source file under `root`, one after another.
///
/// Files that cannot be read or parsed are logged and skipped. Files are
/// identified by their walked path (`root` joined with the relative path).
pub fn scan_dir<T: Tokenizer + ?Sized>(
    frontend: &mut T,
    root: &Path,
    extensions: &str,
    standard: LangStandard,
) -> Vec<FileScan> {
    let files = collect_source_files(root, extensions);
    debug!(root = %root.display(), files = files.len(), "collected source files");

    let mut scans = Vec::with_capacity(files.len());
    for path in files {
        match scan_file(&mut *frontend, &path, standard) {
            Ok(scan) => scans.push(scan),
            Err(err) => warn!("skipping {}: {}", path.display(), err),
        }
    }
    scans
}
