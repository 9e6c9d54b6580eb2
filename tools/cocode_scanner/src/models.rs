use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::Utf8Error;

use serde::{Deserialize, Serialize};

/// Coarse lexical category of a token, in the spirit of libclang's token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Literal,
    Punctuation,
    Comment,
    Other,
}

/// 1-based line and byte column of a token start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A single token borrowed from the text it was lexed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    /// Raw bytes of the token, comment markers included.
    pub spelling: &'src [u8],
    pub location: Location,
}

impl<'src> Token<'src> {
    /// Decode the spelling. Fails when the source bytes are not valid UTF-8.
    pub fn text(&self) -> Result<&'src str, Utf8Error> {
        std::str::from_utf8(self.spelling)
    }
}

/// Outcome of classifying one comment body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    NaturalLanguage,
    CodeLike,
    /// Too short to judge, or excluded (non-ASCII content).
    Indeterminate,
}

/// A comment classified as code, with its position in the scanned file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedComment {
    pub location: Location,
    /// Original spelling, comment markers included.
    pub text: String,
}

/// Flagged comments of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileScan {
    pub file: PathBuf,
    pub comments: Vec<FlaggedComment>,
}

/// One line of the `--jsonl` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub file: String,
    pub line: usize,
    pub column: usize,
    /// Full original comment text
    pub text: String,
}

impl CommentRecord {
    pub fn from_scan(scan: &FileScan) -> impl Iterator<Item = CommentRecord> + '_ {
        let file = scan.file.to_string_lossy().to_string();
        scan.comments.iter().map(move |c| CommentRecord {
            file: file.clone(),
            line: c.location.line,
            column: c.location.column,
            text: c.text.clone(),
        })
    }
}

/// Flagged positions per source file, in discovery order within each file.
///
/// Files are kept sorted by path so that reports come out in a stable order.
/// Positions of a file are only ever appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionIndex {
    files: BTreeMap<PathBuf, Vec<Location>>,
}

impl PositionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, file: impl Into<PathBuf>, location: Location) {
        self.files.entry(file.into()).or_default().push(location);
    }

    /// Append every flagged comment of `scan`.
    pub fn record(&mut self, scan: &FileScan) {
        for comment in &scan.comments {
            self.push(scan.file.clone(), comment.location);
        }
    }

    pub fn from_scans<'a>(scans: impl IntoIterator<Item = &'a FileScan>) -> Self {
        let mut index = Self::new();
        for scan in scans {
            index.record(scan);
        }
        index
    }

    /// Rewrite file identities relative to `root`. Paths outside `root` are kept as-is.
    pub fn relative_to(self, root: &Path) -> Self {
        let mut index = Self::new();
        for (file, locations) in self.files {
            let key = file
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or(file);
            index.files.entry(key).or_default().extend(locations);
        }
        index
    }

    #[cfg(test)]
    pub fn get(&self, file: &Path) -> Option<&[Location]> {
        self.files.get(file).map(Vec::as_slice)
    }

    pub fn files(&self) -> impl Iterator<Item = (&Path, &[Location])> {
        self.files.iter().map(|(f, l)| (f.as_path(), l.as_slice()))
    }

    /// Every (file, position) pair, file by file.
    pub fn positions(&self) -> impl Iterator<Item = (&Path, Location)> {
        self.files()
            .flat_map(|(file, locations)| locations.iter().map(move |&l| (file, l)))
    }

    /// Total number of flagged positions.
    pub fn len(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
