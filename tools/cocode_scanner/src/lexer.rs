//! Native C/C++ lexer.
//!
//! A hand-written O(n) byte scanner producing clang-style coarse tokens:
//! identifiers, keywords, literals, punctuation and comments. It never fails;
//! bytes it cannot make sense of become one-byte punctuation tokens, and an
//! unterminated quote becomes a single punctuation token running to the end of
//! the line, as clang reports an unknown token.
//!
//! Handles:
//! - `//` line comments, including backslash-newline continuation
//! - `/* */` block comments (unterminated ones run to end of input)
//! - `L`, `u`, `U`, `u8` encoding prefixes and `R"delim(...)delim"` raw strings
//! - pp-numbers such as `0x1F`, `1e+5`, `1'000`
//! - longest-match punctuators

use clap::ValueEnum;

use crate::error::Result;
use crate::models::{Location, Token, TokenKind};

/// Anything that can split source bytes into tokens.
pub trait Tokenizer {
    fn tokenize<'src>(&mut self, source: &'src [u8]) -> Result<Vec<Token<'src>>>;
}

/// Language standard hint. Selects the reserved-word table and a few lexical
/// extensions (raw strings, digit separators, `<=>`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LangStandard {
    #[value(name = "c89")]
    C89,
    #[value(name = "c99")]
    C99,
    #[value(name = "c11")]
    C11,
    #[value(name = "c17")]
    C17,
    #[value(name = "c++98")]
    Cxx98,
    #[default]
    #[value(name = "c++11")]
    Cxx11,
    #[value(name = "c++14")]
    Cxx14,
    #[value(name = "c++17")]
    Cxx17,
    #[value(name = "c++20")]
    Cxx20,
}

static C89_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do",
    "double", "else", "enum", "extern", "float", "for", "goto", "if",
    "int", "long", "register", "return", "short", "signed", "sizeof",
    "static", "struct", "switch", "typedef", "union", "unsigned", "void",
    "volatile", "while",
];

static C99_KEYWORDS: &[&str] = &["inline", "restrict", "_Bool", "_Complex", "_Imaginary"];

static C11_KEYWORDS: &[&str] = &[
    "_Alignas", "_Alignof", "_Atomic", "_Generic", "_Noreturn", "_Static_assert",
    "_Thread_local",
];

static CXX98_KEYWORDS: &[&str] = &[
    "asm", "bool", "catch", "class", "const_cast", "delete", "dynamic_cast",
    "explicit", "export", "false", "friend", "inline", "mutable", "namespace",
    "new", "operator", "private", "protected", "public", "reinterpret_cast",
    "static_cast", "template", "this", "throw", "true", "try", "typeid",
    "typename", "using", "virtual", "wchar_t",
    // Alternative operator spellings
    "and", "and_eq", "bitand", "bitor", "compl", "not", "not_eq", "or",
    "or_eq", "xor", "xor_eq",
];

static CXX11_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "char16_t", "char32_t", "constexpr", "decltype",
    "noexcept", "nullptr", "static_assert", "thread_local",
];

static CXX20_KEYWORDS: &[&str] = &[
    "char8_t", "concept", "consteval", "constinit", "co_await", "co_return",
    "co_yield", "requires",
];

// Longest first.
static PUNCTUATORS: &[&str] = &[
    "<=>", "...", "<<=", ">>=", "->*",
    "::", "->", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||",
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "##", ".*",
];

impl LangStandard {
    pub fn is_keyword(self, word: &[u8]) -> bool {
        let Ok(word) = std::str::from_utf8(word) else {
            return false;
        };
        if C89_KEYWORDS.contains(&word) {
            return true;
        }
        match self {
            LangStandard::C89 => false,
            LangStandard::C99 => C99_KEYWORDS.contains(&word),
            LangStandard::C11 | LangStandard::C17 => {
                C99_KEYWORDS.contains(&word) || C11_KEYWORDS.contains(&word)
            }
            cxx => {
                CXX98_KEYWORDS.contains(&word)
                    || (cxx >= LangStandard::Cxx11 && CXX11_KEYWORDS.contains(&word))
                    || (cxx >= LangStandard::Cxx20 && CXX20_KEYWORDS.contains(&word))
            }
        }
    }

    fn raw_strings(self) -> bool {
        self >= LangStandard::Cxx11
    }

    fn literal_suffixes(self) -> bool {
        self >= LangStandard::Cxx11
    }

    fn digit_separators(self) -> bool {
        self >= LangStandard::Cxx14
    }

    fn spaceship(self) -> bool {
        self >= LangStandard::Cxx20
    }
}

/// Hand-written lexer. Cheap to create; holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct CppLexer {
    standard: LangStandard,
}

impl CppLexer {
    pub fn new(standard: LangStandard) -> Self {
        Self { standard }
    }

    pub fn lex<'src>(&self, source: &'src [u8]) -> Vec<Token<'src>> {
        let mut tokens = Vec::new();
        let len = source.len();
        let mut i = 0;
        let mut line = 1;
        let mut line_start = 0;

        while i < len {
            let b = source[i];

            if b == b'\n' {
                i += 1;
                line += 1;
                line_start = i;
                continue;
            }
            if is_space(b) {
                i += 1;
                continue;
            }
            // Line splice between tokens
            let splice = splice_len(source, i);
            if splice > 0 {
                i += splice;
                line += 1;
                line_start = i;
                continue;
            }

            let (kind, end) = self.next_token(source, i);
            tokens.push(Token {
                kind,
                spelling: &source[i..end],
                location: Location::new(line, i - line_start + 1),
            });

            // Multi-line tokens: block comments, raw strings, spliced lines
            for (offset, &c) in source[i..end].iter().enumerate() {
                if c == b'\n' {
                    line += 1;
                    line_start = i + offset + 1;
                }
            }
            i = end;
        }

        tokens
    }

    fn next_token(&self, src: &[u8], start: usize) -> (TokenKind, usize) {
        let b = src[start];
        let next = src.get(start + 1).copied();

        if b == b'/' && next == Some(b'/') {
            return (TokenKind::Comment, line_comment_end(src, start));
        }
        if b == b'/' && next == Some(b'*') {
            return (TokenKind::Comment, block_comment_end(src, start));
        }
        if let Some(found) = self.quoted(src, start) {
            return found;
        }
        if is_ident_start(b) {
            let end = scan_while(src, start + 1, is_ident_continue);
            let kind = if self.standard.is_keyword(&src[start..end]) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            return (kind, end);
        }
        if b.is_ascii_digit() || (b == b'.' && next.is_some_and(|c| c.is_ascii_digit())) {
            return (TokenKind::Literal, self.number_end(src, start));
        }

        (TokenKind::Punctuation, self.punctuator_end(src, start))
    }

    /// String or character literal at `start`, with an optional encoding prefix.
    fn quoted(&self, src: &[u8], start: usize) -> Option<(TokenKind, usize)> {
        let mut i = start;
        if src[i..].starts_with(b"u8") {
            i += 2;
        } else if matches!(src[i], b'u' | b'U' | b'L') {
            i += 1;
        }

        if self.standard.raw_strings() && src.get(i) == Some(&b'R') && src.get(i + 1) == Some(&b'"') {
            return Some(self.raw_string(src, i + 1));
        }
        match src.get(i) {
            Some(&quote @ (b'"' | b'\'')) => Some(self.quoted_literal(src, i, quote)),
            _ => None,
        }
    }

    fn quoted_literal(&self, src: &[u8], open: usize, quote: u8) -> (TokenKind, usize) {
        let mut i = open + 1;
        while i < src.len() {
            match src[i] {
                b'\\' => i += 2, // escaped char or line splice
                b'\n' | b'\r' => return (TokenKind::Punctuation, i),
                c if c == quote => return (TokenKind::Literal, self.suffix_end(src, i + 1)),
                _ => i += 1,
            }
        }
        (TokenKind::Punctuation, src.len())
    }

    fn raw_string(&self, src: &[u8], quote: usize) -> (TokenKind, usize) {
        let open = quote + 1;
        let paren = src[open..]
            .iter()
            .position(|&c| c == b'(')
            .map(|p| open + p)
            .filter(|&p| {
                p - open <= 16
                    && src[open..p]
                        .iter()
                        .all(|&c| !c.is_ascii_whitespace() && !matches!(c, b')' | b'\\' | b'"'))
            });
        let Some(paren) = paren else {
            return self.quoted_literal(src, quote, b'"');
        };

        let delimiter = &src[open..paren];
        let mut i = paren + 1;
        while i < src.len() {
            if src[i] == b')'
                && src[i + 1..].starts_with(delimiter)
                && src.get(i + 1 + delimiter.len()) == Some(&b'"')
            {
                return (TokenKind::Literal, self.suffix_end(src, i + 2 + delimiter.len()));
            }
            i += 1;
        }
        (TokenKind::Punctuation, src.len())
    }

    /// User-defined literal suffix (`"abc"s`, `'x'_c`).
    fn suffix_end(&self, src: &[u8], i: usize) -> usize {
        if self.standard.literal_suffixes() {
            scan_while(src, i, is_ident_continue)
        } else {
            i
        }
    }

    fn number_end(&self, src: &[u8], start: usize) -> usize {
        let mut i = start + 1;
        while i < src.len() {
            let c = src[i];
            let prev = src[i - 1];
            let more = c.is_ascii_alphanumeric()
                || c == b'_'
                || c == b'.'
                || (matches!(c, b'+' | b'-') && matches!(prev, b'e' | b'E' | b'p' | b'P'))
                || (c == b'\''
                    && self.standard.digit_separators()
                    && src.get(i + 1).is_some_and(|n| n.is_ascii_alphanumeric()));
            if !more {
                break;
            }
            i += 1;
        }
        i
    }

    fn punctuator_end(&self, src: &[u8], start: usize) -> usize {
        let rest = &src[start..];
        PUNCTUATORS
            .iter()
            .filter(|p| self.standard.spaceship() || **p != "<=>")
            .find(|p| rest.starts_with(p.as_bytes()))
            .map_or(start + 1, |p| start + p.len())
    }
}

impl Tokenizer for CppLexer {
    fn tokenize<'src>(&mut self, source: &'src [u8]) -> Result<Vec<Token<'src>>> {
        Ok(self.lex(source))
    }
}

fn line_comment_end(src: &[u8], start: usize) -> usize {
    let mut i = start + 2;
    while i < src.len() {
        match src[i] {
            b'\n' | b'\r' => break,
            b'\\' => i += splice_len(src, i).max(1),
            _ => i += 1,
        }
    }
    i
}

fn block_comment_end(src: &[u8], start: usize) -> usize {
    src[start + 2..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(src.len(), |p| start + 2 + p + 2)
}

/// Length of a backslash-newline sequence at `i`, 0 if there is none.
fn splice_len(src: &[u8], i: usize) -> usize {
    if src[i] != b'\\' {
        return 0;
    }
    match (src.get(i + 1), src.get(i + 2)) {
        (Some(b'\n'), _) => 2,
        (Some(b'\r'), Some(b'\n')) => 3,
        _ => 0,
    }
}

fn scan_while(src: &[u8], mut i: usize, pred: fn(u8) -> bool) -> usize {
    while i < src.len() && pred(src[i]) {
        i += 1;
    }
    i
}

#[inline(always)]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | 0x0b | 0x0c)
}

#[inline(always)]
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

#[inline(always)]
fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}
