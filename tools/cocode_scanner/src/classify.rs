//! Decide whether a comment body reads like prose or like disabled code.
//!
//! The heuristic is purely lexical. A body that re-lexes to a single bare
//! punctuation token (`;`, `}`) is code. Bodies of two tokens or fewer are too
//! short to judge. Otherwise three identifier-ish tokens in a row
//! ("word word word") mark prose, and anything without such a run is code.
//!
//! Known false positive: "for >32-bit machines" has no such run and is
//! reported as code.

use tracing::trace;

use crate::lexer::{CppLexer, LangStandard};
use crate::models::{TokenKind, Verdict};
use crate::normalize::normalize_comment;

/// Three consecutive token kinds.
pub type Trigram = (TokenKind, TokenKind, TokenKind);

/// Token patterns that indicate natural language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProseRule {
    /// identifier identifier identifier
    WordRun,
    /// identifier literal identifier, e.g. `it's a dog's life`
    WordLiteralWord,
}

/// Sliding windows of three kinds, left to right.
pub fn trigrams(kinds: &[TokenKind]) -> impl Iterator<Item = Trigram> + Clone + '_ {
    kinds.windows(3).map(|w| (w[0], w[1], w[2]))
}

pub fn prose_rule(trigram: Trigram) -> Option<ProseRule> {
    use TokenKind::{Identifier, Literal};
    match trigram {
        (Identifier, Identifier, Identifier) => Some(ProseRule::WordRun),
        (Identifier, Literal, Identifier) => Some(ProseRule::WordLiteralWord),
        _ => None,
    }
}

/// Classify the token kinds of a re-lexed comment body.
pub fn classify_kinds(kinds: &[TokenKind]) -> Verdict {
    match kinds {
        [TokenKind::Punctuation] => Verdict::CodeLike,
        _ if kinds.len() <= 2 => Verdict::Indeterminate,
        _ => match trigrams(kinds).find_map(prose_rule) {
            Some(rule) => {
                trace!(?rule, "prose pattern matched");
                Verdict::NaturalLanguage
            }
            None => Verdict::CodeLike,
        },
    }
}

/// Classify a raw comment spelling (markers included).
///
/// Non-ASCII comments are never judged. The body is re-lexed by a lexer that
/// lives only for this call.
pub fn classify_comment(spelling: &str, standard: LangStandard) -> Verdict {
    if !spelling.is_ascii() {
        return Verdict::Indeterminate;
    }

    let body = normalize_comment(spelling);
    let kinds: Vec<TokenKind> = {
        let lexer = CppLexer::new(standard);
        lexer.lex(body.as_bytes()).iter().map(|t| t.kind).collect()
    };
    classify_kinds(&kinds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn classify(spelling: &str) -> Verdict {
        classify_comment(spelling, LangStandard::Cxx11)
    }

    #[test]
    fn test_single_punctuation_is_code() {
        assert_eq!(classify_kinds(&[Punctuation]), Verdict::CodeLike);
        assert_eq!(classify("// ;"), Verdict::CodeLike);
        assert_eq!(classify("/* } */"), Verdict::CodeLike);
    }

    #[test]
    fn test_short_bodies_are_indeterminate() {
        assert_eq!(classify_kinds(&[]), Verdict::Indeterminate);
        assert_eq!(classify_kinds(&[Identifier]), Verdict::Indeterminate);
        assert_eq!(classify_kinds(&[Punctuation, Punctuation]), Verdict::Indeterminate);
        assert_eq!(classify("// TODO"), Verdict::Indeterminate);
        assert_eq!(classify("// foo();"), Verdict::CodeLike);
        assert_eq!(classify("// x;"), Verdict::Indeterminate);
        assert_eq!(classify("/**/"), Verdict::Indeterminate);
    }

    #[test]
    fn test_prose_windows() {
        assert_eq!(
            classify_kinds(&[Punctuation, Identifier, Identifier, Identifier]),
            Verdict::NaturalLanguage
        );
        assert_eq!(
            classify_kinds(&[Identifier, Literal, Identifier, Punctuation]),
            Verdict::NaturalLanguage
        );
        assert_eq!(
            classify_kinds(&[Identifier, Punctuation, Identifier, Literal]),
            Verdict::CodeLike
        );
    }

    #[test]
    fn test_prose_rule_names() {
        assert_eq!(prose_rule((Identifier, Identifier, Identifier)), Some(ProseRule::WordRun));
        assert_eq!(prose_rule((Identifier, Literal, Identifier)), Some(ProseRule::WordLiteralWord));
        assert_eq!(prose_rule((Literal, Identifier, Identifier)), None);
    }

    #[test]
    fn test_trigrams_are_restartable() {
        let kinds = [Keyword, Identifier, Punctuation, Literal];
        let windows = trigrams(&kinds);
        assert_eq!(windows.clone().count(), 2);
        assert_eq!(
            windows.collect::<Vec<_>>(),
            vec![(Keyword, Identifier, Punctuation), (Identifier, Punctuation, Literal)]
        );
    }

    #[test]
    fn test_documentation_is_prose() {
        assert_eq!(classify("// this is a test"), Verdict::NaturalLanguage);
        assert_eq!(classify("// This is documentation."), Verdict::NaturalLanguage);
        assert_eq!(classify("/* it's a dog's life */"), Verdict::NaturalLanguage);
    }

    #[test]
    fn test_code_is_flagged() {
        assert_eq!(classify("// int x = 5;"), Verdict::CodeLike);
        assert_eq!(classify("/* return 0; */"), Verdict::CodeLike);
        assert_eq!(classify("//printf(\"%d\\n\", x);"), Verdict::CodeLike);
        assert_eq!(classify("// #include <stdio.h>"), Verdict::CodeLike);
    }

    #[test]
    fn test_known_false_positive() {
        assert_eq!(classify("// for >32-bit machines"), Verdict::CodeLike);
    }

    #[test]
    fn test_non_ascii_is_never_flagged() {
        assert_eq!(classify("// int x = 5; \u{00e9}"), Verdict::Indeterminate);
        assert_eq!(classify("// \u{2013};"), Verdict::Indeterminate);
    }

    #[test]
    fn test_copyright_notice_is_not_judged() {
        // Decoration is kept, so the body re-lexes to a single comment token.
        assert_eq!(classify("// Copyright 2020 int x = 5;"), Verdict::Indeterminate);
    }
}
