//! Full-file tokenization front ends.
//!
//! The tree-sitter front end parses the whole translation unit with the C++
//! grammar and reads the leaves back as tokens. Comments are extras in the
//! grammar, so they survive even inside regions tree-sitter fails to parse.

use clap::ValueEnum;
use tree_sitter::{Node, Parser};

use crate::error::{CocodeError, Result};
use crate::lexer::{CppLexer, LangStandard, Tokenizer};
use crate::models::{Location, Token, TokenKind};

/// Which tokenizer performs the full-file pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Frontend {
    #[default]
    TreeSitter,
    Native,
}

impl Frontend {
    pub fn tokenizer(self, standard: LangStandard) -> Result<Box<dyn Tokenizer>> {
        let tokenizer: Box<dyn Tokenizer> = match self {
            Frontend::TreeSitter => Box::new(TreeSitterTokenizer::new(standard)?),
            Frontend::Native => Box::new(CppLexer::new(standard)),
        };
        Ok(tokenizer)
    }
}

/// Nodes taken as a single literal token instead of descending into them.
static LITERAL_NODES: &[&str] = &[
    "number_literal",
    "string_literal",
    "char_literal",
    "raw_string_literal",
    "user_defined_literal",
    "system_lib_string",
];

static KEYWORD_NODES: &[&str] = &["primitive_type", "true", "false", "null", "nullptr", "this"];

/// Opaque directive text (`#define` bodies, `#pragma` and `#error` arguments).
/// The grammar folds a trailing `//` comment into it.
const PREPROC_ARG: &str = "preproc_arg";

pub struct TreeSitterTokenizer {
    parser: Parser,
    /// Splits `preproc_arg` leaves back into tokens.
    lexer: CppLexer,
}

impl TreeSitterTokenizer {
    pub fn new(standard: LangStandard) -> Result<Self> {
        let mut parser = Parser::new();
        let lang = tree_sitter_cpp::LANGUAGE;
        parser
            .set_language(&lang.into())
            .map_err(|e| CocodeError::Language(e.to_string()))?;
        Ok(Self {
            parser,
            lexer: CppLexer::new(standard),
        })
    }

    /// Re-lex a directive argument, moving token positions from the
    /// argument's own coordinates to the file's.
    fn split_preproc_arg<'src>(
        &self,
        node: &Node,
        source: &'src [u8],
        tokens: &mut Vec<Token<'src>>,
    ) {
        let start = node.start_position();
        for token in self.lexer.lex(&source[node.byte_range()]) {
            let location = if token.location.line == 1 {
                Location::new(start.row + 1, start.column + token.location.column)
            } else {
                Location::new(start.row + token.location.line, token.location.column)
            };
            tokens.push(Token { location, ..token });
        }
    }
}

impl Tokenizer for TreeSitterTokenizer {
    fn tokenize<'src>(&mut self, source: &'src [u8]) -> Result<Vec<Token<'src>>> {
        let tree = self.parser.parse(source, None).ok_or(CocodeError::ParseFailed)?;
        let mut tokens = Vec::new();
        let mut cursor = tree.walk();

        // Pre-order walk over the leaves
        loop {
            let node = cursor.node();
            let atomic = node.child_count() == 0 || LITERAL_NODES.contains(&node.kind());
            if atomic {
                if node.kind() == PREPROC_ARG {
                    self.split_preproc_arg(&node, source, &mut tokens);
                // MISSING nodes are zero-width insertions made during error recovery
                } else if !node.is_missing() && node.start_byte() < node.end_byte() {
                    tokens.push(Token {
                        kind: leaf_kind(&node),
                        spelling: &source[node.byte_range()],
                        location: Location::new(
                            node.start_position().row + 1,
                            node.start_position().column + 1,
                        ),
                    });
                }
            } else if cursor.goto_first_child() {
                continue;
            }

            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return Ok(tokens);
                }
            }
        }
    }
}

fn leaf_kind(node: &Node) -> TokenKind {
    let kind = node.kind();
    if kind == "comment" {
        return TokenKind::Comment;
    }
    if LITERAL_NODES.contains(&kind) {
        return TokenKind::Literal;
    }
    if node.is_named() && kind.ends_with("identifier") {
        return TokenKind::Identifier;
    }
    if KEYWORD_NODES.contains(&kind) {
        return TokenKind::Keyword;
    }
    if !node.is_named() {
        let word = kind
            .bytes()
            .next()
            .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_' || b == b'#');
        return if word { TokenKind::Keyword } else { TokenKind::Punctuation };
    }
    TokenKind::Other
}
