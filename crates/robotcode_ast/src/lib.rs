//! The token and node model produced by the Robot Framework surface parser.
//!
//! This crate is the contract between the external tokenizer/AST builder and
//! the semantic layers above it: statement and block nodes as a tagged
//! [`Node`] enum, [`Token`]s with source positions, range helpers, the
//! variable-token classification that gates semantic resolution, Robot
//! Framework escape handling, and a fallible [`Visitor`] for traversals.

mod escaping;
mod nodes;
mod token;
mod visitor;

pub use escaping::unescape;
pub use nodes::{
    Arguments, File, Fixture, Keyword, KeywordCall, LibraryImport, Node, ResourceImport, Template,
    TestCase, TestTemplate,
};
pub use token::{is_not_variable_token, is_variable_token, Token, TokenKind};
pub use visitor::{walk, walk_node, Visitor, Walk};

use robotcode_text::Range;

/// Range of a single token, from its stored position and value length.
pub fn range_from_token(token: &Token) -> Range {
    token.range()
}

/// Declared range of a node: the union of every token range it exposes.
pub fn range_from_node(node: &Node) -> Range {
    node.range()
}

/// Prefer the token's range when present, else fall back to the node's.
pub fn range_from_node_or_token(node: &Node, token: Option<&Token>) -> Range {
    match token {
        Some(token) => token.range(),
        None => node.range(),
    }
}
