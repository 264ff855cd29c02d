use robotcode_text::Range;

use crate::token::{Token, TokenKind};

/// A node of the parsed suite tree.
///
/// Blocks (`File`, `TestCase`, `Keyword`) own header tokens plus child
/// nodes; statements own a flat token list. Only the variants the semantic
/// layers dispatch on are modeled; everything else a suite may contain is
/// irrelevant to keyword resolution and never reaches the analyzer.
#[derive(Debug, Clone)]
pub enum Node {
    File(File),
    TestCase(TestCase),
    Keyword(Keyword),
    KeywordCall(KeywordCall),
    Fixture(Fixture),
    Template(Template),
    TestTemplate(TestTemplate),
    LibraryImport(LibraryImport),
    ResourceImport(ResourceImport),
    Arguments(Arguments),
}

impl Node {
    pub fn children(&self) -> &[Node] {
        match self {
            Node::File(n) => &n.body,
            Node::TestCase(n) => &n.body,
            Node::Keyword(n) => &n.body,
            _ => &[],
        }
    }

    /// The node's own tokens: header tokens for blocks, all tokens for
    /// statements.
    pub fn tokens(&self) -> &[Token] {
        match self {
            Node::File(_) => &[],
            Node::TestCase(n) => &n.header,
            Node::Keyword(n) => &n.header,
            Node::KeywordCall(n) => &n.tokens,
            Node::Fixture(n) => &n.tokens,
            Node::Template(n) => &n.tokens,
            Node::TestTemplate(n) => &n.tokens,
            Node::LibraryImport(n) => &n.tokens,
            Node::ResourceImport(n) => &n.tokens,
            Node::Arguments(n) => &n.tokens,
        }
    }

    /// The union of every token range this node transitively exposes.
    pub fn range(&self) -> Range {
        let mut ranges = self
            .tokens()
            .iter()
            .map(Token::range)
            .chain(self.children().iter().map(Node::range));
        match ranges.next() {
            Some(first) => ranges.fold(first, Range::union),
            None => Range::zero(),
        }
    }

    /// Union of a statement's own token ranges.
    pub(crate) fn tokens_range(tokens: &[Token]) -> Range {
        let mut ranges = tokens.iter().map(Token::range);
        match ranges.next() {
            Some(first) => ranges.fold(first, Range::union),
            None => Range::zero(),
        }
    }

    pub fn get_token(&self, kind: TokenKind) -> Option<&Token> {
        self.tokens().iter().find(|token| token.kind == kind)
    }

    pub fn get_tokens(&self, kind: TokenKind) -> impl Iterator<Item = &Token> {
        self.tokens().iter().filter(move |token| token.kind == kind)
    }
}

/// One parsed `.robot` or `.resource` file.
#[derive(Debug, Clone, Default)]
pub struct File {
    pub body: Vec<Node>,
}

impl File {
    pub fn new(body: Vec<Node>) -> Self {
        Self { body }
    }
}

/// A test case block: the header line plus its statements.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub header: Vec<Token>,
    pub body: Vec<Node>,
}

impl TestCase {
    pub fn new(header: Vec<Token>, body: Vec<Node>) -> Self {
        Self { header, body }
    }

    pub fn name_token(&self) -> Option<&Token> {
        self.header
            .iter()
            .find(|token| token.kind == TokenKind::TestCaseName)
    }

    pub fn name(&self) -> &str {
        self.name_token().map_or("", |token| token.value.as_str())
    }

    /// The union of the header token ranges and every child range.
    pub fn range(&self) -> Range {
        self.body
            .iter()
            .map(Node::range)
            .fold(Node::tokens_range(&self.header), Range::union)
    }
}

/// A user keyword block: the header line plus its statements.
#[derive(Debug, Clone)]
pub struct Keyword {
    pub header: Vec<Token>,
    pub body: Vec<Node>,
}

impl Keyword {
    pub fn new(header: Vec<Token>, body: Vec<Node>) -> Self {
        Self { header, body }
    }

    pub fn name_token(&self) -> Option<&Token> {
        self.header
            .iter()
            .find(|token| token.kind == TokenKind::KeywordName)
    }

    pub fn name(&self) -> &str {
        self.name_token().map_or("", |token| token.value.as_str())
    }

    pub fn range(&self) -> Range {
        self.body
            .iter()
            .map(Node::range)
            .fold(Node::tokens_range(&self.header), Range::union)
    }
}

/// A keyword invocation statement, optionally with assignment targets.
#[derive(Debug, Clone)]
pub struct KeywordCall {
    pub tokens: Vec<Token>,
}

impl KeywordCall {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// The `${var} =` assignment tokens on the left-hand side.
    pub fn assign(&self) -> impl Iterator<Item = &Token> {
        self.tokens
            .iter()
            .filter(|token| token.kind == TokenKind::Assign)
    }

    pub fn keyword_token(&self) -> Option<&Token> {
        self.tokens
            .iter()
            .find(|token| token.kind == TokenKind::Keyword)
    }

    pub fn keyword_name(&self) -> Option<&str> {
        self.keyword_token().map(|token| token.value.as_str())
    }

    pub fn argument_tokens(&self) -> Vec<&Token> {
        self.tokens
            .iter()
            .filter(|token| token.kind == TokenKind::Argument)
            .collect()
    }

    pub fn range(&self) -> Range {
        Node::tokens_range(&self.tokens)
    }
}

/// A `[Setup]`/`[Teardown]`/`Suite Setup`-style fixture statement.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub tokens: Vec<Token>,
}

impl Fixture {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn name_token(&self) -> Option<&Token> {
        self.tokens.iter().find(|token| token.kind == TokenKind::Name)
    }

    pub fn name(&self) -> Option<&str> {
        self.name_token().map(|token| token.value.as_str())
    }

    pub fn argument_tokens(&self) -> Vec<&Token> {
        self.tokens
            .iter()
            .filter(|token| token.kind == TokenKind::Argument)
            .collect()
    }
}

/// A `[Template]` setting naming the template keyword.
#[derive(Debug, Clone)]
pub struct Template {
    pub tokens: Vec<Token>,
}

impl Template {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn name_token(&self) -> Option<&Token> {
        self.tokens.iter().find(|token| token.kind == TokenKind::Name)
    }

    pub fn value(&self) -> Option<&str> {
        self.name_token().map(|token| token.value.as_str())
    }
}

/// A `Test Template` setting in the settings section.
#[derive(Debug, Clone)]
pub struct TestTemplate {
    pub tokens: Vec<Token>,
}

impl TestTemplate {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn name_token(&self) -> Option<&Token> {
        self.tokens.iter().find(|token| token.kind == TokenKind::Name)
    }

    pub fn value(&self) -> Option<&str> {
        self.name_token().map(|token| token.value.as_str())
    }
}

/// A `Library` import statement, optionally aliased with `AS`.
#[derive(Debug, Clone)]
pub struct LibraryImport {
    pub tokens: Vec<Token>,
    pub alias: Option<String>,
}

impl LibraryImport {
    pub fn new(tokens: Vec<Token>, alias: Option<String>) -> Self {
        Self { tokens, alias }
    }

    pub fn name_token(&self) -> Option<&Token> {
        self.tokens.iter().find(|token| token.kind == TokenKind::Name)
    }

    pub fn name(&self) -> Option<&str> {
        self.name_token().map(|token| token.value.as_str())
    }

    pub fn args(&self) -> Vec<String> {
        self.tokens
            .iter()
            .filter(|token| token.kind == TokenKind::Argument)
            .map(|token| token.value.clone())
            .collect()
    }
}

/// A `Resource` import statement.
#[derive(Debug, Clone)]
pub struct ResourceImport {
    pub tokens: Vec<Token>,
}

impl ResourceImport {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn name_token(&self) -> Option<&Token> {
        self.tokens.iter().find(|token| token.kind == TokenKind::Name)
    }

    pub fn name(&self) -> Option<&str> {
        self.name_token().map(|token| token.value.as_str())
    }
}

/// An `[Arguments]` setting inside a keyword body.
#[derive(Debug, Clone)]
pub struct Arguments {
    pub tokens: Vec<Token>,
}

impl Arguments {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn values(&self) -> Vec<&Token> {
        self.tokens
            .iter()
            .filter(|token| token.kind == TokenKind::Argument)
            .collect()
    }
}
