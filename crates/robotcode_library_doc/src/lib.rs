//! Descriptors for resolvable keywords and the libraries that provide them.
//!
//! A [`KeywordDoc`] is the canonical, immutable description the import
//! resolver produces for every keyword a namespace can reach: its origin,
//! argument specification, deprecation and error state, embedded-argument
//! matcher, and its classification into the BuiltIn run-keyword family.

mod arguments;
mod embedded;
mod run_keywords;

pub use arguments::{ArgumentError, ArgumentSpec, Parameter};
pub use embedded::{is_embedded_keyword, EmbeddedArguments};
pub use run_keywords::RunKeywordFamily;

use std::path::PathBuf;

use robotcode_text::{Position, Range};

/// Name of the implicitly imported standard library.
pub const BUILTIN_LIBRARY_NAME: &str = "BuiltIn";

/// An error attached to a keyword or library definition at import time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordError {
    pub source: Option<PathBuf>,
    pub line_no: Option<i32>,
    pub message: String,
}

/// The canonical descriptor of one resolvable keyword.
#[derive(Debug, Clone)]
pub struct KeywordDoc {
    pub name: String,
    pub libname: String,
    pub source: Option<PathBuf>,
    pub line_no: i32,
    pub arguments: Option<ArgumentSpec>,
    pub is_deprecated: bool,
    pub deprecated_message: Option<String>,
    pub is_error_handler: bool,
    pub error_handler_message: Option<String>,
    pub errors: Vec<KeywordError>,
    embedded: Option<EmbeddedArguments>,
    run_keyword_family: RunKeywordFamily,
}

impl KeywordDoc {
    pub fn new(name: impl Into<String>, libname: impl Into<String>) -> Self {
        let name = name.into();
        let libname = libname.into();
        let embedded = EmbeddedArguments::parse(&name);
        let run_keyword_family = RunKeywordFamily::classify(&libname, &name);
        Self {
            name,
            libname,
            source: None,
            line_no: -1,
            arguments: None,
            is_deprecated: false,
            deprecated_message: None,
            is_error_handler: false,
            error_handler_message: None,
            errors: Vec::new(),
            embedded,
            run_keyword_family,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>, line_no: i32) -> Self {
        self.source = Some(source.into());
        self.line_no = line_no;
        self
    }

    pub fn with_arguments(mut self, mut arguments: ArgumentSpec) -> Self {
        if arguments.name.is_none() {
            arguments.name = Some(self.name.clone());
        }
        self.arguments = Some(arguments);
        self
    }

    pub fn deprecated(mut self, message: Option<&str>) -> Self {
        self.is_deprecated = true;
        self.deprecated_message = message.map(str::to_string);
        self
    }

    pub fn error_handler(mut self, message: impl Into<String>) -> Self {
        self.is_error_handler = true;
        self.error_handler_message = Some(message.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<KeywordError>) -> Self {
        self.errors = errors;
        self
    }

    /// The embedded-argument matcher, present iff the declared name
    /// contains `${...}` placeholders.
    pub fn embedded(&self) -> Option<&EmbeddedArguments> {
        self.embedded.as_ref()
    }

    pub fn run_keyword_family(&self) -> RunKeywordFamily {
        self.run_keyword_family
    }

    pub fn is_any_run_keyword(&self) -> bool {
        self.run_keyword_family != RunKeywordFamily::None
    }

    /// How many leading arguments the keyword itself consumes before any
    /// nested keyword call starts. `None` for ordinary keywords.
    pub fn args_to_process(&self) -> Option<u32> {
        self.run_keyword_family.args_to_process()
    }

    /// Whether `name` invokes this keyword: exact case-insensitive match,
    /// or an anchored embedded-argument match.
    pub fn matches(&self, name: &str) -> bool {
        match &self.embedded {
            Some(embedded) => embedded.matches(name),
            None => self.name.eq_ignore_ascii_case(name),
        }
    }

    /// The declaration position inside [`Self::source`].
    pub fn range(&self) -> Range {
        #[allow(clippy::cast_sign_loss)]
        let line = if self.line_no > 0 {
            self.line_no as u32 - 1
        } else {
            0
        };
        Range::new(Position::new(line, 0), Position::new(line, 0))
    }
}

/// Documentation of one imported library or resource file.
#[derive(Debug, Clone, Default)]
pub struct LibraryDoc {
    pub name: String,
    pub source: Option<PathBuf>,
    pub line_no: i32,
    pub keywords: Vec<KeywordDoc>,
    /// Resource paths this file imports in turn (resource files only).
    pub resource_imports: Vec<String>,
    pub errors: Vec<KeywordError>,
}

impl LibraryDoc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            line_no: -1,
            ..Self::default()
        }
    }

    pub fn range(&self) -> Range {
        #[allow(clippy::cast_sign_loss)]
        let line = if self.line_no > 0 {
            self.line_no as u32 - 1
        } else {
            0
        };
        Range::new(Position::new(line, 0), Position::new(line, 0))
    }
}
