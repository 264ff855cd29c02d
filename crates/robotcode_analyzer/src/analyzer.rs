use std::path::Path;

use url::Url;

use robotcode_ast::{
    is_not_variable_token, is_variable_token, unescape, walk_node, File, Fixture, Keyword,
    KeywordCall, Node, Template, TestCase, TestTemplate, Token, Visitor,
};
use robotcode_library_doc::{is_embedded_keyword, KeywordDoc, RunKeywordFamily};
use robotcode_lsp_types::{
    Diagnostic, DiagnosticRelatedInformation, DiagnosticSeverity, DiagnosticTag, Location,
    NumberOrString, Position, Range,
};
use robotcode_namespace::{KeywordFinder, Namespace, DIAGNOSTICS_SOURCE_NAME, KEYWORD_ERROR_CODE};
use robotcode_suppression::is_suppressed;

use crate::{AnalyzeError, CancellationToken};

/// One analysis pass over a parsed suite.
///
/// The analyzer owns its diagnostic list and keyword finder; concurrent
/// passes over the same namespace do not share mutable state. Diagnostics
/// come out in source traversal order.
pub struct Analyzer<'a> {
    namespace: &'a Namespace,
    finder: KeywordFinder<'a>,
    cancellation_token: CancellationToken,
    current_testcase_or_keyword_name: Option<String>,
    results: Vec<Diagnostic>,
}

impl<'a> Analyzer<'a> {
    pub fn new(namespace: &'a Namespace, cancellation_token: CancellationToken) -> Self {
        Self {
            namespace,
            finder: KeywordFinder::new(namespace),
            cancellation_token,
            current_testcase_or_keyword_name: None,
            results: Vec::new(),
        }
    }

    /// Walk `model` and return the collected diagnostics.
    ///
    /// Cancellation aborts between nodes and discards the partial results.
    pub fn analyze(mut self, model: &File) -> Result<Vec<Diagnostic>, AnalyzeError> {
        self.cancellation_token.check()?;
        self.visit_file(model)?;
        log::debug!(
            "analyzed {} with {} diagnostics",
            self.namespace.document_uri(),
            self.results.len()
        );
        Ok(self.results)
    }

    fn append_diagnostic(&mut self, mut diagnostic: Diagnostic) {
        if is_suppressed(self.namespace.document_lines(), diagnostic.range) {
            return;
        }
        diagnostic.source = Some(DIAGNOSTICS_SOURCE_NAME.to_string());
        self.results.push(diagnostic);
    }

    /// Resolve one keyword invocation and emit its diagnostics.
    ///
    /// Variable-bearing name tokens are statically unresolvable and return
    /// without reporting. Argument validation is skipped for templates,
    /// which only declare the keyword name.
    fn analyze_keyword_call<'t>(
        &mut self,
        name: Option<&str>,
        keyword_token: &Token,
        argument_tokens: &[&'t Token],
        validate_arguments: bool,
        analyse_run_keywords: bool,
    ) -> Result<Option<&'a KeywordDoc>, AnalyzeError> {
        if is_variable_token(keyword_token) {
            return Ok(None);
        }
        let anchor = keyword_token.range();

        let doc = self.finder.find_keyword(name);
        for entry in std::mem::take(&mut self.finder.diagnostics) {
            self.append_diagnostic(Diagnostic {
                severity: Some(entry.severity),
                code: entry.code.map(NumberOrString::String),
                ..Diagnostic::new(anchor, entry.message)
            });
        }

        if let Some(doc) = doc {
            if !doc.errors.is_empty() {
                let related = doc
                    .errors
                    .iter()
                    .map(|error| {
                        let path = error
                            .source
                            .as_deref()
                            .or(doc.source.as_deref())
                            .unwrap_or_else(|| Path::new("/<unknown>"));
                        let line = related_information_line(error.line_no, doc.line_no);
                        DiagnosticRelatedInformation {
                            location: Location {
                                uri: file_uri(path),
                                range: Range::new(
                                    Position::new(line, 0),
                                    Position::new(line, 0),
                                ),
                            },
                            message: error.message.clone(),
                        }
                    })
                    .collect();
                self.append_diagnostic(Diagnostic {
                    severity: Some(DiagnosticSeverity::Error),
                    related_information: Some(related),
                    ..Diagnostic::new(anchor, "Keyword definition contains errors.")
                });
            }

            if doc.is_deprecated {
                let message = match &doc.deprecated_message {
                    Some(reason) => format!("Keyword '{}' is deprecated: {reason}.", doc.name),
                    None => format!("Keyword '{}' is deprecated.", doc.name),
                };
                self.append_diagnostic(Diagnostic {
                    severity: Some(DiagnosticSeverity::Hint),
                    tags: Some(vec![DiagnosticTag::Deprecated]),
                    ..Diagnostic::new(anchor, message)
                });
            }

            if doc.is_error_handler {
                self.append_diagnostic(Diagnostic {
                    severity: Some(DiagnosticSeverity::Error),
                    ..Diagnostic::new(
                        anchor,
                        format!(
                            "Keyword definition contains errors: {}",
                            doc.error_handler_message.as_deref().unwrap_or_default()
                        ),
                    )
                });
            }

            if validate_arguments {
                if let Some(arguments) = &doc.arguments {
                    let values: Vec<&str> = argument_tokens
                        .iter()
                        .map(|token| token.value.as_str())
                        .collect();
                    let args_to_process = doc.args_to_process().map(|count| count as usize);
                    if let Err(error) =
                        arguments.resolve(&values, args_to_process, !doc.is_any_run_keyword())
                    {
                        let end = argument_tokens
                            .last()
                            .map_or(anchor.end, |token| token.range().end);
                        self.append_diagnostic(Diagnostic {
                            severity: Some(DiagnosticSeverity::Error),
                            code: Some(error.code().into()),
                            ..Diagnostic::new(Range::new(anchor.start, end), error.to_string())
                        });
                    }
                }
            }

            if analyse_run_keywords {
                self.analyse_run_keyword(doc, argument_tokens)?;
            }
        }

        Ok(doc)
    }

    /// Drive the run-keyword state machine over an argument-token stream.
    ///
    /// Consumes the prefix belonging to nested keyword calls and returns
    /// the unconsumed suffix; never consumes more than the stream holds.
    fn analyse_run_keyword<'t>(
        &mut self,
        keyword_doc: &KeywordDoc,
        argument_tokens: &[&'t Token],
    ) -> Result<Vec<&'t Token>, AnalyzeError> {
        match keyword_doc.run_keyword_family() {
            RunKeywordFamily::RunKeyword
                if !argument_tokens.is_empty() && is_not_variable_token(argument_tokens[0]) =>
            {
                let name = unescape(&argument_tokens[0].value);
                self.analyze_keyword_call(
                    Some(&name),
                    argument_tokens[0],
                    &argument_tokens[1..],
                    true,
                    true,
                )?;
                Ok(argument_tokens[1..].to_vec())
            }
            RunKeywordFamily::RunKeywordWithCondition(count)
                if argument_tokens.len() > count as usize
                    && is_not_variable_token(argument_tokens[count as usize]) =>
            {
                let index = count as usize;
                let name = unescape(&argument_tokens[index].value);
                self.analyze_keyword_call(
                    Some(&name),
                    argument_tokens[index],
                    &argument_tokens[index + 1..],
                    true,
                    true,
                )?;
                Ok(argument_tokens[index + 1..].to_vec())
            }
            RunKeywordFamily::RunKeywords => self.analyse_run_keywords(argument_tokens),
            RunKeywordFamily::RunKeywordIf if argument_tokens.len() > 1 => {
                self.analyse_run_keyword_if(argument_tokens)
            }
            _ => Ok(argument_tokens.to_vec()),
        }
    }

    /// `Run Keywords`: segments separated by literal `AND`, or one
    /// zero-argument call per token when no `AND` appears at all.
    fn analyse_run_keywords<'t>(
        &mut self,
        argument_tokens: &[&'t Token],
    ) -> Result<Vec<&'t Token>, AnalyzeError> {
        let mut tokens = argument_tokens;
        let mut has_and = false;

        while let Some((&first, rest)) = tokens.split_first() {
            tokens = rest;

            if first.value == "AND" {
                self.append_diagnostic(Diagnostic {
                    severity: Some(DiagnosticSeverity::Error),
                    ..Diagnostic::new(first.range(), format!("Incorrect use of {}", first.value))
                });
                continue;
            }
            if is_variable_token(first) {
                continue;
            }

            let args: Vec<&'t Token>;
            if let Some(position) = tokens.iter().position(|token| token.value == "AND") {
                args = tokens[..position].to_vec();
                tokens = &tokens[position + 1..];
                has_and = true;
            } else if has_and {
                args = tokens.to_vec();
                tokens = &[];
            } else {
                args = Vec::new();
            }

            let name = unescape(&first.value);
            self.analyze_keyword_call(Some(&name), first, &args, true, true)?;
        }

        Ok(Vec::new())
    }

    /// `Run Keyword If` with its `ELSE`/`ELSE IF` branch syntax. Nested
    /// run-keyword wrappers continue the machine on the remainder.
    fn analyse_run_keyword_if<'t>(
        &mut self,
        argument_tokens: &[&'t Token],
    ) -> Result<Vec<&'t Token>, AnalyzeError> {
        let mut tokens: Vec<&'t Token> = argument_tokens.to_vec();

        // Probe whether the branch keyword is itself a wrapper; the probe's
        // lookup diagnostics are re-emitted by the call analysis below.
        let probed = self.finder.find_keyword(Some(tokens[1].value.as_str()));
        self.finder.diagnostics.clear();

        if let Some(doc) = probed.filter(|doc| doc.is_any_run_keyword()) {
            let rest: Vec<&'t Token> = tokens[2..].to_vec();
            tokens = self.analyse_run_keyword(doc, &rest)?;
        } else {
            let keyword_token = tokens[1];
            let mut rest: Vec<&'t Token> = tokens[2..].to_vec();
            let args = take_branch_args(&mut rest);
            if is_not_variable_token(keyword_token) {
                let name = unescape(&keyword_token.value);
                self.analyze_keyword_call(Some(&name), keyword_token, &args, true, false)?;
            }
            tokens = rest;
        }

        loop {
            if tokens.first().is_some_and(|token| token.value == "ELSE") && tokens.len() > 1 {
                let keyword_token = tokens[1];
                let name = unescape(&keyword_token.value);
                let call_args: Vec<&'t Token> = tokens[2..].to_vec();
                let result =
                    self.analyze_keyword_call(Some(&name), keyword_token, &call_args, true, false)?;

                tokens = tokens.split_off(2);
                if let Some(doc) = result.filter(|doc| doc.is_any_run_keyword()) {
                    let current = std::mem::take(&mut tokens);
                    tokens = self.analyse_run_keyword(doc, &current)?;
                }
                take_branch_args(&mut tokens);
                break;
            } else if tokens.first().is_some_and(|token| token.value == "ELSE IF")
                && tokens.len() > 2
            {
                let keyword_token = tokens[2];
                let name = unescape(&keyword_token.value);
                let call_args: Vec<&'t Token> = tokens[3..].to_vec();
                let result =
                    self.analyze_keyword_call(Some(&name), keyword_token, &call_args, true, false)?;

                tokens = tokens.split_off(3);
                if let Some(doc) = result.filter(|doc| doc.is_any_run_keyword()) {
                    let current = std::mem::take(&mut tokens);
                    tokens = self.analyse_run_keyword(doc, &current)?;
                }
                take_branch_args(&mut tokens);
            } else {
                break;
            }
        }

        Ok(tokens)
    }
}

impl Visitor for Analyzer<'_> {
    type Error = AnalyzeError;

    fn visit_node(&mut self, node: &Node) -> Result<(), AnalyzeError> {
        self.cancellation_token.check()?;
        walk_node(self, node)
    }

    fn visit_test_case(&mut self, node: &TestCase) -> Result<(), AnalyzeError> {
        if node.name().is_empty() {
            let anchor = node.name_token().map_or_else(|| node.range(), Token::range);
            self.append_diagnostic(Diagnostic {
                severity: Some(DiagnosticSeverity::Error),
                code: Some(KEYWORD_ERROR_CODE.into()),
                ..Diagnostic::new(anchor, "Test case name cannot be empty.")
            });
        }

        let previous = std::mem::replace(
            &mut self.current_testcase_or_keyword_name,
            non_empty(node.name()),
        );
        let result = node
            .body
            .iter()
            .try_for_each(|child| self.visit_node(child));
        self.current_testcase_or_keyword_name = previous;
        result
    }

    fn visit_keyword(&mut self, node: &Keyword) -> Result<(), AnalyzeError> {
        let anchor = node.name_token().map_or_else(|| node.range(), Token::range);
        if node.name().is_empty() {
            self.append_diagnostic(Diagnostic {
                severity: Some(DiagnosticSeverity::Error),
                code: Some(KEYWORD_ERROR_CODE.into()),
                ..Diagnostic::new(anchor, "Keyword name cannot be empty.")
            });
        } else if is_embedded_keyword(node.name())
            && node.body.iter().any(|child| {
                matches!(child, Node::Arguments(arguments) if !arguments.values().is_empty())
            })
        {
            self.append_diagnostic(Diagnostic {
                severity: Some(DiagnosticSeverity::Error),
                code: Some(KEYWORD_ERROR_CODE.into()),
                ..Diagnostic::new(anchor, "Keyword cannot have both normal and embedded arguments.")
            });
        }

        let previous = std::mem::replace(
            &mut self.current_testcase_or_keyword_name,
            non_empty(node.name()),
        );
        let result = node
            .body
            .iter()
            .try_for_each(|child| self.visit_node(child));
        self.current_testcase_or_keyword_name = previous;
        result
    }

    fn visit_keyword_call(&mut self, node: &KeywordCall) -> Result<(), AnalyzeError> {
        let assign_anchor = node
            .assign()
            .next()
            .map_or_else(|| node.range(), Token::range);

        if node.assign().next().is_some() && node.keyword_name().unwrap_or_default().is_empty() {
            self.append_diagnostic(Diagnostic {
                severity: Some(DiagnosticSeverity::Error),
                code: Some(KEYWORD_ERROR_CODE.into()),
                ..Diagnostic::new(assign_anchor, "Keyword name cannot be empty.")
            });
        } else if let Some(keyword_token) = node.keyword_token() {
            let arguments = node.argument_tokens();
            self.analyze_keyword_call(node.keyword_name(), keyword_token, &arguments, true, true)?;
        }

        if self.current_testcase_or_keyword_name.is_none() {
            self.append_diagnostic(Diagnostic {
                severity: Some(DiagnosticSeverity::Hint),
                tags: Some(vec![DiagnosticTag::Unnecessary]),
                ..Diagnostic::new(assign_anchor, "Code is unreachable.")
            });
        }

        Ok(())
    }

    fn visit_fixture(&mut self, node: &Fixture) -> Result<(), AnalyzeError> {
        if let Some(keyword_token) = node.name_token() {
            if is_not_variable_token(keyword_token) {
                let arguments = node.argument_tokens();
                self.analyze_keyword_call(node.name(), keyword_token, &arguments, true, true)?;
            }
        }
        Ok(())
    }

    fn visit_template(&mut self, node: &Template) -> Result<(), AnalyzeError> {
        if let Some(keyword_token) = node.name_token() {
            if is_not_variable_token(keyword_token) {
                self.analyze_keyword_call(node.value(), keyword_token, &[], false, true)?;
            }
        }
        Ok(())
    }

    fn visit_test_template(&mut self, node: &TestTemplate) -> Result<(), AnalyzeError> {
        if let Some(keyword_token) = node.name_token() {
            if is_not_variable_token(keyword_token) {
                self.analyze_keyword_call(node.value(), keyword_token, &[], false, true)?;
            }
        }
        Ok(())
    }
}

/// Pop and return the branch arguments, everything up to the next
/// `ELSE`/`ELSE IF`.
fn take_branch_args<'t>(tokens: &mut Vec<&'t Token>) -> Vec<&'t Token> {
    let split = tokens
        .iter()
        .position(|token| token.value == "ELSE" || token.value == "ELSE IF")
        .unwrap_or(tokens.len());
    let rest = tokens.split_off(split);
    std::mem::replace(tokens, rest)
}

fn non_empty(name: &str) -> Option<String> {
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn related_information_line(error_line: Option<i32>, doc_line: i32) -> u32 {
    let line = match error_line {
        Some(line_no) => line_no - 1,
        None if doc_line >= 0 => doc_line,
        None => 0,
    };
    u32::try_from(line.max(0)).unwrap_or(0)
}

fn file_uri(path: &Path) -> String {
    Url::from_file_path(path)
        .map(String::from)
        .unwrap_or_else(|()| format!("file://{}", path.display()))
}
