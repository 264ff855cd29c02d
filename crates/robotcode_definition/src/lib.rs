//! Go-to-definition over a parsed suite and its namespace.
//!
//! The resolver classifies the innermost node containing the request
//! position and produces [`LocationLink`]s: keyword invocations link to the
//! keyword's declaration, arguments of BuiltIn run-keyword wrappers are
//! followed through the same nesting rules the analyzer uses, and import
//! statements link to the imported file.

use std::ops::ControlFlow;
use std::path::Path;

use url::Url;

use robotcode_ast::{
    is_not_variable_token, is_variable_token, walk, File, LibraryImport, Node, ResourceImport,
    Token,
};
use robotcode_library_doc::{KeywordDoc, RunKeywordFamily};
use robotcode_lsp_types::LocationLink;
use robotcode_namespace::Namespace;
use robotcode_text::Position;

/// Definition links for `position`, or `None` when nothing resolvable is
/// there.
pub fn find_definition(
    model: &File,
    namespace: &Namespace,
    position: Position,
) -> Option<Vec<LocationLink>> {
    let mut innermost: Option<&Node> = None;
    for top in &model.body {
        for node in walk(top) {
            if position.is_in_range(node.range(), true) {
                innermost = Some(node);
            }
        }
    }

    match innermost? {
        Node::KeywordCall(node) => keyword_call_links(
            node.keyword_name(),
            node.keyword_token(),
            &node.argument_tokens(),
            namespace,
            position,
        ),
        Node::Fixture(node) => keyword_call_links(
            node.name(),
            node.name_token(),
            &node.argument_tokens(),
            namespace,
            position,
        ),
        Node::Template(node) => template_links(node.value(), node.name_token(), namespace, position),
        Node::TestTemplate(node) => {
            template_links(node.value(), node.name_token(), namespace, position)
        }
        Node::LibraryImport(node) => library_import_links(node, namespace, position),
        Node::ResourceImport(node) => resource_import_links(node, namespace, position),
        _ => None,
    }
}

fn keyword_call_links(
    keyword: Option<&str>,
    keyword_token: Option<&Token>,
    argument_tokens: &[&Token],
    namespace: &Namespace,
    position: Position,
) -> Option<Vec<LocationLink>> {
    let keyword = keyword.filter(|name| !name.is_empty())?;
    let keyword_token = keyword_token?;

    let keyword_doc = namespace.find_keyword(keyword)?;
    keyword_doc.source.as_ref()?;

    if position.is_in_range(keyword_token.range(), true) {
        return Some(vec![location_link(keyword_token, keyword_doc)]);
    }

    // The position sits among the arguments; drive the run-keyword state
    // machine until the containing argument resolves to a keyword name.
    match follow_run_keyword(namespace, keyword_doc, argument_tokens, position) {
        ControlFlow::Break(links) => links,
        ControlFlow::Continue(_) => None,
    }
}

/// Walk the run-keyword state machine over an argument-token stream,
/// looking for the keyword name containing `position`.
///
/// The nesting rules are the analyzer's: `Run Keyword` takes the next
/// token as keyword, the condition variants skip their condition
/// arguments, `Run Keywords` treats every segment head as a keyword, and
/// `Run Keyword If` walks its `ELSE`/`ELSE IF` branches. `Break` ends the
/// search (with the links when the position named a resolvable keyword);
/// `Continue` hands the unconsumed suffix back to the enclosing wrapper.
fn follow_run_keyword<'t>(
    namespace: &Namespace,
    keyword_doc: &KeywordDoc,
    argument_tokens: &[&'t Token],
    position: Position,
) -> ControlFlow<Option<Vec<LocationLink>>, Vec<&'t Token>> {
    match keyword_doc.run_keyword_family() {
        RunKeywordFamily::RunKeyword
            if !argument_tokens.is_empty() && is_not_variable_token(argument_tokens[0]) =>
        {
            let nested = resolve_nested(namespace, argument_tokens[0], position)?;
            follow_run_keyword(namespace, nested, &argument_tokens[1..], position)
        }
        RunKeywordFamily::RunKeywordWithCondition(count)
            if argument_tokens.len() > count as usize
                && is_not_variable_token(argument_tokens[count as usize]) =>
        {
            let index = count as usize;
            let nested = resolve_nested(namespace, argument_tokens[index], position)?;
            follow_run_keyword(namespace, nested, &argument_tokens[index + 1..], position)
        }
        RunKeywordFamily::RunKeywords => {
            for token in argument_tokens {
                if position.is_in_range(token.range(), true) && is_not_variable_token(token) {
                    let links = namespace
                        .find_keyword(&token.value)
                        .filter(|nested| nested.source.is_some())
                        .map(|nested| vec![location_link(token, nested)]);
                    return ControlFlow::Break(links);
                }
            }
            ControlFlow::Continue(Vec::new())
        }
        RunKeywordFamily::RunKeywordIf if argument_tokens.len() > 1 => {
            follow_run_keyword_if(namespace, argument_tokens, position)
        }
        _ => ControlFlow::Continue(argument_tokens.to_vec()),
    }
}

/// `Run Keyword If` with its `ELSE`/`ELSE IF` branch syntax, mirroring the
/// analyzer's drive: nested wrappers continue the machine on the
/// remainder, and every branch keyword is a link target.
fn follow_run_keyword_if<'t>(
    namespace: &Namespace,
    argument_tokens: &[&'t Token],
    position: Position,
) -> ControlFlow<Option<Vec<LocationLink>>, Vec<&'t Token>> {
    let mut tokens: Vec<&'t Token> = argument_tokens.to_vec();

    let probed = namespace.find_keyword(&tokens[1].value);
    if let Some(nested) = probed.filter(|doc| doc.is_any_run_keyword()) {
        if position.is_in_range(tokens[1].range(), true) {
            let links = nested
                .source
                .is_some()
                .then(|| vec![location_link(tokens[1], nested)]);
            return ControlFlow::Break(links);
        }
        let rest: Vec<&'t Token> = tokens[2..].to_vec();
        tokens = follow_run_keyword(namespace, nested, &rest, position)?;
    } else {
        let keyword_token = tokens[1];
        let mut rest: Vec<&'t Token> = tokens[2..].to_vec();
        skip_branch_args(&mut rest);
        if is_not_variable_token(keyword_token)
            && position.is_in_range(keyword_token.range(), true)
        {
            let links = probed
                .filter(|doc| doc.source.is_some())
                .map(|doc| vec![location_link(keyword_token, doc)]);
            return ControlFlow::Break(links);
        }
        tokens = rest;
    }

    loop {
        if tokens.first().is_some_and(|token| token.value == "ELSE") && tokens.len() > 1 {
            let keyword_token = tokens[1];
            let branch = branch_keyword_links(namespace, keyword_token, position)?;
            tokens = tokens.split_off(2);
            if let Some(nested) = branch.filter(|doc| doc.is_any_run_keyword()) {
                let current = std::mem::take(&mut tokens);
                tokens = follow_run_keyword(namespace, nested, &current, position)?;
            }
            skip_branch_args(&mut tokens);
            break;
        } else if tokens.first().is_some_and(|token| token.value == "ELSE IF")
            && tokens.len() > 2
        {
            let keyword_token = tokens[2];
            let branch = branch_keyword_links(namespace, keyword_token, position)?;
            tokens = tokens.split_off(3);
            if let Some(nested) = branch.filter(|doc| doc.is_any_run_keyword()) {
                let current = std::mem::take(&mut tokens);
                tokens = follow_run_keyword(namespace, nested, &current, position)?;
            }
            skip_branch_args(&mut tokens);
        } else {
            break;
        }
    }

    ControlFlow::Continue(tokens)
}

/// Resolve one branch keyword token. Breaks the search with its links when
/// `position` sits on the token, else hands back its doc so nested
/// wrappers can continue the walk.
fn branch_keyword_links<'a>(
    namespace: &'a Namespace,
    keyword_token: &Token,
    position: Position,
) -> ControlFlow<Option<Vec<LocationLink>>, Option<&'a KeywordDoc>> {
    if is_variable_token(keyword_token) {
        return ControlFlow::Continue(None);
    }
    let doc = namespace.find_keyword(&keyword_token.value);
    if position.is_in_range(keyword_token.range(), true) {
        let links = doc
            .filter(|doc| doc.source.is_some())
            .map(|doc| vec![location_link(keyword_token, doc)]);
        return ControlFlow::Break(links);
    }
    ControlFlow::Continue(doc)
}

/// Resolve one nested keyword token for the unconditional wrappers.
/// Breaks with the links when `position` sits on the token, breaks the
/// search entirely when the keyword is unresolvable, and hands back its
/// doc otherwise.
fn resolve_nested<'a>(
    namespace: &'a Namespace,
    token: &Token,
    position: Position,
) -> ControlFlow<Option<Vec<LocationLink>>, &'a KeywordDoc> {
    let Some(doc) = namespace.find_keyword(&token.value) else {
        return ControlFlow::Break(None);
    };
    if doc.source.is_none() {
        return ControlFlow::Break(None);
    }
    if position.is_in_range(token.range(), true) {
        return ControlFlow::Break(Some(vec![location_link(token, doc)]));
    }
    ControlFlow::Continue(doc)
}

/// Drop the branch arguments, everything up to the next `ELSE`/`ELSE IF`.
fn skip_branch_args(tokens: &mut Vec<&Token>) {
    let split = tokens
        .iter()
        .position(|token| token.value == "ELSE" || token.value == "ELSE IF")
        .unwrap_or(tokens.len());
    tokens.drain(..split);
}

fn template_links(
    value: Option<&str>,
    name_token: Option<&Token>,
    namespace: &Namespace,
    position: Position,
) -> Option<Vec<LocationLink>> {
    let value = value.filter(|name| !name.is_empty())?;
    let name_token = name_token?;
    if !position.is_in_range(name_token.range(), true) {
        return None;
    }

    let keyword_doc = namespace.find_keyword(value)?;
    keyword_doc.source.as_ref()?;
    Some(vec![location_link(name_token, keyword_doc)])
}

fn library_import_links(
    node: &LibraryImport,
    namespace: &Namespace,
    position: Position,
) -> Option<Vec<LocationLink>> {
    let name = node.name()?;
    let name_token = node.name_token()?;
    if !position.is_in_range(name_token.range(), true) {
        return None;
    }

    let entries: Vec<_> = namespace
        .get_libraries()
        .values()
        .filter(|entry| {
            entry.import_name == name
                && entry.args == node.args()
                && entry.alias == node.alias
        })
        .collect();
    let [entry] = entries.as_slice() else {
        return None;
    };

    let python_source = entry.python_source.as_deref()?;
    Some(vec![LocationLink {
        origin_selection_range: Some(name_token.range()),
        target_uri: file_uri(python_source),
        target_range: entry.library_doc.range(),
        target_selection_range: entry.library_doc.range(),
    }])
}

fn resource_import_links(
    node: &ResourceImport,
    namespace: &Namespace,
    position: Position,
) -> Option<Vec<LocationLink>> {
    let name = node.name()?;
    let name_token = node.name_token()?;
    if !position.is_in_range(name_token.range(), true) {
        return None;
    }

    let entries: Vec<_> = namespace
        .get_resources()
        .values()
        .filter(|entry| entry.import_name == name)
        .collect();
    let [entry] = entries.as_slice() else {
        return None;
    };

    let python_source = entry.python_source.as_deref()?;
    Some(vec![LocationLink {
        origin_selection_range: Some(name_token.range()),
        target_uri: file_uri(python_source),
        target_range: entry.library_doc.range(),
        target_selection_range: entry.library_doc.range(),
    }])
}

fn location_link(origin: &Token, keyword_doc: &KeywordDoc) -> LocationLink {
    let target_range = keyword_doc.range();
    let target_uri = keyword_doc
        .source
        .as_deref()
        .map(file_uri)
        .unwrap_or_default();
    LocationLink {
        origin_selection_range: Some(origin.range()),
        target_uri,
        target_range,
        target_selection_range: target_range,
    }
}

fn file_uri(path: &Path) -> String {
    Url::from_file_path(path)
        .map(String::from)
        .unwrap_or_else(|()| format!("file://{}", path.display()))
}
