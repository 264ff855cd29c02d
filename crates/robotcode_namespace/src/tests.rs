use rustc_hash::FxHashMap;

use robotcode_ast::{File, Keyword, LibraryImport, Node, ResourceImport, Token, TokenKind};
use robotcode_library_doc::{KeywordDoc, LibraryDoc, BUILTIN_LIBRARY_NAME};
use robotcode_lsp_types::DiagnosticSeverity;

use crate::{
    ImportError, Importer, KeywordFinder, LibraryEntry, Namespace, ResourceEntry,
    KEYWORD_MULTIPLE_CODE, KEYWORD_NOT_FOUND_CODE,
};

#[derive(Default)]
struct FakeImporter {
    libraries: FxHashMap<String, LibraryDoc>,
    resources: FxHashMap<String, LibraryDoc>,
}

impl FakeImporter {
    fn with_builtin() -> Self {
        let mut importer = Self::default();
        let mut builtin = LibraryDoc::new(BUILTIN_LIBRARY_NAME);
        builtin.source = Some("/rf/BuiltIn.py".into());
        builtin.keywords = ["Log", "Sleep", "Run Keyword", "Run Keywords", "Run Keyword If"]
            .iter()
            .map(|name| {
                KeywordDoc::new(*name, BUILTIN_LIBRARY_NAME).with_source("/rf/BuiltIn.py", 1)
            })
            .collect();
        importer
            .libraries
            .insert(BUILTIN_LIBRARY_NAME.to_string(), builtin);
        importer
    }

    fn add_library(&mut self, name: &str, keywords: &[&str]) {
        let mut doc = LibraryDoc::new(name);
        doc.source = Some(format!("/libs/{name}.py").into());
        doc.keywords = keywords
            .iter()
            .map(|keyword| KeywordDoc::new(*keyword, name).with_source(format!("/libs/{name}.py"), 3))
            .collect();
        self.libraries.insert(name.to_string(), doc);
    }

    fn add_resource(&mut self, path: &str, keywords: &[&str], nested: &[&str]) {
        let name = std::path::Path::new(path)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap()
            .to_string();
        let mut doc = LibraryDoc::new(&name);
        doc.source = Some(path.into());
        doc.keywords = keywords
            .iter()
            .map(|keyword| KeywordDoc::new(*keyword, &name).with_source(path, 5))
            .collect();
        doc.resource_imports = nested.iter().map(|path| (*path).to_string()).collect();
        self.resources.insert(path.to_string(), doc);
    }
}

impl Importer for FakeImporter {
    fn import_library(
        &self,
        name: &str,
        args: &[String],
        alias: Option<&str>,
    ) -> Result<LibraryEntry, ImportError> {
        let library_doc = self
            .libraries
            .get(name)
            .cloned()
            .ok_or_else(|| ImportError::new(format!("Importing library '{name}' failed.")))?;
        Ok(LibraryEntry {
            import_name: name.to_string(),
            args: args.to_vec(),
            alias: alias.map(str::to_string),
            python_source: library_doc.source.clone(),
            library_doc,
        })
    }

    fn import_resource(&self, path: &str) -> Result<ResourceEntry, ImportError> {
        let library_doc = self
            .resources
            .get(path)
            .cloned()
            .ok_or_else(|| ImportError::new(format!("Resource file '{path}' does not exist.")))?;
        Ok(ResourceEntry {
            import_name: path.to_string(),
            python_source: library_doc.source.clone(),
            library_doc,
        })
    }
}

fn library_import(name: &str, alias: Option<&str>) -> Node {
    Node::LibraryImport(LibraryImport::new(
        vec![Token::new(TokenKind::Name, name, 0, 10)],
        alias.map(str::to_string),
    ))
}

fn resource_import(path: &str) -> Node {
    Node::ResourceImport(ResourceImport::new(vec![Token::new(
        TokenKind::Name,
        path,
        1,
        12,
    )]))
}

fn keyword_block(name: &str, line: u32) -> Node {
    Node::Keyword(Keyword::new(
        vec![Token::new(TokenKind::KeywordName, name, line, 0)],
        vec![],
    ))
}

fn namespace_with(model: &File, importer: &FakeImporter) -> Namespace {
    Namespace::new(
        model,
        "file:///suite.robot",
        Some(std::path::Path::new("/suite.robot")),
        vec![],
        importer,
    )
}

#[test]
fn local_keywords_shadow_resources_and_libraries() {
    let mut importer = FakeImporter::with_builtin();
    importer.add_library("MyLib", &["Do Thing"]);
    importer.add_resource("common.resource", &["Do Thing"], &[]);

    let model = File::new(vec![
        library_import("MyLib", None),
        resource_import("common.resource"),
        keyword_block("Do Thing", 10),
    ]);
    let namespace = namespace_with(&model, &importer);

    let mut finder = KeywordFinder::new(&namespace);
    let doc = finder.find_keyword(Some("Do Thing")).unwrap();
    assert_eq!(doc.libname, "suite");
    assert!(finder.diagnostics.is_empty());
}

#[test]
fn resources_shadow_libraries() {
    let mut importer = FakeImporter::with_builtin();
    importer.add_library("MyLib", &["Do Thing"]);
    importer.add_resource("common.resource", &["Do Thing"], &[]);

    let model = File::new(vec![
        library_import("MyLib", None),
        resource_import("common.resource"),
    ]);
    let namespace = namespace_with(&model, &importer);

    let doc = namespace.find_keyword("Do Thing").unwrap();
    assert_eq!(doc.libname, "common");
}

#[test]
fn ambiguity_in_one_scope_keeps_the_first_and_reports_multiple() {
    let mut importer = FakeImporter::with_builtin();
    importer.add_library("LibA", &["Do Thing"]);
    importer.add_library("LibB", &["Do Thing"]);

    let model = File::new(vec![
        library_import("LibA", None),
        library_import("LibB", None),
    ]);
    let namespace = namespace_with(&model, &importer);

    let mut finder = KeywordFinder::new(&namespace);
    let doc = finder.find_keyword(Some("Do Thing")).unwrap();
    assert_eq!(doc.libname, "LibA");
    assert_eq!(finder.diagnostics.len(), 1);
    let diagnostic = &finder.diagnostics[0];
    assert_eq!(diagnostic.code.as_deref(), Some(KEYWORD_MULTIPLE_CODE));
    assert_eq!(diagnostic.severity, DiagnosticSeverity::Error);
    assert!(diagnostic.message.contains("LibA.Do Thing"));
    assert!(diagnostic.message.contains("LibB.Do Thing"));
}

#[test]
fn unknown_keyword_reports_not_found() {
    let importer = FakeImporter::with_builtin();
    let model = File::new(vec![]);
    let namespace = namespace_with(&model, &importer);

    let mut finder = KeywordFinder::new(&namespace);
    assert!(finder.find_keyword(Some("Unknown Kw")).is_none());
    assert_eq!(finder.diagnostics.len(), 1);
    assert_eq!(
        finder.diagnostics[0].code.as_deref(),
        Some(KEYWORD_NOT_FOUND_CODE)
    );
    assert_eq!(finder.diagnostics[0].message, "Keyword 'Unknown Kw' not found.");
}

#[test]
fn exact_match_beats_embedded_match() {
    let mut importer = FakeImporter::with_builtin();
    importer.add_library("Lib", &["Add ${count} copies", "Add 7 copies"]);

    let model = File::new(vec![library_import("Lib", None)]);
    let namespace = namespace_with(&model, &importer);

    let doc = namespace.find_keyword("Add 7 copies").unwrap();
    assert!(doc.embedded().is_none());
    let embedded = namespace.find_keyword("Add 9 copies").unwrap();
    assert!(embedded.embedded().is_some());
}

#[test]
fn qualified_names_restrict_the_scope() {
    let mut importer = FakeImporter::with_builtin();
    importer.add_library("LibA", &["Do Thing"]);
    importer.add_library("LibB", &["Do Thing"]);

    let model = File::new(vec![
        library_import("LibA", None),
        library_import("LibB", Some("Aliased")),
    ]);
    let namespace = namespace_with(&model, &importer);

    let mut finder = KeywordFinder::new(&namespace);
    let doc = finder.find_keyword(Some("Aliased.Do Thing")).unwrap();
    assert_eq!(doc.libname, "LibB");
    assert!(finder.diagnostics.is_empty());

    let direct = finder.find_keyword(Some("LibA.Do Thing")).unwrap();
    assert_eq!(direct.libname, "LibA");
}

#[test]
fn builtin_is_implicitly_imported_last() {
    let mut importer = FakeImporter::with_builtin();
    importer.add_library("Lib", &["Log"]);

    let model = File::new(vec![library_import("Lib", None)]);
    let namespace = namespace_with(&model, &importer);

    // The explicit library wins over the implicit BuiltIn.
    let doc = namespace.find_keyword("Log").unwrap();
    assert_eq!(doc.libname, "Lib");
    assert!(namespace
        .get_libraries()
        .values()
        .any(|entry| entry.library_doc.name == BUILTIN_LIBRARY_NAME));
}

#[test]
fn explicit_builtin_is_not_duplicated() {
    let importer = FakeImporter::with_builtin();
    let model = File::new(vec![library_import(BUILTIN_LIBRARY_NAME, None)]);
    let namespace = namespace_with(&model, &importer);
    assert_eq!(namespace.get_libraries().len(), 1);
}

#[test]
fn aliased_imports_are_distinct_entries() {
    let mut importer = FakeImporter::with_builtin();
    importer.add_library("Lib", &["Do Thing"]);

    let model = File::new(vec![
        library_import("Lib", None),
        library_import("Lib", Some("Other")),
    ]);
    let namespace = namespace_with(&model, &importer);
    assert_eq!(
        namespace
            .get_libraries()
            .values()
            .filter(|entry| entry.import_name == "Lib")
            .count(),
        2
    );
}

#[test]
fn cyclic_resource_imports_terminate() {
    let mut importer = FakeImporter::with_builtin();
    importer.add_resource("a.resource", &["Kw A"], &["b.resource"]);
    importer.add_resource("b.resource", &["Kw B"], &["a.resource"]);

    let model = File::new(vec![resource_import("a.resource")]);
    let namespace = namespace_with(&model, &importer);

    assert!(namespace.find_keyword("Kw A").is_some());
    assert!(namespace.find_keyword("Kw B").is_some());
    let names: Vec<_> = namespace
        .resource_keywords()
        .iter()
        .map(|doc| doc.name.as_str())
        .collect();
    assert_eq!(names, ["Kw A", "Kw B"]);
}

#[test]
fn failed_imports_become_placeholder_entries_with_errors() {
    let importer = FakeImporter::with_builtin();
    let model = File::new(vec![library_import("Missing", None)]);
    let namespace = namespace_with(&model, &importer);

    let entry = namespace
        .get_libraries()
        .values()
        .find(|entry| entry.import_name == "Missing")
        .unwrap();
    assert!(entry.library_doc.keywords.is_empty());
    assert_eq!(entry.library_doc.errors.len(), 1);
    assert!(entry.library_doc.errors[0]
        .message
        .contains("Importing library 'Missing' failed."));
}

#[test]
fn local_keyword_line_numbers_come_from_the_header() {
    let importer = FakeImporter::with_builtin();
    let model = File::new(vec![keyword_block("My Keyword", 41)]);
    let namespace = namespace_with(&model, &importer);

    let doc = namespace.find_keyword("My Keyword").unwrap();
    assert_eq!(doc.line_no, 42);
    assert_eq!(doc.range().start.line, 41);
}

#[test]
fn repeated_lookups_return_the_same_keyword_and_diagnostics() {
    let mut importer = FakeImporter::with_builtin();
    importer.add_library("LibA", &["Do Thing"]);
    importer.add_library("LibB", &["Do Thing"]);

    let model = File::new(vec![
        library_import("LibA", None),
        library_import("LibB", None),
    ]);
    let namespace = namespace_with(&model, &importer);

    let mut finder = KeywordFinder::new(&namespace);
    let first = finder.find_keyword(Some("Do Thing")).unwrap() as *const _;
    let first_diagnostics = finder.diagnostics.clone();
    let second = finder.find_keyword(Some("Do Thing")).unwrap() as *const _;
    assert_eq!(first, second);
    assert_eq!(finder.diagnostics, first_diagnostics);

    assert!(finder.find_keyword(None).is_none());
    assert!(finder.diagnostics.is_empty());
}
