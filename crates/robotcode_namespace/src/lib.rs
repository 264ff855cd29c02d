//! The per-document keyword namespace.
//!
//! A [`Namespace`] ingests one parsed suite, resolves its library and
//! resource imports through the external [`Importer`], collects the suite's
//! own keywords, and exposes the lookup surface the analyzer and the
//! definition resolver share: [`KeywordFinder`] with its shadowing rules,
//! plus the raw import tables for import-targeted queries.
//!
//! Namespaces are immutable once constructed and safe to share between
//! analysis passes; invalidation on file changes is the document manager's
//! concern.

mod finder;

pub use finder::{FinderDiagnostic, KeywordFinder};

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use thiserror::Error;

use robotcode_ast::{File, Node};
use robotcode_library_doc::{
    ArgumentSpec, KeywordDoc, KeywordError, LibraryDoc, BUILTIN_LIBRARY_NAME,
};

/// `source` value of every diagnostic the core produces.
pub const DIAGNOSTICS_SOURCE_NAME: &str = "robotcode";

pub const KEYWORD_ERROR_CODE: &str = "KeywordError";
pub const KEYWORD_NOT_FOUND_CODE: &str = "KeywordError/not_found";
pub const KEYWORD_MULTIPLE_CODE: &str = "KeywordError/multiple";

/// Identity of one import statement: name, arguments and alias. Imports
/// differing only in alias are distinct entries.
pub type ImportKey = (String, Vec<String>, Option<String>);

/// A resolved `Library` import.
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    pub import_name: String,
    pub args: Vec<String>,
    pub alias: Option<String>,
    pub library_doc: LibraryDoc,
    pub python_source: Option<PathBuf>,
}

impl LibraryEntry {
    fn key(&self) -> ImportKey {
        (
            self.import_name.clone(),
            self.args.clone(),
            self.alias.clone(),
        )
    }

    /// The name keyword lookups may qualify with: the alias when given,
    /// else the library's own name.
    pub fn scope_name(&self) -> &str {
        self.alias.as_deref().unwrap_or_else(|| {
            if self.library_doc.name.is_empty() {
                &self.import_name
            } else {
                &self.library_doc.name
            }
        })
    }
}

/// A resolved `Resource` import.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    pub import_name: String,
    pub library_doc: LibraryDoc,
    pub python_source: Option<PathBuf>,
}

impl ResourceEntry {
    fn key(&self) -> ImportKey {
        (self.import_name.clone(), Vec::new(), None)
    }

    pub fn scope_name(&self) -> &str {
        if self.library_doc.name.is_empty() {
            Path::new(&self.import_name)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or(&self.import_name)
        } else {
            &self.library_doc.name
        }
    }
}

/// Failure reported by the external importer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ImportError {
    pub path: Option<PathBuf>,
    pub line_no: Option<i32>,
    pub message: String,
}

impl ImportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            path: None,
            line_no: None,
            message: message.into(),
        }
    }
}

/// The external library/resource importer.
///
/// Implementations load libdoc information for libraries and parse
/// resource files; the namespace never touches the file system itself.
pub trait Importer {
    fn import_library(
        &self,
        name: &str,
        args: &[String],
        alias: Option<&str>,
    ) -> Result<LibraryEntry, ImportError>;

    fn import_resource(&self, path: &str) -> Result<ResourceEntry, ImportError>;
}

/// Keyword namespace of one document.
#[derive(Debug)]
pub struct Namespace {
    document_uri: String,
    document_lines: Vec<String>,
    libraries: IndexMap<ImportKey, LibraryEntry>,
    resources: IndexMap<ImportKey, ResourceEntry>,
    /// Keywords of all reachable resources, depth-first in declaration
    /// order, cycle-free.
    resource_keywords: Vec<KeywordDoc>,
    local_keywords: Vec<KeywordDoc>,
}

impl Namespace {
    pub fn new(
        model: &File,
        document_uri: impl Into<String>,
        document_source: Option<&Path>,
        document_lines: Vec<String>,
        importer: &dyn Importer,
    ) -> Self {
        let document_uri = document_uri.into();
        let libname = document_source
            .and_then(Path::file_stem)
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();

        let mut namespace = Self {
            document_uri,
            document_lines,
            libraries: IndexMap::new(),
            resources: IndexMap::new(),
            resource_keywords: Vec::new(),
            local_keywords: Vec::new(),
        };

        let mut visited: FxHashSet<String> = FxHashSet::default();
        for node in &model.body {
            match node {
                Node::LibraryImport(import) => {
                    if let Some(name) = import.name() {
                        namespace.import_library(
                            name,
                            &import.args(),
                            import.alias.as_deref(),
                            importer,
                        );
                    }
                }
                Node::ResourceImport(import) => {
                    if let Some(path) = import.name() {
                        namespace.import_resource(path, importer, &mut visited);
                    }
                }
                Node::Keyword(keyword) => {
                    namespace.collect_local_keyword(keyword, &libname, document_source);
                }
                _ => {}
            }
        }

        if !namespace.has_builtin() {
            log::debug!("implicitly importing {BUILTIN_LIBRARY_NAME}");
            namespace.import_library(BUILTIN_LIBRARY_NAME, &[], None, importer);
        }

        namespace
    }

    fn has_builtin(&self) -> bool {
        self.libraries
            .values()
            .any(|entry| entry.library_doc.name == BUILTIN_LIBRARY_NAME)
    }

    fn import_library(
        &mut self,
        name: &str,
        args: &[String],
        alias: Option<&str>,
        importer: &dyn Importer,
    ) {
        let entry = importer
            .import_library(name, args, alias)
            .unwrap_or_else(|error| {
                log::debug!("library import '{name}' failed: {error}");
                LibraryEntry {
                    import_name: name.to_string(),
                    args: args.to_vec(),
                    alias: alias.map(str::to_string),
                    library_doc: failed_import_doc(name, &error),
                    python_source: None,
                }
            });
        self.libraries.insert(entry.key(), entry);
    }

    fn import_resource(
        &mut self,
        path: &str,
        importer: &dyn Importer,
        visited: &mut FxHashSet<String>,
    ) {
        let first_visit = visited.insert(path.to_string());
        let entry = importer.import_resource(path).unwrap_or_else(|error| {
            log::debug!("resource import '{path}' failed: {error}");
            ResourceEntry {
                import_name: path.to_string(),
                library_doc: failed_import_doc(path, &error),
                python_source: None,
            }
        });

        let nested = entry.library_doc.resource_imports.clone();
        if first_visit {
            self.resource_keywords
                .extend(entry.library_doc.keywords.iter().cloned());
        }
        self.resources.insert(entry.key(), entry);

        // Nested imports flatten into the lookup arena only; the entry map
        // stays limited to this document's own import statements. A path
        // already in `visited` is an in-progress cycle and contributes
        // nothing on re-entry.
        if first_visit {
            for nested_path in nested {
                self.flatten_nested_resource(&nested_path, importer, visited);
            }
        }
    }

    fn flatten_nested_resource(
        &mut self,
        path: &str,
        importer: &dyn Importer,
        visited: &mut FxHashSet<String>,
    ) {
        if !visited.insert(path.to_string()) {
            return;
        }
        match importer.import_resource(path) {
            Ok(entry) => {
                self.resource_keywords
                    .extend(entry.library_doc.keywords.iter().cloned());
                for nested_path in &entry.library_doc.resource_imports {
                    self.flatten_nested_resource(nested_path, importer, visited);
                }
            }
            Err(error) => {
                log::debug!("nested resource import '{path}' failed: {error}");
            }
        }
    }

    fn collect_local_keyword(
        &mut self,
        keyword: &robotcode_ast::Keyword,
        libname: &str,
        document_source: Option<&Path>,
    ) {
        let Some(name_token) = keyword.name_token() else {
            return;
        };
        if name_token.value.is_empty() {
            return;
        }

        let argument_values: Vec<String> = keyword
            .body
            .iter()
            .filter_map(|node| match node {
                Node::Arguments(arguments) => Some(arguments),
                _ => None,
            })
            .flat_map(|arguments| {
                arguments
                    .values()
                    .into_iter()
                    .map(|token| token.value.clone())
            })
            .collect();

        let mut doc = KeywordDoc::new(name_token.value.clone(), libname);
        if let Some(source) = document_source {
            #[allow(clippy::cast_possible_wrap)]
            let line_no = name_token.position.line as i32 + 1;
            doc = doc.with_source(source, line_no);
        }
        if !argument_values.is_empty() {
            doc = doc.with_arguments(ArgumentSpec::from_strings(
                argument_values.iter().map(String::as_str),
            ));
        }
        self.local_keywords.push(doc);
    }

    pub fn document_uri(&self) -> &str {
        &self.document_uri
    }

    pub fn document_lines(&self) -> &[String] {
        &self.document_lines
    }

    pub fn get_libraries(&self) -> &IndexMap<ImportKey, LibraryEntry> {
        &self.libraries
    }

    pub fn get_resources(&self) -> &IndexMap<ImportKey, ResourceEntry> {
        &self.resources
    }

    pub fn local_keywords(&self) -> &[KeywordDoc] {
        &self.local_keywords
    }

    pub(crate) fn resource_keywords(&self) -> &[KeywordDoc] {
        &self.resource_keywords
    }

    /// One-shot keyword lookup, discarding the finder diagnostics.
    pub fn find_keyword(&self, name: &str) -> Option<&KeywordDoc> {
        KeywordFinder::new(self).find_keyword(Some(name))
    }
}

fn failed_import_doc(name: &str, error: &ImportError) -> LibraryDoc {
    let mut doc = LibraryDoc::new(name);
    doc.errors.push(KeywordError {
        source: error.path.clone(),
        line_no: error.line_no,
        message: error.message.clone(),
    });
    doc
}

#[cfg(test)]
mod tests;
