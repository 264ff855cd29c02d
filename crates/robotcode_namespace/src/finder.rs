use itertools::Itertools;
use rustc_hash::FxHashMap;

use robotcode_library_doc::KeywordDoc;
use robotcode_lsp_types::DiagnosticSeverity;

use crate::{Namespace, KEYWORD_MULTIPLE_CODE, KEYWORD_NOT_FOUND_CODE};

/// A diagnostic collected during one lookup, positioned later by the
/// caller (the finder has no view of the call site).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderDiagnostic {
    pub message: String,
    pub severity: DiagnosticSeverity,
    pub code: Option<String>,
}

#[derive(Clone)]
struct CachedLookup<'a> {
    doc: Option<&'a KeywordDoc>,
    diagnostics: Vec<FinderDiagnostic>,
}

/// Keyword lookup over one [`Namespace`] with shadowing precedence.
///
/// Resolution order: the suite's own keywords, then keywords from imported
/// resources in declaration order (nested resources flattened), then
/// imported libraries in declaration order with BuiltIn implicitly last.
/// Within a scope group an exact case-insensitive match beats an
/// embedded-argument match; several equal-rank matches keep the first and
/// report an ambiguity.
///
/// The `diagnostics` buffer is reset on every call; lookups are cached, so
/// repeated queries for the same name return the same keyword and re-emit
/// the same diagnostics.
pub struct KeywordFinder<'a> {
    namespace: &'a Namespace,
    pub diagnostics: Vec<FinderDiagnostic>,
    cache: FxHashMap<String, CachedLookup<'a>>,
}

impl<'a> KeywordFinder<'a> {
    pub fn new(namespace: &'a Namespace) -> Self {
        Self {
            namespace,
            diagnostics: Vec::new(),
            cache: FxHashMap::default(),
        }
    }

    pub fn find_keyword(&mut self, name: Option<&str>) -> Option<&'a KeywordDoc> {
        self.diagnostics.clear();

        let name = name?.trim();
        if name.is_empty() {
            return None;
        }

        if let Some(cached) = self.cache.get(name).cloned() {
            self.diagnostics = cached.diagnostics;
            return cached.doc;
        }

        let mut diagnostics = Vec::new();
        let doc = self.lookup(name, &mut diagnostics);
        log::trace!("find_keyword({name:?}) -> {:?}", doc.map(|doc| &doc.name));

        self.cache.insert(
            name.to_string(),
            CachedLookup {
                doc,
                diagnostics: diagnostics.clone(),
            },
        );
        self.diagnostics = diagnostics;
        doc
    }

    fn lookup(&self, name: &str, diagnostics: &mut Vec<FinderDiagnostic>) -> Option<&'a KeywordDoc> {
        if name.contains('.') {
            if let Some(found) = self.lookup_qualified(name, diagnostics) {
                return Some(found);
            }
            if !diagnostics.is_empty() {
                return None;
            }
        }

        match self.lookup_plain(name, diagnostics) {
            Some(found) => Some(found),
            None => {
                diagnostics.push(FinderDiagnostic {
                    message: format!("Keyword '{name}' not found."),
                    severity: DiagnosticSeverity::Error,
                    code: Some(KEYWORD_NOT_FOUND_CODE.to_string()),
                });
                None
            }
        }
    }

    /// Resolve `Owner.Keyword`; the longest owner prefix naming a known
    /// library alias or resource wins. `None` with untouched diagnostics
    /// means no owner matched and the dotted string is a plain name.
    fn lookup_qualified(
        &self,
        name: &str,
        diagnostics: &mut Vec<FinderDiagnostic>,
    ) -> Option<&'a KeywordDoc> {
        for (split, _) in name.char_indices().filter(|&(_, c)| c == '.').collect::<Vec<_>>().into_iter().rev()
        {
            let (owner, rest) = name.split_at(split);
            let keyword_name = &rest[1..];
            if keyword_name.is_empty() {
                continue;
            }

            let mut scope: Vec<&'a KeywordDoc> = Vec::new();
            for entry in self.namespace.get_resources().values() {
                if entry.scope_name().eq_ignore_ascii_case(owner) {
                    scope.extend(
                        self.namespace
                            .resource_keywords()
                            .iter()
                            .filter(|doc| doc.libname == entry.scope_name()),
                    );
                }
            }
            for entry in self.namespace.get_libraries().values() {
                if entry.scope_name().eq_ignore_ascii_case(owner) {
                    scope.extend(entry.library_doc.keywords.iter());
                }
            }
            if scope.is_empty() {
                continue;
            }
            return self.best_match(keyword_name, &scope, diagnostics);
        }
        None
    }

    fn lookup_plain(
        &self,
        name: &str,
        diagnostics: &mut Vec<FinderDiagnostic>,
    ) -> Option<&'a KeywordDoc> {
        let locals: Vec<&'a KeywordDoc> = self.namespace.local_keywords().iter().collect();
        if let Some(found) = self.best_match(name, &locals, diagnostics) {
            return Some(found);
        }

        let resources: Vec<&'a KeywordDoc> = self.namespace.resource_keywords().iter().collect();
        if let Some(found) = self.best_match(name, &resources, diagnostics) {
            return Some(found);
        }

        let libraries: Vec<&'a KeywordDoc> = self
            .namespace
            .get_libraries()
            .values()
            .flat_map(|entry| entry.library_doc.keywords.iter())
            .collect();
        self.best_match(name, &libraries, diagnostics)
    }

    /// Exact-then-embedded match within one scope group, reporting an
    /// ambiguity when the group has several candidates of the same rank.
    fn best_match(
        &self,
        name: &str,
        scope: &[&'a KeywordDoc],
        diagnostics: &mut Vec<FinderDiagnostic>,
    ) -> Option<&'a KeywordDoc> {
        let exact: Vec<&'a KeywordDoc> = scope
            .iter()
            .filter(|doc| doc.embedded().is_none() && doc.name.eq_ignore_ascii_case(name))
            .copied()
            .collect();
        let matches = if exact.is_empty() {
            scope
                .iter()
                .filter(|doc| doc.embedded().is_some_and(|embedded| embedded.matches(name)))
                .copied()
                .collect()
        } else {
            exact
        };

        if matches.len() > 1 {
            let candidates = matches
                .iter()
                .map(|doc| {
                    if doc.libname.is_empty() {
                        doc.name.clone()
                    } else {
                        format!("{}.{}", doc.libname, doc.name)
                    }
                })
                .join("\n    ");
            diagnostics.push(FinderDiagnostic {
                message: format!(
                    "Multiple keywords with name '{name}' found. \
                     Give the full name of the keyword you want to use:\n    {candidates}"
                ),
                severity: DiagnosticSeverity::Error,
                code: Some(KEYWORD_MULTIPLE_CODE.to_string()),
            });
        }

        matches.first().copied()
    }
}
