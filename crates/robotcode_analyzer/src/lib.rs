//! Semantic analysis of one parsed suite against its [`Namespace`].
//!
//! The [`Analyzer`] walks the suite tree, resolves every keyword invocation
//! (including the calls hidden inside BuiltIn's run-keyword wrappers),
//! validates argument bindings and emits LSP diagnostics in source order.
//! Diagnostics covered by a `# robotcode: ignore` pragma are dropped before
//! they reach the result list.
//!
//! [`Namespace`]: robotcode_namespace::Namespace

mod analyzer;
mod cancellation;

pub use analyzer::Analyzer;
pub use cancellation::{Cancelled, CancellationToken};

use thiserror::Error;

/// Failure of an analysis pass as a whole.
///
/// Recoverable per-keyword problems become diagnostics instead; only
/// cancellation aborts the pass and discards the partial result list.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}
