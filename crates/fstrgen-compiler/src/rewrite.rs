//! Per-translation-unit pipeline: parse, walk, synthesize, plan, splice.
//!
//! A unit either rewrites entirely or not at all; the semantic tree is
//! released before the splicer touches the buffer.

use tracing::debug;

use fstrgen_core::{Decl, InsertionPlan, SpliceError};

use crate::diagnostics::Diagnostics;
use crate::frontend::{CppFrontend, ParseOptions};
use crate::synth;
use crate::walker;

/// Result of rewriting one translation unit.
#[derive(Debug)]
pub struct Rewrite {
    /// The rewritten buffer; identical to the input when nothing needed
    /// generating (including reruns over already-rewritten files).
    pub output: String,
    pub changed: bool,
    /// The declaration records that produced fragments, in source order.
    pub decls: Vec<Decl>,
    /// Warnings from the walker (skipped members and declarations).
    pub diagnostics: Diagnostics,
}

/// Failures that leave the file untouched.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("parse failed with {} syntax error(s)", .diagnostics.len())]
    Parse { diagnostics: Diagnostics },
    #[error("internal invariant violated: {0}")]
    Splice(#[from] SpliceError),
}

/// Run the full pipeline over one buffered translation unit.
///
/// `path` is the file's name as given on the command line; it keys the
/// insertion plan and appears in anonymous-aggregate markers.
pub fn rewrite(source: &str, path: &str, options: ParseOptions) -> Result<Rewrite, RewriteError> {
    let frontend = CppFrontend::new();
    let unit = frontend.parse(source, options);
    if !unit.is_valid() {
        return Err(RewriteError::Parse {
            diagnostics: unit.diagnostics,
        });
    }

    let walked = walker::walk(&unit.tree, source, path);
    debug!(path, decls = walked.decls.len(), "collected declarations");
    // The tree holds the grammar alive; release it before splicing.
    drop(unit);

    let mut plan = InsertionPlan::new();
    for decl in &walked.decls {
        let mut text = synth::fragment(decl);
        if decl.insert_at() == source.len() && !source.ends_with('\n') {
            text.insert(0, '\n');
        }
        plan.push(path, decl.insert_at(), decl.depth(), text);
    }

    let output = plan.splice(path, source)?;
    Ok(Rewrite {
        changed: output != source,
        output,
        decls: walked.decls,
        diagnostics: walked.diagnostics,
    })
}
