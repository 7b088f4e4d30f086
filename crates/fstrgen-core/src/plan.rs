//! Insertion plans: the byte-offset edit list for rewritten files.
//!
//! Fragments are applied in a single reverse-ordered pass so that earlier
//! offsets stay valid while later ones are spliced. Every byte of the input
//! outside an inserted fragment appears unchanged in the output.

use indexmap::IndexMap;
use serde::Serialize;

/// One fragment to splice at a byte offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub offset: usize,
    /// Lexical nesting depth of the originating declaration. When two edits
    /// share an offset, the deeper declaration's fragment ends up first in
    /// the output.
    pub depth: usize,
    pub text: String,
}

/// Violations of the plan invariants. These indicate a walker bug; the
/// runner reports them and leaves the file untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpliceError {
    #[error("insertion offset {offset} outside source of length {len}")]
    OffsetOutOfBounds { offset: usize, len: usize },
    #[error("insertion offset {offset} not on a character boundary")]
    NotCharBoundary { offset: usize },
}

/// Mapping from source file path to its ordered edits.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InsertionPlan {
    files: IndexMap<String, Vec<Edit>>,
}

impl InsertionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, file: impl Into<String>, offset: usize, depth: usize, text: String) {
        self.files.entry(file.into()).or_default().push(Edit {
            offset,
            depth,
            text,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.files.values().all(|edits| edits.is_empty())
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn edits(&self, file: &str) -> &[Edit] {
        self.files.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Splice this plan's fragments for `file` into `source`.
    ///
    /// Edits are ordered by offset, ties broken deeper-first then emission
    /// order, and applied back to front so no offset adjustment is needed.
    pub fn splice(&self, file: &str, source: &str) -> Result<String, SpliceError> {
        let edits = self.edits(file);
        for edit in edits {
            if edit.offset > source.len() {
                return Err(SpliceError::OffsetOutOfBounds {
                    offset: edit.offset,
                    len: source.len(),
                });
            }
            if !source.is_char_boundary(edit.offset) {
                return Err(SpliceError::NotCharBoundary {
                    offset: edit.offset,
                });
            }
        }

        let mut order: Vec<usize> = (0..edits.len()).collect();
        order.sort_by(|&a, &b| {
            edits[a]
                .offset
                .cmp(&edits[b].offset)
                .then(edits[b].depth.cmp(&edits[a].depth))
                .then(a.cmp(&b))
        });

        let mut out = source.to_string();
        for &idx in order.iter().rev() {
            let edit = &edits[idx];
            out.insert_str(edit.offset, &edit.text);
        }
        Ok(out)
    }
}
