//! Core data structures for fstrgen.
//!
//! A translation unit is distilled into a stream of [`Decl`]s (one per record
//! or enum destined for code generation) and an [`InsertionPlan`] (the
//! byte-offset edit list that splices generated fragments back into the
//! original text). Both are produced by `fstrgen-compiler` and consumed by
//! the splicer and the CLI; nothing in this crate touches the C++ tree.

pub mod decl;
pub mod plan;


pub use decl::{
    Access, Decl, EnumDecl, EnumRepr, Enumerator, MemberOrigin, MemberSpec, RecordDecl, RecordKind,
    TemplateParam, TemplateParamKind,
};
pub use plan::{Edit, InsertionPlan, SpliceError};
