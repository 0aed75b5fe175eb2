//! Core types for the rules-expansion engine: type references and the
//! instruction AST.
//!
//! This crate is independent of the parser. Trees can be built
//! programmatically with the smart constructors on [`Instruction`], and the
//! `Display` impls render the canonical instruction-language text that the
//! parser in `rc-lang` reads back.

/// Well-formedness errors.
pub mod error;
/// The instruction tree and its building blocks.
pub mod instruction;
/// Parameterized type references.
pub mod type_ref;

/// Re-export error types.
pub use error::{CoreResult, MalformedError};
/// Re-export instruction types.
pub use instruction::{
    CustomCall, Effect, Instruction, NodeKind, Primitive, RESERVED_WORDS, Requirement,
    is_identifier,
};
/// Re-export the type reference.
pub use type_ref::TypeRef;
