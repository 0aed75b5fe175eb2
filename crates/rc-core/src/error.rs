use crate::instruction::Effect;
use crate::type_ref::TypeRef;

/// Alias for `Result<T, MalformedError>`.
pub type CoreResult<T> = Result<T, MalformedError>;

/// Ways an instruction tree can fail its well-formedness check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedError {
    /// An alternation with nothing to choose from.
    #[error("alternation has no branches")]
    EmptyAlternation,

    /// A sequence with no steps.
    #[error("sequence has no steps")]
    EmptySequence,

    /// A primitive whose explicit quantity is zero.
    #[error("cannot {effect} zero {target}")]
    ZeroQuantity {
        /// Gain or remove.
        effect: Effect,
        /// The type that would have been affected.
        target: TypeRef,
    },

    /// A repetition whose count is zero.
    #[error("cannot repeat an instruction zero times")]
    ZeroRepetition,

    /// A class or custom-instruction name that is not a valid identifier.
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
}
