//! Error types for the expansion engine.

use std::path::PathBuf;

use rc_core::{CustomCall, MalformedError, TypeRef};
use rc_lang::ParseError;

/// Errors raised by a custom instruction's own computation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum TranslateError {
    /// The computation was called with the wrong number of arguments.
    #[error("expected {expected} argument(s) but got {found}")]
    #[diagnostic(code(rc_engine::arity))]
    Arity {
        /// How many arguments the computation takes.
        expected: usize,
        /// How many it was given.
        found: usize,
    },

    /// There was nothing to choose among.
    #[error("no categories found for {scope}")]
    #[diagnostic(
        code(rc_engine::empty_domain),
        help("the game state must declare at least one category for this family")
    )]
    EmptyDomain {
        /// The scope whose category set was empty.
        scope: TypeRef,
    },

    /// Text generated by the computation did not parse.
    #[error("generated text {text:?} did not parse: {source}")]
    #[diagnostic(code(rc_engine::generated_text))]
    Parse {
        /// The generated text.
        text: String,
        /// The parser's complaint.
        #[source]
        #[diagnostic_source]
        source: ParseError,
    },

    /// The computation would build an instruction from names that are not
    /// identifiers.
    #[error("cannot build an instruction: {0}")]
    #[diagnostic(code(rc_engine::malformed))]
    Malformed(#[from] MalformedError),

    /// The computation implements neither `translate` nor `translate_to_text`.
    #[error("custom instruction does not provide a translation")]
    #[diagnostic(code(rc_engine::unsupported))]
    Unsupported,

    /// The computation refused its arguments for a game-specific reason.
    #[error("{0}")]
    #[diagnostic(code(rc_engine::rejected))]
    Rejected(String),
}

/// Errors raised while resolving custom instructions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum ExpandError {
    /// No custom instruction is registered under this name.
    #[error("unknown custom instruction: \"{name}\"")]
    #[diagnostic(code(rc_engine::unknown_instruction))]
    UnknownInstruction {
        /// The name that was looked up.
        name: String,
    },

    /// The computation failed. Its error is passed through unchanged.
    #[error("custom instruction {} failed: {source}", call_text(.instruction, .arguments))]
    #[diagnostic(code(rc_engine::translate))]
    Translate {
        /// Name of the invoked custom instruction.
        instruction: String,
        /// The arguments it was invoked with.
        arguments: Vec<TypeRef>,
        /// What the computation reported.
        #[source]
        #[diagnostic_source]
        source: TranslateError,
    },

    /// The computation returned a malformed instruction.
    #[error(
        "custom instruction {} returned an invalid instruction: {reason}",
        call_text(.instruction, .arguments)
    )]
    #[diagnostic(code(rc_engine::invalid_expansion))]
    InvalidExpansion {
        /// Name of the invoked custom instruction.
        instruction: String,
        /// The arguments it was invoked with.
        arguments: Vec<TypeRef>,
        /// What is wrong with the returned tree.
        #[source]
        reason: MalformedError,
    },

    /// Two custom instructions were registered under one name.
    #[error("custom instruction already registered: \"{name}\"")]
    #[diagnostic(code(rc_engine::duplicate_instruction))]
    DuplicateInstruction {
        /// The contested name.
        name: String,
    },

    /// Expansions kept producing further custom calls.
    #[error("expanding \"{instruction}\" exceeded the depth limit of {limit}")]
    #[diagnostic(
        code(rc_engine::too_deep),
        help("a custom instruction probably expands to a call of itself")
    )]
    ExpansionTooDeep {
        /// The call that would have gone past the limit.
        instruction: String,
        /// The configured limit.
        limit: usize,
    },
}

/// `@name(Arg, ...)`, as the call would be written.
fn call_text(name: &str, arguments: &[TypeRef]) -> String {
    CustomCall {
        name: name.to_string(),
        arguments: arguments.to_vec(),
    }
    .to_string()
}

impl ExpandError {
    /// The computation error behind a [`ExpandError::Translate`], if any.
    pub fn translate_error(&self) -> Option<&TranslateError> {
        match self {
            Self::Translate { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors raised while loading a game-state fixture.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum StateError {
    /// The file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    #[diagnostic(code(rc_engine::state_io))]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The JSON was malformed or had the wrong shape.
    #[error("invalid game state JSON: {0}")]
    #[diagnostic(code(rc_engine::state_json))]
    Json(#[from] serde_json::Error),

    /// A family or category name is not an identifier.
    #[error("invalid category name {name:?} in family {family:?}")]
    #[diagnostic(
        code(rc_engine::state_category),
        help("category names become type names and must not be reserved words")
    )]
    InvalidCategory {
        /// The family being declared.
        family: String,
        /// The offending name.
        name: String,
    },

    /// A level key is not a valid type reference.
    #[error("invalid type reference {key:?} in game state: {source}")]
    #[diagnostic(code(rc_engine::state_key))]
    InvalidKey {
        /// The offending key.
        key: String,
        /// Why it did not parse.
        source: ParseError,
    },
}

/// Convenience result type for custom computations.
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Convenience result type for expansion.
pub type ExpandResult<T> = Result<T, ExpandError>;

/// Convenience result type for game-state loading.
pub type StateResult<T> = Result<T, StateError>;
