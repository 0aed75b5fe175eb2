//! The contract every custom instruction implements.
//!
//! A custom instruction is a named computation that reads the game state and
//! produces an ordinary [`Instruction`]. It can build the tree directly by
//! overriding [`CustomInstruction::translate`], or emit instruction-language
//! text by overriding [`CustomInstruction::translate_to_text`] and let the
//! default `translate` run it through the public parser.

use std::fmt;

use rc_core::{Instruction, TypeRef};

use crate::error::{TranslateError, TranslateResult};
use crate::query::GameReader;

/// A named computation that expands to a plain instruction.
///
/// Implementations must override at least one of `translate` and
/// `translate_to_text`.
pub trait CustomInstruction: Send + Sync {
    /// The name used to invoke this instruction, e.g. `gainLowestProduction`.
    fn name(&self) -> &str;

    /// Expand into an instruction tree.
    fn translate(&self, game: &dyn GameReader, arguments: &[TypeRef]) -> TranslateResult<Instruction> {
        let text = self.translate_to_text(game, arguments)?;
        rc_lang::parse_instruction(&text).map_err(|source| TranslateError::Parse { text, source })
    }

    /// Expand into instruction-language text.
    fn translate_to_text(&self, _game: &dyn GameReader, _arguments: &[TypeRef]) -> TranslateResult<String> {
        Err(TranslateError::Unsupported)
    }
}

/// Fail with [`TranslateError::Arity`] unless exactly `expected` arguments
/// were given.
pub fn expect_arity(arguments: &[TypeRef], expected: usize) -> TranslateResult<()> {
    if arguments.len() == expected {
        Ok(())
    } else {
        Err(TranslateError::Arity {
            expected,
            found: arguments.len(),
        })
    }
}

/// The only argument, or [`TranslateError::Arity`].
pub fn single_argument(arguments: &[TypeRef]) -> TranslateResult<&TypeRef> {
    match arguments {
        [only] => Ok(only),
        _ => Err(TranslateError::Arity {
            expected: 1,
            found: arguments.len(),
        }),
    }
}

type TranslateFn = dyn Fn(&dyn GameReader, &[TypeRef]) -> TranslateResult<Instruction> + Send + Sync;

/// A custom instruction backed by a closure.
pub struct FnInstruction {
    name: String,
    f: Box<TranslateFn>,
}

impl FnInstruction {
    /// Wrap `f` as the custom instruction `name`.
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&dyn GameReader, &[TypeRef]) -> TranslateResult<Instruction> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Box::new(f),
        }
    }
}

impl fmt::Debug for FnInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInstruction").field("name", &self.name).finish_non_exhaustive()
    }
}

impl CustomInstruction for FnInstruction {
    fn name(&self) -> &str {
        &self.name
    }

    fn translate(&self, game: &dyn GameReader, arguments: &[TypeRef]) -> TranslateResult<Instruction> {
        (self.f)(game, arguments)
    }
}

/// Shorthand for [`FnInstruction::new`].
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnInstruction
where
    F: Fn(&dyn GameReader, &[TypeRef]) -> TranslateResult<Instruction> + Send + Sync + 'static,
{
    FnInstruction::new(name, f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GameState;

    struct Echo;

    impl CustomInstruction for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn translate_to_text(&self, _game: &dyn GameReader, arguments: &[TypeRef]) -> TranslateResult<String> {
            Ok(single_argument(arguments)?.to_string())
        }
    }

    struct Garbled;

    impl CustomInstruction for Garbled {
        fn name(&self) -> &str {
            "garbled"
        }

        fn translate_to_text(&self, _game: &dyn GameReader, _arguments: &[TypeRef]) -> TranslateResult<String> {
            Ok("Heat<P1> OR".into())
        }
    }

    struct Silent;

    impl CustomInstruction for Silent {
        fn name(&self) -> &str {
            "silent"
        }
    }

    #[test]
    fn text_is_parsed_by_default() {
        let game = GameState::new();
        let out = Echo.translate(&game, &["Heat".into()]).unwrap();
        assert_eq!(out, Instruction::gain("Heat".into()));
    }

    #[test]
    fn unparsable_text_keeps_the_text() {
        let game = GameState::new();
        let err = Garbled.translate(&game, &[]).unwrap_err();
        match err {
            TranslateError::Parse { text, source } => {
                assert_eq!(text, "Heat<P1> OR");
                assert!(source.is_syntax());
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn neither_override_is_unsupported() {
        let game = GameState::new();
        assert_eq!(Silent.translate(&game, &[]), Err(TranslateError::Unsupported));
    }

    #[test]
    fn arity_helpers() {
        let args: Vec<TypeRef> = vec!["P1".into(), "P2".into()];
        assert_eq!(expect_arity(&args, 2), Ok(()));
        assert_eq!(
            expect_arity(&args, 1),
            Err(TranslateError::Arity { expected: 1, found: 2 })
        );
        assert_eq!(
            single_argument(&[]),
            Err(TranslateError::Arity { expected: 1, found: 0 })
        );
        assert_eq!(single_argument(&args[..1]), Ok(&args[0]));
    }

    #[test]
    fn closures_are_custom_instructions() {
        let double = from_fn("double", |_game, args| {
            let target = single_argument(args)?;
            Ok(Instruction::repetition(2, Instruction::gain(target.clone())))
        });
        assert_eq!(double.name(), "double");
        let out = double.translate(&GameState::new(), &["Plant".into()]).unwrap();
        assert_eq!(out.to_string(), "2 * Plant");
    }
}
