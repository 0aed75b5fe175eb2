//! Custom-instruction expansion for the rules engine.
//!
//! A game registers named computations ([`CustomInstruction`]) once at
//! startup. When an instruction tree contains a call such as
//! `@gainLowestProduction(Player1)`, the driver looks the name up, hands
//! the computation a read-only [`GameReader`], and checks that what comes
//! back is a well-formed [`Instruction`].

pub mod canon;
pub mod custom;
pub mod driver;
pub mod error;
pub mod query;
pub mod registry;
pub mod state;

pub use canon::{GainLowestProduction, lowest_production_options};
pub use custom::{CustomInstruction, FnInstruction, expect_arity, from_fn, single_argument};
pub use driver::{Expander, ExpansionConfig, expand};
pub use error::{ExpandError, ExpandResult, StateError, StateResult, TranslateError, TranslateResult};
pub use query::{GameReader, Levels, lookup_levels};
pub use registry::{Registry, RegistryBuilder};
pub use state::GameState;

pub use rc_core::{Instruction, TypeRef};
