//! Resolution of custom instructions into plain instructions.

use serde::{Deserialize, Serialize};

use rc_core::{Instruction, TypeRef};

use crate::error::{ExpandError, ExpandResult};
use crate::query::GameReader;
use crate::registry::Registry;

/// Limits applied by [`Expander`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// How many custom calls may be nested inside one another's expansions
    /// before giving up.
    pub max_depth: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self { max_depth: 8 }
    }
}

/// Expand one invocation of the custom instruction `name`.
///
/// The result is checked with [`Instruction::check`] before it is returned.
/// Errors from the computation are passed through unchanged inside
/// [`ExpandError::Translate`]. Nothing is retried and no fallback is
/// substituted.
pub fn expand(
    name: &str,
    arguments: &[TypeRef],
    game: &dyn GameReader,
    registry: &Registry,
) -> ExpandResult<Instruction> {
    let Some(custom) = registry.get(name) else {
        log::warn!("no custom instruction named {name}");
        return Err(ExpandError::UnknownInstruction { name: name.to_string() });
    };

    let instruction = custom.translate(game, arguments).map_err(|source| {
        log::warn!("custom instruction {name} failed: {source}");
        ExpandError::Translate {
            instruction: name.to_string(),
            arguments: arguments.to_vec(),
            source,
        }
    })?;

    if let Err(reason) = instruction.check() {
        log::warn!("custom instruction {name} returned an invalid instruction: {reason}");
        return Err(ExpandError::InvalidExpansion {
            instruction: name.to_string(),
            arguments: arguments.to_vec(),
            reason,
        });
    }

    log::debug!("expanded {name} to {instruction}");
    Ok(instruction)
}

/// A registry paired with expansion limits.
#[derive(Debug)]
pub struct Expander<'r> {
    registry: &'r Registry,
    config: ExpansionConfig,
}

impl<'r> Expander<'r> {
    /// An expander with the default configuration.
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_config(registry, ExpansionConfig::default())
    }

    /// An expander with explicit limits.
    pub fn with_config(registry: &'r Registry, config: ExpansionConfig) -> Self {
        Self { registry, config }
    }

    /// The limits in effect.
    pub fn config(&self) -> ExpansionConfig {
        self.config
    }

    /// Expand a single invocation. See [`expand`].
    pub fn expand(&self, name: &str, arguments: &[TypeRef], game: &dyn GameReader) -> ExpandResult<Instruction> {
        expand(name, arguments, game, self.registry)
    }

    /// Replace every custom call in `instruction` by its expansion.
    ///
    /// Each expansion is put where its call stood, without flattening into
    /// the surrounding node. Custom calls produced by an expansion are
    /// expanded in turn, up to `max_depth` levels.
    pub fn expand_tree(&self, instruction: &Instruction, game: &dyn GameReader) -> ExpandResult<Instruction> {
        self.splice(instruction, game, 0)
    }

    fn splice(&self, node: &Instruction, game: &dyn GameReader, depth: usize) -> ExpandResult<Instruction> {
        let splice_all = |nodes: &[Instruction]| -> ExpandResult<Vec<Instruction>> {
            nodes.iter().map(|n| self.splice(n, game, depth)).collect()
        };

        Ok(match node {
            Instruction::Primitive(_) => node.clone(),
            Instruction::Sequence(steps) => Instruction::Sequence(splice_all(steps)?),
            Instruction::Alternation(branches) => Instruction::Alternation(splice_all(branches)?),
            Instruction::Conditional(requirement, body) => {
                Instruction::Conditional(requirement.clone(), Box::new(self.splice(body, game, depth)?))
            }
            Instruction::Repetition(count, body) => {
                Instruction::Repetition(*count, Box::new(self.splice(body, game, depth)?))
            }
            Instruction::Custom(call) => {
                if depth >= self.config.max_depth {
                    log::warn!("expansion of {} stopped at depth {depth}", call.name);
                    return Err(ExpandError::ExpansionTooDeep {
                        instruction: call.name.clone(),
                        limit: self.config.max_depth,
                    });
                }
                let expanded = self.expand(&call.name, &call.arguments, game)?;
                self.splice(&expanded, game, depth + 1)?
            }
        })
    }
}
