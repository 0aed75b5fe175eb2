//! Custom instructions every game built on this engine ships with.

use rc_core::{Instruction, MalformedError, TypeRef, is_identifier};

use crate::custom::{CustomInstruction, single_argument};
use crate::error::{ExpandResult, TranslateError, TranslateResult};
use crate::query::{GameReader, Levels, lookup_levels};
use crate::registry::Registry;

/// Family whose categories are compared by [`GainLowestProduction`].
pub const PRODUCTION: &str = "Production";

/// `@gainLowestProduction(Player)`: gain one of whichever production
/// categories the player currently has least of.
///
/// Every category tied at the minimum is offered, in declaration order, as
/// an alternation. A unique minimum yields the bare primitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct GainLowestProduction;

impl GainLowestProduction {
    /// Registry name.
    pub const NAME: &'static str = "gainLowestProduction";
}

/// Names of the categories tied at the lowest level, in declaration order.
fn lowest(levels: &Levels, scope: &TypeRef) -> TranslateResult<Vec<String>> {
    let Some(min) = levels.values().copied().min() else {
        return Err(TranslateError::EmptyDomain { scope: scope.clone() });
    };
    Ok(levels
        .iter()
        .filter(|&(_, &level)| level == min)
        .map(|(category, _)| category.clone())
        .collect())
}

/// The player argument and the tied categories, all checked to be usable
/// as type names so the text and direct paths fail alike.
fn lowest_for_player(game: &dyn GameReader, arguments: &[TypeRef]) -> TranslateResult<(TypeRef, Vec<String>)> {
    let player = single_argument(arguments)?;
    player.check()?;
    let scope = TypeRef::scoped(PRODUCTION, player.clone());
    let levels = lookup_levels(game, &scope);
    let tied = lowest(&levels, &scope)?;
    if let Some(bad) = tied.iter().find(|category| !is_identifier(category)) {
        return Err(MalformedError::InvalidIdentifier(bad.clone()).into());
    }
    Ok((player.clone(), tied))
}

impl CustomInstruction for GainLowestProduction {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn translate_to_text(&self, game: &dyn GameReader, arguments: &[TypeRef]) -> TranslateResult<String> {
        let (player, tied) = lowest_for_player(game, arguments)?;
        Ok(tied
            .iter()
            .map(|category| format!("{category}<{player}>"))
            .collect::<Vec<_>>()
            .join(" OR "))
    }
}

/// The same choice as [`GainLowestProduction`], built without going
/// through text.
pub fn lowest_production_options(game: &dyn GameReader, arguments: &[TypeRef]) -> TranslateResult<Instruction> {
    let (player, tied) = lowest_for_player(game, arguments)?;
    let branches = tied
        .into_iter()
        .map(|category| Instruction::gain(TypeRef::scoped(category, player.clone())))
        .collect();
    let options = Instruction::alternation(branches);
    options.check()?;
    Ok(options)
}

/// A registry holding every built-in custom instruction.
pub fn registry() -> ExpandResult<Registry> {
    Ok(Registry::builder().with(GainLowestProduction)?.build())
}
