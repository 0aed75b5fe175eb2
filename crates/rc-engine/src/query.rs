//! Read-only queries against the game state.

use indexmap::IndexMap;

use rc_core::TypeRef;

/// Levels of each category in a family, keyed by category name in
/// declaration order.
pub type Levels = IndexMap<String, i64>;

/// Read-only view of the game state.
///
/// Custom instructions only ever see a `&dyn GameReader`, so nothing they
/// compute can change the game.
pub trait GameReader {
    /// Every category of `family` in declaration order, e.g. the six
    /// resource kinds of the `Production` family.
    fn categories(&self, family: &str) -> Vec<String>;

    /// The current count of `target`. Anything never set counts as zero.
    fn count(&self, target: &TypeRef) -> i64;
}

/// Current level of every category of the family named by `scope`.
///
/// The level of category `C` is `count(Family<scope args..., C>)`, so a
/// scope of `Production<P1>` looks up `Production<P1, Steel>`,
/// `Production<P1, Heat>` and so on. Categories at level zero are included.
pub fn lookup_levels(game: &dyn GameReader, scope: &TypeRef) -> Levels {
    game.categories(&scope.name)
        .into_iter()
        .map(|category| {
            let target = scope.with_argument(TypeRef::simple(category.as_str()));
            let level = game.count(&target);
            (category, level)
        })
        .collect()
}
