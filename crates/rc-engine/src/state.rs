//! A concrete, mutable game state with JSON fixtures.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use rc_core::{TypeRef, is_identifier};

use crate::error::{StateError, StateResult};
use crate::query::GameReader;

/// In-memory game state: declared category families plus counts.
///
/// This is the mutable side of [`GameReader`]. Hosts own it and hand custom
/// instructions a shared reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    categories: IndexMap<String, Vec<String>>,
    levels: HashMap<TypeRef, i64>,
}

/// On-disk shape of a game state.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawGameState {
    #[serde(default)]
    categories: IndexMap<String, Vec<String>>,
    #[serde(default)]
    levels: BTreeMap<String, i64>,
}

impl GameState {
    /// An empty state with no categories and every count at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the categories of `family`, replacing any earlier declaration.
    ///
    /// The family and every category must be identifiers, since they end up
    /// as type names in generated instruction text.
    pub fn declare_category<I, S>(&mut self, family: impl Into<String>, categories: I) -> StateResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let family = family.into();
        let categories: Vec<String> = categories.into_iter().map(Into::into).collect();
        check_names(&family, &categories)?;
        self.categories.insert(family, categories);
        Ok(())
    }

    /// Builder form of [`GameState::declare_category`].
    pub fn with_categories<I, S>(mut self, family: impl Into<String>, categories: I) -> StateResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declare_category(family, categories)?;
        Ok(self)
    }

    /// Set the count of `target`.
    pub fn set(&mut self, target: TypeRef, value: i64) {
        self.levels.insert(target, value);
    }

    /// Parse a state from JSON.
    ///
    /// ```json
    /// {
    ///   "categories": { "Production": ["Steel", "Titanium"] },
    ///   "levels": { "Production<P1, Steel>": 2 }
    /// }
    /// ```
    pub fn from_json(json: &str) -> StateResult<Self> {
        let raw: RawGameState = serde_json::from_str(json)?;
        for (family, categories) in &raw.categories {
            check_names(family, categories)?;
        }

        let mut levels = HashMap::with_capacity(raw.levels.len());
        for (key, value) in raw.levels {
            let target = match rc_lang::parse_type_ref(&key) {
                Ok(target) => target,
                Err(source) => return Err(StateError::InvalidKey { key, source }),
            };
            levels.insert(target, value);
        }

        Ok(Self {
            categories: raw.categories,
            levels,
        })
    }

    /// Read and parse a JSON state file.
    pub fn from_path(path: impl AsRef<Path>) -> StateResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| StateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded game state from {}", path.display());
        Self::from_json(&json)
    }

    /// Serialize to the JSON shape accepted by [`GameState::from_json`].
    /// Level keys come out sorted.
    pub fn to_json(&self) -> StateResult<String> {
        let raw = RawGameState {
            categories: self.categories.clone(),
            levels: self
                .levels
                .iter()
                .map(|(target, value)| (target.to_string(), *value))
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&raw)?)
    }
}

fn check_names(family: &str, categories: &[String]) -> StateResult<()> {
    let bad = std::iter::once(family)
        .chain(categories.iter().map(String::as_str))
        .find(|name| !is_identifier(name));
    match bad {
        Some(name) => Err(StateError::InvalidCategory {
            family: family.to_string(),
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

impl GameReader for GameState {
    fn categories(&self, family: &str) -> Vec<String> {
        self.categories.get(family).cloned().unwrap_or_default()
    }

    fn count(&self, target: &TypeRef) -> i64 {
        self.levels.get(target).copied().unwrap_or(0)
    }
}
