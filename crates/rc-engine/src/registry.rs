//! Name-keyed lookup of custom instructions.

use std::fmt;

use indexmap::IndexMap;

use crate::custom::CustomInstruction;
use crate::error::{ExpandError, ExpandResult};

/// Custom instructions by name.
///
/// Built once through [`RegistryBuilder`] and read-only afterwards, so a
/// single registry can be shared between threads.
#[derive(Default)]
pub struct Registry {
    entries: IndexMap<String, Box<dyn CustomInstruction>>,
}

impl Registry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Build a registry from a list of instructions, failing on the first
    /// duplicate name.
    pub fn from_instructions<I>(instructions: I) -> ExpandResult<Self>
    where
        I: IntoIterator<Item = Box<dyn CustomInstruction>>,
    {
        let mut builder = Self::builder();
        for instruction in instructions {
            builder.register_boxed(instruction)?;
        }
        Ok(builder.build())
    }

    /// Look up an instruction. Names are case-sensitive.
    pub fn get(&self, name: &str) -> Option<&dyn CustomInstruction> {
        self.entries.get(name).map(|entry| entry.as_ref())
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered instructions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Collects custom instructions during setup.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: IndexMap<String, Box<dyn CustomInstruction>>,
}

impl RegistryBuilder {
    /// Add an instruction under its own name.
    pub fn register(&mut self, instruction: impl CustomInstruction + 'static) -> ExpandResult<()> {
        self.register_boxed(Box::new(instruction))
    }

    /// Add an already boxed instruction.
    pub fn register_boxed(&mut self, instruction: Box<dyn CustomInstruction>) -> ExpandResult<()> {
        let name = instruction.name().to_string();
        if self.entries.contains_key(&name) {
            return Err(ExpandError::DuplicateInstruction { name });
        }
        log::debug!("registering custom instruction {name}");
        self.entries.insert(name, instruction);
        Ok(())
    }

    /// Builder form of [`RegistryBuilder::register`].
    pub fn with(mut self, instruction: impl CustomInstruction + 'static) -> ExpandResult<Self> {
        self.register(instruction)?;
        Ok(self)
    }

    /// Freeze the collected instructions.
    pub fn build(self) -> Registry {
        Registry { entries: self.entries }
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
