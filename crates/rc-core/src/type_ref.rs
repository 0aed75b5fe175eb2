use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, MalformedError};
use crate::instruction::is_identifier;

/// A parameterized entity name, e.g. `Heat`, `Heat<Player1>` or
/// `Production<Player1, Steel>`.
///
/// Equality and hashing are structural. Argument order is significant; the
/// arity of a given name is fixed by whatever schema the game uses, not by
/// this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeRef {
    /// The class name being referenced.
    pub name: String,
    /// Ordered type arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<TypeRef>,
}

impl TypeRef {
    /// Create a reference with explicit arguments.
    pub fn new(name: impl Into<String>, arguments: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Create a reference with no arguments.
    pub fn simple(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Create a reference with a single scoping argument, e.g. `Heat<Player1>`.
    pub fn scoped(name: impl Into<String>, scope: TypeRef) -> Self {
        Self::new(name, vec![scope])
    }

    /// Returns a copy with `argument` appended to the argument list.
    pub fn with_argument(&self, argument: TypeRef) -> Self {
        let mut arguments = self.arguments.clone();
        arguments.push(argument);
        Self::new(self.name.clone(), arguments)
    }

    /// Fails with [`MalformedError::InvalidIdentifier`] naming the first
    /// name, depth-first, that is not a usable identifier.
    pub fn check(&self) -> CoreResult<()> {
        match self.walk().into_iter().find(|t| !is_identifier(&t.name)) {
            Some(bad) => Err(MalformedError::InvalidIdentifier(bad.name.clone())),
            None => Ok(()),
        }
    }

    /// Walk this reference and its arguments depth-first.
    pub fn walk(&self) -> Vec<&TypeRef> {
        let mut out = vec![self];
        for arg in &self.arguments {
            out.extend(arg.walk());
        }
        out
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.arguments.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.arguments.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::simple(name)
    }
}
