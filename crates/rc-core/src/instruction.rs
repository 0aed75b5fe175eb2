use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, MalformedError};
use crate::type_ref::TypeRef;

/// Words the instruction language reserves for its own operators.
pub const RESERVED_WORDS: &[&str] = &["OR", "THEN", "MAX"];

/// Returns true if `name` is usable as a class or custom-instruction name.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    starts_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !RESERVED_WORDS.contains(&name)
}

/// What a primitive instruction does to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Add components of the target type.
    Gain,
    /// Take components of the target type away (written with a leading `-`).
    Remove,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gain => write!(f, "gain"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// A single gain or remove of some type, e.g. `2 Heat<Player1>` or `-Steel<Player1>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Primitive {
    /// Gain or remove.
    pub effect: Effect,
    /// The type being gained or removed.
    pub target: TypeRef,
    /// Explicit quantity. `None` means the text carried no number (an implied one).
    pub quantity: Option<u32>,
}

/// Invocation of a registered custom instruction, e.g. `@gainLowestProduction(Player1)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomCall {
    /// Registry name of the custom instruction.
    pub name: String,
    /// Ordered arguments passed to the computation.
    pub arguments: Vec<TypeRef>,
}

/// The predicate guarding a conditional instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    /// At least `count` of `target` (`3 Plant<Player1>`, or bare `Plant<Player1>` for one).
    Min {
        /// Threshold, inclusive.
        count: u32,
        /// The counted type.
        target: TypeRef,
    },
    /// At most `count` of `target` (`MAX 3 Plant<Player1>`).
    Max {
        /// Threshold, inclusive.
        count: u32,
        /// The counted type.
        target: TypeRef,
    },
    /// Exactly `count` of `target` (`=3 Plant<Player1>`).
    Exact {
        /// Required count.
        count: u32,
        /// The counted type.
        target: TypeRef,
    },
}

impl Requirement {
    /// The type this predicate counts.
    pub fn target(&self) -> &TypeRef {
        match self {
            Self::Min { target, .. } | Self::Max { target, .. } | Self::Exact { target, .. } => {
                target
            }
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Min { count: 1, target } => write!(f, "{target}"),
            Self::Min { count, target } => write!(f, "{count} {target}"),
            Self::Max { count, target } => write!(f, "MAX {count} {target}"),
            Self::Exact { count, target } => write!(f, "={count} {target}"),
        }
    }
}

/// The shape of an instruction node, used to constrain what a parse may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// [`Instruction::Primitive`].
    Primitive,
    /// [`Instruction::Sequence`].
    Sequence,
    /// [`Instruction::Alternation`].
    Alternation,
    /// [`Instruction::Conditional`].
    Conditional,
    /// [`Instruction::Repetition`].
    Repetition,
    /// [`Instruction::Custom`].
    Custom,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Primitive => "primitive",
            Self::Sequence => "sequence",
            Self::Alternation => "alternation",
            Self::Conditional => "conditional",
            Self::Repetition => "repetition",
            Self::Custom => "custom instruction",
        };
        write!(f, "{name}")
    }
}

/// A game effect in structured form.
///
/// Trees are immutable once built. Parsing the same text twice yields two
/// structurally equal trees; nothing is shared between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    /// Gain or remove some quantity of a type.
    Primitive(Primitive),
    /// Steps performed in order (`A THEN B`).
    Sequence(Vec<Instruction>),
    /// The player picks exactly one branch (`A OR B`). Order is presentation
    /// order only.
    Alternation(Vec<Instruction>),
    /// Perform the body only if the requirement holds (`3 Plant<P1>: Heat<P1>`).
    Conditional(Requirement, Box<Instruction>),
    /// Perform the body `count` times (`2 * Heat<P1>`).
    Repetition(u32, Box<Instruction>),
    /// A not-yet-expanded call to a registered custom instruction.
    Custom(CustomCall),
}

impl Instruction {
    /// Gain one (implied) of `target`.
    pub fn gain(target: TypeRef) -> Self {
        Self::Primitive(Primitive {
            effect: Effect::Gain,
            target,
            quantity: None,
        })
    }

    /// Remove one (implied) of `target`.
    pub fn remove(target: TypeRef) -> Self {
        Self::Primitive(Primitive {
            effect: Effect::Remove,
            target,
            quantity: None,
        })
    }

    /// A primitive with an explicit quantity.
    pub fn primitive(effect: Effect, target: TypeRef, quantity: Option<u32>) -> Self {
        Self::Primitive(Primitive {
            effect,
            target,
            quantity,
        })
    }

    /// Build a choice between `branches`. A single branch is returned bare,
    /// never wrapped in a one-element alternation.
    pub fn alternation(mut branches: Vec<Instruction>) -> Self {
        if branches.len() == 1 {
            branches.remove(0)
        } else {
            Self::Alternation(branches)
        }
    }

    /// Build an ordered sequence. A single step is returned bare.
    pub fn sequence(mut steps: Vec<Instruction>) -> Self {
        if steps.len() == 1 {
            steps.remove(0)
        } else {
            Self::Sequence(steps)
        }
    }

    /// Guard `body` with `requirement`.
    pub fn conditional(requirement: Requirement, body: Instruction) -> Self {
        Self::Conditional(requirement, Box::new(body))
    }

    /// Repeat `body` `count` times.
    pub fn repetition(count: u32, body: Instruction) -> Self {
        Self::Repetition(count, Box::new(body))
    }

    /// A call to the custom instruction `name`.
    pub fn custom(name: impl Into<String>, arguments: Vec<TypeRef>) -> Self {
        Self::Custom(CustomCall {
            name: name.into(),
            arguments,
        })
    }

    /// The variant of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Primitive(_) => NodeKind::Primitive,
            Self::Sequence(_) => NodeKind::Sequence,
            Self::Alternation(_) => NodeKind::Alternation,
            Self::Conditional(..) => NodeKind::Conditional,
            Self::Repetition(..) => NodeKind::Repetition,
            Self::Custom(_) => NodeKind::Custom,
        }
    }

    /// Direct children, in order.
    pub fn children(&self) -> Vec<&Instruction> {
        match self {
            Self::Sequence(items) | Self::Alternation(items) => items.iter().collect(),
            Self::Conditional(_, body) | Self::Repetition(_, body) => vec![body.as_ref()],
            Self::Primitive(_) | Self::Custom(_) => Vec::new(),
        }
    }

    /// Every custom call in this tree, in pre-order.
    pub fn custom_calls(&self) -> Vec<&CustomCall> {
        let mut out = Vec::new();
        self.collect_custom_calls(&mut out);
        out
    }

    fn collect_custom_calls<'a>(&'a self, out: &mut Vec<&'a CustomCall>) {
        if let Self::Custom(call) = self {
            out.push(call);
        }
        for child in self.children() {
            child.collect_custom_calls(out);
        }
    }

    /// Check that the tree is well formed: no empty alternations or
    /// sequences, no zero quantities or repetition counts, and only valid
    /// identifiers.
    pub fn check(&self) -> CoreResult<()> {
        match self {
            Self::Primitive(p) => {
                p.target.check()?;
                if p.quantity == Some(0) {
                    return Err(MalformedError::ZeroQuantity {
                        effect: p.effect,
                        target: p.target.clone(),
                    });
                }
            }
            Self::Sequence(steps) if steps.is_empty() => return Err(MalformedError::EmptySequence),
            Self::Alternation(branches) if branches.is_empty() => {
                return Err(MalformedError::EmptyAlternation);
            }
            Self::Sequence(_) | Self::Alternation(_) => {}
            Self::Conditional(requirement, _) => requirement.target().check()?,
            Self::Repetition(0, _) => return Err(MalformedError::ZeroRepetition),
            Self::Repetition(..) => {}
            Self::Custom(call) => {
                if !is_identifier(&call.name) {
                    return Err(MalformedError::InvalidIdentifier(call.name.clone()));
                }
                for arg in &call.arguments {
                    arg.check()?;
                }
            }
        }
        self.children().into_iter().try_for_each(Instruction::check)
    }

    fn is_compound(&self) -> bool {
        matches!(self, Self::Sequence(_) | Self::Alternation(_))
    }
}

/// Writes `node`, parenthesized when `group` is set.
fn write_grouped(f: &mut fmt::Formatter<'_>, node: &Instruction, group: bool) -> fmt::Result {
    if group {
        write!(f, "({node})")
    } else {
        write!(f, "{node}")
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.effect == Effect::Remove {
            write!(f, "-")?;
        }
        if let Some(n) = self.quantity {
            write!(f, "{n} ")?;
        }
        write!(f, "{}", self.target)
    }
}

impl fmt::Display for CustomCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}(", self.name)?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

/// Renders canonical instruction-language text that parses back to an equal tree.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Sequence(steps) => {
                for (i, step) in steps.iter().enumerate() {
                    if i > 0 {
                        write!(f, " THEN ")?;
                    }
                    write_grouped(f, step, matches!(step, Self::Sequence(_)))?;
                }
                Ok(())
            }
            Self::Alternation(branches) => {
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, " OR ")?;
                    }
                    // Conditionals are grouped too, for readability.
                    let group = branch.is_compound() || matches!(branch, Self::Conditional(..));
                    write_grouped(f, branch, group)?;
                }
                Ok(())
            }
            Self::Conditional(requirement, body) => {
                write!(f, "{requirement}: ")?;
                write_grouped(f, body, body.is_compound())
            }
            Self::Repetition(count, body) => {
                write!(f, "{count} * ")?;
                write_grouped(f, body, body.is_compound())
            }
            Self::Custom(call) => write!(f, "{call}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p1(name: &str) -> TypeRef {
        TypeRef::scoped(name, TypeRef::simple("P1"))
    }

    #[test]
    fn alternation_of_one_is_bare() {
        let single = Instruction::alternation(vec![Instruction::gain(p1("Heat"))]);
        assert_eq!(single, Instruction::gain(p1("Heat")));
        assert_eq!(single.kind(), NodeKind::Primitive);
    }

    #[test]
    fn alternation_keeps_order() {
        let alt = Instruction::alternation(vec![
            Instruction::gain(p1("Titanium")),
            Instruction::gain(p1("Energy")),
        ]);
        match &alt {
            Instruction::Alternation(branches) => {
                assert_eq!(branches[0], Instruction::gain(p1("Titanium")));
                assert_eq!(branches[1], Instruction::gain(p1("Energy")));
            }
            other => panic!("expected alternation, got {other:?}"),
        }
    }

    #[test]
    fn sequence_of_one_is_bare() {
        let seq = Instruction::sequence(vec![Instruction::remove(p1("Plant"))]);
        assert_eq!(seq.kind(), NodeKind::Primitive);
    }

    #[test]
    fn display_primitives() {
        assert_eq!(Instruction::gain(p1("Heat")).to_string(), "Heat<P1>");
        assert_eq!(Instruction::remove(p1("Heat")).to_string(), "-Heat<P1>");
        assert_eq!(
            Instruction::primitive(Effect::Remove, p1("Steel"), Some(2)).to_string(),
            "-2 Steel<P1>"
        );
    }

    #[test]
    fn display_groups_by_precedence() {
        let alt = Instruction::alternation(vec![
            Instruction::gain(p1("Steel")),
            Instruction::sequence(vec![
                Instruction::gain(p1("Heat")),
                Instruction::gain(p1("Plant")),
            ]),
        ]);
        insta::assert_snapshot!(alt.to_string(), @"Steel<P1> OR (Heat<P1> THEN Plant<P1>)");

        let seq = Instruction::sequence(vec![alt.clone(), Instruction::gain(p1("Energy"))]);
        insta::assert_snapshot!(seq.to_string(), @"Steel<P1> OR (Heat<P1> THEN Plant<P1>) THEN Energy<P1>");

        let rep = Instruction::repetition(2, alt);
        insta::assert_snapshot!(rep.to_string(), @"2 * (Steel<P1> OR (Heat<P1> THEN Plant<P1>))");
    }

    #[test]
    fn display_conditional_and_custom() {
        let cond = Instruction::conditional(
            Requirement::Max {
                count: 3,
                target: p1("Plant"),
            },
            Instruction::custom("gainLowestProduction", vec![TypeRef::simple("P1")]),
        );
        insta::assert_snapshot!(cond.to_string(), @"MAX 3 Plant<P1>: @gainLowestProduction(P1)");

        let alt = Instruction::alternation(vec![cond, Instruction::gain(p1("Heat"))]);
        insta::assert_snapshot!(alt.to_string(), @"(MAX 3 Plant<P1>: @gainLowestProduction(P1)) OR Heat<P1>");
    }

    #[test]
    fn requirement_display() {
        let min_one = Requirement::Min {
            count: 1,
            target: p1("Plant"),
        };
        assert_eq!(min_one.to_string(), "Plant<P1>");

        let exact = Requirement::Exact {
            count: 0,
            target: p1("Energy"),
        };
        assert_eq!(exact.to_string(), "=0 Energy<P1>");

        let max = Requirement::Max {
            count: 2,
            target: p1("Heat"),
        };
        assert_eq!(max.to_string(), "MAX 2 Heat<P1>");
        assert_eq!(max.target(), &p1("Heat"));
    }

    #[test]
    fn check_rejects_empty_alternation() {
        assert_eq!(
            Instruction::Alternation(vec![]).check(),
            Err(MalformedError::EmptyAlternation)
        );
        assert_eq!(
            Instruction::Sequence(vec![]).check(),
            Err(MalformedError::EmptySequence)
        );
    }

    #[test]
    fn check_rejects_zero_quantity_deep_in_tree() {
        let tree = Instruction::sequence(vec![
            Instruction::gain(p1("Heat")),
            Instruction::repetition(
                2,
                Instruction::primitive(Effect::Gain, p1("Steel"), Some(0)),
            ),
        ]);
        assert!(matches!(
            tree.check(),
            Err(MalformedError::ZeroQuantity { effect: Effect::Gain, .. })
        ));
    }

    #[test]
    fn check_rejects_bad_identifiers() {
        let bad = Instruction::gain(TypeRef::scoped("Heat", TypeRef::simple("OR")));
        assert_eq!(
            bad.check(),
            Err(MalformedError::InvalidIdentifier("OR".to_string()))
        );

        let bad_call = Instruction::custom("gain lowest", vec![]);
        assert!(bad_call.check().is_err());
    }

    #[test]
    fn check_accepts_well_formed_tree() {
        let tree = Instruction::alternation(vec![
            Instruction::gain(p1("Titanium")),
            Instruction::conditional(
                Requirement::Min {
                    count: 2,
                    target: p1("Plant"),
                },
                Instruction::repetition(3, Instruction::remove(p1("Plant"))),
            ),
        ]);
        assert_eq!(tree.check(), Ok(()));
    }

    #[test]
    fn custom_calls_in_preorder() {
        let tree = Instruction::sequence(vec![
            Instruction::custom("first", vec![]),
            Instruction::repetition(2, Instruction::custom("second", vec!["P1".into()])),
        ]);
        let names: Vec<_> = tree.custom_calls().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("Heat"));
        assert!(is_identifier("gainLowestProduction"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1Heat"));
        assert!(!is_identifier("THEN"));
    }
}
