use chumsky::error::RichReason;
use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;
use miette::SourceSpan;

use rc_core::{Instruction, NodeKind, RESERVED_WORDS, Requirement, TypeRef};

use crate::lexer::Token;

type Span = SimpleSpan;

/// Parse error with source span.
///
/// Syntax errors come from the lexer or from a malformed token stream.
/// Semantic errors come from well-formed text that still cannot mean
/// anything: zero quantities, zero repetitions, or a root node of the wrong
/// kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum ParseError {
    /// Malformed instruction-language text.
    #[error("syntax error: {message}")]
    #[diagnostic(code(rc_lang::syntax))]
    Syntax {
        /// What went wrong.
        message: String,
        /// Where it went wrong.
        #[label("here")]
        span: SourceSpan,
    },

    /// Well-formed text whose meaning is invalid.
    #[error("semantic error: {message}")]
    #[diagnostic(code(rc_lang::semantic))]
    Semantic {
        /// What went wrong.
        message: String,
        /// The offending node.
        #[label("here")]
        span: SourceSpan,
    },
}

impl ParseError {
    /// Build a syntax error.
    pub fn syntax(span: std::ops::Range<usize>, message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
            span: span.into(),
        }
    }

    /// Build a semantic error.
    pub fn semantic(span: std::ops::Range<usize>, message: impl Into<String>) -> Self {
        Self::Semantic {
            message: message.into(),
            span: span.into(),
        }
    }

    /// Byte range of the error in the source text.
    pub fn span(&self) -> std::ops::Range<usize> {
        let span = match self {
            Self::Syntax { span, .. } | Self::Semantic { span, .. } => span,
        };
        span.offset()..span.offset() + span.len()
    }

    /// The message without the error-class prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Syntax { message, .. } | Self::Semantic { message, .. } => message,
        }
    }

    /// True for [`ParseError::Syntax`].
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }

    /// True for [`ParseError::Semantic`].
    pub fn is_semantic(&self) -> bool {
        matches!(self, Self::Semantic { .. })
    }
}

fn is_reserved(w: &str) -> bool {
    RESERVED_WORDS.contains(&w)
}

/// `Name` or `Name<Arg, ...>`.
fn type_ref_parser<'a, I>() -> impl Parser<'a, I, TypeRef, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = Span>,
{
    let ident = select! { Token::Word(ref w) if !is_reserved(w) => w.clone() }.labelled("identifier");

    recursive(|type_ref| {
        ident
            .then(
                type_ref
                    .separated_by(just(Token::Comma))
                    .at_least(1)
                    .collect::<Vec<TypeRef>>()
                    .delimited_by(just(Token::LAngle), just(Token::RAngle))
                    .or_not(),
            )
            .map(|(name, arguments)| TypeRef::new(name, arguments.unwrap_or_default()))
    })
    .labelled("type reference")
}

/// Build the full instruction parser.
///
/// Precedence, loosest first: `THEN`, `OR`, then atoms (custom calls,
/// parenthesized groups, conditionals, repetitions, primitives).
fn instruction_parser<'a, I>() -> impl Parser<'a, I, Instruction, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = Span>,
{
    // -- Helpers --

    let kw = |k: &'static str| select! { Token::Word(ref w) if w.as_str() == k => () }.labelled(k);
    let ident = select! { Token::Word(ref w) if !is_reserved(w) => w.clone() }.labelled("identifier");
    let integer = select! { Token::Integer(n) => n }.labelled("integer");
    let type_ref = type_ref_parser();

    // -- Requirement (the guard of a conditional) --
    let requirement = choice((
        kw("MAX")
            .ignore_then(integer)
            .then(type_ref.clone())
            .map(|(count, target)| Requirement::Max { count, target }),
        just(Token::Equals)
            .ignore_then(integer)
            .then(type_ref.clone())
            .map(|(count, target)| Requirement::Exact { count, target }),
        integer
            .or_not()
            .then(type_ref.clone())
            .map(|(count, target)| Requirement::Min {
                count: count.unwrap_or(1),
                target,
            }),
    ))
    .labelled("requirement");

    // -- Primitive: [-][n] Type --
    let primitive = just(Token::Minus)
        .or_not()
        .then(integer.or_not())
        .then(type_ref.clone())
        .map(|((minus, quantity), target)| {
            let effect = if minus.is_some() {
                rc_core::Effect::Remove
            } else {
                rc_core::Effect::Gain
            };
            Instruction::primitive(effect, target, quantity)
        })
        .validate(|node: Instruction, e, emitter| {
            if let Err(err) = node.check() {
                emitter.emit(Rich::custom(e.span(), err.to_string()));
            }
            node
        })
        .labelled("primitive");

    // -- Custom call: @name(Type, ...) --
    let custom_call = just(Token::At)
        .ignore_then(ident)
        .then(
            type_ref
                .separated_by(just(Token::Comma))
                .collect::<Vec<TypeRef>>()
                .delimited_by(just(Token::LParen), just(Token::RParen)),
        )
        .map(|(name, arguments)| Instruction::custom(name, arguments))
        .labelled("custom instruction");

    recursive(|instruction| {
        let group = instruction.delimited_by(just(Token::LParen), just(Token::RParen));

        let atom = recursive(|atom| {
            let conditional = requirement
                .then_ignore(just(Token::Colon))
                .then(atom.clone())
                .map(|(requirement, body)| Instruction::conditional(requirement, body))
                .labelled("conditional");

            let repetition = integer
                .then_ignore(just(Token::Star))
                .then(atom)
                .map(|(count, body)| Instruction::repetition(count, body))
                .validate(|node: Instruction, e, emitter| {
                    if let Instruction::Repetition(0, _) = node {
                        emitter.emit(Rich::custom(
                            e.span(),
                            rc_core::MalformedError::ZeroRepetition.to_string(),
                        ));
                    }
                    node
                })
                .labelled("repetition");

            // Conditional before repetition before primitive: all three may
            // start with an integer.
            choice((custom_call, group, conditional, repetition, primitive))
        });

        let alternation = atom
            .separated_by(kw("OR"))
            .at_least(1)
            .collect::<Vec<Instruction>>()
            .map(Instruction::alternation);

        alternation
            .separated_by(kw("THEN"))
            .at_least(1)
            .collect::<Vec<Instruction>>()
            .map(Instruction::sequence)
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

fn convert_errors(errors: Vec<Rich<'_, Token>>) -> Vec<ParseError> {
    let mut out: Vec<ParseError> = errors
        .into_iter()
        .map(|e| {
            let span = e.span().into_range();
            match e.reason() {
                RichReason::Custom(message) => ParseError::semantic(span, message.clone()),
                _ => ParseError::syntax(span, e.to_string()),
            }
        })
        .collect();
    out.sort_by_key(|e| e.span().start);
    out
}

fn source_extent(tokens: &[(Token, std::ops::Range<usize>)]) -> std::ops::Range<usize> {
    let start = tokens.first().map_or(0, |(_, s)| s.start);
    let end = tokens.last().map_or(0, |(_, s)| s.end);
    start..end
}

/// Parse a token stream into an instruction.
///
/// When `expected_root` is given, a tree whose root is of another kind is
/// rejected with a semantic error.
pub fn parse(
    tokens: &[(Token, std::ops::Range<usize>)],
    expected_root: Option<NodeKind>,
) -> Result<Instruction, Vec<ParseError>> {
    let (output, errors) = parse_lenient(tokens);
    match output {
        Some(instruction) if errors.is_empty() => match expected_root {
            Some(expected) if instruction.kind() != expected => Err(vec![ParseError::semantic(
                source_extent(tokens),
                format!("expected {expected} but found {}", instruction.kind()),
            )]),
            _ => Ok(instruction),
        },
        _ => Err(errors),
    }
}

/// Parse a token stream leniently, returning whatever tree chumsky could
/// recover alongside every error.
pub fn parse_lenient(
    tokens: &[(Token, std::ops::Range<usize>)],
) -> (Option<Instruction>, Vec<ParseError>) {
    let token_iter = tokens
        .iter()
        .map(|(tok, span)| (tok.clone(), Span::from(span.clone())));

    let len = tokens.last().map_or(0, |(_, s)| s.end);
    let eoi: Span = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let (output, errors) = instruction_parser()
        .then_ignore(end())
        .parse(stream)
        .into_output_errors();

    (output, convert_errors(errors))
}

/// Parse a token stream holding exactly one type reference.
pub fn parse_type_ref(
    tokens: &[(Token, std::ops::Range<usize>)],
) -> Result<TypeRef, Vec<ParseError>> {
    let token_iter = tokens
        .iter()
        .map(|(tok, span)| (tok.clone(), Span::from(span.clone())));

    let len = tokens.last().map_or(0, |(_, s)| s.end);
    let eoi: Span = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let (output, errors) = type_ref_parser()
        .then_ignore(end())
        .parse(stream)
        .into_output_errors();

    match output {
        Some(type_ref) if errors.is_empty() => Ok(type_ref),
        _ => Err(convert_errors(errors)),
    }
}
