//! Lexer, parser, and diagnostics for the instruction language.
//!
//! The parser is a pure function of its input: no shared state, no side
//! effects. Text generated at runtime by custom instructions goes through
//! exactly the same entry points as authored text.

/// Pretty-printed diagnostics.
pub mod diagnostics;
/// Tokenizer.
pub mod lexer;
/// Grammar and parse errors.
pub mod parser;

pub use diagnostics::Diagnostic;
pub use parser::ParseError;
pub use rc_core::{Instruction, NodeKind, TypeRef};

/// Alias for `Result<T, ParseError>`.
pub type LangResult<T> = Result<T, ParseError>;

fn lex_checked(source: &str) -> LangResult<Vec<(lexer::Token, std::ops::Range<usize>)>> {
    let (tokens, lex_errors) = lexer::lex(source);
    match lex_errors.into_iter().next() {
        Some(e) => Err(ParseError::syntax(e.span, e.message)),
        None => Ok(tokens),
    }
}

fn first_error(errors: Vec<ParseError>) -> ParseError {
    errors
        .into_iter()
        .next()
        .unwrap_or_else(|| ParseError::syntax(0..0, "parse failed"))
}

/// Parse instruction-language text.
///
/// When `expected_root` is given the root node must be of that kind,
/// otherwise a [`ParseError::Semantic`] is returned. Only the first error is
/// reported; use [`parse_all`] to collect all of them.
pub fn parse(source: &str, expected_root: Option<NodeKind>) -> LangResult<Instruction> {
    let tokens = lex_checked(source)?;
    parser::parse(&tokens, expected_root).map_err(first_error)
}

/// Parse instruction-language text with no constraint on the root node.
pub fn parse_instruction(source: &str) -> LangResult<Instruction> {
    parse(source, None)
}

/// Parse a single type reference such as `Production<Player1, Steel>`.
pub fn parse_type_ref(source: &str) -> LangResult<TypeRef> {
    let tokens = lex_checked(source)?;
    parser::parse_type_ref(&tokens).map_err(first_error)
}

/// Parse and collect every lexer and parser error.
pub fn parse_all(source: &str) -> (Option<Instruction>, Vec<ParseError>) {
    let (tokens, lex_errors) = lexer::lex(source);
    let (output, parse_errors) = parser::parse_lenient(&tokens);

    let mut errors: Vec<ParseError> = lex_errors
        .into_iter()
        .map(|e| ParseError::syntax(e.span, e.message))
        .collect();
    errors.extend(parse_errors);
    errors.sort_by_key(|e| e.span().start);

    let output = if errors.is_empty() { output } else { None };
    (output, errors)
}

/// Diagnostics for a piece of source text, ready for
/// [`diagnostics::render_diagnostics`].
pub fn check_source(source: &str) -> Vec<Diagnostic> {
    let (_, errors) = parse_all(source);
    errors.iter().map(Diagnostic::from).collect()
}
