use logos::Logos;
use std::fmt;

/// Token type for the instruction language.
///
/// Keywords (`OR`, `THEN`, `MAX`) are lexed as plain `Token::Word`s; the
/// parser decides whether a word is a keyword or an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Opening type-argument bracket `<`.
    LAngle,
    /// Closing type-argument bracket `>`.
    RAngle,
    /// Left parenthesis `(`.
    LParen,
    /// Right parenthesis `)`.
    RParen,
    /// Comma separator `,`.
    Comma,
    /// Colon `:` separating a requirement from the instruction it guards.
    Colon,
    /// Repetition operator `*`.
    Star,
    /// Removal prefix `-`.
    Minus,
    /// Exact-count prefix `=`.
    Equals,
    /// Custom-instruction sigil `@`.
    At,
    /// Unsigned integer literal.
    Integer(u32),
    /// Bare word (identifier or keyword, disambiguated by the parser).
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LAngle => write!(f, "<"),
            Token::RAngle => write!(f, ">"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Star => write!(f, "*"),
            Token::Minus => write!(f, "-"),
            Token::Equals => write!(f, "="),
            Token::At => write!(f, "@"),
            Token::Integer(n) => write!(f, "{n}"),
            Token::Word(w) => write!(f, "{w}"),
        }
    }
}

/// Internal logos token. Converted to owned `Token` after lexing.
#[derive(Logos, Debug)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
enum RawToken {
    #[token("<")]
    LAngle,

    #[token(">")]
    RAngle,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token("*")]
    Star,

    #[token("-")]
    Minus,

    #[token("=")]
    Equals,

    #[token("@")]
    At,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Word,
}

/// A lexer error with source location.
#[derive(Debug, Clone)]
pub struct LexError {
    /// Byte range of the erroneous input in the source.
    pub span: std::ops::Range<usize>,
    /// Human-readable description of the lexer error.
    pub message: String,
}

/// Lex source code into a sequence of `(Token, Span)` pairs.
///
/// Returns the token stream and any lexer errors. Lexing continues past
/// errors so that every problem in the input is reported at once.
pub fn lex(source: &str) -> (Vec<(Token, std::ops::Range<usize>)>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(raw) => {
                let token = match raw {
                    RawToken::LAngle => Token::LAngle,
                    RawToken::RAngle => Token::RAngle,
                    RawToken::LParen => Token::LParen,
                    RawToken::RParen => Token::RParen,
                    RawToken::Comma => Token::Comma,
                    RawToken::Colon => Token::Colon,
                    RawToken::Star => Token::Star,
                    RawToken::Minus => Token::Minus,
                    RawToken::Equals => Token::Equals,
                    RawToken::At => Token::At,
                    RawToken::Integer => {
                        let raw = lexer.slice();
                        match raw.parse::<u32>() {
                            Ok(n) => Token::Integer(n),
                            Err(_) => {
                                errors.push(LexError {
                                    span: span.clone(),
                                    message: format!("integer literal out of range: {raw}"),
                                });
                                continue;
                            }
                        }
                    }
                    RawToken::Word => Token::Word(lexer.slice().to_string()),
                };
                tokens.push((token, span));
            }
            Err(()) => {
                errors.push(LexError {
                    span: span.clone(),
                    message: format!("unexpected character: {:?}", &source[span.clone()]),
                });
            }
        }
    }

    (tokens, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str) -> Vec<String> {
        let (tokens, errors) = lex(source);
        assert!(errors.is_empty(), "errors: {errors:?}");
        tokens.iter().map(|(t, _)| t.to_string()).collect()
    }

    #[test]
    fn lex_scoped_type() {
        assert_eq!(render("Heat<Player1>"), vec!["Heat", "<", "Player1", ">"]);
    }

    #[test]
    fn lex_alternation() {
        assert_eq!(
            render("Titanium<P1> OR Energy<P1>"),
            vec!["Titanium", "<", "P1", ">", "OR", "Energy", "<", "P1", ">"]
        );
    }

    #[test]
    fn lex_custom_call() {
        assert_eq!(
            render("@gainLowestProduction(Player1)"),
            vec!["@", "gainLowestProduction", "(", "Player1", ")"]
        );
    }

    #[test]
    fn lex_operators() {
        let (tokens, errors) = lex("-2 Steel, =0 Heat: 3 * MAX");
        assert!(errors.is_empty());
        let kinds: Vec<_> = tokens.into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            kinds,
            vec![
                Token::Minus,
                Token::Integer(2),
                Token::Word("Steel".into()),
                Token::Comma,
                Token::Equals,
                Token::Integer(0),
                Token::Word("Heat".into()),
                Token::Colon,
                Token::Integer(3),
                Token::Star,
                Token::Word("MAX".into()),
            ]
        );
    }

    #[test]
    fn lex_comments_and_newlines_are_skipped() {
        assert_eq!(
            render("// pick one\nSteel<P1>\n  OR Heat<P1> // trailing"),
            vec!["Steel", "<", "P1", ">", "OR", "Heat", "<", "P1", ">"]
        );
    }

    #[test]
    fn lex_preserves_spans() {
        let (tokens, _) = lex("Heat<P1>");
        assert_eq!(tokens[0].1, 0..4);
        assert_eq!(tokens[1].1, 4..5);
        assert_eq!(tokens[2].1, 5..7);
        assert_eq!(tokens[3].1, 7..8);
    }

    #[test]
    fn lex_unexpected_character() {
        let (tokens, errors) = lex("Heat & Steel");
        assert_eq!(tokens.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span, 5..6);
        assert!(errors[0].message.contains("unexpected character"));
    }

    #[test]
    fn lex_integer_overflow() {
        let (tokens, errors) = lex("99999999999 Heat");
        assert_eq!(tokens.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("out of range"));
    }
}
