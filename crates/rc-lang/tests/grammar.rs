//! Integration tests for the grammar and parser.

use proptest::prelude::*;

use rc_core::{Effect, Instruction, NodeKind, Requirement, TypeRef};
use rc_lang::{ParseError, check_source, parse, parse_all, parse_instruction, parse_type_ref};

fn p1(name: &str) -> TypeRef {
    TypeRef::scoped(name, TypeRef::simple("P1"))
}

// ---------------------------------------------------------------------------
// Fixed cases
// ---------------------------------------------------------------------------

#[test]
fn single_option_degenerates_to_primitive() {
    let instr = parse_instruction("Heat<P1>").unwrap();
    assert_eq!(instr.kind(), NodeKind::Primitive);
    assert_eq!(instr, Instruction::gain(p1("Heat")));
}

#[test]
fn alternation_preserves_textual_order() {
    let instr = parse_instruction("A<P1> OR B<P1>").unwrap();
    assert_eq!(
        instr,
        Instruction::Alternation(vec![Instruction::gain(p1("A")), Instruction::gain(p1("B"))])
    );
}

#[test]
fn multiline_source_with_comments() {
    let source = "
        // Robinson-style choice
        Titanium<P1>
            OR Energy<P1>   // tied at zero
    ";
    let instr = parse_instruction(source).unwrap();
    assert_eq!(instr.to_string(), "Titanium<P1> OR Energy<P1>");
}

#[test]
fn rendering_of_parsed_text_is_canonical() {
    let instr = parse_instruction("3 Plant<P1>:(Heat<P1>THEN -1 Steel<P1>) OR 2*@copyBox(Card<P1>)").unwrap();
    insta::assert_snapshot!(instr.to_string(), @"(3 Plant<P1>: (Heat<P1> THEN -1 Steel<P1>)) OR 2 * @copyBox(Card<P1>)");
}

#[test]
fn expected_root_is_enforced() {
    assert!(parse("Steel<P1> THEN Heat<P1>", Some(NodeKind::Sequence)).is_ok());

    let err = parse("Steel<P1> THEN Heat<P1>", Some(NodeKind::Primitive)).unwrap_err();
    assert!(err.is_semantic());
    insta::assert_snapshot!(err.to_string(), @"semantic error: expected primitive but found sequence");
}

#[test]
fn lexer_errors_surface_as_syntax_errors() {
    let err = parse_instruction("Heat<P1> & Steel<P1>").unwrap_err();
    assert!(err.is_syntax());
    assert_eq!(err.span(), 9..10);
}

#[test]
fn unterminated_parameter_list() {
    let err = parse_instruction("Heat<Player1").unwrap_err();
    assert!(matches!(err, ParseError::Syntax { .. }));
}

#[test]
fn type_ref_entry_point() {
    assert_eq!(parse_type_ref("Heat<P1>").unwrap(), p1("Heat"));
    assert!(parse_type_ref("Heat<P1").unwrap_err().is_syntax());
    assert!(parse_type_ref("Heat<P1> OR Steel<P1>").is_err());
    assert!(parse_type_ref("MAX").is_err());
}

#[test]
fn parse_all_collects_every_error() {
    let (output, errors) = parse_all("Heat<P1> & OR 0 Steel<P1>");
    assert!(output.is_none());
    assert!(errors.len() >= 2, "{errors:?}");
    assert!(errors.windows(2).all(|w| w[0].span().start <= w[1].span().start));
}

#[test]
fn check_source_is_empty_for_valid_text() {
    assert!(check_source("Steel<P1> OR Heat<P1>").is_empty());
    assert!(!check_source("Steel<P1> OR").is_empty());
}

#[test]
fn semantic_errors_point_at_the_node() {
    let err = parse_instruction("Heat<P1> THEN -0 Plant<P1>").unwrap_err();
    assert!(err.is_semantic());
    assert_eq!(err.message(), "cannot remove zero Plant<P1>");
    assert_eq!(err.span(), 14..26);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn identifier() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["Heat", "Steel", "Titanium", "Plant", "Energy", "P1", "Player2"])
        .prop_map(str::to_string)
}

fn type_ref() -> impl Strategy<Value = TypeRef> {
    let leaf = identifier().prop_map(TypeRef::simple);
    leaf.prop_recursive(2, 6, 2, |inner| {
        (identifier(), prop::collection::vec(inner, 1..3))
            .prop_map(|(name, args)| TypeRef::new(name, args))
    })
}

fn requirement() -> impl Strategy<Value = Requirement> {
    (0..3u8, 0..10u32, type_ref()).prop_map(|(kind, count, target)| match kind {
        0 => Requirement::Min { count, target },
        1 => Requirement::Max { count, target },
        _ => Requirement::Exact { count, target },
    })
}

fn instruction() -> impl Strategy<Value = Instruction> {
    let primitive = (any::<bool>(), prop::option::of(1..20u32), type_ref()).prop_map(
        |(remove, quantity, target)| {
            let effect = if remove { Effect::Remove } else { Effect::Gain };
            Instruction::primitive(effect, target, quantity)
        },
    );
    let custom = (
        prop::sample::select(vec!["gainLowestProduction", "copyBox"]),
        prop::collection::vec(type_ref(), 0..3),
    )
        .prop_map(|(name, args)| Instruction::custom(name, args));
    let leaf = prop_oneof![3 => primitive, 1 => custom];

    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4).prop_map(Instruction::Alternation),
            prop::collection::vec(inner.clone(), 2..4).prop_map(Instruction::Sequence),
            (requirement(), inner.clone()).prop_map(|(r, body)| Instruction::conditional(r, body)),
            (1..5u32, inner).prop_map(|(n, body)| Instruction::repetition(n, body)),
        ]
    })
}

proptest! {
    #[test]
    fn rendered_trees_parse_back_equal(tree in instruction()) {
        let text = tree.to_string();
        let parsed = parse_instruction(&text);
        prop_assert_eq!(parsed, Ok(tree), "text: {}", text);
    }

    #[test]
    fn parsing_is_deterministic(tree in instruction()) {
        let text = tree.to_string();
        prop_assert_eq!(parse_instruction(&text), parse_instruction(&text));
    }

    #[test]
    fn expected_root_matches_rendered_kind(tree in instruction()) {
        let text = tree.to_string();
        prop_assert!(parse(&text, Some(tree.kind())).is_ok());
    }

    #[test]
    fn type_refs_round_trip(t in type_ref()) {
        prop_assert_eq!(parse_type_ref(&t.to_string()), Ok(t));
    }

    #[test]
    fn alternation_of_tied_categories_round_trips(
        names in prop::collection::vec(identifier(), 1..6)
    ) {
        let branches: Vec<Instruction> = names.iter().map(|n| Instruction::gain(p1(n))).collect();
        let direct = Instruction::alternation(branches);
        let text = names.iter().map(|n| format!("{n}<P1>")).collect::<Vec<_>>().join(" OR ");
        prop_assert_eq!(parse_instruction(&text), Ok(direct));
    }
}
