//! Data-driven scenario tests
//!
//! Type classification, candidate generation and assertion compilation for
//! the documented attribute scenarios.

use apimatrix::assertion::{all_passed, compile, resolve_expected, run, Instruction, Step};
use apimatrix::path::AttrPath;
use apimatrix::tree::build_from_entries;
use apimatrix::value::candidates;
use apimatrix::{AttrType, AttributeSpec, ElementType};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};

// ============================================================================
// Type classification
// ============================================================================

#[rstest]
#[case("string", AttrType::String)]
#[case("Text", AttrType::String)]
#[case("date-time string", AttrType::String)]
#[case("integer", AttrType::Number)]
#[case("int64", AttrType::Number)]
#[case("double", AttrType::Number)]
#[case("Boolean", AttrType::Boolean)]
#[case("object", AttrType::Object)]
#[case("array", AttrType::ArrayOf(ElementType::Any))]
#[case("array[string]", AttrType::ArrayOf(ElementType::String))]
#[case("array numbers", AttrType::ArrayOf(ElementType::Number))]
#[case("array objects", AttrType::ArrayOf(ElementType::Object))]
// "string" wins over the numeric keyword "int" in "string(int)"
#[case("string(int)", AttrType::String)]
#[case("", AttrType::String)]
#[case("uuid", AttrType::String)]
fn test_classification(#[case] text: &str, #[case] expected: AttrType) {
    assert_eq!(AttrType::classify(text), expected);
}

// ============================================================================
// Candidate scenarios
// ============================================================================

#[rstest]
#[case::string_with_bounds("string", "abc", None, None, Some("5"), vec![json!("abc"), json!("a"), json!("aaaaa")])]
#[case::numeric_with_bounds("number", "10", Some("0"), Some("99"), None, vec![json!("10"), json!("0"), json!("99")])]
#[case::boolean_without_example("boolean", "", None, None, None, vec![json!("true"), json!("false")])]
#[case::send_expected_pairs("string", "ivan(text1);volodya(text2)", None, None, Some("20"), vec![json!("ivan"), json!("volodya")])]
#[case::yes_no("string", "Y;N", None, None, Some("3"), vec![json!("Y"), json!("N")])]
#[case::max_length_one("string", "x", None, None, Some("1"), vec![json!("x"), json!("a")])]
#[case::numeric_parse_failure("integer", "abc", None, None, None, vec![json!(0)])]
#[case::object_example("object", r#"{"k": 1}"#, None, None, None, vec![json!(r#"{"k": 1}"#)])]
#[case::json_array("array[number]", "[1, 2]", None, None, None, vec![json!([1, 2])])]
#[case::untyped_empty("", "", None, None, None, vec![json!("")])]
fn test_candidates(
    #[case] ty: &str,
    #[case] example: &str,
    #[case] minimum: Option<&str>,
    #[case] maximum: Option<&str>,
    #[case] max_length: Option<&str>,
    #[case] expected: Vec<Value>,
) {
    let attr = AttributeSpec::new("field", ty)
        .unwrap()
        .with_example(example)
        .with_minimum(minimum.unwrap_or_default())
        .with_maximum(maximum.unwrap_or_default())
        .with_max_length(max_length.unwrap_or_default());
    assert_eq!(candidates(&attr), expected);
}

// ============================================================================
// Expected-value resolution
// ============================================================================

#[rstest]
#[case::paired_send("ivan(text1);volodya(text2)", "string", Some(json!("ivan")), Some(json!("text1")))]
#[case::second_pair("ivan(text1);volodya(text2)", "string", Some(json!("volodya")), Some(json!("text2")))]
#[case::inline_pair("ivan(text1)", "string", Some(json!("oleg(text9)")), Some(json!("text9")))]
#[case::typed_by_check("7", "string/integer", Some(json!("7")), Some(json!(7)))]
#[case::boundary_echo("abc", "string", Some(json!("aaaaa")), Some(json!("aaaaa")))]
#[case::raw_example("true", "boolean", None, Some(json!(true)))]
#[case::empty("", "string", None, None)]
#[case::structured("", "array[string]", Some(json!(["a"])), Some(json!(["a"])))]
fn test_expected_resolution(
    #[case] example: &str,
    #[case] ty: &str,
    #[case] send: Option<Value>,
    #[case] expected: Option<Value>,
) {
    let attr = AttributeSpec::new("field", ty).unwrap().with_example(example);
    assert_eq!(resolve_expected(&attr, send.as_ref()), expected);
}

#[rstest]
#[case::decimal_pair("1.50(x)", "decimal", vec![json!("x")])]
#[case::leading_zeros("007(seven);8", "integer", vec![json!("seven"), json!(8)])]
#[case::yes_no_pairs("Y(on);N(off)", "boolean/string", vec![json!("on"), json!("off")])]
#[case::integer_as_string("", "integer/string", vec![json!("0")])]
fn test_expected_for_generated_candidates(
    #[case] example: &str,
    #[case] ty: &str,
    #[case] expected: Vec<Value>,
) {
    let attr = AttributeSpec::new("field", ty).unwrap().with_example(example);
    let resolved: Vec<Value> = candidates(&attr)
        .iter()
        .filter_map(|c| resolve_expected(&attr, Some(c)))
        .collect();
    assert_eq!(resolved, expected);
}

// ============================================================================
// Documented scenarios
// ============================================================================

#[test]
fn test_array_path_scenario() {
    let name = AttrPath::parse("items[0].name").unwrap();
    let price = AttrPath::parse("items[0].price").unwrap();
    let tree = build_from_entries([(&name, json!("A")), (&price, json!(1))]).unwrap();
    assert_eq!(tree, json!({"items": [{"name": "A", "price": 1}]}));
}

#[test]
fn test_filtered_response_path_scenario() {
    let path = AttrPath::parse(r#"items[type="A"].price"#).unwrap();
    let ins = compile(&path, Some(&json!(1)), AttrType::Number);

    assert_eq!(
        ins[0],
        Instruction::Navigate {
            from: 0,
            into: 1,
            steps: vec![Step::Key("items".into())],
        }
    );
    assert_eq!(
        ins[1],
        Instruction::Select {
            from: 1,
            into: 2,
            key: "type".into(),
            value: "A".into(),
        }
    );
    assert_eq!(
        ins.last(),
        Some(&Instruction::AssertEquals {
            cursor: 3,
            expected: json!(1),
        })
    );

    let response = json!({"items": [{"type": "B", "price": 5}, {"type": "A", "price": 1}]});
    assert!(all_passed(&run(&ins, &response)));
}

#[rstest]
#[case::match_string(json!({"items": [{"type": "A", "price": 1}]}), true)]
#[case::wrong_price(json!({"items": [{"type": "A", "price": 2}]}), false)]
#[case::no_match(json!({"items": [{"type": "B", "price": 1}]}), false)]
#[case::object_shape(json!({"items": {"type": "A", "price": 1}}), true)]
#[case::missing_array(json!({}), false)]
#[case::price_as_text(json!({"items": [{"type": "A", "price": "1"}]}), false)]
fn test_filtered_path_against_responses(#[case] response: Value, #[case] passes: bool) {
    let path = AttrPath::parse(r#"items[type="A"].price"#).unwrap();
    let ins = compile(&path, Some(&json!(1)), AttrType::Number);
    assert_eq!(all_passed(&run(&ins, &response)), passes);
}
