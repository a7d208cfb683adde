//! Integration tests for rulebook-validation

use rulebook_validation::*;
use serde_json::{Value, json};

fn no_messages() -> Vec<(&'static str, &'static str)> {
    Vec::new()
}

#[test]
fn test_instance_with_missing_field() {
    let mut validator = Validator::make(
        json!({"email": "cong.itsoft@gmail.com"}),
        [("age", "required"), ("email", "email|required")],
        no_messages(),
    )
    .unwrap();

    assert_eq!(validator.state(), ValidatorState::Configured);
    assert!(validator.fails().unwrap());
    assert_eq!(validator.errors().get("age").unwrap(), &["age is not required"]);
    assert!(!validator.errors().has("email"));
}

#[test]
fn test_fails_with_custom_messages() {
    let mut validator = Validator::make(
        json!({"age": 20, "email": ""}),
        [("age", "required"), ("email", "email|required")],
        [
            ("age.required", "Please fill age"),
            ("email.email", "Please fill email"),
            ("email.required", "Please abc"),
        ],
    )
    .unwrap();

    assert!(validator.fails().unwrap());
    assert_eq!(validator.errors().get("email").unwrap(), &["Please abc"]);
}

#[test]
fn test_passes_with_custom_messages() {
    let mut validator = Validator::make(
        json!({"age": 20, "email": "cong.itsoft@gmail.com"}),
        [("age", "required"), ("email", "email|required")],
        [("age.required", "Please fill age"), ("email.email", "Please fill email")],
    )
    .unwrap();

    assert!(validator.passes().unwrap());
}

#[test]
fn test_builtin_catalog_end_to_end() {
    let data = json!({
        "email": "user@example.com",
        "site": "https://example.com/path",
        "addr": "2001:db8::1",
        "count": "42",
        "ratio": "0.75",
        "weight": 72.5,
        "agree": "yes",
        "age": 20,
        "tags": ["a", "b", "c"],
        "nick": "abc",
        "color": "green",
        "code": "AB-1234",
        "answer": 42,
        "password": "secret",
        "password_confirmation": "secret",
        "nothing": null
    });

    let mut validator = Validator::make(
        data,
        [
            ("email", "required|email"),
            ("site", "url"),
            ("addr", "ip"),
            ("count", "int"),
            ("ratio", "float"),
            ("weight", "double"),
            ("agree", "boolean"),
            ("age", "between:18,20|min:18|max:20"),
            ("tags", "min:3|max:3|equals:3"),
            ("nick", "min:3|max:3|equals:abc"),
            ("color", "in_array:red,green,blue|not_in_array:black"),
            ("code", "regexp:/^[A-Z]{2}-\\d{4}$/"),
            ("answer", "equals:42"),
            ("password_confirmation", "required|same:password"),
            ("nothing", "nullable"),
        ],
        no_messages(),
    )
    .unwrap();

    assert!(validator.passes().unwrap(), "errors: {}", validator.errors());
}

#[test]
fn test_each_builtin_can_fail() {
    let cases: &[(&str, Value)] = &[
        ("email", json!("not-an-email")),
        ("url", json!("example")),
        ("ip", json!("300.1.1.1")),
        ("int", json!("4.2")),
        ("float", json!("abc")),
        ("double", json!(3)),
        ("boolean", json!("maybe")),
        ("between:1,2", json!(3)),
        ("min:5", json!("abc")),
        ("max:1", json!([1, 2])),
        ("in_array:a,b", json!("c")),
        ("not_in_array:a,b", json!("a")),
        ("regexp:/^\\d+$/", json!("12a")),
        ("equals:5", json!(4)),
        ("same:other", json!("x")),
    ];

    for (spec, value) in cases {
        let mut validator = Validator::make(
            json!({"field": value, "other": "y"}),
            [("field", *spec)],
            no_messages(),
        )
        .unwrap();
        assert!(validator.fails().unwrap(), "`{spec}` should reject {value}");
    }
}

#[test]
fn test_between_boundaries() {
    for (age, expected) in [(9, false), (10, true), (22, true), (23, false)] {
        let mut validator =
            Validator::make(json!({"age": age}), [("age", "between:10,22")], no_messages()).unwrap();
        assert_eq!(validator.passes().unwrap(), expected, "age {age}");
    }
}

#[test]
fn test_same_compares_raw_input() {
    let mut validator = Validator::make(
        json!({"code": "abc", "code_re": "abc"}),
        [("code", "required|int"), ("code_re", "required|same:code")],
        no_messages(),
    )
    .unwrap();

    assert!(validator.fails().unwrap());
    assert!(validator.errors().has("code"));
    assert!(!validator.errors().has("code_re"));
}

#[test]
fn test_unknown_rule_not_collected() {
    let mut validator = Validator::make(
        json!({"age": "192.159.2.2", "name": ""}),
        [("name", "required"), ("age", "ipv6")],
        no_messages(),
    )
    .unwrap();

    let error = validator.passes().unwrap_err();
    assert!(error.is_rule_not_found());
    assert!(validator.errors().get("age").is_none());
}

#[test]
fn test_extension_participates_in_short_circuit() {
    let mut validator = Validator::new();
    validator.add_extension("always_fails", |_, _, _| false);
    validator
        .set_data(json!({"a": null, "b": 1}))
        .set_rules([("a", "always_fails"), ("b", "alwaysFails")])
        .unwrap();

    assert!(validator.fails().unwrap());
    assert!(!validator.errors().has("a"));
    assert_eq!(validator.errors().get("b").unwrap(), &["b is not always_fails"]);
}

#[test]
fn test_builder_rules_allow_delimiters_in_params() {
    let rules = ValidationBuilder::new()
        .field(ValidationRules::for_field("sep").rule("required").with("in_array", ["|", ",", ":"]))
        .build()
        .unwrap();

    let mut validator = Validator::new();
    validator.set_data(json!({"sep": "|"})).set_compiled_rules(rules);
    assert!(validator.passes().unwrap());

    validator.set_data(json!({"sep": ";"}));
    assert!(validator.fails().unwrap());
}

#[test]
fn test_config_file_roundtrip() {
    let path = std::env::temp_dir().join(format!("rulebook-config-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
[rules]
age = "required|between:18,99"
email = "email|required"

[messages]
"email.required" = "Please fill email"
"#,
    )
    .unwrap();

    let config = ValidatorConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let mut validator = config.build().unwrap();
    validator.set_data(json!({"age": 30, "email": ""}));

    assert!(validator.fails().unwrap());
    assert_eq!(validator.errors().get("email").unwrap(), &["Please fill email"]);
}

#[test]
fn test_config_file_missing() {
    let error = ValidatorConfig::from_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(error, RuleError::Io(_)));
}

#[test]
fn test_error_report_serializes_as_map() {
    let mut validator =
        Validator::make(json!({"age": 20}), [("age", "max:18|min:30")], no_messages()).unwrap();
    assert!(validator.fails().unwrap());

    let json = serde_json::to_value(validator.errors()).unwrap();
    assert_eq!(json, json!({"age": ["age is not max", "age is not min"]}));
}
