//! End-to-end decode/encode scenarios over the JSON adapter.

use wireform::{
    Codec, Error, FieldSpec, Fields, Options, SchemaError, StaticModel, TypeDef,
    TypeRegistry, Value, ValueType,
};

fn player_model() -> StaticModel {
    let model = StaticModel::new();
    model.define(
        "Player",
        TypeDef::new()
            .field(FieldSpec::new("name", ValueType::String))
            .field(FieldSpec::new("score", ValueType::Integer)),
    );
    model
}

fn player(name: Option<&str>, score: i64) -> Value {
    let mut fields = Fields::typed("Player");
    fields.insert(
        "name",
        name.map_or(Value::Null, |n| Value::String(n.into())),
    );
    fields.insert("score", score);
    Value::Object(fields)
}

#[test]
fn decode_example_document() {
    let model = player_model();
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let value = codec
        .decode(
            r#"{"name":"test","score":200}"#,
            &ValueType::object("Player"),
            Options::empty(),
        )
        .unwrap();
    assert_eq!(value, player(Some("test"), 200));
}

#[test]
fn encode_example_document_exactly() {
    let model = player_model();
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let text = codec
        .encode(&player(Some("test"), 300), Options::empty())
        .unwrap();
    assert_eq!(text, r#"{"name":"test","score":300}"#);
}

#[test]
fn round_trip_compact_and_pretty() {
    let model = player_model();
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let original = player(Some("test"), 200);
    for options in [Options::empty(), Options::PRETTY] {
        let text = codec.encode(&original, options).unwrap();
        let back = codec
            .decode(&text, &ValueType::object("Player"), Options::empty())
            .unwrap();
        assert_eq!(back, original, "failed for {options:?}: {text}");
    }
}

#[test]
fn pretty_output_indents_two_spaces() {
    let model = player_model();
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let text = codec
        .encode(&player(Some("test"), 200), Options::PRETTY)
        .unwrap();
    assert_eq!(text, "{\n  \"name\":\"test\",\n  \"score\":200\n}");
}

#[test]
fn non_default_omits_default_valued_fields() {
    let model = player_model();
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let text = codec
        .encode(&player(None, 0), Options::NON_DEFAULT)
        .unwrap();
    assert_eq!(text, "{}");
}

#[test]
fn non_default_keeps_non_default_fields() {
    let model = player_model();
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let text = codec
        .encode(&player(None, 7), Options::NON_DEFAULT)
        .unwrap();
    assert_eq!(text, r#"{"score":7}"#);
}

#[test]
fn unknown_property_fails_without_option() {
    let model = player_model();
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let err = codec
        .decode(
            r#"{"name":"a","extra":"b"}"#,
            &ValueType::object("Player"),
            Options::empty(),
        )
        .unwrap_err();
    match err {
        Error::Schema(SchemaError::UnknownProperty {
            type_name,
            property,
        }) => {
            assert_eq!(type_name, "Player");
            assert_eq!(property, "extra");
        }
        other => panic!("expected schema error, got {other}"),
    }
}

#[test]
fn unknown_property_skipped_with_option() {
    let model = player_model();
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let value = codec
        .decode(
            r#"{"name":"a","extra":{"deep":[1,2]}}"#,
            &ValueType::object("Player"),
            Options::IGNORE_UNKNOWN_PROPERTIES,
        )
        .unwrap();
    let fields = value.as_object().unwrap();
    assert_eq!(fields.get("name"), Some(&Value::String("a".into())));
    assert!(!fields.contains_key("extra"));
}

#[test]
fn escape_round_trip() {
    let model = player_model();
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let original = player(Some("a\nb\tc\u{8}d\re\u{c}f\\g\"h"), 1);
    let text = codec.encode(&original, Options::empty()).unwrap();
    assert!(
        text.contains("a\\nb\\tc\\bd\\re\\ff\\\\g\\\"h"),
        "escapes: {text}"
    );
    let back = codec
        .decode(&text, &ValueType::object("Player"), Options::empty())
        .unwrap();
    assert_eq!(back, original);
}

#[test]
fn empty_containers_round_trip() {
    assert_eq!(wireform::decode("[]").unwrap(), Value::Sequence(vec![]));
    assert_eq!(
        wireform::decode("{}").unwrap(),
        Value::Object(Fields::new())
    );
    assert_eq!(
        wireform::encode(&Value::Sequence(vec![]), Options::empty()).unwrap(),
        "[]"
    );
    assert_eq!(
        wireform::encode(&Value::Object(Fields::new()), Options::empty()).unwrap(),
        "{}"
    );
}

#[test]
fn untyped_decode_infers_structure() {
    let value = wireform::decode(r#"{"xs":[1,2.5,true,null,"s"]}"#).unwrap();
    let fields = value.as_object().unwrap();
    let xs = fields.get("xs").unwrap().as_sequence().unwrap();
    assert_eq!(
        xs,
        [
            Value::Integer(1),
            Value::Float(2.5),
            Value::Boolean(true),
            Value::Null,
            Value::String("s".into()),
        ]
    );
}

#[test]
fn map_target_preserves_encounter_order() {
    let model = StaticModel::new();
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let value = codec
        .decode(
            r#"{"z":1,"a":2,"m":3}"#,
            &ValueType::map(ValueType::Integer),
            Options::empty(),
        )
        .unwrap();
    let keys: Vec<_> = value
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, _)| k.to_string())
        .collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn set_target_drops_duplicates() {
    let model = StaticModel::new();
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let value = codec
        .decode(
            "[1,2,1,3,2]",
            &ValueType::set(ValueType::Integer),
            Options::empty(),
        )
        .unwrap();
    assert_eq!(
        value.as_sequence().unwrap(),
        [Value::Integer(1), Value::Integer(2), Value::Integer(3)]
    );
}

#[test]
fn coercion_mismatch_names_both_kinds() {
    let model = player_model();
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let err = codec
        .decode(
            r#"{"score":"lots"}"#,
            &ValueType::object("Player"),
            Options::empty(),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "expected integer but found string");
}

#[test]
fn fractional_literal_rejected_for_integer_target() {
    let model = player_model();
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let err = codec
        .decode(
            r#"{"score":1.5}"#,
            &ValueType::object("Player"),
            Options::empty(),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid integer literal '1.5'");
}

#[test]
fn unwrap_strings_reparses_nested_document() {
    let model = StaticModel::new();
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let value = codec
        .decode(
            r#""[1,2,3]""#,
            &ValueType::list(ValueType::Integer),
            Options::UNWRAP_STRINGS,
        )
        .unwrap();
    assert_eq!(
        value.as_sequence().unwrap(),
        [Value::Integer(1), Value::Integer(2), Value::Integer(3)]
    );
}

#[test]
fn order_hints_win_over_declaration_order() {
    let model = StaticModel::new();
    model.define(
        "Row",
        TypeDef::new()
            .field(FieldSpec::new("b", ValueType::Integer))
            .field(FieldSpec::new("a", ValueType::Integer).order(0)),
    );
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let mut fields = Fields::typed("Row");
    fields.insert("b", 2i64);
    fields.insert("a", 1i64);
    let text = codec
        .encode(&Value::Object(fields), Options::empty())
        .unwrap();
    assert_eq!(text, r#"{"a":1,"b":2}"#);
}

#[test]
fn write_only_fields_are_not_read() {
    let model = StaticModel::new();
    model.define(
        "Secretive",
        TypeDef::new()
            .field(FieldSpec::new("visible", ValueType::String))
            .field(FieldSpec::new("secret", ValueType::String).write_only()),
    );
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let value = codec
        .decode(
            r#"{"visible":"v","secret":"s"}"#,
            &ValueType::object("Secretive"),
            Options::empty(),
        )
        .unwrap();
    assert!(!value.as_object().unwrap().contains_key("secret"));
}

#[test]
fn read_only_fields_are_not_written() {
    let model = StaticModel::new();
    model.define(
        "Derived",
        TypeDef::new()
            .field(FieldSpec::new("kept", ValueType::Integer))
            .field(FieldSpec::new("computed", ValueType::Integer).read_only()),
    );
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let mut fields = Fields::typed("Derived");
    fields.insert("kept", 1i64);
    fields.insert("computed", 2i64);
    let text = codec
        .encode(&Value::Object(fields), Options::empty())
        .unwrap();
    assert_eq!(text, r#"{"kept":1}"#);
}

#[test]
fn decode_from_blocking_reader() {
    let model = player_model();
    let types = TypeRegistry::new();
    let codec = Codec::new(&model, &types);
    let bytes: &[u8] = br#"{"name":"test","score":200}"#;
    let value = codec
        .decode_from(bytes, &ValueType::object("Player"), Options::empty())
        .unwrap();
    assert_eq!(value, player(Some("test"), 200));
}

#[test]
fn parse_error_carries_position() {
    let err = wireform::decode("{\"a\": @}").unwrap_err();
    assert_eq!(err.to_string(), "unexpected character '@' at 1:7");
}
