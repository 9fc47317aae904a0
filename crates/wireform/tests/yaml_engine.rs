//! End-to-end scenarios over the YAML adapter: block and flow layouts.

use wireform::{
    Codec, FieldSpec, Fields, Options, StaticModel, TypeDef, TypeRegistry, Value,
    ValueType, Yaml,
};

fn yaml_codec<'a>(model: &'a StaticModel, types: &'a TypeRegistry) -> Codec<'a, Yaml> {
    Codec::with_syntax(Yaml, model, types)
}

fn config_value() -> Value {
    let mut server = Fields::new();
    server.insert("host", "db.internal");
    server.insert(
        "ports",
        vec![Value::Integer(5432), Value::Integer(5433)],
    );
    let mut root = Fields::new();
    root.insert("server", server);
    root.insert("debug", true);
    root.insert("ratio", 0.5);
    root.insert("label", Value::Null);
    Value::Object(root)
}

#[test]
fn block_output_is_indented_yaml() {
    let model = StaticModel::new();
    let types = TypeRegistry::new();
    let codec = yaml_codec(&model, &types);
    let text = codec.encode(&config_value(), Options::PRETTY).unwrap();
    assert_eq!(
        text,
        "server:\n  host: db.internal\n  ports:\n    - 5432\n    - 5433\ndebug: true\nratio: 0.5\nlabel: null"
    );
}

#[test]
fn block_output_round_trips() {
    let model = StaticModel::new();
    let types = TypeRegistry::new();
    let codec = yaml_codec(&model, &types);
    let original = config_value();
    let text = codec.encode(&original, Options::PRETTY).unwrap();
    let back = codec
        .decode(&text, &ValueType::Any, Options::empty())
        .unwrap();
    assert_eq!(back, original);
}

#[test]
fn flow_output_round_trips() {
    let model = StaticModel::new();
    let types = TypeRegistry::new();
    let codec = yaml_codec(&model, &types);
    let original = config_value();
    let text = codec.encode(&original, Options::empty()).unwrap();
    let back = codec
        .decode(&text, &ValueType::Any, Options::empty())
        .unwrap();
    assert_eq!(back, original);
}

#[test]
fn reserved_strings_are_quoted_and_survive() {
    let model = StaticModel::new();
    let types = TypeRegistry::new();
    let codec = yaml_codec(&model, &types);
    let mut fields = Fields::new();
    fields.insert("motd", "hello world: a, b");
    fields.insert("version", "1.25");
    fields.insert("keyword", "null");
    let original = Value::Object(fields);
    for options in [Options::empty(), Options::PRETTY] {
        let text = codec.encode(&original, options).unwrap();
        let back = codec
            .decode(&text, &ValueType::Any, Options::empty())
            .unwrap();
        assert_eq!(back, original, "layout {options:?}: {text}");
    }
}

#[test]
fn typed_decode_from_block_document() {
    let model = StaticModel::new();
    model.define(
        "Player",
        TypeDef::new()
            .field(FieldSpec::new("name", ValueType::String))
            .field(FieldSpec::new("score", ValueType::Integer)),
    );
    let types = TypeRegistry::new();
    let codec = yaml_codec(&model, &types);
    let value = codec
        .decode(
            "name: test\nscore: 200\n",
            &ValueType::object("Player"),
            Options::empty(),
        )
        .unwrap();
    let fields = value.as_object().unwrap();
    assert_eq!(fields.get("name"), Some(&Value::String("test".into())));
    assert_eq!(fields.get("score"), Some(&Value::Integer(200)));
}

#[test]
fn sequences_of_mappings() {
    let model = StaticModel::new();
    let types = TypeRegistry::new();
    let codec = yaml_codec(&model, &types);
    let text = "servers:\n  - host: a\n    port: 1\n  - host: b\n    port: 2\n";
    let value = codec
        .decode(text, &ValueType::Any, Options::empty())
        .unwrap();
    let servers = value
        .as_object()
        .unwrap()
        .get("servers")
        .unwrap()
        .as_sequence()
        .unwrap();
    assert_eq!(servers.len(), 2);
    assert_eq!(
        servers[1].as_object().unwrap().get("host"),
        Some(&Value::String("b".into()))
    );
    assert_eq!(
        servers[1].as_object().unwrap().get("port"),
        Some(&Value::Integer(2))
    );
}

#[test]
fn sequence_of_mappings_round_trips_in_block_form() {
    let model = StaticModel::new();
    let types = TypeRegistry::new();
    let codec = yaml_codec(&model, &types);
    let mut a = Fields::new();
    a.insert("host", "a");
    a.insert("port", 1i64);
    let mut b = Fields::new();
    b.insert("host", "b");
    b.insert("port", 2i64);
    let mut root = Fields::new();
    root.insert("servers", vec![Value::Object(a), Value::Object(b)]);
    let original = Value::Object(root);
    let text = codec.encode(&original, Options::PRETTY).unwrap();
    let back = codec
        .decode(&text, &ValueType::Any, Options::empty())
        .unwrap();
    assert_eq!(back, original, "document was: {text}");
}

#[test]
fn comments_and_document_noise_are_ignored() {
    let model = StaticModel::new();
    let types = TypeRegistry::new();
    let codec = yaml_codec(&model, &types);
    let text = "# generated\nname: test # inline\nscore: 200\n";
    let value = codec
        .decode(text, &ValueType::Any, Options::empty())
        .unwrap();
    let fields = value.as_object().unwrap();
    assert_eq!(fields.get("score"), Some(&Value::Integer(200)));
}

#[test]
fn empty_containers_render_in_flow_form() {
    let model = StaticModel::new();
    let types = TypeRegistry::new();
    let codec = yaml_codec(&model, &types);
    let mut fields = Fields::new();
    fields.insert("tags", Value::Sequence(vec![]));
    fields.insert("meta", Value::Object(Fields::new()));
    let original = Value::Object(fields);
    let text = codec.encode(&original, Options::PRETTY).unwrap();
    assert_eq!(text, "tags: []\nmeta: {}");
    let back = codec
        .decode(&text, &ValueType::Any, Options::empty())
        .unwrap();
    assert_eq!(back, original);
}

#[test]
fn crlf_documents_decode_like_lf() {
    let model = StaticModel::new();
    let types = TypeRegistry::new();
    let codec = yaml_codec(&model, &types);
    let value = codec
        .decode(
            "name: test\r\nscore: 200\r\n",
            &ValueType::Any,
            Options::empty(),
        )
        .unwrap();
    assert_eq!(
        value.as_object().unwrap().get("score"),
        Some(&Value::Integer(200))
    );
}
