use std::io::Write;

use contract_schema_core::{ResponseShape, Shape, pagination};
use contract_schema_service::{
    ApiSchema, CommandSchema, ConfigError, ContractFile, DocumentSchema, JsonTypeRenderer,
    Method, RequestConfig, SchemaError, Toggle,
};
use proptest::prelude::*;
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn person() -> Shape {
    Shape::object([
        ("name", Shape::string()),
        ("age", Shape::number()),
        ("isMarid", Shape::boolean()),
    ])
}

fn list_people() -> ApiSchema {
    ApiSchema::builder()
        .method("get")
        .auth("YES")
        .path("/sss")
        .body(Shape::empty_object())
        .params(Shape::object([
            ("pageSize", Shape::number()),
            ("currentPage", Shape::number()),
        ]))
        .query(Shape::object([("isMarid", Shape::boolean())]))
        .response(ResponseShape::new(person()).list().simple())
        .build()
        .unwrap()
}

fn start_command() -> CommandSchema {
    CommandSchema::builder()
        .key("start")
        .body(Shape::string())
        .params(Shape::object([
            ("global", Shape::boolean()),
            ("flat", Shape::literal("UAE")),
        ]))
        .response(Shape::empty_object())
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// API contracts
// ---------------------------------------------------------------------------

#[test]
fn test_api_full_path_scenario() {
    let api = list_people();
    let params = json!({ "currentPage": 10, "pageSize": 12 });

    assert_eq!(
        api.make_full_path(&params, &["pageSize", "currentPage"]).unwrap(),
        "/sss/12/10"
    );
    assert_eq!(
        api.make_full_path(&params, &["currentPage", "pageSize"]).unwrap(),
        "/sss/10/12"
    );
    assert_eq!(
        api.make_full_path_shape(&["pageSize", "currentPage"]).unwrap(),
        "/sss/:pageSize/:currentPage"
    );
}

#[test]
fn test_api_identity_fields() {
    let api = list_people();
    assert_eq!(api.method(), Method::Get);
    assert_eq!(api.auth(), Toggle::Yes);
    assert_eq!(api.disable(), Toggle::No);
    assert_eq!(api.path(), "/sss");
    assert!(api.need_authentication());
    assert!(!api.is_disabled());
}

#[test]
fn test_api_response_round_trip() {
    let api = list_people();
    let response = json!({
        "data": [
            { "name": "Ada", "age": 36, "isMarid": false, "extra": "dropped" },
        ],
    });
    let once = api.make_response(&response).unwrap();
    assert_eq!(
        once,
        json!({ "data": [{ "name": "Ada", "age": 36, "isMarid": false }] })
    );
    assert_eq!(api.make_response(&once).unwrap(), once);
}

#[test]
fn test_api_paginated_response() {
    let api = ApiSchema::builder()
        .method("GET")
        .auth("NO")
        .path("/people")
        .body(Shape::empty_object())
        .params(Shape::empty_object())
        .query(Shape::empty_object())
        .response(ResponseShape::new(person()).list().with_pagination())
        .build()
        .unwrap();

    let ok = json!({
        "pagination": { "currentPage": 1, "totalItems": 0, "itemsPerPage": 20 },
        "data": [],
    });
    assert!(api.make_response(&ok).is_ok());

    let err = api
        .make_response(&json!({ "pagination": { "currentPage": 0 }, "data": [] }))
        .unwrap_err();
    let paths: Vec<String> = err.issues().iter().map(|i| i.path_string()).collect();
    assert!(paths.contains(&"pagination.currentPage".to_string()));
    assert!(paths.contains(&"pagination.totalItems".to_string()));
    assert!(pagination().is_valid(&ok["pagination"]));
}

#[test]
fn test_api_request_config_collects_all_failures() {
    let api = list_people();
    let err = api
        .make_request_config(&RequestConfig {
            body: json!({}),
            params: json!({ "pageSize": "big", "currentPage": 1 }),
            query: json!({}),
        })
        .unwrap_err();
    assert_eq!(err.top_level_keys(), vec!["params", "query"]);
}

#[test]
fn test_api_parameter_order_errors() {
    let api = list_people();
    let params = json!({ "currentPage": 10, "pageSize": 12 });

    assert!(matches!(
        api.make_full_path(&params, &["pageSize", "offset"]),
        Err(SchemaError::UnknownParam(name)) if name == "offset"
    ));
    assert!(matches!(
        api.make_full_path(&params, &["pageSize", "pageSize"]),
        Err(SchemaError::DuplicateParam(name)) if name == "pageSize"
    ));
    assert!(matches!(
        api.make_full_path(&json!({ "pageSize": "x", "currentPage": 1 }), &["pageSize"]),
        Err(SchemaError::Validation(_))
    ));
}

#[test]
fn test_api_config_errors() {
    let base = ApiSchema::builder()
        .method("get")
        .auth("YES")
        .path("/x")
        .body(Shape::any())
        .params(Shape::empty_object())
        .query(Shape::empty_object())
        .response(Shape::any());

    assert_eq!(
        base.clone().method("trace").build().unwrap_err(),
        ConfigError::InvalidMethod("trace".to_string())
    );
    assert!(matches!(
        base.clone().disable("maybe").build().unwrap_err(),
        ConfigError::InvalidToggle { field: "disable", .. }
    ));
    assert!(matches!(
        base.clone().query(Shape::boolean()).build().unwrap_err(),
        ConfigError::NotObjectShape { field: "query", .. }
    ));
    assert!(base.disable("YES").build().unwrap().is_disabled());
}

// ---------------------------------------------------------------------------
// Command contracts
// ---------------------------------------------------------------------------

#[test]
fn test_command_full_path_scenario() {
    let start = start_command();
    let path = start
        .make_full_path(&json!({ "global": true, "flat": "UAE" }))
        .unwrap();
    assert!(path.starts_with("start "));
    assert_eq!(path, "start --global=true--flat=UAE");
}

#[test]
fn test_command_shape_and_value_align() {
    let rendered = start_command()
        .stringify_params(&json!({ "global": false, "flat": "UAE" }))
        .unwrap();
    assert_eq!(rendered.shape, "--global=boolean--flat=string");
    assert_eq!(rendered.value, "--global=false--flat=UAE");
}

#[test]
fn test_command_rejects_wrong_literal() {
    let err = start_command()
        .make_params(&json!({ "global": true, "flat": "UK" }))
        .unwrap_err();
    assert_eq!(err.len(), 1);
    assert_eq!(err.issues()[0].path_string(), "flat");
}

// ---------------------------------------------------------------------------
// Document contracts
// ---------------------------------------------------------------------------

#[test]
fn test_document_full_document() {
    let user = DocumentSchema::builder()
        .key("user")
        .document(Shape::object([("name", Shape::string())]))
        .build()
        .unwrap();
    assert_eq!(user.full_key(), "users");

    let stored = json!({
        "name": "Ada",
        "id": "65E1F0A2B3C4D5E6F7A8B9C0",
        "createdAt": "2024-03-01T13:00:00+01:00",
        "updatedAt": "2024-03-01T12:00:00Z",
    });
    let out = user.make_full_document(&stored).unwrap();
    assert_eq!(out["id"], json!("65e1f0a2b3c4d5e6f7a8b9c0"));
    assert_eq!(out["createdAt"], json!("2024-03-01T12:00:00.000Z"));

    let mut missing = stored.clone();
    missing.as_object_mut().unwrap().remove("updatedAt");
    assert!(!user.full_document().is_valid(&missing));
}

// ---------------------------------------------------------------------------
// Contract files
// ---------------------------------------------------------------------------

#[test]
fn test_contract_file_end_to_end() {
    let yaml = r#"
version: "1.0"
endpoints:
  getUser:
    method: get
    auth: "YES"
    path: /users
    body: { type: object }
    params:
      type: object
      fields:
        id: { type: object_id }
    query: { type: object }
    response:
      type: object
      fields:
        data:
          type: object
          fields:
            name: { type: string }
commands:
  deploy:
    key: deploy
    body: { type: any }
    params:
      type: object
      fields:
        env: { type: string }
        dry: { type: boolean }
    response: { type: any }
"#;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contracts.yml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file.flush().unwrap();

    let set = ContractFile::load(&path).unwrap().build().unwrap();
    assert_eq!(set.endpoint_count(), 1);
    assert_eq!(set.command_count(), 1);
    assert_eq!(set.document_count(), 0);

    let get_user = set.endpoint("getUser").unwrap();
    assert_eq!(
        get_user
            .make_full_path(&json!({ "id": "65e1f0a2b3c4d5e6f7a8b9c0" }), &["id"])
            .unwrap(),
        "/users/65e1f0a2b3c4d5e6f7a8b9c0"
    );

    let deploy = set.command("deploy").unwrap();
    assert_eq!(
        deploy
            .make_full_path(&json!({ "env": "prod", "dry": true }))
            .unwrap(),
        "deploy --env=prod--dry=true"
    );
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

const API_PARAMS: [&str; 3] = ["name", "count", "flag"];

fn api_with_three_params() -> ApiSchema {
    ApiSchema::builder()
        .method("get")
        .auth("NO")
        .path("/items")
        .body(Shape::any())
        .params(Shape::object([
            ("name", Shape::string()),
            ("count", Shape::integer()),
            ("flag", Shape::boolean()),
        ]))
        .query(Shape::empty_object())
        .response(Shape::any())
        .build()
        .unwrap()
}

fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn substituted_segment(params: &Value, name: &str) -> String {
    urlencoding::encode(&param_text(&params[name])).into_owned()
}

fn arb_params() -> impl Strategy<Value = Value> {
    ("[a-z0-9 /%?#]{0,8}", any::<i32>(), any::<bool>())
        .prop_map(|(name, count, flag)| json!({ "name": name, "count": count, "flag": flag }))
}

fn arb_order() -> impl Strategy<Value = Vec<&'static str>> {
    (Just(API_PARAMS.to_vec()).prop_shuffle(), 0..=API_PARAMS.len())
        .prop_map(|(names, len)| names.into_iter().take(len).collect())
}

proptest! {
    #[test]
    fn api_shape_and_value_segments_align(params in arb_params(), order in arb_order()) {
        let api = api_with_three_params();
        let rendered = api.stringify_params(&params, &order).unwrap();

        let shape: Vec<&str> = rendered.shape.split('/').collect();
        let value: Vec<&str> = rendered.value.split('/').collect();
        prop_assert_eq!(shape.len(), value.len());
        prop_assert_eq!(shape.len(), order.len() + 1);
        for ((placeholder, segment), name) in shape.iter().zip(&value).skip(1).zip(&order) {
            prop_assert_eq!(*placeholder, format!(":{name}"));
            let expected = urlencoding::encode(&param_text(&params[*name])).into_owned();
            prop_assert_eq!(*segment, expected);
        }

        let substituted: String = order
            .iter()
            .map(|name| format!("/{}", urlencoding::encode(&param_text(&params[*name]))))
            .collect();
        let rebuilt = order.iter().fold(rendered.shape.clone(), |acc, name| {
            acc.replacen(&format!(":{name}"), &substituted_segment(&params, name), 1)
        });
        prop_assert_eq!(&rebuilt, &rendered.value);
        prop_assert_eq!(&substituted, &rendered.value);

        let full = api.make_full_path(&params, &order).unwrap();
        prop_assert_eq!(full, format!("/items{}", rendered.value));
    }

    #[test]
    fn command_tokens_align(env in "[a-z]{0,6}", level in any::<i16>(), dry in any::<bool>()) {
        let command = CommandSchema::builder()
            .key("run")
            .body(Shape::any())
            .params(Shape::object([
                ("env", Shape::string()),
                ("level", Shape::integer()),
                ("dry", Shape::boolean()),
            ]))
            .response(Shape::any())
            .token_separator("\n")
            .kind_renderer(JsonTypeRenderer)
            .build()
            .unwrap();

        let params = json!({ "env": env, "level": level, "dry": dry });
        let rendered = command.stringify_params(&params).unwrap();
        let shape: Vec<&str> = rendered.shape.lines().collect();
        let value: Vec<&str> = rendered.value.lines().collect();
        prop_assert_eq!(shape.len(), 3);
        prop_assert_eq!(value.len(), 3);
        for (s, v) in shape.iter().zip(&value) {
            let s_name = s.split('=').next().unwrap_or_default();
            let v_name = v.split('=').next().unwrap_or_default();
            prop_assert_eq!(s_name, v_name);
        }
    }

    #[test]
    fn make_params_is_idempotent(params in arb_params()) {
        let api = api_with_three_params();
        let once = api.make_params(&params).unwrap();
        let twice = api.make_params(&once).unwrap();
        prop_assert_eq!(once, twice);
    }
}

#[test]
fn test_descriptors_are_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiSchema>();
    assert_send_sync::<CommandSchema>();
    assert_send_sync::<DocumentSchema>();
}
