//! Tests for request module

use super::*;
use crate::pointer::Resolution;
use crate::types::{JsonValue, Method};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn sample_request() -> RequestBuilder {
    RequestBuilder::get("/users/{user_id}/items")
        .template_param("user_id", 7)
        .query_param("offset", 10)
        .query_param("cursor", "abc")
        .query_param("include_archived", false)
        .header("X-Page-Token", "tok")
}

// ============================================================================
// Builder Tests
// ============================================================================

#[test]
fn test_builder_defaults() {
    let request = RequestBuilder::default();
    assert_eq!(request.method(), Method::GET);
    assert!(request.path().is_empty());
    assert!(request.body().is_empty());
}

#[test]
fn test_builder_collects_parameters() {
    let request = sample_request();
    assert_eq!(request.query_value("offset"), Some(&json!(10)));
    assert_eq!(request.header_value("x-page-token"), Some(&json!("tok")));
    assert_eq!(request.template_parameters().get("user_id"), Some(&json!(7)));
}

#[test]
fn test_form_params_accumulate() {
    let request = RequestBuilder::post("/upload")
        .form_param("name", "report")
        .form_file("file", FileWrapper::new("data").with_file_name("r.csv"));

    let RequestBody::Form(fields) = request.body() else {
        panic!("Expected form body");
    };
    assert_eq!(fields.len(), 2);
    assert_eq!(fields.get("name"), Some(&FormField::Value(json!("report"))));
}

#[test]
fn test_with_query_parameters_merges() {
    let request = sample_request();
    let next = request.with_query_parameters([("cursor", json!("def")), ("limit", json!(5))]);

    assert_eq!(next.query_value("cursor"), Some(&json!("def")));
    assert_eq!(next.query_value("limit"), Some(&json!(5)));
    assert_eq!(next.query_value("offset"), Some(&json!(10)));
    // original untouched
    assert_eq!(request.query_value("cursor"), Some(&json!("abc")));
}

#[test]
fn test_query_pairs_flatten() {
    let request = RequestBuilder::get("/items")
        .query_param("tag", json!(["a", "b"]))
        .query_param("filter", json!({"status": "open", "owner": {"id": 3}}))
        .query_param("skip", JsonValue::Null)
        .query_param("q", "x y");

    assert_eq!(
        request.query_pairs(),
        vec![
            ("filter[owner][id]".to_string(), "3".to_string()),
            ("filter[status]".to_string(), "open".to_string()),
            ("q".to_string(), "x y".to_string()),
            ("tag".to_string(), "a".to_string()),
            ("tag".to_string(), "b".to_string()),
        ]
    );
}

#[test]
fn test_header_pairs() {
    let request = RequestBuilder::get("/")
        .header("Accept", json!(["application/json", "text/plain"]))
        .header("X-Skip", JsonValue::Null)
        .header("X-Retry", 3);

    assert_eq!(
        request.header_pairs(),
        vec![
            ("Accept".to_string(), "application/json,text/plain".to_string()),
            ("X-Retry".to_string(), "3".to_string()),
        ]
    );
}

#[test]
fn test_build_url() {
    let url = sample_request().build_url("https://api.example.com/v1/").unwrap();
    assert_eq!(
        url.as_str(),
        "https://api.example.com/v1/users/7/items?cursor=abc&include_archived=false&offset=10"
    );
}

#[test]
fn test_build_url_absolute_path() {
    let url = RequestBuilder::get("https://other.example.com/list")
        .build_url("https://api.example.com")
        .unwrap();
    assert_eq!(url.as_str(), "https://other.example.com/list");
}

#[test]
fn test_build_url_missing_template_param() {
    let err = RequestBuilder::get("/users/{user_id}")
        .build_url("https://api.example.com")
        .unwrap_err();
    assert!(err.to_string().contains("user_id"));
}

// ============================================================================
// Mutator Tests
// ============================================================================

#[test]
fn test_update_query_keeps_number_shape() {
    let updated = sample_request()
        .update_by_reference("$request.query#/offset", |_| Some(json!("25")))
        .ok()
        .unwrap();
    assert_eq!(updated.query_value("offset"), Some(&json!(25)));
}

#[test]
fn test_update_query_keeps_string_shape() {
    let updated = sample_request()
        .update_by_reference("$request.query#/cursor", |_| Some(json!(99)))
        .ok()
        .unwrap();
    assert_eq!(updated.query_value("cursor"), Some(&json!("99")));
}

#[test]
fn test_update_query_keeps_bool_shape() {
    let updated = sample_request()
        .update_by_reference("$request.query#/include_archived", |_| Some(json!("true")))
        .ok()
        .unwrap();
    assert_eq!(updated.query_value("include_archived"), Some(&json!(true)));
}

#[test]
fn test_update_header_ignores_case() {
    let updated = sample_request()
        .update_by_reference("$request.headers#/x-page-token", |_| Some(json!("next")))
        .ok()
        .unwrap();
    assert_eq!(updated.header_value("X-Page-Token"), Some(&json!("next")));
    assert_eq!(updated.headers().len(), 1);
}

#[test]
fn test_update_path_param() {
    let updated = sample_request()
        .update_by_reference("$request.path#/user_id", |current| {
            current.as_i64().map(|id| json!(id + 1))
        })
        .ok()
        .unwrap();
    assert_eq!(updated.render_path().unwrap(), "/users/8/items");
}

#[test]
fn test_update_json_body_nested() {
    let request = RequestBuilder::post("/search").json_body(json!({"page": {"number": 1, "size": 10}}));
    let updated = request
        .update_by_reference("$request.body#/page/number", |_| Some(json!(2)))
        .ok()
        .unwrap();
    assert_eq!(
        updated.body(),
        &RequestBody::Json(json!({"page": {"number": 2, "size": 10}}))
    );
}

#[test]
fn test_update_form_body() {
    let request = RequestBuilder::post("/search").form_param("page", 1);
    let updated = request
        .update_by_reference("$request.body#/page", |_| Some(json!("2")))
        .ok()
        .unwrap();
    let RequestBody::Form(fields) = updated.body() else {
        panic!("Expected form body");
    };
    assert_eq!(fields.get("page"), Some(&FormField::Value(json!(2))));
}

#[test]
fn test_update_declined_is_not_found() {
    let result = sample_request().update_by_reference("$request.query#/offset", |_| None);
    assert_eq!(result, Resolution::NotFound);
}

#[test_case("$request.query#/missing"; "missing query")]
#[test_case("$request.headers#/X-Missing"; "missing header")]
#[test_case("$request.body#/page"; "empty body")]
#[test_case("$request.query#/offset/deeper"; "descend into scalar")]
fn test_update_not_found(address: &str) {
    let result = sample_request().update_by_reference(address, |_| Some(json!(1)));
    assert_eq!(result, Resolution::NotFound);
}

#[test_case("$request.query/offset"; "missing separator")]
#[test_case("$request.query#"; "empty path")]
#[test_case("$response.body#/offset"; "response scope")]
#[test_case("$request.cookie#/offset"; "unknown scope")]
fn test_update_invalid(address: &str) {
    let result = sample_request().update_by_reference(address, |_| Some(json!(1)));
    assert_eq!(result, Resolution::Invalid);
}

#[test]
fn test_binary_body_is_never_rewritten() {
    let request = RequestBuilder::post("/upload").binary_body(FileWrapper::new("raw"));
    let result = request.update_by_reference("$request.body#/anything", |_| Some(json!(1)));
    assert_eq!(result, Resolution::Invalid);
}

#[test]
fn test_form_file_is_not_addressable() {
    let request = RequestBuilder::post("/upload").form_file("file", FileWrapper::new("raw"));
    let result = request.update_by_reference("$request.body#/file", |_| Some(json!(1)));
    assert_eq!(result, Resolution::Invalid);
}

#[test]
fn test_or_keep_returns_original() {
    let request = sample_request();
    let kept = request.update_by_reference_or_keep("$request.query#/missing", |_| Some(json!(1)));
    assert_eq!(kept, request);
}

#[test]
fn test_identity_update_is_idempotent() {
    let request = sample_request();
    for address in [
        "$request.query#/offset",
        "$request.query#/cursor",
        "$request.query#/include_archived",
        "$request.headers#/X-Page-Token",
        "$request.path#/user_id",
    ] {
        let updated = request
            .update_by_reference(address, |current| Some(current.clone()))
            .ok()
            .unwrap();
        assert_eq!(updated, request, "identity update changed {address}");
    }
}

#[test]
fn test_value_by_reference() {
    let request = sample_request();
    assert_eq!(
        request.value_by_reference("$request.query#/offset"),
        Resolution::Resolved(json!(10))
    );
    assert_eq!(
        request.value_by_reference("$request.query#/nope"),
        Resolution::NotFound
    );
    assert_eq!(
        request.value_by_reference("$response.body#/offset"),
        Resolution::Invalid
    );
}

#[test]
fn test_rematerialize() {
    assert_eq!(rematerialize(&json!(1), json!("2.5")), json!(2.5));
    assert_eq!(rematerialize(&json!(1), json!("abc")), json!("abc"));
    assert_eq!(rematerialize(&json!("a"), json!(true)), json!("true"));
    assert_eq!(rematerialize(&json!(false), json!("maybe")), json!("maybe"));
    assert_eq!(rematerialize(&JsonValue::Null, json!("x")), json!("x"));
    assert_eq!(rematerialize(&json!({"a": 1}), json!([1])), json!([1]));
}
