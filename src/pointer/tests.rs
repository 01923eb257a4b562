//! Tests for pointer module

use super::*;
use pretty_assertions::assert_eq;
use test_case::test_case;

const BODY: &str = r#"{
    "data": [{"id": 1}, {"id": 2}],
    "meta": {"next_cursor": "abc", "total": 42, "has_more": true, "prev": null},
    "links": {"next": "https://api.example.com/items?page=2"},
    "a/b": "slash",
    "m~n": "tilde"
}"#;

const HEADERS: &str = r#"{"Link": "<https://api.example.com/items?page=3>", "x-total-count": "42"}"#;

// ============================================================================
// Address Parsing Tests
// ============================================================================

#[test_case("$request.query#/offset", Scope::RequestQuery, "/offset")]
#[test_case("$request.headers#/X-Cursor", Scope::RequestHeader, "/X-Cursor")]
#[test_case("$request.path#/user_id", Scope::RequestPath, "/user_id")]
#[test_case("$request.body#/filter/page", Scope::RequestBody, "/filter/page")]
#[test_case("$response.body#/meta/next", Scope::ResponseBody, "/meta/next")]
#[test_case("$response.headers#/link", Scope::ResponseHeaders, "/link")]
fn test_parse_valid_address(address: &str, scope: Scope, path: &str) {
    let pointer = ScopedPointer::parse(address).unwrap();
    assert_eq!(pointer.scope(), scope);
    assert_eq!(pointer.path(), path);
    assert_eq!(pointer.to_string(), address);
}

#[test]
fn test_parse_missing_separator() {
    let err = ScopedPointer::parse("$response.body/nextCursor").unwrap_err();
    assert_eq!(
        err,
        AddressError::MissingSeparator("$response.body/nextCursor".to_string())
    );
}

#[test]
fn test_parse_empty_path() {
    let err = ScopedPointer::parse("$request.query#").unwrap_err();
    assert!(matches!(err, AddressError::EmptyPath(_)));
}

#[test]
fn test_parse_relative_path() {
    let err = ScopedPointer::parse("$request.query#offset").unwrap_err();
    assert_eq!(err, AddressError::RelativePath("offset".to_string()));
}

#[test]
fn test_parse_unknown_scope() {
    let err = "$request.cookies#/session".parse::<ScopedPointer>().unwrap_err();
    assert_eq!(err, AddressError::UnknownScope("$request.cookies".to_string()));
}

#[test]
fn test_split_first_token() {
    let pointer = ScopedPointer::parse("$request.body#/filter/page").unwrap();
    assert_eq!(pointer.split_first(), ("filter".to_string(), "/page"));

    let pointer = ScopedPointer::parse("$request.query#/page").unwrap();
    assert_eq!(pointer.split_first(), ("page".to_string(), ""));

    let pointer = ScopedPointer::parse("$request.query#/a~1b/c").unwrap();
    assert_eq!(pointer.split_first(), ("a/b".to_string(), "/c"));
}

#[test]
fn test_scope_sides() {
    assert!(Scope::RequestBody.is_request());
    assert!(!Scope::RequestBody.is_response());
    assert!(Scope::ResponseHeaders.is_response());
    assert_eq!(Scope::from_token("$request.path"), Some(Scope::RequestPath));
    assert_eq!(Scope::from_token("$request"), None);
}

// ============================================================================
// Resolver Tests
// ============================================================================

#[test_case("$response.body#/meta/next_cursor", "abc"; "string is unquoted")]
#[test_case("$response.body#/meta/total", "42"; "number as text")]
#[test_case("$response.body#/meta/has_more", "true"; "boolean as text")]
#[test_case("$response.body#/data/1/id", "2"; "array index")]
#[test_case("$response.body#/data/0", r#"{"id":1}"#; "object as json")]
#[test_case("$response.body#/a~1b", "slash"; "escaped slash")]
#[test_case("$response.body#/m~0n", "tilde"; "escaped tilde")]
#[test_case("$response.headers#/x-total-count", "42"; "header")]
#[test_case("$response.headers#/link", "<https://api.example.com/items?page=3>"; "header ignores case")]
fn test_resolve_found(address: &str, expected: &str) {
    assert_eq!(
        resolve(address, Some(BODY), Some(HEADERS)),
        Some(expected.to_string())
    );
}

#[test]
fn test_resolve_null_is_not_found() {
    assert_eq!(
        resolve_value("$response.body#/meta/prev", Some(BODY), None),
        Resolution::NotFound
    );
}

#[test]
fn test_resolve_missing_path() {
    assert_eq!(
        resolve_value("$response.body#/meta/missing", Some(BODY), None),
        Resolution::NotFound
    );
}

#[test]
fn test_resolve_absent_document() {
    assert_eq!(
        resolve_value("$response.body#/meta/total", None, Some(HEADERS)),
        Resolution::NotFound
    );
    assert_eq!(
        resolve_value("$response.headers#/link", Some(BODY), None),
        Resolution::NotFound
    );
}

#[test]
fn test_resolve_unparseable_document() {
    assert_eq!(
        resolve_value("$response.body#/meta", Some("<html>oops</html>"), None),
        Resolution::NotFound
    );
}

#[test_case("$response.body/meta/total"; "missing separator")]
#[test_case("$response.body#"; "empty path")]
#[test_case("$request.query#/meta"; "request scope")]
#[test_case("$request.body#/meta"; "request body scope")]
#[test_case("$response.cookies#/meta"; "unknown scope")]
fn test_resolve_invalid(address: &str) {
    assert_eq!(
        resolve_value(address, Some(BODY), Some(HEADERS)),
        Resolution::Invalid
    );
    assert_eq!(resolve(address, Some(BODY), Some(HEADERS)), None);
}

// ============================================================================
// Resolution Tests
// ============================================================================

#[test]
fn test_resolution_helpers() {
    let resolved = Resolution::Resolved(2);
    assert!(resolved.is_resolved());
    assert_eq!(resolved.clone().map(|v| v * 2), Resolution::Resolved(4));
    assert_eq!(resolved.ok(), Some(2));

    let missing: Resolution<i32> = None.into();
    assert_eq!(missing, Resolution::NotFound);
    assert!(!missing.is_invalid());

    let invalid: Resolution<i32> = Resolution::Invalid;
    assert!(invalid.is_invalid());
    assert_eq!(invalid.and_then(|v| Resolution::Resolved(v + 1)), Resolution::Invalid);
}
