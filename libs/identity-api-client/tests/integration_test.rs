use std::io::Write;

use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use identity_api_client::{
    ApiClient, ApiClientConfig, ApiError, AppCredentials, CollectionFormat, DateFormat, Operation,
    Verb,
};
use serde::Deserialize;
use serde_json::json;

const AUTHORIZATION: &str = "Client ZGFzaGJvYXJkOmRhc2hib2FyZA==";

#[derive(Debug, Deserialize, PartialEq)]
struct Challenge {
    #[serde(rename = "questionSetId")]
    question_set_id: String,
    question: String,
}

/// Client pointed at the mock server with the dashboard application credentials
fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::from_config(ApiClientConfig {
        base_path: server.url("/api/identity/recovery/v0.9"),
        credentials: AppCredentials::new("dashboard", "dashboard"),
        ..ApiClientConfig::default()
    })
    .unwrap()
}

#[test]
fn test_get_decodes_typed_result() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/identity/recovery/v0.9/questions/challenges")
            .query_param("username", "admin")
            .header("authorization", AUTHORIZATION)
            .header("accept", "application/json");
        then.status(200)
            .header("Content-Type", "application/json")
            .header("X-Request-Id", "req-1")
            .json_body(json!({
                "questionSetId": "city",
                "question": "Birth city?",
                "locale": "en_US"
            }));
    });

    let operation = Operation::builder()
        .path("/questions/challenges")
        .query("username", "admin")
        .accepts(["application/xml", "application/json"])
        .build()
        .unwrap();

    let response = client_for(&server)
        .invoke::<Challenge>(&operation)
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["x-request-id"], vec!["req-1"]);
    assert_eq!(
        response.into_data(),
        Some(Challenge {
            question_set_id: "city".to_owned(),
            question: "Birth city?".to_owned(),
        })
    );

    mock.assert();
}

#[test]
fn test_empty_success_body_has_no_data() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/identity/recovery/v0.9/set-password")
            .header("content-type", "application/json")
            .json_body(json!({"key": "k-1", "password": "Passw0rd!"}));
        then.status(200);
    });

    let operation = Operation::builder()
        .verb(Verb::Post)
        .path("/set-password")
        .json(&json!({"key": "k-1", "password": "Passw0rd!", "properties": null}))
        .unwrap()
        .content_types(["application/json"])
        .build()
        .unwrap();

    let response = client_for(&server)
        .invoke::<serde_json::Value>(&operation)
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.data().is_none());

    mock.assert();
}

#[test]
fn test_no_content_is_reported_as_error() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(DELETE).path("/api/identity/recovery/v0.9/me");
        then.status(204).header("X-Trace", "t-1");
    });

    let operation = Operation::builder()
        .verb(Verb::Delete)
        .path("/me")
        .build()
        .unwrap();

    let err = client_for(&server)
        .invoke_without_result(&operation)
        .unwrap_err();

    assert!(matches!(err, ApiError::NoContent { .. }));
    assert_eq!(err.status(), 204);
    assert_eq!(err.message(), "No content Found");
    assert_eq!(err.headers().unwrap()["x-trace"], vec!["t-1"]);

    mock.assert();
}

#[test]
fn test_remote_error_keeps_status_and_body() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/identity/recovery/v0.9/missing");
        then.status(404)
            .header("Content-Type", "application/json")
            .body(r#"{"error":"not found"}"#);
    });

    let operation = Operation::builder().path("/missing").build().unwrap();

    let err = client_for(&server)
        .invoke::<serde_json::Value>(&operation)
        .unwrap_err();

    assert_eq!(err.status(), 404);
    assert_eq!(err.message(), r#"{"error":"not found"}"#);
    assert_eq!(err.body(), Some(r#"{"error":"not found"}"#));
    assert_eq!(
        err.headers().unwrap()["content-type"],
        vec!["application/json"]
    );

    mock.assert();
}

#[test]
fn test_patch_travels_as_post_with_override() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/identity/recovery/v0.9/me")
            .header("x-http-method-override", "PATCH")
            .json_body(json!({"givenName": "Ann"}));
        then.status(200).json_body(json!({"id": "u-1"}));
    });

    let operation = Operation::builder()
        .verb(Verb::Patch)
        .path("/me")
        .json(&json!({"givenName": "Ann"}))
        .unwrap()
        .content_types(["application/json"])
        .build()
        .unwrap();

    let response = client_for(&server)
        .invoke::<serde_json::Value>(&operation)
        .unwrap();

    assert_eq!(response.data(), Some(&json!({"id": "u-1"})));

    mock.assert();
}

#[test]
fn test_custom_date_format_applies_to_query_and_body() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/identity/recovery/v0.9/audits")
            .query_param("since", "01/06/2021")
            .json_body(json!({"since": "01/06/2021", "reason": "review"}));
        then.status(201);
    });

    let client = client_for(&server)
        .with_date_format(DateFormat::new("%d/%m/%Y").unwrap())
        .unwrap();
    let since = Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap();

    let operation = Operation::builder()
        .verb(Verb::Post)
        .path("/audits")
        .query("since", since)
        .json(&json!({"since": since, "reason": "review"}))
        .unwrap()
        .content_types(["application/json"])
        .build()
        .unwrap();

    let response = client.invoke_without_result(&operation).unwrap();
    assert_eq!(response.status(), 201);

    mock.assert();
}

#[test]
fn test_form_urlencoded_body() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/identity/recovery/v0.9/validate-code")
            .header("content-type", "application/x-www-form-urlencoded")
            .body("code=1234+5678&step=UPDATE_PASSWORD");
        then.status(202);
    });

    let operation = Operation::builder()
        .verb(Verb::Post)
        .path("/validate-code")
        .form_param("code", "1234 5678")
        .form_param("step", "UPDATE_PASSWORD")
        .content_types(["application/x-www-form-urlencoded"])
        .build()
        .unwrap();

    let response = client_for(&server)
        .invoke_without_result(&operation)
        .unwrap();

    assert_eq!(response.status(), 202);

    mock.assert();
}

#[test]
fn test_multipart_upload_with_file() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(PUT).path("/api/identity/recovery/v0.9/me/avatar");
        then.status(200);
    });

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"avatar-bytes").unwrap();

    let operation = Operation::builder()
        .verb(Verb::Put)
        .path("/me/avatar")
        .form_param("description", "profile picture")
        .form_file("file", file.path())
        .content_types(["multipart/form-data"])
        .build()
        .unwrap();

    let response = client_for(&server)
        .invoke_without_result(&operation)
        .unwrap();

    assert_eq!(response.status(), 200);

    mock.assert();
}

#[test]
fn test_default_headers_and_call_override() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/identity/recovery/v0.9/claims")
            .header("x-tenant", "wso2.com")
            .header("x-client", "portal");
        then.status(200).json_body(json!([]));
    });

    let client = client_for(&server)
        .with_default_header("X-Tenant", "carbon.super")
        .with_default_header("X-Client", "portal");

    let operation = Operation::builder()
        .path("/claims")
        .header("X-Tenant", "wso2.com")
        .unwrap()
        .build()
        .unwrap();

    let response = client.invoke::<Vec<serde_json::Value>>(&operation).unwrap();
    assert_eq!(response.into_data(), Some(vec![]));

    mock.assert();
}

#[test]
fn test_query_parameters_are_escaped_and_expanded() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/identity/recovery/v0.9/users")
            .query_param("filter", "name eq admin")
            .query_param("attributes", "email,phone");
        then.status(200).json_body(json!({"total": 1}));
    });

    let operation = Operation::builder()
        .path("/users")
        .query("filter", "name eq admin")
        .query_with_format(CollectionFormat::Csv, "attributes", vec!["email", "phone"])
        .query("cursor", None::<String>)
        .build()
        .unwrap();

    let response = client_for(&server)
        .invoke::<serde_json::Value>(&operation)
        .unwrap();
    assert_eq!(response.data(), Some(&json!({"total": 1})));

    mock.assert();
}

#[test]
fn test_redirect_is_not_followed() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/identity/recovery/v0.9/old");
        then.status(302).header("Location", "/elsewhere");
    });

    let operation = Operation::builder().path("/old").build().unwrap();

    let err = client_for(&server)
        .invoke_without_result(&operation)
        .unwrap_err();

    assert_eq!(err.status(), 302);
    assert_eq!(err.message(), "error");

    mock.assert();
}

#[test]
fn test_connection_failure_is_generic_transport_error() {
    let client = ApiClient::from_config(ApiClientConfig {
        base_path: "http://127.0.0.1:1/api".to_owned(),
        connect_timeout_ms: 500,
        ..ApiClientConfig::default()
    })
    .unwrap();

    let operation = Operation::builder().path("/me").build().unwrap();

    let err = client.invoke_without_result(&operation).unwrap_err();

    assert!(matches!(err, ApiError::Transport { .. }));
    assert_eq!(err.status(), 500);
    assert_eq!(err.message(), "Error while accessing the backend service");
    assert!(err.headers().is_none());
}

#[test]
fn test_body_and_form_fail_before_any_request() {
    let err = Operation::builder()
        .verb(Verb::Post)
        .path("/recover-username")
        .json(&json!({"claims": []}))
        .unwrap()
        .form_param("tenant-domain", "carbon.super")
        .build()
        .unwrap_err();

    assert!(matches!(err, ApiError::Contract { .. }));
    assert_eq!(err.status(), 500);
}
