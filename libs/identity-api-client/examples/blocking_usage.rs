//! Blocking usage example for the identity API client
//!
//! Walks through a password recovery flow against a running identity server.
//!
//! To run this example:
//! ```bash
//! export IDENTITY_API_BASE_PATH="https://localhost:9443/api/identity/recovery/v0.9"
//! export IDENTITY_API_CREDENTIALS__APP_NAME="dashboard"
//! export IDENTITY_API_CREDENTIALS__APP_PASSWORD="dashboard"
//! cargo run --example blocking_usage
//! ```

use identity_api_client::{ApiClient, ApiClientConfig, ApiError, Operation, Verb};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ApiClientConfig::from_env()?;
    let client = ApiClient::from_config(config)?.with_debugging(true)?;

    println!("=== Example 1: Typed GET ===\n");

    let challenges = Operation::builder()
        .path("/questions/challenges")
        .query("username", "admin")
        .accepts(["application/json"])
        .build()?;

    match client.invoke::<serde_json::Value>(&challenges) {
        Ok(response) => {
            println!("Status: {}", response.status());
            if let Some(data) = response.data() {
                println!("Challenges: {data}\n");
            }
        }
        Err(e) => println!("Failed with {}: {}\n", e.status(), e.message()),
    }

    println!("=== Example 2: JSON POST ===\n");

    let recover = Operation::builder()
        .verb(Verb::Post)
        .path("/recover-password")
        .query("type", "email")
        .query("notify", true)
        .json(&json!({"user": {"username": "admin", "realm": "PRIMARY"}}))?
        .accepts(["application/json"])
        .content_types(["application/json"])
        .build()?;

    match client.invoke_without_result(&recover) {
        Ok(response) => println!("Recovery started: {}\n", response.status()),
        Err(ApiError::NoContent { .. }) => println!("Recovery started, nothing returned\n"),
        Err(e) => println!("Failed with {}: {}\n", e.status(), e.message()),
    }

    println!("=== Example 3: Form POST ===\n");

    let validate = Operation::builder()
        .verb(Verb::Post)
        .path("/validate-code")
        .form_param("code", "1234-5678")
        .content_types(["application/x-www-form-urlencoded"])
        .build()?;

    if let Err(e) = client.invoke_without_result(&validate) {
        println!("Failed with {}: {}", e.status(), e.message());
        if let Some(body) = e.body() {
            println!("Body: {body}");
        }
    }

    Ok(())
}
