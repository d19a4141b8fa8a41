//! Shared fixtures for the wiremock-backed integration tests.

use openai_assistants::{Client, Credentials};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const API_KEY: &str = "test-api-key";

/// Starts a mock server and a client pointed at it.
pub async fn start() -> (MockServer, Client) {
    let server = MockServer::start().await;
    let credentials = Credentials::new(API_KEY, server.uri());
    let client = Client::new(credentials).expect("client should build");
    (server, client)
}

/// A run object as returned by the server, with the given status and no
/// pending action.
pub fn run_json(run_id: &str, status: &str) -> Value {
    json!({
        "id": run_id,
        "object": "thread.run",
        "created_at": 1_699_000_000u64,
        "thread_id": "thread_1",
        "assistant_id": "asst_1",
        "status": status,
        "required_action": null,
        "last_error": null,
        "model": "gpt-4-1106-preview",
        "instructions": "You are a helpful assistant.",
        "tools": [],
        "file_ids": [],
        "metadata": {}
    })
}

/// A run paused on `requires_action`, listing the given pending calls as
/// `(tool_call_id, function_name, json_arguments)` triples.
pub fn run_requiring_action(run_id: &str, calls: &[(&str, &str, &str)]) -> Value {
    let tool_calls: Vec<Value> = calls
        .iter()
        .map(|(id, name, arguments)| {
            json!({
                "id": id,
                "type": "function",
                "function": { "name": name, "arguments": arguments }
            })
        })
        .collect();
    let mut run = run_json(run_id, "requires_action");
    run["required_action"] = json!({
        "type": "submit_tool_outputs",
        "submit_tool_outputs": { "tool_calls": tool_calls }
    });
    run
}

/// A message object inside a thread.
pub fn message_json(message_id: &str, role: &str, text: &str) -> Value {
    json!({
        "id": message_id,
        "object": "thread.message",
        "created_at": 1_699_000_100u64,
        "thread_id": "thread_1",
        "role": role,
        "content": [
            { "type": "text", "text": { "value": text, "annotations": [] } }
        ],
        "assistant_id": null,
        "run_id": null,
        "file_ids": [],
        "metadata": {}
    })
}

/// A one-page list response.
pub fn page_json(data: Vec<Value>, has_more: bool) -> Value {
    let first_id = data.first().and_then(|v| v["id"].as_str().map(String::from));
    let last_id = data.last().and_then(|v| v["id"].as_str().map(String::from));
    json!({
        "object": "list",
        "data": data,
        "first_id": first_id,
        "last_id": last_id,
        "has_more": has_more
    })
}
