//! The resource surface against a mock server: CRUD decoding, pagination,
//! request headers, error envelopes and the binary endpoints.

mod common;

use std::collections::HashMap;

use common::{message_json, page_json, start, API_KEY};
use openai_assistants::assistants::messages::{Content, MessageRequest, Role};
use openai_assistants::assistants::runs::{StepDetails, StepStatus, ThreadRunRequest};
use openai_assistants::assistants::threads::ThreadRequest;
use openai_assistants::assistants::AssistantRequest;
use openai_assistants::audio::{SpeechRequest, TranscriptionRequest, Voice};
use openai_assistants::chat::{ChatCompletionRequest, ChatMessage};
use openai_assistants::embeddings::EmbeddingsRequest;
use openai_assistants::files::{FileUpload, Purpose};
use openai_assistants::{Error, ListQuery, Order};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn assistant_create_and_delete_round_trip() {
    let (server, client) = start().await;
    Mock::given(method("POST"))
        .and(path("/assistants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "asst_1",
            "object": "assistant",
            "created_at": 1_699_000_000u64,
            "name": "Math tutor",
            "description": null,
            "model": "gpt-4-1106-preview",
            "instructions": "You are a personal math tutor.",
            "tools": [{ "type": "code_interpreter" }],
            "file_ids": [],
            "metadata": {}
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/assistants/asst_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "asst_1",
            "object": "assistant.deleted",
            "deleted": true
        })))
        .mount(&server)
        .await;

    let assistant = client
        .create_assistant(
            &AssistantRequest::builder("gpt-4-1106-preview")
                .name("Math tutor")
                .instructions("You are a personal math tutor.")
                .build()
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(assistant.id, "asst_1");
    assert_eq!(assistant.name.as_deref(), Some("Math tutor"));
    assert_eq!(assistant.tools.len(), 1);

    let ack = client.delete_assistant("asst_1").await.unwrap();
    assert!(ack.deleted);
}

#[tokio::test]
async fn assistant_files_attach_list_and_detach() {
    let (server, client) = start().await;
    let file_json = json!({
        "id": "file-abc",
        "object": "assistant.file",
        "created_at": 1_699_000_000u64,
        "assistant_id": "asst_1"
    });
    Mock::given(method("POST"))
        .and(path("/assistants/asst_1/files"))
        .and(body_json(json!({ "file_id": "file-abc" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/assistants/asst_1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![file_json], false)))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/assistants/asst_1/files/file-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "file-abc",
            "object": "assistant.file.deleted",
            "deleted": true
        })))
        .mount(&server)
        .await;

    let attached = client
        .attach_assistant_file("asst_1", "file-abc")
        .await
        .unwrap();
    assert_eq!(attached.assistant_id, "asst_1");

    let files = client
        .list_assistant_files("asst_1", &ListQuery::default())
        .await
        .unwrap();
    assert_eq!(files.data.len(), 1);
    assert_eq!(files.data[0].id, "file-abc");

    let ack = client
        .delete_assistant_file("asst_1", "file-abc")
        .await
        .unwrap();
    assert!(ack.deleted);
}

#[tokio::test]
async fn run_steps_decode_both_detail_kinds() {
    let (server, client) = start().await;
    let creation_step = json!({
        "id": "step_1",
        "object": "thread.run.step",
        "created_at": 1_699_000_200u64,
        "assistant_id": "asst_1",
        "thread_id": "thread_1",
        "run_id": "run_1",
        "status": "completed",
        "step_details": {
            "type": "message_creation",
            "message_creation": { "message_id": "msg_9" }
        },
        "last_error": null,
        "expired_at": null,
        "cancelled_at": null,
        "failed_at": null,
        "completed_at": 1_699_000_201u64,
        "metadata": {}
    });
    let mut tool_step = creation_step.clone();
    tool_step["id"] = json!("step_2");
    tool_step["step_details"] = json!({
        "type": "tool_calls",
        "tool_calls": [{
            "id": "call_1",
            "type": "function",
            "function": { "name": "getWeather", "arguments": "{}", "output": "18c" }
        }]
    });
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1/steps/step_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(creation_step.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1/steps"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_json(vec![creation_step, tool_step], false)),
        )
        .mount(&server)
        .await;

    let step = client
        .retrieve_run_step("thread_1", "run_1", "step_1")
        .await
        .unwrap();
    assert_eq!(step.status, StepStatus::Completed);
    match &step.step_details {
        StepDetails::MessageCreation { message_creation } => {
            assert_eq!(message_creation.message_id, "msg_9")
        }
        other => panic!("expected message creation, got {other:?}"),
    }

    let steps = client
        .list_run_steps("thread_1", "run_1", &ListQuery::default())
        .await
        .unwrap();
    assert_eq!(steps.data.len(), 2);
    match &steps.data[1].step_details {
        StepDetails::ToolCalls { tool_calls } => assert_eq!(tool_calls.len(), 1),
        other => panic!("expected tool calls, got {other:?}"),
    }
}

#[tokio::test]
async fn thread_and_run_are_created_in_one_request() {
    let (server, client) = start().await;
    Mock::given(method("POST"))
        .and(path("/threads/runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::run_json("run_1", "queued")))
        .expect(1)
        .mount(&server)
        .await;

    let request = ThreadRunRequest::builder(
        "asst_1",
        ThreadRequest::builder()
            .messages(vec![MessageRequest::new(Role::User, "2+2?")])
            .build()
            .unwrap(),
    )
    .build()
    .unwrap();
    let run = client.create_thread_and_run(&request).await.unwrap();
    assert_eq!(run.id, "run_1");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["assistant_id"], "asst_1");
    assert_eq!(body["thread"]["messages"][0]["role"], "user");
    assert_eq!(body["thread"]["messages"][0]["content"], "2+2?");
}

#[tokio::test]
async fn modify_operations_round_trip() {
    let (server, client) = start().await;
    Mock::given(method("POST"))
        .and(path("/assistants/asst_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "asst_1",
            "object": "assistant",
            "created_at": 1_699_000_000u64,
            "name": null,
            "description": null,
            "model": "gpt-4-1106-preview",
            "instructions": "Answer in French.",
            "tools": [],
            "file_ids": [],
            "metadata": {}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "thread_1",
            "object": "thread",
            "created_at": 1_699_000_000u64,
            "metadata": { "owner": "session_9" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs/run_1"))
        .and(body_json(json!({ "metadata": { "phase": "done" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::run_json("run_1", "completed")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/messages/msg_1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(message_json("msg_1", "user", "2+2?")),
        )
        .mount(&server)
        .await;

    let assistant = client
        .modify_assistant(
            "asst_1",
            &AssistantRequest::builder("gpt-4-1106-preview")
                .instructions("Answer in French.")
                .build()
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(assistant.instructions.as_deref(), Some("Answer in French."));

    let thread = client
        .modify_thread(
            "thread_1",
            &ThreadRequest::builder()
                .metadata(HashMap::from([(
                    "owner".to_string(),
                    "session_9".to_string(),
                )]))
                .build()
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        thread.metadata.unwrap().get("owner").map(String::as_str),
        Some("session_9")
    );

    let metadata = HashMap::from([("phase".to_string(), "done".to_string())]);
    let run = client.modify_run("thread_1", "run_1", &metadata).await.unwrap();
    assert_eq!(run.id, "run_1");

    let message = client
        .modify_message("thread_1", "msg_1", &MessageRequest::new(Role::User, "2+2?"))
        .await
        .unwrap();
    assert_eq!(message.id, "msg_1");
}

#[tokio::test]
async fn pagination_follows_last_id_without_overlap() {
    let (server, client) = start().await;
    // Most specific mock first; wiremock picks the first match in mount
    // order.
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/messages"))
        .and(query_param("after", "msg_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![
                message_json("msg_3", "user", "third"),
                message_json("msg_4", "assistant", "fourth"),
            ],
            false,
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![
                message_json("msg_1", "user", "first"),
                message_json("msg_2", "assistant", "second"),
            ],
            true,
        )))
        .mount(&server)
        .await;

    let query = ListQuery::default().order(Order::Asc).limit(2);
    let first = client.list_messages("thread_1", &query).await.unwrap();
    assert!(first.has_more);
    assert_eq!(first.last_id.as_deref(), Some("msg_2"));

    let second = client
        .list_messages(
            "thread_1",
            &query.clone().after(first.last_id.clone().unwrap()),
        )
        .await
        .unwrap();
    assert!(!second.has_more);

    let first_ids: Vec<_> = first.data.iter().map(|m| m.id.as_str()).collect();
    for message in &second.data {
        assert!(!first_ids.contains(&message.id.as_str()));
    }
}

#[tokio::test]
async fn message_content_blocks_survive_the_wire() {
    let (server, client) = start().await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/messages/msg_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "object": "thread.message",
            "created_at": 1_699_000_100u64,
            "thread_id": "thread_1",
            "role": "assistant",
            "content": [
                { "type": "text", "text": { "value": "see the chart", "annotations": [] } },
                { "type": "image_file", "image_file": { "file_id": "file-abc" } }
            ],
            "assistant_id": "asst_1",
            "run_id": "run_1",
            "file_ids": [],
            "metadata": {}
        })))
        .mount(&server)
        .await;

    let message = client.retrieve_message("thread_1", "msg_1").await.unwrap();
    assert_eq!(message.role, Role::Assistant);
    assert_eq!(message.content.len(), 2);
    assert_eq!(message.text(), "see the chart");
    match &message.content[1] {
        Content::ImageFile { image_file } => assert_eq!(image_file.file_id, "file-abc"),
        other => panic!("expected image block, got {other:?}"),
    }
}

#[tokio::test]
async fn error_envelope_becomes_a_typed_api_error() {
    let (server, client) = start().await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "invalid key",
                "type": "auth",
                "param": null,
                "code": "401"
            }
        })))
        .mount(&server)
        .await;

    let err = client.retrieve_thread("thread_1").await.unwrap_err();
    assert!(!err.is_local());
    match err {
        Error::Api {
            status,
            message,
            error_type,
            code,
            ..
        } => {
            assert_eq!(status, 401);
            assert_eq!(message, "invalid key");
            assert_eq!(error_type, "auth");
            assert_eq!(code.as_deref(), Some("401"));
        }
        other => panic!("expected Error::Api, got {other:?}"),
    }
}

#[tokio::test]
async fn blank_ids_are_rejected_before_any_request() {
    let (server, client) = start().await;

    let err = client.retrieve_thread("  ").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(err.is_local());

    let err = client.retrieve_message("thread_1", "").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn assistant_routes_carry_auth_and_beta_headers() {
    let (server, client) = start().await;
    Mock::given(method("POST"))
        .and(path("/threads"))
        .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
        .and(header("openai-beta", "assistants=v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "thread_1",
            "object": "thread",
            "created_at": 1_699_000_000u64,
            "metadata": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let thread = client.create_thread(&ThreadRequest::default()).await.unwrap();
    assert_eq!(thread.id, "thread_1");
}

#[tokio::test]
async fn stable_routes_do_not_carry_the_beta_header() {
    let (server, client) = start().await;
    Mock::given(method("GET"))
        .and(path("/files/file-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "file-abc",
            "object": "file",
            "bytes": 12u64,
            "created_at": 1_699_000_000u64,
            "filename": "notes.txt",
            "purpose": "assistants",
            "status": null,
            "status_details": null
        })))
        .mount(&server)
        .await;

    client.retrieve_file("file-abc").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("openai-beta").is_none());
    assert!(requests[0].headers.get("authorization").is_some());
}

#[tokio::test]
async fn file_upload_sends_a_multipart_form() {
    let (server, client) = start().await;
    Mock::given(method("POST"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "file-abc",
            "object": "file",
            "bytes": 11u64,
            "created_at": 1_699_000_000u64,
            "filename": "notes.txt",
            "purpose": "assistants",
            "status": "processed",
            "status_details": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let upload = FileUpload::new("notes.txt", b"hello files".to_vec(), Purpose::Assistants);
    let file = client.upload_file(&upload).await.unwrap();
    assert_eq!(file.id, "file-abc");
    assert_eq!(file.filename, "notes.txt");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("notes.txt"));
    assert!(body.contains("assistants"));
    assert!(body.contains("hello files"));
}

#[tokio::test]
async fn speech_returns_the_raw_audio_bytes() {
    let (server, client) = start().await;
    let audio = vec![0x1au8, 0x45, 0xdf, 0xa3];
    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(audio.clone()))
        .mount(&server)
        .await;

    let request = SpeechRequest::builder("tts-1", "Hello there", Voice::Alloy)
        .build()
        .unwrap();
    let bytes = client.create_speech(&request).await.unwrap();
    assert_eq!(bytes, audio);
}

#[tokio::test]
async fn transcription_returns_the_body_verbatim() {
    let (server, client) = start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"text":"Hello there, how are you?"}"#),
        )
        .mount(&server)
        .await;

    let request = TranscriptionRequest::builder(vec![1, 2, 3]).build().unwrap();
    let transcript = client.create_transcription(&request).await.unwrap();
    assert!(transcript.contains("Hello there"));
}

#[tokio::test]
async fn chat_completion_decodes() {
    let (server, client) = start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1_699_000_000u64,
            "model": "gpt-4",
            "choices": [{
                "index": 0,
                "finish_reason": "stop",
                "message": { "role": "assistant", "content": "Paris." }
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15 }
        })))
        .mount(&server)
        .await;

    let request = ChatCompletionRequest::builder(
        "gpt-4",
        vec![
            ChatMessage::system("Answer concisely."),
            ChatMessage::user("What is the capital of France?"),
        ],
    )
    .build()
    .unwrap();
    let completion = client.create_chat_completion(&request).await.unwrap();
    assert_eq!(completion.choices.len(), 1);
    assert_eq!(completion.choices[0].message.content.as_deref(), Some("Paris."));
    assert_eq!(completion.usage.unwrap().total_tokens, 15);
}

#[tokio::test]
async fn embeddings_decode_in_input_order() {
    let (server, client) = start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                { "object": "embedding", "embedding": [0.1, 0.2], "index": 0 },
                { "object": "embedding", "embedding": [0.3, 0.4], "index": 1 }
            ],
            "model": "text-embedding-ada-002",
            "usage": { "prompt_tokens": 8, "total_tokens": 8 }
        })))
        .mount(&server)
        .await;

    let request = EmbeddingsRequest::batch(
        "text-embedding-ada-002",
        vec!["first".to_string(), "second".to_string()],
    );
    let embeddings = client.create_embeddings(&request).await.unwrap();
    assert_eq!(embeddings.data.len(), 2);
    assert_eq!(embeddings.data[0].index, 0);
    assert_eq!(embeddings.data[1].index, 1);
}
