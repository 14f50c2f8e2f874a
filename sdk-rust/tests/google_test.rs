use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tutor_sdk::{
    google::{GoogleModel, GoogleModelOptions},
    LanguageModel, LanguageModelError, LanguageModelInput, Message, ModelUsage, Part,
    ResponseFormatJson, ResponseFormatOption,
};

#[derive(Debug, Clone)]
struct CapturedRequest {
    path: String,
    api_key: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct FakeGemini {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    status: StatusCode,
    reply: Value,
}

async fn handle(
    State(server): State<FakeGemini>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    server.requests.lock().unwrap().push(CapturedRequest {
        path: uri.path().to_string(),
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body,
    });
    (server.status, Json(server.reply.clone()))
}

async fn start_fake_gemini(
    status: StatusCode,
    reply: Value,
) -> (String, Arc<Mutex<Vec<CapturedRequest>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(handle).with_state(FakeGemini {
        requests: requests.clone(),
        status,
        reply,
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1beta"), requests)
}

fn google_model(base_url: String) -> GoogleModel {
    GoogleModel::new(
        "gemini-2.5-flash",
        GoogleModelOptions {
            api_key: "test-key".to_string(),
            base_url: Some(base_url),
            ..Default::default()
        },
    )
}

fn tutorial_input() -> LanguageModelInput {
    LanguageModelInput {
        system_prompt: Some("You are an expert tutor.".to_string()),
        messages: vec![Message::user(vec![Part::text(
            "Generate a tutorial for: \"How to cut a clip?\"",
        )])],
        response_format: Some(ResponseFormatOption::Json(ResponseFormatJson {
            name: "tutorial".to_string(),
            description: None,
            schema: Some(json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "steps": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["title", "steps"]
            })),
        })),
        ..Default::default()
    }
}

#[tokio::test]
async fn generate_sends_structured_request_and_maps_reply() {
    let reply = json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": "{\"title\":\"Cut\",\"steps\":[\"Press B\"]}" }]
            },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 8 }
    });
    let (base_url, requests) = start_fake_gemini(StatusCode::OK, reply).await;

    let response = google_model(base_url)
        .generate(tutorial_input())
        .await
        .expect("generate succeeds");

    assert_eq!(
        response.content,
        vec![Part::text("{\"title\":\"Cut\",\"steps\":[\"Press B\"]}")]
    );
    assert_eq!(
        response.usage,
        Some(ModelUsage {
            input_tokens: 12,
            output_tokens: 8,
        })
    );

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(
        request.path,
        "/v1beta/models/gemini-2.5-flash:generateContent"
    );
    assert_eq!(request.api_key.as_deref(), Some("test-key"));
    assert_eq!(
        request.body["systemInstruction"]["parts"][0]["text"],
        json!("You are an expert tutor.")
    );
    assert_eq!(
        request.body["generationConfig"]["responseMimeType"],
        json!("application/json")
    );
    assert_eq!(
        request.body["generationConfig"]["responseJsonSchema"]["required"],
        json!(["title", "steps"])
    );
}

#[tokio::test]
async fn non_success_status_is_a_status_error() {
    let (base_url, _) = start_fake_gemini(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": { "message": "backend unavailable" } }),
    )
    .await;

    let error = google_model(base_url)
        .generate(tutorial_input())
        .await
        .expect_err("generate fails");

    match error {
        LanguageModelError::StatusCode(status, body) => {
            assert_eq!(status.as_u16(), 500);
            assert!(body.contains("backend unavailable"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn reply_without_candidates_is_an_invariant_error() {
    let (base_url, _) = start_fake_gemini(StatusCode::OK, json!({ "candidates": [] })).await;

    let error = google_model(base_url)
        .generate(tutorial_input())
        .await
        .expect_err("generate fails");

    assert!(matches!(error, LanguageModelError::Invariant("google", _)));
}

#[tokio::test]
async fn safety_finish_reason_is_a_refusal() {
    let (base_url, _) = start_fake_gemini(
        StatusCode::OK,
        json!({ "candidates": [{ "finishReason": "SAFETY" }] }),
    )
    .await;

    let error = google_model(base_url)
        .generate(tutorial_input())
        .await
        .expect_err("generate fails");

    assert!(matches!(error, LanguageModelError::Refusal(_)));
}

#[tokio::test]
async fn blocked_prompt_is_a_refusal() {
    let (base_url, _) = start_fake_gemini(
        StatusCode::OK,
        json!({ "promptFeedback": { "blockReason": "SAFETY" } }),
    )
    .await;

    let error = google_model(base_url)
        .generate(tutorial_input())
        .await
        .expect_err("generate fails");

    assert!(matches!(error, LanguageModelError::Refusal(ref msg) if msg.contains("SAFETY")));
}

#[tokio::test]
async fn unknown_finish_reason_still_yields_content() {
    let (base_url, _) = start_fake_gemini(
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{}" }] },
                "finishReason": "SOMETHING_NEW"
            }]
        }),
    )
    .await;

    let response = google_model(base_url)
        .generate(tutorial_input())
        .await
        .expect("generate succeeds");

    assert_eq!(response.output_text(), "{}");
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let error = google_model(format!("http://{addr}/v1beta"))
        .generate(tutorial_input())
        .await
        .expect_err("generate fails");

    assert!(matches!(error, LanguageModelError::Transport(_)));
}
