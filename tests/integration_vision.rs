// HTTP vision backends against local stand-in servers.

use axum::{
    Json, Router,
    extract::Query,
    http::{HeaderMap, StatusCode, Uri},
    routing::post,
};
use image::{ImageBuffer, ImageFormat, Rgb};
use photoprompt_bot::{
    parser::parse_prompt_response,
    photo::IncomingPhoto,
    prompts::Prompt,
    vision::{VisionBackend, VisionError, gemini::Gemini, openai::OpenAiVision},
};
use serde_json::{Value, json};
use std::{collections::HashMap, io::Cursor, time::Duration};

fn photo() -> IncomingPhoto {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(8, 8, Rgb([220, 10, 10]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
    IncomingPhoto::from_bytes(out.into_inner()).unwrap()
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

const ANSWER: &str = "[EN]: a red square\n[AR]: مربع أحمر\n[KEYWORDS]: red, square";

async fn openai_chat(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if auth != "Bearer sk-test" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "message": "Incorrect API key provided" } })),
        );
    }

    let parts = &body["messages"][0]["content"];
    let instruction_ok = parts[0]["text"]
        .as_str()
        .is_some_and(|t| t.contains("[EN]:"));
    let image_ok = parts[1]["image_url"]["url"]
        .as_str()
        .is_some_and(|u| u.starts_with("data:image/jpeg;base64,"));
    if !(instruction_ok && image_ok) {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "bad body" })));
    }

    (
        StatusCode::OK,
        Json(json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": ANSWER } }]
        })),
    )
}

fn openai(base: &str, key: &str, timeout: Duration) -> OpenAiVision {
    OpenAiVision::new(
        key.to_string(),
        "gpt-4o-mini".to_string(),
        Some(url::Url::parse(&format!("{base}/v1")).unwrap()),
        timeout,
    )
    .unwrap()
}

#[tokio::test]
async fn openai_returns_message_content() {
    let base = serve(Router::new().route("/v1/chat/completions", post(openai_chat))).await;
    let backend = openai(&base, "sk-test", Duration::from_secs(5));

    let raw = backend
        .describe(&photo(), Prompt::DescribeImage.text())
        .await
        .unwrap();
    let record = parse_prompt_response(&raw);
    assert_eq!(record.english, "a red square");
    assert_eq!(record.keywords, "red, square");
}

#[tokio::test]
async fn openai_bad_key_is_a_status_error() {
    let base = serve(Router::new().route("/v1/chat/completions", post(openai_chat))).await;
    let backend = openai(&base, "sk-wrong", Duration::from_secs(5));

    let err = backend
        .describe(&photo(), Prompt::DescribeImage.text())
        .await
        .unwrap_err();
    match err {
        VisionError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Incorrect API key"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn openai_empty_choices_is_empty_response() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({ "choices": [] })) }),
    );
    let base = serve(app).await;
    let backend = openai(&base, "sk-test", Duration::from_secs(5));

    let err = backend.describe(&photo(), "describe").await.unwrap_err();
    assert!(matches!(err, VisionError::EmptyResponse));
}

#[tokio::test]
async fn openai_slow_server_times_out() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({ "choices": [] }))
        }),
    );
    let base = serve(app).await;
    let backend = openai(&base, "sk-test", Duration::from_millis(200));

    let err = backend.describe(&photo(), "describe").await.unwrap_err();
    assert!(matches!(err, VisionError::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn openai_unreachable_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = openai(&format!("http://{addr}"), "sk-test", Duration::from_secs(2));
    let err = backend.describe(&photo(), "describe").await.unwrap_err();
    assert!(matches!(err, VisionError::Transport(_)), "got {err:?}");
}

async fn gemini_generate(
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if uri.path() != "/v1beta/models/gemini-1.5-flash:generateContent" {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": uri.path() })));
    }
    if query.get("key").map(String::as_str) != Some("g-key") {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": { "message": "API key not valid" } })),
        );
    }

    let blob = &body["contents"][0]["parts"][1]["inlineData"];
    if blob["mimeType"] != "image/jpeg" || !blob["data"].is_string() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "bad body" })));
    }

    (
        StatusCode::OK,
        Json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": ANSWER }] },
                "finishReason": "STOP"
            }]
        })),
    )
}

fn gemini(base: &str, key: &str) -> Gemini {
    Gemini::new(
        key.to_string(),
        "gemini-1.5-flash".to_string(),
        Some(url::Url::parse(base).unwrap()),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn gemini_returns_candidate_text() {
    let base = serve(Router::new().fallback(gemini_generate)).await;
    let backend = gemini(&base, "g-key");

    let raw = backend
        .describe(&photo(), Prompt::DescribeImage.text())
        .await
        .unwrap();
    assert_eq!(raw, ANSWER);
}

#[tokio::test]
async fn gemini_rejected_key_is_a_status_error() {
    let base = serve(Router::new().fallback(gemini_generate)).await;
    let backend = gemini(&base, "wrong");

    let err = backend.describe(&photo(), "describe").await.unwrap_err();
    assert!(matches!(err, VisionError::Status { status: 403, .. }), "got {err:?}");
}

#[tokio::test]
async fn gemini_blocked_answer_is_empty_response() {
    let app = Router::new().fallback(|| async {
        Json(json!({ "candidates": [{ "finishReason": "SAFETY" }] }))
    });
    let base = serve(app).await;
    let backend = gemini(&base, "g-key");

    let err = backend.describe(&photo(), "describe").await.unwrap_err();
    assert!(matches!(err, VisionError::EmptyResponse));
}
