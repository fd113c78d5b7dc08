use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use friendzoned::config::sentiment::SentimentConfig;
use friendzoned::modules::analysis::session::{Session, SessionError, SubmissionState};
use friendzoned::modules::analysis::model::IncomingFile;
use friendzoned::services::sentiment::SentimentClient;
use friendzoned::{modules, AppState};
use serde_json::{json, Value};

#[derive(Clone)]
struct MockEngine {
    status: StatusCode,
    reply: Value,
    hits: Arc<AtomicUsize>,
    last_text: Arc<Mutex<Option<Value>>>,
    last_files: Arc<AtomicUsize>,
}

impl MockEngine {
    fn new(status: StatusCode, reply: Value) -> Self {
        Self {
            status,
            reply,
            hits: Arc::new(AtomicUsize::new(0)),
            last_text: Arc::new(Mutex::new(None)),
            last_files: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn sentiment_handler(
    State(engine): State<MockEngine>,
    request: axum::extract::Request,
) -> (StatusCode, Json<Value>) {
    use axum::extract::FromRequest;

    engine.hits.fetch_add(1, Ordering::SeqCst);

    let is_multipart = request
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        let mut multipart = Multipart::from_request(request, &()).await.unwrap();
        let mut files = 0;
        while let Some(field) = multipart.next_field().await.unwrap() {
            if field.name() == Some("file") {
                files += 1;
            }
        }
        engine.last_files.store(files, Ordering::SeqCst);
    } else {
        let Json(body) = Json::<Value>::from_request(request, &()).await.unwrap();
        *engine.last_text.lock().unwrap() = Some(body);
    }

    (engine.status, Json(engine.reply.clone()))
}

async fn spawn_engine(engine: MockEngine) -> String {
    let app = Router::new()
        .route("/sentiment", post(sentiment_handler))
        .with_state(engine);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn setup_test_server(engine: MockEngine) -> TestServer {
    let base_url = spawn_engine(engine).await;
    let sentiment = SentimentClient::new(&SentimentConfig::new(base_url)).unwrap();

    let state = AppState { sentiment };

    let app = Router::new()
        .merge(modules::analysis::routes::routes())
        .with_state(state);

    TestServer::new(app).unwrap()
}

fn sample_reply() -> Value {
    json!({
        "romantic": false,
        "sentiment_score": 0.3,
        "details": {
            "total_sentences": 10,
            "positive_sentences": 2,
            "negative_sentences": 3,
            "neutral_sentences": 5
        }
    })
}

fn png(name: &str) -> Part {
    Part::bytes(vec![0x89, 0x50, 0x4e, 0x47])
        .file_name(name)
        .mime_type("image/png")
}

#[tokio::test]
async fn test_message_log_round_trip() {
    let engine = MockEngine::new(StatusCode::OK, sample_reply());
    let server = setup_test_server(engine.clone()).await;

    let response = server
        .post("/api/upload")
        .json(&json!([
            { "document": "S-1", "text": "are we still on\nfor friday?" },
            { "document": "R-1", "text": "yes   can't wait" }
        ]))
        .await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["isRomantic"], false);
    assert_eq!(body["data"]["score"], 30);
    assert_eq!(
        body["data"]["stats"],
        json!({ "total": 10, "positive": 2, "negative": 3, "neutral": 5 })
    );
    assert_eq!(body["data"]["percentages"]["neutralPct"], 50.0);
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["analyzedAt"].is_string());
    assert!(body.get("error").is_none());

    let sent = engine.last_text.lock().unwrap().clone().unwrap();
    assert_eq!(sent["document"], 1);
    assert_eq!(sent["text"], "are we still on for friday? yes can't wait");
    assert_eq!(engine.hits(), 1);
}

#[tokio::test]
async fn test_wrapped_fields_are_unwrapped() {
    let engine = MockEngine::new(
        StatusCode::OK,
        json!({ "romantic": [true], "sentiment_score": [0.82] }),
    );
    let server = setup_test_server(engine).await;

    let response = server
        .post("/api/upload")
        .json(&json!([{ "document": "R-7", "text": "love you" }]))
        .await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["data"]["isRomantic"], true);
    assert_eq!(body["data"]["score"], 82);
    assert_eq!(body["data"]["stats"]["total"], 0);
    assert_eq!(body["data"]["percentages"]["positivePct"], 0.0);
}

#[tokio::test]
async fn test_invalid_prefix_never_reaches_engine() {
    let engine = MockEngine::new(StatusCode::OK, sample_reply());
    let server = setup_test_server(engine.clone()).await;

    let response = server
        .post("/api/upload")
        .json(&json!([{ "document": "X-1", "text": "hi" }]))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Message 0:"));
    assert_eq!(engine.hits(), 0);
}

#[tokio::test]
async fn test_non_array_body_is_rejected() {
    let engine = MockEngine::new(StatusCode::OK, sample_reply());
    let server = setup_test_server(engine.clone()).await;

    let response = server
        .post("/api/upload")
        .json(&json!({ "document": "S-1", "text": "hi" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(engine.hits(), 0);
}

#[tokio::test]
async fn test_empty_log_is_rejected() {
    let engine = MockEngine::new(StatusCode::OK, sample_reply());
    let server = setup_test_server(engine.clone()).await;

    let response = server.post("/api/upload").json(&json!([])).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(engine.hits(), 0);
}

#[tokio::test]
async fn test_unsupported_content_type() {
    let engine = MockEngine::new(StatusCode::OK, sample_reply());
    let server = setup_test_server(engine).await;

    let response = server.post("/api/upload").text("S-1 hi").await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_seven_images_forward_five() {
    let engine = MockEngine::new(StatusCode::OK, sample_reply());
    let server = setup_test_server(engine.clone()).await;

    let mut form = MultipartForm::new();
    for i in 0..7 {
        form = form.add_part("files", png(&format!("shot{}.png", i)));
    }

    let response = server.post("/api/upload").multipart(form).await;

    response.assert_status(StatusCode::OK);
    assert_eq!(engine.hits(), 1);
    assert_eq!(engine.last_files.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_log_file_upload() {
    let engine = MockEngine::new(StatusCode::OK, sample_reply());
    let server = setup_test_server(engine.clone()).await;

    let log = Part::bytes(br#"[{"document":"S-1","text":"hello"}]"#.to_vec())
        .file_name("chat.json")
        .mime_type("application/json");
    let form = MultipartForm::new().add_part("file", log);

    let response = server.post("/api/upload").multipart(form).await;

    response.assert_status(StatusCode::OK);
    let sent = engine.last_text.lock().unwrap().clone().unwrap();
    assert_eq!(sent["text"], "hello");
}

#[tokio::test]
async fn test_empty_multipart_is_rejected() {
    let engine = MockEngine::new(StatusCode::OK, sample_reply());
    let server = setup_test_server(engine.clone()).await;

    let form = MultipartForm::new().add_text("note", "nothing attached");
    let response = server.post("/api/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(engine.hits(), 0);
}

#[tokio::test]
async fn test_blank_file_input_is_empty_input() {
    let engine = MockEngine::new(StatusCode::OK, sample_reply());
    let server = setup_test_server(engine.clone()).await;

    let blank = Part::bytes(Vec::<u8>::new())
        .file_name("")
        .mime_type("application/octet-stream");
    let form = MultipartForm::new().add_part("file", blank);

    let response = server.post("/api/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Nothing to analyze: select images or a message log first"
    );
    assert_eq!(engine.hits(), 0);
}

#[tokio::test]
async fn test_engine_failure_is_reported_with_details() {
    let engine = MockEngine::new(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({ "error": "model not loaded" }),
    );
    let server = setup_test_server(engine).await;

    let response = server
        .post("/api/upload")
        .json(&json!([{ "document": "S-1", "text": "hi" }]))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Error processing file");
    assert_eq!(body["details"]["error"], "model not loaded");
}

#[tokio::test]
async fn test_supported_formats() {
    let engine = MockEngine::new(StatusCode::OK, sample_reply());
    let server = setup_test_server(engine).await;

    let response = server.get("/api/formats").await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["max_images"], 5);
    let formats: Vec<String> = serde_json::from_value(body["formats"].clone()).unwrap();
    assert!(formats.contains(&"png".to_string()));
    assert!(formats.contains(&"jpg".to_string()));
}

#[tokio::test]
async fn test_session_submit_against_engine() {
    let engine = MockEngine::new(StatusCode::OK, sample_reply());
    let base_url = spawn_engine(engine.clone()).await;
    let client = SentimentClient::new(&SentimentConfig::new(base_url)).unwrap();

    let mut session = Session::new(1);
    session
        .select(vec![IncomingFile {
            file_name: "shot.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }])
        .unwrap();

    let result = session.submit(&client).await.unwrap();

    assert_eq!(result.score, 30);
    assert_eq!(result.stats.neutral, 5);
    assert_eq!(session.state(), &SubmissionState::Done(result));
    assert_eq!(engine.last_files.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_session_records_engine_failure() {
    let engine = MockEngine::new(StatusCode::BAD_GATEWAY, json!("upstream down"));
    let base_url = spawn_engine(engine).await;
    let client = SentimentClient::new(&SentimentConfig::new(base_url)).unwrap();

    let mut session = Session::new(1);
    session
        .select(vec![IncomingFile {
            file_name: "chat.json".to_string(),
            content_type: "application/json".to_string(),
            bytes: br#"[{"document":"S-1","text":"hey"}]"#.to_vec(),
        }])
        .unwrap();

    let error = session.submit(&client).await.unwrap_err();

    assert!(matches!(error, SessionError::Gateway(_)));
    assert!(matches!(session.state(), SubmissionState::Error(_)));
}
