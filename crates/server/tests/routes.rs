//! End-to-end tests for the HTTP surface, driven through `oneshot` with mock engines.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use img2txt_core::Config;
use img2txt_ocr::{EngineHandle, MockRecognizer, OcrBackend, OcrError};
use img2txt_server::{create_app, routes::ExtractResponse, AppState};
use img2txt_translate::MockTranslator;
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "img2txt-test-boundary";

fn png_bytes() -> Vec<u8> {
    let img = image::GrayImage::from_fn(24, 12, |x, _| image::Luma([if x % 6 < 2 { 15u8 } else { 235 }]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageLuma8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Build a multipart body; `file` is `(file_name, bytes)`.
fn multipart_body(file: Option<(&str, &[u8])>, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some((name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn extract_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/extract")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

fn app_with(recognizer: MockRecognizer, translator: Arc<MockTranslator>) -> (Router, Arc<MockRecognizer>) {
    let recognizer = Arc::new(recognizer);
    let engine = EngineHandle::preloaded(Arc::clone(&recognizer) as Arc<dyn OcrBackend>);
    let state = AppState::new(engine, translator, &Config::default());
    (create_app(state), recognizer)
}

fn door_app(translator: Arc<MockTranslator>) -> (Router, Arc<MockRecognizer>) {
    app_with(
        MockRecognizer::from_words(&[("What", 0.97), ("are", 0.95), ("the", 0.96), ("Best", 0.93), ("Colours", 0.91)]),
        translator,
    )
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_extract_translates_to_selected_language() {
    let translator = Arc::new(MockTranslator::new("Quels sont les meilleurs couleurs"));
    let (app, recognizer) = door_app(Arc::clone(&translator));

    let body = multipart_body(Some(("door.png", &png_bytes())), &[("language", "French"), ("preprocess", "false")]);
    let response = app.oneshot(extract_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let result: ExtractResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(result.extracted, "What are the Best Colours");
    assert_eq!(result.translated, "Quels sont les meilleurs couleurs");
    assert_eq!(result.language, "French");
    assert_eq!(result.language_code, "fr");
    assert_eq!(result.detections.len(), 5);
    assert!(result.processed_image.is_none());
    assert_eq!(result.download_name, "translation_french.txt");
    assert_eq!(
        result.download_body,
        "Source:\nWhat are the Best Colours\n\nTranslation (French):\nQuels sont les meilleurs couleurs"
    );

    assert_eq!(recognizer.calls(), 1);
    assert_eq!(
        translator.calls(),
        vec![("What are the Best Colours".to_string(), "auto".to_string(), "fr".to_string())]
    );
}

#[tokio::test]
async fn test_extract_defaults_to_hindi_with_preprocessing() {
    let translator = Arc::new(MockTranslator::new("सबसे अच्छे रंग"));
    let (app, _) = door_app(Arc::clone(&translator));

    let body = multipart_body(Some(("door.PNG", &png_bytes())), &[]);
    let response = app.oneshot(extract_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["language"], "Hindi");
    assert_eq!(json["language_code"], "hi");
    let processed = json["processed_image"].as_str().expect("processed image");
    // base64 of the PNG signature
    assert!(processed.starts_with("iVBORw0KGgo"));
}

#[tokio::test]
async fn test_english_is_returned_unchanged() {
    let translator = Arc::new(MockTranslator::new("should not be used"));
    let (app, _) = door_app(Arc::clone(&translator));

    let body = multipart_body(Some(("door.jpg", &png_bytes())), &[("language", "en")]);
    let json = json_body(app.oneshot(extract_request(body)).await.unwrap()).await;

    assert_eq!(json["translated"], json["extracted"]);
    assert!(translator.calls().is_empty());
}

#[tokio::test]
async fn test_no_text_detected_message() {
    let translator = Arc::new(MockTranslator::new("unused"));
    let (app, _) = app_with(MockRecognizer::new(Vec::new()), Arc::clone(&translator));

    let body = multipart_body(Some(("blank.png", &png_bytes())), &[("language", "Spanish")]);
    let json = json_body(app.oneshot(extract_request(body)).await.unwrap()).await;

    assert_eq!(json["extracted"], "");
    assert_eq!(json["translated"], "No text detected.");
    assert!(translator.calls().is_empty());
}

#[tokio::test]
async fn test_translation_failure_is_surfaced() {
    let translator = Arc::new(MockTranslator::failing("service unavailable"));
    let (app, _) = door_app(translator);

    let body = multipart_body(Some(("door.jpeg", &png_bytes())), &[("language", "Japanese")]);
    let response = app.oneshot(extract_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["translated"], "Translation Error: service unavailable");
}

#[tokio::test]
async fn test_ocr_failure_is_an_empty_extraction() {
    let translator = Arc::new(MockTranslator::new("unused"));
    let (app, _) = app_with(MockRecognizer::failing("model crashed"), translator);

    let body = multipart_body(Some(("door.png", &png_bytes())), &[("language", "Arabic")]);
    let response = app.oneshot(extract_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["extracted"], "");
    assert_eq!(json["detections"], serde_json::json!([]));
    assert_eq!(json["translated"], "No text detected.");
}

#[tokio::test]
async fn test_ocr_failure_still_returns_processed_image() {
    let translator = Arc::new(MockTranslator::new("unused"));
    let (app, _) = app_with(MockRecognizer::failing("boom"), translator);

    let body = multipart_body(Some(("door.png", &png_bytes())), &[("preprocess", "true")]);
    let json = json_body(app.oneshot(extract_request(body)).await.unwrap()).await;
    assert_eq!(json["extracted"], "");
    assert!(json["processed_image"].as_str().unwrap().starts_with("iVBORw0KGgo"));
}

#[tokio::test]
async fn test_missing_engine_still_returns_processed_image() {
    let engine = EngineHandle::new(|| Err(OcrError::NotAvailable));
    let app = create_app(AppState::new(engine, Arc::new(MockTranslator::new("unused")), &Config::default()));

    let body = multipart_body(Some(("door.png", &png_bytes())), &[("preprocess", "true")]);
    let json = json_body(app.oneshot(extract_request(body)).await.unwrap()).await;
    assert_eq!(json["translated"], "No text detected.");
    assert!(json["processed_image"].is_string());
}

#[tokio::test]
async fn test_web_keeps_low_confidence_detections_by_default() {
    let translator = Arc::new(MockTranslator::new("unused"));
    let (app, _) = app_with(MockRecognizer::from_words(&[("India", 0.95), ("Size", 0.2)]), translator);

    let body = multipart_body(Some(("sizes.png", &png_bytes())), &[("language", "English")]);
    let json = json_body(app.oneshot(extract_request(body)).await.unwrap()).await;
    assert_eq!(json["extracted"], "India Size");
}

#[tokio::test]
async fn test_web_threshold_is_configurable() {
    let engine = EngineHandle::preloaded(
        Arc::new(MockRecognizer::from_words(&[("India", 0.95), ("Size", 0.2)])) as Arc<dyn OcrBackend>,
    );
    let config = Config { web_confidence_threshold: 0.5, ..Config::default() };
    let app = create_app(AppState::new(engine, Arc::new(MockTranslator::new("unused")), &config));

    let body = multipart_body(Some(("sizes.png", &png_bytes())), &[("language", "English")]);
    let json = json_body(app.oneshot(extract_request(body)).await.unwrap()).await;
    assert_eq!(json["extracted"], "India");
}

#[tokio::test]
async fn test_unsupported_file_type_is_rejected() {
    let translator = Arc::new(MockTranslator::new("unused"));
    let (app, recognizer) = door_app(translator);

    let body = multipart_body(Some(("scan.gif", b"GIF89a")), &[("language", "French")]);
    let response = app.oneshot(extract_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("scan.gif"));
    assert_eq!(recognizer.calls(), 0);
}

#[tokio::test]
async fn test_missing_image_is_rejected() {
    let translator = Arc::new(MockTranslator::new("unused"));
    let (app, _) = door_app(translator);

    let body = multipart_body(None, &[("language", "French")]);
    let response = app.oneshot(extract_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "No image uploaded");
}

#[tokio::test]
async fn test_unknown_language_is_rejected() {
    let translator = Arc::new(MockTranslator::new("unused"));
    let (app, _) = door_app(translator);

    let body = multipart_body(Some(("door.png", &png_bytes())), &[("language", "Klingon")]);
    let response = app.oneshot(extract_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Unknown language 'Klingon'");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let translator = Arc::new(MockTranslator::new("unused"));
    let engine = EngineHandle::preloaded(Arc::new(MockRecognizer::from_words(&[("x", 0.9)])) as Arc<dyn OcrBackend>);
    let config = Config { max_upload_bytes: 1024, ..Config::default() };
    let app = create_app(AppState::new(engine, translator, &config));

    let huge = vec![0u8; 128 * 1024];
    let body = multipart_body(Some(("huge.png", &huge)), &[]);
    let response = app.oneshot(extract_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_download_is_a_text_attachment() {
    let translator = Arc::new(MockTranslator::new("unused"));
    let (app, _) = door_app(translator);

    let request = Request::builder()
        .method("POST")
        .uri("/api/download")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({
                "extracted": "Press START GAME",
                "translated": "Pulsa INICIAR JUEGO",
                "language": "Spanish"
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"translation_spanish.txt\""
    );
    assert!(response.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(
        std::str::from_utf8(&bytes).unwrap(),
        "Source:\nPress START GAME\n\nTranslation (Spanish):\nPulsa INICIAR JUEGO"
    );
}

#[tokio::test]
async fn test_languages_lists_the_ui_table() {
    let translator = Arc::new(MockTranslator::new("unused"));
    let (app, _) = door_app(translator);

    let request = Request::builder().uri("/api/languages").body(Body::empty()).unwrap();
    let json = json_body(app.oneshot(request).await.unwrap()).await;

    let names: Vec<_> = json["languages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Hindi", "Spanish", "French", "Japanese", "Arabic", "English"]);
    assert_eq!(json["default"]["code"], "hi");
}

#[tokio::test]
async fn test_index_serves_the_page() {
    let translator = Arc::new(MockTranslator::new("unused"));
    let (app, _) = door_app(translator);

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(std::str::from_utf8(&bytes).unwrap().contains("Image Text Translator"));
}

#[tokio::test]
async fn test_engine_reset_reloads_lazily() {
    let loads = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&loads);
    let engine = EngineHandle::new(move || {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok::<_, OcrError>(Arc::new(MockRecognizer::from_words(&[("Tim", 0.9)])) as Arc<dyn OcrBackend>)
    });
    let app = create_app(AppState::new(engine, Arc::new(MockTranslator::new("unused")), &Config::default()));

    let health = || Request::builder().uri("/health").body(Body::empty()).unwrap();
    let json = json_body(app.clone().oneshot(health()).await.unwrap()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["engine_loaded"], false);

    let body = multipart_body(Some(("tim.png", &png_bytes())), &[("language", "en")]);
    let json = json_body(app.clone().oneshot(extract_request(body)).await.unwrap()).await;
    assert_eq!(json["extracted"], "Tim");
    assert_eq!(json_body(app.clone().oneshot(health()).await.unwrap()).await["engine_loaded"], true);

    let reset = Request::builder().method("POST").uri("/api/engine/reset").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(reset).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(json_body(app.clone().oneshot(health()).await.unwrap()).await["engine_loaded"], false);

    let body = multipart_body(Some(("tim.png", &png_bytes())), &[("language", "en")]);
    app.oneshot(extract_request(body)).await.unwrap();
    assert_eq!(loads.load(std::sync::atomic::Ordering::SeqCst), 2);
}
