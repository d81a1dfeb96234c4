// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /recognize tests
//!
//! Run the full router against a fake engine so that upload handling,
//! staging, response shaping, and error mapping are covered without
//! ONNX models on disk.

use super::support::{
    hello_region, image_upload, recognize_request, send, staged_file_count, test_router,
    FakeFactory, Part,
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use ocr_bridge::vision::RawRegion;
use serde_json::json;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake image payload";

// =============================================================================
// Upload validation
// =============================================================================

#[tokio::test]
async fn test_missing_image_field() {
    let dir = tempfile::tempdir().unwrap();
    let factory = FakeFactory::returning(vec![hello_region()]);
    let (router, _) = test_router(factory.clone(), dir.path());

    let request = recognize_request(&[Part {
        name: "file",
        filename: Some("scan.png"),
        data: PNG_BYTES,
    }]);
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No image provided"}));
    assert_eq!(factory.build_count(), 0);
    assert_eq!(staged_file_count(dir.path()), 0);
}

#[tokio::test]
async fn test_image_field_without_filename_is_not_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let (router, _) = test_router(FakeFactory::returning(vec![]), dir.path());

    let request = recognize_request(&[Part {
        name: "image",
        filename: None,
        data: b"just text",
    }]);
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image provided");
}

#[tokio::test]
async fn test_empty_filename() {
    let dir = tempfile::tempdir().unwrap();
    let factory = FakeFactory::returning(vec![hello_region()]);
    let (router, _) = test_router(factory.clone(), dir.path());

    let (status, body) = send(router, image_upload("", PNG_BYTES)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Empty filename"}));
    assert_eq!(factory.build_count(), 0);
    assert_eq!(staged_file_count(dir.path()), 0);
}

#[tokio::test]
async fn test_non_multipart_body() {
    let dir = tempfile::tempdir().unwrap();
    let (router, _) = test_router(FakeFactory::returning(vec![]), dir.path());

    let request = Request::builder()
        .method("POST")
        .uri("/recognize")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"image":"abc"}"#))
        .unwrap();
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image provided");
}

#[tokio::test]
async fn test_other_fields_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let (router, _) = test_router(FakeFactory::returning(vec![hello_region()]), dir.path());

    let request = recognize_request(&[
        Part {
            name: "note",
            filename: None,
            data: b"ignored",
        },
        Part {
            name: "image",
            filename: Some("scan.png"),
            data: PNG_BYTES,
        },
    ]);
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "HELLO");
}

// =============================================================================
// Recognition results
// =============================================================================

#[tokio::test]
async fn test_hello_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let (router, _) = test_router(FakeFactory::returning(vec![hello_region()]), dir.path());

    let (status, body) = send(router, image_upload("hello.png", PNG_BYTES)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "text": "HELLO",
            "words": [{
                "text": "HELLO",
                "confidence": 0.95,
                "bbox": {"x0": 10, "y0": 10, "x1": 50, "y1": 30}
            }]
        })
    );
}

#[tokio::test]
async fn test_blank_image_returns_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let (router, _) = test_router(FakeFactory::returning(vec![]), dir.path());

    let (status, body) = send(router, image_upload("blank.png", PNG_BYTES)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"text": "", "words": []}));
}

#[tokio::test]
async fn test_words_follow_engine_order() {
    let regions = vec![
        RawRegion::new(
            [[100.5, 12.0], [180.9, 14.0], [181.0, 40.7], [99.2, 38.0]],
            "world",
            0.87,
        ),
        RawRegion::new(
            [[5.0, 10.0], [60.0, 8.0], [61.0, 30.0], [4.0, 32.0]],
            "hello",
            0.91,
        ),
        RawRegion::new(
            [[5.0, 50.0], [40.0, 50.0], [40.0, 70.0], [5.0, 70.0]],
            "again",
            0.5,
        ),
    ];
    let dir = tempfile::tempdir().unwrap();
    let (router, _) = test_router(FakeFactory::returning(regions.clone()), dir.path());

    let (status, body) = send(router, image_upload("page.jpg", PNG_BYTES)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "world hello again");

    let words = body["words"].as_array().unwrap();
    assert_eq!(words.len(), regions.len());
    for (word, region) in words.iter().zip(&regions) {
        assert_eq!(word["text"], region.text.as_str());
        assert_eq!(word["confidence"].as_f64().unwrap(), region.confidence);
    }

    // Skewed quad: left/top take the min, right/bottom the max, truncated
    assert_eq!(words[0]["bbox"], json!({"x0": 99, "y0": 12, "x1": 181, "y1": 40}));
    assert_eq!(words[1]["bbox"], json!({"x0": 4, "y0": 8, "x1": 61, "y1": 32}));
}

#[tokio::test]
async fn test_repeated_requests_give_same_result() {
    let dir = tempfile::tempdir().unwrap();
    let factory = FakeFactory::returning(vec![hello_region()]);
    let (router, _) = test_router(factory.clone(), dir.path());

    let (_, first) = send(router.clone(), image_upload("hello.png", PNG_BYTES)).await;
    let (_, second) = send(router, image_upload("hello.png", PNG_BYTES)).await;

    assert_eq!(first, second);
    assert_eq!(factory.build_count(), 1);
}

// =============================================================================
// Engine lifecycle and staging
// =============================================================================

#[tokio::test]
async fn test_first_request_builds_english_engine() {
    let dir = tempfile::tempdir().unwrap();
    let factory = FakeFactory::returning(vec![hello_region()]);
    let (router, accessor) = test_router(factory.clone(), dir.path());
    assert!(!accessor.is_initialized());

    let (status, _) = send(router, image_upload("hello.png", PNG_BYTES)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(accessor.is_initialized());
    assert_eq!(
        factory.built_with.lock().unwrap().clone(),
        Some(vec!["en".to_string()])
    );
}

#[tokio::test]
async fn test_preinitialized_engine_keeps_its_languages() {
    let dir = tempfile::tempdir().unwrap();
    let factory = FakeFactory::returning(vec![hello_region()]);
    let (router, accessor) = test_router(factory.clone(), dir.path());

    let languages = vec!["fr".to_string(), "de".to_string()];
    accessor.get_engine(&languages).await.unwrap();

    let (status, _) = send(router, image_upload("hello.png", PNG_BYTES)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(factory.build_count(), 1);
    assert_eq!(factory.built_with.lock().unwrap().clone(), Some(languages));
}

#[tokio::test]
async fn test_upload_is_staged_then_removed() {
    let dir = tempfile::tempdir().unwrap();
    let factory = FakeFactory::returning(vec![hello_region()]);
    let (router, _) = test_router(factory.clone(), dir.path());

    let (status, _) = send(router, image_upload("../../scan.PNG", PNG_BYTES)).await;
    assert_eq!(status, StatusCode::OK);

    let reads = factory.built_engine().reads.lock().unwrap().clone();
    assert_eq!(reads.len(), 1);
    let (path, existed, contents) = &reads[0];
    assert!(*existed);
    assert_eq!(contents.as_slice(), PNG_BYTES);
    assert_eq!(path.parent(), Some(dir.path()));
    assert_eq!(path.extension().unwrap(), "png");

    assert!(!path.exists());
    assert_eq!(staged_file_count(dir.path()), 0);
}

#[tokio::test]
async fn test_engine_failure_returns_500_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let factory = FakeFactory::failing("cannot identify image file");
    let (router, _) = test_router(factory.clone(), dir.path());

    let (status, body) = send(router, image_upload("broken.png", b"not an image")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "cannot identify image file"}));
    assert_eq!(staged_file_count(dir.path()), 0);
}

#[tokio::test]
async fn test_staging_failure_returns_500() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let factory = FakeFactory::returning(vec![hello_region()]);
    let (router, _) = test_router(factory.clone(), &missing);

    let (status, body) = send(router, image_upload("hello.png", PNG_BYTES)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("does-not-exist"));
    assert_eq!(factory.build_count(), 0);
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let factory = FakeFactory::returning(vec![hello_region()]);
    let (router, _) = test_router(factory.clone(), dir.path());

    let oversized = vec![0u8; super::support::MAX_UPLOAD_BYTES + 1];
    let response_status = {
        use tower::ServiceExt;
        router
            .oneshot(image_upload("big.png", &oversized))
            .await
            .unwrap()
            .status()
    };

    assert!(response_status.is_client_error());
    assert_eq!(factory.build_count(), 0);
    assert_eq!(staged_file_count(dir.path()), 0);
}
