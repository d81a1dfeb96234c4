// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /health tests

use super::support::{send, test_router, FakeFactory};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;

#[tokio::test]
async fn test_health_returns_healthy() {
    let dir = tempfile::tempdir().unwrap();
    let (router, _) = test_router(FakeFactory::returning(vec![]), dir.path());

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_health_does_not_build_engine() {
    let dir = tempfile::tempdir().unwrap();
    let factory = FakeFactory::failing("models missing");
    let (router, accessor) = test_router(factory.clone(), dir.path());

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, _) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!accessor.is_initialized());
    assert_eq!(factory.build_count(), 0);
}

#[tokio::test]
async fn test_health_rejects_post() {
    let dir = tempfile::tempdir().unwrap();
    let (router, _) = test_router(FakeFactory::returning(vec![]), dir.path());

    let request = Request::builder()
        .method("POST")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(router, request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
