// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! PaddleOCR engine behind the engine accessor
//!
//! Tests marked `#[ignore]` need the ONNX models under
//! `./models/paddleocr-onnx` (det_model.onnx plus en/rec_model.onnx and
//! en/keys.txt).

use ocr_bridge::vision::{EngineAccessor, OcrEngine, PaddleOcrFactory};
use std::fs;
use std::sync::Arc;

const OCR_MODEL_DIR: &str = "./models/paddleocr-onnx";

#[tokio::test]
async fn test_accessor_does_not_cache_failed_load() {
    let dir = tempfile::tempdir().unwrap();
    let accessor = EngineAccessor::new(Arc::new(PaddleOcrFactory::new(dir.path())));

    let err = accessor.get_engine(&["en".to_string()]).await.err().unwrap();
    assert!(err.to_string().contains("det_model.onnx"));
    assert!(!accessor.is_initialized());
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_accessor_keeps_first_languages() {
    let accessor = EngineAccessor::new(Arc::new(PaddleOcrFactory::new(OCR_MODEL_DIR)));

    let first = accessor.get_engine(&["en".to_string()]).await.unwrap();
    let second = accessor.get_engine(&["fr".to_string()]).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.languages(), &["en".to_string()]);
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_unreadable_file_is_an_error() {
    let accessor = EngineAccessor::new(Arc::new(PaddleOcrFactory::new(OCR_MODEL_DIR)));
    let engine = accessor.get_engine(&["en".to_string()]).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    fs::write(&path, b"not an image").unwrap();

    assert!(engine.read_text(&path).is_err());
}
