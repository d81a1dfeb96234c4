// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the OCR bridge

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Service name used in startup logs and the client user agent
pub const SERVICE_NAME: &str = "ocr-bridge";

/// Capabilities advertised in startup logs
pub const FEATURES: &[&str] = &[
    "paddleocr-onnx",
    "multi-language",
    "multipart-upload",
    "word-bounding-boxes",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("{} {}", SERVICE_NAME, VERSION_NUMBER)
}

/// User agent sent by `OcrServiceClient`
pub fn user_agent() -> String {
    format!("{}-client/{}", SERVICE_NAME, VERSION_NUMBER)
}
