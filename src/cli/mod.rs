// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod client;

use clap::Parser;
use std::path::PathBuf;

use crate::config::{
    parse_languages, ServiceConfig, DEFAULT_HOST, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_MODEL_DIR,
    DEFAULT_PORT,
};

/// OCR bridge: HTTP/JSON front end for a PaddleOCR engine
#[derive(Parser, Debug)]
#[command(name = "ocr-bridge")]
#[command(version)]
#[command(about = "Serve OCR over HTTP: POST /recognize, GET /health", long_about = None)]
pub struct Cli {
    /// Port to listen on
    #[arg(long, env = "OCR_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Comma-separated language codes the engine is built with
    #[arg(long, env = "OCR_LANGUAGES", default_value = "en")]
    pub languages: String,

    /// Interface to bind
    #[arg(long, env = "OCR_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Directory holding det_model.onnx and one sub-directory per language
    #[arg(long, env = "OCR_MODEL_PATH", default_value = DEFAULT_MODEL_DIR)]
    pub model_dir: PathBuf,

    /// Directory for staged uploads (defaults to the OS temp dir)
    #[arg(long, env = "OCR_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Maximum request body size in bytes
    #[arg(long, env = "OCR_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl Cli {
    pub fn into_config(self) -> ServiceConfig {
        ServiceConfig {
            host: self.host,
            port: self.port,
            languages: parse_languages(&self.languages),
            model_dir: self.model_dir,
            temp_dir: self.temp_dir.unwrap_or_else(std::env::temp_dir),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}
