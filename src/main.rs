// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use ocr_bridge::{
    api::{start_server, AppState, UploadStaging},
    cli::Cli,
    vision::{EngineAccessor, PaddleOcrFactory},
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().into_config();

    println!("🚀 Starting {}", ocr_bridge::version::get_version_string());
    println!("   Languages:  {}", config.languages.join(","));
    println!("   Model dir:  {}", config.model_dir.display());
    println!("   Staging:    {}", config.temp_dir.display());
    println!("   Features:   {}", ocr_bridge::version::FEATURES.join(", "));
    println!();

    let accessor = Arc::new(EngineAccessor::new(Arc::new(PaddleOcrFactory::new(
        config.model_dir.clone(),
    ))));

    // Load models before accepting traffic so a bad model dir fails fast
    println!("🧠 Loading OCR engine...");
    accessor
        .get_engine(&config.languages)
        .await
        .with_context(|| format!("Failed to load OCR models from {}", config.model_dir.display()))?;
    println!("✅ OCR engine ready");

    let state = AppState::new(accessor, UploadStaging::new(config.temp_dir.clone()));

    println!("🌐 Listening on http://{}", config.listen_addr());
    start_server(&config, state).await
}
