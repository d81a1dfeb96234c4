// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod version;
pub mod vision;

pub use api::{create_router, AppState, RecognitionResponse, UploadStaging};
pub use client::OcrServiceClient;
pub use config::ServiceConfig;
pub use vision::{EngineAccessor, EngineFactory, OcrEngine, RawRegion};
