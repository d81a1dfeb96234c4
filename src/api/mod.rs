// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod recognize;
pub mod staging;

pub use errors::{ApiError, ErrorResponse};
pub use handlers::{health_handler, HealthResponse};
pub use http_server::{create_router, serve, start_server, AppState};
pub use recognize::{recognize_handler, BoundingBox, RecognitionResponse, Word};
pub use staging::{StagedUpload, StagingError, UploadStaging};
