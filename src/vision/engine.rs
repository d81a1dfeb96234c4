// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR engine seam and the process-wide engine accessor
//!
//! The HTTP layer only needs two things from an OCR engine: construct it
//! with a language list, and run a detail-mode recognition over an image
//! file. `EngineAccessor` builds the engine at most once and hands out
//! shared references afterwards.

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Corner points of a detected region, in order:
/// top-left, top-right, bottom-right, bottom-left.
pub type Quad = [[f64; 2]; 4];

/// One text region as reported by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct RawRegion {
    pub quad: Quad,
    pub text: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f64,
}

impl RawRegion {
    pub fn new(quad: Quad, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            quad,
            text: text.into(),
            confidence,
        }
    }
}

/// An OCR engine able to read text regions from an image on disk
///
/// Implementations are CPU-bound and synchronous; callers on the async
/// runtime should invoke `read_text` from a blocking task.
pub trait OcrEngine: Send + Sync {
    /// Language codes the engine was built with
    fn languages(&self) -> &[String];

    /// Recognize all text regions in the image, in engine order
    fn read_text(&self, image_path: &Path) -> Result<Vec<RawRegion>>;
}

/// Builds an engine for a language list
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn build(&self, languages: &[String]) -> Result<Arc<dyn OcrEngine>>;
}

/// Lazily constructs and memoizes the one engine handle for the process
///
/// Only the first successful `get_engine` call decides the language set.
/// Later calls get the existing engine back whatever languages they ask
/// for. A failed construction is not cached.
pub struct EngineAccessor {
    factory: Arc<dyn EngineFactory>,
    engine: OnceCell<Arc<dyn OcrEngine>>,
}

impl EngineAccessor {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            engine: OnceCell::new(),
        }
    }

    /// Return the engine, building it with `languages` if none exists yet
    pub async fn get_engine(&self, languages: &[String]) -> Result<Arc<dyn OcrEngine>> {
        let engine = self
            .engine
            .get_or_try_init(|| async {
                info!("Initializing OCR engine with languages: {:?}", languages);
                self.factory.build(languages).await
            })
            .await?;

        if engine.languages() != languages {
            // Known limitation: the first language set wins for the process lifetime
            debug!(
                "OCR engine already initialized with {:?}; ignoring requested {:?}",
                engine.languages(),
                languages
            );
        }

        Ok(engine.clone())
    }

    /// Whether the engine has been constructed
    pub fn is_initialized(&self) -> bool {
        self.engine.initialized()
    }
}

impl std::fmt::Debug for EngineAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineAccessor")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}
