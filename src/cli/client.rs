// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::client::{OcrServiceClient, DEFAULT_SERVICE_URL};

/// Talk to a running OCR service
#[derive(Parser, Debug)]
#[command(name = "ocr-client")]
#[command(version)]
#[command(about = "Query an OCR service over HTTP", long_about = None)]
pub struct ClientCli {
    /// Base URL of the service
    #[arg(long, env = "OCR_SERVICE_URL", default_value = DEFAULT_SERVICE_URL)]
    pub url: String,

    #[command(subcommand)]
    pub command: ClientCommand,
}

#[derive(Subcommand, Debug)]
pub enum ClientCommand {
    /// Check that the service is up
    Health,

    /// Recognize text in an image file and print the JSON result
    Recognize {
        /// Image to upload
        path: PathBuf,
    },
}

/// Execute a client command, printing the JSON response
pub async fn execute(cli: ClientCli) -> Result<()> {
    let client = OcrServiceClient::new(&cli.url)?;

    let output = match cli.command {
        ClientCommand::Health => {
            let health = client
                .health()
                .await
                .with_context(|| format!("Health check against {} failed", cli.url))?;
            serde_json::to_string_pretty(&health)?
        }
        ClientCommand::Recognize { path } => {
            let result = client
                .recognize_file(&path)
                .await
                .with_context(|| format!("Recognition of {} failed", path.display()))?;
            serde_json::to_string_pretty(&result)?
        }
    };

    println!("{}", output);
    Ok(())
}
