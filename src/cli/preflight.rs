//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, VidsearchError};
use crate::openai::is_api_key_configured;
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Ingestion downloads, converts and transcribes audio.
    Ingest,
    /// Windowing a transcript file has no external requirements.
    Window,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ingest => {
            settings.validate()?;
            check_tool("yt-dlp")?;
            check_tool("ffmpeg")?;
            check_tool("ffprobe")?;
            check_api_key(settings)?;
        }
        Operation::Window => {}
    }
    Ok(())
}

/// The hosted OpenAI API needs a key; self-hosted servers do not.
pub fn needs_api_key(settings: &Settings) -> bool {
    settings.transcription.api_base.is_none() || settings.embedding.uses_hosted_openai()
}

fn check_api_key(settings: &Settings) -> Result<()> {
    if needs_api_key(settings) && !is_api_key_configured() {
        return Err(VidsearchError::Config(
            "OPENAI_API_KEY not set. Set it, or point transcription.api_base at a local server."
                .to_string(),
        ));
    }
    Ok(())
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(VidsearchError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VidsearchError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(VidsearchError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
