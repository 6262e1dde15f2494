//! Splitting long recordings for upload-limited transcription.

use crate::error::{Result, VidsearchError};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, instrument};

const PIECE_PREFIX: &str = "piece_";

/// Cut `source` into consecutive pieces of about `piece_seconds` with
/// ffmpeg's segment muxer.
///
/// Returns each piece with its start offset in seconds. Offsets are the
/// running sum of the probed piece durations, since stream-copied pieces end
/// on frame boundaries rather than exactly at `piece_seconds`.
#[instrument(skip_all, fields(source = %source.display()))]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    piece_seconds: u32,
) -> Result<Vec<(PathBuf, f64)>> {
    std::fs::create_dir_all(output_dir)?;
    let pattern = output_dir.join(format!("{}%04d.mp3", PIECE_PREFIX));

    let output = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
        .arg(source)
        .args(["-vn", "-f", "segment", "-segment_time"])
        .arg(piece_seconds.to_string())
        .args(["-reset_timestamps", "1", "-c", "copy"])
        .arg(&pattern)
        .output()
        .await
        .map_err(|e| spawn_error("ffmpeg", e))?;

    if !output.status.success() {
        return Err(VidsearchError::Transcription(format!(
            "ffmpeg could not split {}: {}",
            source.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let pieces = list_pieces(output_dir)?;
    if pieces.is_empty() {
        return Err(VidsearchError::Transcription(format!(
            "ffmpeg produced no pieces for {}",
            source.display()
        )));
    }

    let mut offset = 0.0;
    let mut placed = Vec::with_capacity(pieces.len());
    for piece in pieces {
        let duration = probe_duration(&piece).await?;
        debug!("{} starts at {:.1}s ({:.1}s long)", piece.display(), offset, duration);
        placed.push((piece, offset));
        offset += duration;
    }

    info!("Split into {} pieces covering {:.1}s", placed.len(), offset);
    Ok(placed)
}

/// Pieces written by `split_audio`, in playback order.
fn list_pieces(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pieces: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "mp3")
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(PIECE_PREFIX))
        })
        .collect();

    // Zero-padded indices sort lexically
    pieces.sort();
    Ok(pieces)
}

async fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args(["-v", "error", "-show_entries", "format=duration"])
        .args(["-of", "default=noprint_wrappers=1:nokey=1"])
        .arg(path)
        .output()
        .await
        .map_err(|e| spawn_error("ffprobe", e))?;

    if !output.status.success() {
        return Err(VidsearchError::Transcription(format!(
            "ffprobe could not read {}",
            path.display()
        )));
    }

    parse_duration(&String::from_utf8_lossy(&output.stdout))
}

/// Parse the bare number ffprobe prints for `format=duration`.
fn parse_duration(text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| {
            VidsearchError::Transcription(format!("Unexpected ffprobe duration '{}'", text.trim()))
        })
}

fn spawn_error(tool: &str, e: std::io::Error) -> VidsearchError {
    if e.kind() == std::io::ErrorKind::NotFound {
        VidsearchError::ToolNotFound(tool.to_string())
    } else {
        VidsearchError::Transcription(format!("{} failed to start: {}", tool, e))
    }
}
