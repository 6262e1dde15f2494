//! Whisper transcription over an OpenAI-compatible API.

use super::{Segment, Transcriber};
use crate::audio_source::split_audio;
use crate::config::TranscriptionSettings;
use crate::error::{Result, VidsearchError};
use crate::openai::create_client;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Uploads above this size are rejected by the hosted API, so the audio is split first.
const MAX_UPLOAD_BYTES: u64 = 24 * 1024 * 1024;

/// Length of each piece when a long recording has to be split.
const SPLIT_CHUNK_SECONDS: u32 = 600;

const REQUEST_TIMEOUT_SECS: u64 = 600;

/// Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    language: Option<String>,
}

impl WhisperTranscriber {
    /// Create a transcriber from settings.
    pub fn from_settings(settings: &TranscriptionSettings) -> Result<Self> {
        let client = create_client(
            settings.api_base.as_deref(),
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        )?;

        Ok(Self {
            client,
            model: settings.model.clone(),
            language: settings.language.clone(),
        })
    }

    /// Transcribe a single audio file (no splitting).
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_single(&self, audio_path: &Path) -> Result<Vec<Segment>> {
        debug!("Transcribing audio file");

        let file_bytes = tokio::fs::read(audio_path).await?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| VidsearchError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| VidsearchError::OpenAI(format!("Whisper API error: {}", e)))?;

        let segments: Vec<Segment> = match response.segments {
            Some(segs) => segs
                .iter()
                .map(|s| Segment::new(s.start as f64, s.end as f64, s.text.clone()))
                .collect(),
            // Some servers omit segments for very short clips
            None if !response.text.trim().is_empty() => {
                vec![Segment::new(0.0, response.duration as f64, response.text)]
            }
            None => Vec::new(),
        };

        debug!("Transcribed {} segments", segments.len());
        Ok(segments)
    }

    /// Split a long recording, transcribe the pieces in order and shift their timestamps.
    async fn transcribe_split(&self, audio_path: &Path) -> Result<Vec<Segment>> {
        let temp_dir = tempfile::tempdir()?;
        let pieces = split_audio(audio_path, temp_dir.path(), SPLIT_CHUNK_SECONDS).await?;
        info!("Transcribing {} audio pieces with {}", pieces.len(), self.model);

        let mut all_segments = Vec::new();
        for (idx, (piece_path, offset)) in pieces.iter().enumerate() {
            let segments = self.transcribe_single(piece_path).await.map_err(|e| {
                VidsearchError::Transcription(format!("Piece {} at {:.0}s failed: {}", idx, offset, e))
            })?;

            all_segments.extend(segments.into_iter().map(|mut s| {
                s.start += offset;
                s.end += offset;
                s
            }));
        }

        Ok(all_segments)
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<Segment>> {
        let size = tokio::fs::metadata(audio_path).await?.len();
        if size > MAX_UPLOAD_BYTES {
            self.transcribe_split(audio_path).await
        } else {
            self.transcribe_single(audio_path).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcriber_from_settings() {
        let settings = TranscriptionSettings {
            model: "Systran/faster-whisper-small".to_string(),
            api_base: Some("http://localhost:8000/v1/".to_string()),
            language: Some("en".to_string()),
        };

        let transcriber = WhisperTranscriber::from_settings(&settings).unwrap();
        assert_eq!(transcriber.model, "Systran/faster-whisper-small");
        assert_eq!(transcriber.language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_missing_audio_file_is_an_error() {
        let transcriber = WhisperTranscriber::from_settings(&TranscriptionSettings::default()).unwrap();
        let result = transcriber.transcribe(Path::new("/nonexistent/audio.mp3")).await;
        assert!(matches!(result, Err(VidsearchError::Io(_))));
    }
}
