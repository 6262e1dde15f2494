//! yt-dlp backed fetcher with an on-disk audio cache.

use super::{FetchedMedia, MediaFetcher};
use crate::error::{Result, VidsearchError};
use async_trait::async_trait;
use regex::Regex;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::Output;
use std::sync::OnceLock;
use tokio::process::Command;
use tracing::{debug, info, instrument};

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Matches various YouTube URL formats and bare video IDs
        Regex::new(
            r"(?x)
            (?:
                (?:https?://)?
                (?:www\.|m\.)?
                (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/|youtube\.com/v/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex")
    })
}

/// Extract a YouTube video ID from a URL or bare ID.
pub fn extract_video_id(input: &str) -> Option<String> {
    let caps = video_id_regex().captures(input.trim())?;

    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Fetches audio through yt-dlp, caching `<downloads_dir>/<id>.mp3`.
pub struct YtDlpFetcher {
    downloads_dir: PathBuf,
}

impl YtDlpFetcher {
    pub fn new(downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            downloads_dir: downloads_dir.into(),
        }
    }

    /// Where the cached audio for `video_id` lives.
    pub fn cache_path(&self, video_id: &str) -> PathBuf {
        self.downloads_dir.join(format!("{}.mp3", video_id))
    }

    /// Resolve a bare id or short link to a canonical watch URL; other URLs pass through.
    fn canonical_url(input: &str) -> String {
        match extract_video_id(input) {
            Some(id) => format!("https://www.youtube.com/watch?v={}", id),
            None => input.trim().to_string(),
        }
    }

    /// Arguments for downloading `url` as `<downloads_dir>/<id>.mp3`.
    ///
    /// yt-dlp names the file after the video id and its mp3 post-processor
    /// converts whatever audio stream it picked.
    fn download_args(&self, url: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--format",
            "bestaudio/best",
            "--extract-audio",
            "--audio-format",
            "mp3",
            "--audio-quality",
            "192K",
            "--no-playlist",
            "--quiet",
            "--no-warnings",
            "--output",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        args.push(self.downloads_dir.join("%(id)s.%(ext)s").into_os_string());
        args.push(url.into());
        args
    }

    /// Fetch `(id, title)` using yt-dlp without downloading.
    async fn fetch_metadata(&self, url: &str) -> Result<(String, String)> {
        let output = run_yt_dlp(["--dump-json", "--no-download", "--no-warnings", "--no-playlist", url]).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidsearchError::VideoNotFound(format!(
                "{} not found or unavailable: {}",
                url,
                stderr.trim()
            )));
        }

        parse_metadata(&String::from_utf8_lossy(&output.stdout))
    }

    /// Download audio for `url` into the cache slot for `video_id`.
    async fn download(&self, url: &str, video_id: &str) -> Result<PathBuf> {
        let output = run_yt_dlp(self.download_args(url)).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidsearchError::AudioDownload(format!("yt-dlp failed: {}", stderr.trim())));
        }

        let target = self.cache_path(video_id);
        if !target.exists() {
            return Err(VidsearchError::AudioDownload(format!(
                "yt-dlp finished but {} was not created",
                target.display()
            )));
        }

        Ok(target)
    }
}

async fn run_yt_dlp<I, S>(args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Command::new("yt-dlp")
        .args(args)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VidsearchError::ToolNotFound("yt-dlp".to_string())
            } else {
                VidsearchError::AudioDownload(format!("Failed to run yt-dlp: {}", e))
            }
        })
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<FetchedMedia> {
        std::fs::create_dir_all(&self.downloads_dir)?;

        let url = Self::canonical_url(url);
        let (id, title) = self.fetch_metadata(&url).await?;

        let cached = self.cache_path(&id);
        if cached.exists() {
            info!("Found cached audio for '{}'", title);
            return Ok(FetchedMedia {
                local_path: cached,
                title,
                id,
            });
        }

        info!("Downloading audio for '{}'", title);
        let local_path = self.download(&url, &id).await?;
        debug!("Audio saved to {}", local_path.display());

        Ok(FetchedMedia {
            local_path,
            title,
            id,
        })
    }
}

/// Pull the id and title out of `yt-dlp --dump-json` output. The title falls back to the id.
fn parse_metadata(json_str: &str) -> Result<(String, String)> {
    let json: serde_json::Value = serde_json::from_str(json_str.trim()).map_err(|e| {
        VidsearchError::AudioDownload(format!("Failed to parse yt-dlp output: {}", e))
    })?;

    let id = json["id"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| VidsearchError::AudioDownload("yt-dlp output has no video id".to_string()))?
        .to_string();

    let title = json["title"]
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| id.clone());

    Ok((id, title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));

        assert_eq!(extract_video_id("not-a-video-id"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_canonical_url() {
        assert_eq!(
            YtDlpFetcher::canonical_url("youtu.be/dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(
            YtDlpFetcher::canonical_url("https://vimeo.com/12345 "),
            "https://vimeo.com/12345"
        );
    }

    #[test]
    fn test_parse_metadata() {
        let (id, title) = parse_metadata(r#"{"id": "abc123", "title": "A Talk"}"#).unwrap();
        assert_eq!(id, "abc123");
        assert_eq!(title, "A Talk");

        let (_, title) = parse_metadata(r#"{"id": "abc123"}"#).unwrap();
        assert_eq!(title, "abc123");

        assert!(parse_metadata(r#"{"title": "no id"}"#).is_err());
    }

    #[test]
    fn test_download_targets_cache_slot() {
        let fetcher = YtDlpFetcher::new("/data/downloads");
        assert_eq!(
            fetcher.cache_path("abc"),
            PathBuf::from("/data/downloads/abc.mp3")
        );

        let args = fetcher.download_args("https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        let args: Vec<&str> = args.iter().map(|a| a.to_str().unwrap()).collect();

        let format = args.iter().position(|a| *a == "--audio-format").unwrap();
        assert_eq!(args[format + 1], "mp3");
        let output = args.iter().position(|a| *a == "--output").unwrap();
        assert_eq!(args[output + 1], "/data/downloads/%(id)s.%(ext)s");
        assert_eq!(args.last(), Some(&"https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
    }
}
