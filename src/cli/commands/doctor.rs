//! Doctor command - verify system requirements and configuration.

use crate::chunking::WindowConfig;
use crate::cli::Output;
use crate::cli::preflight::needs_api_key;
use crate::config::Settings;
use crate::openai::is_api_key_configured;
use crate::vector_store::Database;
use console::style;
use std::path::Path;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("vidsearch doctor");
    println!();

    let mut checks = Vec::new();

    let tools = vec![
        check_tool("yt-dlp", "yt-dlp --version", install_hint_ytdlp()),
        check_tool("ffmpeg", "ffmpeg -version", install_hint_ffmpeg()),
        check_tool("ffprobe", "ffprobe -version", install_hint_ffmpeg()),
    ];
    print_section("External Tools", &tools);
    checks.extend(tools);

    let config = check_configuration(settings);
    print_section("Configuration", &config);
    checks.extend(config);

    let storage = check_storage(settings);
    print_section("Storage", &storage);
    checks.extend(storage);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!("{} error(s) found. Fix them before running ingest.", errors));
        anyhow::bail!("{} doctor check(s) failed", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, version_cmd: &str, hint: &str) -> CheckResult {
    let parts: Vec<&str> = version_cmd.split_whitespace().collect();
    let (cmd, args) = match parts.split_first() {
        Some((cmd, args)) => (*cmd, args),
        None => return CheckResult::error(name, "no command", hint),
    };

    match Command::new(cmd).args(args).output() {
        Ok(output) if output.status.success() => {
            let version: String = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .chars()
                .take(50)
                .collect();

            CheckResult::ok(name, &version)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

fn check_configuration(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        results.push(CheckResult::ok("Config file", &config_path.display().to_string()));
    } else {
        results.push(CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: vidsearch config init",
        ));
    }

    let videos = settings.sources.videos.len();
    if videos == 0 {
        results.push(CheckResult::warning(
            "Sources",
            "no videos configured",
            "Add URLs to [sources].videos or pass them to `vidsearch ingest`",
        ));
    } else {
        results.push(CheckResult::ok("Sources", &format!("{} video(s)", videos)));
    }

    let embedding = &settings.embedding;
    let summary = format!(
        "{} via {} at {} (concurrency {})",
        embedding.model,
        embedding.provider,
        embedding.target(),
        embedding.concurrency
    );
    match embedding.validate_endpoint() {
        Ok(()) => results.push(CheckResult::ok("Embeddings", &summary)),
        Err(e) => results.push(CheckResult::error("Embeddings", &summary, &e.to_string())),
    }

    if needs_api_key(settings) && !is_api_key_configured() {
        results.push(CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...' or configure transcription.api_base",
        ));
    } else {
        results.push(CheckResult::ok(
            "Transcription",
            &format!(
                "{} at {}",
                settings.transcription.model,
                settings.transcription.api_base.as_deref().unwrap_or("api.openai.com")
            ),
        ));
    }

    let w = &settings.windowing;
    if WindowConfig::try_from(w).is_err() {
        results.push(CheckResult::error(
            "Windowing",
            &format!("{}s windows every {}s", w.window_seconds, w.step_seconds),
            "Both values must be positive",
        ));
    } else {
        results.push(CheckResult::ok(
            "Windowing",
            &format!("{}s windows every {}s", w.window_seconds, w.step_seconds),
        ));
    }

    results
}

fn check_storage(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let downloads = settings.downloads_dir();
    if downloads.exists() {
        let cached = count_cached_audio(&downloads);
        results.push(CheckResult::ok(
            "Downloads",
            &format!("{} ({} cached file(s))", downloads.display(), cached),
        ));
    } else {
        results.push(CheckResult::warning(
            "Downloads",
            &format!("{} (will be created)", downloads.display()),
            "Directory will be created on first ingest",
        ));
    }

    let db_path = settings.db_path();
    if db_path.exists() {
        match Database::load(&db_path) {
            Ok(db) => {
                let size = std::fs::metadata(&db_path)
                    .map(|m| format_size(m.len()))
                    .unwrap_or_else(|_| "unknown size".to_string());
                results.push(CheckResult::ok(
                    "Database",
                    &format!(
                        "{} ({} records from {} video(s), {})",
                        db_path.display(),
                        db.len(),
                        db.video_ids().len(),
                        size
                    ),
                ));
            }
            Err(e) => results.push(CheckResult::warning(
                "Database",
                &format!("{} is unreadable: {}", db_path.display(), e),
                "It will be overwritten by the next successful ingest",
            )),
        }
    } else {
        results.push(CheckResult::warning(
            "Database",
            &format!("{} (not created yet)", db_path.display()),
            "Run `vidsearch ingest` to build it",
        ));
    }

    results
}

fn count_cached_audio(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "mp3"))
                .count()
        })
        .unwrap_or(0)
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingProvider;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
    }

    #[test]
    fn test_bad_endpoint_reported_as_error() {
        let mut settings = Settings::default();
        settings.embedding.endpoint = Some("localhost".to_string());

        let results = check_configuration(&settings);
        let embeddings = results.iter().find(|r| r.name == "Embeddings").unwrap();
        assert_eq!(embeddings.status, CheckStatus::Error);

        settings.embedding.provider = EmbeddingProvider::OpenAI;
        settings.embedding.endpoint = Some("http://localhost:11434/api/embeddings".to_string());
        let results = check_configuration(&settings);
        let embeddings = results.iter().find(|r| r.name == "Embeddings").unwrap();
        assert_eq!(embeddings.status, CheckStatus::Error);
    }

    #[test]
    fn test_storage_counts_cached_audio() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("b.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        assert_eq!(count_cached_audio(dir.path()), 2);
        assert_eq!(count_cached_audio(&dir.path().join("missing")), 0);
    }
}
