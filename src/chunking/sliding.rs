//! Overlapping fixed-size windows over a segment timeline.

use super::{Window, WindowConfig};
use crate::error::Result;
use crate::transcription::SegmentStore;
use tracing::debug;

/// Slice a transcript into overlapping windows.
///
/// Window `i` nominally covers `[i * step_size, i * step_size + window_size)`
/// and positions are generated while the window start lies before the end of
/// the last segment. A segment contributes when it strictly overlaps the
/// window. The first contributing segment (in store order) fixes the window's
/// `start`; `end` is always the nominal end, even past the recording. Positions
/// with no contributing text emit nothing.
///
/// Returns an error only for invalid sizes; an empty store yields no windows.
pub fn window(store: &SegmentStore, window_size: f64, step_size: f64) -> Result<Vec<Window>> {
    let config = WindowConfig::new(window_size, step_size)?;

    let total = match store.total_duration() {
        Some(total) if total > 0.0 => total,
        _ => return Ok(Vec::new()),
    };

    let mut windows = Vec::new();
    let mut position = 0u64;

    loop {
        // Multiplying instead of accumulating keeps positions exact for fractional steps
        let current_start = position as f64 * config.step_size;
        if current_start >= total {
            break;
        }
        let current_end = current_start + config.window_size;

        let mut start = None;
        let mut parts: Vec<&str> = Vec::new();

        for seg in store.iter().filter(|s| s.overlaps(current_start, current_end)) {
            if start.is_none() {
                start = Some(seg.start.max(current_start));
            }
            let text = seg.text.trim();
            if !text.is_empty() {
                parts.push(text);
            }
        }

        if let (Some(start), false) = (start, parts.is_empty()) {
            windows.push(Window {
                start,
                end: current_end,
                text: parts.join(" "),
            });
        }

        position += 1;
    }

    debug!(
        "Built {} windows from {} segments ({:.0}s total)",
        windows.len(),
        store.len(),
        total
    );

    Ok(windows)
}
