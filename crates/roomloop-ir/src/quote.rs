//! Timed quote overlays.
//!
//! Each quote occupies its own display window `[i * interval,
//! i * interval + display]` with a one-second linear fade at both ends.
//! Windows can never overlap: the display length is clamped to the
//! interval. The same windowing drives the preview renderer and the
//! batch `drawtext` stages.

use serde::{Deserialize, Serialize};

/// Linear fade length at each end of a quote window, in seconds.
pub const QUOTE_FADE_SECONDS: f64 = 1.0;

/// Quote overlay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteOverlay {
    /// Master toggle.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Ordered quote texts.
    pub quotes: Vec<String>,
    /// Seconds between the start of consecutive quote windows.
    #[serde(default = "default_interval")]
    pub interval_seconds: f64,
    /// Seconds each quote stays on screen (clamped to the interval).
    #[serde(default = "default_display")]
    pub display_seconds: f64,
}

fn default_enabled() -> bool {
    true
}

fn default_interval() -> f64 {
    30.0
}

fn default_display() -> f64 {
    5.0
}

impl QuoteOverlay {
    /// Create an enabled overlay with the default interval and display.
    pub fn new(quotes: Vec<String>) -> Self {
        Self {
            enabled: true,
            quotes,
            interval_seconds: default_interval(),
            display_seconds: default_display(),
        }
    }

    /// Effective display length: never longer than the interval, so
    /// consecutive windows cannot overlap.
    pub fn effective_display_seconds(&self) -> f64 {
        self.display_seconds
            .max(0.0)
            .min(self.interval_seconds.max(0.0))
    }

    /// The display windows of all quotes that start inside `[0, total)`.
    pub fn windows(&self, total_seconds: f64) -> Vec<QuoteWindow> {
        if !self.enabled || self.quotes.is_empty() || self.interval_seconds <= 0.0 {
            return Vec::new();
        }
        let display = self.effective_display_seconds();
        if display <= 0.0 {
            return Vec::new();
        }
        self.quotes
            .iter()
            .enumerate()
            .filter_map(|(index, text)| {
                let start = index as f64 * self.interval_seconds;
                if start >= total_seconds {
                    return None;
                }
                Some(QuoteWindow {
                    index,
                    text: text.clone(),
                    start,
                    end: start + display,
                })
            })
            .collect()
    }

    /// The quote visible at time `t`, with its fade alpha, if any.
    pub fn active_at(&self, t: f64, total_seconds: f64) -> Option<(usize, f64)> {
        for window in self.windows(total_seconds) {
            let alpha = window.alpha_at(t);
            if alpha > 0.0 {
                return Some((window.index, alpha));
            }
        }
        None
    }
}

/// One quote's display window on the output timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteWindow {
    /// Index into the quote list.
    pub index: usize,
    /// The quote text.
    pub text: String,
    /// Window start, seconds.
    pub start: f64,
    /// Window end, seconds.
    pub end: f64,
}

impl QuoteWindow {
    /// Overlay alpha at time `t`: 0 outside the window, a linear ramp over
    /// the first and last [`QUOTE_FADE_SECONDS`], 1 in between. Windows
    /// shorter than two fades never reach full opacity.
    pub fn alpha_at(&self, t: f64) -> f64 {
        if t < self.start || t > self.end {
            return 0.0;
        }
        let fade_in = (t - self.start) / QUOTE_FADE_SECONDS;
        let fade_out = (self.end - t) / QUOTE_FADE_SECONDS;
        fade_in.min(fade_out).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(n: usize) -> QuoteOverlay {
        QuoteOverlay::new((0..n).map(|i| format!("quote {}", i)).collect())
    }

    #[test]
    fn test_windows_do_not_overlap() {
        let q = overlay(3);
        let windows = q.windows(120.0);
        assert_eq!(windows.len(), 3);
        assert_eq!((windows[0].start, windows[0].end), (0.0, 5.0));
        assert_eq!((windows[1].start, windows[1].end), (30.0, 35.0));
        for pair in windows.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn test_display_clamped_to_interval() {
        let mut q = overlay(2);
        q.display_seconds = 45.0;
        assert!((q.effective_display_seconds() - 30.0).abs() < 1e-12);
        let windows = q.windows(120.0);
        assert!((windows[0].end - 30.0).abs() < 1e-12);
        assert!(windows[0].end <= windows[1].start);
    }

    #[test]
    fn test_windows_past_total_are_dropped() {
        let q = overlay(10);
        let windows = q.windows(65.0);
        assert_eq!(windows.len(), 3); // starts at 0, 30, 60
    }

    #[test]
    fn test_no_time_belongs_to_two_windows() {
        let q = overlay(4);
        for i in 0..1300 {
            let t = i as f64 * 0.1;
            let active: Vec<_> = q
                .windows(130.0)
                .iter()
                .filter(|w| w.alpha_at(t) > 0.0)
                .map(|w| w.index)
                .collect();
            assert!(active.len() <= 1, "overlap at t={}: {:?}", t, active);
        }
    }

    #[test]
    fn test_alpha_ramps() {
        let w = QuoteWindow {
            index: 0,
            text: "q".to_string(),
            start: 30.0,
            end: 35.0,
        };
        assert_eq!(w.alpha_at(29.9), 0.0);
        assert!((w.alpha_at(30.5) - 0.5).abs() < 1e-9);
        assert!((w.alpha_at(32.5) - 1.0).abs() < 1e-9);
        assert!((w.alpha_at(34.5) - 0.5).abs() < 1e-9);
        assert_eq!(w.alpha_at(35.1), 0.0);
    }

    #[test]
    fn test_disabled_overlay_has_no_windows() {
        let mut q = overlay(3);
        q.enabled = false;
        assert!(q.windows(120.0).is_empty());
        assert!(q.active_at(1.0, 120.0).is_none());
    }
}
