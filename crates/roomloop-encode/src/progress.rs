//! Parses FFmpeg's `-progress` key=value stream into a monotone
//! percentage.

use roomloop_core::Timestamp;

/// Incremental parser for the `-progress pipe:1` output of FFmpeg.
///
/// FFmpeg reports the encoded output timestamp as `out_time_us` (and the
/// historically microsecond-valued `out_time_ms`); dividing by the total
/// requested duration gives a fraction. The parser never reports a value
/// lower than one it already reported, so callers can render a progress
/// bar without smoothing.
#[derive(Debug)]
pub struct ProgressParser {
    total_us: u64,
    last_us: u64,
    last_percent: f64,
}

impl ProgressParser {
    /// Create a parser for a render of the given total duration.
    pub fn new(total_seconds: f64) -> Self {
        Self {
            total_us: (total_seconds.max(0.0) * 1_000_000.0) as u64,
            last_us: 0,
            last_percent: 0.0,
        }
    }

    /// Feed one `key=value` line. Returns a new percentage when the line
    /// advanced progress.
    pub fn push_line(&mut self, line: &str) -> Option<f64> {
        let (key, value) = line.trim().split_once('=')?;
        if key != "out_time_us" && key != "out_time_ms" {
            return None;
        }
        let us: u64 = value.trim().parse().ok()?;
        if self.total_us == 0 {
            return None;
        }
        let percent = (us as f64 / self.total_us as f64 * 100.0).min(100.0);
        if percent > self.last_percent {
            self.last_us = us;
            self.last_percent = percent;
            Some(percent)
        } else {
            None
        }
    }

    /// The highest percentage reported so far.
    pub fn percent(&self) -> f64 {
        self.last_percent
    }

    /// The furthest encoded output position.
    pub fn position(&self) -> Timestamp {
        Timestamp::from_seconds(self.last_us as f64 / 1_000_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_fraction_of_total() {
        let mut p = ProgressParser::new(10.0);
        assert_eq!(p.push_line("out_time_us=5000000"), Some(50.0));
    }

    #[test]
    fn test_monotone_despite_out_of_order_lines() {
        let mut p = ProgressParser::new(10.0);
        assert!(p.push_line("out_time_us=4000000").is_some());
        assert!(p.push_line("out_time_us=3000000").is_none());
        assert!(p.push_line("out_time_us=4000000").is_none());
        assert_eq!(p.push_line("out_time_us=8000000"), Some(80.0));
        assert!((p.percent() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_ignores_unrelated_keys() {
        let mut p = ProgressParser::new(10.0);
        assert!(p.push_line("frame=120").is_none());
        assert!(p.push_line("speed=3.1x").is_none());
        assert!(p.push_line("progress=continue").is_none());
        assert!(p.push_line("not a key value pair").is_none());
    }

    #[test]
    fn test_caps_at_one_hundred() {
        let mut p = ProgressParser::new(1.0);
        assert_eq!(p.push_line("out_time_us=2000000"), Some(100.0));
    }

    #[test]
    fn test_zero_duration_never_reports() {
        let mut p = ProgressParser::new(0.0);
        assert!(p.push_line("out_time_us=1").is_none());
    }

    #[test]
    fn test_position_tracks_furthest_output_time() {
        let mut p = ProgressParser::new(10.0);
        p.push_line("out_time_us=3661500000");
        assert_eq!(format!("{}", p.position()), "01:01:01.500");
    }
}
