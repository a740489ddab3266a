use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Time duration with sub-millisecond precision (stored as fractional seconds).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Duration {
    /// Duration in seconds.
    seconds: f64,
}

impl Duration {
    /// Create a duration from seconds.
    pub fn from_seconds(s: f64) -> Self {
        Self {
            seconds: s.max(0.0),
        }
    }

    /// Create a duration from whole hours.
    pub fn from_hours(h: f64) -> Self {
        Self::from_seconds(h * 3600.0)
    }

    /// Create a zero duration.
    pub fn zero() -> Self {
        Self { seconds: 0.0 }
    }

    /// Get duration as seconds.
    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Number of whole frame periods that fit in this duration at the
    /// given FPS. A duration shorter than one frame period yields 0.
    pub fn frame_count(&self, fps: f64) -> u64 {
        if fps <= 0.0 {
            return 0;
        }
        (self.seconds * fps).floor().max(0.0) as u64
    }
}

impl Default for Duration {
    fn default() -> Self {
        Duration::zero()
    }
}

impl Add for Duration {
    type Output = Duration;
    fn add(self, rhs: Duration) -> Duration {
        Duration::from_seconds(self.seconds + rhs.seconds)
    }
}

impl Sub for Duration {
    type Output = Duration;
    fn sub(self, rhs: Duration) -> Duration {
        Duration::from_seconds((self.seconds - rhs.seconds).max(0.0))
    }
}

impl Mul<f64> for Duration {
    type Output = Duration;
    fn mul(self, rhs: f64) -> Duration {
        Duration::from_seconds(self.seconds * rhs)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.seconds >= 3600.0 {
            write!(f, "{:.1}h", self.seconds / 3600.0)
        } else if self.seconds >= 1.0 {
            write!(f, "{:.2}s", self.seconds)
        } else {
            write!(f, "{:.0}ms", self.seconds * 1000.0)
        }
    }
}

/// A point in time within a video, measured from its start.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Timestamp {
    /// Time in seconds from the start of the video.
    seconds: f64,
}

impl Timestamp {
    /// Create a timestamp from seconds.
    pub fn from_seconds(s: f64) -> Self {
        Self {
            seconds: s.max(0.0),
        }
    }

    /// The timestamp of a frame index at the given FPS.
    pub fn from_frame(index: u64, fps: f64) -> Self {
        Self::from_seconds(index as f64 / fps)
    }

    /// Create a timestamp at the start (0.0).
    pub fn zero() -> Self {
        Self { seconds: 0.0 }
    }

    /// Get the time in seconds.
    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Convert to a frame index for a given FPS.
    pub fn to_frame(&self, fps: f64) -> u64 {
        (self.seconds * fps).floor() as u64
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::zero()
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;
    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp::from_seconds(self.seconds + rhs.as_seconds())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_ms = (self.seconds * 1000.0) as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let secs = (total_ms % 60_000) / 1_000;
        let ms = total_ms % 1_000;
        write!(f, "{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_from_seconds() {
        let d = Duration::from_seconds(2.5);
        assert!((d.as_seconds() - 2.5).abs() < 0.001);
    }

    #[test]
    fn test_duration_from_hours() {
        let d = Duration::from_hours(2.0);
        assert!((d.as_seconds() - 7200.0).abs() < 0.001);
    }

    #[test]
    fn test_duration_frame_count_floors() {
        assert_eq!(Duration::from_seconds(2.0).frame_count(30.0), 60);
        // Shorter than one frame period: an empty, valid timeline.
        assert_eq!(Duration::from_seconds(0.01).frame_count(30.0), 0);
    }

    #[test]
    fn test_duration_arithmetic() {
        let a = Duration::from_seconds(1.0);
        let b = Duration::from_seconds(0.5);
        assert!(((a + b).as_seconds() - 1.5).abs() < 0.001);
        assert!(((a - b).as_seconds() - 0.5).abs() < 0.001);
        assert!(((a * 3.0).as_seconds() - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_duration_display() {
        assert_eq!(format!("{}", Duration::from_seconds(2.5)), "2.50s");
        assert_eq!(format!("{}", Duration::from_seconds(0.5)), "500ms");
        assert_eq!(format!("{}", Duration::from_hours(3.0)), "3.0h");
    }

    #[test]
    fn test_timestamp_frame_round_trip() {
        let ts = Timestamp::from_frame(90, 30.0);
        assert!((ts.as_seconds() - 3.0).abs() < 0.001);
        assert_eq!(ts.to_frame(30.0), 90);
    }

    #[test]
    fn test_timestamp_display() {
        let ts = Timestamp::from_seconds(3661.5);
        assert_eq!(format!("{}", ts), "01:01:01.500");
    }
}
