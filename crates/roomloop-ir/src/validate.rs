use crate::theme::RoomConfig;
use roomloop_core::RoomloopError;

/// Validate a RoomConfig for structural correctness.
///
/// Validation rejects configurations that no amount of internal clamping
/// can make sense of (missing fields, non-finite numbers). Merely
/// out-of-range theme parameters pass: the signal library clamps those.
pub fn validate_config(config: &RoomConfig) -> Result<(), Vec<RoomloopError>> {
    let mut errors = Vec::new();

    if config.background_image.as_os_str().is_empty() {
        errors.push(RoomloopError::Validation(
            "background_image must not be empty".into(),
        ));
    }

    let secs = config.duration.as_seconds();
    if secs <= 0.0 || !secs.is_finite() {
        errors.push(RoomloopError::Validation(
            "duration must be positive and finite".into(),
        ));
    }

    if config.fps == 0 {
        errors.push(RoomloopError::Validation("fps must be positive".into()));
    }

    if let Some(quotes) = &config.quotes {
        if quotes.enabled {
            if quotes.quotes.is_empty() {
                errors.push(RoomloopError::Validation(
                    "quote overlay enabled but the quote list is empty".into(),
                ));
            }
            if quotes.interval_seconds <= 0.0 || !quotes.interval_seconds.is_finite() {
                errors.push(RoomloopError::Validation(
                    "quote interval must be positive and finite".into(),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
