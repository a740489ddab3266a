//! Provider glue: background image generation and motion clip generation.
//!
//! The interesting part is the motion routing rule. Two providers exist
//! (a primary tuned for short clips, an alternate that handles long
//! ones); which to call is decided by a pure decision table keyed on the
//! requested duration and provider availability, never by retrying the
//! primary on failure. Failure of the routed provider propagates as-is.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use serde_json::json;
use sha2::{Digest, Sha256};

use roomloop_core::ProvidersConfig;

/// Clip durations (seconds) the motion providers accept.
pub const ALLOWED_MOTION_DURATIONS: &[f64] = &[5.0, 10.0, 20.0];

/// The two motion-generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionProvider {
    /// Primary engine, best for short cinematic clips.
    Ltx,
    /// Alternate engine, required for long clips.
    Runware,
}

impl MotionProvider {
    pub fn name(&self) -> &'static str {
        match self {
            MotionProvider::Ltx => "ltx",
            MotionProvider::Runware => "runware",
        }
    }
}

/// Pick the motion provider for a clip.
///
/// Durations at or above the threshold route to the alternate; if the
/// routed provider is not configured, the other one is used instead.
/// With neither configured this is a configuration error, reported
/// before any network traffic.
pub fn route_motion(
    duration_seconds: f64,
    threshold_seconds: f64,
    primary_available: bool,
    alternate_available: bool,
) -> Result<MotionProvider> {
    let preferred = if duration_seconds >= threshold_seconds {
        MotionProvider::Runware
    } else {
        MotionProvider::Ltx
    };
    let available = |p: MotionProvider| match p {
        MotionProvider::Ltx => primary_available,
        MotionProvider::Runware => alternate_available,
    };
    if available(preferred) {
        return Ok(preferred);
    }
    let other = match preferred {
        MotionProvider::Ltx => MotionProvider::Runware,
        MotionProvider::Runware => MotionProvider::Ltx,
    };
    if available(other) {
        return Ok(other);
    }
    Err(anyhow!(
        "no motion provider configured (set providers.motion_model_primary or providers.motion_model_alternate)"
    ))
}

/// Validate a requested motion clip duration.
pub fn validate_motion_duration(duration_seconds: f64) -> Result<()> {
    if ALLOWED_MOTION_DURATIONS
        .iter()
        .any(|d| (d - duration_seconds).abs() < 1e-9)
    {
        Ok(())
    } else {
        Err(anyhow!(
            "motion duration must be one of {:?} seconds, got {}",
            ALLOWED_MOTION_DURATIONS,
            duration_seconds
        ))
    }
}

/// Options for one motion clip request.
#[derive(Debug, Clone)]
pub struct MotionRequest {
    pub image_url: String,
    pub intensity: f64,
    pub duration_seconds: f64,
}

/// Generate a background image from a prompt. Returns the image URL.
pub fn generate_background(
    providers: &ProvidersConfig,
    prompt: &str,
    width: u32,
    height: u32,
) -> Result<String> {
    if providers.image_model.is_empty() {
        return Err(anyhow!(
            "providers.image_model is not configured (e.g. \"runware:111@1\")"
        ));
    }
    let api_key = require_key(&providers.runware_api_key, "RUNWARE_API_KEY")?;

    tracing::info!("generating background image with {}", providers.image_model);

    let client = Client::new();
    let res = client
        .post("https://api.runware.ai/v1/image/generate")
        .bearer_auth(api_key)
        .json(&json!({
            "model": providers.image_model,
            "prompt": prompt,
            "resolution": format!("{}x{}", width, height),
        }))
        .send()
        .context("image generation request failed")?;

    if !res.status().is_success() {
        let status = res.status();
        let text = res.text().unwrap_or_default();
        return Err(anyhow!("image generation failed: {}: {}", status, text));
    }

    let body: serde_json::Value = res
        .json()
        .context("failed to parse image generation response")?;
    body.get("image_url")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("image generation response missing image_url"))
}

/// Generate a motion clip from a still image. Returns the video URL.
pub fn generate_motion(providers: &ProvidersConfig, request: &MotionRequest) -> Result<String> {
    validate_motion_duration(request.duration_seconds)?;

    let primary_available =
        !providers.motion_model_primary.is_empty() && !providers.fal_api_key.is_empty();
    let alternate_available =
        !providers.motion_model_alternate.is_empty() && !providers.runware_api_key.is_empty();

    let provider = route_motion(
        request.duration_seconds,
        providers.motion_duration_threshold,
        primary_available,
        alternate_available,
    )?;
    tracing::info!(
        "routing {}s motion clip to {}",
        request.duration_seconds,
        provider.name()
    );

    match provider {
        MotionProvider::Ltx => ltx_motion(providers, request),
        MotionProvider::Runware => runware_motion(providers, request),
    }
}

fn ltx_motion(providers: &ProvidersConfig, request: &MotionRequest) -> Result<String> {
    let client = Client::new();
    let res = client
        .post(format!("https://fal.run/{}", providers.motion_model_primary))
        .bearer_auth(&providers.fal_api_key)
        .json(&json!({
            "url": request.image_url,
            "prompt": "slow upward elevator ride through space, cinematic",
            "fps": 30,
            "motion": request.intensity,
            "duration": request.duration_seconds,
        }))
        .send()
        .context("ltx motion request failed")?;

    if !res.status().is_success() {
        let status = res.status();
        let text = res.text().unwrap_or_default();
        return Err(anyhow!("ltx motion failed: {}: {}", status, text));
    }

    let body: serde_json::Value = res.json().context("failed to parse ltx response")?;
    body.pointer("/video/url")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("ltx response missing video url"))
}

fn runware_motion(providers: &ProvidersConfig, request: &MotionRequest) -> Result<String> {
    let client = Client::new();
    let res = client
        .post("https://api.runware.ai/v1/motion/generate")
        .bearer_auth(&providers.runware_api_key)
        .json(&json!({
            "model": providers.motion_model_alternate,
            "image_url": request.image_url,
            "motion": "vertical-up",
            "strength": request.intensity,
            "fps": 30,
            "duration": request.duration_seconds,
        }))
        .send()
        .context("runware motion request failed")?;

    if !res.status().is_success() {
        let status = res.status();
        let text = res.text().unwrap_or_default();
        return Err(anyhow!("runware motion failed: {}: {}", status, text));
    }

    let body: serde_json::Value = res.json().context("failed to parse runware response")?;
    body.get("video_url")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("runware response missing video_url"))
}

/// Download a generated asset into the cache, keyed by its URL. Returns
/// the cached file path; repeated calls for the same URL are free.
pub fn download_to_cache(cache_root: &Path, url: &str, extension: &str) -> Result<PathBuf> {
    let out_dir = cache_root.join("generated");
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create cache dir: {}", out_dir.display()))?;
    let out_path = out_dir.join(format!("{}.{}", sha256_hex(url), extension));
    if out_path.exists() {
        return Ok(out_path);
    }

    let bytes = Client::new()
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("failed to download {}", url))?
        .bytes()
        .context("failed to read downloaded bytes")?;
    std::fs::write(&out_path, &bytes)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    Ok(out_path)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    if path == "~" || path.starts_with("~/") {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("failed to resolve home dir"))?;
        if path == "~" {
            return Ok(home);
        }
        return Ok(home.join(path.trim_start_matches("~/")));
    }
    Ok(PathBuf::from(path))
}

fn require_key<'a>(configured: &'a str, env_name: &str) -> Result<String> {
    if !configured.is_empty() {
        return Ok(configured.to_string());
    }
    std::env::var(env_name).map_err(|_| anyhow!("{} is not set", env_name))
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_clips_route_to_primary() {
        assert_eq!(
            route_motion(5.0, 10.0, true, true).unwrap(),
            MotionProvider::Ltx
        );
    }

    #[test]
    fn test_long_clips_route_to_alternate() {
        assert_eq!(
            route_motion(10.0, 10.0, true, true).unwrap(),
            MotionProvider::Runware
        );
        assert_eq!(
            route_motion(20.0, 10.0, true, true).unwrap(),
            MotionProvider::Runware
        );
    }

    #[test]
    fn test_unavailable_provider_falls_through() {
        assert_eq!(
            route_motion(5.0, 10.0, false, true).unwrap(),
            MotionProvider::Runware
        );
        assert_eq!(
            route_motion(20.0, 10.0, true, false).unwrap(),
            MotionProvider::Ltx
        );
    }

    #[test]
    fn test_no_provider_is_an_error() {
        assert!(route_motion(5.0, 10.0, false, false).is_err());
    }

    #[test]
    fn test_motion_duration_validation() {
        assert!(validate_motion_duration(5.0).is_ok());
        assert!(validate_motion_duration(10.0).is_ok());
        assert!(validate_motion_duration(20.0).is_ok());
        assert!(validate_motion_duration(7.0).is_err());
        assert!(validate_motion_duration(0.0).is_err());
    }

    #[test]
    fn test_sha256_hex_is_stable() {
        assert_eq!(sha256_hex("roomloop"), sha256_hex("roomloop"));
        assert_ne!(sha256_hex("a"), sha256_hex("b"));
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        assert_eq!(
            expand_tilde("/tmp/cache").unwrap(),
            PathBuf::from("/tmp/cache")
        );
    }
}
