//! Client configuration loaded from environment variables.
//!
//! All settings have defaults so the client starts with zero configuration
//! for local development.

use std::path::PathBuf;
use std::time::Duration;

use heartsync_backend::cloudinary::CloudinaryHost;
use heartsync_shared::constants::COUNTDOWN_TICK_MS;
use heartsync_shared::LeapDayPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Cloudinary cloud receiving uploaded pictures.
    /// Env: `HEARTSYNC_CLOUDINARY_CLOUD`
    /// Default: `deih8wngr`
    pub cloudinary_cloud: String,

    /// Unsigned upload preset of that cloud.
    /// Env: `HEARTSYNC_UPLOAD_PRESET`
    /// Default: `HeartSync`
    pub upload_preset: String,

    /// How often live countdowns refresh.
    /// Env: `HEARTSYNC_COUNTDOWN_TICK_MS`
    /// Default: `1000`
    pub countdown_tick: Duration,

    /// Where February 29 anniversaries land in other years.
    /// Env: `HEARTSYNC_LEAP_DAY` (`clamp` | `roll`)
    /// Default: `clamp`
    pub leap_day: LeapDayPolicy,

    /// Directory of the local database.
    /// Env: `HEARTSYNC_DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cloudinary_cloud: "deih8wngr".to_string(),
            upload_preset: "HeartSync".to_string(),
            countdown_tick: Duration::from_millis(COUNTDOWN_TICK_MS),
            leap_day: LeapDayPolicy::default(),
            data_dir: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(cloud) = lookup("HEARTSYNC_CLOUDINARY_CLOUD").filter(|v| !v.is_empty()) {
            config.cloudinary_cloud = cloud;
        }

        if let Some(preset) = lookup("HEARTSYNC_UPLOAD_PRESET").filter(|v| !v.is_empty()) {
            config.upload_preset = preset;
        }

        if let Some(val) = lookup("HEARTSYNC_COUNTDOWN_TICK_MS") {
            match val.parse::<u64>() {
                Ok(ms) if ms > 0 => config.countdown_tick = Duration::from_millis(ms),
                _ => tracing::warn!(
                    value = %val,
                    "Invalid HEARTSYNC_COUNTDOWN_TICK_MS, using default"
                ),
            }
        }

        if let Some(val) = lookup("HEARTSYNC_LEAP_DAY") {
            match val.parse::<LeapDayPolicy>() {
                Ok(policy) => config.leap_day = policy,
                Err(e) => tracing::warn!(error = %e, "Invalid HEARTSYNC_LEAP_DAY, using default"),
            }
        }

        if let Some(dir) = lookup("HEARTSYNC_DATA_DIR").filter(|v| !v.is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }

        config
    }

    /// The image host these settings point at.
    pub fn image_host(&self) -> CloudinaryHost {
        CloudinaryHost::new(&self.cloudinary_cloud, self.upload_preset.clone())
    }
}
