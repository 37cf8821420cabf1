//! Backend variants and route categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Media-server API family the gateway sits in front of.
///
/// Chosen once at startup; selects the pattern table and path conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendVariant {
    /// Emby. Numeric item ids, optional `/emby` mount prefix.
    #[default]
    Emby,
    /// Jellyfin. Hex/alphanumeric item ids, no mount prefix.
    Jellyfin,
    /// fnOS media server. Namespaced `/v/api/v1/...` scheme.
    Fntv,
}

impl BackendVariant {
    /// Optional mount prefix the backend accepts in front of its API paths.
    pub fn mount_prefix(&self) -> Option<&'static str> {
        match self {
            BackendVariant::Emby => Some("/emby"),
            BackendVariant::Jellyfin | BackendVariant::Fntv => None,
        }
    }

    /// Stable lowercase name used in config, logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendVariant::Emby => "emby",
            BackendVariant::Jellyfin => "jellyfin",
            BackendVariant::Fntv => "fntv",
        }
    }
}

impl fmt::Display for BackendVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown backend name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown backend variant '{0}' (expected emby, jellyfin or fntv)")]
pub struct UnknownBackend(pub String);

impl FromStr for BackendVariant {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "emby" => Ok(BackendVariant::Emby),
            "jellyfin" => Ok(BackendVariant::Jellyfin),
            "fntv" => Ok(BackendVariant::Fntv),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}

/// What a request path is, as far as the gateway cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteCategory {
    VideoStream,
    Download,
    PlaybackInfo,
    SubtitleRewrite,
    WebIndex,
    WebAsset,
    ImageCache,
    SubtitleCache,
    /// No rule matched. Proxy as-is.
    Unclassified,
}

impl RouteCategory {
    /// Label used for metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteCategory::VideoStream => "video_stream",
            RouteCategory::Download => "download",
            RouteCategory::PlaybackInfo => "playback_info",
            RouteCategory::SubtitleRewrite => "subtitle_rewrite",
            RouteCategory::WebIndex => "web_index",
            RouteCategory::WebAsset => "web_asset",
            RouteCategory::ImageCache => "image_cache",
            RouteCategory::SubtitleCache => "subtitle_cache",
            RouteCategory::Unclassified => "unclassified",
        }
    }

    /// True for the categories served through the cache policy.
    pub fn is_cacheable(&self) -> bool {
        matches!(self, RouteCategory::ImageCache | RouteCategory::SubtitleCache)
    }
}

impl fmt::Display for RouteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("emby".parse::<BackendVariant>().unwrap(), BackendVariant::Emby);
        assert_eq!("Jellyfin".parse::<BackendVariant>().unwrap(), BackendVariant::Jellyfin);
        assert_eq!("FNTV".parse::<BackendVariant>().unwrap(), BackendVariant::Fntv);
        assert!("plex".parse::<BackendVariant>().is_err());
    }

    #[test]
    fn test_mount_prefix() {
        assert_eq!(BackendVariant::Emby.mount_prefix(), Some("/emby"));
        assert_eq!(BackendVariant::Jellyfin.mount_prefix(), None);
    }
}
