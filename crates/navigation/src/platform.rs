//! Client platform detection
//!
//! The user agent is the primary signal but is trivially spoofed, so touch
//! support and viewport width are used to corroborate it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Viewport width above which an untouchable "mobile" client is a desktop.
pub const DESKTOP_VIEWPORT_MIN: u32 = 1024;

static IOS_UA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)iphone|ipad|ipod").expect("static regex"));

static ANDROID_UA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)android").expect("static regex"));

static MOBILE_UA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)mobi|android|iphone|ipad|ipod|opera mini|iemobile|webos|blackberry")
        .expect("static regex")
});

/// Signals describing the client that asked for directions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientEnvironment {
    /// Raw `User-Agent` string
    pub user_agent: String,
    /// Reported touch points; 0 means no touch support
    #[serde(default)]
    pub max_touch_points: u32,
    /// Viewport width in CSS pixels, when known
    #[serde(default)]
    pub viewport_width: Option<u32>,
}

impl ClientEnvironment {
    /// Environment from a user agent alone.
    pub fn from_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..Self::default()
        }
    }

    /// Set touch points.
    pub fn with_touch_points(mut self, points: u32) -> Self {
        self.max_touch_points = points;
        self
    }

    /// Set viewport width.
    pub fn with_viewport(mut self, width: u32) -> Self {
        self.viewport_width = Some(width);
        self
    }
}

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// iOS and iPadOS
    Ios,
    /// Android
    Android,
    /// Anything else
    Other,
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Other => "other",
        })
    }
}

/// Detected platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    /// OS family
    pub os: Os,
    /// True for phones and tablets
    pub is_mobile: bool,
}

impl PlatformInfo {
    /// Classify a client.
    pub fn detect(env: &ClientEnvironment) -> Self {
        let ua = env.user_agent.as_str();

        // iPadOS 13+ reports a desktop Safari UA
        let ipad_desktop_mode = ua.contains("Macintosh") && env.max_touch_points > 1;

        let os = if IOS_UA.is_match(ua) || ipad_desktop_mode {
            Os::Ios
        } else if ANDROID_UA.is_match(ua) {
            Os::Android
        } else {
            Os::Other
        };

        let claims_mobile = MOBILE_UA.is_match(ua) || ipad_desktop_mode;
        let spoofed = claims_mobile
            && env.max_touch_points == 0
            && env.viewport_width.is_some_and(|w| w > DESKTOP_VIEWPORT_MIN);

        Self {
            os,
            is_mobile: claims_mobile && !spoofed,
        }
    }

    /// Desktop client of any OS.
    pub const fn desktop() -> Self {
        Self {
            os: Os::Other,
            is_mobile: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const PIXEL: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Mobile Safari/537.36";
    const MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15";
    const WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    #[test]
    fn test_iphone() {
        let env = ClientEnvironment::from_user_agent(IPHONE).with_touch_points(5);
        let p = PlatformInfo::detect(&env);
        assert_eq!(p.os, Os::Ios);
        assert!(p.is_mobile);
    }

    #[test]
    fn test_android() {
        let env = ClientEnvironment::from_user_agent(PIXEL).with_touch_points(5);
        let p = PlatformInfo::detect(&env);
        assert_eq!(p.os, Os::Android);
        assert!(p.is_mobile);
    }

    #[test]
    fn test_ipad_desktop_mode_is_ios() {
        let env = ClientEnvironment::from_user_agent(MAC).with_touch_points(5);
        let p = PlatformInfo::detect(&env);
        assert_eq!(p.os, Os::Ios);
        assert!(p.is_mobile);
    }

    #[test]
    fn test_mac_without_touch_is_desktop() {
        let env = ClientEnvironment::from_user_agent(MAC).with_viewport(1440);
        assert_eq!(PlatformInfo::detect(&env), PlatformInfo::desktop());
    }

    #[test]
    fn test_windows_is_desktop() {
        let env = ClientEnvironment::from_user_agent(WINDOWS);
        assert_eq!(PlatformInfo::detect(&env), PlatformInfo::desktop());
    }

    #[test]
    fn test_spoofed_mobile_ua_on_wide_screen() {
        let env = ClientEnvironment::from_user_agent(PIXEL).with_viewport(1920);
        let p = PlatformInfo::detect(&env);
        assert_eq!(p.os, Os::Android);
        assert!(!p.is_mobile);
    }

    #[test]
    fn test_mobile_ua_without_viewport_trusts_ua() {
        let env = ClientEnvironment::from_user_agent(IPHONE);
        assert!(PlatformInfo::detect(&env).is_mobile);
    }

    #[test]
    fn test_os_display() {
        assert_eq!(Os::Ios.to_string(), "ios");
        assert_eq!(Os::Other.to_string(), "other");
    }
}
