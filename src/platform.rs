//! Facts about the machine and account the run executes under.

use serde::Serialize;

use crate::config::PlatformConfig;
use crate::error::{ConfigureError, Result};

/// Variables consulted, in order, for the current user name.
const USER_ENV_VARS: [&str; 3] = ["USER", "USERNAME", "LOGNAME"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformInfo {
    pub user: String,
    pub os_name: String,
}

impl PlatformInfo {
    pub fn new(user: impl Into<String>, os_name: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            os_name: os_name.into(),
        }
    }

    /// Detect user and OS, letting configured overrides win.
    pub fn detect(overrides: &PlatformConfig) -> Result<Self> {
        let user = match &overrides.user {
            Some(user) => user.clone(),
            None => detect_user()?,
        };
        let os_name = match &overrides.os_name {
            Some(os) => os.clone(),
            None => os_family_name(std::env::consts::OS),
        };
        Ok(Self { user, os_name })
    }
}

/// Environment variables first, then the account database entry for the
/// process uid.
fn detect_user() -> Result<String> {
    USER_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| !v.trim().is_empty())
        .or_else(user_from_uid)
        .ok_or_else(|| {
            ConfigureError::Platform(format!(
                "none of {} is set and the process uid has no account entry; \
                 configure platform.user",
                USER_ENV_VARS.join(", ")
            ))
        })
}

#[cfg(unix)]
fn user_from_uid() -> Option<String> {
    use nix::unistd::{getuid, User};

    match User::from_uid(getuid()) {
        Ok(Some(user)) if !user.name.is_empty() => Some(user.name),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "account lookup for process uid failed");
            None
        }
    }
}

#[cfg(not(unix))]
fn user_from_uid() -> Option<String> {
    None
}

/// Family name in the form the JVM reports as `os.name`.
fn os_family_name(os: &str) -> String {
    match os {
        "linux" => "Linux".to_string(),
        "macos" => "Mac OS X".to_string(),
        "windows" => "Windows".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        "netbsd" => "NetBSD".to_string(),
        "openbsd" => "OpenBSD".to_string(),
        "solaris" => "SunOS".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => "Unknown".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_precedence() {
        let overrides = PlatformConfig {
            user: Some("ci-bot".to_string()),
            os_name: Some("Plan 9".to_string()),
        };
        let info = PlatformInfo::detect(&overrides).unwrap();
        assert_eq!(info, PlatformInfo::new("ci-bot", "Plan 9"));
    }

    #[test]
    fn test_env_user_is_preferred() {
        temp_env::with_vars(
            [
                ("USER", Some("from-env")),
                ("USERNAME", None::<&str>),
                ("LOGNAME", None),
            ],
            || {
                let info = PlatformInfo::detect(&PlatformConfig::default()).unwrap();
                assert_eq!(info.user, "from-env");
            },
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_user_resolved_from_uid_without_env_vars() {
        temp_env::with_vars_unset(USER_ENV_VARS, || {
            let info = PlatformInfo::detect(&PlatformConfig::default()).unwrap();
            let expected = nix::unistd::User::from_uid(nix::unistd::getuid())
                .unwrap()
                .unwrap()
                .name;
            assert!(!info.user.is_empty());
            assert_eq!(info.user, expected);
        });
    }

    #[test]
    fn test_os_family_names() {
        assert_eq!(os_family_name("linux"), "Linux");
        assert_eq!(os_family_name("macos"), "Mac OS X");
        assert_eq!(os_family_name("windows"), "Windows");
        assert_eq!(os_family_name("dragonfly"), "Dragonfly");
        assert_eq!(os_family_name(""), "Unknown");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_detected_os_is_family_not_distribution() {
        let info = PlatformInfo::detect(&PlatformConfig {
            user: Some("x".to_string()),
            os_name: None,
        })
        .unwrap();
        assert_eq!(info.os_name, "Linux");
    }
}
