//! Warning reporting for the update loop.
//!
//! The loop never returns errors to its caller; everything it wants to say
//! goes through a [`WarningSink`] as a stable message key plus optional
//! error detail.

use std::error::Error;
use std::fmt;
use tracing_subscriber::EnvFilter;

/// Stable message keys understood by localized loggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKey {
    /// Too many receive timeouts since the last warning
    UpdateTimeout,
    /// Receive or decode failed for a reason other than a timeout
    UpdateFailed,
}

impl WarningKey {
    pub fn key(self) -> &'static str {
        match self {
            WarningKey::UpdateTimeout => "update-timeout",
            WarningKey::UpdateFailed => "update-failed",
        }
    }

    /// English text for the key.
    pub fn message(self) -> &'static str {
        match self {
            WarningKey::UpdateTimeout => {
                "No face tracking data received for a while. Is the headset streaming?"
            }
            WarningKey::UpdateFailed => "Failed to receive or decode face tracking data",
        }
    }
}

impl fmt::Display for WarningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Logger collaborator for the update loop.
pub trait WarningSink: Send + Sync {
    fn warn(&self, key: WarningKey, detail: Option<&(dyn Error + 'static)>);
}

/// Forwards warnings to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, key: WarningKey, detail: Option<&(dyn Error + 'static)>) {
        match detail {
            Some(err) => tracing::warn!(key = key.key(), error = %err, "{}", key.message()),
            None => tracing::warn!(key = key.key(), "{}", key.message()),
        }
    }
}

/// Install the global `tracing` subscriber, honoring `RUST_LOG`.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A subscriber may already be installed (tests, embedding hosts).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_stable() {
        assert_eq!(WarningKey::UpdateTimeout.key(), "update-timeout");
        assert_eq!(WarningKey::UpdateFailed.key(), "update-failed");
    }

    #[test]
    fn test_display_uses_message() {
        assert!(WarningKey::UpdateFailed.to_string().contains("decode"));
    }

    #[test]
    fn test_tracing_sink_accepts_detail() {
        let err = std::io::Error::other("boom");
        TracingSink.warn(WarningKey::UpdateFailed, Some(&err));
        TracingSink.warn(WarningKey::UpdateTimeout, None);
    }
}
