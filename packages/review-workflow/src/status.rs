//! Server status as shown next to the configuration step.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ServerStatus {
    #[default]
    PendingConfiguration,
    Configuring,
    CheckingHeartbeat,
    Online,
    ConfigurationFailed,
    /// Heartbeat request itself failed.
    Offline,
    /// Heartbeat answered, but not with a success status.
    Reported(String),
}

/// Coarse health classification for colouring the status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Healthy,
    Unhealthy,
    Pending,
}

impl ServerStatus {
    /// Status for a non-success heartbeat answer.
    pub fn reported(status: &str) -> Self {
        if status.trim().is_empty() {
            ServerStatus::Reported("Heartbeat Failed".to_string())
        } else {
            ServerStatus::Reported(status.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ServerStatus::PendingConfiguration => "Pending Configuration",
            ServerStatus::Configuring => "Configuring...",
            ServerStatus::CheckingHeartbeat => "Checking Heartbeat...",
            ServerStatus::Online => "Online",
            ServerStatus::ConfigurationFailed => "Configuration Failed",
            ServerStatus::Offline => "Offline (Heartbeat Failed)",
            ServerStatus::Reported(status) => status,
        }
    }

    pub fn tone(&self) -> StatusTone {
        let label = self.label();
        if *self == ServerStatus::Online {
            StatusTone::Healthy
        } else if label.contains("Failed") || label == "Offline" || label.contains("Error") {
            StatusTone::Unhealthy
        } else {
            StatusTone::Pending
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(ServerStatus::default().to_string(), "Pending Configuration");
        assert_eq!(ServerStatus::Offline.to_string(), "Offline (Heartbeat Failed)");
        assert_eq!(ServerStatus::reported("").to_string(), "Heartbeat Failed");
        assert_eq!(ServerStatus::reported("degraded").to_string(), "degraded");
    }

    #[test]
    fn test_tones() {
        assert_eq!(ServerStatus::Online.tone(), StatusTone::Healthy);
        assert_eq!(ServerStatus::ConfigurationFailed.tone(), StatusTone::Unhealthy);
        assert_eq!(ServerStatus::Offline.tone(), StatusTone::Unhealthy);
        assert_eq!(ServerStatus::reported("Model Error").tone(), StatusTone::Unhealthy);
        assert_eq!(ServerStatus::Configuring.tone(), StatusTone::Pending);
        // Matching is case-sensitive.
        assert_eq!(ServerStatus::reported("heartbeat failed").tone(), StatusTone::Pending);
    }
}
