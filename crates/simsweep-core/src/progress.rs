//! Scan progress as reported by the backend.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::group::DuplicateGroup;

/// Which screen the backend says the client should be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Display)]
pub enum Screen {
    /// Choose directories and start a scan.
    #[default]
    Settings,
    /// A scan is running.
    Progress,
    /// Duplicate groups are ready.
    Results,
}

impl Screen {
    /// Map the backend's page route onto a screen.
    ///
    /// Unknown routes fall back to the settings screen.
    pub fn from_route(route: &str) -> Self {
        match route.trim_end_matches('/') {
            "/progress" | "progress" => Self::Progress,
            "/results" | "results" => Self::Results,
            _ => Self::Settings,
        }
    }

    /// The backend route for this screen.
    pub fn route(self) -> &'static str {
        match self {
            Self::Settings => "/settings",
            Self::Progress => "/progress",
            Self::Results => "/results",
        }
    }
}

/// Progress of one scan step: a percentage, or unknown while counting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepProgress {
    Percent(f64),
    Unknown(String),
}

impl StepProgress {
    /// Percentage clamped to 0..=100, if known.
    pub fn percent(&self) -> Option<f64> {
        match self {
            Self::Percent(value) => Some(value.clamp(0.0, 100.0)),
            Self::Unknown(_) => None,
        }
    }
}

impl Default for StepProgress {
    fn default() -> Self {
        Self::Percent(0.0)
    }
}

/// One step of a running scan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressStep {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub progress: StepProgress,
    #[serde(default)]
    pub status: String,
}

/// Snapshot returned by the progress endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSnapshot {
    /// Server time of the snapshot, as text.
    pub time: String,
    /// Overall progress in percent.
    pub progress: f64,
    /// Route of the page the client should show.
    pub page: String,
    pub status: String,
    pub message: String,
    pub steps: Vec<ProgressStep>,
    /// Groups with at least one duplicate, filled once the scan completes.
    pub group_list: Vec<DuplicateGroup>,
}

impl ProgressSnapshot {
    /// Screen the backend asks for.
    pub fn screen(&self) -> Screen {
        Screen::from_route(&self.page)
    }

    /// Overall progress as a ratio in 0..=1.
    pub fn ratio(&self) -> f64 {
        (self.progress / 100.0).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_from_route() {
        assert_eq!(Screen::from_route("/progress"), Screen::Progress);
        assert_eq!(Screen::from_route("/results/"), Screen::Results);
        assert_eq!(Screen::from_route("/settings"), Screen::Settings);
        assert_eq!(Screen::from_route(""), Screen::Settings);
        assert_eq!(Screen::from_route("/elsewhere"), Screen::Settings);
    }

    #[test]
    fn test_step_progress_percent() {
        assert_eq!(StepProgress::Percent(42.5).percent(), Some(42.5));
        assert_eq!(StepProgress::Percent(140.0).percent(), Some(100.0));
        assert_eq!(StepProgress::Unknown("?".into()).percent(), None);
    }

    #[test]
    fn test_ratio_clamped() {
        let snapshot = ProgressSnapshot {
            progress: 50.0,
            ..Default::default()
        };
        assert!((snapshot.ratio() - 0.5).abs() < f64::EPSILON);
    }
}
