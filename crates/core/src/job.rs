//! Lifecycle state of the single in-flight swap job.

use std::fmt;

/// Which swap endpoint a job targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Image,
    Video,
}

impl JobKind {
    pub fn starting_message(self) -> &'static str {
        match self {
            Self::Image => "Starting process...",
            Self::Video => "Starting video process...",
        }
    }

    pub fn submitted_message(self) -> &'static str {
        match self {
            Self::Image => "Request sent, waiting for processing...",
            Self::Video => "Video request sent, waiting for processing...",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    DetectingFaces,
    Submitting,
    AwaitingResult,
    Completed,
    Failed,
}

impl JobState {
    /// The busy indicator is on for every non-resting state.
    pub fn is_busy(self) -> bool {
        !self.is_resting()
    }

    /// `true` when a new job may be started.
    pub fn is_resting(self) -> bool {
        matches!(self, Self::Idle | Self::Completed | Self::Failed)
    }

    /// `true` once a swap has been (or is being) submitted, i.e. when push
    /// notifications may refer to this job.
    pub fn accepts_notifications(self) -> bool {
        matches!(self, Self::Submitting | Self::AwaitingResult)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::DetectingFaces => "detecting_faces",
            Self::Submitting => "submitting",
            Self::AwaitingResult => "awaiting_result",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_only_while_job_in_flight() {
        assert!(!JobState::Idle.is_busy());
        assert!(JobState::DetectingFaces.is_busy());
        assert!(JobState::Submitting.is_busy());
        assert!(JobState::AwaitingResult.is_busy());
        assert!(!JobState::Completed.is_busy());
        assert!(!JobState::Failed.is_busy());
    }

    #[test]
    fn notifications_only_after_submission_starts() {
        assert!(!JobState::DetectingFaces.accepts_notifications());
        assert!(JobState::Submitting.accepts_notifications());
        assert!(JobState::AwaitingResult.accepts_notifications());
        assert!(!JobState::Completed.accepts_notifications());
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(JobState::AwaitingResult.to_string(), "awaiting_result");
    }
}
