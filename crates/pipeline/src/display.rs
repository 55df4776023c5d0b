//! Display collaborator driven by the job controller.
//!
//! The controller only ever calls into this trait; it never reads UI
//! state back.

use faceswap_core::artifact::ResolvedArtifact;

pub trait JobDisplay: Send + Sync {
    /// The busy indicator turned on or off.
    fn on_busy_changed(&self, busy: bool);

    /// New status text for the active job.
    fn on_status_message(&self, message: &str);

    /// The job ended in failure; `message` is user-facing.
    fn on_job_failed(&self, message: &str);

    /// The job produced an artifact.
    fn on_artifact_ready(&self, artifact: &ResolvedArtifact);

    /// The notification channel gave up reconnecting. Status updates will
    /// no longer arrive.
    fn on_channel_lost(&self) {}
}
