//! Terminal rendition of job progress.

use std::sync::Mutex;

use faceswap_core::artifact::{ArtifactKind, ResolvedArtifact};
use faceswap_pipeline::display::JobDisplay;

/// Prints progress lines to stdout and keeps the artifact for download.
#[derive(Default)]
pub struct ConsoleDisplay {
    artifact: Mutex<Option<ResolvedArtifact>>,
}

impl ConsoleDisplay {
    /// The artifact of the last completed job, if any.
    pub fn artifact(&self) -> Option<ResolvedArtifact> {
        self.artifact.lock().ok().and_then(|a| a.clone())
    }
}

impl JobDisplay for ConsoleDisplay {
    fn on_busy_changed(&self, busy: bool) {
        tracing::debug!(busy, "Busy indicator changed");
    }

    fn on_status_message(&self, message: &str) {
        println!("{message}");
    }

    fn on_job_failed(&self, message: &str) {
        eprintln!("Error: {message}");
    }

    fn on_artifact_ready(&self, artifact: &ResolvedArtifact) {
        let label = match artifact.kind {
            ArtifactKind::Image => "Image",
            ArtifactKind::Video => "Video",
        };
        println!("{label} ready: {}", artifact.url);
        if let Ok(mut slot) = self.artifact.lock() {
            *slot = Some(artifact.clone());
        }
    }

    fn on_channel_lost(&self) {
        eprintln!("Lost connection to the notification relay");
    }
}
