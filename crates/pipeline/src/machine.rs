//! Pure transition logic for the single swap job.
//!
//! [`JobMachine`] owns the [`JobState`] and is mutated only through
//! [`JobMachine::start`] and [`JobMachine::apply`]. Asynchronous work
//! reports back as [`Intent`]s tagged with the generation of the job
//! that produced them; intents from an older generation are discarded.
//! Every call returns the [`Effect`]s the controller must carry out.

use faceswap_core::artifact::{classify, ResolvedArtifact};
use faceswap_core::job::{JobKind, JobState};
use faceswap_core::status::StatusEvent;
use faceswap_core::types::SwapJobRequest;

use crate::error::StartError;

/// Monotonic job counter used to recognise stale results.
pub type Generation = u64;

/// Message shown when the push channel dies while a job is waiting on it.
pub const CHANNEL_LOST_MESSAGE: &str =
    "Lost connection to the notification service; the job result cannot be received";

/// Something that happened, reported to the machine.
#[derive(Debug, Clone)]
pub enum Intent {
    /// Both detections found faces; the request is ready to submit.
    DetectionsReady {
        generation: Generation,
        request: Box<SwapJobRequest>,
    },
    /// Detection failed or found no face.
    DetectionFailed {
        generation: Generation,
        message: String,
    },
    /// The service acknowledged the submission.
    Acknowledged { generation: Generation },
    /// The submission call failed.
    SubmissionFailed {
        generation: Generation,
        message: String,
    },
    /// A push notification arrived.
    Notification(StatusEvent),
    /// The push channel gave up reconnecting.
    ChannelLost,
}

/// Something the controller must do as a result of a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    BusyChanged(bool),
    StatusMessage(String),
    JobFailed(String),
    ArtifactReady(ResolvedArtifact),
    ChannelLost,
    /// Send the swap request to the service.
    Submit {
        generation: Generation,
        request: Box<SwapJobRequest>,
    },
}

#[derive(Debug, Default)]
pub struct JobMachine {
    state: JobState,
    generation: Generation,
    kind: Option<JobKind>,
    busy: bool,
    /// Set once the push channel has given up; it never comes back.
    channel_lost: bool,
}

impl JobMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Generation of the current (or most recent) job.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn kind(&self) -> Option<JobKind> {
        self.kind
    }

    /// `true` once the push channel has been reported lost.
    pub fn is_channel_lost(&self) -> bool {
        self.channel_lost
    }

    /// Begin a new job. Rejected while another job is in flight, and once
    /// the push channel is lost since no result could be delivered.
    pub fn start(&mut self, kind: JobKind) -> Result<(Generation, Vec<Effect>), StartError> {
        if !self.state.is_resting() {
            return Err(StartError::JobInProgress(self.state));
        }
        if self.channel_lost {
            return Err(StartError::ChannelLost);
        }

        self.generation += 1;
        self.kind = Some(kind);

        let mut effects = Vec::new();
        self.transition(JobState::DetectingFaces, &mut effects);
        effects.push(Effect::StatusMessage(kind.starting_message().to_string()));

        tracing::info!(generation = self.generation, ?kind, "Swap job started");
        Ok((self.generation, effects))
    }

    /// Apply an intent and return the resulting effects.
    pub fn apply(&mut self, intent: Intent) -> Vec<Effect> {
        let mut effects = Vec::new();

        match intent {
            Intent::DetectionsReady {
                generation,
                request,
            } => {
                if self.is_current(generation, JobState::DetectingFaces) {
                    self.transition(JobState::Submitting, &mut effects);
                    effects.push(Effect::Submit {
                        generation,
                        request,
                    });
                }
            }
            Intent::DetectionFailed {
                generation,
                message,
            } => {
                if self.is_current(generation, JobState::DetectingFaces) {
                    self.fail(message, &mut effects);
                }
            }
            Intent::Acknowledged { generation } => {
                if self.is_current(generation, JobState::Submitting) {
                    self.transition(JobState::AwaitingResult, &mut effects);
                    if let Some(kind) = self.kind {
                        effects.push(Effect::StatusMessage(kind.submitted_message().to_string()));
                    }
                }
            }
            Intent::SubmissionFailed {
                generation,
                message,
            } => {
                if self.is_current(generation, JobState::Submitting) {
                    self.fail(message, &mut effects);
                }
            }
            Intent::Notification(event) => self.on_notification(event, &mut effects),
            Intent::ChannelLost => {
                self.channel_lost = true;
                effects.push(Effect::ChannelLost);
                // Any job in flight would wait forever for its result.
                if self.state.is_busy() {
                    self.fail(CHANNEL_LOST_MESSAGE.to_string(), &mut effects);
                }
            }
        }

        effects
    }

    fn on_notification(&mut self, event: StatusEvent, effects: &mut Vec<Effect>) {
        if !self.state.accepts_notifications() {
            // No submitted job to attribute it to. Errors are still shown.
            if event.is_error() {
                effects.push(Effect::StatusMessage(event.message));
            } else {
                tracing::debug!(state = %self.state, status = ?event.status, "Ignoring notification");
            }
            return;
        }

        if event.is_error() {
            self.fail(event.message, effects);
        } else if event.is_terminal() {
            effects.push(Effect::StatusMessage(event.message));
            if let Some(url) = event.artifact_url.as_deref() {
                effects.push(Effect::ArtifactReady(classify(url)));
            }
            self.transition(JobState::Completed, effects);
        } else {
            let running = event.status.is_some_and(|s| s.is_running());
            effects.push(Effect::StatusMessage(event.message));
            // A running status before the ack means the service already
            // has the job; the ack that follows is redundant.
            if running && self.state == JobState::Submitting {
                self.transition(JobState::AwaitingResult, effects);
            }
        }
    }

    fn is_current(&self, generation: Generation, expected: JobState) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "Discarding result of a superseded job",
            );
            return false;
        }
        if self.state != expected {
            tracing::debug!(
                state = %self.state,
                expected = %expected,
                "Discarding late result for this job",
            );
            return false;
        }
        true
    }

    fn fail(&mut self, message: String, effects: &mut Vec<Effect>) {
        tracing::warn!(generation = self.generation, error = %message, "Swap job failed");
        effects.push(Effect::JobFailed(message));
        self.transition(JobState::Failed, effects);
    }

    fn transition(&mut self, next: JobState, effects: &mut Vec<Effect>) {
        tracing::debug!(from = %self.state, to = %next, "Job state transition");
        self.state = next;
        let busy = next.is_busy();
        if busy != self.busy {
            self.busy = busy;
            effects.push(Effect::BusyChanged(busy));
        }
    }
}
