//! Actor that owns the job state and sequences a swap job.
//!
//! [`JobController::spawn`] starts a single task that is the only writer
//! of [`JobState`]. Everything else talks to it through messages:
//!
//! * callers send start commands through the [`JobController`] handle;
//! * detection and submission run in spawned tasks that report back as
//!   generation-tagged [`Intent`]s;
//! * push-channel events are read from the supplied stream and turned
//!   into intents.
//!
//! Effects returned by the [`JobMachine`] are carried out on the
//! [`JobDisplay`] or by spawning the next stage.

use std::sync::Arc;
use std::time::Duration;

use faceswap_client::events::ChannelEvent;
use faceswap_client::service::SwapService;
use faceswap_core::job::JobState;
use faceswap_core::types::SwapJobRequest;
use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};

use crate::display::JobDisplay;
use crate::error::StartError;
use crate::machine::{Effect, Generation, Intent, JobMachine};
use crate::stage::{prepare_request, JobInput};

/// Capacity of the command queue between handles and the actor.
const COMMAND_CHANNEL_CAPACITY: usize = 16;

/// How long [`JobController::shutdown`] waits for the actor to exit.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the job controller task.
pub struct JobController {
    commands: mpsc::Sender<Command>,
    state_rx: watch::Receiver<JobState>,
    task_handle: tokio::task::JoinHandle<()>,
}

enum Command {
    Start {
        input: JobInput,
        reply: oneshot::Sender<Result<Generation, StartError>>,
    },
}

impl JobController {
    /// Spawn the controller.
    ///
    /// * `service`          - detection and submission calls.
    /// * `display`          - UI collaborator receiving progress.
    /// * `events`           - push-channel events for the active job.
    /// * `callback_address` - webhook URL passed with every submission.
    pub fn spawn<E>(
        service: Arc<dyn SwapService>,
        display: Arc<dyn JobDisplay>,
        events: E,
        callback_address: String,
    ) -> Self
    where
        E: Stream<Item = ChannelEvent> + Send + 'static,
    {
        let (commands, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(JobState::Idle);
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();

        let actor = Actor {
            machine: JobMachine::new(),
            service,
            display,
            intent_tx,
            state_tx,
            callback_address,
        };
        let task_handle = tokio::spawn(actor.run(command_rx, intent_rx, Box::pin(events)));

        Self {
            commands,
            state_rx,
            task_handle,
        }
    }

    /// Start a new swap job.
    ///
    /// Rejected with [`StartError::JobInProgress`] while a job is in
    /// flight and with [`StartError::ChannelLost`] once the push channel
    /// has given up; no detection call is made in either case.
    pub async fn start(&self, input: JobInput) -> Result<Generation, StartError> {
        let (reply, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::Start { input, reply })
            .await
            .map_err(|_| StartError::ControllerStopped)?;
        reply_rx.await.map_err(|_| StartError::ControllerStopped)?
    }

    /// Current job state.
    pub fn state(&self) -> JobState {
        *self.state_rx.borrow()
    }

    /// Watch job state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<JobState> {
        self.state_rx.clone()
    }

    /// Wait until no job is in flight and return the resting state.
    pub async fn wait_until_resting(&self) -> JobState {
        let mut rx = self.state_rx.clone();
        let waited = rx.wait_for(|s| s.is_resting()).await.map(|state| *state);
        match waited {
            Ok(state) => state,
            Err(_) => *rx.borrow(),
        }
    }

    /// Stop the controller. In-flight calls finish but their results are
    /// dropped.
    pub async fn shutdown(self) {
        let Self {
            commands,
            task_handle,
            ..
        } = self;
        drop(commands);
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, task_handle).await.is_err() {
            tracing::warn!("Job controller did not stop in time");
        }
    }
}

/// State owned by the controller task.
struct Actor {
    machine: JobMachine,
    service: Arc<dyn SwapService>,
    display: Arc<dyn JobDisplay>,
    intent_tx: mpsc::UnboundedSender<Intent>,
    state_tx: watch::Sender<JobState>,
    callback_address: String,
}

impl Actor {
    async fn run<E>(
        mut self,
        mut command_rx: mpsc::Receiver<Command>,
        mut intent_rx: mpsc::UnboundedReceiver<Intent>,
        mut events: std::pin::Pin<Box<E>>,
    ) where
        E: Stream<Item = ChannelEvent> + Send,
    {
        let mut events_open = true;

        loop {
            tokio::select! {
                command = command_rx.recv() => match command {
                    Some(Command::Start { input, reply }) => {
                        let result = self.start(input);
                        let _ = reply.send(result);
                    }
                    None => break,
                },
                Some(intent) = intent_rx.recv() => self.apply(intent),
                event = events.next(), if events_open => match event {
                    Some(event) => self.on_channel_event(event),
                    None => {
                        tracing::debug!("Channel event stream ended");
                        events_open = false;
                    }
                },
            }
        }

        tracing::info!(state = %self.machine.state(), "Job controller stopped");
    }

    fn start(&mut self, input: JobInput) -> Result<Generation, StartError> {
        input.validate()?;
        let (generation, effects) = self.machine.start(input.kind())?;
        self.perform(effects);

        let service = Arc::clone(&self.service);
        let intent_tx = self.intent_tx.clone();
        let callback_address = self.callback_address.clone();
        tokio::spawn(async move {
            let intent = match prepare_request(service.as_ref(), &input, &callback_address).await {
                Ok(request) => Intent::DetectionsReady {
                    generation,
                    request: Box::new(request),
                },
                Err(e) => Intent::DetectionFailed {
                    generation,
                    message: e.to_string(),
                },
            };
            let _ = intent_tx.send(intent);
        });

        Ok(generation)
    }

    fn on_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Status(status) => self.apply(Intent::Notification(status)),
            ChannelEvent::Lost { attempts } => {
                tracing::error!(attempts, "Notification channel lost");
                self.apply(Intent::ChannelLost);
            }
            ChannelEvent::Connected => tracing::info!("Notification channel connected"),
            ChannelEvent::Disconnected => tracing::warn!("Notification channel disconnected"),
        }
    }

    fn apply(&mut self, intent: Intent) {
        let effects = self.machine.apply(intent);
        self.perform(effects);
    }

    fn perform(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::BusyChanged(busy) => self.display.on_busy_changed(busy),
                Effect::StatusMessage(message) => self.display.on_status_message(&message),
                Effect::JobFailed(message) => self.display.on_job_failed(&message),
                Effect::ArtifactReady(artifact) => {
                    tracing::info!(kind = ?artifact.kind, url = %artifact.url, "Artifact ready");
                    self.display.on_artifact_ready(&artifact);
                }
                Effect::ChannelLost => self.display.on_channel_lost(),
                Effect::Submit {
                    generation,
                    request,
                } => self.spawn_submission(generation, *request),
            }
        }
        self.state_tx.send_replace(self.machine.state());
    }

    fn spawn_submission(&self, generation: Generation, request: SwapJobRequest) {
        let service = Arc::clone(&self.service);
        let intent_tx = self.intent_tx.clone();
        tokio::spawn(async move {
            let result = if request.is_video() {
                service.submit_video_swap(request).await
            } else {
                service.submit_image_swap(request).await
            };
            let intent = match result {
                Ok(ack) => {
                    tracing::debug!(generation, job_id = ?ack.job_id, "Submission acknowledged");
                    Intent::Acknowledged { generation }
                }
                Err(e) => Intent::SubmissionFailed {
                    generation,
                    message: e.to_string(),
                },
            };
            let _ = intent_tx.send(intent);
        });
    }
}
