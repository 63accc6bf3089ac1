//! Turn lifecycle on the presentation thread
//!
//! The controller owns the [`ProcessingFlag`] and the sending side of the
//! single-slot job queue. User actions start at most one turn at a time;
//! worker events are applied to the [`Presenter`] from [`TurnController::poll`],
//! which the presentation loop calls every frame. Nothing here blocks on the
//! network, the microphone or the speech command.

use crate::integration::client::InferenceClient;
use crate::integration::flag::ProcessingFlag;
use crate::integration::presenter::Presenter;
use crate::integration::turn::{Turn, TurnId, TurnOutcome};
use crate::integration::worker::{TurnEvent, TurnJob, TurnWorker};
use crate::messages::{Status, TranscriptEntry};
use crate::utils::channels::TurnChannels;
use crate::{MurmurError, Result};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Default time "Cancelled" stays visible before the status returns to "Ready"
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(1500);

pub struct TurnController<P: Presenter> {
    client: InferenceClient,
    presenter: P,
    flag: ProcessingFlag,
    last_turn: TurnId,
    jobs: Sender<TurnJob>,
    events: Receiver<TurnEvent>,
    idle_deadline: Option<Instant>,
    idle_delay: Duration,
    worker: JoinHandle<()>,
}

impl<P: Presenter> TurnController<P> {
    /// Start the worker thread and put the presenter in its idle state
    pub fn new(client: InferenceClient, mut presenter: P) -> Result<Self> {
        let TurnChannels {
            job_tx,
            job_rx,
            event_tx,
            event_rx,
        } = TurnChannels::default();

        let flag = ProcessingFlag::new();
        let worker = TurnWorker::new(client.clone(), flag.clone(), event_tx).spawn(job_rx)?;

        presenter.set_status(Status::Idle);
        presenter.set_inputs_enabled(true);

        Ok(Self {
            client,
            presenter,
            flag,
            last_turn: TurnId(0),
            jobs: job_tx,
            events: event_rx,
            idle_deadline: None,
            idle_delay: DEFAULT_IDLE_DELAY,
            worker,
        })
    }

    /// Set how long "Cancelled" stays on the status line
    pub fn with_idle_delay(mut self, delay: Duration) -> Self {
        self.idle_delay = delay;
        self
    }

    /// Start a text turn
    ///
    /// Returns `None` without touching the transcript when the text is blank
    /// or a turn is already in flight.
    pub fn submit_text(&mut self, text: &str) -> Option<TurnId> {
        let prompt = text.trim();
        if prompt.is_empty() {
            debug!("Ignoring empty prompt");
            return None;
        }
        if !self.can_start() {
            return None;
        }

        let id = self.next_turn_id();
        let turn = Turn::text(id, prompt, self.presenter.language());

        self.presenter.append_transcript(TranscriptEntry::user(prompt));
        self.begin_turn(id, Status::Inferring);
        self.dispatch(turn)
    }

    /// Start a voice turn in the presenter's current language
    pub fn submit_voice(&mut self) -> Option<TurnId> {
        if !self.can_start() {
            return None;
        }

        let id = self.next_turn_id();
        let turn = Turn::voice(id, self.presenter.language());

        self.begin_turn(id, Status::Listening);
        self.dispatch(turn)
    }

    /// Stop the active turn, if any
    ///
    /// Blocked calls run to completion on the worker; their results are
    /// discarded. Speech in progress is interrupted.
    pub fn cancel(&mut self) {
        match self.flag.clear() {
            Some(turn) => info!("Cancelled turn {}", turn),
            None => debug!("Cancel with no active turn"),
        }

        self.client.interrupt_speech();
        self.presenter.set_status(Status::Cancelled);
        self.presenter.set_inputs_enabled(true);
        self.idle_deadline = Some(Instant::now() + self.idle_delay);
    }

    /// Apply pending worker events and the deferred idle status
    ///
    /// Returns the number of events applied to the presenter.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            if self.apply(event) {
                applied += 1;
            }
        }
        self.fire_idle_deadline();
        applied
    }

    /// Block until `turn` retires, applying events as they arrive
    ///
    /// Returns `None` if the turn did not retire within `timeout`.
    pub fn wait_for_retirement(
        &mut self,
        turn: TurnId,
        timeout: Duration,
    ) -> Option<TurnOutcome> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let event = self.events.recv_timeout(remaining).ok()?;

            let retired = match event {
                TurnEvent::Retired { turn: t, outcome } if t == turn => Some(outcome),
                _ => None,
            };
            self.apply(event);

            if retired.is_some() {
                self.fire_idle_deadline();
                return retired;
            }
        }
    }

    pub fn is_processing(&self) -> bool {
        self.flag.is_set()
    }

    pub fn active_turn(&self) -> Option<TurnId> {
        self.flag.active()
    }

    /// Whether the deferred idle status is still pending
    pub fn idle_pending(&self) -> bool {
        self.idle_deadline.is_some()
    }

    pub fn is_worker_running(&self) -> bool {
        !self.worker.is_finished()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    fn can_start(&self) -> bool {
        if let Some(active) = self.flag.active() {
            debug!("Turn {} in flight, ignoring request", active);
            return false;
        }
        if self.jobs.is_full() {
            warn!("Worker still finishing a cancelled turn, ignoring request");
            return false;
        }
        true
    }

    fn next_turn_id(&mut self) -> TurnId {
        self.last_turn = self.last_turn.next();
        self.last_turn
    }

    fn begin_turn(&mut self, turn: TurnId, status: Status) {
        self.flag.set(turn);
        if self.idle_deadline.take().is_some() {
            debug!("Dropped pending idle status for turn {}", turn);
        }
        self.presenter.set_inputs_enabled(false);
        self.presenter.set_status(status);
    }

    fn dispatch(&mut self, turn: Turn) -> Option<TurnId> {
        let id = turn.id;
        info!("Starting turn {} ({:?})", id, turn.input_mode);

        match self.jobs.try_send(TurnJob { turn }) {
            Ok(()) => Some(id),
            Err(e) => {
                let err = match e {
                    TrySendError::Full(_) => MurmurError::ChannelError("job queue full".into()),
                    TrySendError::Disconnected(_) => {
                        MurmurError::ChannelError("turn worker stopped".into())
                    }
                };
                error!("Could not start turn {}: {}", id, err);

                self.flag.clear_if(id);
                let entry = TranscriptEntry::error(format!("Error: {}", err.user_message()));
                self.presenter.append_transcript(entry);
                self.presenter.set_inputs_enabled(true);
                self.presenter.set_status(Status::Idle);
                None
            }
        }
    }

    /// Returns false for events of turns that are no longer active
    fn apply(&mut self, event: TurnEvent) -> bool {
        let turn = event.turn();
        if !self.flag.is_active(turn) {
            match event {
                TurnEvent::Retired { outcome, .. } => {
                    debug!("Turn {} retired after cancel ({:?})", turn, outcome)
                }
                _ => warn!("Discarding stale event for turn {}", turn),
            }
            return false;
        }

        match event {
            TurnEvent::Transcript { entry, .. } => self.presenter.append_transcript(entry),
            TurnEvent::Status { status, .. } => self.presenter.set_status(status),
            TurnEvent::Retired { outcome, .. } => {
                self.flag.clear_if(turn);
                self.presenter.set_inputs_enabled(true);
                self.presenter.set_status(Status::Idle);
                debug!("Turn {} retired ({:?})", turn, outcome);
            }
        }
        true
    }

    fn fire_idle_deadline(&mut self) {
        if let Some(deadline) = self.idle_deadline {
            if Instant::now() >= deadline {
                self.idle_deadline = None;
                self.presenter.set_status(Status::Idle);
            }
        }
    }
}

impl<P: Presenter> Drop for TurnController<P> {
    fn drop(&mut self) {
        // The worker exits once the job sender is gone; a blocked call is left
        // to finish on its own.
        self.flag.clear();
        self.client.interrupt_speech();
    }
}
