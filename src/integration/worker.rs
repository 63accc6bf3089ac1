//! Background worker that runs one turn at a time
//!
//! The worker owns each [`Turn`] it receives. It reports progress to the
//! presentation thread through [`TurnEvent`]s and never touches display
//! state. Between blocking calls it checks whether its turn is still the
//! active one; once it is not, the worker stops publishing for that turn and
//! only reports the retirement.

use crate::integration::client::InferenceClient;
use crate::integration::flag::ProcessingFlag;
use crate::integration::turn::{InputMode, Turn, TurnId, TurnOutcome, TurnStatus};
use crate::messages::{Status, TranscriptEntry};
use crate::{MurmurError, Result};
use crossbeam_channel::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// A turn handed to the worker
#[derive(Debug, Clone)]
pub struct TurnJob {
    pub turn: Turn,
}

/// Progress reported by the worker, tagged with the turn it belongs to
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    Transcript { turn: TurnId, entry: TranscriptEntry },
    Status { turn: TurnId, status: Status },
    /// Always the last event of a turn, sent even after cancellation
    Retired { turn: TurnId, outcome: TurnOutcome },
}

impl TurnEvent {
    pub fn turn(&self) -> TurnId {
        match self {
            TurnEvent::Transcript { turn, .. }
            | TurnEvent::Status { turn, .. }
            | TurnEvent::Retired { turn, .. } => *turn,
        }
    }
}

pub struct TurnWorker {
    client: InferenceClient,
    flag: ProcessingFlag,
    events: Sender<TurnEvent>,
}

impl TurnWorker {
    pub fn new(client: InferenceClient, flag: ProcessingFlag, events: Sender<TurnEvent>) -> Self {
        Self {
            client,
            flag,
            events,
        }
    }

    /// Run the worker on its own thread until the job sender is dropped
    pub fn spawn(self, jobs: Receiver<TurnJob>) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("murmur-turn-worker".into())
            .spawn(move || self.run(jobs))
            .map_err(|e| MurmurError::ChannelError(format!("Failed to spawn worker: {}", e)))
    }

    fn run(self, jobs: Receiver<TurnJob>) {
        info!("Turn worker started");
        for job in jobs.iter() {
            self.process(job.turn);
        }
        info!("Turn worker stopped");
    }

    fn process(&self, mut turn: Turn) {
        let id = turn.id;
        debug!("Starting turn {} ({:?})", id, turn.input_mode);

        let outcome = if !self.checkpoint(&turn, "before starting") {
            TurnOutcome::Cancelled
        } else {
            match turn.input_mode {
                InputMode::Text => self.text_turn(&mut turn),
                InputMode::Voice => self.voice_turn(&mut turn),
            }
        };

        let outcome = turn.finish(outcome);
        info!("Turn {} {}", id, turn.status());

        if self
            .events
            .send(TurnEvent::Retired { turn: id, outcome })
            .is_err()
        {
            debug!("Presentation loop gone, turn {} retired silently", id);
        }
    }

    fn voice_turn(&self, turn: &mut Turn) -> TurnOutcome {
        turn.advance(TurnStatus::Transcribing);
        let heard = self.client.listen(&turn.language_code);

        if !self.checkpoint(turn, "after listening") {
            return TurnOutcome::Cancelled;
        }

        match heard {
            Ok(text) => {
                self.publish(TurnEvent::Transcript {
                    turn: turn.id,
                    entry: TranscriptEntry::user(text.as_str()),
                });
                self.publish(TurnEvent::Status {
                    turn: turn.id,
                    status: Status::Inferring,
                });
                turn.prompt_text = Some(text);
                self.text_turn(turn)
            }
            Err(e) => {
                self.report(turn, &e);
                TurnOutcome::Failed
            }
        }
    }

    fn text_turn(&self, turn: &mut Turn) -> TurnOutcome {
        turn.advance(TurnStatus::Inferring);
        let prompt = turn.prompt_text.clone().unwrap_or_default();
        let reply = self.client.generate_response(&prompt);

        if !self.checkpoint(turn, "after inference") {
            return TurnOutcome::Cancelled;
        }

        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                self.report(turn, &e);
                return TurnOutcome::Failed;
            }
        };

        self.publish(TurnEvent::Transcript {
            turn: turn.id,
            entry: TranscriptEntry::bot(reply.as_str()),
        });
        turn.reply_text = Some(reply);

        // Read before the checkpoint so a cancel in between still silences speech.
        let since = self.client.speech_interruptions();
        if !self.checkpoint(turn, "before speaking") {
            return TurnOutcome::Cancelled;
        }

        turn.advance(TurnStatus::Speaking);
        self.publish(TurnEvent::Status {
            turn: turn.id,
            status: Status::Speaking,
        });

        let reply = turn.reply_text.as_deref().unwrap_or_default();
        if let Err(e) = self.client.speak_since(since, reply, &turn.language_code, true) {
            // The reply is already on screen; a failed utterance does not fail the turn.
            if self.flag.is_active(turn.id) {
                self.report(turn, &e);
            } else {
                debug!("Speech for turn {} ended after cancel: {}", turn.id, e);
            }
        }

        if !self.checkpoint(turn, "before retiring") {
            return TurnOutcome::Cancelled;
        }
        TurnOutcome::Done
    }

    fn checkpoint(&self, turn: &Turn, phase: &str) -> bool {
        let active = self.flag.is_active(turn.id);
        if !active {
            debug!("Turn {} no longer active {}", turn.id, phase);
        }
        active
    }

    fn report(&self, turn: &Turn, err: &MurmurError) {
        error!("Turn {} failed: {}", turn.id, err);
        self.publish(TurnEvent::Transcript {
            turn: turn.id,
            entry: TranscriptEntry::error(format!("Error: {}", err.user_message())),
        });
    }

    fn publish(&self, event: TurnEvent) {
        if !self.flag.is_active(event.turn()) {
            debug!("Suppressing event for inactive turn {}", event.turn());
            return;
        }
        if self.events.send(event).is_err() {
            warn!("Presentation loop gone, dropping event");
        }
    }
}
