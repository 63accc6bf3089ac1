use crate::integration::{TurnEvent, TurnJob};
use crossbeam_channel::{bounded, Receiver, Sender};

/// The worker accepts one queued turn at a time; anything beyond that is rejected.
pub const JOB_QUEUE_CAPACITY: usize = 1;

pub struct TurnChannels {
    pub job_tx: Sender<TurnJob>,
    pub job_rx: Receiver<TurnJob>,
    pub event_tx: Sender<TurnEvent>,
    pub event_rx: Receiver<TurnEvent>,
}

impl TurnChannels {
    pub fn new(event_buffer: usize) -> Self {
        let (job_tx, job_rx) = bounded(JOB_QUEUE_CAPACITY);
        let (event_tx, event_rx) = bounded(event_buffer);

        Self {
            job_tx,
            job_rx,
            event_tx,
            event_rx,
        }
    }
}

impl Default for TurnChannels {
    fn default() -> Self {
        Self::new(64)
    }
}
