//! Turn lifecycle tests driving the controller with stub backends
//!
//! The chat view stands in for the window, so every assertion is on the
//! transcript and status the user would see.

use crossbeam_channel::{unbounded, Receiver, Sender};
use murmur::integration::{InferenceClient, TurnController, TurnOutcome};
use murmur::llm::ResponseGenerator;
use murmur::messages::{Speaker, Status};
use murmur::speech::{SpeechRecognizer, SpeechSynthesizer};
use murmur::ui::ChatView;
use murmur::{MurmurError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(5);

struct StubGenerator {
    reply: Result<String>,
    gate: Option<Receiver<()>>,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            gate: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn failing(err: MurmurError) -> Self {
        Self {
            reply: Err(err),
            gate: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Blocks each call until the returned sender fires
    fn gated(reply: &str) -> (Self, Sender<()>) {
        let (tx, rx) = unbounded();
        let generator = Self {
            gate: Some(rx),
            ..Self::replying(reply)
        };
        (generator, tx)
    }

    fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

impl ResponseGenerator for StubGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if let Some(gate) = &self.gate {
            let _ = gate.recv_timeout(WAIT);
        }
        self.reply.clone()
    }
}

struct StubRecognizer {
    reply: Result<String>,
    gate: Option<Receiver<()>>,
    locales: Mutex<Vec<String>>,
}

impl StubRecognizer {
    fn hearing(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            gate: None,
            locales: Mutex::new(Vec::new()),
        }
    }

    fn failing(err: MurmurError) -> Self {
        Self {
            reply: Err(err),
            ..Self::hearing("unused")
        }
    }

    /// Blocks each call until the returned sender fires
    fn gated(text: &str) -> (Self, Sender<()>) {
        let (tx, rx) = unbounded();
        let recognizer = Self {
            gate: Some(rx),
            ..Self::hearing(text)
        };
        (recognizer, tx)
    }

    fn calls(&self) -> usize {
        self.locales.lock().len()
    }
}

impl SpeechRecognizer for StubRecognizer {
    fn recognize(&self, locale: &str) -> Result<String> {
        self.locales.lock().push(locale.to_string());
        if let Some(gate) = &self.gate {
            let _ = gate.recv_timeout(WAIT);
        }
        self.reply.clone()
    }
}

struct StubSynth {
    result: Result<()>,
    /// When set, each utterance lasts until interrupted
    hold: Option<(Sender<()>, Receiver<()>)>,
    spoken: Mutex<Vec<(String, u32, String)>>,
    interrupts: AtomicUsize,
}

impl StubSynth {
    fn ok() -> Self {
        Self {
            result: Ok(()),
            hold: None,
            spoken: Mutex::new(Vec::new()),
            interrupts: AtomicUsize::new(0),
        }
    }

    fn failing(err: MurmurError) -> Self {
        Self {
            result: Err(err),
            ..Self::ok()
        }
    }

    fn until_interrupted() -> Self {
        Self {
            hold: Some(unbounded()),
            ..Self::ok()
        }
    }

    fn spoken(&self) -> Vec<(String, u32, String)> {
        self.spoken.lock().clone()
    }
}

impl SpeechSynthesizer for StubSynth {
    fn say(&self, voice: &str, rate: u32, text: &str) -> Result<()> {
        self.spoken
            .lock()
            .push((voice.to_string(), rate, text.to_string()));
        if let Some((_, released)) = &self.hold {
            let _ = released.recv_timeout(WAIT);
        }
        self.result.clone()
    }

    fn interrupt(&self) {
        self.interrupts.fetch_add(1, Ordering::SeqCst);
        if let Some((release, _)) = &self.hold {
            let _ = release.send(());
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

struct Harness {
    generator: Arc<StubGenerator>,
    recognizer: Arc<StubRecognizer>,
    synth: Arc<StubSynth>,
    controller: TurnController<ChatView>,
}

impl Harness {
    fn new(generator: StubGenerator, recognizer: StubRecognizer, synth: StubSynth) -> Self {
        let generator = Arc::new(generator);
        let recognizer = Arc::new(recognizer);
        let synth = Arc::new(synth);

        let client = InferenceClient::new(generator.clone(), recognizer.clone(), synth.clone());
        let controller = TurnController::new(client, ChatView::default()).unwrap();

        Self {
            generator,
            recognizer,
            synth,
            controller,
        }
    }

    fn replying(reply: &str) -> Self {
        Self::new(
            StubGenerator::replying(reply),
            StubRecognizer::hearing("unused"),
            StubSynth::ok(),
        )
    }

    fn view(&self) -> &ChatView {
        self.controller.presenter()
    }

    fn entries(&self) -> Vec<(Speaker, String)> {
        self.view()
            .entries()
            .into_iter()
            .map(|(speaker, text)| (speaker, text.to_string()))
            .collect()
    }

    fn poll_until_status(&mut self, status: Status) {
        let deadline = Instant::now() + WAIT;
        while self.view().status != status {
            assert!(Instant::now() < deadline, "status never became {:?}", status);
            self.controller.poll();
            thread::sleep(Duration::from_millis(5));
        }
    }
}

fn entry(speaker: Speaker, text: &str) -> (Speaker, String) {
    (speaker, text.to_string())
}

#[test]
fn test_text_turn_appends_reply() {
    let mut h = Harness::replying("Hi there");

    let turn = h.controller.submit_text("Hello").unwrap();
    assert!(h.controller.is_processing());
    assert!(!h.view().inputs_enabled);

    assert_eq!(h.controller.wait_for_retirement(turn, WAIT), Some(TurnOutcome::Done));
    assert_eq!(
        h.entries(),
        vec![entry(Speaker::User, "Hello"), entry(Speaker::Bot, "Hi there")]
    );
    assert!(!h.controller.is_processing());
    assert!(h.view().inputs_enabled);
    assert_eq!(h.view().status, Status::Idle);
    assert_eq!(
        h.synth.spoken(),
        vec![("Anna".to_string(), 180, "Hi there".to_string())]
    );
}

#[test]
fn test_prompt_is_trimmed() {
    let mut h = Harness::replying("Hi there");
    let turn = h.controller.submit_text("  Hello \n").unwrap();
    h.controller.wait_for_retirement(turn, WAIT);
    assert_eq!(*h.generator.prompts.lock(), vec!["Hello"]);
    assert_eq!(h.entries()[0], entry(Speaker::User, "Hello"));
}

#[test]
fn test_empty_text_is_ignored() {
    let mut h = Harness::replying("Hi there");

    assert!(h.controller.submit_text("").is_none());
    assert!(h.controller.submit_text("   \t").is_none());

    assert!(h.entries().is_empty());
    assert!(!h.controller.is_processing());
    assert_eq!(h.generator.calls(), 0);
}

#[test]
fn test_submit_while_busy_is_ignored() {
    let (generator, release) = StubGenerator::gated("Hi there");
    let mut h = Harness::new(generator, StubRecognizer::hearing("unused"), StubSynth::ok());

    let turn = h.controller.submit_text("Hello").unwrap();
    assert!(h.controller.submit_text("Again").is_none());
    assert!(h.controller.submit_voice().is_none());
    assert_eq!(h.entries(), vec![entry(Speaker::User, "Hello")]);

    release.send(()).unwrap();
    assert_eq!(h.controller.wait_for_retirement(turn, WAIT), Some(TurnOutcome::Done));
    assert_eq!(h.entries().len(), 2);
    assert_eq!(h.generator.calls(), 1);
}

#[test]
fn test_cancel_discards_late_reply() {
    let (generator, release) = StubGenerator::gated("Too late");
    let mut h = Harness::new(generator, StubRecognizer::hearing("unused"), StubSynth::ok());

    let turn = h.controller.submit_text("Hello").unwrap();
    h.controller.cancel();

    assert!(!h.controller.is_processing());
    assert!(h.view().inputs_enabled);
    assert_eq!(h.view().status, Status::Cancelled);
    assert_eq!(h.synth.interrupts.load(Ordering::SeqCst), 1);

    release.send(()).unwrap();
    assert_eq!(
        h.controller.wait_for_retirement(turn, WAIT),
        Some(TurnOutcome::Cancelled)
    );
    h.controller.poll();

    assert_eq!(h.entries(), vec![entry(Speaker::User, "Hello")]);
    assert!(h.synth.spoken().is_empty());
}

#[test]
fn test_cancel_when_idle() {
    let mut h = Harness::replying("Hi there");
    h.controller = h.controller.with_idle_delay(Duration::ZERO);

    h.controller.cancel();
    assert_eq!(h.view().status, Status::Cancelled);
    assert!(h.controller.idle_pending());

    h.controller.poll();
    assert_eq!(h.view().status, Status::Idle);
    assert!(!h.controller.idle_pending());
    assert!(h.entries().is_empty());
}

#[test]
fn test_cancelled_status_lingers_until_delay() {
    let mut h = Harness::replying("Hi there");

    h.controller.cancel();
    h.controller.cancel();
    h.controller.poll();

    assert_eq!(h.view().status, Status::Cancelled);
    assert!(h.controller.idle_pending());
}

#[test]
fn test_new_turn_drops_pending_idle() {
    let mut h = Harness::replying("Hi there");

    h.controller.cancel();
    assert!(h.controller.idle_pending());

    let turn = h.controller.submit_text("Hello").unwrap();
    assert!(!h.controller.idle_pending());
    assert_eq!(h.view().status, Status::Inferring);

    h.controller.wait_for_retirement(turn, WAIT);
    assert_eq!(h.view().status, Status::Idle);
}

#[test]
fn test_connection_error_becomes_error_entry() {
    let mut h = Harness::new(
        StubGenerator::failing(MurmurError::ConnectionError("refused".into())),
        StubRecognizer::hearing("unused"),
        StubSynth::ok(),
    );

    let turn = h.controller.submit_text("Hello").unwrap();
    assert_eq!(
        h.controller.wait_for_retirement(turn, WAIT),
        Some(TurnOutcome::Failed)
    );

    assert_eq!(
        h.entries(),
        vec![
            entry(Speaker::User, "Hello"),
            entry(Speaker::Error, "Error: Could not reach the inference server."),
        ]
    );
    assert!(!h.controller.is_processing());
    assert!(h.synth.spoken().is_empty());
}

#[test]
fn test_malformed_reply_becomes_error_entry() {
    let mut h = Harness::new(
        StubGenerator::failing(MurmurError::MalformedResponseError("not json".into())),
        StubRecognizer::hearing("unused"),
        StubSynth::ok(),
    );

    let turn = h.controller.submit_text("Hello").unwrap();
    assert_eq!(
        h.controller.wait_for_retirement(turn, WAIT),
        Some(TurnOutcome::Failed)
    );

    assert_eq!(
        h.entries(),
        vec![
            entry(Speaker::User, "Hello"),
            entry(
                Speaker::Error,
                "Error: The inference server sent an invalid reply."
            ),
        ]
    );
    assert!(h.view().inputs_enabled);
    assert!(h.synth.spoken().is_empty());
}

#[test]
fn test_cancel_while_listening_drops_transcript() {
    let (recognizer, release) = StubRecognizer::gated("late words");
    let mut h = Harness::new(StubGenerator::replying("unused"), recognizer, StubSynth::ok());

    let turn = h.controller.submit_voice().unwrap();
    let deadline = Instant::now() + WAIT;
    while h.recognizer.calls() == 0 {
        assert!(Instant::now() < deadline, "recognizer never called");
        thread::sleep(Duration::from_millis(5));
    }

    h.controller.cancel();
    release.send(()).unwrap();
    assert_eq!(
        h.controller.wait_for_retirement(turn, WAIT),
        Some(TurnOutcome::Cancelled)
    );
    h.controller.poll();

    assert!(h.entries().is_empty());
    assert_eq!(h.generator.calls(), 0);
    assert!(h.synth.spoken().is_empty());
    assert_eq!(h.view().status, Status::Cancelled);
}

#[test]
fn test_unintelligible_speech_skips_inference() {
    let mut h = Harness::new(
        StubGenerator::replying("unused"),
        StubRecognizer::failing(MurmurError::UnintelligibleSpeechError("silence".into())),
        StubSynth::ok(),
    );

    let turn = h.controller.submit_voice().unwrap();
    assert_eq!(h.view().status, Status::Listening);
    assert_eq!(
        h.controller.wait_for_retirement(turn, WAIT),
        Some(TurnOutcome::Failed)
    );

    assert_eq!(
        h.entries(),
        vec![entry(Speaker::Error, "Error: I could not understand that.")]
    );
    assert_eq!(h.generator.calls(), 0);
    assert_eq!(h.view().status, Status::Idle);
}

#[test]
fn test_voice_round_trip() {
    let mut h = Harness::new(
        StubGenerator::replying("Es ist drei Uhr."),
        StubRecognizer::hearing("Wie spät ist es?"),
        StubSynth::ok(),
    );

    let turn = h.controller.submit_voice().unwrap();
    assert_eq!(h.controller.wait_for_retirement(turn, WAIT), Some(TurnOutcome::Done));

    assert_eq!(
        h.entries(),
        vec![
            entry(Speaker::User, "Wie spät ist es?"),
            entry(Speaker::Bot, "Es ist drei Uhr."),
        ]
    );
    assert_eq!(*h.recognizer.locales.lock(), vec!["de-DE"]);
    assert_eq!(*h.generator.prompts.lock(), vec!["Wie spät ist es?"]);
    assert_eq!(
        h.synth.spoken(),
        vec![("Anna".to_string(), 180, "Es ist drei Uhr.".to_string())]
    );
}

#[test]
fn test_selected_language_picks_voice() {
    let mut h = Harness::replying("Hej");
    h.controller.presenter_mut().language = "sv".to_string();

    let turn = h.controller.submit_text("Hallå").unwrap();
    h.controller.wait_for_retirement(turn, WAIT);

    assert_eq!(h.synth.spoken()[0].0, "Alva");
}

#[test]
fn test_speech_failure_keeps_reply() {
    let mut h = Harness::new(
        StubGenerator::replying("Hi there"),
        StubRecognizer::hearing("unused"),
        StubSynth::failing(MurmurError::UnsupportedPlatformError("linux".into())),
    );

    let turn = h.controller.submit_text("Hello").unwrap();
    assert_eq!(h.controller.wait_for_retirement(turn, WAIT), Some(TurnOutcome::Done));

    assert_eq!(
        h.entries(),
        vec![
            entry(Speaker::User, "Hello"),
            entry(Speaker::Bot, "Hi there"),
            entry(
                Speaker::Error,
                "Error: Spoken replies are not available on this system."
            ),
        ]
    );
    assert!(h.view().inputs_enabled);
}

#[test]
fn test_cancel_interrupts_speech() {
    let mut h = Harness::new(
        StubGenerator::replying("A long answer"),
        StubRecognizer::hearing("unused"),
        StubSynth::until_interrupted(),
    );

    let turn = h.controller.submit_text("Hello").unwrap();
    h.poll_until_status(Status::Speaking);

    h.controller.cancel();
    assert_eq!(
        h.controller.wait_for_retirement(turn, WAIT),
        Some(TurnOutcome::Cancelled)
    );
    assert_eq!(h.synth.interrupts.load(Ordering::SeqCst), 1);
    assert_eq!(
        h.entries(),
        vec![entry(Speaker::User, "Hello"), entry(Speaker::Bot, "A long answer")]
    );
    assert_eq!(h.view().status, Status::Cancelled);
}

#[test]
fn test_turns_run_back_to_back() {
    let mut h = Harness::replying("Hi there");

    let first = h.controller.submit_text("One").unwrap();
    h.controller.wait_for_retirement(first, WAIT);
    let second = h.controller.submit_text("Two").unwrap();
    h.controller.wait_for_retirement(second, WAIT);

    assert!(second > first);
    assert_eq!(h.entries().len(), 4);
    assert!(h.controller.is_worker_running());
}
