//! Spoken replies through the OS speech command
//!
//! On macOS replies are rendered with `say`; everywhere else a silent
//! synthesizer is selected once at startup.

use crate::{MurmurError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How often a running utterance is checked for exit
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Configuration for spoken replies
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Words per minute for slow speech
    pub slow_rate: u32,
    /// Words per minute for fast speech
    pub fast_rate: u32,
    /// Speech command to invoke
    pub command: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            slow_rate: 180,
            fast_rate: 350,
            command: "say".to_string(),
        }
    }
}

impl SpeechConfig {
    pub fn rate_for(&self, slow: bool) -> u32 {
        if slow {
            self.slow_rate
        } else {
            self.fast_rate
        }
    }
}

/// Renders text as audible speech
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` and block until it finishes or is interrupted
    fn say(&self, voice: &str, rate: u32, text: &str) -> Result<()>;

    /// Stop the current utterance, if any
    fn interrupt(&self);

    fn name(&self) -> &'static str;

    /// Number of interrupts so far
    fn interruptions(&self) -> u64 {
        0
    }

    /// Like [`say`](Self::say), but stays silent if an interrupt arrived
    /// after `since` was read from [`interruptions`](Self::interruptions)
    fn say_since(&self, since: u64, voice: &str, rate: u32, text: &str) -> Result<()> {
        if self.interruptions() != since {
            return Ok(());
        }
        self.say(voice, rate, text)
    }
}

/// Synthesizer backed by the macOS `say` command
pub struct SaySynthesizer {
    command: String,
    current: Mutex<Option<Child>>,
    interrupts: AtomicU64,
}

impl SaySynthesizer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            current: Mutex::new(None),
            interrupts: AtomicU64::new(0),
        }
    }

    fn spawn(&self, voice: &str, rate: u32, text: &str) -> Result<Child> {
        Command::new(&self.command)
            .arg("-v")
            .arg(voice)
            .arg("-r")
            .arg(rate.to_string())
            .arg("--")
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => MurmurError::UnsupportedPlatformError(format!(
                    "'{}' is not available",
                    self.command
                )),
                _ => MurmurError::SpeechSynthesisError(format!(
                    "failed to start '{}': {}",
                    self.command, e
                )),
            })
    }
}

impl Default for SaySynthesizer {
    fn default() -> Self {
        Self::new(SpeechConfig::default().command)
    }
}

impl SpeechSynthesizer for SaySynthesizer {
    fn say(&self, voice: &str, rate: u32, text: &str) -> Result<()> {
        self.say_since(self.interruptions(), voice, rate, text)
    }

    fn say_since(&self, since: u64, voice: &str, rate: u32, text: &str) -> Result<()> {
        if self.interruptions() != since {
            debug!("Utterance interrupted before it started");
            return Ok(());
        }

        debug!("Speaking {} chars with {} at {} wpm", text.len(), voice, rate);
        let mut child = self.spawn(voice, rate, text)?;
        {
            // An interrupt that missed the child still bumped the counter.
            let mut current = self.current.lock();
            if self.interruptions() != since {
                debug!("Utterance interrupted while starting");
                let _ = child.kill();
                let _ = child.wait();
                return Ok(());
            }
            *current = Some(child);
        }

        let (status, child) = loop {
            {
                let mut current = self.current.lock();
                let Some(child) = current.as_mut() else {
                    debug!("Utterance interrupted");
                    return Ok(());
                };
                match child.try_wait() {
                    Ok(Some(status)) => break (status, current.take()),
                    Ok(None) => {}
                    Err(e) => {
                        current.take();
                        return Err(MurmurError::SpeechSynthesisError(e.to_string()));
                    }
                }
            }
            thread::sleep(POLL_INTERVAL);
        };

        if status.success() {
            return Ok(());
        }

        let mut stderr = String::new();
        if let Some(mut pipe) = child.and_then(|mut c| c.stderr.take()) {
            let _ = pipe.read_to_string(&mut stderr);
        }
        Err(MurmurError::SpeechSynthesisError(format!(
            "'{}' exited with {}: {}",
            self.command,
            status,
            stderr.trim()
        )))
    }

    fn interrupt(&self) {
        self.interrupts.fetch_add(1, Ordering::SeqCst);
        if let Some(mut child) = self.current.lock().take() {
            debug!("Stopping utterance (pid {})", child.id());
            if let Err(e) = child.kill() {
                warn!("Failed to stop speech: {}", e);
            }
            let _ = child.wait();
        }
    }

    fn name(&self) -> &'static str {
        "say"
    }

    fn interruptions(&self) -> u64 {
        self.interrupts.load(Ordering::SeqCst)
    }
}

/// Synthesizer for hosts without a speech command
#[derive(Debug, Default)]
pub struct SilentSynthesizer;

impl SpeechSynthesizer for SilentSynthesizer {
    fn say(&self, voice: &str, _rate: u32, text: &str) -> Result<()> {
        debug!("Silent synthesizer skipped {} chars for {}", text.len(), voice);
        Ok(())
    }

    fn interrupt(&self) {}

    fn name(&self) -> &'static str {
        "silent"
    }
}

/// Pick the synthesizer for the host platform
pub fn select_synthesizer(config: &SpeechConfig) -> Arc<dyn SpeechSynthesizer> {
    if cfg!(target_os = "macos") {
        info!("Spoken replies use '{}'", config.command);
        Arc::new(SaySynthesizer::new(config.command.clone()))
    } else {
        warn!("No speech command on this platform, replies will not be spoken");
        Arc::new(SilentSynthesizer)
    }
}
