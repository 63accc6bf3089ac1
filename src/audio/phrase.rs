//! Energy-threshold phrase detection
//!
//! The detector first measures ambient noise to derive a threshold, then
//! waits for a chunk louder than that threshold, records until a run of quiet
//! chunks marks the end of the phrase, and gives up when nobody starts
//! speaking in time. It is fed chunk by chunk and never blocks, so the
//! capture loop owns all timing.

use crate::audio::buffer::AudioRingBuffer;
use tracing::debug;

/// Audio kept from just before the threshold was crossed
const PRE_ROLL_SECS: f32 = 0.3;

/// Timing and threshold parameters for one phrase
#[derive(Clone, Debug, PartialEq)]
pub struct PhraseSettings {
    /// Ambient noise measurement before listening
    pub calibration_secs: f32,
    /// How long to wait for speech to begin
    pub start_timeout_secs: f32,
    /// Quiet time that ends a phrase
    pub pause_secs: f32,
    /// Hard cap on phrase length
    pub phrase_limit_secs: f32,
    /// Threshold as a multiple of the ambient RMS
    pub energy_ratio: f32,
    /// Lower bound for the threshold
    pub min_energy: f32,
}

impl Default for PhraseSettings {
    fn default() -> Self {
        Self {
            calibration_secs: 1.0,
            start_timeout_secs: 5.0,
            pause_secs: 0.8,
            phrase_limit_secs: 10.0,
            energy_ratio: 1.5,
            min_energy: 0.01,
        }
    }
}

/// Result of feeding one chunk to the detector
#[derive(Debug, Clone, PartialEq)]
pub enum PhraseProgress {
    /// Keep feeding audio
    Pending,
    /// A phrase was captured
    Complete(Vec<f32>),
    /// Nobody spoke before the start timeout
    NoSpeech,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Calibrating { energy_sum: f64, chunks: usize },
    Waiting,
    Speaking { quiet: usize },
    Finished,
}

pub struct PhraseDetector {
    sample_rate: u32,
    settings: PhraseSettings,
    phase: Phase,
    elapsed: usize,
    waited: usize,
    threshold: f32,
    pre_roll: AudioRingBuffer,
    phrase: Vec<f32>,
}

impl PhraseDetector {
    pub fn new(settings: PhraseSettings, sample_rate: u32) -> Self {
        let pre_roll = AudioRingBuffer::new(seconds_to_samples(PRE_ROLL_SECS, sample_rate));
        let phase = if settings.calibration_secs > 0.0 {
            Phase::Calibrating {
                energy_sum: 0.0,
                chunks: 0,
            }
        } else {
            Phase::Waiting
        };

        Self {
            sample_rate,
            threshold: settings.min_energy,
            settings,
            phase,
            elapsed: 0,
            waited: 0,
            pre_roll,
            phrase: Vec::new(),
        }
    }

    /// Energy level a chunk must reach to count as speech
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn is_speaking(&self) -> bool {
        matches!(self.phase, Phase::Speaking { .. })
    }

    pub fn push(&mut self, chunk: &[f32]) -> PhraseProgress {
        if chunk.is_empty() {
            return PhraseProgress::Pending;
        }
        self.elapsed += chunk.len();
        let energy = rms(chunk);

        match self.phase {
            Phase::Calibrating { energy_sum, chunks } => {
                let energy_sum = energy_sum + f64::from(energy);
                let chunks = chunks + 1;
                if self.elapsed >= self.samples(self.settings.calibration_secs) {
                    let ambient = (energy_sum / chunks as f64) as f32;
                    self.threshold = (ambient * self.settings.energy_ratio)
                        .max(self.settings.min_energy);
                    debug!(
                        "Ambient energy {:.4}, speech threshold {:.4}",
                        ambient, self.threshold
                    );
                    self.phase = Phase::Waiting;
                } else {
                    self.phase = Phase::Calibrating { energy_sum, chunks };
                }
                PhraseProgress::Pending
            }
            Phase::Waiting => {
                if energy >= self.threshold {
                    debug!("Speech started (energy {:.4})", energy);
                    self.phrase = self.pre_roll.drain();
                    self.phrase.extend_from_slice(chunk);
                    self.phase = Phase::Speaking { quiet: 0 };
                    return self.check_limit();
                }

                self.pre_roll.write(chunk);
                self.waited += chunk.len();
                if self.waited >= self.samples(self.settings.start_timeout_secs) {
                    debug!("No speech within {}s", self.settings.start_timeout_secs);
                    self.phase = Phase::Finished;
                    return PhraseProgress::NoSpeech;
                }
                PhraseProgress::Pending
            }
            Phase::Speaking { quiet } => {
                self.phrase.extend_from_slice(chunk);
                let quiet = if energy < self.threshold {
                    quiet + chunk.len()
                } else {
                    0
                };

                if quiet >= self.samples(self.settings.pause_secs) {
                    debug!("Pause detected, phrase complete");
                    return self.finish();
                }
                self.phase = Phase::Speaking { quiet };
                self.check_limit()
            }
            Phase::Finished => PhraseProgress::Pending,
        }
    }

    fn check_limit(&mut self) -> PhraseProgress {
        if self.phrase.len() >= self.samples(self.settings.phrase_limit_secs) {
            debug!("Phrase limit of {}s reached", self.settings.phrase_limit_secs);
            return self.finish();
        }
        PhraseProgress::Pending
    }

    fn finish(&mut self) -> PhraseProgress {
        self.phase = Phase::Finished;
        PhraseProgress::Complete(std::mem::take(&mut self.phrase))
    }

    fn samples(&self, secs: f32) -> usize {
        seconds_to_samples(secs, self.sample_rate)
    }
}

fn seconds_to_samples(secs: f32, sample_rate: u32) -> usize {
    (secs.max(0.0) * sample_rate as f32).round() as usize
}

/// Root mean square of a chunk
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|&s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
