//! Microphone capture of a single spoken phrase
//!
//! Audio comes from the default cpal input device, is mixed down to mono and
//! handed to a [`PhraseDetector`](crate::audio::PhraseDetector) until it
//! reports a phrase or a timeout.

use crate::audio::phrase::PhraseSettings;
#[cfg(not(feature = "audio-io"))]
use crate::Result;

/// Audio recorded for one phrase
#[derive(Debug, Clone)]
pub struct CapturedPhrase {
    /// Mono samples in the range -1.0 to 1.0
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl CapturedPhrase {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

#[cfg(feature = "audio-io")]
pub use capture::{capture_phrase, AudioRecorder};

#[cfg(not(feature = "audio-io"))]
pub fn capture_phrase(_settings: &PhraseSettings) -> Result<CapturedPhrase> {
    Err(crate::MurmurError::NoMicrophoneError(
        "built without audio input support".into(),
    ))
}

#[cfg(feature = "audio-io")]
mod capture {
    use super::{CapturedPhrase, PhraseSettings};
    use crate::audio::phrase::{PhraseDetector, PhraseProgress};
    use crate::{MurmurError, Result};
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
    use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
    use std::time::Duration;
    use tracing::{debug, error, info, warn};

    /// A device that stops delivering audio for this long is treated as gone
    const STALL_TIMEOUT: Duration = Duration::from_secs(2);

    /// Chunks buffered between the audio callback and the detector
    const CHUNK_QUEUE: usize = 256;

    /// Records mono audio from the default input device
    pub struct AudioRecorder {
        device: Device,
        config: StreamConfig,
        sample_format: SampleFormat,
        stream: Option<Stream>,
    }

    impl AudioRecorder {
        /// Open the default input device
        ///
        /// # Errors
        /// `NoMicrophoneError` when the host has no usable input device
        pub fn new() -> Result<Self> {
            let host = cpal::default_host();

            let device = host
                .default_input_device()
                .ok_or_else(|| MurmurError::NoMicrophoneError("no input device available".into()))?;

            let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
            info!("Using input device: {}", device_name);

            let supported = device.default_input_config().map_err(|e| {
                MurmurError::NoMicrophoneError(format!("input device unusable: {}", e))
            })?;
            let sample_format = supported.sample_format();
            let config: StreamConfig = supported.into();

            debug!(
                "Input config: {}Hz, {} channel(s), {:?}",
                config.sample_rate.0, config.channels, sample_format
            );

            Ok(Self {
                device,
                config,
                sample_format,
                stream: None,
            })
        }

        pub fn sample_rate(&self) -> u32 {
            self.config.sample_rate.0
        }

        /// Start streaming mono chunks into `audio_tx`
        pub fn start(&mut self, audio_tx: Sender<Vec<f32>>) -> Result<()> {
            if self.stream.is_some() {
                warn!("Already recording, ignoring start request");
                return Ok(());
            }

            let stream = match self.sample_format {
                SampleFormat::F32 => self.build_stream::<f32>(audio_tx)?,
                SampleFormat::I16 => self.build_stream::<i16>(audio_tx)?,
                SampleFormat::U16 => self.build_stream::<u16>(audio_tx)?,
                other => {
                    return Err(MurmurError::AudioDeviceError(format!(
                        "unsupported sample format {:?}",
                        other
                    )))
                }
            };

            stream.play().map_err(|e| {
                MurmurError::AudioDeviceError(format!("Failed to start input stream: {}", e))
            })?;
            self.stream = Some(stream);

            debug!("Audio recording started");
            Ok(())
        }

        pub fn stop(&mut self) {
            if self.stream.take().is_some() {
                debug!("Audio recording stopped");
            }
        }

        fn build_stream<T>(&self, audio_tx: Sender<Vec<f32>>) -> Result<Stream>
        where
            T: SizedSample,
            f32: FromSample<T>,
        {
            let channels = self.config.channels as usize;

            self.device
                .build_input_stream(
                    &self.config,
                    move |data: &[T], _: &cpal::InputCallbackInfo| {
                        let samples: Vec<f32> = if channels <= 1 {
                            data.iter().map(|&s| s.to_sample::<f32>()).collect()
                        } else {
                            data.chunks(channels)
                                .map(|frame| {
                                    frame.iter().map(|&s| s.to_sample::<f32>()).sum::<f32>()
                                        / channels as f32
                                })
                                .collect()
                        };

                        if let Err(e) = audio_tx.try_send(samples) {
                            warn!("Dropping audio chunk: {}", e);
                        }
                    },
                    |err| error!("Audio input stream error: {}", err),
                    None,
                )
                .map_err(|e| {
                    MurmurError::AudioDeviceError(format!("Failed to build input stream: {}", e))
                })
        }
    }

    impl Drop for AudioRecorder {
        fn drop(&mut self) {
            self.stop();
        }
    }

    /// Record from the default microphone until one phrase is complete
    ///
    /// # Errors
    /// - `NoMicrophoneError` without an input device, or when it delivers no audio
    /// - `UnintelligibleSpeechError` when nobody starts speaking in time
    pub fn capture_phrase(settings: &PhraseSettings) -> Result<CapturedPhrase> {
        let (audio_tx, audio_rx) = bounded(CHUNK_QUEUE);
        let mut recorder = AudioRecorder::new()?;
        let sample_rate = recorder.sample_rate();
        let mut detector = PhraseDetector::new(settings.clone(), sample_rate);

        recorder.start(audio_tx)?;
        info!("Listening...");

        let result = loop {
            let chunk = match audio_rx.recv_timeout(STALL_TIMEOUT) {
                Ok(chunk) => chunk,
                Err(RecvTimeoutError::Timeout) => {
                    break Err(MurmurError::NoMicrophoneError(
                        "input device delivered no audio".into(),
                    ))
                }
                Err(RecvTimeoutError::Disconnected) => {
                    break Err(MurmurError::AudioDeviceError("input stream closed".into()))
                }
            };

            match detector.push(&chunk) {
                PhraseProgress::Pending => continue,
                PhraseProgress::Complete(samples) => {
                    break Ok(CapturedPhrase {
                        samples,
                        sample_rate,
                    })
                }
                PhraseProgress::NoSpeech => {
                    break Err(MurmurError::UnintelligibleSpeechError(format!(
                        "no speech within {}s",
                        settings.start_timeout_secs
                    )))
                }
            }
        };

        recorder.stop();
        if let Ok(phrase) = &result {
            info!("Captured {:.1}s of speech", phrase.duration_secs());
        }
        result
    }
}
