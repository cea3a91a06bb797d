//! Live frame source
//!
//! Emulates a receiver producing one short capture per publish interval:
//! a carrier, an interferer that wanders from 350 kHz to 400 kHz over a
//! 10 second cycle, and Gaussian noise. Each capture is reduced to a
//! 512-point Hann spectrum over its leading samples.

use crate::channel::{Channel, ChannelConfig};
use crate::scenario::{tones, Tone};
use serde::Serialize;
use spectra_core::analysis::{compute_spectrum, WindowFunction};
use spectra_core::config::StreamConfig;
use spectra_core::types::{AnalysisResult, DEFAULT_SAMPLE_RATE};

/// Transform size used for live frames
pub const LIVE_FFT_SIZE: usize = 512;

/// Interferer start frequency (Hz)
pub const INTERFERER_BASE_FREQ: f64 = 350_000.0;

/// Interferer sweep width over one cycle (Hz)
pub const INTERFERER_SWEEP: f64 = 50_000.0;

/// Length of one interferer sweep cycle (s)
pub const SWEEP_PERIOD: f64 = 10.0;

const CARRIER_AMPLITUDE: f64 = 1.0;
const INTERFERER_AMPLITUDE: f64 = 0.5;

/// One published frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveFrame {
    /// Frame counter, starting at 0
    pub index: u64,
    /// Stream time in seconds
    pub timestamp: f64,
    /// Interferer frequency used for this frame (Hz)
    pub interferer_freq: f64,
    /// Frequency axis (Hz)
    pub freqs: Vec<f64>,
    /// Power per bin (dB)
    pub power_db: Vec<f64>,
    /// Raw capture; not published
    #[serde(skip)]
    pub samples: Vec<f64>,
}

/// Synthetic receiver producing [`LiveFrame`]s
#[derive(Debug)]
pub struct LiveSignalSource {
    config: StreamConfig,
    sample_rate: f64,
    channel: Channel,
    index: u64,
}

impl LiveSignalSource {
    /// Entropy-seeded source
    pub fn new(config: StreamConfig) -> Self {
        Self::with_channel(config, ChannelConfig::default())
    }

    /// Source with repeatable noise
    pub fn seeded(config: StreamConfig, seed: u64) -> Self {
        Self::with_channel(config, ChannelConfig::default().seeded(seed))
    }

    fn with_channel(config: StreamConfig, channel: ChannelConfig) -> Self {
        let channel = Channel::new(ChannelConfig {
            noise_std: config.noise_level,
            ..channel
        });
        Self {
            config,
            sample_rate: DEFAULT_SAMPLE_RATE,
            channel,
            index: 0,
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Interferer frequency at stream time `t` seconds
    pub fn interferer_freq(t: f64) -> f64 {
        let phase = t.rem_euclid(SWEEP_PERIOD) / SWEEP_PERIOD;
        INTERFERER_BASE_FREQ + phase * INTERFERER_SWEEP
    }

    /// Render the frame for stream time `t`
    pub fn frame_at(&mut self, index: u64, t: f64) -> AnalysisResult<LiveFrame> {
        let len = (self.sample_rate * self.config.frame_duration).round() as usize;
        let interferer_freq = Self::interferer_freq(t);
        let clean = tones(
            &[
                Tone::new(self.config.carrier_freq, CARRIER_AMPLITUDE),
                Tone::new(interferer_freq, INTERFERER_AMPLITUDE),
            ],
            self.sample_rate,
            len,
        );
        let samples = self.channel.apply(&clean);

        let head = &samples[..LIVE_FFT_SIZE.min(samples.len())];
        let spectrum = compute_spectrum(head, self.sample_rate, WindowFunction::Hann, LIVE_FFT_SIZE)?;

        Ok(LiveFrame {
            index,
            timestamp: t,
            interferer_freq,
            freqs: spectrum.frequencies,
            power_db: spectrum.power_db,
            samples,
        })
    }

    /// Next frame, advancing stream time by one publish interval
    pub fn next_frame(&mut self) -> AnalysisResult<LiveFrame> {
        let index = self.index;
        let t = index as f64 * self.config.interval_ms as f64 / 1000.0;
        self.index += 1;
        tracing::trace!(index, t, "rendering live frame");
        self.frame_at(index, t)
    }
}
