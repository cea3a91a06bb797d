//! Demo scenarios
//!
//! Sums of cosine tones plus Gaussian noise, sampled at 1 MHz for 10 ms.
//!
//! | Scenario       | Tones                                  | Noise σ |
//! |----------------|----------------------------------------|---------|
//! | `spectrum`     | 200 kHz @ 1.0, 350 kHz @ 0.4           | 0.15    |
//! | `signal`       | 200 kHz @ 1.0, 350 kHz @ 0.4           | 0.10    |
//! | `interference` | 200 kHz @ 1.0, 420 kHz @ 1.8 (φ = π/4) | 0.15    |

use crate::channel::{Channel, ChannelConfig};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Default sample rate of the demo scenarios (1 MHz)
pub const DEMO_SAMPLE_RATE: f64 = 1_000_000.0;

/// Default capture length of the demo scenarios (10 ms)
pub const DEMO_DURATION: f64 = 0.01;

/// A single cosine component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    /// Frequency in Hz
    pub freq: f64,
    pub amplitude: f64,
    /// Phase offset in radians
    pub phase: f64,
}

impl Tone {
    pub fn new(freq: f64, amplitude: f64) -> Self {
        Self {
            freq,
            amplitude,
            phase: 0.0,
        }
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    /// Value at time `t` seconds
    #[inline]
    pub fn at(&self, t: f64) -> f64 {
        self.amplitude * (2.0 * PI * self.freq * t + self.phase).cos()
    }
}

/// Generate `len` samples of a tone sum at `sample_rate`
pub fn tones(components: &[Tone], sample_rate: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate;
            components.iter().map(|c| c.at(t)).sum()
        })
        .collect()
}

/// Named demo scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    /// Two tones with moderate noise
    Spectrum,
    /// Two tones with light noise
    Signal,
    /// Carrier plus a strong interferer at 420 kHz
    Interference,
}

impl ScenarioKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::Spectrum => "spectrum",
            ScenarioKind::Signal => "signal",
            ScenarioKind::Interference => "interference",
        }
    }

    pub fn scenario(&self) -> Scenario {
        match self {
            ScenarioKind::Spectrum => Scenario::spectrum_demo(),
            ScenarioKind::Signal => Scenario::signal_demo(),
            ScenarioKind::Interference => Scenario::interference_demo(),
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tone set, noise level and capture geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub tones: Vec<Tone>,
    /// Standard deviation of additive Gaussian noise
    pub noise_std: f64,
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Capture length in seconds
    pub duration: f64,
}

impl Scenario {
    pub fn spectrum_demo() -> Self {
        Self {
            tones: vec![Tone::new(200e3, 1.0), Tone::new(350e3, 0.4)],
            noise_std: 0.15,
            sample_rate: DEMO_SAMPLE_RATE,
            duration: DEMO_DURATION,
        }
    }

    pub fn signal_demo() -> Self {
        Self {
            noise_std: 0.1,
            ..Self::spectrum_demo()
        }
    }

    pub fn interference_demo() -> Self {
        Self {
            tones: vec![
                Tone::new(200e3, 1.0),
                Tone::new(420e3, 1.8).with_phase(PI / 4.0),
            ],
            noise_std: 0.15,
            sample_rate: DEMO_SAMPLE_RATE,
            duration: DEMO_DURATION,
        }
    }

    /// Number of samples produced by [`Scenario::generate`]
    pub fn num_samples(&self) -> usize {
        (self.sample_rate * self.duration).round() as usize
    }

    /// Render the scenario with seeded noise
    pub fn generate(&self, seed: u64) -> Vec<f64> {
        let clean = tones(&self.tones, self.sample_rate, self.num_samples());
        let mut channel = Channel::new(ChannelConfig::with_noise_std(self.noise_std).seeded(seed));
        let samples = channel.apply(&clean);
        tracing::debug!(
            samples = samples.len(),
            tones = self.tones.len(),
            noise_std = self.noise_std,
            seed,
            "scenario generated"
        );
        samples
    }
}
