//! # Spectra Signal Simulation
//!
//! Synthetic signal sources for exercising the analysis pipeline without
//! hardware.
//!
//! ## Sources
//!
//! - **Channel**: seeded AWGN at a fixed level
//! - **Scenarios**: the seeded demo captures (two-tone, interference)
//! - **Live stream**: frames with a carrier and a wandering interferer
//!
//! ## Usage
//!
//! ```rust
//! use spectra_sim::scenario::Scenario;
//!
//! let samples = Scenario::interference_demo().generate(42);
//! assert_eq!(samples.len(), 10_000);
//! ```

pub mod channel;
pub mod scenario;
pub mod stream;

// Re-exports
pub use channel::{Channel, ChannelConfig};
pub use scenario::{tones, Scenario, ScenarioKind, Tone};
pub use stream::{LiveFrame, LiveSignalSource};
