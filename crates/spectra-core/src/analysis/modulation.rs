//! Rule-Based Modulation Classification
//!
//! A coarse classifier over envelope statistics and SNR. Rules are kept in an
//! ordered table and evaluated top to bottom; the first matching rule wins.
//!
//! | # | Predicate                          | Class                |
//! |---|------------------------------------|----------------------|
//! | 1 | envelope variation index > 0.3     | AM                   |
//! | 2 | SNR < 6 dB                         | CW / noise           |
//! | 3 | always                             | FM / phase-shift     |

use crate::types::AMPLITUDE_EPSILON;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Envelope variation index above which a signal is called AM
pub const AM_ENVELOPE_THRESHOLD: f64 = 0.3;

/// SNR below which no modulation is claimed
pub const MIN_MODULATION_SNR_DB: f64 = 6.0;

/// Coarse modulation class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModulationClass {
    /// Amplitude modulation (strong envelope variation)
    Am,
    /// Unmodulated carrier or noise
    CwNoise,
    /// Constant-envelope carrier (frequency or phase modulated)
    FmPhaseShift,
}

impl ModulationClass {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ModulationClass::Am => "AM",
            ModulationClass::CwNoise => "CW / noise, no clear modulation",
            ModulationClass::FmPhaseShift => "FM / phase-shift (carrier)",
        }
    }
}

impl fmt::Display for ModulationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inputs the rules are evaluated against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationFeatures {
    /// `std(|x|) / (mean(|x|) + ε)`
    pub envelope_variation: f64,
    /// Peak-to-noise-floor ratio in dB
    pub snr_db: f64,
}

impl ModulationFeatures {
    /// Derive features from the time-domain signal and an SNR estimate
    pub fn from_signal(samples: &[f64], snr_db: f64) -> Self {
        Self {
            envelope_variation: envelope_variation_index(samples),
            snr_db,
        }
    }
}

/// Envelope variation index: `std(|x|) / (mean(|x|) + ε)` (population std)
pub fn envelope_variation_index(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().map(|s| s.abs()).sum::<f64>() / n;
    let var = samples
        .iter()
        .map(|s| (s.abs() - mean).powi(2))
        .sum::<f64>()
        / n;
    var.sqrt() / (mean + AMPLITUDE_EPSILON)
}

type Predicate = Box<dyn Fn(&ModulationFeatures) -> bool + Send + Sync>;

/// A single `(predicate, class)` entry in the decision table
pub struct ModulationRule {
    name: &'static str,
    predicate: Predicate,
    class: ModulationClass,
}

impl ModulationRule {
    /// Create a rule
    pub fn new<F>(name: &'static str, class: ModulationClass, predicate: F) -> Self
    where
        F: Fn(&ModulationFeatures) -> bool + Send + Sync + 'static,
    {
        Self {
            name,
            predicate: Box::new(predicate),
            class,
        }
    }

    /// Rule name for logging
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Class assigned when the rule matches
    pub fn class(&self) -> ModulationClass {
        self.class
    }

    /// Evaluate the predicate
    pub fn matches(&self, features: &ModulationFeatures) -> bool {
        (self.predicate)(features)
    }
}

impl fmt::Debug for ModulationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModulationRule")
            .field("name", &self.name)
            .field("class", &self.class)
            .finish()
    }
}

/// Ordered rule table; first match wins
#[derive(Debug)]
pub struct ModulationClassifier {
    rules: Vec<ModulationRule>,
    fallback: ModulationClass,
}

impl Default for ModulationClassifier {
    fn default() -> Self {
        Self::new(ModulationClass::FmPhaseShift)
            .with_rule(ModulationRule::new(
                "envelope-variation",
                ModulationClass::Am,
                |f| f.envelope_variation > AM_ENVELOPE_THRESHOLD,
            ))
            .with_rule(ModulationRule::new(
                "low-snr",
                ModulationClass::CwNoise,
                |f| f.snr_db < MIN_MODULATION_SNR_DB,
            ))
    }
}

impl ModulationClassifier {
    /// Empty table that always yields `fallback`
    pub fn new(fallback: ModulationClass) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Append a rule at the lowest priority
    pub fn with_rule(mut self, rule: ModulationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[ModulationRule] {
        &self.rules
    }

    /// Classify a feature set
    pub fn classify(&self, features: &ModulationFeatures) -> ModulationClass {
        for rule in &self.rules {
            if rule.matches(features) {
                tracing::trace!(rule = rule.name(), class = %rule.class(), "modulation rule matched");
                return rule.class();
            }
        }
        self.fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn features(envelope_variation: f64, snr_db: f64) -> ModulationFeatures {
        ModulationFeatures {
            envelope_variation,
            snr_db,
        }
    }

    #[test]
    fn test_rule_order() {
        let classifier = ModulationClassifier::default();
        // Envelope rule precedes the SNR rule
        assert_eq!(classifier.classify(&features(0.5, 3.0)), ModulationClass::Am);
        assert_eq!(
            classifier.classify(&features(0.1, 3.0)),
            ModulationClass::CwNoise
        );
        assert_eq!(
            classifier.classify(&features(0.1, 30.0)),
            ModulationClass::FmPhaseShift
        );
    }

    #[test]
    fn test_thresholds_are_strict() {
        let classifier = ModulationClassifier::default();
        assert_eq!(
            classifier.classify(&features(AM_ENVELOPE_THRESHOLD, 6.0)),
            ModulationClass::FmPhaseShift
        );
    }

    #[test]
    fn test_custom_rule_table() {
        let classifier = ModulationClassifier::new(ModulationClass::CwNoise).with_rule(
            ModulationRule::new("strong", ModulationClass::FmPhaseShift, |f| f.snr_db > 50.0),
        );
        assert_eq!(classifier.rules().len(), 1);
        assert_eq!(
            classifier.classify(&features(0.9, 60.0)),
            ModulationClass::FmPhaseShift
        );
        assert_eq!(
            classifier.classify(&features(0.9, 10.0)),
            ModulationClass::CwNoise
        );
    }

    #[test]
    fn test_envelope_variation() {
        // Constant envelope
        assert!(envelope_variation_index(&[0.7; 100]) < 1e-9);
        // All-zero input stays finite
        assert_eq!(envelope_variation_index(&[0.0; 100]), 0.0);

        // |cos| has mean 2/π and std sqrt(1/2 - 4/π²)
        let n = 100_000;
        let cosine: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 37.0 * i as f64 / n as f64).cos())
            .collect();
        let expected = (0.5 - 4.0 / (PI * PI)).sqrt() / (2.0 / PI);
        assert!((envelope_variation_index(&cosine) - expected).abs() < 1e-3);
    }

    #[test]
    fn test_labels() {
        assert_eq!(ModulationClass::Am.to_string(), "AM");
        assert_eq!(
            ModulationClass::CwNoise.label(),
            "CW / noise, no clear modulation"
        );
        assert_eq!(
            ModulationClass::FmPhaseShift.label(),
            "FM / phase-shift (carrier)"
        );
    }
}
