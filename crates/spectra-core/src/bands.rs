//! Avionics frequency plan
//!
//! Static VHF/UHF allocation table (ICAO/NATO) used to put a name on a
//! frequency of interest. Single-frequency services have `min == max`.
//!
//! ```text
//!  108      118     137   156  174  225          400      960  1030 1090  1215   1575.42 MHz
//!   |-NAV---|--COM---|     |MAR|    |----UHF MIL--|        |----DME----|          GPS L1
//!                                                               SSR  ADS-B
//! ```

use serde::Serialize;
use std::fmt;

/// Service category of a band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BandCategory {
    Navigation,
    Communication,
    Maritime,
    Military,
    Surveillance,
    Safety,
}

impl BandCategory {
    pub fn name(&self) -> &'static str {
        match self {
            BandCategory::Navigation => "navigation",
            BandCategory::Communication => "communication",
            BandCategory::Maritime => "maritime",
            BandCategory::Military => "military",
            BandCategory::Surveillance => "surveillance",
            BandCategory::Safety => "safety",
        }
    }
}

impl fmt::Display for BandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One allocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub name: &'static str,
    /// Lower edge in MHz
    pub freq_min_mhz: f64,
    /// Upper edge in MHz
    pub freq_max_mhz: f64,
    pub category: BandCategory,
    pub protocols: &'static [&'static str],
    pub use_case: &'static str,
}

impl Band {
    /// Whether `freq_hz` lies inside the band, edges included
    pub fn contains(&self, freq_hz: f64) -> bool {
        let mhz = freq_hz / 1e6;
        mhz >= self.freq_min_mhz && mhz <= self.freq_max_mhz
    }

    /// Whether the band shares any frequency with `[start_hz, end_hz]`
    pub fn overlaps(&self, start_hz: f64, end_hz: f64) -> bool {
        let (lo, hi) = if start_hz <= end_hz {
            (start_hz, end_hz)
        } else {
            (end_hz, start_hz)
        };
        lo / 1e6 <= self.freq_max_mhz && hi / 1e6 >= self.freq_min_mhz
    }

    /// Width in MHz; zero for single-frequency services
    pub fn width_mhz(&self) -> f64 {
        self.freq_max_mhz - self.freq_min_mhz
    }
}

/// The allocation table, ordered by lower edge
pub const AVIONICS_BANDS: &[Band] = &[
    Band {
        name: "VHF NAV (VOR/ILS)",
        freq_min_mhz: 108.0,
        freq_max_mhz: 117.975,
        category: BandCategory::Navigation,
        protocols: &["VOR", "ILS LOC", "ILS GS"],
        use_case: "Radio navigation, 50 kHz channel spacing",
    },
    Band {
        name: "VHF COM",
        freq_min_mhz: 118.0,
        freq_max_mhz: 136.975,
        category: BandCategory::Communication,
        protocols: &["AM Voice", "VDL Mode 2/3/4"],
        use_case: "Pilot/ATC voice, 25 kHz (8.33 kHz in Europe) spacing",
    },
    Band {
        name: "VHF Maritime",
        freq_min_mhz: 156.0,
        freq_max_mhz: 174.0,
        category: BandCategory::Maritime,
        protocols: &["FM Voice", "DSC"],
        use_case: "Ship and coast radio, distress on 156.8 MHz",
    },
    Band {
        name: "UHF MIL",
        freq_min_mhz: 225.0,
        freq_max_mhz: 400.0,
        category: BandCategory::Military,
        protocols: &["AM Voice", "SATURN", "HAVE QUICK II"],
        use_case: "Military air communication, frequency hopping",
    },
    Band {
        name: "DME",
        freq_min_mhz: 960.0,
        freq_max_mhz: 1215.0,
        category: BandCategory::Navigation,
        protocols: &["DME Pulse"],
        use_case: "Slant range to a ground station",
    },
    Band {
        name: "ATC Transponder (Mode A/C/S)",
        freq_min_mhz: 1030.0,
        freq_max_mhz: 1030.0,
        category: BandCategory::Surveillance,
        protocols: &["Mode A/C", "Mode S"],
        use_case: "Secondary surveillance radar interrogation",
    },
    Band {
        name: "TCAS",
        freq_min_mhz: 1030.0,
        freq_max_mhz: 1090.0,
        category: BandCategory::Safety,
        protocols: &["Mode S", "ACAS"],
        use_case: "Airborne collision avoidance",
    },
    Band {
        name: "ADS-B / Mode S",
        freq_min_mhz: 1090.0,
        freq_max_mhz: 1090.0,
        category: BandCategory::Surveillance,
        protocols: &["Mode S Extended Squitter", "ADS-B", "TIS-B", "FIS-B"],
        use_case: "Broadcast position reports",
    },
    Band {
        name: "GPS L1",
        freq_min_mhz: 1575.42,
        freq_max_mhz: 1575.42,
        category: BandCategory::Navigation,
        protocols: &["C/A Code", "P(Y) Code", "M-Code"],
        use_case: "Satellite positioning",
    },
];

/// Bands containing `freq_hz`
pub fn bands_at(freq_hz: f64) -> Vec<&'static Band> {
    AVIONICS_BANDS.iter().filter(|b| b.contains(freq_hz)).collect()
}

/// Bands sharing any frequency with `[start_hz, end_hz]`
pub fn bands_overlapping(start_hz: f64, end_hz: f64) -> Vec<&'static Band> {
    AVIONICS_BANDS
        .iter()
        .filter(|b| b.overlaps(start_hz, end_hz))
        .collect()
}

/// Format bands as a text table
pub fn bands_to_text(bands: &[&Band]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<30} {:>20}  {:<14} {}\n",
        "Band", "Range (MHz)", "Category", "Protocols"
    ));
    output.push_str(&"─".repeat(90));
    output.push('\n');
    for band in bands {
        let range = if band.width_mhz() == 0.0 {
            format!("{}", band.freq_min_mhz)
        } else {
            format!("{} - {}", band.freq_min_mhz, band.freq_max_mhz)
        };
        output.push_str(&format!(
            "{:<30} {:>20}  {:<14} {}\n",
            band.name,
            range,
            band.category,
            band.protocols.join(", ")
        ));
    }
    output
}
