//! Spectrum Analyzer Command-Line Interface
//!
//! This CLI provides tools for:
//! - Analyzing captured sample files (spectrum, waterfall, metrics, anomalies)
//! - Running the built-in demo scenarios
//! - Streaming synthetic live spectra as JSON lines
//! - Listing the avionics frequency plan
//! - Generating shell completions

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use serde::Serialize;
use spectra_core::analysis::{
    compute_waterfall, PowerSpectrum, SignalMetrics, Waterfall, WindowFunction,
};
use spectra_core::anomaly::{AnomalyDetector, AnomalyReport};
use spectra_core::bands::{bands_at, bands_overlapping, bands_to_text, Band, AVIONICS_BANDS};
use spectra_core::config::SpectraConfig;
use spectra_core::io::{parse_csv_samples, read_f32_samples, write_f32_samples};
use spectra_core::pipeline::SpectrumPipeline;
use spectra_sim::scenario::ScenarioKind;
use spectra_sim::stream::{LiveFrame, LiveSignalSource};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spectra")]
#[command(author, version, about = "Spectrum analyzer and interference detector", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (overrides the search path)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Spectrum settings shared by `analyze` and `demo`
#[derive(clap::Args, Debug, Clone)]
struct AnalysisOptions {
    /// Analysis mode: full, spectrum, waterfall, metrics, anomalies
    #[arg(long, default_value = "full")]
    mode: String,

    /// Output format: text, json, csv, ascii
    #[arg(long, short = 'o', default_value = "text")]
    output_format: String,

    /// Output file (stdout if not specified)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Window function: hann, hamming, blackman, rect
    #[arg(long)]
    window: Option<String>,

    /// FFT size (512, 1024, 2048, 4096)
    #[arg(long)]
    fft_size: Option<usize>,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Number of anomaly slices
    #[arg(long)]
    slices: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a sample file
    Analyze {
        /// Input file with real-valued samples
        #[arg(short, long)]
        input: PathBuf,

        /// Input format: auto, csv, f32
        #[arg(long, default_value = "auto")]
        format: String,

        /// Number of samples to analyze (0 = all)
        #[arg(long, default_value = "0")]
        samples: usize,

        #[command(flatten)]
        options: AnalysisOptions,
    },

    /// Analyze one of the built-in demo signals
    Demo {
        /// Scenario: spectrum, signal, interference
        #[arg(long, default_value = "interference")]
        scenario: String,

        /// Noise seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Also write the generated samples as raw f32
        #[arg(long)]
        save_samples: Option<PathBuf>,

        #[command(flatten)]
        options: AnalysisOptions,
    },

    /// Stream synthetic live spectra as JSON lines
    Stream {
        /// Stop after this many frames (runs until interrupted if omitted)
        #[arg(long)]
        frames: Option<u64>,

        /// Publish interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Carrier frequency in Hz
        #[arg(long)]
        carrier_freq: Option<f64>,

        /// Noise standard deviation
        #[arg(long)]
        noise_level: Option<f64>,

        /// Noise seed (entropy if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Run metrics and anomaly detection on every frame
        #[arg(long)]
        analyze: bool,
    },

    /// List avionics frequency bands
    Bands {
        /// Only bands containing this frequency (MHz)
        #[arg(long, conflicts_with_all = ["from", "to"])]
        at: Option<f64>,

        /// Lower edge of a frequency window (MHz)
        #[arg(long, requires = "to")]
        from: Option<f64>,

        /// Upper edge of a frequency window (MHz)
        #[arg(long, requires = "from")]
        to: Option<f64>,

        /// Output format: text, json
        #[arg(short = 'o', long = "output-format", default_value = "text")]
        output_format: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn load_config(path: Option<&Path>) -> Result<SpectraConfig> {
    let config = match path {
        Some(path) => SpectraConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => SpectraConfig::load().context("Failed to load config")?,
    };
    Ok(config)
}

fn apply_overrides(config: &mut SpectraConfig, options: &AnalysisOptions) -> Result<()> {
    if let Some(name) = &options.window {
        config.spectrum.window = WindowFunction::from_str(name).unwrap_or_else(|| {
            warn!(window = %name, "unknown window function, using hann");
            WindowFunction::Hann
        });
    }
    if let Some(fft_size) = options.fft_size {
        config.spectrum.fft_size = fft_size;
    }
    if let Some(sample_rate) = options.sample_rate {
        config.spectrum.sample_rate = sample_rate;
    }
    if let Some(slices) = options.slices {
        config.anomaly.n_slices = slices;
    }
    config.validate().context("Invalid analysis settings")?;
    Ok(())
}

fn read_input(path: &Path, format: &str) -> Result<Vec<f64>> {
    let format = match format {
        "auto" => match path.extension().and_then(|e| e.to_str()) {
            Some("csv") | Some("txt") => "csv",
            _ => "f32",
        },
        other => other,
    };

    match format {
        "csv" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file {:?}", path))?;
            Ok(parse_csv_samples(&text)?)
        }
        "f32" => {
            let file = File::open(path).context("Failed to open input file")?;
            Ok(read_f32_samples(BufReader::new(file))?)
        }
        other => bail!("Unknown input format: '{}'. Use: auto, csv, f32", other),
    }
}

fn emit(text: &str, output: Option<&Path>, what: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("Failed to write {:?}", path))?;
            println!("{} written to {:?}", what, path);
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

fn format_spectrum(spectrum: &PowerSpectrum, output_format: &str) -> Result<String> {
    Ok(match output_format {
        "json" => to_json(spectrum)?,
        "csv" => spectrum.to_csv(),
        "ascii" => spectrum.to_ascii(80, 20),
        _ => spectrum.to_text(),
    })
}

fn format_waterfall(waterfall: &Waterfall, output_format: &str) -> Result<String> {
    Ok(match output_format {
        "json" => to_json(waterfall)?,
        _ => waterfall.to_ascii(80, 40),
    })
}

fn format_metrics(metrics: &SignalMetrics, output_format: &str) -> Result<String> {
    Ok(match output_format {
        "json" => to_json(metrics)?,
        _ => metrics.to_text(),
    })
}

fn format_anomalies(report: &AnomalyReport, output_format: &str) -> Result<String> {
    Ok(match output_format {
        "json" => to_json(report)?,
        "csv" => {
            let mut csv = String::from("start_hz,end_hz,score\n");
            for range in &report.ranges {
                csv.push_str(&format!("{},{},{}\n", range.start_freq, range.end_freq, range.score));
            }
            csv
        }
        _ => report.to_text(),
    })
}

fn run_analysis(samples: &[f64], config: SpectraConfig, options: &AnalysisOptions) -> Result<()> {
    let output = options.output.as_deref();
    let output_format = options.output_format.as_str();
    let pipeline = SpectrumPipeline::from_config(config);
    let sample_rate = pipeline.config().spectrum.sample_rate;

    match options.mode.as_str() {
        "full" => {
            let report = pipeline.analyze(samples)?;
            let text = match output_format {
                "json" => report.to_json()?,
                "csv" => report.spectrum.to_csv(),
                "ascii" => {
                    let mut text = report.spectrum.to_ascii(80, 20);
                    if let Some(waterfall) = &report.waterfall {
                        text.push('\n');
                        text.push_str(&waterfall.to_ascii(80, 40));
                    }
                    text.push('\n');
                    text.push_str(&report.metrics.to_text());
                    text.push('\n');
                    text.push_str(&report.anomalies.to_text());
                    text
                }
                _ => report.to_text(),
            };
            emit(&text, output, "Report")
        }

        "spectrum" => {
            let spectrum = pipeline.spectrum(samples)?;
            emit(&format_spectrum(&spectrum, output_format)?, output, "Spectrum")
        }

        "waterfall" => {
            let settings = &pipeline.config().waterfall;
            let waterfall =
                compute_waterfall(samples, sample_rate, settings.slice_size, settings.n_slices)?;
            emit(&format_waterfall(&waterfall, output_format)?, output, "Waterfall")
        }

        "metrics" => {
            let spectrum = pipeline.spectrum(samples)?;
            let metrics = SignalMetrics::compute(&spectrum, samples)?;
            emit(&format_metrics(&metrics, output_format)?, output, "Metrics")
        }

        "anomalies" => {
            let spectrum = pipeline.spectrum(samples)?;
            let report = pipeline.detect_anomalies(&spectrum)?;
            emit(&format_anomalies(&report, output_format)?, output, "Anomaly report")
        }

        _ => {
            bail!(
                "Unknown analysis mode: '{}'. Use: full, spectrum, waterfall, metrics, anomalies",
                options.mode
            );
        }
    }
}

fn cmd_analyze(
    config_path: Option<&Path>,
    input: PathBuf,
    format: String,
    samples: usize,
    options: AnalysisOptions,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, &options)?;

    let data = read_input(&input, &format)?;
    let count = if samples == 0 {
        data.len()
    } else {
        samples.min(data.len())
    };
    info!(file = ?input, total = data.len(), analyzing = count, "samples loaded");

    run_analysis(&data[..count], config, &options)
}

fn cmd_demo(
    config_path: Option<&Path>,
    scenario: String,
    seed: u64,
    save_samples: Option<PathBuf>,
    options: AnalysisOptions,
) -> Result<()> {
    let kind = match scenario.as_str() {
        "spectrum" => ScenarioKind::Spectrum,
        "signal" => ScenarioKind::Signal,
        "interference" => ScenarioKind::Interference,
        other => bail!(
            "Unknown scenario: '{}'. Use: spectrum, signal, interference",
            other
        ),
    };

    let scenario = kind.scenario();
    let mut config = load_config(config_path)?;
    config.spectrum.sample_rate = scenario.sample_rate;
    apply_overrides(&mut config, &options)?;

    let samples = scenario.generate(seed);
    info!(scenario = %kind, seed, samples = samples.len(), "demo signal generated");

    if let Some(path) = save_samples {
        let file = File::create(&path).context("Failed to create output file")?;
        write_f32_samples(BufWriter::new(file), &samples)?;
        println!("Samples written to {:?}", path);
    }

    run_analysis(&samples, config, &options)
}

/// One JSON line of the live stream
#[derive(Serialize)]
struct StreamRecord<'a> {
    #[serde(flatten)]
    frame: &'a LiveFrame,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<SignalMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    anomalies: Option<AnomalyReport>,
}

#[allow(clippy::too_many_arguments)]
fn cmd_stream(
    config_path: Option<&Path>,
    frames: Option<u64>,
    interval_ms: Option<u64>,
    carrier_freq: Option<f64>,
    noise_level: Option<f64>,
    seed: Option<u64>,
    analyze: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(interval_ms) = interval_ms {
        config.stream.interval_ms = interval_ms;
    }
    if let Some(carrier_freq) = carrier_freq {
        config.stream.carrier_freq = carrier_freq;
    }
    if let Some(noise_level) = noise_level {
        config.stream.noise_level = noise_level;
    }
    config.validate().context("Invalid stream settings")?;

    let mut source = match seed {
        Some(seed) => LiveSignalSource::seeded(config.stream.clone(), seed),
        None => LiveSignalSource::new(config.stream.clone()),
    };

    let pipeline = if analyze {
        let detector = Arc::new(AnomalyDetector::new(config.anomaly.clone()));
        detector.fit()?;
        let mut pipeline_config = config.clone();
        pipeline_config.spectrum.sample_rate = source.sample_rate();
        Some(SpectrumPipeline::new(pipeline_config, detector))
    } else {
        None
    };

    let interval = Duration::from_millis(config.stream.interval_ms);
    info!(
        interval_ms = config.stream.interval_ms,
        carrier_hz = config.stream.carrier_freq,
        noise = config.stream.noise_level,
        "stream started"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut sent = 0u64;
    while frames.map_or(true, |limit| sent < limit) {
        let started = Instant::now();
        let frame = source.next_frame()?;

        let (metrics, anomalies) = match &pipeline {
            Some(pipeline) => {
                let spectrum = pipeline.spectrum(&frame.samples)?;
                let metrics = SignalMetrics::compute(&spectrum, &frame.samples)?;
                let anomalies = pipeline.detect_anomalies(&spectrum)?;
                (Some(metrics), Some(anomalies))
            }
            None => (None, None),
        };

        let record = StreamRecord {
            frame: &frame,
            metrics,
            anomalies,
        };
        let line = serde_json::to_string(&record).context("Failed to serialize frame")?;
        writeln!(out, "{}", line).context("Failed to write frame")?;
        out.flush()?;
        sent += 1;

        if frames.map_or(true, |limit| sent < limit) {
            if let Some(remaining) = interval.checked_sub(started.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }

    info!(frames = sent, "stream finished");
    Ok(())
}

fn select_bands(at: Option<f64>, window: Option<(f64, f64)>) -> Vec<&'static Band> {
    match (at, window) {
        (Some(mhz), _) => bands_at(mhz * 1e6),
        (None, Some((low, high))) => bands_overlapping(low * 1e6, high * 1e6),
        (None, None) => AVIONICS_BANDS.iter().collect(),
    }
}

fn cmd_bands(at: Option<f64>, window: Option<(f64, f64)>, output_format: &str) -> Result<()> {
    let bands = select_bands(at, window);
    if bands.is_empty() {
        info!("no avionics band matches the requested frequencies");
    }
    let text = match output_format {
        "json" => to_json(&bands)?,
        _ => bands_to_text(&bands),
    };
    println!("{}", text);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Analyze {
            input,
            format,
            samples,
            options,
        } => cmd_analyze(config_path, input, format, samples, options),

        Commands::Demo {
            scenario,
            seed,
            save_samples,
            options,
        } => cmd_demo(config_path, scenario, seed, save_samples, options),

        Commands::Stream {
            frames,
            interval_ms,
            carrier_freq,
            noise_level,
            seed,
            analyze,
        } => cmd_stream(
            config_path,
            frames,
            interval_ms,
            carrier_freq,
            noise_level,
            seed,
            analyze,
        ),

        Commands::Bands {
            at,
            from,
            to,
            output_format,
        } => cmd_bands(at, from.zip(to), &output_format),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(mode: &str) -> AnalysisOptions {
        AnalysisOptions {
            mode: mode.to_string(),
            output_format: "text".to_string(),
            output: None,
            window: None,
            fft_size: None,
            sample_rate: None,
            slices: None,
        }
    }

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();

        let cli = Cli::parse_from([
            "spectra", "-vv", "analyze", "-i", "capture.csv", "--mode", "metrics", "--fft-size",
            "1024",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Analyze { input, options, .. } => {
                assert_eq!(input, PathBuf::from("capture.csv"));
                assert_eq!(options.mode, "metrics");
                assert_eq!(options.fft_size, Some(1024));
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_unknown_window_falls_back_to_hann() {
        let mut config = SpectraConfig::default();
        config.spectrum.window = WindowFunction::Blackman;
        let mut opts = options("full");
        opts.window = Some("kaiser".to_string());
        apply_overrides(&mut config, &opts).unwrap();
        assert_eq!(config.spectrum.window, WindowFunction::Hann);
    }

    #[test]
    fn test_invalid_fft_size_rejected() {
        let mut config = SpectraConfig::default();
        let mut opts = options("full");
        opts.fft_size = Some(1000);
        assert!(apply_overrides(&mut config, &opts).is_err());
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let samples = vec![0.0; 1024];
        assert!(run_analysis(&samples, SpectraConfig::default(), &options("peaks")).is_err());
    }

    #[test]
    fn test_stream_record_flattens_frame() {
        let mut source = LiveSignalSource::seeded(Default::default(), 5);
        let frame = source.next_frame().unwrap();
        let record = StreamRecord {
            frame: &frame,
            metrics: None,
            anomalies: None,
        };
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["index"], 0);
        assert!(json["freqs"].is_array());
        assert!(json.get("metrics").is_none());
    }

    #[test]
    fn test_band_selection() {
        let cli = Cli::parse_from(["spectra", "bands", "--from", "118", "--to", "160"]);
        match cli.command {
            Commands::Bands { at, from, to, .. } => {
                assert_eq!(at, None);
                let names: Vec<&str> = select_bands(at, from.zip(to)).iter().map(|b| b.name).collect();
                assert_eq!(names, vec!["VHF COM", "VHF Maritime"]);
            }
            _ => panic!("expected bands"),
        }

        assert_eq!(select_bands(Some(1090.0), None).len(), 3);
        assert_eq!(select_bands(None, None).len(), AVIONICS_BANDS.len());
        assert!(Cli::try_parse_from(["spectra", "bands", "--at", "121.5", "--from", "100"]).is_err());
    }
}
