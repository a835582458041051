mod analysis;
mod wav;

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use audio_descriptors_core::{
    AppConfig, FrequencyDescriptor, Result, TimeDescriptor, WindowKind,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::{
    analysis::{FrameAnalyzer, FrameReport},
    wav::ChannelSelection,
};

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_analyze(args),
        Commands::Catalogue => run_catalogue(),
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::default(),
    };
    args.apply_overrides(&mut config);

    let audio = wav::read_wav(&args.input, args.channel)?;
    config.engine.sample_rate = f64::from(audio.sample_rate);
    config.validate()?;

    tracing::info!(
        input = %args.input.display(),
        sample_rate = audio.sample_rate,
        channels = audio.channels,
        selection = %args.channel,
        frame_size = config.analysis.frame_size,
        hop_size = config.analysis.hop_size,
        window = %config.analysis.window,
        "analysing file"
    );

    let mut analyzer = FrameAnalyzer::new(&config.engine, config.analysis.clone())?;
    let frames = analyzer.analyze(&audio.samples)?;

    let report = AnalysisReport {
        input: args.input.display().to_string(),
        sample_rate: audio.sample_rate,
        duration_seconds: audio.duration_seconds(),
        frame_size: config.analysis.frame_size,
        hop_size: config.analysis.hop_size,
        window: config.analysis.window,
        rolloff_point: config.engine.rolloff_point,
        frames,
    };
    write_report(&report, args.output.as_deref())?;

    tracing::info!(frames = report.frames.len(), "analysis complete");
    Ok(())
}

fn run_catalogue() -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for descriptor in TimeDescriptor::ALL {
        writeln!(out, "time\t{descriptor}")?;
    }
    for descriptor in FrequencyDescriptor::ALL {
        writeln!(out, "frequency\t{descriptor}")?;
    }
    Ok(())
}

fn write_report(report: &AnalysisReport, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, report)?;
            writer.flush()?;
            tracing::info!(output = %path.display(), "wrote descriptor report");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, report)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Debug, Serialize)]
struct AnalysisReport {
    input: String,
    sample_rate: u32,
    duration_seconds: f64,
    frame_size: usize,
    hop_size: usize,
    window: WindowKind,
    rolloff_point: f64,
    frames: Vec<FrameReport>,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Scalar audio descriptors for WAV files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute time and frequency descriptors for every frame of a WAV file.
    Analyze(AnalyzeArgs),
    /// List the descriptor names the engine produces.
    Catalogue,
}

#[derive(clap::Args, Debug)]
struct AnalyzeArgs {
    /// WAV file to analyse.
    input: PathBuf,
    /// Write the JSON report here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// JSON configuration file; command line flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    frame_size: Option<usize>,
    #[arg(long)]
    hop_size: Option<usize>,
    /// Analysis window: hann, hamming or rectangular.
    #[arg(long)]
    window: Option<WindowKind>,
    /// Fraction of spectral energy below the rolloff frequency.
    #[arg(long)]
    rolloff: Option<f64>,
    /// Zero-based channel index, or "downmix".
    #[arg(long, default_value_t = ChannelSelection::Downmix)]
    channel: ChannelSelection,
}

impl AnalyzeArgs {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(frame_size) = self.frame_size {
            config.analysis.frame_size = frame_size;
        }
        if let Some(hop_size) = self.hop_size {
            config.analysis.hop_size = hop_size;
        }
        if let Some(window) = self.window {
            config.analysis.window = window;
        }
        if let Some(rolloff) = self.rolloff {
            config.engine.rolloff_point = rolloff;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_flags() {
        let cli = Cli::try_parse_from([
            "audio-descriptors",
            "analyze",
            "song.wav",
            "--frame-size",
            "1024",
            "--window",
            "hamming",
            "--rolloff",
            "0.9",
            "--channel",
            "1",
        ])
        .unwrap();

        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.channel, ChannelSelection::Channel(1));

        let mut config = AppConfig::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.analysis.frame_size, 1024);
        assert_eq!(config.analysis.hop_size, AppConfig::default().analysis.hop_size);
        assert_eq!(config.analysis.window, WindowKind::Hamming);
        assert_eq!(config.engine.rolloff_point, 0.9);
    }

    #[test]
    fn channel_defaults_to_downmix() {
        let cli = Cli::try_parse_from(["audio-descriptors", "analyze", "song.wav"]).unwrap();
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.channel, ChannelSelection::Downmix);
        assert!(args.output.is_none());
    }

    #[test]
    fn rejects_unknown_window() {
        assert!(Cli::try_parse_from([
            "audio-descriptors",
            "analyze",
            "song.wav",
            "--window",
            "triangle",
        ])
        .is_err());
    }
}
