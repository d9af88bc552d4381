use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framesnap::{
    DEFAULT_BATCH_SIZE, DEFAULT_QUALITY, ExtractOptions, ExtractionOutcome, ExtractionRequest,
    FfmpegFrameDecoder, FfmpegLogLevel, FrameExtractor, FrameImageFormat, ProgressCallback,
    ProgressEvent, ProgressStage, SamplingMode,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framesnap extract input.mp4 --fps 2 --progress\n  framesnap extract input.mov --dense --out ~/Pictures/frames --json\n  framesnap plan 00:01:30 --fps 0.5\n  framesnap completions zsh > _framesnap";

/// Sampling rate used when neither `--fps` nor `--dense` is given.
const DEFAULT_FPS: f64 = 1.0;

#[derive(Debug, Parser)]
#[command(
    name = "framesnap",
    version,
    about = "Extract still frames from a video into a numbered image folder",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Print every progress message.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar.
    #[arg(long, global = true)]
    progress: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<FfmpegLogLevel>,
}

#[derive(Debug, Parser, Clone)]
struct SamplingArgs {
    /// Frames to capture per second of video.
    #[arg(long, conflicts_with = "dense")]
    fps: Option<f64>,

    /// Capture at the fixed dense rate (30 per second).
    #[arg(long)]
    dense: bool,

    /// Timestamps handed to the decoder per batch.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
}

impl SamplingArgs {
    fn mode(&self) -> SamplingMode {
        if self.dense {
            SamplingMode::Dense
        } else {
            SamplingMode::Rate(self.fps.unwrap_or(DEFAULT_FPS))
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract frames into a new folder.
    #[command(
        about = "Extract video frames",
        after_help = "Examples:\n  framesnap extract input.mp4 --fps 2\n  framesnap extract input.mp4 --dense --format jpg --quality 0.8"
    )]
    Extract {
        /// Input video path or file:// URL.
        input: String,

        #[command(flatten)]
        sampling: SamplingArgs,

        /// Video duration (seconds or [hh:]mm:ss); probed from the file when omitted.
        #[arg(long)]
        duration: Option<String>,

        /// Directory under which the per-run folder is created.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output quality in (0, 1].
        #[arg(long, default_value_t = DEFAULT_QUALITY)]
        quality: f64,

        /// Output image format (png, jpg).
        #[arg(long, default_value_t = FrameImageFormat::Png)]
        format: FrameImageFormat,

        /// Print the outcome as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the planned timestamps without decoding anything.
    #[command(
        about = "Show the capture plan",
        after_help = "Examples:\n  framesnap plan 12.5 --fps 2\n  framesnap plan 00:00:03 --dense --json"
    )]
    Plan {
        /// Video duration (seconds or [hh:]mm:ss).
        duration: String,

        #[command(flatten)]
        sampling: SamplingArgs,

        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_timecode(value: &str) -> Result<Duration, Box<dyn std::error::Error>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("time value cannot be empty".into());
    }

    if let Ok(seconds) = trimmed.parse::<f64>() {
        return seconds_to_duration(seconds, trimmed);
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [minutes, seconds] => (0, minutes.parse::<u64>()?, seconds.parse::<f64>()?),
        [hours, minutes, seconds] => (
            hours.parse::<u64>()?,
            minutes.parse::<u64>()?,
            seconds.parse::<f64>()?,
        ),
        _ => return Err(format!("invalid time format: {trimmed}").into()),
    };

    let total_seconds = (hours as f64 * 3600.0) + (minutes as f64 * 60.0) + seconds;
    seconds_to_duration(total_seconds, trimmed)
}

/// Negative, non-finite, and out-of-range values are errors, not panics.
fn seconds_to_duration(
    seconds: f64,
    original: &str,
) -> Result<Duration, Box<dyn std::error::Error>> {
    Duration::try_from_secs_f64(seconds)
        .map_err(|error| format!("invalid duration {original}: {error}").into())
}

/// Progress bar driven by extraction events.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        match event.stage {
            ProgressStage::Preparing => self.bar.set_length(event.planned),
            _ => self.bar.set_position(event.extracted),
        }
        self.bar.set_message(event.to_string());
        if let Some(error) = &event.batch_error {
            self.bar.println(format!(
                "{} batch {}/{} failed: {error}",
                "warning:".yellow().bold(),
                event.batches_done,
                event.batch_count,
            ));
        }
        if event.batch_count == event.batches_done && event.stage != ProgressStage::Preparing {
            self.bar.finish_with_message("done");
        }
    }
}

/// Plain stderr lines, one per event when verbose; batch failures always.
struct LineProgress {
    verbose: bool,
}

impl ProgressCallback for LineProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        if self.verbose {
            eprintln!("{} {event}", "progress".cyan().bold());
        }
        if let Some(error) = &event.batch_error {
            eprintln!(
                "{} batch {}/{} failed: {error}",
                "warning:".yellow().bold(),
                event.batches_done,
                event.batch_count,
            );
        }
    }
}

fn progress_callback(
    global: &GlobalOptions,
) -> Result<Arc<dyn ProgressCallback>, Box<dyn std::error::Error>> {
    if global.progress {
        Ok(Arc::new(BarProgress::new()?))
    } else {
        Ok(Arc::new(LineProgress {
            verbose: global.verbose,
        }))
    }
}

fn print_outcome(
    outcome: &ExtractionOutcome,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);
        return Ok(());
    }

    if outcome.succeeded {
        println!(
            "{} {}",
            "success:".green().bold(),
            format!(
                "Extracted {} / {} frame(s) to {}",
                outcome.extracted_count,
                outcome.planned_count,
                outcome.output_directory.display()
            )
            .green()
        );
        if outcome.failed_batches > 0 {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("{} batch(es) failed", outcome.failed_batches).yellow()
            );
        }
    } else {
        let reason = outcome.error_message.as_deref().unwrap_or("unknown error");
        eprintln!("{} {reason}", "failed:".red().bold());
    }
    Ok(())
}

fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(level) = cli.global.log_level {
        framesnap::set_ffmpeg_log_level(level);
    }

    match cli.command {
        Commands::Extract {
            input,
            sampling,
            duration,
            out,
            quality,
            format,
            json,
        } => {
            let duration_seconds = match duration {
                Some(value) => parse_timecode(&value)?.as_secs_f64(),
                None => framesnap::probe_duration(&input)?,
            };

            if cli.global.verbose {
                eprintln!(
                    "{} {input}: {duration_seconds:.3}s at {} Hz",
                    "video".cyan().bold(),
                    sampling.mode().effective_rate()
                );
            }

            let mut options = ExtractOptions::new()
                .with_batch_size(sampling.batch_size)
                .with_quality(quality)
                .with_progress(progress_callback(&cli.global)?);
            if let Some(root) = out {
                options = options.with_output_root(root);
            }

            let extractor = FrameExtractor::new(FfmpegFrameDecoder::new().with_format(format))
                .with_options(options);
            let request = ExtractionRequest::new(input, duration_seconds, sampling.mode());
            let outcome = extractor.run(&request);

            print_outcome(&outcome, json)?;
            Ok(outcome.succeeded)
        }
        Commands::Plan {
            duration,
            sampling,
            json,
        } => {
            let duration_seconds = parse_timecode(&duration)?.as_secs_f64();
            let timestamps = framesnap::plan_timestamps(duration_seconds, sampling.mode())?;
            let batches: Vec<&[u64]> =
                framesnap::partition_batches(&timestamps, sampling.batch_size).collect();

            if json {
                let payload = json!({
                    "duration_seconds": duration_seconds,
                    "rate": sampling.mode().effective_rate(),
                    "frame_count": timestamps.len(),
                    "batch_count": batches.len(),
                    "timestamps_ms": timestamps,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "{} frames in {} batch(es) at {} Hz",
                    timestamps.len(),
                    batches.len(),
                    sampling.mode().effective_rate()
                );
                for (index, batch) in batches.iter().enumerate() {
                    let listed: Vec<String> = batch.iter().map(u64::to_string).collect();
                    println!("batch {:>4}: {} ms", index + 1, listed.join(", "));
                }
            }
            Ok(true)
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framesnap", &mut std::io::stdout());
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{} {error}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use framesnap::SamplingMode;

    use super::{Cli, Commands, parse_timecode};

    #[test]
    fn parse_timecode_formats() {
        let seconds = parse_timecode("75").unwrap();
        assert_eq!(seconds.as_secs(), 75);

        let mm_ss = parse_timecode("01:15").unwrap();
        assert_eq!(mm_ss.as_secs(), 75);

        let hh_mm_ss = parse_timecode("00:01:15.5").unwrap();
        assert_eq!(hh_mm_ss.as_millis(), 75_500);
    }

    #[test]
    fn parse_timecode_rejects_garbage() {
        assert!(parse_timecode("").is_err());
        assert!(parse_timecode("-3").is_err());
        assert!(parse_timecode("1:2:3:4").is_err());
        assert!(parse_timecode("abc").is_err());
    }

    #[test]
    fn parse_timecode_rejects_overflow() {
        assert!(parse_timecode("1e30").is_err());
        assert!(parse_timecode("inf").is_err());
        assert!(parse_timecode("NaN").is_err());
        assert!(parse_timecode("9000000000000000:00:00").is_err());
    }

    #[test]
    fn sampling_defaults_to_one_per_second() {
        let cli = Cli::try_parse_from(["framesnap", "plan", "3"]).unwrap();
        let Commands::Plan { sampling, .. } = cli.command else {
            panic!("expected plan command");
        };
        assert_eq!(sampling.mode(), SamplingMode::Rate(1.0));
        assert_eq!(sampling.batch_size, 10);
    }

    #[test]
    fn dense_flag_selects_dense_sampling() {
        let cli = Cli::try_parse_from(["framesnap", "plan", "3", "--dense"]).unwrap();
        let Commands::Plan { sampling, .. } = cli.command else {
            panic!("expected plan command");
        };
        assert_eq!(sampling.mode(), SamplingMode::Dense);
    }

    #[test]
    fn fps_and_dense_conflict() {
        let result = Cli::try_parse_from(["framesnap", "plan", "3", "--dense", "--fps", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn extract_parses_format_and_globals() {
        let cli = Cli::try_parse_from([
            "framesnap",
            "extract",
            "clip.mov",
            "--format",
            "jpg",
            "--duration",
            "4",
            "--progress",
            "--log-level",
            "error",
        ])
        .unwrap();
        assert!(cli.global.progress);
        assert!(cli.global.log_level.is_some());
        let Commands::Extract { format, duration, .. } = cli.command else {
            panic!("expected extract command");
        };
        assert_eq!(format, framesnap::FrameImageFormat::Jpeg);
        assert_eq!(duration.as_deref(), Some("4"));
    }
}
