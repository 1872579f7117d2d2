//! motiontrace CLI: command-line interface for motion analysis and export.
//!
//! Usage:
//!   motiontrace analyze <POSES>      Classify a pose stream into motion labels
//!   motiontrace info <POSES>         Show pose stream information
//!   motiontrace validate <POSES>     Check a pose stream and thresholds
//!   motiontrace reference <CSV>      Build a label track from a reference CSV
//!   motiontrace export <VIDEO>       Burn a label track into a video
//!   motiontrace config init|show     Manage the config file

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use motiontrace_common::config::ThresholdConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "motiontrace",
    about = "Motion classification from pose skeletons",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Per-run threshold overrides.
#[derive(Args, Debug, Default, Clone)]
pub struct ThresholdArgs {
    /// Hip depth change for Advancing / Retreating
    #[arg(long)]
    hip: Option<f64>,

    /// Wrist separation change for Enclosing / Spreading
    #[arg(long)]
    wrist: Option<f64>,

    /// Wrist separation for Directing
    #[arg(long)]
    directing: Option<f64>,

    /// Wrist velocity for Indirecting
    #[arg(long)]
    indirecting: Option<f64>,

    /// Wrist velocity ceiling for Gliding
    #[arg(long)]
    gliding: Option<f64>,

    /// Wrist velocity for Punching
    #[arg(long)]
    punching: Option<f64>,

    /// Wrist velocity floor for Dabbing
    #[arg(long)]
    dabbing: Option<f64>,

    /// Wrist velocity floor for Flicking
    #[arg(long)]
    flicking: Option<f64>,

    /// Wrist velocity for Slashing
    #[arg(long)]
    slashing: Option<f64>,

    /// Wrist velocity for Wringing
    #[arg(long)]
    wringing: Option<f64>,

    /// Wrist velocity for Pressing
    #[arg(long)]
    pressing: Option<f64>,
}

impl ThresholdArgs {
    /// Overwrite configured thresholds with any values given on the command line.
    pub fn apply(&self, thresholds: &mut ThresholdConfig) {
        let overrides = [
            ("hip", self.hip),
            ("wrist", self.wrist),
            ("directing", self.directing),
            ("indirecting", self.indirecting),
            ("gliding", self.gliding),
            ("punching", self.punching),
            ("dabbing", self.dabbing),
            ("flicking", self.flicking),
            ("slashing", self.slashing),
            ("wringing", self.wringing),
            ("pressing", self.pressing),
        ];
        for (name, value) in overrides {
            if let (Some(value), Some(slot)) = (value, thresholds.get_mut(name)) {
                *slot = value;
            }
        }
    }
}

/// Label track format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Vtt,
}

impl SubtitleFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Vtt => "vtt",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a pose stream and write the activity log
    Analyze {
        /// Path to the pose stream (JSONL)
        path: PathBuf,

        /// Output directory (defaults to the configured output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Frame rate, overriding the stream header
        #[arg(long)]
        fps: Option<f64>,

        /// Skip writing the per-frame overlay track
        #[arg(long)]
        no_overlay: bool,

        /// Label track format
        #[arg(long, value_enum, default_value = "srt")]
        subtitles: SubtitleFormat,

        #[command(flatten)]
        thresholds: ThresholdArgs,
    },

    /// Show pose stream information
    Info {
        /// Path to the pose stream (JSONL)
        path: PathBuf,
    },

    /// Check a pose stream and the configured thresholds
    Validate {
        /// Path to the pose stream (JSONL)
        path: PathBuf,

        #[command(flatten)]
        thresholds: ThresholdArgs,
    },

    /// Build a label track from a reference CSV
    Reference {
        /// Path to the reference CSV
        path: PathBuf,

        /// Frame rate of the video the track is for
        #[arg(long)]
        fps: f64,

        /// Number of frames in the video
        #[arg(long)]
        frames: u64,

        /// Output label track (.srt or .vtt)
        #[arg(short, long, default_value = "reference.srt")]
        output: PathBuf,
    },

    /// Burn a label track into a video with ffmpeg
    Export {
        /// Source video
        video: PathBuf,

        /// Label track (.srt or .vtt)
        #[arg(long)]
        labels: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = commands::load_config(cli.config.as_deref())?;

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if cli.log_json {
        logging.json = true;
    }
    motiontrace_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Analyze {
            path,
            output,
            fps,
            no_overlay,
            subtitles,
            thresholds,
        } => {
            commands::analyze::run(
                commands::analyze::AnalyzeArgs {
                    path,
                    output,
                    fps,
                    overlay: !no_overlay,
                    subtitles,
                    thresholds,
                },
                config,
            )
            .await
        }
        Commands::Info { path } => commands::info::run(path),
        Commands::Validate { path, thresholds } => {
            commands::validate::run(path, thresholds, config)
        }
        Commands::Reference {
            path,
            fps,
            frames,
            output,
        } => commands::reference::run(path, fps, frames, output),
        Commands::Export {
            video,
            labels,
            output,
        } => commands::export::run(video, labels, output, config).await,
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => commands::config::init(cli.config, force),
            ConfigAction::Show => commands::config::show(cli.config.as_deref(), &config),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_threshold_overrides() {
        let cli = Cli::parse_from([
            "motiontrace",
            "analyze",
            "poses.jsonl",
            "--punching",
            "0.08",
            "--hip",
            "0.002",
        ]);
        let Commands::Analyze { thresholds, .. } = cli.command else {
            panic!("expected analyze");
        };

        let mut config = ThresholdConfig::default();
        thresholds.apply(&mut config);
        assert_eq!(config.punching, 0.08);
        assert_eq!(config.hip, 0.002);
        assert_eq!(config.wrist, ThresholdConfig::default().wrist);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["motiontrace", "info", "poses.jsonl", "--verbose", "--log-json"]);
        assert!(cli.verbose);
        assert!(cli.log_json);
    }
}
