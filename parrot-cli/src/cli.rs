//! Command-line interface for Parrot
//!
//! Argument parsing and logging setup.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

/// Parrot - record the microphone, play it back
#[derive(Parser, Debug)]
#[command(name = "parrot")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Clip file to record into and play from
    #[arg(short, long)]
    pub clip: Option<PathBuf>,

    /// Capture device name (default: system default input)
    #[arg(long)]
    pub input: Option<String>,

    /// Playback device name (default: system default output)
    #[arg(long)]
    pub output: Option<String>,

    /// List audio devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Increase logging verbosity
    /// -v = info, -vv = debug, -vvv = trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Log level implied by the verbosity flags.
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else {
            match self.verbose {
                0 => LevelFilter::Warn,
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }

    /// The clip file to use, defaulting under the local data directory.
    pub fn clip_path(&self) -> PathBuf {
        self.clip.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("parrot")
                .join("clip.pcm")
        })
    }
}

/// Initialize logging per the CLI flags.
pub fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();

    // Foreign crates stay at warn; audio hosts can be chatty.
    builder.filter_level(LevelFilter::Warn);

    // Our crates follow the requested verbosity.
    builder.filter_module("parrot", args.log_level());
    builder.filter_module("parrot_core", args.log_level());
    builder.filter_module("parrot_cpal", args.log_level());

    builder.format_timestamp_millis().init();
}
