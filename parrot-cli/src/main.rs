//! Parrot - record the microphone and play it back from one clip file.
//!
//! Entry point for the `parrot` binary.

mod app;
mod cli;

use std::sync::Arc;

use clap::Parser;
use log::info;

use parrot_core::{AudioConfig, Recorder};
use parrot_cpal::{CpalBackend, MicProbeGate};

use app::App;

fn main() {
    let args = cli::Args::parse();
    cli::init_logging(&args);

    if args.list_devices {
        app::print_devices();
        return;
    }

    let clip_path = args.clip_path();
    info!("clip file: {}", clip_path.display());

    let backend = CpalBackend::with_devices(args.input.clone(), args.output.clone());
    let mut recorder = match Recorder::new(backend, AudioConfig::default(), clip_path) {
        Ok(recorder) => recorder,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    recorder.set_gate(Arc::new(MicProbeGate));

    let mut app = App::new(recorder);
    if let Err(e) = app.run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
