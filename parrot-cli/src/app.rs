//! Interactive transport loop reading commands from stdin.

use std::io::{self, BufRead, Write};
use std::path::Path;

use parrot_core::storage::read_sidecar;
use parrot_core::{
    AudioError, PlaybackOutcome, PlaybackSession, Recorder, RecordingOutcome, RecordingSession,
};
use parrot_cpal::CpalBackend;

/// One parsed line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Record,
    Stop,
    Play,
    Status,
    Devices,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "record" | "r" => Some(Self::Record),
            "stop" | "s" => Some(Self::Stop),
            "play" | "p" => Some(Self::Play),
            "status" | "st" => Some(Self::Status),
            "devices" | "d" => Some(Self::Devices),
            "help" | "h" | "?" => Some(Self::Help),
            "quit" | "q" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

pub struct App {
    recorder: Recorder<CpalBackend>,
    recording: Option<RecordingSession>,
    playing: Option<PlaybackSession>,
}

impl App {
    pub fn new(recorder: Recorder<CpalBackend>) -> Self {
        Self {
            recorder,
            recording: None,
            playing: None,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        print_help();
        let stdin = io::stdin();
        loop {
            print!("> ");
            io::stdout().flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break; // EOF
            }
            self.reap();

            let Some(command) = Command::parse(&line) else {
                if !line.trim().is_empty() {
                    println!("unknown command: {} (try 'help')", line.trim());
                }
                continue;
            };
            if !self.handle(command) {
                break;
            }
        }
        self.shutdown();
        Ok(())
    }

    /// Collect sessions whose worker has already finished, so their
    /// outcome or error gets printed instead of sitting unjoined.
    fn reap(&mut self) {
        if self.recording.as_ref().is_some_and(|s| !s.is_active()) {
            if let Some(session) = self.recording.take() {
                report_capture(self.recorder.clip_path(), session.finish());
            }
        }
        if self.playing.as_ref().is_some_and(|s| !s.is_active()) {
            if let Some(session) = self.playing.take() {
                report_playback(session.wait());
            }
        }
    }

    fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Record => match self.recorder.begin_capture() {
                Ok(session) => {
                    self.recording = Some(session);
                    println!("Recording");
                }
                Err(e) => report_refusal(&e),
            },
            Command::Play => match self.recorder.begin_playback() {
                Ok(session) => {
                    self.playing = Some(session);
                    println!("Playing");
                }
                Err(e) => report_refusal(&e),
            },
            Command::Stop => self.stop(),
            Command::Status => self.status(),
            Command::Devices => print_devices(),
            Command::Help => print_help(),
            Command::Quit => return false,
        }
        true
    }

    fn stop(&mut self) {
        if let Some(session) = self.recording.take() {
            report_capture(self.recorder.clip_path(), session.finish());
        } else if let Some(session) = self.playing.take() {
            session.cancel();
            report_playback(session.wait());
        } else {
            println!("Nothing to stop");
        }
    }

    fn status(&self) {
        let transport = self.recorder.transport();
        println!(
            "{}",
            if transport.is_recording() {
                "Recording"
            } else {
                "Not Recording"
            }
        );
        println!(
            "{}",
            if transport.is_playing() {
                "Playing"
            } else {
                "Not Playing"
            }
        );
        if transport.is_idle() {
            if let Ok(outcome) = read_sidecar(self.recorder.clip_path()) {
                println!(
                    "Clip: {:.1}s, {} bytes, recorded {}",
                    outcome.duration_secs, outcome.bytes, outcome.recorded_at
                );
                println!("  sha256: {}", outcome.checksum);
            }
        }
    }

    fn shutdown(&mut self) {
        if let Some(session) = self.recording.take() {
            report_capture(self.recorder.clip_path(), session.finish());
        }
        if let Some(session) = self.playing.take() {
            session.cancel();
            report_playback(session.wait());
        }
    }
}

fn report_capture(path: &Path, result: Result<RecordingOutcome, AudioError>) {
    match result {
        Ok(outcome) => println!(
            "Recorded {:.1}s ({} bytes) to {}",
            outcome.duration_secs,
            outcome.bytes,
            path.display()
        ),
        Err(e) => eprintln!("recording failed: {}", e),
    }
}

fn report_playback(result: Result<PlaybackOutcome, AudioError>) {
    match result {
        Ok(outcome) if outcome.is_empty() => println!("Nothing recorded yet"),
        Ok(outcome) => println!(
            "Played {:.1}s ({} bytes)",
            outcome.duration_secs, outcome.bytes
        ),
        Err(e) => eprintln!("playback failed: {}", e),
    }
}

fn report_refusal(error: &AudioError) {
    eprintln!("error: {}", error);
}

pub fn print_devices() {
    match parrot_cpal::list_input_devices() {
        Ok(devices) if devices.is_empty() => println!("No capture devices"),
        Ok(devices) => {
            println!("Capture devices:");
            for device in devices {
                println!(
                    "  {}{}",
                    device.name,
                    if device.is_default { " (default)" } else { "" }
                );
            }
        }
        Err(e) => eprintln!("error: {}", e),
    }
    match parrot_cpal::list_output_devices() {
        Ok(devices) if devices.is_empty() => println!("No playback devices"),
        Ok(devices) => {
            println!("Playback devices:");
            for device in devices {
                println!(
                    "  {}{}",
                    device.name,
                    if device.is_default { " (default)" } else { "" }
                );
            }
        }
        Err(e) => eprintln!("error: {}", e),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  record (r)   start recording over the clip");
    println!("  stop (s)     stop recording or playback");
    println!("  play (p)     play the clip");
    println!("  status (st)  show transport state");
    println!("  devices (d)  list audio devices");
    println!("  help (h)     show this help");
    println!("  quit (q)     exit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_with_aliases() {
        assert_eq!(Command::parse("record"), Some(Command::Record));
        assert_eq!(Command::parse("  R  "), Some(Command::Record));
        assert_eq!(Command::parse("s"), Some(Command::Stop));
        assert_eq!(Command::parse("PLAY"), Some(Command::Play));
        assert_eq!(Command::parse("st"), Some(Command::Status));
        assert_eq!(Command::parse("?"), Some(Command::Help));
        assert_eq!(Command::parse("exit"), Some(Command::Quit));
    }

    #[test]
    fn junk_does_not_parse() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("rec ord"), None);
        assert_eq!(Command::parse("pause"), None);
    }
}
