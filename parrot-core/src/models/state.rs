use std::fmt;

/// What the recorder is doing right now.
///
/// This is the session lock's state: capture and playback are mutually
/// exclusive, so at most one loop owns the transport at any moment.
///
/// State transitions:
/// ```text
///        begin_capture              begin_playback
/// idle ───────────────→ recording   idle ───────────────→ playing
///        end_capture               clip exhausted / cancel
/// recording ──────────→ idle       playing ─────────────→ idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Idle,
    Recording,
    Playing,
}

impl Transport {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Playing => "playing",
        };
        f.write_str(label)
    }
}
