use serde::{Deserialize, Serialize};

/// Playback preference flags handed to the presentation layer.
///
/// The core never interprets these; it only carries them alongside each
/// module view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackPreferences {
    pub autoplay: bool,
    pub muted: bool,
    pub save_progress: bool,
    pub hide_controls: bool,
    pub restart_after_end: bool,
    pub show_captions: bool,
    pub allow_skip: bool,
    pub track_time: bool,
}

impl Default for PlaybackPreferences {
    fn default() -> Self {
        Self {
            autoplay: true,
            muted: false,
            save_progress: true,
            hide_controls: false,
            restart_after_end: true,
            show_captions: true,
            allow_skip: false,
            track_time: true,
        }
    }
}
