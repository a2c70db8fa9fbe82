use std::{sync::Mutex, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    error::Error,
    pipeline::{Stage, StageObserver},
};

/// Shows one terminal spinner per pipeline stage.
#[derive(Default)]
pub struct SpinnerObserver {
    current: Mutex<Option<ProgressBar>>,
}

impl SpinnerObserver {
    fn message(stage: Stage) -> &'static str {
        match stage {
            Stage::Translate => "Translating your vibe into a search query...",
            Stage::Search => "Searching Spotify for matching tracks...",
            Stage::Title => "Coming up with a title...",
            Stage::Publish => "Creating the playlist...",
        }
    }

    fn take(&self) -> Option<ProgressBar> {
        self.current.lock().ok().and_then(|mut current| current.take())
    }
}

impl StageObserver for SpinnerObserver {
    fn started(&self, stage: Stage) {
        let pb = ProgressBar::new_spinner();
        pb.set_message(Self::message(stage));
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }

        if let Ok(mut current) = self.current.lock() {
            if let Some(previous) = current.replace(pb) {
                previous.finish_and_clear();
            }
        }
    }

    fn finished(&self, _stage: Stage) {
        if let Some(pb) = self.take() {
            pb.finish_and_clear();
        }
    }

    fn failed(&self, _stage: Stage, _error: &Error) {
        if let Some(pb) = self.take() {
            pb.abandon();
        }
    }
}
