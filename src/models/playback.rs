// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-video playback session.
//!
//! The store only holds committed playback state. While a video plays, the
//! tile keeps a local clock that moves every frame, and pushes it into the
//! store at a fixed sampling interval. Volume, mute and scrubbing live here
//! too since nothing outside the tile needs them.

/// Outcome of advancing the local clock by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    Idle,
    Advanced,
    /// The clock reached the known duration during this frame.
    Finished,
}

#[derive(Debug, Clone)]
pub struct PlaybackSession {
    /// Local playback position in seconds.
    pub progress: f64,
    /// Volume in percent (0 to 100).
    pub volume: f32,
    pub muted: bool,
    scrubbing: bool,
    resume_after_scrub: bool,
    sample_interval: f64,
    next_commit_at: Option<f64>,
    hide_delay: f64,
    controls_until: f64,
}

impl PlaybackSession {
    pub fn new(start_progress: f64, sample_interval: f64, hide_delay: f64) -> Self {
        Self {
            progress: start_progress.max(0.0),
            volume: 100.0,
            muted: false,
            scrubbing: false,
            resume_after_scrub: false,
            sample_interval,
            next_commit_at: None,
            hide_delay,
            controls_until: 0.0,
        }
    }

    pub fn tick(&mut self, dt: f64, playing: bool, duration: Option<f64>) -> Tick {
        if !playing || self.scrubbing {
            return Tick::Idle;
        }

        self.progress += dt.max(0.0);
        match duration {
            Some(duration) if self.progress >= duration => {
                self.progress = duration;
                self.next_commit_at = None;
                Tick::Finished
            }
            _ => Tick::Advanced,
        }
    }

    /// True once per sampling interval while playing, and once more on the
    /// frame playback stops so the last position reaches the store.
    pub fn should_commit(&mut self, now: f64, playing: bool) -> bool {
        if !playing {
            return self.next_commit_at.take().is_some();
        }
        match self.next_commit_at {
            None => {
                self.next_commit_at = Some(now + self.sample_interval);
                false
            }
            Some(at) if now >= at => {
                self.next_commit_at = Some(now + self.sample_interval);
                true
            }
            Some(_) => false,
        }
    }

    /// Start dragging the progress slider. Returns true if the caller must pause the video.
    pub fn begin_scrub(&mut self, playing: bool) -> bool {
        if self.scrubbing {
            return false;
        }
        self.scrubbing = true;
        self.resume_after_scrub = playing;
        playing
    }

    pub fn scrub_to(&mut self, seconds: f64, duration: Option<f64>) {
        let seconds = seconds.max(0.0);
        self.progress = match duration {
            Some(duration) => seconds.min(duration),
            None => seconds,
        };
    }

    /// Release the progress slider. Returns true if playback must resume.
    pub fn end_scrub(&mut self) -> bool {
        let resume = self.scrubbing && self.resume_after_scrub;
        self.scrubbing = false;
        self.resume_after_scrub = false;
        resume
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    /// Set the volume; zero mutes, anything else unmutes.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 100.0);
        self.muted = self.volume == 0.0;
    }

    pub fn toggle_mute(&mut self) {
        if self.muted && self.volume == 0.0 {
            self.volume = 100.0;
        }
        self.muted = !self.muted;
    }

    /// Effective volume for the slider.
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Register pointer activity over the tile.
    pub fn touch(&mut self, now: f64) {
        self.controls_until = now + self.hide_delay;
    }

    pub fn controls_visible(&self, now: f64) -> bool {
        self.scrubbing || now < self.controls_until
    }
}

/// Format seconds as `mm:ss`, wrapping at one hour.
pub fn format_timestamp(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s.is_finite() && s > 0.0 => {
            let total = s as u64;
            format!("{:02}:{:02}", (total / 60) % 60, total % 60)
        }
        _ => "00:00".to_string(),
    }
}
