//! Action mixer - named playable actions with overlapping weight fades
//!
//! The mixer owns the per-clip playback state. A cross-fade runs two fades
//! concurrently: the incoming action starts from a reset pose and fades in
//! while the outgoing action fades out over the same window.

use std::collections::HashMap;

use ember_asset::ClipData;

/// Fixed cross-fade window in seconds.
pub const CROSS_FADE_SECS: f64 = 0.2;

/// Playback state for one bound clip.
#[derive(Debug, Clone)]
pub struct Action {
    clip: ClipData,
    time: f64,
    weight: f64,
    /// Signed weight change per second; zero when no fade is running.
    fade_rate: f64,
    playing: bool,
}

impl Action {
    fn new(clip: ClipData) -> Self {
        Self {
            clip,
            time: 0.0,
            weight: 0.0,
            fade_rate: 0.0,
            playing: false,
        }
    }

    pub fn clip(&self) -> &ClipData {
        &self.clip
    }

    /// Local playback time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Blend weight in `[0, 1]`.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_fading(&self) -> bool {
        self.fade_rate != 0.0
    }
}

/// Per-entity action registry and fade engine.
#[derive(Debug, Default)]
pub struct Mixer {
    actions: HashMap<String, Action>,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a clip under a name. Binding an already-bound name overwrites
    /// the previous action: last write wins, by design.
    pub fn bind(&mut self, name: impl Into<String>, clip: ClipData) {
        self.actions.insert(name.into(), Action::new(clip));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Start `to` from a reset pose fading in over `duration`, while `from`
    /// (if any, and distinct) fades out over the same window. The two fades
    /// overlap; neither waits for the other.
    pub fn cross_fade(&mut self, from: Option<&str>, to: &str, duration: f64) {
        let rate = 1.0 / duration.max(f64::EPSILON);

        if let Some(action) = self.actions.get_mut(to) {
            action.time = 0.0;
            action.weight = 0.0;
            action.fade_rate = rate;
            action.playing = true;
        }

        if let Some(from) = from.filter(|from| *from != to) {
            if let Some(action) = self.actions.get_mut(from) {
                action.fade_rate = -rate;
            }
        }
    }

    /// Advance every playing action by `dt` seconds: progress fades, wrap
    /// looping clips, clamp-and-stop one-shot clips, and stop actions that
    /// finished fading out.
    pub fn advance(&mut self, dt: f64) {
        for action in self.actions.values_mut() {
            if !action.playing {
                continue;
            }

            action.time += dt;
            if action.clip.looping {
                if action.clip.duration > 0.0 && action.time >= action.clip.duration {
                    action.time %= action.clip.duration;
                }
            } else if action.time >= action.clip.duration {
                action.time = action.clip.duration;
                action.playing = false;
            }

            if action.fade_rate != 0.0 {
                action.weight += action.fade_rate * dt;
                if action.weight >= 1.0 {
                    action.weight = 1.0;
                    action.fade_rate = 0.0;
                } else if action.weight <= 0.0 {
                    action.weight = 0.0;
                    action.fade_rate = 0.0;
                    action.playing = false;
                }
            }
        }
    }
}
