//! Simulation and render-timing configuration.
//!
//! Uses `heapless::String` for the level title so a config stays a plain
//! value type that can be copied around and serialized.
//!
//! # Example
//!
//! ```rust
//! use rs_trainyard::config::{Config, RenderConfig, SimConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.sim.max_steps, 1000);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_sim(SimConfig::default().with_max_steps(200).with_halt_on_crash(true))
//!     .with_render(RenderConfig::default().with_step_duration_ms(250))
//!     .with_title("Red Line");
//! assert_eq!(config.title.as_str(), "Red Line");
//! ```

use heapless::String as HString;

/// Maximum length for short strings (level titles).
pub const MAX_SHORT_STRING: usize = 64;

/// Type alias for short strings.
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Create a ShortString from a &str, truncating on a UTF-8 boundary if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    let take = s.len().min(MAX_SHORT_STRING);
    let valid_end = s
        .char_indices()
        .take_while(|(i, c)| i + c.len_utf8() <= take)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete configuration for a [`TileGrid`](crate::TileGrid).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Stepping limits and crash policy
    pub sim: SimConfig,
    /// Render update timing
    pub render: RenderConfig,
    /// Display title of the loaded level
    pub title: ShortString,
}

impl Config {
    /// Set simulation configuration
    pub fn with_sim(mut self, sim: SimConfig) -> Self {
        self.sim = sim;
        self
    }

    /// Set render configuration
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    /// Set the level title
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = short_string(title);
        self
    }
}

// ============================================================================
// Sim Config
// ============================================================================

/// Stepping limits and crash policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Upper bound on steps taken by [`TileGrid::run`](crate::TileGrid::run).
    /// Rail loops never empty, so a run needs a ceiling.
    pub max_steps: u32,
    /// Maximum number of steps computed ahead by `peek`
    pub peek_limit: usize,
    /// Whether `run` stops at the first crash
    pub halt_on_crash: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_steps: 1000,
            peek_limit: 8,
            halt_on_crash: false,
        }
    }
}

impl SimConfig {
    /// Set the step ceiling
    pub fn with_max_steps(mut self, steps: u32) -> Self {
        self.max_steps = steps;
        self
    }

    /// Set the look-ahead cap
    pub fn with_peek_limit(mut self, limit: usize) -> Self {
        self.peek_limit = limit;
        self
    }

    /// Set whether a crash ends `run`
    pub fn with_halt_on_crash(mut self, halt: bool) -> Self {
        self.halt_on_crash = halt;
        self
    }
}

// ============================================================================
// Render Config
// ============================================================================

/// Timing of render updates within a step.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderConfig {
    /// Progress at which a goal drops a consumed target marker (0.0 to 1.0)
    pub goal_marker_progress: f32,
    /// Progress at which a double rail swaps its top path (0.0 to 1.0)
    pub swap_progress: f32,
    /// Wall-clock length of one animated step in milliseconds
    pub step_duration_ms: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            goal_marker_progress: 0.5,
            swap_progress: 0.5,
            step_duration_ms: 500,
        }
    }
}

impl RenderConfig {
    /// Set the goal marker timing
    pub fn with_goal_marker_progress(mut self, progress: f32) -> Self {
        self.goal_marker_progress = progress.clamp(0.0, 1.0);
        self
    }

    /// Set the rail swap timing
    pub fn with_swap_progress(mut self, progress: f32) -> Self {
        self.swap_progress = progress.clamp(0.0, 1.0);
        self
    }

    /// Set the step duration
    pub fn with_step_duration_ms(mut self, ms: u32) -> Self {
        self.step_duration_ms = ms;
        self
    }

    /// Convert elapsed animation time into step progress in `[0, 1]`.
    ///
    /// A zero-length step is always complete.
    pub fn progress_at(&self, elapsed_ms: u64) -> f32 {
        if self.step_duration_ms == 0 {
            return 1.0;
        }
        (elapsed_ms as f32 / self.step_duration_ms as f32).min(1.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
