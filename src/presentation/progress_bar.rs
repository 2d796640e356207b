//! Top progress bar state machine
//!
//! Pure state: no timers. [`ProgressDriver`](super::ProgressDriver) calls
//! `tick()` on an interval and `hide()` after the configured delay.

use crate::config::ProgressBarConfig;

/// Render model for the top progress bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressView {
    pub visible: bool,
    /// Bar width in percent of the viewport
    pub width_percent: f64,
}

#[derive(Debug, Clone)]
pub struct ProgressBar {
    config: ProgressBarConfig,
    active: bool,
    progress: f64,
}

impl ProgressBar {
    #[must_use]
    pub fn new(config: ProgressBarConfig) -> Self {
        Self {
            config,
            active: false,
            progress: 0.0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ProgressBarConfig {
        &self.config
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Completed and waiting to be hidden
    #[must_use]
    pub fn is_finishing(&self) -> bool {
        self.active && self.progress >= 100.0
    }

    /// Begin a new cycle from the initial kick, discarding any current one
    pub fn start(&mut self) {
        self.active = true;
        self.progress = self.config.initial;
    }

    /// Advance the indeterminate animation by one step.
    ///
    /// Each step closes `1 / gap_divisor` of the distance to the ceiling, never
    /// less than `min_step`, and stops `min_step` short of the ceiling.
    pub fn tick(&mut self) -> f64 {
        if !self.active || self.is_finishing() {
            return self.progress;
        }
        let cfg = &self.config;
        let cap = cfg.ceiling - cfg.min_step;
        let step = ((cfg.ceiling - self.progress) / cfg.gap_divisor).max(cfg.min_step);
        self.progress = (self.progress + step).min(cap).max(self.progress);
        self.progress
    }

    /// Jump to 100%. Returns `false` for a bar that is not showing.
    pub fn finish(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.progress = 100.0;
        true
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.progress = 0.0;
    }

    #[must_use]
    pub fn view(&self) -> ProgressView {
        ProgressView {
            visible: self.active,
            width_percent: self.progress,
        }
    }
}

impl ProgressView {
    /// Draw the bar as `[=====     ]  42%`, or an empty string when hidden
    #[must_use]
    pub fn render_text(&self, width: usize) -> String {
        if !self.visible {
            return String::new();
        }
        let filled = ((self.width_percent / 100.0) * width as f64).round() as usize;
        let filled = filled.min(width);
        format!(
            "[{}{}] {:>3.0}%",
            "=".repeat(filled),
            " ".repeat(width - filled),
            self.width_percent
        )
    }
}
