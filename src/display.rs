//! Background color state between analysis ticks.
//!
//! New colors are approached over the configured transition time. A strobe
//! flash overlays the transition: it shows white while held and drops back
//! to wherever the underlying fade has got to as soon as it is released.

use std::time::{Duration, Instant};

use crate::color::{Hsl, Rgb, VisualizerColor};
use crate::params::DisplayConfig;

/// Retargetable linear transition in sRGB
#[derive(Debug, Clone, Copy)]
pub struct ColorTransition {
    from: Rgb,
    to: Rgb,
    started: Instant,
    duration: Duration,
}

impl ColorTransition {
    pub fn new(initial: Rgb, duration: Duration, now: Instant) -> Self {
        Self {
            from: initial,
            to: initial,
            started: now,
            duration,
        }
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Head toward `target`, starting from wherever the color is right now
    pub fn retarget(&mut self, target: Rgb, now: Instant) {
        if target == self.to {
            return;
        }
        self.from = self.current(now);
        self.to = target;
        self.started = now;
    }

    pub fn current(&self, now: Instant) -> Rgb {
        if self.duration.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from.lerp(self.to, t)
    }

    pub fn is_settled(&self, now: Instant) -> bool {
        self.from == self.to || now.saturating_duration_since(self.started) >= self.duration
    }
}

/// What the window shows
pub struct Backdrop {
    transition: ColorTransition,
    idle: Rgb,
    strobe: bool,
}

impl Backdrop {
    pub fn new(config: &DisplayConfig, now: Instant) -> Self {
        let idle = config.idle_color.to_rgb();
        Self {
            transition: ColorTransition::new(idle, config.transition(), now),
            idle,
            strobe: false,
        }
    }

    /// Pick up a changed transition speed
    pub fn configure(&mut self, config: &DisplayConfig) {
        self.transition.set_duration(config.transition());
    }

    /// Show the color produced by an analysis tick
    pub fn show(&mut self, color: VisualizerColor, now: Instant) {
        match color {
            VisualizerColor::Strobe => self.strobe = true,
            VisualizerColor::Hsl(hsl) => {
                self.strobe = false;
                self.transition.retarget(hsl.to_rgb(), now);
            }
        }
    }

    /// Return to the idle background
    pub fn fade_to_idle(&mut self, now: Instant) {
        self.strobe = false;
        self.transition.retarget(self.idle, now);
    }

    pub fn current(&self, now: Instant) -> Rgb {
        if self.strobe {
            return Hsl::WHITE.to_rgb();
        }
        self.transition.current(now)
    }

    pub fn is_settled(&self, now: Instant) -> bool {
        self.transition.is_settled(now)
    }
}
