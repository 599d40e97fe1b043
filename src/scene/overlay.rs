use anyhow::Result;

use crate::core::registrant::{Context, Registrant};

/// Pause-menu overlay: fades in while paused, fades out otherwise.
#[derive(Debug, Clone)]
pub struct PauseOverlay {
    /// Ticks for a full fade
    pub fade_ticks: u32,
    elapsed: u32,
}

impl PauseOverlay {
    pub fn new(fade_ticks: u32) -> Self {
        Self {
            fade_ticks: fade_ticks.max(1),
            elapsed: 0,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.elapsed as f32 / self.fade_ticks as f32
    }

    pub fn is_hidden(&self) -> bool {
        self.elapsed == 0
    }
}

impl Registrant for PauseOverlay {
    fn name(&self) -> &str {
        "pause_overlay"
    }

    fn update_paused(&mut self, _ctx: &Context<'_>) -> Result<()> {
        self.elapsed = (self.elapsed + 1).min(self.fade_ticks);
        Ok(())
    }

    fn update_in_level(&mut self, _ctx: &Context<'_>) -> Result<()> {
        self.elapsed = self.elapsed.saturating_sub(1);
        Ok(())
    }
}
