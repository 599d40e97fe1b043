use anyhow::Result;

use crate::core::registrant::{Context, Registrant};

/// Rotates about the vertical axis while a level is running.
#[derive(Debug, Clone)]
pub struct Spinner {
    /// Degrees per tick
    pub rate: f32,
    pub angle: f32,
}

impl Spinner {
    pub fn new(rate: f32) -> Self {
        Self { rate, angle: 0.0 }
    }
}

impl Registrant for Spinner {
    fn name(&self) -> &str {
        "spinner"
    }

    fn update_in_level(&mut self, _ctx: &Context<'_>) -> Result<()> {
        self.angle = (self.angle + self.rate).rem_euclid(360.0);
        Ok(())
    }
}
