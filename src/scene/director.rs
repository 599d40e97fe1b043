use anyhow::{bail, Result};
use tracing::info;

use crate::core::registrant::{Context, Registrant};
use crate::core::state::GameState;

/// Scripted state changes keyed by tick number.
#[derive(Debug, Clone)]
pub struct Cue {
    pub at_tick: u64,
    pub action: CueAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueAction {
    Pause,
    Resume,
    Enter(GameState),
    /// Leave the registry after this tick.
    Exit,
}

/// Plays a fixed list of cues, one request per matching tick.
///
/// Requests go through the context, so they apply from the next tick.
pub struct Director {
    cues: Vec<Cue>,
    played: usize,
}

impl Director {
    pub fn new(mut cues: Vec<Cue>) -> Self {
        cues.sort_by_key(|c| c.at_tick);
        Self { cues, played: 0 }
    }

    pub fn played(&self) -> usize {
        self.played
    }

    fn play(&mut self, ctx: &Context<'_>) -> Result<()> {
        while let Some(cue) = self.cues.get(self.played) {
            if cue.at_tick > ctx.tick() {
                break;
            }
            let action = cue.action;
            self.played += 1;
            info!(tick = ctx.tick(), ?action, "cue");
            match action {
                CueAction::Pause => {
                    if ctx.state() == GameState::Paused {
                        bail!("pause cue while already paused");
                    }
                    ctx.pause();
                }
                CueAction::Resume => ctx.resume(),
                CueAction::Enter(state) => ctx.transition(state, false),
                CueAction::Exit => ctx.unregister_self(),
            }
        }
        Ok(())
    }
}

impl Registrant for Director {
    fn name(&self) -> &str {
        "director"
    }

    fn update_init(&mut self, ctx: &Context<'_>) -> Result<()> {
        self.play(ctx)
    }

    fn update_main_menu(&mut self, ctx: &Context<'_>) -> Result<()> {
        self.play(ctx)
    }

    fn update_level_loading(&mut self, ctx: &Context<'_>) -> Result<()> {
        self.play(ctx)
    }

    fn update_level_starting(&mut self, ctx: &Context<'_>) -> Result<()> {
        self.play(ctx)
    }

    fn update_in_level(&mut self, ctx: &Context<'_>) -> Result<()> {
        self.play(ctx)
    }

    fn update_level_ending(&mut self, ctx: &Context<'_>) -> Result<()> {
        self.play(ctx)
    }

    fn update_paused(&mut self, ctx: &Context<'_>) -> Result<()> {
        self.play(ctx)
    }
}
