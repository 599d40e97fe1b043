use crate::core::config::LoopConfig;
use crate::core::manager::Manager;
use anyhow::Result;
use std::time::Duration;
use tracing::{info, warn};

/// Fixed-rate tick source for a [`Manager`].
pub struct Engine<'m> {
    manager: &'m mut Manager,
    config: LoopConfig,
}

impl<'m> Engine<'m> {
    pub fn new(manager: &'m mut Manager, config: LoopConfig) -> Self {
        Self { manager, config }
    }

    /// Ticks until `max_ticks` is reached or Ctrl-C arrives. Returns the
    /// number of ticks run.
    pub async fn run(self) -> Result<u64> {
        let period = Duration::from_millis(self.config.tick_rate_ms.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        self.manager.start();
        let mut ran = 0u64;

        loop {
            if self.config.max_ticks != 0 && ran >= self.config.max_ticks {
                break;
            }

            tokio::select! {
                _ = interval.tick() => {
                    let report = self.manager.tick();
                    ran += 1;
                    if !report.failures.is_empty() {
                        warn!(tick = report.tick, failed = report.failures.len(), "tick had failing registrants");
                    }
                }

                signal = &mut shutdown => {
                    signal?;
                    info!("interrupted; stopping tick loop");
                    break;
                }
            }
        }

        info!(ticks = ran, state = %self.manager.current(), "tick loop finished");
        Ok(ran)
    }
}
