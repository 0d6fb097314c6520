use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::trace;

use crate::{
    snapshot::SnapshotWriter,
    systems::{CommuteSystem, EconomySystem, IncomeSystem},
    world::{World, WorldSnapshot},
};

/// Simulated seconds per tick.
pub const TICK_SECS: f64 = 1.0;

pub struct EngineSettings {
    pub scenario_name: String,
    pub snapshot_interval_ticks: u64,
    pub snapshot_dir: PathBuf,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    /// Income, then building economies, then commutes.
    pub fn with_standard_systems(self) -> Self {
        self.with_system(IncomeSystem::new())
            .with_system(EconomySystem::new())
            .with_system(CommuteSystem::new())
    }

    pub fn build(self) -> Engine {
        Engine {
            systems: self.systems,
            snapshot_writer: SnapshotWriter::new(&self.settings.snapshot_dir, self.settings.snapshot_interval_ticks),
            settings: self.settings,
            accumulated_secs: 0.0,
        }
    }
}

pub struct Engine {
    systems: Vec<Box<dyn System>>,
    snapshot_writer: SnapshotWriter,
    settings: EngineSettings,
    accumulated_secs: f64,
}

impl Engine {
    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }

    /// Feeds `dt_secs` of frame time into the clock. Every whole simulated
    /// second fires one tick, several if the frame was long, and the
    /// remaining fraction carries over. Animations advance by the full `dt`.
    /// Returns the number of ticks fired.
    pub fn advance(&mut self, world: &mut World, dt_secs: f64) -> Result<u32> {
        self.accumulated_secs += dt_secs.max(0.0);
        let mut fired = 0;
        while self.accumulated_secs >= TICK_SECS {
            self.accumulated_secs -= TICK_SECS;
            self.step(world)?;
            fired += 1;
        }
        world.animate(dt_secs.max(0.0));
        Ok(fired)
    }

    /// One tick: every system in registration order, then the clock moves
    /// and a snapshot is written when due.
    pub fn step(&mut self, world: &mut World) -> Result<()> {
        for system in &mut self.systems {
            system
                .run(world)
                .with_context(|| format!("system '{}' failed at tick {}", system.name(), world.tick()))?;
        }
        world.advance_time();
        trace!(tick = world.tick(), population = world.total_population(), "tick complete");
        self.snapshot_writer.maybe_write(world, &self.settings.scenario_name)?;
        Ok(())
    }

    pub fn run(&mut self, world: &mut World, ticks: u64) -> Result<()> {
        self.run_with_hook(world, ticks, |_| {})
    }

    /// Runs `ticks` one-second frames, handing a snapshot to `hook` after each.
    pub fn run_with_hook(
        &mut self,
        world: &mut World,
        ticks: u64,
        mut hook: impl FnMut(WorldSnapshot),
    ) -> Result<()> {
        for _ in 0..ticks {
            self.advance(world, TICK_SECS)?;
            hook(world.snapshot(&self.settings.scenario_name));
        }
        Ok(())
    }
}

/// One simulation phase, run once per tick in registration order. A tick is
/// always `TICK_SECS` long; randomness lives in the world's seeded streams.
pub trait System: Send {
    fn name(&self) -> &str;
    fn run(&mut self, world: &mut World) -> Result<()>;
}
