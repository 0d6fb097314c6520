//! Individual workers: aging, happiness and taxes on the economic side, and a
//! four-state commute between home and workplace driven by flow fields.

mod names;
mod pool;

pub use names::generate_name;
pub use pool::WorkerPool;

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::building::BuildingId;
use crate::config::WorkerConfig;
use crate::job_market::JobId;
use crate::ledger::{ResourceKind, ResourceLedger};
use crate::spatial::{FlowField, HexGrid, TileId};

/// Generational handle into the [`WorkerPool`]. A released slot bumps its
/// generation, so stale handles stop resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerId {
    index: u32,
    generation: u32,
}

impl WorkerId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}.{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Gender::Female
        } else {
            Gender::Male
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeStage {
    Minor,
    Adult,
    Retired,
    Dead,
}

impl LifeStage {
    pub fn for_age(age: u32, config: &WorkerConfig) -> Self {
        if age >= config.death_age {
            LifeStage::Dead
        } else if age >= config.retirement_age {
            LifeStage::Retired
        } else if age >= config.adult_age {
            LifeStage::Adult
        } else {
            LifeStage::Minor
        }
    }
}

/// Stage changes reported by [`Worker::age_one_second`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeEvent {
    CameOfAge,
    Retired,
    Died,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CommuteState {
    Relax { elapsed: u32 },
    CommuteToWork,
    Work { elapsed: u32 },
    CommuteToHome,
}

/// A single hop in progress. The tile only changes once it completes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub from: TileId,
    pub to: TileId,
    pub elapsed: f64,
    pub duration: f64,
}

impl Motion {
    pub fn new(from: TileId, to: TileId, duration: f64) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            duration,
        }
    }

    pub fn advance(&mut self, dt_secs: f64) {
        self.elapsed = (self.elapsed + dt_secs).min(self.duration);
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Interpolation factor in `[0, 1]` for renderers.
    pub fn fraction(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }
}

/// Flow fields a worker steers by this second.
#[derive(Clone, Copy)]
pub struct Routes<'a> {
    pub home: &'a FlowField,
    pub work: Option<&'a FlowField>,
}

#[derive(Debug, Clone)]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    pub gender: Gender,
    pub age: u32,
    pub happiness: f64,
    pub stage: LifeStage,
    pub home: BuildingId,
    pub job: Option<JobId>,
    pub tile: TileId,
    pub commute: CommuteState,
    pub motion: Option<Motion>,
    growing: Option<f64>,
    year_progress: u32,
    economy_progress: u32,
}

impl Worker {
    pub fn new(
        id: WorkerId,
        name: String,
        gender: Gender,
        age: u32,
        home: BuildingId,
        tile: TileId,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            id,
            name,
            gender,
            age,
            happiness: 1.0,
            stage: LifeStage::for_age(age, config),
            home,
            job: None,
            tile,
            commute: CommuteState::Relax { elapsed: 0 },
            motion: None,
            growing: None,
            year_progress: 0,
            economy_progress: 0,
        }
    }

    pub fn is_employed(&self) -> bool {
        self.job.is_some()
    }

    pub fn is_growing(&self) -> bool {
        self.growing.is_some()
    }

    /// Counts one second towards the next birthday and reports a stage
    /// change if that birthday crosses a threshold.
    pub fn age_one_second(&mut self, config: &WorkerConfig) -> Option<LifeEvent> {
        if self.stage == LifeStage::Dead {
            return None;
        }
        self.year_progress += 1;
        if self.year_progress < config.one_year_every_secs {
            return None;
        }
        self.year_progress = 0;
        self.age += 1;

        let next = LifeStage::for_age(self.age, config);
        if next == self.stage {
            return None;
        }
        self.stage = next;
        match next {
            LifeStage::Minor => None,
            LifeStage::Adult => {
                if config.grow_secs > 0.0 {
                    self.growing = Some(config.grow_secs);
                }
                Some(LifeEvent::CameOfAge)
            }
            LifeStage::Retired => Some(LifeEvent::Retired),
            LifeStage::Dead => Some(LifeEvent::Died),
        }
    }

    /// Every `economy_interval_secs`: consume goods, recompute happiness and
    /// pay tax when employed. Returns the tax paid on cycle seconds.
    pub fn economy_second(&mut self, ledger: &mut ResourceLedger, config: &WorkerConfig) -> Option<f64> {
        self.economy_progress += 1;
        if self.economy_progress < config.economy_interval_secs {
            return None;
        }
        self.economy_progress = 0;

        let criteria = [
            ledger.try_remove(ResourceKind::Fish, config.fish_per_cycle),
            ledger.try_remove(ResourceKind::Clothes, config.clothes_per_cycle),
            ledger.try_remove(ResourceKind::Schnapps, config.schnapps_per_cycle),
            matches!(self.stage, LifeStage::Minor | LifeStage::Retired) || self.is_employed(),
        ];
        let satisfied = criteria.iter().filter(|met| **met).count();
        self.happiness = satisfied as f64 / criteria.len() as f64;

        let tax = if self.is_employed() {
            self.happiness * config.tax_rate
        } else {
            0.0
        };
        if tax > 0.0 {
            ledger.add(ResourceKind::Money, tax);
        }
        Some(tax)
    }

    /// One second of the commute state machine.
    pub fn commute_second(&mut self, config: &WorkerConfig, routes: Routes<'_>, grid: &HexGrid) {
        self.commute = match self.commute {
            CommuteState::Relax { elapsed } => {
                let elapsed = elapsed + 1;
                if elapsed >= config.relax_secs {
                    CommuteState::CommuteToWork
                } else {
                    CommuteState::Relax { elapsed }
                }
            }
            CommuteState::CommuteToWork => match routes.work {
                None => CommuteState::CommuteToHome,
                Some(field) => {
                    if self.step_towards(field, grid, config) {
                        CommuteState::Work { elapsed: 0 }
                    } else {
                        CommuteState::CommuteToWork
                    }
                }
            },
            CommuteState::Work { elapsed } => {
                let elapsed = elapsed + 1;
                if routes.work.is_none() || elapsed >= config.work_secs {
                    CommuteState::CommuteToHome
                } else {
                    CommuteState::Work { elapsed }
                }
            }
            CommuteState::CommuteToHome => {
                if self.step_towards(routes.home, grid, config) {
                    CommuteState::Relax { elapsed: 0 }
                } else {
                    CommuteState::CommuteToHome
                }
            }
        };
    }

    // Returns true once the worker stands on a tile that steers to itself:
    // the destination, or a tile with no way out.
    fn step_towards(&mut self, field: &FlowField, grid: &HexGrid, config: &WorkerConfig) -> bool {
        if let Some(motion) = self.motion {
            if !motion.is_complete() {
                return false;
            }
            self.tile = motion.to;
            self.motion = None;
        }
        let hop = field.next_hop(self.tile);
        if hop == self.tile {
            return true;
        }
        let duration = grid.tile(hop).terrain.traversal_cost() as f64 * config.secs_per_step_cost;
        self.motion = Some(Motion::new(self.tile, hop, duration));
        false
    }

    /// Presentation time. Returns true when the growing-up animation ends
    /// during this frame.
    pub fn animate(&mut self, dt_secs: f64) -> bool {
        if let Some(motion) = self.motion.as_mut() {
            motion.advance(dt_secs);
        }
        match self.growing {
            Some(remaining) if remaining - dt_secs <= 0.0 => {
                self.growing = None;
                true
            }
            Some(remaining) => {
                self.growing = Some(remaining - dt_secs);
                false
            }
            None => false,
        }
    }
}
