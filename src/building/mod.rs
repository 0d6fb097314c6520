mod catalogue;

pub use catalogue::{BuildingRole, BuildingSpec, Catalogue};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::job_market::JobId;
use crate::ledger::{ResourceKind, ResourceLedger};
use crate::spatial::{FlowField, TileId};
use crate::worker::WorkerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildingId(u32);

impl BuildingId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Fishery,
    Lumberjack,
    Sawmill,
    SheepFarm,
    FrameworkKnitters,
    PotatoFarm,
    SchnappsDistillery,
    FarmersResidence,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 8] = [
        BuildingKind::Fishery,
        BuildingKind::Lumberjack,
        BuildingKind::Sawmill,
        BuildingKind::SheepFarm,
        BuildingKind::FrameworkKnitters,
        BuildingKind::PotatoFarm,
        BuildingKind::SchnappsDistillery,
        BuildingKind::FarmersResidence,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStatus {
    AwaitingUpkeep,
    Producing,
}

/// Result of one second of a building's economy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Upkeep could not be paid; nothing else happened.
    Unpaid,
    /// Progress advanced without reaching an action.
    Progressed,
    /// Threshold reached but the action is not enabled yet.
    Blocked,
    /// Inputs consumed and output credited to the ledger.
    Produced,
    /// A housing interval elapsed; this many children should move in.
    ChildrenDue(u32),
}

/// Efficiency from the number of free neighbouring tiles of the right terrain.
pub fn neighbor_efficiency(count: u32, min_neighbors: u32, max_neighbors: u32) -> f64 {
    if count < min_neighbors {
        0.0
    } else if count >= max_neighbors {
        1.0
    } else {
        count as f64 / max_neighbors as f64
    }
}

/// Mean happiness of a workforce; an empty workforce yields zero.
pub fn workforce_efficiency(happiness: &[f64]) -> f64 {
    if happiness.is_empty() {
        return 0.0;
    }
    happiness.iter().sum::<f64>() / happiness.len() as f64
}

#[derive(Debug, Clone)]
pub struct Building {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub tile: TileId,
    pub spec: BuildingSpec,
    pub efficiency: f64,
    pub progress: f64,
    pub status: ProductionStatus,
    pub(crate) jobs: Vec<JobId>,
    pub(crate) residents: Vec<WorkerId>,
    flow_field: FlowField,
}

impl Building {
    pub fn new(id: BuildingId, kind: BuildingKind, tile: TileId, spec: BuildingSpec, flow_field: FlowField) -> Self {
        Self {
            id,
            kind,
            tile,
            spec,
            efficiency: 1.0,
            progress: 0.0,
            status: ProductionStatus::AwaitingUpkeep,
            jobs: Vec::new(),
            residents: Vec::new(),
            flow_field,
        }
    }

    pub fn flow_field(&self) -> &FlowField {
        &self.flow_field
    }

    pub fn jobs(&self) -> &[JobId] {
        &self.jobs
    }

    pub fn residents(&self) -> &[WorkerId] {
        &self.residents
    }

    pub fn has_spare_capacity(&self) -> bool {
        (self.residents.len() as u32) < self.spec.capacity
    }

    /// Seconds per action at the current efficiency. Zero efficiency yields
    /// infinity, or NaN for a zero interval; `economy_cycle` never fires either.
    pub fn production_every(&self) -> f64 {
        self.spec.interval_secs / self.efficiency
    }

    /// One simulated second: pay upkeep, take the freshly measured
    /// efficiency, advance progress and act when the interval is reached.
    pub fn economy_cycle(
        &mut self,
        ledger: &mut ResourceLedger,
        efficiency: f64,
        upkeep_interval_secs: f64,
    ) -> CycleOutcome {
        let upkeep = self.spec.upkeep / upkeep_interval_secs;
        if !ledger.try_remove(ResourceKind::Money, upkeep) {
            self.status = ProductionStatus::AwaitingUpkeep;
            return CycleOutcome::Unpaid;
        }
        self.status = ProductionStatus::Producing;
        self.efficiency = efficiency;
        self.progress += 1.0;

        let every = self.production_every();
        if self.efficiency <= 0.0 || self.progress < every {
            return CycleOutcome::Progressed;
        }
        if !self.action_enabled(ledger) {
            self.progress = every;
            return CycleOutcome::Blocked;
        }
        self.progress = 0.0;
        self.act(ledger)
    }

    fn action_enabled(&self, ledger: &ResourceLedger) -> bool {
        match &self.spec.role {
            BuildingRole::Production { inputs, .. } => inputs.iter().all(|kind| ledger.has_any(*kind)),
            BuildingRole::Housing { .. } => self.has_spare_capacity(),
        }
    }

    fn act(&self, ledger: &mut ResourceLedger) -> CycleOutcome {
        match &self.spec.role {
            BuildingRole::Production {
                inputs,
                output,
                output_count,
            } => {
                for kind in inputs {
                    ledger.try_remove(*kind, 1.0);
                }
                ledger.add(*output, *output_count);
                CycleOutcome::Produced
            }
            BuildingRole::Housing {
                children_per_cycle, ..
            } => {
                let spare = self.spec.capacity.saturating_sub(self.residents.len() as u32);
                CycleOutcome::ChildrenDue((*children_per_cycle).min(spare))
            }
        }
    }
}
