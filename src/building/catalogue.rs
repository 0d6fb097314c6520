use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::BuildingKind;
use crate::ledger::ResourceKind;
use crate::spatial::Terrain;

/// What a building does once its interval elapses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum BuildingRole {
    Production {
        #[serde(default)]
        inputs: Vec<ResourceKind>,
        output: ResourceKind,
        output_count: f64,
    },
    Housing {
        initial_residents: u32,
        children_per_cycle: u32,
    },
}

/// Static description of a building kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSpec {
    pub cost_money: f64,
    pub cost_planks: f64,
    /// Money per upkeep interval (one minute by default).
    pub upkeep: f64,
    pub buildable_on: Vec<Terrain>,
    #[serde(default)]
    pub efficiency_terrain: Option<Terrain>,
    #[serde(default)]
    pub min_neighbors: u32,
    #[serde(default)]
    pub max_neighbors: u32,
    /// Seconds per action at full efficiency.
    pub interval_secs: f64,
    /// Job slots for production, living space for housing.
    pub capacity: u32,
    /// Efficiency follows the workforce's mean happiness.
    #[serde(default)]
    pub workforce_scaled: bool,
    #[serde(flatten)]
    pub role: BuildingRole,
}

impl BuildingSpec {
    pub fn is_housing(&self) -> bool {
        matches!(self.role, BuildingRole::Housing { .. })
    }
}

#[allow(clippy::too_many_arguments)]
fn production(
    cost_money: f64,
    cost_planks: f64,
    upkeep: f64,
    buildable_on: &[Terrain],
    efficiency: Option<(Terrain, u32, u32)>,
    interval_secs: f64,
    capacity: u32,
    inputs: &[ResourceKind],
    output: ResourceKind,
    output_count: f64,
) -> BuildingSpec {
    let (efficiency_terrain, min_neighbors, max_neighbors) = match efficiency {
        Some((terrain, min, max)) => (Some(terrain), min, max),
        None => (None, 0, 0),
    };
    BuildingSpec {
        cost_money,
        cost_planks,
        upkeep,
        buildable_on: buildable_on.to_vec(),
        efficiency_terrain,
        min_neighbors,
        max_neighbors,
        interval_secs,
        capacity,
        workforce_scaled: efficiency_terrain.is_none(),
        role: BuildingRole::Production {
            inputs: inputs.to_vec(),
            output,
            output_count,
        },
    }
}

/// Specs for every [`BuildingKind`]; scenarios may override single entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalogue {
    specs: BTreeMap<BuildingKind, BuildingSpec>,
}

impl Catalogue {
    pub fn standard() -> Self {
        use ResourceKind as R;
        use Terrain as T;

        let mut specs = BTreeMap::new();
        specs.insert(
            BuildingKind::Fishery,
            production(100.0, 2.0, 40.0, &[T::Sand], Some((T::Water, 1, 3)), 30.0, 25, &[], R::Fish, 1.0),
        );
        specs.insert(
            BuildingKind::Lumberjack,
            production(100.0, 0.0, 10.0, &[T::Forest], Some((T::Forest, 1, 6)), 15.0, 5, &[], R::Wood, 1.0),
        );
        specs.insert(
            BuildingKind::Sawmill,
            production(100.0, 0.0, 10.0, &[T::Grass], None, 15.0, 10, &[R::Wood], R::Planks, 2.0),
        );
        specs.insert(
            BuildingKind::SheepFarm,
            production(100.0, 2.0, 20.0, &[T::Grass], Some((T::Grass, 1, 4)), 30.0, 10, &[], R::Wool, 1.0),
        );
        specs.insert(
            BuildingKind::FrameworkKnitters,
            production(400.0, 2.0, 50.0, &[T::Grass], None, 30.0, 50, &[R::Wool], R::Clothes, 1.0),
        );
        specs.insert(
            BuildingKind::PotatoFarm,
            production(100.0, 2.0, 20.0, &[T::Grass], Some((T::Grass, 1, 4)), 30.0, 20, &[], R::Potato, 1.0),
        );
        specs.insert(
            BuildingKind::SchnappsDistillery,
            production(100.0, 2.0, 40.0, &[T::Grass], None, 30.0, 50, &[R::Potato], R::Schnapps, 1.0),
        );
        specs.insert(
            BuildingKind::FarmersResidence,
            BuildingSpec {
                cost_money: 100.0,
                cost_planks: 2.0,
                upkeep: 0.0,
                buildable_on: vec![T::Grass, T::Sand],
                efficiency_terrain: None,
                min_neighbors: 0,
                max_neighbors: 0,
                interval_secs: 60.0,
                capacity: 10,
                workforce_scaled: true,
                role: BuildingRole::Housing {
                    initial_residents: 2,
                    children_per_cycle: 1,
                },
            },
        );
        Self { specs }
    }

    pub fn with_overrides(mut self, overrides: &BTreeMap<BuildingKind, BuildingSpec>) -> Self {
        for (kind, spec) in overrides {
            self.specs.insert(*kind, spec.clone());
        }
        self
    }

    pub fn spec(&self, kind: BuildingKind) -> &BuildingSpec {
        self.specs
            .get(&kind)
            .unwrap_or_else(|| panic!("building kind {kind:?} missing from catalogue"))
    }

    pub fn insert(&mut self, kind: BuildingKind, spec: BuildingSpec) {
        self.specs.insert(kind, spec);
    }
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::standard()
    }
}
