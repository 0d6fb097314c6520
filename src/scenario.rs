use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::{
    building::{BuildingKind, BuildingRole, BuildingSpec, Catalogue},
    config::{EconomyConfig, SimConfig, WorkerConfig},
    ledger::{ResourceKind, ResourceLedger},
    spatial::{HexGrid, TilePos},
    world::World,
};

fn default_snapshot_interval_ticks() -> u64 {
    60
}

fn default_ticks() -> u64 {
    600
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
    pub map: ScenarioMap,
    /// Starting ledger balances; unlisted kinds start at zero.
    #[serde(default)]
    pub stock: BTreeMap<ResourceKind, f64>,
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub workers: WorkerConfig,
    /// Replaces the standard spec of the listed kinds.
    #[serde(default)]
    pub catalogue: BTreeMap<BuildingKind, BuildingSpec>,
    /// Constructed in order, free of charge.
    #[serde(default)]
    pub placements: Vec<Placement>,
}

/// One string per row, one terrain symbol per tile.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioMap {
    pub rows: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Placement {
    pub kind: BuildingKind,
    pub col: u32,
    pub row: u32,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        Scenario::from_yaml_str(&data).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

impl Scenario {
    pub fn from_yaml_str(data: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn build_world(&self) -> Result<World> {
        let grid = HexGrid::from_rows(self.map.rows.as_slice())
            .with_context(|| format!("Invalid map in scenario '{}'", self.name))?;

        let mut ledger = ResourceLedger::new();
        for (kind, amount) in &self.stock {
            ensure!(
                ResourceKind::STOCKED.contains(kind),
                "scenario '{}' stocks {kind}, which the ledger does not hold",
                self.name
            );
            ledger.set(*kind, *amount);
        }

        let catalogue = Catalogue::standard().with_overrides(&self.catalogue);
        let config = SimConfig {
            economy: self.economy,
            workers: self.workers,
        };
        self.validate(&catalogue, &config)?;
        let mut world = World::new(grid, ledger, catalogue, config, self.seed);
        for placement in &self.placements {
            world
                .construct(TilePos::new(placement.col, placement.row), placement.kind)
                .with_context(|| {
                    format!(
                        "Failed to place {:?} at ({}, {})",
                        placement.kind, placement.col, placement.row
                    )
                })?;
        }

        info!(
            scenario = %self.name,
            width = world.grid().width(),
            height = world.grid().height(),
            buildings = self.placements.len(),
            population = world.total_population(),
            "scenario loaded"
        );
        Ok(world)
    }

    /// Rejects tunables that would panic or stall the tick loop.
    fn validate(&self, catalogue: &Catalogue, config: &SimConfig) -> Result<()> {
        ensure!(
            config.economy.upkeep_interval_secs > 0.0,
            "scenario '{}': upkeep_interval_secs must be positive",
            self.name
        );

        let workers = &config.workers;
        ensure!(
            workers.adult_age <= workers.retirement_age && workers.retirement_age <= workers.death_age,
            "scenario '{}': ages must satisfy adult_age <= retirement_age <= death_age",
            self.name
        );
        ensure!(
            workers.settler_min_age <= workers.settler_max_age,
            "scenario '{}': settler_min_age exceeds settler_max_age",
            self.name
        );
        ensure!(
            workers.settler_max_age < workers.death_age,
            "scenario '{}': settlers must be younger than death_age {}",
            self.name,
            workers.death_age
        );

        for kind in BuildingKind::ALL {
            let spec = catalogue.spec(kind);
            ensure!(
                spec.interval_secs > 0.0,
                "{kind:?}: interval_secs must be positive"
            );
            ensure!(
                spec.min_neighbors <= spec.max_neighbors,
                "{kind:?}: min_neighbors exceeds max_neighbors"
            );
            if let BuildingRole::Production { inputs, output, .. } = &spec.role {
                ensure!(
                    *output != ResourceKind::None,
                    "{kind:?}: output must be a stocked resource"
                );
                ensure!(
                    !inputs.contains(&ResourceKind::None),
                    "{kind:?}: inputs must be stocked resources"
                );
            }
        }
        Ok(())
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or_else(default_ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "
name: minimal
seed: 5
map:
  rows: [GGG, GGG]
stock:
  money: 250
placements:
  - { kind: sawmill, col: 1, row: 0 }
";

    #[test]
    fn defaults_fill_in_missing_fields() {
        let scenario = Scenario::from_yaml_str(MINIMAL).unwrap();
        assert_eq!(scenario.snapshot_interval_ticks, 60);
        assert_eq!(scenario.ticks(None), 600);
        assert_eq!(scenario.ticks(Some(3)), 3);
        assert_eq!(scenario.economy, EconomyConfig::default());
        assert!(scenario.description.is_none());
    }

    #[test]
    fn placements_are_free() {
        let world = Scenario::from_yaml_str(MINIMAL).unwrap().build_world().unwrap();
        assert_eq!(world.ledger().amount(ResourceKind::Money), 250.0);
        assert!(world.building_at(TilePos::new(1, 0)).is_some());
    }

    #[test]
    fn unknown_terrain_is_rejected() {
        let yaml = "name: bad\nseed: 1\nmap:\n  rows: [GXG]\n";
        let err = Scenario::from_yaml_str(yaml).unwrap().build_world().unwrap_err();
        assert!(format!("{err:#}").contains("'X'"), "{err:#}");
    }

    #[test]
    fn stocking_none_is_rejected() {
        let yaml = "name: bad\nseed: 1\nmap:\n  rows: [G]\nstock:\n  none: 3\n";
        assert!(Scenario::from_yaml_str(yaml).unwrap().build_world().is_err());
    }

    const SAWMILL_OVERRIDE: &str = "
name: overridden
seed: 1
map:
  rows: [GGG]
catalogue:
  sawmill:
    cost_money: 0
    cost_planks: 0
    upkeep: 0
    buildable_on: [grass]
    interval_secs: INTERVAL
    capacity: 1
    min_neighbors: MIN
    max_neighbors: 2
    role: production
    inputs: [INPUT]
    output: OUTPUT
    output_count: 1
";

    fn sawmill_override(interval: &str, min: &str, input: &str, output: &str) -> Result<World> {
        let yaml = SAWMILL_OVERRIDE
            .replace("INTERVAL", interval)
            .replace("MIN", min)
            .replace("INPUT", input)
            .replace("OUTPUT", output);
        Scenario::from_yaml_str(&yaml)?.build_world()
    }

    fn rejection(result: Result<World>) -> String {
        match result {
            Ok(_) => panic!("scenario should be rejected"),
            Err(err) => format!("{err:#}"),
        }
    }

    #[test]
    fn well_formed_override_is_accepted() {
        assert!(sawmill_override("5", "0", "wood", "planks").is_ok());
    }

    #[test]
    fn producing_none_is_rejected() {
        let message = rejection(sawmill_override("5", "0", "wood", "none"));
        assert!(message.contains("output"), "{message}");
    }

    #[test]
    fn consuming_none_is_rejected() {
        let message = rejection(sawmill_override("5", "0", "none", "planks"));
        assert!(message.contains("inputs"), "{message}");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let message = rejection(sawmill_override("0", "0", "wood", "planks"));
        assert!(message.contains("interval_secs"), "{message}");
    }

    #[test]
    fn inverted_neighbor_bounds_are_rejected() {
        let message = rejection(sawmill_override("5", "3", "wood", "planks"));
        assert!(message.contains("min_neighbors"), "{message}");
    }

    #[test]
    fn zero_upkeep_interval_is_rejected() {
        let yaml = "name: bad\nseed: 1\nmap:\n  rows: [G]\neconomy:\n  upkeep_interval_secs: 0\n";
        let message = rejection(Scenario::from_yaml_str(yaml).unwrap().build_world());
        assert!(message.contains("upkeep_interval_secs"), "{message}");
    }

    #[test]
    fn settlers_at_death_age_are_rejected() {
        let yaml = "name: bad\nseed: 1\nmap:\n  rows: [G]\nworkers:\n  settler_min_age: 90\n  settler_max_age: 100\n";
        let message = rejection(Scenario::from_yaml_str(yaml).unwrap().build_world());
        assert!(message.contains("death_age"), "{message}");
    }

    #[test]
    fn inverted_settler_range_is_rejected() {
        let yaml = "name: bad\nseed: 1\nmap:\n  rows: [G]\nworkers:\n  settler_min_age: 40\n  settler_max_age: 20\n";
        let message = rejection(Scenario::from_yaml_str(yaml).unwrap().build_world());
        assert!(message.contains("settler_min_age"), "{message}");
    }

    #[test]
    fn retiring_before_adulthood_is_rejected() {
        let yaml = "name: bad\nseed: 1\nmap:\n  rows: [G]\nworkers:\n  adult_age: 70\n  retirement_age: 65\n";
        let message = rejection(Scenario::from_yaml_str(yaml).unwrap().build_world());
        assert!(message.contains("adult_age"), "{message}");
    }
}
