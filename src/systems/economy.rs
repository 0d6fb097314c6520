use anyhow::Result;
use tracing::debug;

use crate::{
    building::{neighbor_efficiency, workforce_efficiency, Building, BuildingId, CycleOutcome},
    engine::System,
    worker::LifeEvent,
    world::World,
};

/// Runs every building's economy cycle in id order. Housing additionally
/// drives the per-second cycle of its residents.
pub struct EconomySystem;

impl EconomySystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EconomySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for EconomySystem {
    fn name(&self) -> &str {
        "economy"
    }

    fn run(&mut self, world: &mut World) -> Result<()> {
        let upkeep_interval = world.config.economy.upkeep_interval_secs;
        let ids: Vec<BuildingId> = world.buildings.keys().copied().collect();
        for id in ids {
            let Some(efficiency) = world.buildings.get(&id).map(|b| measure_efficiency(world, b)) else {
                continue;
            };
            let Some(building) = world.buildings.get_mut(&id) else {
                continue;
            };
            let outcome = building.economy_cycle(&mut world.ledger, efficiency, upkeep_interval);
            let housing = building.spec.is_housing();

            if let CycleOutcome::ChildrenDue(count) = outcome {
                for _ in 0..count {
                    let child = world.spawn_worker(id, 0);
                    debug!(worker = %child, home = %id, "child born");
                }
            }
            if housing {
                drive_residents(world, id);
            }
        }
        Ok(())
    }
}

fn measure_efficiency(world: &World, building: &Building) -> f64 {
    let spec = &building.spec;
    if let Some(terrain) = spec.efficiency_terrain {
        let count = world.grid.free_neighbors_of(building.tile, terrain) as u32;
        return neighbor_efficiency(count, spec.min_neighbors, spec.max_neighbors);
    }
    if !spec.workforce_scaled {
        return 1.0;
    }
    let happiness: Vec<f64> = if spec.is_housing() {
        building
            .residents()
            .iter()
            .filter_map(|id| world.workers.get(*id))
            .map(|w| w.happiness)
            .collect()
    } else {
        building
            .jobs()
            .iter()
            .filter_map(|job| world.market.job(*job).and_then(|j| j.worker))
            .filter_map(|id| world.workers.get(id))
            .map(|w| w.happiness)
            .collect()
    };
    workforce_efficiency(&happiness)
}

fn drive_residents(world: &mut World, home: BuildingId) {
    let config = world.config.workers;
    let residents = match world.buildings.get(&home) {
        Some(building) => building.residents().to_vec(),
        None => return,
    };
    for id in residents {
        let Some(worker) = world.workers.get_mut(id) else {
            continue;
        };
        worker.economy_second(&mut world.ledger, &config);
        let event = worker.age_one_second(&config);
        let growing = worker.is_growing();
        let age = worker.age;

        match event {
            Some(LifeEvent::CameOfAge) => {
                debug!(worker = %id, age, "came of age");
                if !growing {
                    let events = world.market.register_worker(id);
                    world.apply_market(events);
                }
            }
            Some(LifeEvent::Retired) => {
                debug!(worker = %id, age, "retired");
                let events = world.market.remove_worker(id);
                world.apply_market(events);
            }
            Some(LifeEvent::Died) => {
                debug!(worker = %id, age, "died");
                world.despawn_worker(id);
            }
            None => {}
        }
    }
}
