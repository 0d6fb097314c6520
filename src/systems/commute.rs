use anyhow::Result;

use crate::{
    engine::System,
    worker::Routes,
    world::World,
};

/// Steps every worker's commute by one second, steering by the home and
/// workplace flow fields.
pub struct CommuteSystem;

impl CommuteSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CommuteSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CommuteSystem {
    fn name(&self) -> &str {
        "commute"
    }

    fn run(&mut self, world: &mut World) -> Result<()> {
        let config = world.config.workers;
        for id in world.workers.ids() {
            let Some((home, job)) = world.workers.get(id).map(|w| (w.home, w.job)) else {
                continue;
            };
            // homeless workers are gone from the simulation
            let Some(home_field) = world.buildings.get(&home).map(|b| b.flow_field()) else {
                continue;
            };
            let work_field = job
                .and_then(|job| world.market.job(job))
                .and_then(|job| world.buildings.get(&job.building))
                .map(|b| b.flow_field());
            let routes = Routes {
                home: home_field,
                work: work_field,
            };
            if let Some(worker) = world.workers.get_mut(id) {
                worker.commute_second(&config, routes, &world.grid);
            }
        }
        Ok(())
    }
}
