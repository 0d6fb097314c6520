use std::collections::BTreeMap;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::building::{Building, BuildingId, BuildingKind, BuildingRole, Catalogue, ProductionStatus};
use crate::config::SimConfig;
use crate::job_market::{JobId, JobMarket, MarketEvent};
use crate::ledger::{ResourceKind, ResourceLedger};
use crate::rng;
use crate::spatial::{FlowField, HexGrid, TileId, TilePos};
use crate::worker::{generate_name, CommuteState, Gender, LifeStage, Motion, Worker, WorkerId, WorkerPool};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlacementError {
    #[error("tile ({col}, {row}) is outside the map")]
    OutOfBounds { col: u32, row: u32 },
    #[error("tile ({col}, {row}) is already occupied by {building}")]
    Occupied { col: u32, row: u32, building: BuildingId },
    #[error("{kind:?} cannot be built on {terrain:?}")]
    WrongTerrain { kind: BuildingKind, terrain: crate::spatial::Terrain },
    #[error("{kind:?} needs {needed} {resource}, only {available} in stock")]
    Unaffordable {
        kind: BuildingKind,
        resource: ResourceKind,
        needed: f64,
        available: f64,
    },
    #[error("no building at ({col}, {row})")]
    NothingToDemolish { col: u32, row: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingSnapshot {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub col: u32,
    pub row: u32,
    pub efficiency: f64,
    pub progress: f64,
    pub status: ProductionStatus,
    pub capacity: u32,
    pub workforce: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSnapshot {
    pub id: WorkerId,
    pub name: String,
    pub gender: Gender,
    pub age: u32,
    pub stage: LifeStage,
    pub happiness: f64,
    pub home: BuildingId,
    pub job: Option<JobId>,
    pub col: u32,
    pub row: u32,
    pub commute: CommuteState,
    pub motion: Option<Motion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub tick: u64,
    pub ledger: BTreeMap<ResourceKind, f64>,
    pub total_population: usize,
    pub employed: usize,
    pub idle: usize,
    pub vacancies: usize,
    pub buildings: Vec<BuildingSnapshot>,
    pub workers: Vec<WorkerSnapshot>,
}

#[derive(Debug)]
pub struct World {
    tick: u64,
    next_building: u32,
    pub(crate) config: SimConfig,
    pub(crate) grid: HexGrid,
    pub(crate) ledger: ResourceLedger,
    pub(crate) catalogue: Catalogue,
    pub(crate) buildings: BTreeMap<BuildingId, Building>,
    pub(crate) market: JobMarket,
    pub(crate) workers: WorkerPool,
    settlers: ChaCha8Rng,
}

impl World {
    pub fn new(grid: HexGrid, ledger: ResourceLedger, catalogue: Catalogue, config: SimConfig, seed: u64) -> Self {
        Self {
            tick: 0,
            next_building: 0,
            config,
            grid,
            ledger,
            catalogue,
            buildings: BTreeMap::new(),
            market: JobMarket::new(rng::seeded(seed, "job_market")),
            workers: WorkerPool::new(),
            settlers: rng::seeded(seed, "settlers"),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance_time(&mut self) {
        self.tick += 1;
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ResourceLedger {
        &mut self.ledger
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn market(&self) -> &JobMarket {
        &self.market
    }

    pub fn workers(&self) -> &WorkerPool {
        &self.workers
    }

    pub fn worker(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.get(id)
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(&id)
    }

    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    pub fn building_at(&self, pos: TilePos) -> Option<&Building> {
        let tile = self.grid.pos_to_id(pos)?;
        self.grid.tile(tile).building().and_then(|id| self.buildings.get(&id))
    }

    pub fn total_population(&self) -> usize {
        self.workers.len()
    }

    pub fn employed_count(&self) -> usize {
        self.market.occupied_count()
    }

    /// Checks location and affordability without touching anything.
    pub fn check_placement(&self, pos: TilePos, kind: BuildingKind) -> Result<TileId, PlacementError> {
        let tile = self.locate(pos, kind)?;
        let spec = self.catalogue.spec(kind);
        for (resource, needed) in [
            (ResourceKind::Money, spec.cost_money),
            (ResourceKind::Planks, spec.cost_planks),
        ] {
            if !self.ledger.has(resource, needed) {
                return Err(PlacementError::Unaffordable {
                    kind,
                    resource,
                    needed,
                    available: self.ledger.amount(resource),
                });
            }
        }
        Ok(tile)
    }

    pub fn can_place(&self, pos: TilePos, kind: BuildingKind) -> bool {
        self.check_placement(pos, kind).is_ok()
    }

    /// Pays the build costs and constructs. Both costs are checked before
    /// either is charged.
    pub fn place_building(&mut self, pos: TilePos, kind: BuildingKind) -> Result<BuildingId, PlacementError> {
        self.check_placement(pos, kind)?;
        let spec = self.catalogue.spec(kind);
        let (money, planks) = (spec.cost_money, spec.cost_planks);
        self.ledger.try_remove(ResourceKind::Money, money);
        self.ledger.try_remove(ResourceKind::Planks, planks);
        self.construct(pos, kind)
    }

    /// Builds without charging: links the tile, computes the flow field and
    /// opens jobs or moves the first residents in.
    pub fn construct(&mut self, pos: TilePos, kind: BuildingKind) -> Result<BuildingId, PlacementError> {
        let tile = self.locate(pos, kind)?;
        let spec = self.catalogue.spec(kind).clone();
        let id = BuildingId::new(self.next_building);
        self.next_building += 1;

        let flow_field = FlowField::compute(&self.grid, tile);
        let role = spec.role.clone();
        let capacity = spec.capacity;
        self.buildings.insert(id, Building::new(id, kind, tile, spec, flow_field));
        self.grid.set_building(tile, Some(id));

        match role {
            BuildingRole::Production { .. } => {
                let jobs: Vec<JobId> = (0..capacity).map(|_| self.market.create_job(id)).collect();
                if let Some(building) = self.buildings.get_mut(&id) {
                    building.jobs = jobs.clone();
                }
                let events = self.market.register_jobs(&jobs);
                self.apply_market(events);
            }
            BuildingRole::Housing {
                initial_residents, ..
            } => {
                let workers = self.config.workers;
                for _ in 0..initial_residents.min(capacity) {
                    let age = self
                        .settlers
                        .gen_range(workers.settler_min_age..=workers.settler_max_age.max(workers.settler_min_age));
                    let worker = self.spawn_worker(id, age);
                    if self.workers.get(worker).is_some_and(|w| w.stage == LifeStage::Adult) {
                        let events = self.market.register_worker(worker);
                        self.apply_market(events);
                    }
                }
            }
        }

        info!(building = %id, ?kind, col = pos.col, row = pos.row, "building constructed");
        Ok(id)
    }

    /// Tears a building down. Jobs go back through the market, residents
    /// are despawned.
    pub fn demolish(&mut self, pos: TilePos) -> Result<BuildingKind, PlacementError> {
        let not_found = PlacementError::NothingToDemolish {
            col: pos.col,
            row: pos.row,
        };
        let tile = self.grid.pos_to_id(pos).ok_or_else(|| not_found.clone())?;
        let id = self.grid.tile(tile).building().ok_or_else(|| not_found.clone())?;
        let building = self.buildings.remove(&id).ok_or(not_found)?;

        if building.spec.is_housing() {
            for resident in building.residents() {
                self.despawn_worker(*resident);
            }
        } else {
            let events = self.market.remove_jobs(building.jobs());
            self.apply_market(events);
        }
        self.grid.set_building(tile, None);

        info!(building = %id, kind = ?building.kind, col = pos.col, row = pos.row, "building demolished");
        Ok(building.kind)
    }

    fn locate(&self, pos: TilePos, kind: BuildingKind) -> Result<TileId, PlacementError> {
        let tile = self.grid.pos_to_id(pos).ok_or(PlacementError::OutOfBounds {
            col: pos.col,
            row: pos.row,
        })?;
        let found = self.grid.tile(tile);
        if let Some(building) = found.building() {
            return Err(PlacementError::Occupied {
                col: pos.col,
                row: pos.row,
                building,
            });
        }
        if !self.catalogue.spec(kind).buildable_on.contains(&found.terrain) {
            return Err(PlacementError::WrongTerrain {
                kind,
                terrain: found.terrain,
            });
        }
        Ok(tile)
    }

    pub(crate) fn spawn_worker(&mut self, home: BuildingId, age: u32) -> WorkerId {
        let gender = Gender::random(&mut self.settlers);
        let name = generate_name(&mut self.settlers, gender);
        let tile = self.buildings.get(&home).map(|b| b.tile).unwrap_or_default();
        let config = self.config.workers;
        let id = self
            .workers
            .acquire(|id| Worker::new(id, name, gender, age, home, tile, &config));
        if let Some(building) = self.buildings.get_mut(&home) {
            building.residents.push(id);
        }
        debug!(worker = %id, %home, age, "worker moved in");
        id
    }

    /// Removes a worker from the market, its home and the pool.
    pub(crate) fn despawn_worker(&mut self, id: WorkerId) {
        let events = self.market.remove_worker(id);
        self.apply_market(events);
        if let Some(worker) = self.workers.release(id) {
            if let Some(home) = self.buildings.get_mut(&worker.home) {
                home.residents.retain(|r| *r != id);
            }
        }
    }

    /// Mirrors market bindings onto the workers.
    pub(crate) fn apply_market(&mut self, events: Vec<MarketEvent>) {
        for event in events {
            match event {
                MarketEvent::Hired { worker, job } => {
                    if let Some(w) = self.workers.get_mut(worker) {
                        w.job = Some(job);
                        w.happiness = 1.0;
                    }
                }
                MarketEvent::Released { worker, job } => {
                    if let Some(w) = self.workers.get_mut(worker) {
                        if w.job == Some(job) {
                            w.job = None;
                        }
                    }
                }
            }
        }
    }

    /// Presentation time: advances in-flight motions and growing-up timers.
    /// Workers who finish growing up join the job market here.
    pub fn animate(&mut self, dt_secs: f64) {
        let mut grown = Vec::new();
        for id in self.workers.ids() {
            if let Some(worker) = self.workers.get_mut(id) {
                if worker.animate(dt_secs) {
                    grown.push(id);
                }
            }
        }
        for id in grown {
            let events = self.market.register_worker(id);
            self.apply_market(events);
        }
    }

    pub fn snapshot(&self, scenario: &str) -> WorldSnapshot {
        let position = |tile: TileId| self.grid.id_to_pos(tile).unwrap_or(TilePos::new(0, 0));
        let buildings = self
            .buildings
            .values()
            .map(|b| {
                let pos = position(b.tile);
                let workforce = if b.spec.is_housing() {
                    b.residents().len()
                } else {
                    b.jobs()
                        .iter()
                        .filter(|job| self.market.job(**job).is_some_and(|j| j.worker.is_some()))
                        .count()
                };
                BuildingSnapshot {
                    id: b.id,
                    kind: b.kind,
                    col: pos.col,
                    row: pos.row,
                    efficiency: b.efficiency,
                    progress: b.progress,
                    status: b.status,
                    capacity: b.spec.capacity,
                    workforce,
                }
            })
            .collect();
        let workers = self
            .workers
            .iter()
            .map(|w| {
                let pos = position(w.tile);
                WorkerSnapshot {
                    id: w.id,
                    name: w.name.clone(),
                    gender: w.gender,
                    age: w.age,
                    stage: w.stage,
                    happiness: w.happiness,
                    home: w.home,
                    job: w.job,
                    col: pos.col,
                    row: pos.row,
                    commute: w.commute,
                    motion: w.motion,
                }
            })
            .collect();

        WorldSnapshot {
            scenario: scenario.to_string(),
            tick: self.tick,
            ledger: self.ledger.balances().clone(),
            total_population: self.total_population(),
            employed: self.market.occupied_count(),
            idle: self.market.idle_count(),
            vacancies: self.market.vacancy_count(),
            buildings,
            workers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Terrain;

    fn world(money: f64, planks: f64) -> World {
        let grid = HexGrid::from_rows(&["WSGGF", "WSGGF", "WSGGF"]).unwrap();
        let ledger = ResourceLedger::with_balances([(ResourceKind::Money, money), (ResourceKind::Planks, planks)]);
        World::new(grid, ledger, Catalogue::standard(), SimConfig::default(), 11)
    }

    #[test]
    fn placement_is_validated_before_charging() {
        let mut world = world(1000.0, 1.0);
        assert_eq!(
            world.place_building(TilePos::new(9, 0), BuildingKind::Sawmill),
            Err(PlacementError::OutOfBounds { col: 9, row: 0 })
        );
        assert_eq!(
            world.place_building(TilePos::new(0, 0), BuildingKind::Sawmill),
            Err(PlacementError::WrongTerrain {
                kind: BuildingKind::Sawmill,
                terrain: Terrain::Water
            })
        );
        // planks short: no money charged either
        assert!(matches!(
            world.place_building(TilePos::new(1, 0), BuildingKind::Fishery),
            Err(PlacementError::Unaffordable {
                resource: ResourceKind::Planks,
                ..
            })
        ));
        assert_eq!(world.ledger().amount(ResourceKind::Money), 1000.0);

        let id = world.place_building(TilePos::new(2, 0), BuildingKind::Sawmill).unwrap();
        assert_eq!(world.ledger().amount(ResourceKind::Money), 900.0);
        assert_eq!(world.building_at(TilePos::new(2, 0)).map(|b| b.id), Some(id));
        assert!(matches!(
            world.place_building(TilePos::new(2, 0), BuildingKind::Sawmill),
            Err(PlacementError::Occupied { .. })
        ));
    }

    #[test]
    fn production_opens_capacity_jobs() {
        let mut world = world(1000.0, 10.0);
        let id = world.place_building(TilePos::new(2, 1), BuildingKind::Sawmill).unwrap();
        let building = world.building(id).unwrap();
        assert_eq!(building.jobs().len(), 10);
        assert_eq!(world.market().vacancy_count(), 10);
        assert_eq!(building.flow_field().destination(), building.tile);
    }

    #[test]
    fn residents_move_in_and_get_hired() {
        let mut world = world(1000.0, 10.0);
        world.place_building(TilePos::new(2, 1), BuildingKind::Sawmill).unwrap();
        let house = world.place_building(TilePos::new(3, 1), BuildingKind::FarmersResidence).unwrap();

        assert_eq!(world.total_population(), 2);
        assert_eq!(world.employed_count(), 2);
        for resident in world.building(house).unwrap().residents() {
            let worker = world.worker(*resident).unwrap();
            assert_eq!(worker.stage, LifeStage::Adult);
            assert!(worker.job.is_some());
            assert_eq!(worker.home, house);
            assert!((18..=40).contains(&worker.age));
        }
    }

    #[test]
    fn demolishing_a_workplace_releases_workers() {
        let mut world = world(1000.0, 10.0);
        world.place_building(TilePos::new(2, 1), BuildingKind::Sawmill).unwrap();
        world.place_building(TilePos::new(3, 1), BuildingKind::FarmersResidence).unwrap();

        assert_eq!(world.demolish(TilePos::new(2, 1)), Ok(BuildingKind::Sawmill));
        assert_eq!(world.employed_count(), 0);
        assert_eq!(world.market().idle_count(), 2);
        assert!(world.workers().iter().all(|w| w.job.is_none()));
        assert!(world.building_at(TilePos::new(2, 1)).is_none());
        assert_eq!(
            world.demolish(TilePos::new(2, 1)),
            Err(PlacementError::NothingToDemolish { col: 2, row: 1 })
        );
    }

    #[test]
    fn demolishing_a_house_despawns_residents() {
        let mut world = world(1000.0, 10.0);
        world.place_building(TilePos::new(2, 1), BuildingKind::Sawmill).unwrap();
        world.place_building(TilePos::new(3, 1), BuildingKind::FarmersResidence).unwrap();

        world.demolish(TilePos::new(3, 1)).unwrap();
        assert_eq!(world.total_population(), 0);
        assert_eq!(world.employed_count(), 0);
        assert_eq!(world.market().vacancy_count(), 10);
    }

    #[test]
    fn snapshot_lists_everything() {
        let mut world = world(1000.0, 10.0);
        world.place_building(TilePos::new(2, 1), BuildingKind::Sawmill).unwrap();
        world.place_building(TilePos::new(3, 1), BuildingKind::FarmersResidence).unwrap();
        let snapshot = world.snapshot("test");
        assert_eq!(snapshot.buildings.len(), 2);
        assert_eq!(snapshot.workers.len(), 2);
        assert_eq!(snapshot.employed, 2);
        assert_eq!(snapshot.vacancies, 8);
        assert_eq!(snapshot.buildings[0].workforce, 2);
        assert_eq!(snapshot.ledger[&ResourceKind::Money], 800.0);
    }
}
