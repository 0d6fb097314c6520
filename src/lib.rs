pub mod building;
pub mod config;
pub mod engine;
pub mod job_market;
pub mod ledger;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod spatial;
pub mod systems;
pub mod web;
pub mod worker;
pub mod world;

pub use engine::{Engine, EngineBuilder, EngineSettings};
pub use scenario::{Scenario, ScenarioLoader};
pub use world::{World, WorldSnapshot};
