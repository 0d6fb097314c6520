//! Tunable simulation constants. Every field has a serde default so scenario
//! files only spell out what they change.

use serde::{Deserialize, Serialize};

fn default_income() -> f64 {
    100.0
}

fn default_upkeep_interval_secs() -> f64 {
    60.0
}

fn default_one_year_every_secs() -> u32 {
    15
}

fn default_economy_interval_secs() -> u32 {
    30
}

fn default_adult_age() -> u32 {
    15
}

fn default_retirement_age() -> u32 {
    65
}

fn default_death_age() -> u32 {
    100
}

fn default_relax_secs() -> u32 {
    10
}

fn default_work_secs() -> u32 {
    20
}

fn default_grow_secs() -> f64 {
    0.5
}

fn default_secs_per_step_cost() -> f64 {
    0.5
}

fn default_fish_per_cycle() -> f64 {
    0.1
}

fn default_clothes_per_cycle() -> f64 {
    0.05
}

fn default_schnapps_per_cycle() -> f64 {
    0.05
}

fn default_tax_rate() -> f64 {
    5.0
}

fn default_settler_min_age() -> u32 {
    18
}

fn default_settler_max_age() -> u32 {
    40
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Money credited to the ledger every tick before buildings run.
    #[serde(default = "default_income")]
    pub income: f64,
    /// Building upkeep is quoted per this many seconds.
    #[serde(default = "default_upkeep_interval_secs")]
    pub upkeep_interval_secs: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            income: default_income(),
            upkeep_interval_secs: default_upkeep_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_one_year_every_secs")]
    pub one_year_every_secs: u32,
    #[serde(default = "default_economy_interval_secs")]
    pub economy_interval_secs: u32,
    #[serde(default = "default_adult_age")]
    pub adult_age: u32,
    #[serde(default = "default_retirement_age")]
    pub retirement_age: u32,
    #[serde(default = "default_death_age")]
    pub death_age: u32,
    #[serde(default = "default_relax_secs")]
    pub relax_secs: u32,
    #[serde(default = "default_work_secs")]
    pub work_secs: u32,
    /// Length of the growing-up animation. Job market entry waits for it.
    #[serde(default = "default_grow_secs")]
    pub grow_secs: f64,
    /// Animation seconds per unit of traversal cost for a single hop.
    #[serde(default = "default_secs_per_step_cost")]
    pub secs_per_step_cost: f64,
    #[serde(default = "default_fish_per_cycle")]
    pub fish_per_cycle: f64,
    #[serde(default = "default_clothes_per_cycle")]
    pub clothes_per_cycle: f64,
    #[serde(default = "default_schnapps_per_cycle")]
    pub schnapps_per_cycle: f64,
    /// Money paid per economy cycle by a fully happy employed worker.
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    /// Age range of the residents a new house starts with.
    #[serde(default = "default_settler_min_age")]
    pub settler_min_age: u32,
    #[serde(default = "default_settler_max_age")]
    pub settler_max_age: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            one_year_every_secs: default_one_year_every_secs(),
            economy_interval_secs: default_economy_interval_secs(),
            adult_age: default_adult_age(),
            retirement_age: default_retirement_age(),
            death_age: default_death_age(),
            relax_secs: default_relax_secs(),
            work_secs: default_work_secs(),
            grow_secs: default_grow_secs(),
            secs_per_step_cost: default_secs_per_step_cost(),
            fish_per_cycle: default_fish_per_cycle(),
            clothes_per_cycle: default_clothes_per_cycle(),
            schnapps_per_cycle: default_schnapps_per_cycle(),
            tax_rate: default_tax_rate(),
            settler_min_age: default_settler_min_age(),
            settler_max_age: default_settler_max_age(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub workers: WorkerConfig,
}
