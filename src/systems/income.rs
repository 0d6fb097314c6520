use anyhow::Result;

use crate::{
    engine::System,
    ledger::ResourceKind,
    world::World,
};

/// Credits the base income before any building pays upkeep.
pub struct IncomeSystem;

impl IncomeSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IncomeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for IncomeSystem {
    fn name(&self) -> &str {
        "income"
    }

    fn run(&mut self, world: &mut World) -> Result<()> {
        let income = world.config.economy.income;
        world.ledger.add(ResourceKind::Money, income);
        Ok(())
    }
}
