use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Every good the settlement can store. `None` marks "no resource" in building
/// specs and is never stocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Money,
    Wood,
    Planks,
    Fish,
    Wool,
    Clothes,
    Potato,
    Schnapps,
    None,
}

impl ResourceKind {
    pub const STOCKED: [ResourceKind; 8] = [
        ResourceKind::Money,
        ResourceKind::Wood,
        ResourceKind::Planks,
        ResourceKind::Fish,
        ResourceKind::Wool,
        ResourceKind::Clothes,
        ResourceKind::Potato,
        ResourceKind::Schnapps,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceKind::Money => "Money",
            ResourceKind::Wood => "Wood",
            ResourceKind::Planks => "Planks",
            ResourceKind::Fish => "Fish",
            ResourceKind::Wool => "Wool",
            ResourceKind::Clothes => "Clothes",
            ResourceKind::Potato => "Potato",
            ResourceKind::Schnapps => "Schnapps",
            ResourceKind::None => "None",
        };
        f.write_str(label)
    }
}

/// Authoritative store of every stocked resource.
///
/// Withdrawals only go through [`ResourceLedger::try_remove`], so a balance
/// never drops below zero. Asking about an unstocked kind is a programming
/// error and panics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    balances: BTreeMap<ResourceKind, f64>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self {
            balances: ResourceKind::STOCKED.iter().map(|kind| (*kind, 0.0)).collect(),
        }
    }

    pub fn with_balances(balances: impl IntoIterator<Item = (ResourceKind, f64)>) -> Self {
        let mut ledger = Self::new();
        for (kind, amount) in balances {
            ledger.set(kind, amount);
        }
        ledger
    }

    pub fn amount(&self, kind: ResourceKind) -> f64 {
        *self.slot(kind)
    }

    /// True when at least one unit is stored.
    pub fn has_any(&self, kind: ResourceKind) -> bool {
        self.has(kind, 1.0)
    }

    pub fn has(&self, kind: ResourceKind, amount: f64) -> bool {
        *self.slot(kind) >= amount
    }

    pub fn add(&mut self, kind: ResourceKind, amount: f64) {
        *self.slot_mut(kind) += amount;
    }

    /// Check-then-subtract. Leaves the balance untouched on failure.
    pub fn try_remove(&mut self, kind: ResourceKind, amount: f64) -> bool {
        let slot = self.slot_mut(kind);
        if *slot >= amount {
            *slot -= amount;
            true
        } else {
            false
        }
    }

    /// Overwrites a balance. Used when seeding a scenario.
    pub fn set(&mut self, kind: ResourceKind, amount: f64) {
        *self.slot_mut(kind) = amount;
    }

    pub fn balances(&self) -> &BTreeMap<ResourceKind, f64> {
        &self.balances
    }

    fn slot(&self, kind: ResourceKind) -> &f64 {
        self.balances
            .get(&kind)
            .unwrap_or_else(|| panic!("resource {kind} is not stocked in the ledger"))
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> &mut f64 {
        self.balances
            .get_mut(&kind)
            .unwrap_or_else(|| panic!("resource {kind} is not stocked in the ledger"))
    }
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResourceLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (kind, amount) in &self.balances {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{kind}: {amount:05.0}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stocks_every_kind_at_zero() {
        let ledger = ResourceLedger::new();
        for kind in ResourceKind::STOCKED {
            assert_eq!(ledger.amount(kind), 0.0);
        }
        assert_eq!(ledger.balances().len(), 8);
    }

    #[test]
    fn try_remove_is_all_or_nothing() {
        let mut ledger = ResourceLedger::with_balances([(ResourceKind::Fish, 2.5)]);
        assert!(!ledger.try_remove(ResourceKind::Fish, 3.0));
        assert_eq!(ledger.amount(ResourceKind::Fish), 2.5);
        assert!(ledger.try_remove(ResourceKind::Fish, 2.5));
        assert_eq!(ledger.amount(ResourceKind::Fish), 0.0);
    }

    #[test]
    fn has_any_needs_a_whole_unit() {
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::Wood, 0.5);
        assert!(!ledger.has_any(ResourceKind::Wood));
        ledger.add(ResourceKind::Wood, 0.5);
        assert!(ledger.has_any(ResourceKind::Wood));
    }

    #[test]
    #[should_panic(expected = "not stocked")]
    fn sentinel_kind_fails_fast() {
        let ledger = ResourceLedger::new();
        ledger.has(ResourceKind::None, 1.0);
    }

    #[test]
    fn display_lists_balances_in_order() {
        let ledger = ResourceLedger::with_balances([(ResourceKind::Money, 1000.0)]);
        let text = ledger.to_string();
        assert!(text.starts_with("Money: 01000 Wood: 00000"));
        assert!(text.ends_with("Schnapps: 00000"));
    }
}
