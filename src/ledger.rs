//! # Resource Ledger
//!
//! Resource types, resource maps and the capped store production folds into.

use crate::{BurrowError, BurrowResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every resource the economy tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Crystals,
    Food,
    Gold,
    Flux,
    Research,
    Essence,
    Corruption,
}

impl ResourceType {
    /// All resource types in ledger order.
    pub fn all() -> [ResourceType; 7] {
        [
            ResourceType::Crystals,
            ResourceType::Food,
            ResourceType::Gold,
            ResourceType::Flux,
            ResourceType::Research,
            ResourceType::Essence,
            ResourceType::Corruption,
        ]
    }

    /// Lower-case resource name.
    pub fn name(self) -> &'static str {
        match self {
            ResourceType::Crystals => "crystals",
            ResourceType::Food => "food",
            ResourceType::Gold => "gold",
            ResourceType::Flux => "flux",
            ResourceType::Research => "research",
            ResourceType::Essence => "essence",
            ResourceType::Corruption => "corruption",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Amount per resource. Ordered so output and serialization are stable.
pub type ResourceMap = BTreeMap<ResourceType, f64>;

/// Adds every entry of `delta` into `total`.
pub fn merge_resources(total: &mut ResourceMap, delta: &ResourceMap) {
    for (&resource, &amount) in delta {
        *total.entry(resource).or_insert(0.0) += amount;
    }
}

/// Removes zero entries so an all-zero map compares equal to an empty one.
pub fn drop_zero_entries(map: &mut ResourceMap) {
    map.retain(|_, amount| *amount != 0.0);
}

/// Current amount and cap of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceAmount {
    pub current: f64,
    pub max: f64,
}

/// The authoritative resource store, each resource capped independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    pub resources: BTreeMap<ResourceType, ResourceAmount>,
}

impl ResourceLedger {
    /// Creates an empty ledger with the given caps.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{ResourceLedger, ResourceType};
    /// use std::collections::BTreeMap;
    ///
    /// let caps = BTreeMap::from([(ResourceType::Gold, 100.0)]);
    /// let ledger = ResourceLedger::with_caps(&caps);
    /// assert_eq!(ledger.current(ResourceType::Gold), 0.0);
    /// assert_eq!(ledger.max(ResourceType::Gold), 100.0);
    /// ```
    pub fn with_caps(caps: &ResourceMap) -> Self {
        let resources = caps
            .iter()
            .map(|(&resource, &max)| (resource, ResourceAmount { current: 0.0, max }))
            .collect();
        Self { resources }
    }

    /// Current amount of a resource; untracked resources hold nothing.
    pub fn current(&self, resource: ResourceType) -> f64 {
        self.resources
            .get(&resource)
            .map(|amount| amount.current)
            .unwrap_or(0.0)
    }

    /// Cap of a resource; untracked resources have no room.
    pub fn max(&self, resource: ResourceType) -> f64 {
        self.resources
            .get(&resource)
            .map(|amount| amount.max)
            .unwrap_or(0.0)
    }

    /// Whether every entry of `cost` is covered by the current amounts.
    pub fn can_afford(&self, cost: &ResourceMap) -> bool {
        cost.iter()
            .all(|(&resource, &amount)| self.current(resource) >= amount)
    }

    /// Returns a ledger with `cost` deducted.
    pub fn pay(&self, cost: &ResourceMap) -> BurrowResult<ResourceLedger> {
        if let Some((resource, amount)) = cost
            .iter()
            .find(|&(&resource, &amount)| self.current(resource) < amount)
        {
            return Err(BurrowError::InsufficientResources(format!(
                "need {} {}, have {}",
                amount,
                resource,
                self.current(*resource)
            )));
        }

        let mut ledger = self.clone();
        for (&resource, &amount) in cost {
            if let Some(entry) = ledger.resources.get_mut(&resource) {
                entry.current -= amount;
            }
        }
        Ok(ledger)
    }

    /// Folds a production delta in, clamping each resource to `[0, max]`.
    ///
    /// Resources without a cap entry are ignored.
    pub fn apply_delta(&mut self, delta: &ResourceMap) {
        for (resource, &amount) in delta {
            if let Some(entry) = self.resources.get_mut(resource) {
                entry.current = (entry.current + amount).clamp(0.0, entry.max);
            } else {
                log::warn!("Dropping {} {}: no ledger entry", amount, resource);
            }
        }
    }

    /// Whether dark upgrades are unlocked by the corruption held.
    pub fn dark_upgrades_unlocked(&self) -> bool {
        self.current(ResourceType::Corruption) >= crate::config::DARK_UPGRADE_CORRUPTION_THRESHOLD
    }
}
