//! Shard-funded upgrade shop
//!
//! The shop only validates and applies purchases; persisting which upgrades
//! were bought is the host's job.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Aerial melee multiplier granted by the aerial combo upgrade
pub const AERIAL_COMBO_MULT: f32 = 1.3;

/// Per-run upgrade flags carried by each player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeFlags {
    /// Extra dash charges on top of the base charge (0..=2)
    pub extra_dash: u8,
    /// Magic projectiles bounce off arena edges once
    pub ricochet: bool,
    /// Multiplier applied to airborne melee damage
    pub aerial_damage: f32,
    /// Stronger grapple pull
    pub grapple_boost: bool,
    /// Combat style selection unlocked
    pub style_switch: bool,
}

impl Default for UpgradeFlags {
    fn default() -> Self {
        Self {
            extra_dash: 0,
            ricochet: false,
            aerial_damage: 1.0,
            grapple_boost: false,
            style_switch: false,
        }
    }
}

impl UpgradeFlags {
    /// Dash charges available after landing
    pub fn max_dash_charges(&self) -> u8 {
        1 + self.extra_dash.min(2)
    }

    /// Apply a purchased upgrade
    pub fn apply(&mut self, id: UpgradeId) {
        match id {
            UpgradeId::TripleDash | UpgradeId::UltraDash => {
                self.extra_dash = (self.extra_dash + 1).min(2);
            }
            UpgradeId::Ricochet => self.ricochet = true,
            UpgradeId::AerialCombo => self.aerial_damage = AERIAL_COMBO_MULT,
            UpgradeId::GrappleBoost => self.grapple_boost = true,
            UpgradeId::StyleSwitch => self.style_switch = true,
        }
    }
}

/// Purchasable upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeId {
    TripleDash,
    UltraDash,
    Ricochet,
    AerialCombo,
    GrappleBoost,
    StyleSwitch,
}

impl UpgradeId {
    pub const ALL: [UpgradeId; 6] = [
        UpgradeId::TripleDash,
        UpgradeId::UltraDash,
        UpgradeId::Ricochet,
        UpgradeId::AerialCombo,
        UpgradeId::GrappleBoost,
        UpgradeId::StyleSwitch,
    ];

    /// Shard cost
    pub fn cost(&self) -> u64 {
        match self {
            UpgradeId::TripleDash => 15,
            UpgradeId::UltraDash => 25,
            UpgradeId::Ricochet => 18,
            UpgradeId::AerialCombo => 20,
            UpgradeId::GrappleBoost => 16,
            UpgradeId::StyleSwitch => 12,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UpgradeId::TripleDash => "+1 Dash charge.",
            UpgradeId::UltraDash => "+1 Dash charge (total +2).",
            UpgradeId::Ricochet => "Magic ricochets once.",
            UpgradeId::AerialCombo => "+30% airborne melee damage.",
            UpgradeId::GrappleBoost => "Grapple pulls 30% harder.",
            UpgradeId::StyleSwitch => "Unlock style switch (1..3).",
        }
    }
}

/// Why a purchase was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("upgrade {0:?} already owned")]
    AlreadyOwned(UpgradeId),
    #[error("upgrade {id:?} costs {cost} shards, only {available} available")]
    InsufficientShards {
        id: UpgradeId,
        cost: u64,
        available: u64,
    },
}

/// Upgrades owned in the current run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpgradeShop {
    pub owned: Vec<UpgradeId>,
}

impl UpgradeShop {
    pub fn new() -> Self {
        Self { owned: Vec::new() }
    }

    pub fn owns(&self, id: UpgradeId) -> bool {
        self.owned.contains(&id)
    }

    /// Catalog entries not yet purchased
    pub fn available(&self) -> impl Iterator<Item = UpgradeId> + '_ {
        UpgradeId::ALL.into_iter().filter(|id| !self.owns(*id))
    }

    /// Buy `id` with `shards`, deducting the cost on success
    pub fn purchase(&mut self, id: UpgradeId, shards: &mut u64) -> Result<(), PurchaseError> {
        if self.owns(id) {
            return Err(PurchaseError::AlreadyOwned(id));
        }
        let cost = id.cost();
        if *shards < cost {
            return Err(PurchaseError::InsufficientShards {
                id,
                cost,
                available: *shards,
            });
        }
        *shards -= cost;
        self.owned.push(id);
        log::debug!("Upgrade purchased: {:?} ({} shards left)", id, shards);
        Ok(())
    }

    /// Flags resulting from every owned upgrade
    pub fn flags(&self) -> UpgradeFlags {
        let mut flags = UpgradeFlags::default();
        for id in &self.owned {
            flags.apply(*id);
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_deducts_shards() {
        let mut shop = UpgradeShop::new();
        let mut shards = 30;
        shop.purchase(UpgradeId::Ricochet, &mut shards).unwrap();
        assert_eq!(shards, 12);
        assert!(shop.owns(UpgradeId::Ricochet));
        assert!(shop.flags().ricochet);
    }

    #[test]
    fn test_purchase_rejects_duplicates() {
        let mut shop = UpgradeShop::new();
        let mut shards = 100;
        shop.purchase(UpgradeId::StyleSwitch, &mut shards).unwrap();
        let err = shop.purchase(UpgradeId::StyleSwitch, &mut shards).unwrap_err();
        assert_eq!(err, PurchaseError::AlreadyOwned(UpgradeId::StyleSwitch));
        assert_eq!(shards, 88);
    }

    #[test]
    fn test_purchase_rejects_insufficient_funds() {
        let mut shop = UpgradeShop::new();
        let mut shards = 10;
        let err = shop.purchase(UpgradeId::UltraDash, &mut shards).unwrap_err();
        assert!(matches!(err, PurchaseError::InsufficientShards { cost: 25, .. }));
        assert_eq!(shards, 10);
        assert!(shop.owned.is_empty());
    }

    #[test]
    fn test_dash_upgrades_stack_to_three_charges() {
        let mut shop = UpgradeShop::new();
        let mut shards = 100;
        assert_eq!(shop.flags().max_dash_charges(), 1);
        shop.purchase(UpgradeId::TripleDash, &mut shards).unwrap();
        assert_eq!(shop.flags().max_dash_charges(), 2);
        shop.purchase(UpgradeId::UltraDash, &mut shards).unwrap();
        assert_eq!(shop.flags().max_dash_charges(), 3);
    }

    #[test]
    fn test_available_excludes_owned() {
        let mut shop = UpgradeShop::new();
        let mut shards = 100;
        shop.purchase(UpgradeId::AerialCombo, &mut shards).unwrap();
        assert_eq!(shop.available().count(), UpgradeId::ALL.len() - 1);
        assert!((shop.flags().aerial_damage - AERIAL_COMBO_MULT).abs() < f32::EPSILON);
    }
}
