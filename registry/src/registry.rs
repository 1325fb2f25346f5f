//! Stake-weighted validator bookkeeping.
//!
//! Entries are never physically deleted — history must remain auditable —
//! so removal is a status change. The backing map is a `BTreeMap` keyed by
//! address, giving every traversal a deterministic order; leader election
//! depends on this.

use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tessera_types::{Address, Amount};

/// Participation status of a registered validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorStatus {
    Active,
    Inactive,
    Slashed,
}

/// One registered validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorEntry {
    pub address: Address,
    pub stake: Amount,
    pub status: ValidatorStatus,
    /// Index of the last block this validator produced, if any.
    pub last_block_produced: Option<u64>,
}

/// Tracks stake-weighted participants eligible to produce blocks.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidatorRegistry {
    entries: BTreeMap<Address, ValidatorEntry>,
}

impl ValidatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Idempotent create-or-update: sets the stake to `initial_stake` and the
    /// status to `Active`. Registering twice with the same stake leaves the
    /// stake unchanged, not doubled. `last_block_produced` survives
    /// re-registration.
    pub fn register(&mut self, address: Address, initial_stake: Amount) {
        self.entries
            .entry(address.clone())
            .and_modify(|entry| {
                entry.stake = initial_stake;
                entry.status = ValidatorStatus::Active;
            })
            .or_insert(ValidatorEntry {
                address,
                stake: initial_stake,
                status: ValidatorStatus::Active,
                last_block_produced: None,
            });
    }

    /// Adjust a validator's stake by a signed delta. Fails with
    /// `WouldGoNegative` if the result would drop below zero; the stake is
    /// unchanged on failure.
    pub fn adjust_stake(&mut self, address: &Address, delta: i128) -> Result<Amount, RegistryError> {
        let entry = self
            .entries
            .get_mut(address)
            .ok_or_else(|| RegistryError::UnknownValidator(address.to_string()))?;

        let new_stake = if delta >= 0 {
            entry.stake.saturating_add(Amount::new(delta as u128))
        } else {
            entry
                .stake
                .checked_sub(Amount::new(delta.unsigned_abs()))
                .ok_or(RegistryError::WouldGoNegative {
                    address: address.to_string(),
                    stake: entry.stake.raw(),
                    delta,
                })?
        };
        entry.stake = new_stake;
        Ok(new_stake)
    }

    /// Set a validator's status (soft delete via `Inactive` or `Slashed`).
    pub fn set_status(
        &mut self,
        address: &Address,
        status: ValidatorStatus,
    ) -> Result<(), RegistryError> {
        let entry = self
            .entries
            .get_mut(address)
            .ok_or_else(|| RegistryError::UnknownValidator(address.to_string()))?;
        entry.status = status;
        Ok(())
    }

    /// Record that a validator produced the block at `height`.
    pub fn record_produced(&mut self, address: &Address, height: u64) {
        if let Some(entry) = self.entries.get_mut(address) {
            entry.last_block_produced = Some(height);
        }
    }

    /// Active validators with at least `minimum_stake`, in address order.
    /// Pure query, no side effects.
    pub fn active_eligible(&self, minimum_stake: Amount) -> Vec<&ValidatorEntry> {
        self.entries
            .values()
            .filter(|e| e.status == ValidatorStatus::Active && e.stake >= minimum_stake)
            .collect()
    }

    pub fn get(&self, address: &Address) -> Option<&ValidatorEntry> {
        self.entries.get(address)
    }

    /// Whether an address is registered and `Active`.
    pub fn is_active(&self, address: &Address) -> bool {
        matches!(
            self.entries.get(address),
            Some(ValidatorEntry {
                status: ValidatorStatus::Active,
                ..
            })
        )
    }

    /// All entries in address order.
    pub fn iter(&self) -> impl Iterator<Item = &ValidatorEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuild from snapshot entries, replacing current state.
    pub fn from_entries(entries: impl IntoIterator<Item = ValidatorEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| (e.address.clone(), e))
                .collect(),
        }
    }
}
