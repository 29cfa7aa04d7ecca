//! Validator registry
//!
//! Validators keep registration order and are never removed, only
//! deactivated. Voting power is fixed when a validator is registered:
//! `stake / total stake registered so far (including this one)`. Later
//! registrations and deactivations do not renormalize earlier entries, so the
//! active set's voting power can sum to something other than 1.

use crate::error::RegistryError;
use crate::types::{Validator, ValidatorSpec};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
struct RegistryInner {
    /// Registration order
    validators: Vec<Validator>,
    /// id -> position in `validators`
    index: HashMap<String, usize>,
    /// Stake of every validator ever registered, active or not
    registered_stake: u64,
}

impl RegistryInner {
    fn get_mut(&mut self, id: &str) -> Result<&mut Validator, RegistryError> {
        let pos = *self
            .index
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        Ok(&mut self.validators[pos])
    }

    fn push(&mut self, spec: &ValidatorSpec, voting_power: f64) -> Validator {
        let validator = Validator {
            id: spec.id.clone(),
            stake: spec.stake,
            commission: spec.commission,
            active: true,
            performance: 1.0,
            voting_power,
        };
        self.index.insert(spec.id.clone(), self.validators.len());
        self.validators.push(validator.clone());
        validator
    }
}

/// Thread-safe validator set
#[derive(Default)]
pub struct ValidatorRegistry {
    inner: RwLock<RegistryInner>,
}

fn share(stake: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        stake as f64 / total as f64
    }
}

fn check_commission(spec: &ValidatorSpec) -> Result<(), RegistryError> {
    if (0.0..=1.0).contains(&spec.commission) {
        Ok(())
    } else {
        Err(RegistryError::InvalidCommission {
            id: spec.id.clone(),
            commission: spec.commission,
        })
    }
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one validator with a point-in-time voting power snapshot
    pub fn register(
        &self,
        id: impl Into<String>,
        stake: u64,
        commission: f64,
    ) -> Result<Validator, RegistryError> {
        let spec = ValidatorSpec::new(id, stake, commission);
        check_commission(&spec)?;

        let mut inner = self.inner.write();
        if inner.index.contains_key(&spec.id) {
            return Err(RegistryError::AlreadyExists(spec.id));
        }

        let total = inner.registered_stake.saturating_add(spec.stake);
        inner.registered_stake = total;
        let validator = inner.push(&spec, share(spec.stake, total));

        tracing::debug!(
            "Registered validator {} (stake {}, voting power {:.6})",
            validator.id,
            validator.stake,
            validator.voting_power
        );
        Ok(validator)
    }

    /// Register a set of validators together.
    ///
    /// Either every spec is registered or none is. Each member's voting power
    /// is its share of the stake registered before the batch plus the whole
    /// batch, so a batch into an empty registry sums to 1.
    pub fn register_batch(&self, specs: &[ValidatorSpec]) -> Result<Vec<Validator>, RegistryError> {
        let mut inner = self.inner.write();

        let mut seen = HashSet::with_capacity(specs.len());
        for spec in specs {
            check_commission(spec)?;
            if inner.index.contains_key(&spec.id) {
                return Err(RegistryError::AlreadyExists(spec.id.clone()));
            }
            if !seen.insert(spec.id.as_str()) {
                return Err(RegistryError::DuplicateInBatch { id: spec.id.clone() });
            }
        }

        let total = specs
            .iter()
            .fold(inner.registered_stake, |acc, s| acc.saturating_add(s.stake));
        inner.registered_stake = total;

        let registered: Vec<Validator> = specs
            .iter()
            .map(|spec| inner.push(spec, share(spec.stake, total)))
            .collect();

        tracing::debug!("Registered batch of {} validators (total stake {})", registered.len(), total);
        Ok(registered)
    }

    pub fn get(&self, id: &str) -> Option<Validator> {
        let inner = self.inner.read();
        inner.index.get(id).map(|&pos| inner.validators[pos].clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.read().index.contains_key(id)
    }

    /// Active validators in registration order
    pub fn list_active(&self) -> Vec<Validator> {
        self.with_active(|active| active.into_iter().cloned().collect())
    }

    /// All validators, active or not, in registration order
    pub fn list_all(&self) -> Vec<Validator> {
        self.inner.read().validators.clone()
    }

    /// Run `f` over the active set under a single read lock.
    ///
    /// Registrations and (de)activations wait until `f` returns, so the set
    /// `f` sees cannot change underneath it.
    pub fn with_active<R>(&self, f: impl FnOnce(Vec<&Validator>) -> R) -> R {
        let inner = self.inner.read();
        let active: Vec<&Validator> = inner.validators.iter().filter(|v| v.active).collect();
        f(active)
    }

    pub fn total_stake(&self, active_only: bool) -> u64 {
        self.inner
            .read()
            .validators
            .iter()
            .filter(|v| !active_only || v.active)
            .fold(0u64, |acc, v| acc.saturating_add(v.stake))
    }

    pub fn total_voting_power(&self, active_only: bool) -> f64 {
        self.inner
            .read()
            .validators
            .iter()
            .filter(|v| !active_only || v.active)
            .map(|v| v.voting_power)
            .sum()
    }

    pub fn deactivate(&self, id: &str) -> Result<(), RegistryError> {
        self.set_active(id, false)
    }

    pub fn activate(&self, id: &str) -> Result<(), RegistryError> {
        self.set_active(id, true)
    }

    fn set_active(&self, id: &str, active: bool) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        let validator = inner.get_mut(id)?;
        if validator.active != active {
            validator.active = active;
            tracing::info!(
                "Validator {} {}",
                id,
                if active { "activated" } else { "deactivated" }
            );
        }
        Ok(())
    }

    /// Number of registered validators, active or not
    pub fn len(&self) -> usize {
        self.inner.read().validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().validators.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.inner.read().validators.iter().filter(|v| v.active).count()
    }
}
