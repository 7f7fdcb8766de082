//! # Pool Registry
//!
//! Owns named pools, routes acquire/release by name, and records the
//! provenance of every instance on loan so it can be returned blind.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::pool::{Disposition, Factory, Poolable, Pooled, ResourcePool};
use crate::error::{PoolError, PoolResult};
use crate::ids::InstanceId;

/// Result of handing an instance back to the registry.
#[must_use]
#[derive(Debug)]
pub enum ReleaseOutcome<T> {
    /// The issuing pool took it back.
    Returned(Disposition),
    /// No provenance on record. The instance is handed back so the caller
    /// can dispose of it through its own path.
    Unrouted(Pooled<T>),
}

impl<T> ReleaseOutcome<T> {
    /// Whether the registry took ownership of the instance.
    #[inline]
    #[must_use]
    pub const fn is_returned(&self) -> bool {
        matches!(self, Self::Returned(_))
    }
}

/// Registry of named pools serving one instance type.
pub struct PoolRegistry<T: Poolable> {
    /// Pools by unique name.
    pools: HashMap<String, ResourcePool<T>>,
    /// Instance on loan -> name of the pool that issued it.
    provenance: HashMap<InstanceId, String>,
    /// Tag for the next registered pool (0 is reserved for standalone pools).
    next_tag: u32,
}

impl<T: Poolable> PoolRegistry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pools: HashMap::new(),
            provenance: HashMap::new(),
            next_tag: 1,
        }
    }

    /// Creates and stores a pool under `name`.
    ///
    /// # Errors
    ///
    /// - [`PoolError::DuplicatePool`] if `name` is taken
    /// - [`PoolError::InvalidCapacity`] / [`PoolError::FactoryFailure`] from pool construction
    pub fn register_pool(
        &mut self,
        name: impl Into<String>,
        kind: T::Kind,
        factory: Factory<T>,
        initial_size: usize,
        max_size: usize,
    ) -> PoolResult<()> {
        let name = name.into();
        if self.pools.contains_key(&name) {
            return Err(PoolError::DuplicatePool(name));
        }

        let pool = ResourcePool::with_tag(
            name.clone(),
            kind,
            factory,
            initial_size,
            max_size,
            self.next_tag,
        )?;
        self.next_tag += 1;

        debug!(pool = %name, initial_size, max_size, "registered pool");
        self.pools.insert(name, pool);
        Ok(())
    }

    /// Acquires from the named pool and records provenance.
    ///
    /// # Errors
    ///
    /// - [`PoolError::PoolNotFound`] if `name` is unregistered
    /// - [`PoolError::FactoryFailure`] if the pool serves a different kind or
    ///   its factory failed
    pub fn acquire(&mut self, name: &str, kind: T::Kind) -> PoolResult<Pooled<T>> {
        let Some(pool) = self.pools.get_mut(name) else {
            warn!(pool = name, "acquire from unregistered pool");
            return Err(PoolError::PoolNotFound(name.to_owned()));
        };

        if pool.kind() != kind {
            warn!(pool = name, requested = ?kind, served = ?pool.kind(), "pool kind mismatch");
            return Err(PoolError::FactoryFailure {
                pool: name.to_owned(),
                reason: format!("pool serves {:?}, requested {:?}", pool.kind(), kind),
            });
        }

        let instance = pool.acquire()?;
        self.provenance.insert(instance.id(), name.to_owned());
        Ok(instance)
    }

    /// Routes an instance back to the pool that issued it.
    pub fn release(&mut self, instance: Pooled<T>) -> ReleaseOutcome<T> {
        let Some(name) = self.provenance.remove(&instance.id()) else {
            debug!(id = %instance.id(), "release without provenance");
            return ReleaseOutcome::Unrouted(instance);
        };

        match self.pools.get_mut(&name) {
            Some(pool) => ReleaseOutcome::Returned(pool.release(instance)),
            None => ReleaseOutcome::Unrouted(instance),
        }
    }

    /// Drops the idle instances of one pool.
    ///
    /// # Errors
    ///
    /// [`PoolError::PoolNotFound`] if `name` is unregistered.
    pub fn clear_pool(&mut self, name: &str) -> PoolResult<usize> {
        self.pools
            .get_mut(name)
            .map(ResourcePool::clear)
            .ok_or_else(|| PoolError::PoolNotFound(name.to_owned()))
    }

    /// Clears every pool and forgets all provenance.
    ///
    /// Instances still on loan can no longer be routed back; releasing them
    /// afterwards yields [`ReleaseOutcome::Unrouted`].
    pub fn clear_all(&mut self) {
        for pool in self.pools.values_mut() {
            pool.clear();
            pool.forget_active();
        }
        self.provenance.clear();
    }

    /// Idle instances available in the named pool (0 if unregistered).
    #[must_use]
    pub fn available(&self, name: &str) -> usize {
        self.pools.get(name).map_or(0, ResourcePool::idle_count)
    }

    /// Looks up a pool by name.
    #[must_use]
    pub fn pool(&self, name: &str) -> Option<&ResourcePool<T>> {
        self.pools.get(name)
    }

    /// Registered pool names, sorted.
    #[must_use]
    pub fn pool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Whether the registry holds provenance for this instance.
    #[inline]
    #[must_use]
    pub fn is_tracked(&self, id: InstanceId) -> bool {
        self.provenance.contains_key(&id)
    }

    /// Number of instances currently on loan through the registry.
    #[inline]
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.provenance.len()
    }
}

impl<T: Poolable> Default for PoolRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::pool::tests::{rock_factory, Rock, RockKind};
    use super::*;

    fn registry() -> PoolRegistry<Rock> {
        let mut registry = PoolRegistry::new();
        registry
            .register_pool("big", RockKind::Big, rock_factory(), 2, 3)
            .unwrap();
        registry
            .register_pool("tiny", RockKind::Tiny, rock_factory(), 0, 2)
            .unwrap();
        registry
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = registry();
        let err = registry
            .register_pool("big", RockKind::Big, rock_factory(), 0, 1)
            .unwrap_err();
        assert_eq!(err, PoolError::DuplicatePool("big".into()));
        assert_eq!(registry.available("big"), 2);
    }

    #[test]
    fn test_acquire_records_provenance() {
        let mut registry = registry();
        let rock = registry.acquire("big", RockKind::Big).unwrap();
        assert!(registry.is_tracked(rock.id()));
        assert_eq!(registry.tracked_count(), 1);

        let outcome = registry.release(rock);
        assert!(matches!(outcome, ReleaseOutcome::Returned(Disposition::Recycled)));
        assert_eq!(registry.tracked_count(), 0);
        assert_eq!(registry.available("big"), 2);
    }

    #[test]
    fn test_unknown_pool() {
        let mut registry = registry();
        let err = registry.acquire("huge", RockKind::Big).unwrap_err();
        assert_eq!(err, PoolError::PoolNotFound("huge".into()));
        assert_eq!(registry.available("huge"), 0);
        assert!(registry.clear_pool("huge").is_err());
    }

    #[test]
    fn test_kind_mismatch_is_factory_failure() {
        let mut registry = registry();
        let err = registry.acquire("big", RockKind::Tiny).unwrap_err();
        assert!(matches!(err, PoolError::FactoryFailure { .. }));
        assert_eq!(registry.tracked_count(), 0);
    }

    #[test]
    fn test_ids_unique_across_pools() {
        let mut registry = registry();
        let a = registry.acquire("big", RockKind::Big).unwrap();
        let b = registry.acquire("tiny", RockKind::Tiny).unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.id().pool_tag(), b.id().pool_tag());
    }

    #[test]
    fn test_release_routes_to_issuing_pool() {
        let mut registry = registry();
        let tiny = registry.acquire("tiny", RockKind::Tiny).unwrap();
        let _ = registry.release(tiny);
        assert_eq!(registry.available("tiny"), 1);
        assert_eq!(registry.available("big"), 2);
    }

    #[test]
    fn test_foreign_instance_is_unrouted() {
        let mut registry = registry();
        let mut standalone =
            ResourcePool::new("loose", RockKind::Big, rock_factory(), 1, 1).unwrap();
        let foreign = standalone.acquire().unwrap();

        match registry.release(foreign) {
            ReleaseOutcome::Unrouted(rock) => assert_eq!(rock.id().pool_tag(), 0),
            ReleaseOutcome::Returned(_) => panic!("foreign instance must not be accepted"),
        }
        assert_eq!(registry.available("big"), 2);
    }

    #[test]
    fn test_clear_all_forgets_loans() {
        let mut registry = registry();
        let held = registry.acquire("big", RockKind::Big).unwrap();

        registry.clear_all();
        assert_eq!(registry.available("big"), 0);
        assert_eq!(registry.tracked_count(), 0);
        assert_eq!(registry.pool("big").unwrap().active_count(), 0);

        assert!(!registry.release(held).is_returned());
    }

    #[test]
    fn test_pool_names_sorted() {
        let registry = registry();
        assert_eq!(registry.pool_names(), vec!["big", "tiny"]);
    }
}
