//! # Resource Pool
//!
//! Bounded free-list of reusable instances of one resource kind.

use std::collections::VecDeque;
use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::error::{FactoryError, PoolError, PoolResult};
use crate::ids::InstanceId;

/// Capability every pooled type provides.
pub trait Poolable {
    /// Resource kind identifier (what template the instance was built from).
    type Kind: Copy + Eq + fmt::Debug;

    /// Kind this instance was built as.
    fn kind(&self) -> Self::Kind;

    /// Marks the instance live.
    fn activate(&mut self);

    /// Returns the instance to its canonical neutral state:
    /// position zero, deactivated, transient fields cleared.
    fn reset(&mut self);

    /// Whether the instance is currently live.
    fn is_active(&self) -> bool;
}

/// Constructor used by a pool when its free-list is empty.
pub type Factory<T> = Box<dyn FnMut(<T as Poolable>::Kind) -> Result<T, FactoryError> + Send>;

/// An instance on loan from a pool, tagged with its identity.
#[derive(Debug)]
pub struct Pooled<T> {
    id: InstanceId,
    value: T,
}

impl<T> Pooled<T> {
    /// Identity used to route the instance back to its pool.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> InstanceId {
        self.id
    }

    /// Gives up pooling and returns the bare instance.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

/// What a pool did with a returned instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Reset and parked on the free-list.
    Recycled,
    /// Free-list was full; the instance was dropped.
    Discarded,
}

/// A bounded pool of one resource kind.
///
/// # Thread Safety
///
/// This pool is NOT synchronized. It belongs to the simulation thread.
///
/// # Example
///
/// ```rust,ignore
/// let factory = Box::new(|kind| Ok(Rock::new(kind)));
/// let mut pool = ResourcePool::new("rocks", RockKind::Large, factory, 2, 3)?;
///
/// let rock = pool.acquire()?;   // pre-warmed instance
/// pool.release(rock);           // reset + back on the free-list
/// ```
pub struct ResourcePool<T: Poolable> {
    /// Name used in logs and errors.
    name: String,
    /// Kind every instance must have.
    kind: T::Kind,
    /// Namespace for instance ids.
    tag: u32,
    /// Builds new instances.
    factory: Factory<T>,
    /// Idle instances, oldest first.
    idle: VecDeque<Pooled<T>>,
    /// Pre-warmed population.
    initial_size: usize,
    /// Idle bound.
    max_size: usize,
    /// Instances currently on loan.
    active_count: usize,
    /// Lifetime constructions.
    created_count: u64,
    /// Next instance serial.
    next_serial: u32,
}

impl<T: Poolable> ResourcePool<T> {
    /// Creates a pool and pre-warms `initial_size` idle instances.
    ///
    /// # Errors
    ///
    /// - [`PoolError::InvalidCapacity`] if `initial_size > max_size`
    /// - [`PoolError::FactoryFailure`] if pre-warming fails
    pub fn new(
        name: impl Into<String>,
        kind: T::Kind,
        factory: Factory<T>,
        initial_size: usize,
        max_size: usize,
    ) -> PoolResult<Self> {
        Self::with_tag(name.into(), kind, factory, initial_size, max_size, 0)
    }

    pub(crate) fn with_tag(
        name: String,
        kind: T::Kind,
        factory: Factory<T>,
        initial_size: usize,
        max_size: usize,
        tag: u32,
    ) -> PoolResult<Self> {
        if initial_size > max_size {
            return Err(PoolError::InvalidCapacity {
                pool: name,
                initial: initial_size,
                max: max_size,
            });
        }

        let mut pool = Self {
            name,
            kind,
            tag,
            factory,
            // Sized for the pre-warm only; max_size bounds retention, not storage.
            idle: VecDeque::with_capacity(initial_size),
            initial_size,
            max_size,
            active_count: 0,
            created_count: 0,
            next_serial: 0,
        };

        for _ in 0..initial_size {
            let instance = pool.construct()?;
            pool.idle.push_back(instance);
        }

        Ok(pool)
    }

    /// Builds a fresh, neutral instance through the factory.
    fn construct(&mut self) -> PoolResult<Pooled<T>> {
        let mut value = (self.factory)(self.kind).map_err(|err| PoolError::FactoryFailure {
            pool: self.name.clone(),
            reason: err.reason,
        })?;

        if value.kind() != self.kind {
            return Err(PoolError::FactoryFailure {
                pool: self.name.clone(),
                reason: format!(
                    "factory produced {:?}, expected {:?}",
                    value.kind(),
                    self.kind
                ),
            });
        }

        value.reset();
        let id = InstanceId::new(self.next_serial, self.tag);
        self.next_serial = self.next_serial.wrapping_add(1);
        self.created_count += 1;

        Ok(Pooled { id, value })
    }

    /// Hands out an idle instance, constructing one if none is idle.
    ///
    /// # Errors
    ///
    /// [`PoolError::FactoryFailure`] if a new instance was needed and the
    /// factory could not build it. The caller should treat this as
    /// "skipped this tick".
    pub fn acquire(&mut self) -> PoolResult<Pooled<T>> {
        let mut instance = match self.idle.pop_front() {
            Some(instance) => instance,
            None => self.construct().map_err(|err| {
                warn!(pool = %self.name, error = %err, "pool acquire failed");
                err
            })?,
        };

        instance.value.activate();
        self.active_count += 1;
        Ok(instance)
    }

    /// Takes an instance back.
    ///
    /// The instance is reset in either case. It is parked if the free-list
    /// is below `max_size`, dropped otherwise. Releasing an instance that did
    /// not come from this pool is a routing bug in the caller.
    pub fn release(&mut self, mut instance: Pooled<T>) -> Disposition {
        self.active_count = self.active_count.saturating_sub(1);
        instance.value.reset();

        if self.idle.len() < self.max_size {
            self.idle.push_back(instance);
            Disposition::Recycled
        } else {
            debug!(pool = %self.name, id = %instance.id, "pool full, discarding instance");
            Disposition::Discarded
        }
    }

    /// Drops every idle instance. Instances on loan are unaffected.
    ///
    /// Returns how many instances were discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.idle.len();
        self.idle.clear();
        discarded
    }

    /// Forgets all outstanding loans (their instances will never come back).
    pub(crate) fn forget_active(&mut self) {
        self.active_count = 0;
    }

    /// Pool name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resource kind served by this pool.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> T::Kind {
        self.kind
    }

    /// Number of idle instances.
    #[inline]
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    /// Number of instances currently on loan.
    #[inline]
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.active_count
    }

    /// Total instances ever constructed by this pool.
    #[inline]
    #[must_use]
    pub const fn created_count(&self) -> u64 {
        self.created_count
    }

    /// Pre-warmed population.
    #[inline]
    #[must_use]
    pub const fn initial_size(&self) -> usize {
        self.initial_size
    }

    /// Idle bound.
    #[inline]
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }
}

impl<T: Poolable> fmt::Debug for ResourcePool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourcePool")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("idle", &self.idle.len())
            .field("active", &self.active_count)
            .field("max_size", &self.max_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) enum RockKind {
        Big,
        Tiny,
    }

    #[derive(Debug)]
    pub(crate) struct Rock {
        pub(crate) kind: RockKind,
        pub(crate) position: (f32, f32),
        pub(crate) active: bool,
        pub(crate) scratch: u32,
    }

    impl Poolable for Rock {
        type Kind = RockKind;

        fn kind(&self) -> RockKind {
            self.kind
        }

        fn activate(&mut self) {
            self.active = true;
        }

        fn reset(&mut self) {
            self.position = (0.0, 0.0);
            self.active = false;
            self.scratch = 0;
        }

        fn is_active(&self) -> bool {
            self.active
        }
    }

    pub(crate) fn rock_factory() -> Factory<Rock> {
        Box::new(|kind| {
            Ok(Rock {
                kind,
                position: (9.0, 9.0),
                active: true,
                scratch: 7,
            })
        })
    }

    #[test]
    fn test_prewarm_and_capacity_check() {
        let pool = ResourcePool::new("rocks", RockKind::Big, rock_factory(), 2, 3).unwrap();
        assert_eq!(pool.idle_count(), 2);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.created_count(), 2);

        let err = ResourcePool::new("rocks", RockKind::Big, rock_factory(), 4, 3).unwrap_err();
        assert!(matches!(err, PoolError::InvalidCapacity { initial: 4, max: 3, .. }));
    }

    #[test]
    fn test_acquire_reuses_then_constructs() {
        let mut pool = ResourcePool::new("rocks", RockKind::Big, rock_factory(), 2, 3).unwrap();

        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_eq!(pool.created_count(), 2);
        assert!(a.is_active() && b.is_active());

        let c = pool.acquire().unwrap();
        assert_eq!(pool.created_count(), 3);
        assert_eq!(pool.active_count(), 3);
        assert_eq!(pool.idle_count(), 0);
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_release_resets_instance() {
        let mut pool = ResourcePool::new("rocks", RockKind::Big, rock_factory(), 1, 1).unwrap();
        let mut rock = pool.acquire().unwrap();
        rock.position = (5.0, -2.0);
        rock.scratch = 99;
        let id = rock.id();

        assert_eq!(pool.release(rock), Disposition::Recycled);

        let again = pool.acquire().unwrap();
        assert_eq!(again.id(), id);
        assert_eq!(again.position, (0.0, 0.0));
        assert_eq!(again.scratch, 0);
        assert!(again.is_active());
    }

    #[test]
    fn test_release_at_capacity_discards() {
        let mut pool = ResourcePool::new("rocks", RockKind::Big, rock_factory(), 0, 1).unwrap();
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();

        assert_eq!(pool.release(a), Disposition::Recycled);
        assert_eq!(pool.release(b), Disposition::Discarded);
        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_factory_failure_returns_error() {
        let factory: Factory<Rock> = Box::new(|_| Err(FactoryError::new("missing template")));
        let mut pool = ResourcePool::new("rocks", RockKind::Big, factory, 0, 4).unwrap();

        let err = pool.acquire().unwrap_err();
        assert!(matches!(err, PoolError::FactoryFailure { .. }));
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_factory_wrong_kind_is_failure() {
        let factory: Factory<Rock> = Box::new(|_| {
            Ok(Rock {
                kind: RockKind::Tiny,
                position: (0.0, 0.0),
                active: false,
                scratch: 0,
            })
        });
        let err = ResourcePool::new("rocks", RockKind::Big, factory, 1, 1).unwrap_err();
        assert!(matches!(err, PoolError::FactoryFailure { .. }));
    }

    #[test]
    fn test_clear_only_touches_idle() {
        let mut pool = ResourcePool::new("rocks", RockKind::Big, rock_factory(), 3, 3).unwrap();
        let held = pool.acquire().unwrap();

        assert_eq!(pool.clear(), 2);
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.active_count(), 1);

        assert_eq!(pool.release(held), Disposition::Recycled);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn test_idle_never_exceeds_max() {
        let mut pool = ResourcePool::new("rocks", RockKind::Big, rock_factory(), 2, 4).unwrap();
        let mut held = Vec::new();
        let mut peak = 0usize;

        // Deterministic acquire/release pattern with bursts above max_size.
        for step in 0..200usize {
            if step % 7 < 4 {
                held.push(pool.acquire().unwrap());
            } else if let Some(rock) = held.pop() {
                let _ = pool.release(rock);
            }
            peak = peak.max(held.len());
            assert!(pool.idle_count() <= pool.max_size());
            assert!(pool.idle_count() + pool.active_count() <= pool.initial_size().max(peak));
        }
    }

    #[test]
    fn test_unbounded_max_size_allocates_lazily() {
        let mut pool =
            ResourcePool::new("rocks", RockKind::Big, rock_factory(), 1, usize::MAX).unwrap();
        assert_eq!(pool.idle_count(), 1);

        let rock = pool.acquire().unwrap();
        let id = rock.id();
        assert_eq!(pool.release(rock), Disposition::Recycled);
        assert_eq!(pool.acquire().unwrap().id(), id);
        assert_eq!(pool.created_count(), 1);
    }
}
