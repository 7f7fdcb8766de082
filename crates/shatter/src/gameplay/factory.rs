//! # Entity Factory
//!
//! Materializes asteroid bodies for the spawner and takes them back.
//!
//! [`PooledAsteroidFactory`] routes through a [`PoolRegistry`] and falls back
//! to direct construction for a tier that has no pool configured.

use std::collections::HashMap;

use shatter_core::{FactoryError, PoolRegistry, PoolResult, Pooled, ReleaseOutcome};
use shatter_shared::Vec2;
use tracing::{debug, warn};

use super::asteroid::Tier;
use super::body::{Body, ResourceKind};
use crate::config::PoolConfig;

/// A body that is either on loan from a pool or owned outright.
#[derive(Debug)]
pub enum BodyHandle {
    /// Borrowed from a pool; goes back on disposal.
    Pooled(Pooled<Body>),
    /// Built directly; dropped on disposal.
    Owned(Body),
}

impl BodyHandle {
    /// Physical state.
    #[must_use]
    pub fn body(&self) -> &Body {
        match self {
            Self::Pooled(pooled) => &**pooled,
            Self::Owned(body) => body,
        }
    }

    /// Physical state, mutably.
    pub fn body_mut(&mut self) -> &mut Body {
        match self {
            Self::Pooled(pooled) => &mut **pooled,
            Self::Owned(body) => body,
        }
    }

    /// Whether the body came from a pool.
    #[inline]
    #[must_use]
    pub const fn is_pooled(&self) -> bool {
        matches!(self, Self::Pooled(_))
    }
}

/// Capability the spawner uses to create and dispose of bodies.
pub trait EntityFactory: Send {
    /// Creates an active body for `tier` at `position`.
    ///
    /// # Errors
    ///
    /// [`FactoryError`] if no body could be produced. The spawner treats
    /// this as "skipped".
    fn create(&mut self, tier: Tier, position: Vec2) -> Result<BodyHandle, FactoryError>;

    /// Takes a body back once its entity is gone.
    fn dispose(&mut self, body: BodyHandle);

    /// Drops idle bodies and forgets outstanding loans.
    fn clear_pools(&mut self) {}
}

/// Builds every body from scratch.
#[derive(Debug, Default)]
pub struct DirectAsteroidFactory {
    created: u64,
}

impl DirectAsteroidFactory {
    /// Creates the factory.
    #[must_use]
    pub const fn new() -> Self {
        Self { created: 0 }
    }

    /// Bodies built so far.
    #[must_use]
    pub const fn created_count(&self) -> u64 {
        self.created
    }

    fn build(&mut self, kind: ResourceKind, position: Vec2) -> Body {
        self.created += 1;
        let mut body = Body::new(kind);
        body.position = position;
        body.active = true;
        body
    }
}

impl EntityFactory for DirectAsteroidFactory {
    fn create(&mut self, tier: Tier, position: Vec2) -> Result<BodyHandle, FactoryError> {
        Ok(BodyHandle::Owned(self.build(tier.resource_kind(), position)))
    }

    fn dispose(&mut self, _body: BodyHandle) {}
}

/// Draws bodies from named pools, one per tier.
pub struct PooledAsteroidFactory {
    registry: PoolRegistry<Body>,
    /// Pool serving each tier's resource kind.
    routes: HashMap<ResourceKind, String>,
    fallback: DirectAsteroidFactory,
}

impl PooledAsteroidFactory {
    /// Registers one pool per config entry.
    ///
    /// When several pools share a template kind, the first one serves it.
    ///
    /// # Errors
    ///
    /// Any [`shatter_core::PoolError`] from registration.
    pub fn from_config(pools: &[PoolConfig]) -> PoolResult<Self> {
        let mut registry = PoolRegistry::new();
        let mut routes = HashMap::new();

        for pool in pools {
            registry.register_pool(
                pool.name.clone(),
                pool.template_kind,
                Box::new(|kind| Ok(Body::new(kind))),
                pool.initial_size,
                pool.max_size,
            )?;
            routes
                .entry(pool.template_kind)
                .or_insert_with(|| pool.name.clone());
        }

        Ok(Self {
            registry,
            routes,
            fallback: DirectAsteroidFactory::new(),
        })
    }

    /// Uses an already populated registry with explicit routes.
    #[must_use]
    pub fn with_registry(
        registry: PoolRegistry<Body>,
        routes: HashMap<ResourceKind, String>,
    ) -> Self {
        Self {
            registry,
            routes,
            fallback: DirectAsteroidFactory::new(),
        }
    }

    /// The backing registry, for inspection.
    #[must_use]
    pub const fn registry(&self) -> &PoolRegistry<Body> {
        &self.registry
    }

    /// Bodies built outside any pool.
    #[must_use]
    pub const fn unpooled_count(&self) -> u64 {
        self.fallback.created_count()
    }
}

impl EntityFactory for PooledAsteroidFactory {
    fn create(&mut self, tier: Tier, position: Vec2) -> Result<BodyHandle, FactoryError> {
        let kind = tier.resource_kind();
        let Some(name) = self.routes.get(&kind) else {
            debug!(?kind, "no pool for kind, building directly");
            return self.fallback.create(tier, position);
        };

        let mut body = self
            .registry
            .acquire(name, kind)
            .map_err(|err| FactoryError::new(err.to_string()))?;
        body.position = position;
        Ok(BodyHandle::Pooled(body))
    }

    fn dispose(&mut self, body: BodyHandle) {
        let BodyHandle::Pooled(body) = body else {
            return;
        };

        if let ReleaseOutcome::Unrouted(body) = self.registry.release(body) {
            // Loan predates a clear; nothing to return it to.
            warn!(id = %body.id(), "disposing body with no pool provenance");
        }
    }

    fn clear_pools(&mut self) {
        self.registry.clear_all();
    }
}

impl std::fmt::Debug for PooledAsteroidFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledAsteroidFactory")
            .field("pools", &self.registry.pool_names())
            .field("on_loan", &self.registry.tracked_count())
            .finish_non_exhaustive()
    }
}
