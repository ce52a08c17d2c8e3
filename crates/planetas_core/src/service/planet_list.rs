//! Observable in-memory list of all stored planets.
//!
//! # Responsibility
//! - Hold the current snapshot of every planet in the store.
//! - Reload the whole snapshot after each mutation and notify subscribers.
//!
//! # Invariants
//! - Every mutation is followed by an unconditional full reload; the snapshot
//!   is never patched locally.
//! - `load`, `add`, `update_record` and `remove` are mutually exclusive per
//!   model instance, so the snapshot after the last completed call matches
//!   the store.
//! - A failed mutation or reload leaves the previous snapshot untouched.
//! - Subscribers run in registration order while the mutation lock is held;
//!   they may read the snapshot but must not call mutating methods.

use crate::model::planet::{Planet, PlanetId};
use crate::repo::planet_repo::{PlanetRepository, RepoResult};
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&[Planet]) + Send + Sync>;

/// Planet list kept consistent with the store by full reloads.
pub struct PlanetListModel<R: PlanetRepository> {
    repo: R,
    mutation_lock: Mutex<()>,
    planets: Mutex<Arc<Vec<Planet>>>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
}

impl<R: PlanetRepository> PlanetListModel<R> {
    /// Creates a model with an empty snapshot; call `load` to populate it.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            mutation_lock: Mutex::new(()),
            planets: Mutex::new(Arc::new(Vec::new())),
            listeners: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Replaces the snapshot with the full store content.
    pub fn load(&self) -> RepoResult<()> {
        let _guard = self.lock_mutations();
        self.reload_locked()
    }

    /// Creates `planet` in the store, then reloads.
    pub fn add(&self, planet: &Planet) -> RepoResult<PlanetId> {
        let _guard = self.lock_mutations();
        let id = self.repo.create_planet(planet)?;
        self.reload_locked()?;
        Ok(id)
    }

    /// Replaces the stored planet with the same id, then reloads.
    ///
    /// Returns the affected row count; `0` when the id no longer exists.
    pub fn update_record(&self, planet: &Planet) -> RepoResult<usize> {
        let _guard = self.lock_mutations();
        let changed = self.repo.update_planet(planet)?;
        if changed == 0 {
            warn!(
                "event=planet_list_update module=service status=noop id={:?}",
                planet.id
            );
        }
        self.reload_locked()?;
        Ok(changed)
    }

    /// Deletes the planet with `id`, then reloads.
    pub fn remove(&self, id: PlanetId) -> RepoResult<usize> {
        let _guard = self.lock_mutations();
        let changed = self.repo.delete_planet(id)?;
        if changed == 0 {
            warn!("event=planet_list_remove module=service status=noop id={id}");
        }
        self.reload_locked()?;
        Ok(changed)
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Vec<Planet> {
        self.current().as_ref().clone()
    }

    /// Looks up one planet in the current snapshot.
    pub fn get(&self, id: PlanetId) -> Option<Planet> {
        self.current()
            .iter()
            .find(|planet| planet.id == Some(id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.current().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    /// Registers `listener` to receive the snapshot after each reload.
    pub fn subscribe(
        &self,
        listener: impl Fn(&[Planet]) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners).push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn lock_mutations(&self) -> MutexGuard<'_, ()> {
        lock(&self.mutation_lock)
    }

    fn current(&self) -> Arc<Vec<Planet>> {
        Arc::clone(&lock(&self.planets))
    }

    fn reload_locked(&self) -> RepoResult<()> {
        let planets = Arc::new(self.repo.list_planets()?);
        *lock(&self.planets) = Arc::clone(&planets);
        debug!(
            "event=planet_list_reload module=service status=ok count={}",
            planets.len()
        );

        let listeners = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect::<Vec<_>>();
        for listener in listeners {
            listener(planets.as_slice());
        }
        Ok(())
    }
}

// Every guarded value here is replaced wholesale, so a poisoned lock still
// holds a consistent value.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::PlanetListModel;
    use crate::db::DbHandle;
    use crate::model::planet::Planet;
    use crate::repo::planet_repo::SqlitePlanetRepository;
    use std::sync::{Arc, Mutex};

    fn model() -> PlanetListModel<SqlitePlanetRepository> {
        PlanetListModel::new(SqlitePlanetRepository::new(DbHandle::in_memory()))
    }

    #[test]
    fn new_model_starts_empty_until_loaded() {
        let model = model();
        assert!(model.is_empty());
        model.load().unwrap();
        assert_eq!(model.len(), 0);
    }

    #[test]
    fn get_reads_from_snapshot() {
        let model = model();
        let id = model.add(&Planet::new("Netuno", 4495.0, 3.9)).unwrap();

        assert_eq!(model.get(id).unwrap().name, "Netuno");
        assert!(model.get(id + 100).is_none());
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let model = model();
        let calls = Arc::new(Mutex::new(0_usize));
        let counter = Arc::clone(&calls);
        let id = model.subscribe(move |_| *counter.lock().unwrap() += 1);

        model.load().unwrap();
        assert!(model.unsubscribe(id));
        assert!(!model.unsubscribe(id));
        model.load().unwrap();

        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
