use std::sync::{Arc, Mutex, PoisonError};

/// Something that wants to know when a surface has new pixels to show
pub trait Observer: Send + Sync {
    fn update(&self);
}

/// Shared, thread-safe list of observers.
///
/// Cloning the registry yields another handle to the same list.
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    observers: Arc<Mutex<Vec<Arc<dyn Observer>>>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<dyn Observer>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an observer. Registering the same `Arc` twice is a no-op.
    /// Returns true if it was added.
    pub fn register(&self, observer: Arc<dyn Observer>) -> bool {
        let mut list = self.lock();
        if list.iter().any(|o| Arc::ptr_eq(o, &observer)) {
            return false;
        }
        list.push(observer);
        log::debug!("observer registered ({} total)", list.len());
        true
    }

    /// Remove an observer. Returns true if it was present.
    pub fn unregister(&self, observer: &Arc<dyn Observer>) -> bool {
        let mut list = self.lock();
        let before = list.len();
        list.retain(|o| !Arc::ptr_eq(o, observer));
        before != list.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Notify every observer. The list is snapshotted first, so observers
    /// may register or unregister from inside `update`.
    pub fn update(&self) {
        let snapshot: Vec<_> = self.lock().clone();
        log::trace!("notifying {} observers", snapshot.len());
        for observer in snapshot {
            observer.update();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl Observer for Counter {
        fn update(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test_log::test]
    fn test_register_is_idempotent() {
        let reg = ObserverRegistry::new();
        let counter = Arc::new(Counter::default());
        let obs: Arc<dyn Observer> = counter.clone();
        assert!(reg.register(obs.clone()));
        assert!(!reg.register(obs.clone()));
        reg.update();
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert!(reg.unregister(&obs));
        assert!(!reg.unregister(&obs));
        reg.update();
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    struct Reentrant {
        registry: ObserverRegistry,
        hits: AtomicUsize,
    }

    impl Observer for Reentrant {
        fn update(&self) {
            self.hits.fetch_add(1, Ordering::SeqCst);
            self.registry.register(Arc::new(Counter::default()));
        }
    }

    #[test]
    fn test_register_during_update() {
        let reg = ObserverRegistry::new();
        let obs = Arc::new(Reentrant {
            registry: reg.clone(),
            hits: AtomicUsize::new(0),
        });
        reg.register(obs.clone());
        reg.update();
        assert_eq!(obs.hits.load(Ordering::SeqCst), 1);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_shared_across_threads() {
        let reg = ObserverRegistry::new();
        let counter = Arc::new(Counter::default());
        reg.register(counter.clone());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let r = reg.clone();
                std::thread::spawn(move || r.update())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(counter.0.load(Ordering::SeqCst), 4);
    }
}
