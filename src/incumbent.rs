//! Best schedule shared between concurrently running searches.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::cache::Incumbent;
use crate::model::entity::Score;

#[derive(Debug)]
pub struct SharedIncumbent {
    objective: AtomicI64,
    incumbent: Mutex<Option<Incumbent>>,
}

impl Default for SharedIncumbent {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedIncumbent {
    pub fn new() -> Self {
        SharedIncumbent {
            objective: AtomicI64::new(Score::MAX),
            incumbent: Mutex::new(None),
        }
    }

    /// Objective of the stored schedule, `Score::MAX` while empty.
    pub fn objective(&self) -> Score {
        self.objective.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> Option<Incumbent> {
        self.incumbent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Stores `candidate` if it beats the current content. Returns whether it
    /// was stored.
    pub fn try_install(&self, candidate: &Incumbent) -> bool {
        if candidate.objective >= self.objective() {
            return false;
        }
        let mut guard = self.incumbent.lock().unwrap_or_else(PoisonError::into_inner);
        // the atomic may be stale, the guarded value is authoritative
        if let Some(current) = guard.as_ref() {
            if candidate.objective >= current.objective {
                return false;
            }
        }
        *guard = Some(candidate.clone());
        self.objective.store(candidate.objective, Ordering::Relaxed);
        true
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::SharedIncumbent;
    use crate::cache::Incumbent;
    use crate::construct::random_assignment;
    use crate::model::instance::Instance;

    fn incumbent(objective: i64) -> Incumbent {
        let instance = Instance::new(2, 2, 1).unwrap();
        let assignment = random_assignment(&instance, &mut SmallRng::seed_from_u64(objective as u64));
        Incumbent { assignment, objective }
    }

    #[test]
    fn starts_empty() {
        let shared = SharedIncumbent::new();
        assert_eq!(shared.objective(), i64::MAX);
        assert!(shared.snapshot().is_none());
    }

    #[test]
    fn keeps_only_strict_improvements() {
        let shared = SharedIncumbent::new();
        assert!(shared.try_install(&incumbent(10)));
        assert!(!shared.try_install(&incumbent(10)));
        assert!(!shared.try_install(&incumbent(12)));
        assert!(shared.try_install(&incumbent(4)));
        assert_eq!(shared.objective(), 4);
        assert_eq!(shared.snapshot().map(|i| i.objective), Some(4));
    }

    #[test]
    fn concurrent_installs_keep_the_minimum() {
        let shared = Arc::new(SharedIncumbent::new());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for objective in (worker..40).rev().step_by(3) {
                        shared.try_install(&incumbent(objective));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.objective(), 0);
        assert_eq!(shared.snapshot().map(|i| i.objective), Some(0));
    }
}
