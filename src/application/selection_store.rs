// ============================================================
// Layer 2 - Selection Store
// ============================================================
// Holds the current Selection for the serving shell.
//
//   snapshot()  clone the Arc under a read lock and release it;
//               the caller keeps a consistent Selection even if
//               a retrain publishes a new one meanwhile
//   publish()   swap in a freshly built Selection with a single
//               write
//
// An empty store is a valid state: prediction reports NotReady.
// A poisoned lock still holds a whole Selection (writers only
// assign), so it is recovered rather than propagated.

use std::sync::{Arc, RwLock};

use crate::ml::selection::Selection;

#[derive(Default)]
pub struct SelectionStore {
    current: RwLock<Option<Arc<Selection>>>,
}

impl SelectionStore {
    pub fn new(initial: Option<Selection>) -> Self {
        Self { current: RwLock::new(initial.map(Arc::new)) }
    }

    pub fn snapshot(&self) -> Option<Arc<Selection>> {
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replace the current Selection; returns the previous one.
    pub fn publish(&self, selection: Selection) -> Option<Arc<Selection>> {
        let next = Arc::new(selection);
        tracing::info!("Publishing selection {} (macro_f1={:.4})", next.label(), next.macro_f1);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        guard.replace(next)
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot().is_some()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::tiny_selection;
    use super::*;

    #[test]
    fn test_empty_store_is_not_ready() {
        let store = SelectionStore::default();
        assert!(!store.is_ready());
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_snapshot_survives_publish() {
        let store = SelectionStore::new(Some(tiny_selection(0.5)));
        let held  = store.snapshot().unwrap();

        let previous = store.publish(tiny_selection(0.9));
        assert_eq!(previous.map(|p| p.macro_f1), Some(0.5));
        assert_eq!(held.macro_f1, 0.5);
        assert_eq!(store.snapshot().unwrap().macro_f1, 0.9);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let store = Arc::new(SelectionStore::new(Some(tiny_selection(0.5))));
        let clone = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = clone.current.write().unwrap();
            panic!("writer died");
        })
        .join();

        assert!(store.current.is_poisoned());
        assert!(store.is_ready());
        store.publish(tiny_selection(0.7));
        assert_eq!(store.snapshot().unwrap().macro_f1, 0.7);
    }
}
