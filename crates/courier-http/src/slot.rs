use std::sync::{Arc, Mutex, MutexGuard};

use crate::errors::SlotError;

/// Holds at most one active instance. Lifecycle: create, activate, clear.
#[derive(Debug)]
pub struct ActiveSlot<T> {
    inner: Arc<Mutex<SlotState<T>>>,
}

#[derive(Debug)]
struct SlotState<T> {
    value: Option<T>,
    generation: u64,
}

impl<T> Default for ActiveSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ActiveSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SlotState {
                value: None,
                generation: 0,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SlotState<T>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fails if an instance is already active; the guard clears the slot on drop.
    pub fn activate(&self, value: T) -> Result<SlotGuard<T>, SlotError> {
        let mut state = self.state();
        if state.value.is_some() {
            return Err(SlotError::Occupied);
        }
        state.generation += 1;
        state.value = Some(value);
        Ok(SlotGuard {
            inner: self.inner.clone(),
            generation: state.generation,
        })
    }

    /// Swaps in `value` and returns the instance it displaced.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut state = self.state();
        state.generation += 1;
        state.value.replace(value)
    }

    pub fn clear(&self) -> Option<T> {
        let mut state = self.state();
        state.generation += 1;
        state.value.take()
    }

    pub fn is_active(&self) -> bool {
        self.state().value.is_some()
    }
}

impl<T: Clone> ActiveSlot<T> {
    pub fn current(&self) -> Option<T> {
        self.state().value.clone()
    }
}

/// Clears its own activation on drop, never a newer one.
#[derive(Debug)]
pub struct SlotGuard<T> {
    inner: Arc<Mutex<SlotState<T>>>,
    generation: u64,
}

impl<T> Drop for SlotGuard<T> {
    fn drop(&mut self) {
        let mut state = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if state.generation == self.generation {
            state.value = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_then_drop_guard_expected_slot_cleared() {
        let slot = ActiveSlot::new();
        let guard = slot.activate("popup").expect("slot should be free");
        assert!(slot.is_active());
        assert_eq!(slot.current(), Some("popup"));
        drop(guard);
        assert!(!slot.is_active());
    }

    #[test]
    fn activate_twice_expected_occupied() {
        let slot = ActiveSlot::new();
        let _guard = slot.activate(1).expect("slot should be free");
        assert_eq!(slot.activate(2).err(), Some(SlotError::Occupied));
        assert_eq!(slot.current(), Some(1));
    }

    #[test]
    fn stale_guard_drop_expected_replacement_kept() {
        let slot = ActiveSlot::new();
        let guard = slot.activate("first").expect("slot should be free");
        assert_eq!(slot.replace("second"), Some("first"));
        drop(guard);
        assert_eq!(slot.current(), Some("second"));
    }

    #[test]
    fn clear_then_reactivate_expected_fresh_instance() {
        let slot = ActiveSlot::new();
        let stale = slot.activate("a").expect("slot should be free");
        assert_eq!(slot.clear(), Some("a"));
        let _fresh = slot.activate("b").expect("slot should be free after clear");
        drop(stale);
        assert_eq!(slot.current(), Some("b"));
    }
}
