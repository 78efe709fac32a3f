//! Purpose: Single-assignment handle for values that may be set at most once.
//! Exports: `OnceSlot`.
//! Role: Holds the classified container; usable as a process-wide holder too.
//! Invariants: The first successful `claim` wins; later claims hand the value back.
use std::sync::OnceLock;

#[derive(Debug)]
pub struct OnceSlot<T> {
    cell: OnceLock<T>,
}

impl<T> OnceSlot<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Stores `value` if the slot is empty; otherwise returns it back untouched.
    pub fn claim(&self, value: T) -> Result<(), T> {
        self.cell.set(value)
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn into_inner(self) -> Option<T> {
        self.cell.into_inner()
    }
}

impl<T> Default for OnceSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::OnceSlot;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn first_claim_wins() {
        let slot = OnceSlot::new();
        assert!(slot.get().is_none());
        assert_eq!(slot.claim("first"), Ok(()));
        assert_eq!(slot.claim("second"), Err("second"));
        assert_eq!(slot.get(), Some(&"first"));
        assert_eq!(slot.into_inner(), Some("first"));
    }

    #[test]
    fn concurrent_claims_store_exactly_one() {
        let slot = Arc::new(OnceSlot::new());
        let handles = (0..8)
            .map(|i| {
                let slot = Arc::clone(&slot);
                thread::spawn(move || slot.claim(i).is_ok())
            })
            .collect::<Vec<_>>();
        let winners = handles
            .into_iter()
            .map(|handle| handle.join().expect("join"))
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!(slot.get().is_some());
    }
}
