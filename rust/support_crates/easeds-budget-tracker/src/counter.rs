use std::sync::atomic::{AtomicUsize, Ordering};

/// A thread-safe byte counter that never goes negative.
///
/// Withdrawals succeed only when the whole amount is available; deposits always
/// succeed.
pub struct Counter(AtomicUsize);

impl Counter {
    /// Creates a new `Counter` holding `amount` bytes.
    pub fn new(amount: usize) -> Counter {
        Counter(AtomicUsize::new(amount))
    }

    /// Attempts to withdraw `amount` bytes.
    ///
    /// Returns `true` and decreases the counter when at least `amount` is available,
    /// otherwise leaves the counter unchanged and returns `false`.
    pub fn withdraw(&self, amount: usize) -> bool {
        let mut current = self.0.load(Ordering::Relaxed);
        while current >= amount {
            match self.0.compare_exchange_weak(
                current,
                current - amount,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(updated) => current = updated,
            }
        }
        false
    }

    /// Deposits `amount` bytes back into the counter.
    pub fn deposit(&self, amount: usize) {
        self.0.fetch_add(amount, Ordering::Release);
    }

    /// Returns the counter value (possibly stale by the time the caller looks at it).
    pub fn read(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}
