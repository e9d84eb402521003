//! Byte budgets for bounding how much memory a group of containers may hold.
//!
//! Memory is charged against a [`Budget`] through an [`Allocation`], which follows
//! the size of the memory it accounts for and refunds its bytes when dropped. Once the
//! quota is spent further charges fail, so allocation failure can be reached on purpose.

use std::sync::Arc;

use counter::Counter;

pub mod counter;

/// A byte quota. Clones share the quota.
#[derive(Clone)]
pub struct Budget(Arc<Counter>);

impl Budget {
    pub fn new(amount: usize) -> Budget {
        Budget(Arc::new(Counter::new(amount)))
    }

    /// Bytes not yet charged. May be stale when other threads hold allocations.
    pub fn remaining(&self) -> usize {
        self.0.read()
    }

    /// Charges `amount` bytes, refunded when the returned `Allocation` is dropped.
    pub fn allocate(&self, amount: usize) -> Result<Allocation, AllocationError> {
        if !self.0.withdraw(amount) {
            return Err(AllocationError { requested: amount });
        }
        Ok(Allocation {
            quota: self.0.clone(),
            amount,
        })
    }
}

impl std::fmt::Debug for Budget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Budget").field(&self.remaining()).finish()
    }
}

/// Bytes charged against a [`Budget`].
pub struct Allocation {
    quota: Arc<Counter>,
    amount: usize,
}

impl Allocation {
    pub fn amount(&self) -> usize {
        self.amount
    }

    /// Charges `additional` more bytes. On failure the charge is unchanged.
    pub fn grow(&mut self, additional: usize) -> Result<(), AllocationError> {
        let error = AllocationError {
            requested: additional,
        };
        let amount = self.amount.checked_add(additional).ok_or(error)?;
        if !self.quota.withdraw(additional) {
            return Err(error);
        }
        self.amount = amount;
        Ok(())
    }

    /// Refunds everything above `amount`. Does nothing if the charge is not larger.
    pub fn shrink_to(&mut self, amount: usize) {
        if amount < self.amount {
            self.quota.deposit(self.amount - amount);
            self.amount = amount;
        }
    }
}

impl Drop for Allocation {
    fn drop(&mut self) {
        self.shrink_to(0);
    }
}

impl std::fmt::Debug for Allocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Allocation").field(&self.amount).finish()
    }
}

/// A budget could not cover a charge of `requested` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationError {
    pub requested: usize,
}

impl std::fmt::Display for AllocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "budget cannot cover {} bytes", self.requested)
    }
}

impl std::error::Error for AllocationError {}
