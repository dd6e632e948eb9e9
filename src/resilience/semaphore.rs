//! Counting semaphore bounding concurrent streaming operations.

use crate::error::Result;
use crate::resilience::CancelToken;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// How often a blocked acquire re-checks its cancellation token.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Fixed-size counting semaphore with cancellation-aware acquire.
pub struct Semaphore {
    free: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    pub fn new(permits: usize) -> Self {
        Self {
            free: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    /// Block until a slot is free or the token is canceled.
    ///
    /// A canceled wait returns without taking a slot; a granted permit
    /// releases its slot on drop, including on panic or error paths.
    pub fn acquire(&self, cancel: &CancelToken) -> Result<Permit<'_>> {
        let mut free = self.free.lock().expect("semaphore mutex poisoned");
        loop {
            cancel.check()?;
            if *free > 0 {
                *free -= 1;
                return Ok(Permit { semaphore: self });
            }
            let (guard, _) = self
                .available
                .wait_timeout(free, CANCEL_POLL_INTERVAL)
                .expect("semaphore mutex poisoned");
            free = guard;
        }
    }

    /// Slots currently free.
    pub fn free_slots(&self) -> usize {
        *self.free.lock().expect("semaphore mutex poisoned")
    }

    fn release(&self) {
        let mut free = self.free.lock().expect("semaphore mutex poisoned");
        *free += 1;
        self.available.notify_one();
    }
}

/// RAII slot handle; dropping it releases the slot.
pub struct Permit<'a> {
    semaphore: &'a Semaphore,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.semaphore.release();
    }
}
