//! Reusable-instance pooling.
//!
//! Placement rounds acquire and release simulation bodies many times per
//! round. Pooling amortizes that churn: released instances are queued and
//! handed back out instead of being reallocated.

use std::collections::VecDeque;

/// A generic object pool with FIFO reuse order.
///
/// Every instance the pool has ever created is either *in use* (returned by
/// a prior [`acquire`](Pool::acquire) and not yet released) or *available*
/// (queued for reuse) - never both. The pool grows on demand via its factory
/// and never shrinks; there is no exhaustion error.
///
/// Released instances are reused oldest-first. Callers must fully overwrite
/// an acquired instance's observable state: `release` does not reset domain
/// state.
///
/// # Example
///
/// ```rust
/// use stackwise_core::Pool;
///
/// let mut pool: Pool<Vec<f64>> = Pool::new(|| Vec::with_capacity(16));
///
/// let mut buf = pool.acquire();
/// buf.push(1.0);
/// pool.release(buf);
///
/// assert_eq!(pool.available(), 1);
/// assert_eq!(pool.in_use(), 0);
/// ```
pub struct Pool<T> {
    available: VecDeque<T>,
    factory: Box<dyn Fn() -> T>,
    in_use: usize,
}

impl<T> Pool<T> {
    /// Creates an empty pool with the given factory function.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        Self {
            available: VecDeque::new(),
            factory: Box::new(factory),
            in_use: 0,
        }
    }

    /// Creates a pool pre-filled with `initial_size` instances.
    pub fn with_initial_size<F>(factory: F, initial_size: usize) -> Self
    where
        F: Fn() -> T + 'static,
    {
        let mut available = VecDeque::with_capacity(initial_size);
        for _ in 0..initial_size {
            available.push_back(factory());
        }
        Self {
            available,
            factory: Box::new(factory),
            in_use: 0,
        }
    }

    /// Takes an instance from the pool, creating a new one if none is
    /// available.
    ///
    /// The returned instance may carry state from a previous user; the
    /// caller is expected to reinitialize it.
    pub fn acquire(&mut self) -> T {
        self.in_use += 1;
        self.available
            .pop_front()
            .unwrap_or_else(|| (self.factory)())
    }

    /// Returns an instance to the pool.
    ///
    /// The instance must have been acquired from this same pool.
    pub fn release(&mut self, item: T) {
        debug_assert!(self.in_use > 0, "release without matching acquire");
        self.in_use = self.in_use.saturating_sub(1);
        self.available.push_back(item);
    }

    /// Number of instances currently queued for reuse.
    pub fn available(&self) -> usize {
        self.available.len()
    }

    /// Number of instances currently acquired and not yet released.
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// True if no instance is queued for reuse.
    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }
}

impl<T> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("available", &self.available.len())
            .field("in_use", &self.in_use)
            .finish()
    }
}
