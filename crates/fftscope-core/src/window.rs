//! Fixed-capacity rolling windows for chart history

use heapless::Deque;

/// Capacity of the raw temperature and humidity windows
pub const RAW_WINDOW_CAPACITY: usize = 100;

/// Capacity of the spectrum windows
pub const SPECTRUM_WINDOW_CAPACITY: usize = 50;

/// Capacity of the spectrum timestamp axes
pub const TIMESTAMP_WINDOW_CAPACITY: usize = 100;

/// Ring buffer that keeps the newest `N` values in arrival order
///
/// Pushing into a full window evicts the oldest value first, so the length
/// never exceeds `N`.
#[derive(Debug, Clone)]
pub struct RollingWindow<T, const N: usize> {
    values: Deque<T, N>,
}

impl<T, const N: usize> Default for RollingWindow<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> RollingWindow<T, N> {
    pub const fn new() -> Self {
        Self {
            values: Deque::new(),
        }
    }

    /// Append a value, evicting the oldest one when full.
    ///
    /// Returns the evicted value, if any.
    pub fn push(&mut self, value: T) -> Option<T> {
        let evicted = if self.values.is_full() {
            self.values.pop_front()
        } else {
            None
        };
        // Cannot fail: a slot was freed above if the deque was full
        let _ = self.values.push_back(value);
        evicted
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Newest value
    pub fn last(&self) -> Option<&T> {
        self.values.back()
    }
}

impl<T: Clone, const N: usize> RollingWindow<T, N> {
    /// Copy the contents out, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.values.iter().cloned().collect()
    }
}

impl<T: PartialOrd, const N: usize> RollingWindow<T, N> {
    /// Append only if `value` is strictly greater than the newest entry.
    ///
    /// Keeps an axis strictly increasing when deliveries arrive out of order.
    /// Returns whether the value was appended.
    pub fn push_if_greater(&mut self, value: T) -> bool {
        if let Some(last) = self.last()
            && value <= *last
        {
            return false;
        }
        self.push(value);
        true
    }
}
