//! Simple Moving Average (SMA), streaming form.
//!
//! Rolling mean over the last `period` pushed values. Invalid (`None`) until
//! the window is full; first valid value after `period` pushes.
//!
//! The mean is summed from the window on every push, so a window of equal
//! values yields exactly that value.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    window: VecDeque<f64>,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            window: VecDeque::with_capacity(period + 1),
        }
    }

    /// Push the next value; returns the mean once `period` values are held.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.window.push_back(value);
        if self.window.len() > self.period {
            self.window.pop_front();
        }
        self.current()
    }

    /// Mean of the current window, if full.
    pub fn current(&self) -> Option<f64> {
        (self.window.len() == self.period)
            .then(|| self.window.iter().sum::<f64>() / self.period as f64)
    }
}
