/// Position within the question set.
///
/// `progress` is derived from the index rather than stored, so it always
/// equals `100 * (current + 1) / total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    current: usize,
    total: usize,
}

impl Navigator {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Percentage of the question set reached, 0 for an empty set.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let progress = 100.0 * (self.current + 1) as f64 / self.total as f64;
        progress
    }

    /// Step forward. Returns `false` (and stays put) on the last question.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.total {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Step back. Returns `false` (and stays put) on the first question.
    pub fn previous(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }
}
