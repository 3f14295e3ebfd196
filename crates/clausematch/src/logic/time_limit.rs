//! Cooperative time limits checked at search checkpoints

use std::time::{Duration, Instant};

/// Oracle consulted periodically by long-running searches.
pub trait TimeLimit {
    fn exceeded(&self) -> bool;
}

/// Never expires.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

impl TimeLimit for Unlimited {
    fn exceeded(&self) -> bool {
        false
    }
}

/// Wall-clock budget measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn new(budget: Duration) -> Self {
        Deadline {
            start: Instant::now(),
            budget,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.start.elapsed())
    }
}

impl TimeLimit for Deadline {
    fn exceeded(&self) -> bool {
        self.start.elapsed() >= self.budget
    }
}

impl<L: TimeLimit + ?Sized> TimeLimit for &L {
    fn exceeded(&self) -> bool {
        (**self).exceeded()
    }
}
