/// Buffer roles for one tick. Indices refer to generation buffers A (0) and B (1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRoles {
    /// Parity of the step the tick started at; selects the update binding set.
    pub parity: usize,
    /// Buffer the update kernel reads.
    pub update_read: usize,
    /// Buffer the update kernel writes.
    pub update_write: usize,
    /// Buffer the render kernel reads, after the step counter has advanced.
    pub render_read: usize,
}

/// Monotonic step counter. `step % 2` picks which buffer holds the current
/// generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepCounter {
    step: u64,
}

impl StepCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed ticks.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Index of the buffer holding the latest completed generation.
    pub fn parity(&self) -> usize {
        (self.step % 2) as usize
    }

    /// Roles for the tick that would run from the current step.
    pub fn roles(&self) -> TickRoles {
        let parity = self.parity();
        TickRoles {
            parity,
            update_read: parity,
            update_write: 1 - parity,
            render_read: ((self.step + 1) % 2) as usize,
        }
    }

    /// Record a completed tick.
    pub fn advance(&mut self) {
        self.step += 1;
    }
}
