use crate::generation::Generation;
use crate::parity::StepCounter;

/// Host-side double-buffered simulation.
///
/// Mirrors the GPU layout: two generation slots that never change size, with
/// the step counter deciding which one is read and which one is written each
/// tick. Used as the reference the GPU path is verified against.
#[derive(Debug, Clone)]
pub struct LifeWorld {
    buffers: [Generation; 2],
    counter: StepCounter,
}

impl LifeWorld {
    /// Both slots start with identical copies of `initial`.
    pub fn new(initial: Generation) -> Self {
        Self {
            buffers: [initial.clone(), initial],
            counter: StepCounter::new(),
        }
    }

    /// Completed ticks.
    pub fn step(&self) -> u64 {
        self.counter.step()
    }

    /// The latest completed generation.
    pub fn current(&self) -> &Generation {
        &self.buffers[self.counter.parity()]
    }

    /// Slot `index` (0 = A, 1 = B), whatever its role.
    pub fn buffer(&self, index: usize) -> &Generation {
        &self.buffers[index]
    }

    /// Advance one generation, writing into the slot not currently read.
    pub fn tick(&mut self) {
        let roles = self.counter.roles();
        let [a, b] = &mut self.buffers;
        let (input, output) = if roles.update_read == 0 {
            (&*a, b)
        } else {
            (&*b, a)
        };
        input.next_into(output.cells_mut());
        self.counter.advance();
        tracing::trace!(step = self.counter.step(), "cpu tick");
    }

    /// Run `ticks` generations.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifegrid_common::{ALIVE, ALIVE_PROBABILITY, GridSize};

    #[test]
    fn tick_matches_pure_step() {
        let size = GridSize::new(20, 12).unwrap();
        let initial = Generation::random(size, ALIVE_PROBABILITY, 11).unwrap();
        let mut world = LifeWorld::new(initial.clone());
        let mut expected = initial;
        for _ in 0..25 {
            world.tick();
            expected = expected.next();
            assert_eq!(world.current(), &expected);
        }
        assert_eq!(world.step(), 25);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let size = GridSize::square(32).unwrap();
        let initial = Generation::random(size, ALIVE_PROBABILITY, 99).unwrap();
        let mut first = LifeWorld::new(initial.clone());
        let mut second = LifeWorld::new(initial);
        first.run(50);
        second.run(50);
        assert_eq!(first.current().state_hash(), second.current().state_hash());
    }

    #[test]
    fn current_alternates_between_slots() {
        let size = GridSize::square(4).unwrap();
        let mut g = Generation::dead(size);
        g.set(1, 1, ALIVE);
        let mut world = LifeWorld::new(g);
        assert_eq!(world.current(), world.buffer(0));
        world.tick();
        assert_eq!(world.current(), world.buffer(1));
        assert_eq!(world.current().alive_count(), 0);
        // Slot A still holds the generation the tick read from.
        assert_eq!(world.buffer(0).alive_count(), 1);
    }
}
