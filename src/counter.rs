use crate::schedule::{Flow, FrameTask, Interval};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub(crate) const TICK: Duration = Duration::from_millis(16);
pub(crate) const COUNTER_DURATION: Duration = Duration::from_millis(2000);
pub(crate) const SKILL_BAR_DURATION: Duration = Duration::from_millis(1500);

/// Linear count-up from zero, one increment per tick.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Counter {
    target: u32,
    increment: f64,
    current: f64,
    finished: bool,
}

impl Counter {
    pub(crate) fn new(target: u32, duration: Duration) -> Self {
        let ticks = (duration.as_secs_f64() / TICK.as_secs_f64()).max(1.0);
        Self {
            target,
            increment: target as f64 / ticks,
            current: 0.0,
            finished: target == 0,
        }
    }

    /// Advance one tick and return the value to display.
    pub(crate) fn tick(&mut self) -> u32 {
        if self.finished {
            return self.target;
        }
        self.current += self.increment;
        if self.current >= self.target as f64 {
            self.finished = true;
            self.target
        } else {
            self.current.floor() as u32
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Drives a [`Counter`] on a 16 ms interval and publishes each value into
/// `display`; finishes itself once the target is shown.
pub(crate) struct CounterTask {
    counter: Counter,
    display: Rc<Cell<u32>>,
    interval: Interval,
}

impl CounterTask {
    pub(crate) fn new(counter: Counter, display: Rc<Cell<u32>>, start: Instant) -> Self {
        Self {
            counter,
            display,
            interval: Interval::new(TICK, start),
        }
    }
}

impl FrameTask for CounterTask {
    fn step(&mut self, now: Instant) -> Flow {
        if self.interval.ready(now) {
            self.display.set(self.counter.tick());
        }
        if self.counter.is_finished() {
            Flow::Done
        } else {
            Flow::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_up_monotonically_and_lands_on_target() {
        let mut c = Counter::new(100, COUNTER_DURATION);
        let mut shown = Vec::new();
        while !c.is_finished() {
            shown.push(c.tick());
            assert!(shown.len() < 1_000);
        }
        assert!(shown.windows(2).all(|w| w[0] <= w[1]));
        assert!(shown.iter().all(|&v| v <= 100));
        assert_eq!(*shown.last().unwrap(), 100);
        // 2000 ms at 16 ms ticks is 125 steps, give or take float error
        assert!((125..=126).contains(&shown.len()));
    }

    #[test]
    fn odd_targets_still_finish_exactly() {
        for target in [1, 7, 42, 999, 12_345] {
            let mut c = Counter::new(target, COUNTER_DURATION);
            let mut last = 0;
            while !c.is_finished() {
                last = c.tick();
            }
            assert_eq!(last, target);
            assert_eq!(c.tick(), target);
        }
    }

    #[test]
    fn zero_target_is_already_done() {
        let mut c = Counter::new(0, COUNTER_DURATION);
        assert!(c.is_finished());
        assert_eq!(c.tick(), 0);
    }

    #[test]
    fn task_publishes_on_each_tick_and_finishes() {
        let display = Rc::new(Cell::new(0));
        let t0 = Instant::now();
        let mut task = CounterTask::new(
            Counter::new(10, Duration::from_millis(160)),
            Rc::clone(&display),
            t0,
        );

        assert_eq!(task.step(t0), Flow::Continue);
        assert_eq!(display.get(), 0);

        let mut now = t0;
        let mut flow = Flow::Continue;
        for _ in 0..20 {
            now += TICK;
            flow = task.step(now);
            if flow == Flow::Done {
                break;
            }
        }
        assert_eq!(flow, Flow::Done);
        assert_eq!(display.get(), 10);
    }
}
