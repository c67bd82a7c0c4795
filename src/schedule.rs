use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Done,
}

/// One step of a self-rescheduling animation, polled once per frame.
pub(crate) trait FrameTask {
    fn step(&mut self, now: Instant) -> Flow;
}

/// Cancellation token shared between a task and whoever started it.
#[derive(Clone, Debug)]
pub(crate) struct Lifecycle(Rc<Cell<bool>>);

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub(crate) fn is_live(&self) -> bool {
        self.0.get()
    }

    pub(crate) fn cancel(&self) {
        self.0.set(false);
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-period timer. Fires at most once per poll, like `setInterval`
/// under a busy event loop: late ticks are not replayed.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Interval {
    every: Duration,
    next_due: Instant,
}

impl Interval {
    pub(crate) fn new(every: Duration, start: Instant) -> Self {
        Self {
            every,
            next_due: start + every,
        }
    }

    pub(crate) fn ready(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.every;
        true
    }
}

struct Slot {
    life: Lifecycle,
    task: Box<dyn FrameTask>,
}

#[derive(Default)]
pub(crate) struct Scheduler {
    slots: Vec<Slot>,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn spawn(&mut self, task: Box<dyn FrameTask>) -> Lifecycle {
        let life = Lifecycle::new();
        self.slots.push(Slot {
            life: life.clone(),
            task,
        });
        life
    }

    /// Step every live task; finished or cancelled tasks are dropped.
    pub(crate) fn run_frame(&mut self, now: Instant) {
        self.slots
            .retain_mut(|s| s.life.is_live() && s.task.step(now) == Flow::Continue);
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Countdown(Rc<Cell<u32>>);

    impl FrameTask for Countdown {
        fn step(&mut self, _now: Instant) -> Flow {
            let left = self.0.get().saturating_sub(1);
            self.0.set(left);
            if left == 0 {
                Flow::Done
            } else {
                Flow::Continue
            }
        }
    }

    #[test]
    fn finished_tasks_leave_the_scheduler() {
        let left = Rc::new(Cell::new(3));
        let mut sched = Scheduler::new();
        sched.spawn(Box::new(Countdown(Rc::clone(&left))));

        let now = Instant::now();
        sched.run_frame(now);
        sched.run_frame(now);
        assert_eq!(sched.len(), 1);
        sched.run_frame(now);
        assert_eq!(left.get(), 0);
        assert_eq!(sched.len(), 0);
    }

    #[test]
    fn cancelled_tasks_are_not_stepped_again() {
        let left = Rc::new(Cell::new(100));
        let mut sched = Scheduler::new();
        let life = sched.spawn(Box::new(Countdown(Rc::clone(&left))));

        sched.run_frame(Instant::now());
        life.cancel();
        sched.run_frame(Instant::now());

        assert_eq!(left.get(), 99);
        assert_eq!(sched.len(), 0);
    }

    #[test]
    fn interval_fires_once_per_period() {
        let t0 = Instant::now();
        let mut iv = Interval::new(Duration::from_millis(16), t0);
        assert!(!iv.ready(t0));
        assert!(!iv.ready(t0 + Duration::from_millis(15)));
        assert!(iv.ready(t0 + Duration::from_millis(16)));
        assert!(!iv.ready(t0 + Duration::from_millis(20)));
        // a long stall yields a single tick, not a burst
        assert!(iv.ready(t0 + Duration::from_millis(500)));
        assert!(!iv.ready(t0 + Duration::from_millis(501)));
    }
}
