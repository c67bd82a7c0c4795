use crate::schedule::{Flow, FrameTask};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub(crate) const TYPE_SPEED: Duration = Duration::from_millis(100);
pub(crate) const HOLD: Duration = Duration::from_millis(2000);

/// Types each string out, holds it, erases it at double speed, moves on.
#[derive(Clone, Debug)]
pub(crate) struct Typewriter {
    strings: Vec<String>,
    speed: Duration,
    index: usize,
    chars: usize,
    deleting: bool,
}

impl Typewriter {
    pub(crate) fn new(strings: Vec<String>, speed: Duration) -> Self {
        Self {
            strings,
            speed,
            index: 0,
            chars: 0,
            deleting: false,
        }
    }

    pub(crate) fn text(&self) -> String {
        self.strings
            .get(self.index)
            .map(|s| s.chars().take(self.chars).collect())
            .unwrap_or_default()
    }

    /// Apply one keystroke and return the delay before the next one.
    pub(crate) fn advance(&mut self) -> Duration {
        let Some(current) = self.strings.get(self.index) else {
            return self.speed;
        };
        let len = current.chars().count();

        if self.deleting {
            self.chars = self.chars.saturating_sub(1);
            if self.chars == 0 {
                self.deleting = false;
                self.index = (self.index + 1) % self.strings.len();
                return self.speed;
            }
            return self.speed / 2;
        }

        if self.chars < len {
            self.chars += 1;
        }
        if self.chars == len {
            self.deleting = true;
            return HOLD;
        }
        self.speed
    }
}

pub(crate) struct TypewriterTask {
    writer: Typewriter,
    display: Rc<RefCell<String>>,
    next_at: Instant,
}

impl TypewriterTask {
    pub(crate) fn new(writer: Typewriter, display: Rc<RefCell<String>>, start: Instant) -> Self {
        Self {
            writer,
            display,
            next_at: start,
        }
    }
}

impl FrameTask for TypewriterTask {
    fn step(&mut self, now: Instant) -> Flow {
        if now >= self.next_at {
            let delay = self.writer.advance();
            self.next_at = now + delay;
            *self.display.borrow_mut() = self.writer.text();
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer(words: &[&str]) -> Typewriter {
        Typewriter::new(words.iter().map(|s| s.to_string()).collect(), TYPE_SPEED)
    }

    #[test]
    fn types_holds_deletes_then_moves_on() {
        let mut tw = writer(&["ab", "xyz"]);

        assert_eq!(tw.advance(), TYPE_SPEED);
        assert_eq!(tw.text(), "a");
        assert_eq!(tw.advance(), HOLD);
        assert_eq!(tw.text(), "ab");

        assert_eq!(tw.advance(), TYPE_SPEED / 2);
        assert_eq!(tw.text(), "a");
        assert_eq!(tw.advance(), TYPE_SPEED);
        assert_eq!(tw.text(), "");

        tw.advance();
        assert_eq!(tw.text(), "x");
    }

    #[test]
    fn wraps_back_to_the_first_string() {
        let mut tw = writer(&["a", "b"]);
        let mut seen = Vec::new();
        for _ in 0..8 {
            tw.advance();
            let t = tw.text();
            if !t.is_empty() && seen.last() != Some(&t) {
                seen.push(t);
            }
        }
        assert_eq!(seen, ["a", "b", "a", "b"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let mut tw = writer(&["né"]);
        tw.advance();
        tw.advance();
        assert_eq!(tw.text(), "né");
    }

    #[test]
    fn nothing_to_type_is_harmless() {
        let mut tw = writer(&[]);
        assert_eq!(tw.advance(), TYPE_SPEED);
        assert_eq!(tw.text(), "");
    }

    #[test]
    fn task_writes_into_the_display() {
        let display = Rc::new(RefCell::new(String::new()));
        let t0 = Instant::now();
        let mut task = TypewriterTask::new(writer(&["hey"]), Rc::clone(&display), t0);
        task.step(t0);
        assert_eq!(display.borrow().as_str(), "h");
        task.step(t0 + Duration::from_millis(50));
        assert_eq!(display.borrow().as_str(), "h");
        task.step(t0 + TYPE_SPEED);
        assert_eq!(display.borrow().as_str(), "he");
    }
}
