/// Vertical extent of something on the page, in page pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Span {
    pub(crate) top: f32,
    pub(crate) height: f32,
}

impl Span {
    pub(crate) fn bottom(self) -> f32 {
        self.top + self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RevealOptions {
    /// Fraction of the target that must be visible.
    pub(crate) threshold: f32,
    /// Pixels shaved off the bottom of the viewport before testing.
    pub(crate) bottom_margin: f32,
}

impl RevealOptions {
    pub(crate) const HALF: Self = Self {
        threshold: 0.5,
        bottom_margin: 0.0,
    };

    pub(crate) const ON_SCROLL: Self = Self {
        threshold: 0.1,
        bottom_margin: 100.0,
    };
}

/// Share of `target` inside the window `[view_top, view_bottom)`.
pub(crate) fn visible_ratio(target: Span, view_top: f32, view_bottom: f32) -> f32 {
    let overlap = target.bottom().min(view_bottom) - target.top.max(view_top);
    if target.height <= 0.0 {
        return if target.top >= view_top && target.top < view_bottom {
            1.0
        } else {
            0.0
        };
    }
    (overlap / target.height).clamp(0.0, 1.0)
}

/// One-shot visibility triggers. A target fires the first time enough of it
/// is on screen and is never watched again.
#[derive(Debug)]
pub(crate) struct Observer<K> {
    opts: RevealOptions,
    pending: Vec<(K, Span)>,
}

impl<K: Copy> Observer<K> {
    pub(crate) fn new(opts: RevealOptions) -> Self {
        Self {
            opts,
            pending: Vec::new(),
        }
    }

    pub(crate) fn observe(&mut self, key: K, span: Span) {
        self.pending.push((key, span));
    }

    /// Targets that just became visible, in observation order.
    /// The bottom margin never trims the watched band below half the view.
    pub(crate) fn poll(&mut self, scroll: f32, view_height: f32) -> Vec<K> {
        let view_height = view_height.max(0.0);
        let band = (view_height - self.opts.bottom_margin).max(view_height / 2.0);
        let top = scroll;
        let bottom = scroll + band;
        let threshold = self.opts.threshold;

        let mut fired = Vec::new();
        self.pending.retain(|&(key, span)| {
            let ratio = visible_ratio(span, top, bottom);
            if ratio > 0.0 && ratio >= threshold {
                fired.push(key);
                false
            } else {
                true
            }
        });
        fired
    }

    pub(crate) fn watching(&self) -> usize {
        self.pending.len()
    }
}
