use std::cell::Cell;
use std::rc::Rc;

// Virtual pixel size of one terminal cell. A braille cell carries 2x4 dots,
// so one dot is 4x4 virtual pixels.
pub(crate) const CELL_W_PX: f32 = 8.0;
pub(crate) const CELL_H_PX: f32 = 16.0;
pub(crate) const DOT_W_PX: f32 = CELL_W_PX / 2.0;
pub(crate) const DOT_H_PX: f32 = CELL_H_PX / 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Viewport {
    pub(crate) cols: u16,
    pub(crate) rows: u16,
}

impl Viewport {
    pub(crate) fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    pub(crate) fn width(self) -> f32 {
        self.cols as f32 * CELL_W_PX
    }

    pub(crate) fn height(self) -> f32 {
        self.rows as f32 * CELL_H_PX
    }

    pub(crate) fn area(self) -> f32 {
        self.width() * self.height()
    }

    /// Braille canvas size in dots.
    pub(crate) fn dots(self) -> (u32, u32) {
        (self.cols as u32 * 2, self.rows as u32 * 4)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Pointer {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Pointer {
    /// Pointer sits at the centre of the hovered cell.
    pub(crate) fn from_cell(col: u16, row: u16) -> Self {
        Self {
            x: (col as f32 + 0.5) * CELL_W_PX,
            y: (row as f32 + 0.5) * CELL_H_PX,
        }
    }

    pub(crate) fn cell(self) -> (u16, u16) {
        (
            (self.x / CELL_W_PX).max(0.0) as u16,
            (self.y / CELL_H_PX).max(0.0) as u16,
        )
    }
}

/// Pointer and viewport state shared by every animation loop.
///
/// Written by input and resize handling, read at the start of each frame.
/// Everything runs on one thread, so plain `Cell`s behind an `Rc` are enough.
#[derive(Debug)]
pub(crate) struct Stage {
    viewport: Cell<Viewport>,
    pointer: Cell<Option<Pointer>>,
}

impl Stage {
    pub(crate) fn new(viewport: Viewport) -> Rc<Self> {
        Rc::new(Self {
            viewport: Cell::new(viewport),
            pointer: Cell::new(None),
        })
    }

    pub(crate) fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    pub(crate) fn set_viewport(&self, vp: Viewport) {
        self.viewport.set(vp);
    }

    /// `None` until the mouse has moved at least once.
    pub(crate) fn pointer(&self) -> Option<Pointer> {
        self.pointer.get()
    }

    pub(crate) fn move_pointer(&self, p: Pointer) {
        self.pointer.set(Some(p));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_maps_cells_to_pixels_and_dots() {
        let vp = Viewport::new(80, 24);
        assert_eq!(vp.width(), 640.0);
        assert_eq!(vp.height(), 384.0);
        assert_eq!(vp.dots(), (160, 96));
    }

    #[test]
    fn pointer_round_trips_through_cells() {
        let p = Pointer::from_cell(10, 3);
        assert_eq!(p.cell(), (10, 3));
    }

    #[test]
    fn stage_updates_are_visible_through_every_handle() {
        let stage = Stage::new(Viewport::new(10, 10));
        let other = Rc::clone(&stage);
        assert!(other.pointer().is_none());

        stage.move_pointer(Pointer { x: 4.0, y: 5.0 });
        stage.set_viewport(Viewport::new(20, 5));

        assert_eq!(other.pointer(), Some(Pointer { x: 4.0, y: 5.0 }));
        assert_eq!(other.viewport(), Viewport::new(20, 5));
    }
}
