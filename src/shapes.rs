//! Slow translucent outlines drifting behind the page.

use crate::render::{Pixel, PixelCanvas, Rgb};
use crate::stage::{Viewport, DOT_H_PX, DOT_W_PX};
use rand::{rngs::StdRng, Rng};
use std::f32::consts::TAU;

pub(crate) const SHAPE_COUNT: usize = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ShapeKind {
    Circle,
    Square,
    Triangle,
    Hexagon,
}

impl ShapeKind {
    const ALL: [ShapeKind; 4] = [
        ShapeKind::Circle,
        ShapeKind::Square,
        ShapeKind::Triangle,
        ShapeKind::Hexagon,
    ];

    /// Outline in unit-box coordinates, (0,0) top-left to (1,1).
    fn outline(self) -> Vec<(f32, f32)> {
        match self {
            ShapeKind::Circle => (0..24)
                .map(|i| {
                    let a = i as f32 / 24.0 * TAU;
                    (0.5 + 0.5 * a.cos(), 0.5 + 0.5 * a.sin())
                })
                .collect(),
            ShapeKind::Square => vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
            ShapeKind::Triangle => vec![(0.5, 0.0), (1.0, 1.0), (0.0, 1.0)],
            ShapeKind::Hexagon => vec![
                (0.3, 0.0),
                (0.7, 0.0),
                (1.0, 0.5),
                (0.7, 1.0),
                (0.3, 1.0),
                (0.0, 0.5),
            ],
        }
    }
}

const TINTS: [Rgb; 4] = [
    Rgb::new(0, 212, 255),
    Rgb::new(124, 58, 237),
    Rgb::new(245, 158, 11),
    Rgb::new(16, 185, 129),
];
const FILL_ALPHA: f32 = 0.1;
const BORDER_ALPHA: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Keyframe {
    pub(crate) at: f32,
    pub(crate) dx: f32,
    pub(crate) dy: f32,
    pub(crate) turn_deg: f32,
    pub(crate) opacity: f32,
}

pub(crate) static FLOAT_KEYFRAMES: [Keyframe; 5] = [
    Keyframe {
        at: 0.0,
        dx: 0.0,
        dy: 0.0,
        turn_deg: 0.0,
        opacity: 0.3,
    },
    Keyframe {
        at: 0.25,
        dx: 100.0,
        dy: -100.0,
        turn_deg: 90.0,
        opacity: 0.5,
    },
    Keyframe {
        at: 0.5,
        dx: -50.0,
        dy: 100.0,
        turn_deg: 180.0,
        opacity: 0.4,
    },
    Keyframe {
        at: 0.75,
        dx: -100.0,
        dy: -50.0,
        turn_deg: 270.0,
        opacity: 0.6,
    },
    Keyframe {
        at: 1.0,
        dx: 0.0,
        dy: 0.0,
        turn_deg: 0.0,
        opacity: 0.3,
    },
];

/// CSS `ease-in-out`, i.e. cubic-bezier(0.42, 0, 0.58, 1).
pub(crate) fn ease_in_out(t: f32) -> f32 {
    let (x1, x2) = (0.42f32, 0.58f32);
    let bez = |p1: f32, p2: f32, s: f32| {
        let u = 1.0 - s;
        3.0 * u * u * s * p1 + 3.0 * u * s * s * p2 + s * s * s
    };
    let t = t.clamp(0.0, 1.0);

    // solve x(s) = t by bisection, x is monotonic on [0,1]
    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    for _ in 0..24 {
        let mid = (lo + hi) * 0.5;
        if bez(x1, x2, mid) < t {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    bez(0.0, 1.0, (lo + hi) * 0.5)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Pose {
    pub(crate) dx: f32,
    pub(crate) dy: f32,
    pub(crate) turn_deg: f32,
    pub(crate) opacity: f32,
}

/// Sample the float animation at `progress` through one cycle.
pub(crate) fn pose_at(progress: f32) -> Pose {
    let p = progress.rem_euclid(1.0);
    let seg = FLOAT_KEYFRAMES
        .windows(2)
        .find(|w| p >= w[0].at && p <= w[1].at)
        .unwrap_or(&FLOAT_KEYFRAMES[3..5]);
    let (a, b) = (seg[0], seg[1]);
    let t = ease_in_out((p - a.at) / (b.at - a.at));
    let mix = |x: f32, y: f32| x + (y - x) * t;
    Pose {
        dx: mix(a.dx, b.dx),
        dy: mix(a.dy, b.dy),
        turn_deg: mix(a.turn_deg, b.turn_deg),
        opacity: mix(a.opacity, b.opacity),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Shape {
    pub(crate) kind: ShapeKind,
    /// Edge length in pixels.
    pub(crate) size: f32,
    pub(crate) tint: Rgb,
    /// Resting top-left corner as a fraction of the viewport.
    pub(crate) left: f32,
    pub(crate) top: f32,
    pub(crate) period: f32,
    pub(crate) delay: f32,
}

impl Shape {
    pub(crate) fn random(rng: &mut StdRng) -> Self {
        Self {
            kind: ShapeKind::ALL[rng.gen_range(0..ShapeKind::ALL.len())],
            size: rng.gen_range(50.0..150.0),
            tint: TINTS[rng.gen_range(0..TINTS.len())],
            left: rng.gen_range(0.0..1.0),
            top: rng.gen_range(0.0..1.0),
            period: rng.gen_range(15.0..25.0),
            delay: rng.gen_range(0.0..5.0),
        }
    }

    /// Pose `secs` after page load; the shape rests until its delay passes.
    pub(crate) fn pose(&self, secs: f32) -> Pose {
        if secs < self.delay {
            return pose_at(0.0);
        }
        pose_at((secs - self.delay) / self.period)
    }

    /// Rotated outline in viewport pixels.
    pub(crate) fn outline(&self, vp: Viewport, secs: f32) -> (Vec<(f32, f32)>, f32) {
        let pose = self.pose(secs);
        let x0 = self.left * vp.width() + pose.dx;
        let y0 = self.top * vp.height() + pose.dy;
        let (cx, cy) = (x0 + self.size / 2.0, y0 + self.size / 2.0);
        let (sin, cos) = pose.turn_deg.to_radians().sin_cos();

        let pts = self
            .kind
            .outline()
            .into_iter()
            .map(|(ux, uy)| {
                let x = (ux - 0.5) * self.size;
                let y = (uy - 0.5) * self.size;
                (cx + x * cos - y * sin, cy + x * sin + y * cos)
            })
            .collect();
        (pts, pose.opacity)
    }
}

pub(crate) struct ShapeLayer {
    shapes: Vec<Shape>,
    canvas: PixelCanvas,
}

impl ShapeLayer {
    pub(crate) fn new(rng: &mut StdRng, vp: Viewport) -> Self {
        let (w, h) = vp.dots();
        Self {
            shapes: (0..SHAPE_COUNT).map(|_| Shape::random(rng)).collect(),
            canvas: PixelCanvas::new(w, h),
        }
    }

    #[cfg(test)]
    pub(crate) fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub(crate) fn canvas(&self) -> &PixelCanvas {
        &self.canvas
    }

    pub(crate) fn draw(&mut self, vp: Viewport, secs: f32) {
        let (w, h) = vp.dots();
        self.canvas.resize(w, h);
        self.canvas.clear(Pixel::default());

        for s in &self.shapes {
            let (pts, opacity) = s.outline(vp, secs);
            let dots: Vec<(f32, f32)> = pts
                .into_iter()
                .map(|(x, y)| (x / DOT_W_PX, y / DOT_H_PX))
                .collect();
            self.canvas.fill_polygon(&dots, s.tint, FILL_ALPHA * opacity);
            self.canvas.outline(&dots, s.tint, BORDER_ALPHA * opacity);
        }
    }
}
