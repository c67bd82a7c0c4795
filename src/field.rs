//! Drifting point fields joined by proximity lines.
//!
//! The particle background and the circuit layer are two configurations of
//! the same loop: integrate, optionally push away from the pointer, fold back
//! into the viewport, then redraw every point and every close-enough pair.

use crate::render::{PixelCanvas, Pixel, Rgb};
use crate::schedule::{Flow, FrameTask, Lifecycle};
use crate::stage::{Stage, Viewport, DOT_H_PX, DOT_W_PX};
use rand::{rngs::StdRng, Rng};
use std::rc::Rc;
use std::time::Instant;

pub(crate) const PRIMARY: Rgb = Rgb::new(0, 212, 255);
pub(crate) const ACCENT: Rgb = Rgb::new(124, 58, 237);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tone {
    Primary,
    Accent,
}

/// What happens to a point that leaves the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Edge {
    /// Reappear at the opposite edge.
    Wrap,
    /// Flip the offending velocity component and clamp back inside.
    Bounce,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Population {
    /// One point per this many square pixels of viewport.
    PerArea(f32),
    Fixed(usize),
}

impl Population {
    pub(crate) fn count(self, vp: Viewport) -> usize {
        match self {
            Population::PerArea(per) if per > 0.0 => (vp.area() / per).floor() as usize,
            Population::PerArea(_) => 0,
            Population::Fixed(n) => n,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Repel {
    pub(crate) radius: f32,
    pub(crate) strength: f32,
}

#[derive(Clone, Debug)]
pub(crate) struct FieldConfig {
    pub(crate) population: Population,
    pub(crate) edge: Edge,
    /// Per-axis velocity is drawn from `[-speed, speed)`.
    pub(crate) speed: f32,
    pub(crate) radius: (f32, f32),
    pub(crate) opacity: (f32, f32),
    pub(crate) accent_chance: f64,
    pub(crate) link_distance: f32,
    /// Line opacity at zero distance.
    pub(crate) link_alpha: f32,
    /// Glow reaches this multiple of the radius; 0 disables it.
    pub(crate) glow_scale: f32,
    /// Added to a point's opacity for its solid core.
    pub(crate) core_boost: f32,
    pub(crate) repel: Option<Repel>,
    pub(crate) regenerate_on_resize: bool,
}

impl FieldConfig {
    pub(crate) fn particles() -> Self {
        Self {
            population: Population::PerArea(12_000.0),
            edge: Edge::Wrap,
            speed: 0.4,
            radius: (1.0, 3.5),
            opacity: (0.3, 0.9),
            accent_chance: 0.3,
            link_distance: 180.0,
            link_alpha: 0.25,
            glow_scale: 3.0,
            core_boost: 0.3,
            repel: Some(Repel {
                radius: 100.0,
                strength: 0.01,
            }),
            regenerate_on_resize: true,
        }
    }

    pub(crate) fn circuit() -> Self {
        Self {
            population: Population::Fixed(20),
            edge: Edge::Bounce,
            speed: 0.25,
            radius: (3.0, 3.0),
            opacity: (0.5, 0.5),
            accent_chance: 0.0,
            link_distance: 200.0,
            link_alpha: 0.3,
            glow_scale: 0.0,
            core_boost: 0.0,
            repel: None,
            regenerate_on_resize: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Point {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) radius: f32,
    pub(crate) vx: f32,
    pub(crate) vy: f32,
    pub(crate) opacity: f32,
    pub(crate) tone: Tone,
}

impl Point {
    pub(crate) fn color(&self) -> Rgb {
        match self.tone {
            Tone::Primary => PRIMARY,
            Tone::Accent => ACCENT,
        }
    }

    pub(crate) fn distance(&self, o: &Point) -> f32 {
        let dx = self.x - o.x;
        let dy = self.y - o.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Link {
    pub(crate) a: usize,
    pub(crate) b: usize,
    pub(crate) distance: f32,
    pub(crate) opacity: f32,
}

/// Opacity of a connection, or `None` when the pair is too far apart.
pub(crate) fn link_opacity(distance: f32, threshold: f32, peak: f32) -> Option<f32> {
    if distance < threshold {
        Some(peak * (1.0 - distance / threshold))
    } else {
        None
    }
}

fn sample(rng: &mut StdRng, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

fn wrap(v: f32, max: f32) -> f32 {
    if v < 0.0 {
        max
    } else if v > max {
        0.0
    } else {
        v
    }
}

pub(crate) struct Field {
    cfg: FieldConfig,
    stage: Rc<Stage>,
    bounds: Viewport,
    points: Vec<Point>,
    links: Vec<Link>,
    canvas: PixelCanvas,
    rng: StdRng,
    life: Lifecycle,
}

impl Field {
    pub(crate) fn new(cfg: FieldConfig, stage: Rc<Stage>, rng: StdRng) -> Self {
        let bounds = stage.viewport();
        let (w, h) = bounds.dots();
        let mut field = Self {
            cfg,
            stage,
            bounds,
            points: Vec::new(),
            links: Vec::new(),
            canvas: PixelCanvas::new(w, h),
            rng,
            life: Lifecycle::new(),
        };
        field.populate();
        field
    }

    /// Throw away every point and scatter a fresh batch over the viewport.
    pub(crate) fn populate(&mut self) {
        let n = self.cfg.population.count(self.bounds);
        let (w, h) = (self.bounds.width(), self.bounds.height());
        let cfg = &self.cfg;
        let rng = &mut self.rng;

        self.points = (0..n)
            .map(|_| Point {
                x: sample(rng, (0.0, w)),
                y: sample(rng, (0.0, h)),
                radius: sample(rng, cfg.radius),
                vx: sample(rng, (-cfg.speed, cfg.speed)),
                vy: sample(rng, (-cfg.speed, cfg.speed)),
                opacity: sample(rng, cfg.opacity),
                tone: if rng.gen_bool(cfg.accent_chance.clamp(0.0, 1.0)) {
                    Tone::Accent
                } else {
                    Tone::Primary
                },
            })
            .collect();
        self.links.clear();
    }

    #[cfg(test)]
    pub(crate) fn points(&self) -> &[Point] {
        &self.points
    }

    #[cfg(test)]
    pub(crate) fn links(&self) -> &[Link] {
        &self.links
    }

    pub(crate) fn canvas(&self) -> &PixelCanvas {
        &self.canvas
    }

    pub(crate) fn lifecycle(&self) -> Lifecycle {
        self.life.clone()
    }

    /// Pick up a viewport change. Returns whether anything changed.
    pub(crate) fn sync_viewport(&mut self) -> bool {
        let vp = self.stage.viewport();
        if vp == self.bounds {
            return false;
        }
        self.bounds = vp;
        let (w, h) = vp.dots();
        self.canvas.resize(w, h);
        if self.cfg.regenerate_on_resize {
            self.populate();
            tracing::debug!(
                points = self.points.len(),
                cols = vp.cols,
                rows = vp.rows,
                "field regenerated"
            );
        }
        true
    }

    /// Advance every point by one frame.
    pub(crate) fn update(&mut self) {
        let (w, h) = (self.bounds.width(), self.bounds.height());
        let pointer = self.stage.pointer();

        for p in &mut self.points {
            p.x += p.vx;
            p.y += p.vy;

            // Repulsion nudges position directly; velocity is untouched.
            if let (Some(rep), Some(m)) = (self.cfg.repel, pointer) {
                let dx = m.x - p.x;
                let dy = m.y - p.y;
                let d = (dx * dx + dy * dy).sqrt();
                if d < rep.radius {
                    let force = (rep.radius - d) / rep.radius;
                    p.x -= dx * force * rep.strength;
                    p.y -= dy * force * rep.strength;
                }
            }

            match self.cfg.edge {
                Edge::Wrap => {
                    p.x = wrap(p.x, w);
                    p.y = wrap(p.y, h);
                }
                Edge::Bounce => {
                    if p.x < 0.0 || p.x > w {
                        p.vx = -p.vx;
                        p.x = p.x.clamp(0.0, w);
                    }
                    if p.y < 0.0 || p.y > h {
                        p.vy = -p.vy;
                        p.y = p.y.clamp(0.0, h);
                    }
                }
            }
        }

        self.collect_links();
    }

    // All pairs, on purpose: counts stay in the tens.
    fn collect_links(&mut self) {
        self.links.clear();
        for (i, a) in self.points.iter().enumerate() {
            for (j, b) in self.points.iter().enumerate().skip(i + 1) {
                let d = a.distance(b);
                let opacity = link_opacity(d, self.cfg.link_distance, self.cfg.link_alpha);
                if let Some(opacity) = opacity {
                    self.links.push(Link {
                        a: i,
                        b: j,
                        distance: d,
                        opacity,
                    });
                }
            }
        }
    }

    pub(crate) fn draw(&mut self) {
        self.canvas.clear(Pixel::default());
        let dot = |p: &Point| (p.x / DOT_W_PX, p.y / DOT_H_PX);

        for l in &self.links {
            let (a, b) = (&self.points[l.a], &self.points[l.b]);
            self.canvas.line(dot(a), dot(b), a.color(), b.color(), l.opacity);
        }

        for p in &self.points {
            let (cx, cy) = dot(p);
            let r = p.radius / DOT_W_PX;
            if self.cfg.glow_scale > 0.0 {
                self.canvas
                    .glow(cx, cy, r * self.cfg.glow_scale, p.color(), p.opacity);
            }
            let core = (p.opacity + self.cfg.core_boost).min(1.0);
            self.canvas.disc(cx, cy, r, p.color(), core);
        }
    }
}

impl FrameTask for Field {
    fn step(&mut self, _now: Instant) -> Flow {
        if !self.life.is_live() {
            return Flow::Done;
        }
        self.sync_viewport();
        self.update();
        self.draw();
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Pointer;
    use rand::SeedableRng;

    fn field(cfg: FieldConfig, cols: u16, rows: u16) -> (Field, Rc<Stage>) {
        let stage = Stage::new(Viewport::new(cols, rows));
        let f = Field::new(cfg, Rc::clone(&stage), StdRng::seed_from_u64(7));
        (f, stage)
    }

    fn in_bounds(f: &Field, vp: Viewport) -> bool {
        f.points().iter().all(|p| {
            (0.0..=vp.width()).contains(&p.x) && (0.0..=vp.height()).contains(&p.y)
        })
    }

    #[test]
    fn particle_count_follows_viewport_area() {
        for (cols, rows) in [(80u16, 24u16), (200, 60), (10, 3), (1, 1)] {
            let vp = Viewport::new(cols, rows);
            let (f, _) = field(FieldConfig::particles(), cols, rows);
            let expected = (vp.width() * vp.height() / 12_000.0).floor() as usize;
            assert_eq!(f.points().len(), expected, "{cols}x{rows}");
        }
    }

    #[test]
    fn fresh_particles_respect_their_ranges() {
        let (f, stage) = field(FieldConfig::particles(), 200, 60);
        let vp = stage.viewport();
        assert!(in_bounds(&f, vp));
        for p in f.points() {
            assert!((1.0..3.5).contains(&p.radius));
            assert!((-0.4..0.4).contains(&p.vx));
            assert!((-0.4..0.4).contains(&p.vy));
            assert!((0.3..0.9).contains(&p.opacity));
        }
        let accents = f.points().iter().filter(|p| p.tone == Tone::Accent).count();
        assert!(accents > 0 && accents < f.points().len());
    }

    #[test]
    fn resize_replaces_the_whole_particle_set() {
        let (mut f, stage) = field(FieldConfig::particles(), 80, 24);
        let before = f.points().to_vec();

        stage.set_viewport(Viewport::new(120, 40));
        assert!(f.sync_viewport());

        let vp = stage.viewport();
        assert_eq!(f.points().len(), Population::PerArea(12_000.0).count(vp));
        assert!(f.points().iter().all(|p| !before.contains(p)));
        assert_eq!(f.canvas().w, 240);
        assert_eq!(f.canvas().h, 160);
        assert!(!f.sync_viewport());
    }

    #[test]
    fn circuit_keeps_its_nodes_across_resize() {
        let (mut f, stage) = field(FieldConfig::circuit(), 80, 24);
        assert_eq!(f.points().len(), 20);
        let before = f.points().to_vec();

        stage.set_viewport(Viewport::new(40, 12));
        assert!(f.sync_viewport());
        assert_eq!(f.points(), &before[..]);

        f.update();
        assert!(in_bounds(&f, stage.viewport()));
    }

    #[test]
    fn points_stay_inside_the_viewport_every_frame() {
        for cfg in [FieldConfig::particles(), FieldConfig::circuit()] {
            let (mut f, stage) = field(cfg, 60, 20);
            stage.move_pointer(Pointer { x: 5.0, y: 5.0 });
            let vp = stage.viewport();
            for frame in 0..3_000 {
                if frame % 500 == 0 {
                    let t = frame as f32;
                    stage.move_pointer(Pointer {
                        x: t % vp.width(),
                        y: t % vp.height(),
                    });
                }
                f.update();
                assert!(in_bounds(&f, vp), "frame {frame}");
            }
        }
    }

    #[test]
    fn wrap_sends_points_to_the_opposite_edge() {
        let (mut f, stage) = field(FieldConfig::particles(), 80, 24);
        let vp = stage.viewport();
        f.points.truncate(1);
        f.points[0] = Point {
            x: 0.1,
            y: vp.height() - 0.1,
            radius: 1.0,
            vx: -0.3,
            vy: 0.3,
            opacity: 0.5,
            tone: Tone::Primary,
        };
        f.update();
        assert_eq!(f.points[0].x, vp.width());
        assert_eq!(f.points[0].y, 0.0);
        assert_eq!(f.points[0].vx, -0.3);
    }

    #[test]
    fn bounce_flips_velocity_at_the_wall() {
        let (mut f, stage) = field(FieldConfig::circuit(), 80, 24);
        let vp = stage.viewport();
        f.points.truncate(1);
        f.points[0].x = vp.width() - 0.1;
        f.points[0].vx = 0.25;
        f.update();
        assert_eq!(f.points[0].vx, -0.25);
        assert_eq!(f.points[0].x, vp.width());
    }

    #[test]
    fn pointer_pushes_nearby_particles_without_changing_velocity() {
        let (mut f, stage) = field(FieldConfig::particles(), 80, 24);
        f.points.truncate(1);
        f.points[0] = Point {
            x: 100.0,
            y: 100.0,
            radius: 2.0,
            vx: 0.0,
            vy: 0.0,
            opacity: 0.5,
            tone: Tone::Primary,
        };
        stage.move_pointer(Pointer { x: 150.0, y: 100.0 });
        f.update();

        // d = 50, force = 0.5, shift = 50 * 0.5 * 0.01
        let p = f.points[0];
        assert!((p.x - 99.75).abs() < 1e-4);
        assert_eq!(p.y, 100.0);
        assert_eq!((p.vx, p.vy), (0.0, 0.0));

        stage.move_pointer(Pointer { x: 400.0, y: 100.0 });
        f.update();
        assert_eq!(f.points[0].x, p.x);
    }

    #[test]
    fn links_exist_exactly_below_the_threshold() {
        let (mut f, _) = field(FieldConfig::particles(), 80, 24);
        let base = Point {
            x: 10.0,
            y: 10.0,
            radius: 1.0,
            vx: 0.0,
            vy: 0.0,
            opacity: 0.5,
            tone: Tone::Primary,
        };
        f.points = vec![
            base,
            Point { x: 100.0, ..base },
            Point { x: 190.0, ..base },
            Point {
                x: 10.0,
                y: 190.0,
                ..base
            },
        ];
        f.update();

        for i in 0..f.points.len() {
            for j in i + 1..f.points.len() {
                let d = f.points[i].distance(&f.points[j]);
                let link = f.links().iter().find(|l| l.a == i && l.b == j);
                match link {
                    Some(l) => {
                        assert!(d < 180.0);
                        assert!((l.opacity - 0.25 * (1.0 - d / 180.0)).abs() < 1e-6);
                    }
                    None => assert!(d >= 180.0),
                }
            }
        }
        // 0-1 (90), 1-2 (90) are linked; 0-2 and 0-3 sit at exactly 180
        assert_eq!(f.links().len(), 2);
    }

    #[test]
    fn link_opacity_fades_to_zero_at_the_threshold() {
        assert_eq!(link_opacity(0.0, 180.0, 0.25), Some(0.25));
        assert_eq!(link_opacity(90.0, 180.0, 0.25), Some(0.125));
        let near = link_opacity(179.999, 180.0, 0.25).unwrap();
        assert!(near > 0.0 && near < 1e-5);
        assert_eq!(link_opacity(180.0, 180.0, 0.25), None);
        assert_eq!(link_opacity(300.0, 200.0, 0.3), None);
    }

    #[test]
    fn drawing_inks_the_canvas() {
        let (mut f, _) = field(FieldConfig::circuit(), 40, 12);
        f.step(Instant::now());
        assert!(f.canvas().px.iter().any(|p| p.a > 0));
    }

    #[test]
    fn cancelled_field_stops_stepping() {
        let (mut f, _) = field(FieldConfig::particles(), 80, 24);
        let before = f.points().to_vec();
        f.lifecycle().cancel();
        assert_eq!(f.step(Instant::now()), Flow::Done);
        assert_eq!(f.points(), &before[..]);
    }
}
