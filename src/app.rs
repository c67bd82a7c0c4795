use crate::config::{load_profile, Args, Settings};
use crate::counter::{Counter, CounterTask, COUNTER_DURATION, SKILL_BAR_DURATION};
use crate::field::{Field, FieldConfig};
use crate::input::{collect_input_nonblocking, map_key_to_action, InputEvent, PageAction};
use crate::logging;
use crate::page::{Line, Page};
use crate::render::{canvas_to_cells, Pixel, Terminal};
use crate::reveal::{Observer, RevealOptions};
use crate::schedule::{Flow, FrameTask, Scheduler};
use crate::shapes::ShapeLayer;
use crate::shell::Shell;
use crate::stage::{Pointer, Stage, Viewport, CELL_H_PX};
use crate::typing::{Typewriter, TypewriterTask, TYPE_SPEED};
use crate::view::{self, Hit, Theme};
use clap::Parser;
use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::style::Color;
use rand::{rngs::StdRng, SeedableRng};
use std::rc::Rc;
use std::time::{Duration, Instant};

const PARTICLE_OPACITY: f32 = 0.7;
const CIRCUIT_OPACITY: f32 = 0.2;
const WHEEL_ROWS: f32 = 3.0;

struct Layer {
    field: Field,
    opacity: f32,
}

pub(crate) struct App {
    settings: Settings,
    term: Terminal,
    stage: Rc<Stage>,
    page: Page,
    shell: Shell,
    scheduler: Scheduler,
    layers: Vec<Layer>,
    shapes: Option<ShapeLayer>,
    stat_watch: Observer<usize>,
    skill_watch: Observer<usize>,
    section_watch: Observer<usize>,
    hovered: Option<usize>,
    started: Instant,
    should_quit: bool,
}

impl App {
    fn init() -> anyhow::Result<Self> {
        let args = Args::parse();
        logging::init(args.log_file.as_deref())?;

        let settings = Settings::from_args(&args);
        let (profile, source) = load_profile(args.profile.as_deref())?;
        tracing::info!(?source, name = %profile.name, seed = settings.seed, "starting");

        let term = Terminal::begin()?;
        let stage = Stage::new(Viewport::new(term.cols, term.rows));

        let mut layers = Vec::new();
        if settings.circuit {
            layers.push(Layer {
                field: Field::new(
                    FieldConfig::circuit(),
                    Rc::clone(&stage),
                    StdRng::seed_from_u64(settings.seed.wrapping_add(1)),
                ),
                opacity: CIRCUIT_OPACITY,
            });
        }
        layers.push(Layer {
            field: Field::new(
                FieldConfig::particles(),
                Rc::clone(&stage),
                StdRng::seed_from_u64(settings.seed),
            ),
            opacity: PARTICLE_OPACITY,
        });

        let shapes = settings.shapes.then(|| {
            let mut rng = StdRng::seed_from_u64(settings.seed.wrapping_add(2));
            ShapeLayer::new(&mut rng, stage.viewport())
        });

        let mut page = Page::from_profile(&profile);
        page.set_view_height(content_height(term.rows));

        let now = Instant::now();
        let mut scheduler = Scheduler::new();
        if !profile.roles.is_empty() {
            let writer = Typewriter::new(profile.roles.clone(), TYPE_SPEED);
            scheduler.spawn(Box::new(TypewriterTask::new(
                writer,
                Rc::clone(&page.headline),
                now,
            )));
        }

        let mut stat_watch = Observer::new(RevealOptions::HALF);
        if let Some(idx) = page.find_line(&Line::Stats) {
            for i in 0..page.stats.len() {
                stat_watch.observe(i, page.line_span(idx));
            }
        }
        let mut skill_watch = Observer::new(RevealOptions::HALF);
        for i in 0..page.skills.len() {
            if let Some(idx) = page.find_line(&Line::Skill(i)) {
                skill_watch.observe(i, page.line_span(idx));
            }
        }
        let mut section_watch = Observer::new(RevealOptions::ON_SCROLL);
        for i in 0..page.sections().len() {
            section_watch.observe(i, page.section_span(i));
        }

        tracing::debug!(
            layers = layers.len(),
            sections = page.sections().len(),
            watching = stat_watch.watching() + skill_watch.watching() + section_watch.watching(),
            "page built"
        );

        Ok(Self {
            settings,
            term,
            stage,
            page,
            shell: Shell::new(profile),
            scheduler,
            layers,
            shapes,
            stat_watch,
            skill_watch,
            section_watch,
            hovered: None,
            started: now,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let frame_dt = Duration::from_millis(self.settings.frame_ms);

        while !self.should_quit {
            if self.term.resize_if_needed()? {
                self.on_resize();
            }

            for ev in collect_input_nonblocking(frame_dt)? {
                self.handle_event(ev);
                if self.should_quit {
                    break;
                }
            }

            let now = Instant::now();
            self.page.step(now);
            self.poll_reveals(now);
            self.scheduler.run_frame(now);
            self.layers.retain_mut(|l| l.field.step(now) == Flow::Continue);
            if let Some(shapes) = &mut self.shapes {
                let secs = now.saturating_duration_since(self.started).as_secs_f32();
                shapes.draw(self.stage.viewport(), secs);
            }

            self.render_frame()?;

            // frame cap
            spin_sleep(frame_dt, now);
        }

        for l in &self.layers {
            l.field.lifecycle().cancel();
        }
        tracing::info!(pending_tasks = self.scheduler.len(), "shutting down");
        self.term.end()?;
        Ok(())
    }

    fn on_resize(&mut self) {
        let vp = Viewport::new(self.term.cols, self.term.rows);
        self.stage.set_viewport(vp);
        self.page.set_view_height(content_height(vp.rows));
        tracing::debug!(cols = vp.cols, rows = vp.rows, "resized");
    }

    fn handle_event(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Key { key, mods } => self.handle_key(key, mods),
            InputEvent::PointerMoved { col, row } => {
                self.stage.move_pointer(Pointer::from_cell(col, row));
            }
            InputEvent::Click { col, row } => {
                self.stage.move_pointer(Pointer::from_cell(col, row));
                self.handle_click(col, row);
            }
            InputEvent::Wheel(n) => {
                if !self.shell.is_open() {
                    self.page.scroll_by(n as f32 * WHEEL_ROWS * CELL_H_PX);
                }
            }
            InputEvent::Resize => {
                // picked up by resize_if_needed next frame
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, mods: KeyModifiers) {
        if self.shell.handle_key(key, mods) {
            return;
        }
        let Some(action) = map_key_to_action(key, mods) else {
            return;
        };
        let now = Instant::now();
        match action {
            PageAction::Quit => self.should_quit = true,
            PageAction::Scroll(rows) => self.page.scroll_by(rows * CELL_H_PX),
            PageAction::Pages(n) => self.page.scroll_by(n * self.page.view_height()),
            PageAction::Top => self.page.glide_to(0.0, now),
            PageAction::Bottom => self.page.glide_to(self.page.height(), now),
            PageAction::GoTo(i) => self.page.glide_to_section(i, now),
            PageAction::ToggleNav => {
                if view::is_narrow(self.term.cols) {
                    self.page.toggle_nav();
                }
            }
        }
    }

    fn handle_click(&mut self, col: u16, row: u16) {
        let hit = view::hit_test(
            &self.page,
            self.shell.is_open(),
            self.term.cols,
            self.term.rows,
            col,
            row,
        );
        let now = Instant::now();
        match hit {
            Some(Hit::Nav(i)) => {
                self.page.glide_to_section(i, now);
                if self.page.nav_open() {
                    self.page.toggle_nav();
                }
            }
            Some(Hit::NavToggle) => self.page.toggle_nav(),
            Some(Hit::BackToTop) => self.page.glide_to(0.0, now),
            Some(Hit::CloseShell) => self.shell.close(),
            None => {}
        }
    }

    fn poll_reveals(&mut self, now: Instant) {
        let (scroll, view_h) = (self.page.scroll(), self.page.view_height());

        for i in self.section_watch.poll(scroll, view_h) {
            tracing::debug!(section = self.page.sections()[i].id, "revealed");
            self.page.reveal(i);
        }
        for i in self.stat_watch.poll(scroll, view_h) {
            let s = &self.page.stats[i];
            let counter = Counter::new(s.target, COUNTER_DURATION);
            self.scheduler
                .spawn(Box::new(CounterTask::new(counter, Rc::clone(&s.shown), now)));
        }
        for i in self.skill_watch.poll(scroll, view_h) {
            let s = &self.page.skills[i];
            let counter = Counter::new(s.width, SKILL_BAR_DURATION);
            self.scheduler
                .spawn(Box::new(CounterTask::new(counter, Rc::clone(&s.shown), now)));
        }
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let bg = Color::Black;
        let theme = Theme {
            color: self.settings.color,
        };
        self.term.cur.clear(bg);
        self.term.canvas.clear(Pixel::default());

        if let Some(shapes) = &self.shapes {
            self.term.canvas.composite(shapes.canvas(), 1.0);
        }
        for l in &self.layers {
            self.term.canvas.composite(l.field.canvas(), l.opacity);
        }
        canvas_to_cells(&self.term.canvas, &mut self.term.cur, self.settings.color, bg);

        self.hovered = if self.shell.is_open() {
            None
        } else {
            self.stage
                .pointer()
                .and_then(|p| view::skill_at_row(&self.page, p.cell().1))
        };
        view::draw_page(&mut self.term.cur, &self.page, self.hovered, theme);
        if self.shell.is_open() {
            view::draw_shell(&mut self.term.cur, &self.shell, theme);
        }

        self.term.present(true)?;
        Ok(())
    }
}

/// Page pixels visible below the header row.
fn content_height(rows: u16) -> f32 {
    rows.saturating_sub(1) as f32 * CELL_H_PX
}

pub(crate) fn run() -> anyhow::Result<()> {
    let mut app = App::init()?;
    app.run()?;
    Ok(())
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
