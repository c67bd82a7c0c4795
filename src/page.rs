//! The scrollable portfolio page: layout, section bookkeeping, scroll state.

use crate::config::Profile;
use crate::reveal::Span;
use crate::shapes::ease_in_out;
use crate::stage::CELL_H_PX;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

pub(crate) const ACTIVE_OFFSET_PX: f32 = 200.0;
pub(crate) const HEADER_SOLID_PX: f32 = 100.0;
pub(crate) const BACK_TO_TOP_PX: f32 = 400.0;
pub(crate) const SMOOTH_SCROLL: Duration = Duration::from_millis(600);

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Line {
    Blank,
    Name(String),
    Headline,
    Stats,
    Heading(String),
    Text(String),
    Skill(usize),
    Bullet(String),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PageLine {
    pub(crate) section: usize,
    pub(crate) line: Line,
}

#[derive(Clone, Debug)]
pub(crate) struct Section {
    pub(crate) id: &'static str,
    pub(crate) title: &'static str,
    pub(crate) first_line: usize,
    pub(crate) len: usize,
    pub(crate) revealed: bool,
}

/// A stat counter; `shown` is what the page prints.
#[derive(Clone, Debug)]
pub(crate) struct StatSlot {
    pub(crate) label: String,
    pub(crate) suffix: String,
    pub(crate) target: u32,
    pub(crate) shown: Rc<Cell<u32>>,
}

#[derive(Clone, Debug)]
pub(crate) struct SkillSlot {
    pub(crate) name: String,
    pub(crate) width: u32,
    pub(crate) shown: Rc<Cell<u32>>,
}

#[derive(Clone, Copy, Debug)]
struct Glide {
    from: f32,
    to: f32,
    start: Instant,
}

pub(crate) struct Page {
    lines: Vec<PageLine>,
    sections: Vec<Section>,
    pub(crate) stats: Vec<StatSlot>,
    pub(crate) skills: Vec<SkillSlot>,
    pub(crate) headline: Rc<RefCell<String>>,
    scroll: f32,
    view_height: f32,
    glide: Option<Glide>,
    nav_open: bool,
}

struct Builder {
    lines: Vec<PageLine>,
    sections: Vec<Section>,
}

impl Builder {
    fn section(&mut self, id: &'static str, title: &'static str, body: Vec<Line>) {
        let idx = self.sections.len();
        let first_line = self.lines.len();
        let mut lines = Vec::with_capacity(body.len() + 3);
        if idx > 0 {
            lines.push(Line::Blank);
            lines.push(Line::Heading(title.to_string()));
        }
        lines.extend(body);
        lines.push(Line::Blank);

        let len = lines.len();
        self.lines
            .extend(lines.into_iter().map(|line| PageLine { section: idx, line }));
        self.sections.push(Section {
            id,
            title,
            first_line,
            len,
            revealed: false,
        });
    }
}

impl Page {
    pub(crate) fn from_profile(p: &Profile) -> Self {
        let mut b = Builder {
            lines: Vec::new(),
            sections: Vec::new(),
        };

        let mut hero = vec![
            Line::Blank,
            Line::Name(p.name.clone()),
            Line::Text(p.title.clone()),
        ];
        if !p.roles.is_empty() {
            hero.push(Line::Headline);
        }
        if !p.stats.is_empty() {
            hero.push(Line::Blank);
            hero.push(Line::Stats);
        }
        b.section("hero", "Home", hero);

        b.section("about", "About", p.about.iter().cloned().map(Line::Text).collect());

        let mut skills: Vec<Line> = (0..p.skills.len()).map(Line::Skill).collect();
        if !p.stack.is_empty() {
            skills.push(Line::Blank);
            skills.extend(p.stack.iter().cloned().map(Line::Text));
        }
        b.section("skills", "Skills", skills);

        b.section(
            "projects",
            "Projects",
            p.projects.iter().cloned().map(Line::Bullet).collect(),
        );
        b.section("contact", "Contact", p.contact.iter().cloned().map(Line::Text).collect());

        Self {
            lines: b.lines,
            sections: b.sections,
            stats: p
                .stats
                .iter()
                .map(|s| StatSlot {
                    label: s.label.clone(),
                    suffix: s.suffix.clone(),
                    target: s.target,
                    shown: Rc::new(Cell::new(0)),
                })
                .collect(),
            skills: p
                .skills
                .iter()
                .map(|s| SkillSlot {
                    name: s.name.clone(),
                    width: s.width.min(100),
                    shown: Rc::new(Cell::new(0)),
                })
                .collect(),
            headline: Rc::new(RefCell::new(String::new())),
            scroll: 0.0,
            view_height: 0.0,
            glide: None,
            nav_open: false,
        }
    }

    pub(crate) fn lines(&self) -> &[PageLine] {
        &self.lines
    }

    pub(crate) fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub(crate) fn scroll(&self) -> f32 {
        self.scroll
    }

    pub(crate) fn view_height(&self) -> f32 {
        self.view_height
    }

    pub(crate) fn height(&self) -> f32 {
        self.lines.len() as f32 * CELL_H_PX
    }

    pub(crate) fn line_span(&self, idx: usize) -> Span {
        Span {
            top: idx as f32 * CELL_H_PX,
            height: CELL_H_PX,
        }
    }

    pub(crate) fn section_span(&self, idx: usize) -> Span {
        let s = &self.sections[idx];
        Span {
            top: s.first_line as f32 * CELL_H_PX,
            height: s.len as f32 * CELL_H_PX,
        }
    }

    /// Index of the first line of the given kind.
    pub(crate) fn find_line(&self, want: &Line) -> Option<usize> {
        self.lines.iter().position(|l| &l.line == want)
    }

    pub(crate) fn max_scroll(&self) -> f32 {
        (self.height() - self.view_height).max(0.0)
    }

    pub(crate) fn set_view_height(&mut self, h: f32) {
        self.view_height = h.max(0.0);
        self.scroll = self.scroll.clamp(0.0, self.max_scroll());
    }

    /// Last section whose top has come within 200 px of the scroll position.
    /// Scrolled to the very bottom, the last section wins even if it is short.
    pub(crate) fn active_section(&self) -> Option<usize> {
        let max = self.max_scroll();
        if max > 0.0 && self.scroll >= max {
            return self.sections.len().checked_sub(1);
        }
        let mut current = None;
        for i in 0..self.sections.len() {
            if self.scroll >= self.section_span(i).top - ACTIVE_OFFSET_PX {
                current = Some(i);
            }
        }
        current
    }

    pub(crate) fn header_solid(&self) -> bool {
        self.scroll > HEADER_SOLID_PX
    }

    /// Past 400 px, or half way down on pages too short to scroll that far.
    pub(crate) fn back_to_top_visible(&self) -> bool {
        self.scroll > BACK_TO_TOP_PX.min(self.max_scroll() / 2.0)
    }

    /// Immediate scroll, cancelling any glide in progress.
    pub(crate) fn scroll_by(&mut self, dy: f32) {
        self.glide = None;
        self.scroll = (self.scroll + dy).clamp(0.0, self.max_scroll());
    }

    pub(crate) fn glide_to(&mut self, y: f32, now: Instant) {
        let to = y.clamp(0.0, self.max_scroll());
        self.glide = Some(Glide {
            from: self.scroll,
            to,
            start: now,
        });
    }

    pub(crate) fn glide_to_section(&mut self, idx: usize, now: Instant) {
        if idx < self.sections.len() {
            let top = self.section_span(idx).top;
            self.glide_to(top, now);
        }
    }

    #[cfg(test)]
    pub(crate) fn is_gliding(&self) -> bool {
        self.glide.is_some()
    }

    /// Advance a smooth scroll, if one is running.
    pub(crate) fn step(&mut self, now: Instant) {
        let Some(g) = self.glide else {
            return;
        };
        let t = now.saturating_duration_since(g.start).as_secs_f32() / SMOOTH_SCROLL.as_secs_f32();
        if t >= 1.0 {
            self.scroll = g.to;
            self.glide = None;
        } else {
            self.scroll = g.from + (g.to - g.from) * ease_in_out(t);
        }
    }

    pub(crate) fn nav_open(&self) -> bool {
        self.nav_open
    }

    pub(crate) fn toggle_nav(&mut self) {
        self.nav_open = !self.nav_open;
    }

    pub(crate) fn reveal(&mut self, section: usize) {
        if let Some(s) = self.sections.get_mut(section) {
            s.revealed = true;
        }
    }

    pub(crate) fn is_revealed(&self, section: usize) -> bool {
        self.sections.get(section).map_or(false, |s| s.revealed)
    }

    /// Page line drawn at content row `row` (row 0 is just below the header).
    pub(crate) fn line_at_row(&self, row: u16) -> Option<usize> {
        let idx = ((self.scroll + row as f32 * CELL_H_PX) / CELL_H_PX).floor() as usize;
        (idx < self.lines.len()).then_some(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Page {
        let mut p = Page::from_profile(&Profile::default());
        p.set_view_height(10.0 * CELL_H_PX);
        p
    }

    #[test]
    fn layout_has_every_section_in_order() {
        let p = page();
        let ids: Vec<_> = p.sections().iter().map(|s| s.id).collect();
        assert_eq!(ids, ["hero", "about", "skills", "projects", "contact"]);

        let mut next = 0;
        for (i, s) in p.sections().iter().enumerate() {
            assert_eq!(s.first_line, next);
            assert!(p.lines()[s.first_line..s.first_line + s.len]
                .iter()
                .all(|l| l.section == i));
            next += s.len;
        }
        assert_eq!(next, p.lines().len());
        assert!(p.find_line(&Line::Stats).is_some());
        assert!(p.find_line(&Line::Skill(4)).is_some());
    }

    #[test]
    fn empty_profile_parts_drop_their_widgets() {
        let prof = Profile {
            stats: Vec::new(),
            roles: Vec::new(),
            ..Profile::default()
        };
        let p = Page::from_profile(&prof);
        assert!(p.find_line(&Line::Stats).is_none());
        assert!(p.find_line(&Line::Headline).is_none());
        assert!(p.stats.is_empty());
    }

    #[test]
    fn active_section_follows_the_scroll_position() {
        let mut p = page();
        let projects = p.section_span(3).top;
        p.scroll_by(projects - ACTIVE_OFFSET_PX - 1.0);
        assert_eq!(p.active_section(), Some(2));
        p.scroll_by(1.0);
        assert_eq!(p.active_section(), Some(3));
    }

    #[test]
    fn bottom_of_the_page_activates_the_last_section() {
        let mut p = page();
        p.set_view_height(30.0 * CELL_H_PX);
        p.scroll_by(p.height());
        let last = p.sections().len() - 1;
        assert!(p.scroll() < p.section_span(last).top - ACTIVE_OFFSET_PX);
        assert_eq!(p.active_section(), Some(last));
    }

    #[test]
    fn header_and_back_to_top_switch_on_thresholds() {
        let mut p = page();
        assert!(!p.header_solid());
        p.scroll_by(HEADER_SOLID_PX + 1.0);
        assert!(p.header_solid());
        assert!(!p.back_to_top_visible());
        p.scroll_by(BACK_TO_TOP_PX);
        assert!(p.back_to_top_visible());
    }

    #[test]
    fn back_to_top_shows_on_a_24_row_terminal() {
        let mut p = Page::from_profile(&Profile::default());
        p.set_view_height(23.0 * CELL_H_PX);
        assert!(p.max_scroll() < BACK_TO_TOP_PX);
        assert!(!p.back_to_top_visible());
        p.scroll_by(p.max_scroll() / 2.0 + 1.0);
        assert!(p.back_to_top_visible());
        p.scroll_by(1e6);
        assert!(p.back_to_top_visible());
    }

    #[test]
    fn unscrollable_page_never_offers_back_to_top() {
        let mut p = Page::from_profile(&Profile::default());
        p.set_view_height(p.height() + 100.0);
        p.scroll_by(1e6);
        assert!(!p.back_to_top_visible());
    }

    #[test]
    fn scrolling_is_clamped_to_the_page() {
        let mut p = page();
        p.scroll_by(-50.0);
        assert_eq!(p.scroll(), 0.0);
        p.scroll_by(1e6);
        assert_eq!(p.scroll(), p.max_scroll());
    }

    #[test]
    fn glide_eases_to_its_target() {
        let mut p = page();
        let t0 = Instant::now();
        p.glide_to_section(2, t0);
        let target = p.section_span(2).top.min(p.max_scroll());

        p.step(t0 + SMOOTH_SCROLL / 2);
        let mid = p.scroll();
        assert!(mid > 0.0 && mid < target);

        p.step(t0 + SMOOTH_SCROLL);
        assert_eq!(p.scroll(), target);
        assert!(!p.is_gliding());
    }

    #[test]
    fn manual_scroll_cancels_a_glide() {
        let mut p = page();
        let t0 = Instant::now();
        p.glide_to(300.0, t0);
        p.scroll_by(16.0);
        assert!(!p.is_gliding());
        p.step(t0 + SMOOTH_SCROLL);
        assert_eq!(p.scroll(), 16.0);
    }

    #[test]
    fn rows_map_to_lines_through_the_scroll() {
        let mut p = page();
        assert_eq!(p.line_at_row(0), Some(0));
        p.scroll_by(3.0 * CELL_H_PX);
        assert_eq!(p.line_at_row(2), Some(5));
        assert_eq!(p.line_at_row(10_000), None);
    }

    #[test]
    fn skill_widths_are_capped() {
        let mut prof = Profile::default();
        prof.skills[0].width = 250;
        let p = Page::from_profile(&prof);
        assert_eq!(p.skills[0].width, 100);
    }
}
