use crate::page::{Line, Page};
use crate::render::{bar, draw_box, draw_styled, draw_text, fill_row, CellBuffer, Rect, Rgb};
use crate::shell::Shell;
use crossterm::style::Color;

pub(crate) const NARROW_COLS: u16 = 72;
const INDENT: u16 = 4;
const HEADER_BG: Rgb = Rgb::new(15, 23, 42);
const BAR_CELLS: usize = 24;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Theme {
    pub(crate) color: bool,
}

impl Theme {
    fn pick(self, c: Rgb, fallback: Color) -> Color {
        if self.color {
            c.color()
        } else {
            fallback
        }
    }
    fn accent(self) -> Color {
        self.pick(Rgb::new(0, 212, 255), Color::White)
    }
    fn violet(self) -> Color {
        self.pick(Rgb::new(167, 139, 250), Color::White)
    }
    fn text(self) -> Color {
        self.pick(Rgb::new(226, 232, 240), Color::White)
    }
    fn dim(self) -> Color {
        self.pick(Rgb::new(100, 116, 139), Color::Grey)
    }
    fn panel(self) -> Color {
        self.pick(HEADER_BG, Color::Black)
    }
}

/// Clickable things on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Hit {
    Nav(usize),
    NavToggle,
    BackToTop,
    CloseShell,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Slot {
    pub(crate) hit: Hit,
    pub(crate) label: String,
    pub(crate) rect: Rect,
}

fn slot(hit: Hit, label: String, x: u16, y: u16) -> Slot {
    let w = label.chars().count() as u16;
    Slot {
        hit,
        label,
        rect: Rect { x, y, w, h: 1 },
    }
}

pub(crate) fn is_narrow(cols: u16) -> bool {
    cols < NARROW_COLS
}

/// Nav links in the header, or the hamburger toggle plus its dropdown on
/// narrow screens.
pub(crate) fn header_slots(page: &Page, cols: u16) -> Vec<Slot> {
    let titles: Vec<&str> = page.sections().iter().map(|s| s.title).collect();

    if is_narrow(cols) {
        let toggle = if page.nav_open() { "[×]" } else { "[≡]" };
        let mut out = vec![slot(
            Hit::NavToggle,
            toggle.to_string(),
            cols.saturating_sub(4),
            0,
        )];
        if let Some(r) = dropdown_rect(page, cols) {
            for (i, t) in titles.iter().enumerate() {
                out.push(slot(Hit::Nav(i), format!(" {t} "), r.x + 1, r.y + 1 + i as u16));
            }
        }
        return out;
    }

    let total: u16 = titles.iter().map(|t| t.chars().count() as u16 + 3).sum();
    let mut x = cols.saturating_sub(total + 1);
    titles
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let s = slot(Hit::Nav(i), format!(" {t} "), x, 0);
            x += s.rect.w + 1;
            s
        })
        .collect()
}

/// Box under the toggle holding the nav links while the narrow menu is open.
fn dropdown_rect(page: &Page, cols: u16) -> Option<Rect> {
    if !is_narrow(cols) || !page.nav_open() {
        return None;
    }
    let widest = page
        .sections()
        .iter()
        .map(|s| s.title.chars().count())
        .max()
        .unwrap_or(0) as u16;
    let w = widest + 4;
    Some(Rect {
        x: cols.saturating_sub(w + 1),
        y: 1,
        w,
        h: page.sections().len() as u16 + 2,
    })
}

pub(crate) fn back_to_top_slot(cols: u16, rows: u16) -> Slot {
    let label = "[↑ top]".to_string();
    let w = label.chars().count() as u16;
    slot(
        Hit::BackToTop,
        label,
        cols.saturating_sub(w + 1),
        rows.saturating_sub(1),
    )
}

pub(crate) fn shell_rect(cols: u16, rows: u16) -> Rect {
    let w = cols.saturating_sub(4).min(76);
    let h = rows.saturating_sub(4).min(22);
    Rect {
        x: (cols - w) / 2,
        y: (rows - h) / 2,
        w,
        h,
    }
}

pub(crate) fn close_slot(cols: u16, rows: u16) -> Slot {
    let r = shell_rect(cols, rows);
    slot(
        Hit::CloseShell,
        "[x]".to_string(),
        (r.x + r.w).saturating_sub(5),
        r.y,
    )
}

pub(crate) fn hit_test(
    page: &Page,
    shell_open: bool,
    cols: u16,
    rows: u16,
    x: u16,
    y: u16,
) -> Option<Hit> {
    if shell_open {
        let close = close_slot(cols, rows);
        return close.rect.contains(x, y).then_some(close.hit);
    }
    let mut slots = header_slots(page, cols);
    if page.back_to_top_visible() {
        slots.push(back_to_top_slot(cols, rows));
    }
    slots.into_iter().find(|s| s.rect.contains(x, y)).map(|s| s.hit)
}

/// Skill bar under the given screen row, if it is showing.
pub(crate) fn skill_at_row(page: &Page, row: u16) -> Option<usize> {
    let content_row = row.checked_sub(1)?;
    let idx = page.line_at_row(content_row)?;
    let line = &page.lines()[idx];
    match line.line {
        Line::Skill(i) if page.is_revealed(line.section) => Some(i),
        _ => None,
    }
}

pub(crate) fn draw_page(buf: &mut CellBuffer, page: &Page, hovered: Option<usize>, theme: Theme) {
    let bg = Color::Black;
    let content_rows = buf.h.saturating_sub(1);

    for row in 0..content_rows {
        let Some(idx) = page.line_at_row(row) else {
            break;
        };
        let pl = &page.lines()[idx];
        if !page.is_revealed(pl.section) {
            continue;
        }
        let y = row + 1;

        match &pl.line {
            Line::Blank => {}
            Line::Name(name) => draw_styled(buf, INDENT, y, name, theme.text(), bg, true),
            Line::Headline => {
                let text = format!("> {}_", page.headline.borrow());
                draw_styled(buf, INDENT, y, &text, theme.accent(), bg, true);
            }
            Line::Stats => {
                let mut x = INDENT;
                for s in &page.stats {
                    let num = format!("{}{}", s.shown.get(), s.suffix);
                    draw_styled(buf, x, y, &num, theme.accent(), bg, true);
                    x += num.chars().count() as u16 + 1;
                    draw_text(buf, x, y, &s.label, theme.dim(), bg);
                    x += s.label.chars().count() as u16 + 4;
                }
            }
            Line::Heading(title) => {
                draw_styled(buf, INDENT - 2, y, &format!("## {title}"), theme.violet(), bg, true);
            }
            Line::Text(t) => draw_text(buf, INDENT, y, t, theme.text(), bg),
            Line::Skill(i) => {
                let Some(s) = page.skills.get(*i) else {
                    continue;
                };
                let hot = hovered == Some(*i);
                let pct = s.shown.get();
                let text = format!(
                    "{}{:<24} {} {:>3}%",
                    if hot { "▸ " } else { "  " },
                    s.name,
                    bar(pct as f32 / 100.0, BAR_CELLS),
                    pct
                );
                let fg = if hot { theme.accent() } else { theme.text() };
                draw_styled(buf, INDENT - 2, y, &text, fg, bg, hot);
            }
            Line::Bullet(t) => {
                draw_text(buf, INDENT, y, "•", theme.accent(), bg);
                draw_text(buf, INDENT + 2, y, t, theme.text(), bg);
            }
        }
    }

    draw_header(buf, page, theme);

    if page.back_to_top_visible() {
        let s = back_to_top_slot(buf.w, buf.h);
        draw_styled(buf, s.rect.x, s.rect.y, &s.label, theme.accent(), bg, true);
    }
}

fn draw_header(buf: &mut CellBuffer, page: &Page, theme: Theme) {
    let bg = if page.header_solid() {
        theme.panel()
    } else {
        Color::Black
    };
    if page.header_solid() {
        fill_row(buf, 0, bg);
    }

    let brand = page
        .lines()
        .iter()
        .find_map(|l| match &l.line {
            Line::Name(n) => Some(n.as_str()),
            _ => None,
        })
        .unwrap_or("portfolio");
    draw_styled(buf, 1, 0, brand, theme.accent(), bg, true);

    let active = page.active_section();
    let slots = header_slots(page, buf.w);

    if let Some(r) = dropdown_rect(page, buf.w) {
        draw_box(buf, r, theme.dim(), theme.panel());
    }

    for s in &slots {
        let (fg, bold) = match s.hit {
            Hit::Nav(i) if Some(i) == active => (theme.accent(), true),
            Hit::Nav(_) => (theme.text(), false),
            _ => (theme.accent(), true),
        };
        let cell_bg = if s.rect.y == 0 { bg } else { theme.panel() };
        draw_styled(buf, s.rect.x, s.rect.y, &s.label, fg, cell_bg, bold);
    }
}

pub(crate) fn draw_shell(buf: &mut CellBuffer, shell: &Shell, theme: Theme) {
    let r = shell_rect(buf.w, buf.h);
    if r.w < 12 || r.h < 5 {
        return;
    }
    let bg = theme.panel();
    draw_box(buf, r, theme.accent(), bg);
    draw_styled(buf, r.x + 2, r.y, " terminal ", theme.accent(), bg, true);
    let close = close_slot(buf.w, buf.h);
    draw_styled(buf, close.rect.x, close.rect.y, &close.label, theme.violet(), bg, true);

    let inner_w = (r.w - 4) as usize;
    let body_rows = (r.h - 3) as usize;
    let lines = shell.lines();
    let start = lines.len().saturating_sub(body_rows);

    // newest output sticks to the bottom, like a scrolled-down log
    for (i, line) in lines[start..].iter().enumerate() {
        let clipped: String = line.chars().take(inner_w).collect();
        let fg = if line.starts_with("$ ") {
            theme.accent()
        } else {
            theme.text()
        };
        draw_text(buf, r.x + 2, r.y + 1 + i as u16, &clipped, fg, bg);
    }

    let prompt_y = r.y + r.h - 2;
    let input: String = shell.input().chars().rev().take(inner_w.saturating_sub(3)).collect();
    let input: String = input.chars().rev().collect();
    draw_styled(buf, r.x + 2, prompt_y, "$", theme.violet(), bg, true);
    draw_text(buf, r.x + 4, prompt_y, &format!("{input}█"), theme.text(), bg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;
    use crate::stage::CELL_H_PX;

    fn page(rows: u16) -> Page {
        let mut p = Page::from_profile(&Profile::default());
        p.set_view_height(rows.saturating_sub(1) as f32 * CELL_H_PX);
        p
    }

    fn row_text(buf: &CellBuffer, y: u16) -> String {
        (0..buf.w).map(|x| buf.get(x, y).map_or(' ', |c| c.ch)).collect()
    }

    #[test]
    fn wide_header_lays_out_every_link() {
        let p = page(24);
        let slots = header_slots(&p, 100);
        assert_eq!(slots.len(), p.sections().len());
        assert!(slots.windows(2).all(|w| w[0].rect.x + w[0].rect.w < w[1].rect.x + 1));
        let last = slots.last().unwrap().rect;
        assert!(last.x + last.w <= 100);
    }

    #[test]
    fn narrow_header_collapses_behind_a_toggle() {
        let mut p = page(24);
        let slots = header_slots(&p, 50);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].hit, Hit::NavToggle);

        p.toggle_nav();
        let slots = header_slots(&p, 50);
        assert_eq!(slots.len(), 1 + p.sections().len());
        assert_eq!(slots[0].label, "[×]");
    }

    #[test]
    fn clicks_resolve_to_links_and_buttons() {
        let mut p = page(10);
        let link = header_slots(&p, 100)[2].rect;
        assert_eq!(hit_test(&p, false, 100, 10, link.x + 1, 0), Some(Hit::Nav(2)));
        assert_eq!(hit_test(&p, false, 100, 10, 0, 5), None);

        let top = back_to_top_slot(100, 10).rect;
        assert_eq!(hit_test(&p, false, 100, 10, top.x, top.y), None);
        p.scroll_by(1e6);
        assert!(p.back_to_top_visible());
        assert_eq!(hit_test(&p, false, 100, 10, top.x, top.y), Some(Hit::BackToTop));
    }

    #[test]
    fn open_shell_only_answers_to_its_close_button() {
        let p = page(24);
        let link = header_slots(&p, 100)[0].rect;
        assert_eq!(hit_test(&p, true, 100, 24, link.x + 1, 0), None);
        let close = close_slot(100, 24).rect;
        assert_eq!(
            hit_test(&p, true, 100, 24, close.x + 1, close.y),
            Some(Hit::CloseShell)
        );
    }

    #[test]
    fn hidden_sections_stay_blank_until_revealed() {
        let mut p = page(24);
        let mut buf = CellBuffer::new(100, 24);
        draw_page(&mut buf, &p, None, Theme { color: true });
        assert!(!row_text(&buf, 2).contains("Alex Morgan"));

        p.reveal(0);
        let mut buf = CellBuffer::new(100, 24);
        draw_page(&mut buf, &p, None, Theme { color: true });
        assert!(row_text(&buf, 2).contains("Alex Morgan"));
    }

    #[test]
    fn hovered_skill_is_emphasised() {
        let mut p = page(40);
        for i in 0..p.sections().len() {
            p.reveal(i);
        }
        let idx = p.find_line(&Line::Skill(1)).unwrap();
        let row = idx as u16 + 1;
        assert_eq!(skill_at_row(&p, row), Some(1));
        assert_eq!(skill_at_row(&p, 0), None);

        let mut buf = CellBuffer::new(100, 40);
        draw_page(&mut buf, &p, Some(1), Theme { color: false });
        assert!(row_text(&buf, row).contains("▸ LangChain"));
        assert!(buf.get(INDENT, row).unwrap().bold);
    }

    #[test]
    fn shell_overlay_shows_latest_output_and_prompt() {
        let mut sh = Shell::new(Profile::default());
        sh.open();
        for i in 0..50 {
            sh.dispatch(&format!("echo line{i}"));
        }
        let mut buf = CellBuffer::new(100, 30);
        draw_shell(&mut buf, &sh, Theme { color: true });

        let r = shell_rect(100, 30);
        let screen: Vec<String> = (r.y..r.y + r.h).map(|y| row_text(&buf, y)).collect();
        assert!(screen.iter().any(|l| l.contains("line49")));
        assert!(!screen.iter().any(|l| l.contains("line0 ")));
        assert!(row_text(&buf, r.y + r.h - 2).contains("$ █"));
        assert!(row_text(&buf, r.y).contains("[x]"));
    }
}
