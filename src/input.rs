use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum InputEvent {
    Key { key: KeyCode, mods: KeyModifiers },
    PointerMoved { col: u16, row: u16 },
    Click { col: u16, row: u16 },
    /// Wheel notches; positive scrolls down the page.
    Wheel(i32),
    Resize,
}

pub(crate) fn collect_input_nonblocking(
    max_frame_time: Duration,
) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        let ev = match event::read()? {
            Event::Key(k) if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat => {
                Some(InputEvent::Key {
                    key: k.code,
                    mods: k.modifiers,
                })
            }
            Event::Mouse(m) => match m.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(InputEvent::PointerMoved {
                    col: m.column,
                    row: m.row,
                }),
                MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::Click {
                    col: m.column,
                    row: m.row,
                }),
                MouseEventKind::ScrollDown => Some(InputEvent::Wheel(1)),
                MouseEventKind::ScrollUp => Some(InputEvent::Wheel(-1)),
                _ => None,
            },
            Event::Resize(_, _) => Some(InputEvent::Resize),
            _ => None,
        };
        if let Some(ev) = ev {
            out.push(ev);
            if out.len() >= 64 {
                break;
            }
        }
    }
    Ok(out)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum PageAction {
    Quit,
    /// Scroll by this many rows.
    Scroll(f32),
    /// Scroll by this many screens.
    Pages(f32),
    Top,
    Bottom,
    GoTo(usize),
    ToggleNav,
}

/// Keys for the page itself; only reached when the shell passed on the key.
pub(crate) fn map_key_to_action(key: KeyCode, mods: KeyModifiers) -> Option<PageAction> {
    if matches!(key, KeyCode::Char('c') | KeyCode::Char('C'))
        && mods.contains(KeyModifiers::CONTROL)
    {
        return Some(PageAction::Quit);
    }
    if mods.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(PageAction::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(PageAction::Scroll(-1.0)),
        KeyCode::Down | KeyCode::Char('j') => Some(PageAction::Scroll(1.0)),
        KeyCode::PageUp => Some(PageAction::Pages(-1.0)),
        KeyCode::PageDown | KeyCode::Char(' ') => Some(PageAction::Pages(1.0)),
        KeyCode::Home | KeyCode::Char('t') => Some(PageAction::Top),
        KeyCode::End => Some(PageAction::Bottom),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(PageAction::ToggleNav),
        KeyCode::Char(c @ '1'..='9') => Some(PageAction::GoTo(c as usize - '1' as usize)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_jump_to_sections() {
        assert_eq!(
            map_key_to_action(KeyCode::Char('1'), KeyModifiers::NONE),
            Some(PageAction::GoTo(0))
        );
        assert_eq!(
            map_key_to_action(KeyCode::Char('5'), KeyModifiers::NONE),
            Some(PageAction::GoTo(4))
        );
    }

    #[test]
    fn control_chords_only_quit() {
        assert_eq!(
            map_key_to_action(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(PageAction::Quit)
        );
        assert_eq!(map_key_to_action(KeyCode::Char('m'), KeyModifiers::CONTROL), None);
        assert_eq!(
            map_key_to_action(KeyCode::Char('m'), KeyModifiers::NONE),
            Some(PageAction::ToggleNav)
        );
    }

    #[test]
    fn arrows_scroll_by_rows() {
        assert_eq!(
            map_key_to_action(KeyCode::Down, KeyModifiers::NONE),
            Some(PageAction::Scroll(1.0))
        );
        assert_eq!(
            map_key_to_action(KeyCode::PageUp, KeyModifiers::NONE),
            Some(PageAction::Pages(-1.0))
        );
        assert_eq!(map_key_to_action(KeyCode::Char('b'), KeyModifiers::NONE), None);
    }
}
