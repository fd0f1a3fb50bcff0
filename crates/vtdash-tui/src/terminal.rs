//! Terminal host pieces: key mapping, frame composition and row-level
//! repainting.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use vtdash_core::TabId;

/// What a key press asks the host to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Quit,
    Activate(TabId),
    NextTab,
    PrevTab,
    Back,
    Forward,
    ToggleRefresh,
    Reload,
    NextKeyspace,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Resize { width: u16, height: u16 },
}

#[must_use]
pub fn map_event(event: &Event) -> Option<HostCommand> {
    match event {
        Event::Key(key) => map_key(key),
        Event::Resize(width, height) => Some(HostCommand::Resize {
            width: *width,
            height: *height,
        }),
        _ => None,
    }
}

fn map_key(key: &KeyEvent) -> Option<HostCommand> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(HostCommand::Quit);
    }
    let command = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => HostCommand::Quit,
        KeyCode::Char(digit @ '1'..='9') => {
            let index = digit.to_digit(10).map_or(0, |d| d as usize).saturating_sub(1);
            HostCommand::Activate(TabId::from_index(index)?)
        }
        KeyCode::Tab => HostCommand::NextTab,
        KeyCode::BackTab => HostCommand::PrevTab,
        KeyCode::Left | KeyCode::Char('[') => HostCommand::Back,
        KeyCode::Right | KeyCode::Char(']') => HostCommand::Forward,
        KeyCode::Char('r') => HostCommand::ToggleRefresh,
        KeyCode::Char('R') => HostCommand::Reload,
        KeyCode::Char('k') => HostCommand::NextKeyspace,
        KeyCode::Up => HostCommand::ScrollUp,
        KeyCode::Down => HostCommand::ScrollDown,
        KeyCode::PageUp => HostCommand::PageUp,
        KeyCode::PageDown | KeyCode::Char(' ') => HostCommand::PageDown,
        _ => return None,
    };
    Some(command)
}

/// One line naming every tab with its number key; the active one bracketed.
#[must_use]
pub fn tab_strip(active: Option<TabId>) -> String {
    TabId::ORDER
        .iter()
        .map(|tab| {
            let label = format!("{} {}", tab.index() + 1, tab.label());
            if Some(*tab) == active {
                format!("[{label}]")
            } else {
                format!(" {label} ")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub location: String,
    pub refresh_secs: Option<u64>,
    pub loading: bool,
}

impl StatusLine {
    #[must_use]
    pub fn render(&self) -> String {
        let refresh = match self.refresh_secs {
            Some(secs) => format!("refresh: every {secs}s"),
            None => "refresh: off".to_string(),
        };
        let loading = if self.loading { "  loading" } else { "" };
        format!(
            "{}  {refresh}{loading}  keys: 1-5 tabs  [ ] history  r refresh  R reload  k keyspace  q quit",
            self.location
        )
    }
}

/// Lay out a full screen: tab strip, rule, the visible window of `body`
/// starting at `scroll`, and the status line on the last row. Lines are
/// cut to `width` characters. The frame always has `height` rows (at least
/// four).
#[must_use]
pub fn compose_frame(
    active: Option<TabId>,
    body: &[String],
    scroll: usize,
    status: &StatusLine,
    width: u16,
    height: u16,
) -> Vec<String> {
    let width = usize::from(width.max(1));
    let rows = usize::from(height.max(4));
    let body_rows = rows - 3;

    let mut lines = Vec::with_capacity(rows);
    lines.push(clip(&tab_strip(active), width));
    lines.push("─".repeat(width));
    let start = scroll.min(body.len().saturating_sub(body_rows));
    for row in 0..body_rows {
        lines.push(body.get(start + row).map_or_else(String::new, |l| clip(l, width)));
    }
    lines.push(clip(&status.render(), width));
    lines
}

/// Largest useful scroll offset for `body_len` lines on a screen of
/// `height` rows.
#[must_use]
pub fn max_scroll(body_len: usize, height: u16) -> usize {
    let body_rows = usize::from(height.max(4)) - 3;
    body_len.saturating_sub(body_rows)
}

fn clip(line: &str, width: usize) -> String {
    if line.chars().count() <= width {
        return line.to_string();
    }
    line.chars().take(width).collect()
}

/// How to bring the screen from the last painted frame to the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepaintPlan {
    Unchanged,
    /// Clear the screen and paint every row: nothing painted yet, or the
    /// frame height changed.
    Full,
    /// Zero-based rows whose text changed.
    Rows(Vec<u16>),
}

/// Frames from `compose_frame` keep their height until the terminal is
/// resized, so a height change always means a full repaint. Within one
/// height only differing rows are rewritten, the status row included.
#[must_use]
pub fn plan_repaint(previous: Option<&[String]>, next: &[String]) -> RepaintPlan {
    let Some(previous) = previous else {
        return RepaintPlan::Full;
    };
    if previous.len() != next.len() {
        return RepaintPlan::Full;
    }
    let rows: Vec<u16> = (0u16..)
        .zip(previous.iter().zip(next))
        .filter(|(_, (old, new))| old != new)
        .map(|(row, _)| row)
        .collect();
    if rows.is_empty() {
        RepaintPlan::Unchanged
    } else {
        RepaintPlan::Rows(rows)
    }
}

/// Paints composed frames onto the terminal, remembering the last one.
#[derive(Debug, Default)]
pub struct ScreenPainter {
    painted: Option<Vec<String>>,
}

impl ScreenPainter {
    pub fn paint<W: Write>(&mut self, out: &mut W, frame: &[String]) -> io::Result<()> {
        match plan_repaint(self.painted.as_deref(), frame) {
            RepaintPlan::Unchanged => return Ok(()),
            RepaintPlan::Full => {
                queue!(out, Clear(ClearType::All))?;
                for (row, line) in (0u16..).zip(frame) {
                    paint_row(out, row, line)?;
                }
            }
            RepaintPlan::Rows(rows) => {
                for row in rows {
                    let line = frame.get(usize::from(row)).map_or("", String::as_str);
                    paint_row(out, row, line)?;
                }
            }
        }
        out.flush()?;
        self.painted = Some(frame.to_vec());
        Ok(())
    }

    /// Forget the painted frame; the next paint clears and redraws.
    pub fn invalidate(&mut self) {
        self.painted = None;
    }
}

fn paint_row<W: Write>(out: &mut W, row: u16, line: &str) -> io::Result<()> {
    queue!(out, MoveTo(0, row), Clear(ClearType::CurrentLine), Print(line))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    fn lines<const N: usize>(rows: [&str; N]) -> Vec<String> {
        rows.iter().map(|row| (*row).to_string()).collect()
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn digits_select_tabs_in_order() {
        assert_eq!(
            map_event(&press(KeyCode::Char('1'))),
            Some(HostCommand::Activate(TabId::Clusters))
        );
        assert_eq!(
            map_event(&press(KeyCode::Char('5'))),
            Some(HostCommand::Activate(TabId::VSchema))
        );
        assert_eq!(map_event(&press(KeyCode::Char('6'))), None);
    }

    #[test]
    fn ctrl_c_quits_and_other_chords_are_ignored() {
        let ctrl = |c| Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
        assert_eq!(map_event(&ctrl('c')), Some(HostCommand::Quit));
        assert_eq!(map_event(&ctrl('r')), None);
        assert_eq!(map_event(&press(KeyCode::Char('r'))), Some(HostCommand::ToggleRefresh));
        assert_eq!(map_event(&press(KeyCode::Char('['))), Some(HostCommand::Back));
    }

    #[test]
    fn tab_strip_brackets_active_tab() {
        let strip = tab_strip(Some(TabId::Tablets));
        assert!(strip.contains("[3 Tablets]"), "{strip}");
        assert!(strip.contains(" 1 Clusters "), "{strip}");
        assert_eq!(strip.matches('[').count(), 1);
    }

    #[test]
    fn frame_fills_screen_and_scrolls_body() {
        let status = StatusLine {
            location: "/?tab=tablets".into(),
            refresh_secs: Some(30),
            loading: false,
        };
        let body: Vec<String> = (0..10).map(|i| format!("row {i}")).collect();
        let frame = compose_frame(Some(TabId::Tablets), &body, 2, &status, 40, 8);
        assert_eq!(frame.len(), 8);
        assert_eq!(frame[2], "row 2");
        assert_eq!(frame[6], "row 6");
        assert!(frame[7].starts_with("/?tab=tablets  refresh: every 30s"));
        assert_eq!(frame[7].chars().count(), 40);

        let clamped = compose_frame(Some(TabId::Tablets), &body, 99, &status, 40, 8);
        assert_eq!(clamped[2], "row 5");
        assert_eq!(max_scroll(body.len(), 8), 5);
    }

    fn status(location: &str) -> StatusLine {
        StatusLine {
            location: location.into(),
            refresh_secs: None,
            loading: false,
        }
    }

    #[test]
    fn short_terminal_still_gets_one_body_row() {
        let body = lines(["only", "second"]);
        let frame = compose_frame(None, &body, 7, &status("/"), 20, 2);
        assert_eq!(frame.len(), 4);
        assert_eq!(frame[2], "second");
        assert!(frame[3].starts_with("/  refresh: off"));
    }

    #[test]
    fn first_frame_and_height_change_repaint_fully() {
        let frame = lines(["tabs", "rule", "body", "status"]);
        assert_eq!(plan_repaint(None, &frame), RepaintPlan::Full);
        assert_eq!(plan_repaint(Some(&frame), &frame), RepaintPlan::Unchanged);
        let taller = lines(["tabs", "rule", "body", "more", "status"]);
        assert_eq!(plan_repaint(Some(&frame), &taller), RepaintPlan::Full);
    }

    #[test]
    fn loading_flag_repaints_only_the_status_row() {
        let body = lines(["Loading tablets..."]);
        let idle = compose_frame(Some(TabId::Tablets), &body, 0, &status("/?tab=tablets"), 80, 6);
        let busy_status = StatusLine {
            loading: true,
            ..status("/?tab=tablets")
        };
        let busy = compose_frame(Some(TabId::Tablets), &body, 0, &busy_status, 80, 6);
        assert_eq!(plan_repaint(Some(&idle), &busy), RepaintPlan::Rows(vec![5]));
    }

    #[test]
    fn painter_writes_changed_rows_and_redraws_after_invalidate() {
        let mut painter = ScreenPainter::default();
        let first = lines(["tabs", "rule", "row-a", "status"]);

        let mut out = Vec::new();
        painter.paint(&mut out, &first).expect("first paint");
        let ansi = String::from_utf8(out).expect("valid utf8");
        assert!(ansi.contains("\x1b[2J"), "{ansi:?}");
        assert!(ansi.contains("row-a") && ansi.contains("status"));

        let mut out = Vec::new();
        painter.paint(&mut out, &first).expect("repeat paint");
        assert!(out.is_empty());

        let second = lines(["tabs", "rule", "row-b", "status"]);
        let mut out = Vec::new();
        painter.paint(&mut out, &second).expect("row paint");
        let ansi = String::from_utf8(out).expect("valid utf8");
        assert!(ansi.contains("\x1b[3;1H"), "{ansi:?}");
        assert!(ansi.contains("row-b"));
        assert!(!ansi.contains("tabs") && !ansi.contains("\x1b[2J"));

        painter.invalidate();
        let mut out = Vec::new();
        painter.paint(&mut out, &second).expect("full paint");
        assert!(String::from_utf8(out).expect("valid utf8").contains("tabs"));
    }
}
