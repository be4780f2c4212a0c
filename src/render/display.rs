//! Kiosk display surface

use std::io::Write;

use super::view::{CardTone, ResultView};
use crate::core::styles::StyleRole;

/// Output surface of the kiosk: a status line with a loading indicator and
/// a result card that can be shown and hidden.
///
/// Implementations must not fail the caller; an output that cannot be
/// written is skipped.
pub trait KioskDisplay: Send {
    fn set_status(&mut self, loading: bool, text: &str);

    fn show_result(&mut self, view: &ResultView);

    fn hide_result(&mut self);
}

const BRAILLE_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Line oriented display for a terminal or a log pipe
pub struct TerminalDisplay<W: Write + Send> {
    out: W,
    color: bool,
    frame_index: usize,
    result_visible: bool,
}

impl TerminalDisplay<std::io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(std::io::stdout(), color)
    }
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            frame_index: 0,
            result_visible: false,
        }
    }

    fn next_frame(&mut self) -> char {
        let frame = BRAILLE_FRAMES[self.frame_index];
        self.frame_index = (self.frame_index + 1) % BRAILLE_FRAMES.len();
        frame
    }

    fn write_lines(&mut self, lines: &[String]) {
        for line in lines {
            if writeln!(self.out, "{line}").is_err() {
                return;
            }
        }
        let _ = self.out.flush();
    }
}

impl<W: Write + Send> KioskDisplay for TerminalDisplay<W> {
    fn set_status(&mut self, loading: bool, text: &str) {
        let line = if loading {
            let frame = self.next_frame();
            format!("{} {}", StyleRole::Loading.paint(&frame.to_string(), self.color), text)
        } else {
            format!("{} {}", StyleRole::Dim.paint("•", self.color), text)
        };
        self.write_lines(&[line]);
    }

    fn show_result(&mut self, view: &ResultView) {
        let (mark, role) = match view.tone {
            CardTone::Success => ("✔", StyleRole::Success),
            CardTone::Error => ("✘", StyleRole::Danger),
        };
        let badge = StyleRole::for_status_class(&view.badge_class)
            .paint(&format!("[{}]", view.badge_text), self.color);

        let lines = [
            format!(
                "{} {} {}",
                role.paint(mark, self.color),
                StyleRole::Header.paint(&view.name, self.color),
                badge
            ),
            format!("    {}", view.message),
            format!("    {}", StyleRole::Dim.paint(&view.time, self.color)),
        ];
        self.write_lines(&lines);
        self.result_visible = true;
    }

    fn hide_result(&mut self) {
        if !self.result_visible {
            return;
        }
        self.result_visible = false;
        self.write_lines(&[String::new()]);
    }
}
