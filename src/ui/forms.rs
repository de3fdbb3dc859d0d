use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use super::menu::Action;

/// Popup form collecting the numeric inputs for one menu action.
#[derive(Clone)]
pub(crate) struct InputForm {
    pub(crate) action: Action,
    pub(crate) values: Vec<String>,
    pub(crate) active: usize,
    pub(crate) error: Option<String>,
}

impl InputForm {
    pub(crate) fn new(action: Action) -> Self {
        Self {
            action,
            values: vec![String::new(); action.fields().len()],
            active: 0,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        if !self.values.is_empty() {
            self.active = (self.active + 1) % self.values.len();
        }
    }

    pub(crate) fn previous_field(&mut self) {
        if !self.values.is_empty() {
            self.active = (self.active + self.values.len() - 1) % self.values.len();
        }
    }

    /// Append a digit to the active field. Anything else is refused since
    /// every input is an id, ISBN, or date part.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if !ch.is_ascii_digit() {
            return false;
        }
        match self.values.get_mut(self.active) {
            Some(value) => {
                value.push(ch);
                self.error = None;
                true
            }
            None => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(value) = self.values.get_mut(self.active) {
            value.pop();
        }
    }

    /// Render one labelled line per field, highlighting the active one.
    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        self.action
            .fields()
            .iter()
            .zip(&self.values)
            .enumerate()
            .map(|(index, (name, value))| {
                let is_active = index == self.active;
                let display = if value.is_empty() {
                    "<required>".to_string()
                } else {
                    value.clone()
                };
                let style = if is_active {
                    Style::default().fg(Color::Yellow)
                } else if value.is_empty() {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::raw(format!("{name}: ")),
                    Span::styled(display, style),
                ])
            })
            .collect()
    }

    /// Column of the cursor within the active line.
    pub(crate) fn cursor_offset(&self) -> (u16, u16) {
        let name = self.action.fields().get(self.active).copied().unwrap_or("");
        let value_len = self.values.get(self.active).map_or(0, String::len);
        ((name.len() + 2 + value_len) as u16, self.active as u16)
    }
}

/// Scrollable popup that shows an operation's text.
pub(crate) struct ResultDialog {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) scroll: u16,
}

impl ResultDialog {
    pub(crate) fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            scroll: 0,
        }
    }

    pub(crate) fn scroll_by(&mut self, offset: i32) {
        let max = self.text.lines().count().saturating_sub(1) as i32;
        self.scroll = (self.scroll as i32 + offset).clamp(0, max.max(0)) as u16;
    }

    /// Whether the text reports a failure, used to colour the footer.
    pub(crate) fn is_error(&self) -> bool {
        self.text.starts_with("Error ")
    }
}
