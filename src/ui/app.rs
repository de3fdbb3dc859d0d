use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{debug, warn};

use crate::db::LockGate;
use crate::library::Library;

use super::forms::{InputForm, ResultDialog};
use super::helpers::{centered_rect, surface_error};
use super::menu::{Action, LoanRequest, Request};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// Fine-grained modes layered over the main menu.
enum Mode {
    Normal,
    Entering(InputForm),
    Showing(ResultDialog),
    ConfirmExit,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    library: Library,
    selected: usize,
    mode: Mode,
    status: Option<StatusMessage>,
    /// Borrow/return waiting to run once the key handler returns, so the
    /// terminal loop can drive the lock confirmation.
    pending_loan: Option<LoanRequest>,
    pause_on_lock: bool,
}

impl App {
    pub fn new(library: Library, pause_on_lock: bool) -> Self {
        Self {
            library,
            selected: 0,
            mode: Mode::Normal,
            status: Some(StatusMessage {
                text: "Database connection established.".to_string(),
                kind: StatusKind::Info,
            }),
            pending_loan: None,
            pause_on_lock,
        }
    }

    /// Give the library back, e.g. to close it after the UI exits.
    pub fn into_library(self) -> Library {
        self.library
    }

    /// Process a key press. Returns `true` once the user confirmed exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code),
            Mode::Entering(form) => self.handle_form_key(code, form),
            Mode::Showing(dialog) => self.handle_dialog_key(code, dialog),
            Mode::ConfirmExit => match code {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                    exit = true;
                    Mode::Normal
                }
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.clear_status();
                    Mode::Normal
                }
                _ => Mode::ConfirmExit,
            },
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Mode::ConfirmExit,
            KeyCode::Up => {
                self.move_selection(-1);
                Mode::Normal
            }
            KeyCode::Down => {
                self.move_selection(1);
                Mode::Normal
            }
            KeyCode::Home => {
                self.selected = 0;
                Mode::Normal
            }
            KeyCode::End => {
                self.selected = Action::ALL.len() - 1;
                Mode::Normal
            }
            KeyCode::Enter => {
                let action = self.current_action();
                if action.fields().is_empty() {
                    self.clear_status();
                    match action.request(&[]) {
                        Ok(request) => self.execute(action.label(), request),
                        Err(err) => {
                            self.set_status(err.to_string(), StatusKind::Error);
                            Mode::Normal
                        }
                    }
                } else {
                    self.clear_status();
                    Mode::Entering(InputForm::new(action))
                }
            }
            _ => Mode::Normal,
        }
    }

    fn handle_form_key(&mut self, code: KeyCode, mut form: InputForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status(
                    format!("{} cancelled.", form.action.label()),
                    StatusKind::Info,
                );
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                if !form.push_char(ch) {
                    form.error = Some("Only digits are allowed.".to_string());
                }
            }
            KeyCode::Enter => match form.action.request(&form.values) {
                Ok(request) => return self.execute(form.action.label(), request),
                Err(err) => form.error = Some(err.to_string()),
            },
            _ => {}
        }
        Mode::Entering(form)
    }

    fn handle_dialog_key(&mut self, code: KeyCode, mut dialog: ResultDialog) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => return Mode::Normal,
            KeyCode::Up => dialog.scroll_by(-1),
            KeyCode::Down => dialog.scroll_by(1),
            KeyCode::PageUp => dialog.scroll_by(-10),
            KeyCode::PageDown => dialog.scroll_by(10),
            KeyCode::Home => dialog.scroll = 0,
            _ => {}
        }
        Mode::Showing(dialog)
    }

    /// Run a parsed request. Loans are parked for [`App::complete_loan`].
    fn execute(&mut self, title: &str, request: Request) -> Mode {
        debug!(?request, "menu request");
        let text = match request {
            Request::BookLookup { isbn } => self.library.book_lookup(isbn),
            Request::Catalogue => self.library.show_catalogue(),
            Request::LoanedBooks => self.library.show_loaned_books(),
            Request::ShowAuthor { author_id } => self.library.show_author(author_id),
            Request::AllAuthors => self.library.show_all_authors(),
            Request::ShowCustomer { customer_id } => self.library.show_customer(customer_id),
            Request::AllCustomers => self.library.show_all_customers(),
            Request::DeleteCustomer { customer_id } => self.library.delete_customer(customer_id),
            Request::DeleteAuthor { author_id } => self.library.delete_author(author_id),
            Request::DeleteBook { isbn } => self.library.delete_book(isbn),
            Request::Loan(loan) => {
                self.set_status("Locking rows...", StatusKind::Info);
                self.pending_loan = Some(loan);
                return Mode::Normal;
            }
            Request::Exit => return Mode::ConfirmExit,
        };
        self.show(title, text)
    }

    pub(crate) fn take_pending_loan(&mut self) -> Option<LoanRequest> {
        self.pending_loan.take()
    }

    /// Finish a parked borrow or return. `confirm` is asked while the rows
    /// are locked unless pausing is switched off. Returns `false` when no
    /// loan was waiting.
    pub(crate) fn run_pending_loan<F>(&mut self, mut confirm: F) -> bool
    where
        F: FnMut(&str) -> Result<bool>,
    {
        let Some(loan) = self.take_pending_loan() else {
            return false;
        };

        let pause = self.pause_on_lock;
        let mut gate_failure = None;
        let mut gate = |notice: &str| {
            if !pause {
                return true;
            }
            match confirm(notice) {
                Ok(proceed) => proceed,
                Err(err) => {
                    warn!(error = %err, "lock confirmation failed");
                    gate_failure = Some(surface_error(&err));
                    false
                }
            }
        };
        self.complete_loan(loan, &mut gate);
        if let Some(message) = gate_failure {
            self.report_error(format!("Lock confirmation failed: {message}"));
        }
        true
    }

    /// Run a borrow or return, consulting `gate` while the rows are locked.
    pub(crate) fn complete_loan(&mut self, loan: LoanRequest, gate: &mut dyn LockGate) {
        let title = loan.title();
        let text = match loan {
            LoanRequest::Borrow {
                isbn,
                customer_id,
                day,
                month,
                year,
            } => self
                .library
                .borrow_book(isbn, customer_id, day, month, year, gate),
            LoanRequest::Return { isbn, customer_id } => {
                self.library.return_book(isbn, customer_id, gate)
            }
        };
        self.mode = self.show(title, text);
    }

    fn show(&mut self, title: &str, text: String) -> Mode {
        let dialog = ResultDialog::new(title, text);
        if dialog.is_error() {
            self.set_status(format!("{title} failed."), StatusKind::Error);
        } else {
            self.clear_status();
        }
        Mode::Showing(dialog)
    }

    pub(crate) fn report_error(&mut self, message: impl Into<String>) {
        self.set_status(message, StatusKind::Error);
    }

    fn current_action(&self) -> Action {
        Action::ALL[self.selected.min(Action::ALL.len() - 1)]
    }

    fn move_selection(&mut self, offset: isize) {
        let last = Action::ALL.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(FOOTER_HEIGHT)])
            .split(frame.area());

        self.draw_menu(frame, chunks[0]);
        self.draw_footer(frame, chunks[1]);

        match &self.mode {
            Mode::Normal => {}
            Mode::Entering(form) => draw_form(frame, chunks[0], form),
            Mode::Showing(dialog) => draw_dialog(frame, chunks[0], dialog),
            Mode::ConfirmExit => draw_confirm_exit(frame, chunks[0]),
        }
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = Action::ALL
            .iter()
            .map(|action| ListItem::new(action.label()))
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title("Library Desk")
                    .borders(Borders::ALL),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let hint = match self.mode {
            Mode::Normal => "↑/↓ choose • Enter run • q quit",
            Mode::Entering(_) => "Tab next field • Enter submit • Esc cancel",
            Mode::Showing(_) => "↑/↓/PgUp/PgDn scroll • Enter/Esc close",
            Mode::ConfirmExit => "Enter OK • Esc cancel",
        };

        let mut lines = vec![Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        ))];
        if let Some(status) = &self.status {
            lines.push(Line::from(Span::styled(
                status.text.clone(),
                status.kind.style(),
            )));
        }

        let footer = Paragraph::new(lines).block(Block::default().borders(Borders::TOP));
        frame.render_widget(footer, area);
    }
}

fn draw_form(frame: &mut Frame, area: Rect, form: &InputForm) {
    let popup_area = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(form.action.label())
        .borders(Borders::ALL);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines = form.lines();
    lines.push(Line::from(""));
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);

    let (x, y) = form.cursor_offset();
    frame.set_cursor_position(Position::new(
        inner.x.saturating_add(x).min(inner.right().saturating_sub(1)),
        inner.y.saturating_add(y),
    ));
}

fn draw_dialog(frame: &mut Frame, area: Rect, dialog: &ResultDialog) {
    let popup_area = centered_rect(80, 80, area);
    frame.render_widget(Clear, popup_area);

    let border_style = if dialog.is_error() {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(dialog.title.as_str())
        .borders(Borders::ALL)
        .border_style(border_style);

    // Tabs do not render in ratatui cells.
    let text = dialog.text.replace('\t', "    ");
    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((dialog.scroll, 0));
    frame.render_widget(paragraph, popup_area);
}

fn draw_confirm_exit(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title("Exit Application")
        .borders(Borders::ALL);
    let lines = vec![
        Line::from(""),
        Line::from("Click 'Ok' to exit."),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] OK    [Esc] Cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, popup_area);
}

/// Modal shown while a loan transaction holds its lock.
pub(crate) fn draw_lock_notice(frame: &mut Frame, notice: &str) {
    let popup_area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title("Rows Locked")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let mut lines: Vec<Line> = notice
        .lines()
        .map(|line| Line::from(line.trim().to_string()))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Enter] OK    [Esc] Abort",
        Style::default().fg(Color::DarkGray),
    )));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Proceed, LOCK_NOTICE};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn app() -> App {
        let library = Library::in_memory().unwrap();
        library.seed().unwrap();
        App::new(library, true)
    }

    fn select(app: &mut App, action: Action) {
        let index = Action::ALL.iter().position(|a| *a == action).unwrap();
        app.selected = index;
    }

    fn type_digits(app: &mut App, digits: &str) {
        for ch in digits.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn dialog_text(app: &App) -> &str {
        match &app.mode {
            Mode::Showing(dialog) => &dialog.text,
            _ => panic!("no dialog open"),
        }
    }

    #[test]
    fn listing_actions_open_a_dialog_directly() {
        let mut app = app();
        select(&mut app, Action::AllAuthors);
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(dialog_text(&app).starts_with("Show All Authors:\n"));

        app.handle_key(KeyCode::Esc).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn lookup_goes_through_the_form() {
        let mut app = app();
        select(&mut app, Action::BookLookup);
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(matches!(app.mode, Mode::Entering(_)));

        type_digits(&mut app, "1001");
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(dialog_text(&app).starts_with("ISBN: 1001\nBook Lookup:"));
    }

    #[test]
    fn incomplete_form_stays_open_with_an_error() {
        let mut app = app();
        select(&mut app, Action::ReturnBook);
        app.handle_key(KeyCode::Enter).unwrap();
        type_digits(&mut app, "1001");
        app.handle_key(KeyCode::Enter).unwrap();

        match &app.mode {
            Mode::Entering(form) => {
                assert_eq!(form.error.as_deref(), Some("Customer ID is required."))
            }
            _ => panic!("form should still be open"),
        }
        assert!(app.take_pending_loan().is_none());
    }

    #[test]
    fn loans_are_parked_then_completed() {
        let mut app = app();
        select(&mut app, Action::ReturnBook);
        app.handle_key(KeyCode::Enter).unwrap();
        type_digits(&mut app, "1001");
        app.handle_key(KeyCode::Tab).unwrap();
        type_digits(&mut app, "1");
        app.handle_key(KeyCode::Enter).unwrap();

        let loan = app.take_pending_loan().unwrap();
        assert_eq!(
            loan,
            LoanRequest::Return {
                isbn: 1001,
                customer_id: 1
            }
        );
        app.complete_loan(loan, &mut Proceed);
        assert!(dialog_text(&app).starts_with("Return Book:\n"));
    }

    fn park_borrow(app: &mut App) {
        select(app, Action::BorrowBook);
        app.handle_key(KeyCode::Enter).unwrap();
        for field in ["1002", "3", "14", "6", "2031"] {
            type_digits(app, field);
            app.handle_key(KeyCode::Tab).unwrap();
        }
        app.handle_key(KeyCode::Enter).unwrap();
    }

    #[test]
    fn loans_skip_confirmation_when_not_pausing() {
        let library = Library::in_memory().unwrap();
        library.seed().unwrap();
        let mut app = App::new(library, false);
        park_borrow(&mut app);

        let mut asked = 0;
        let ran = app.run_pending_loan(|_| {
            asked += 1;
            Ok(false)
        });
        assert!(ran);
        assert_eq!(asked, 0);
        assert!(dialog_text(&app).starts_with("Borrow Book:\n"));
        assert!(!app.run_pending_loan(|_| Ok(true)));
    }

    #[test]
    fn paused_loans_wait_for_confirmation() {
        let mut app = app();
        park_borrow(&mut app);

        let mut notices = Vec::new();
        app.run_pending_loan(|notice| {
            notices.push(notice.to_string());
            Ok(false)
        });
        assert_eq!(notices, vec![LOCK_NOTICE.to_string()]);
        assert_eq!(
            dialog_text(&app),
            "Error borrowing book: Cancelled before update."
        );
    }

    #[test]
    fn failed_confirmation_cancels_and_reports() {
        let mut app = app();
        park_borrow(&mut app);

        app.run_pending_loan(|_| Err(anyhow::anyhow!("terminal went away")));
        assert_eq!(
            dialog_text(&app),
            "Error borrowing book: Cancelled before update."
        );
        let status = app.status.as_ref().unwrap();
        assert!(status.text.starts_with("Lock confirmation failed: "));
    }

    #[test]
    fn exit_needs_confirmation() {
        let mut app = app();
        assert!(!app.handle_key(KeyCode::Char('q')).unwrap());
        assert!(matches!(app.mode, Mode::ConfirmExit));
        assert!(!app.handle_key(KeyCode::Esc).unwrap());
        assert!(matches!(app.mode, Mode::Normal));

        app.handle_key(KeyCode::Char('q')).unwrap();
        assert!(app.handle_key(KeyCode::Enter).unwrap());
    }

    #[test]
    fn renders_menu_and_status() {
        let app = app();
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let rendered: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(rendered.contains("Library Desk"));
        assert!(rendered.contains("Book Lookup"));
        assert!(rendered.contains("Database connection established."));
    }
}
