//! Ratatui front-end. A menu of library operations; each result opens in a
//! popup dialog, and borrow/return pause on a lock notice before writing.

mod app;
mod forms;
mod helpers;
mod menu;
mod terminal;

pub use app::App;
pub use terminal::run_app;
