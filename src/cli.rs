use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::config::Config;
use crate::db::Proceed;
use crate::library::Library;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Library desk: look up books, authors and customers, and lend or take back copies."
)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database to use instead of the configured one.
    #[arg(long = "db", value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, action = ArgAction::SetTrue)]
    pub debug: bool,

    /// Do not pause for confirmation while loan rows are locked.
    #[arg(long = "no-pause", action = ArgAction::SetTrue)]
    pub no_pause: bool,

    /// Run one operation and print its result. Starts the TUI when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show one book and its authors.
    Book { isbn: i64 },
    /// List every book with its authors.
    Catalogue,
    /// List books currently on loan and who has them.
    Loans,
    /// Show an author and the books they wrote.
    Author { author_id: i64 },
    /// List all authors.
    Authors,
    /// Show a customer and the books they hold.
    Customer { customer_id: i64 },
    /// List all customers.
    Customers,
    /// Lend a copy; MONTH is 1-12.
    Borrow {
        isbn: i64,
        customer_id: i64,
        day: u32,
        month: u32,
        year: i32,
    },
    /// Take back a copy.
    Return { isbn: i64, customer_id: i64 },
    /// Remove a customer with no outstanding loans.
    DeleteCustomer { customer_id: i64 },
    /// Remove an author and their book credits.
    DeleteAuthor { author_id: i64 },
    /// Remove a book with no outstanding loans.
    DeleteBook { isbn: i64 },
    /// Load sample data into an empty database.
    Seed,
}

impl Cli {
    /// Fold `--db` and `--no-pause` into settings loaded from the config file.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(path) = &self.database {
            config.database_path = path.clone();
        }
        if self.no_pause {
            config.pause_on_lock = false;
        }
    }
}

impl Command {
    /// Run against `library` and return the text to print. Loans never pause
    /// here; there is nobody to confirm.
    pub fn run(&self, library: &mut Library) -> String {
        match *self {
            Command::Book { isbn } => library.book_lookup(isbn),
            Command::Catalogue => library.show_catalogue(),
            Command::Loans => library.show_loaned_books(),
            Command::Author { author_id } => library.show_author(author_id),
            Command::Authors => library.show_all_authors(),
            Command::Customer { customer_id } => library.show_customer(customer_id),
            Command::Customers => library.show_all_customers(),
            Command::Borrow {
                isbn,
                customer_id,
                day,
                month,
                year,
            } => library.borrow_book(isbn, customer_id, day, month, year, &mut Proceed),
            Command::Return { isbn, customer_id } => {
                library.return_book(isbn, customer_id, &mut Proceed)
            }
            Command::DeleteCustomer { customer_id } => library.delete_customer(customer_id),
            Command::DeleteAuthor { author_id } => library.delete_author(author_id),
            Command::DeleteBook { isbn } => library.delete_book(isbn),
            Command::Seed => match library.seed() {
                Ok(true) => "Sample library loaded.".to_string(),
                Ok(false) => "Database already has data; nothing loaded.".to_string(),
                Err(err) => format!("Error loading sample library: {err}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_file() {
        let mut config = Config::parse("pause_on_lock = true").unwrap();
        let cli = Cli::try_parse_from(["library-desk", "--no-pause", "--db", "desk.sqlite"]).unwrap();
        cli.apply_overrides(&mut config);
        assert!(!config.pause_on_lock);
        assert_eq!(config.database_path, PathBuf::from("desk.sqlite"));

        let mut config = Config::parse("pause_on_lock = true").unwrap();
        let before = config.clone();
        Cli::try_parse_from(["library-desk"])
            .unwrap()
            .apply_overrides(&mut config);
        assert_eq!(config, before);
    }

    #[test]
    fn parses_borrow_arguments_in_order() {
        let cli = Cli::try_parse_from([
            "library-desk",
            "--db",
            "/tmp/x.sqlite",
            "borrow",
            "1002",
            "3",
            "14",
            "6",
            "2031",
        ])
        .unwrap();
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/x.sqlite")));
        assert_eq!(
            cli.command,
            Some(Command::Borrow {
                isbn: 1002,
                customer_id: 3,
                day: 14,
                month: 6,
                year: 2031,
            })
        );
    }

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["library-desk", "--no-pause"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.no_pause);
    }

    #[test]
    fn seed_reports_whether_it_loaded() {
        let mut library = Library::in_memory().unwrap();
        assert_eq!(Command::Seed.run(&mut library), "Sample library loaded.");
        assert_eq!(
            Command::Seed.run(&mut library),
            "Database already has data; nothing loaded."
        );
        assert!(Command::Customers.run(&mut library).contains("1: Jackson, Kirk"));
    }
}
