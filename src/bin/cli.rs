// Library Manager - Circulation tracking for small libraries
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use library_core::storage::models::{NewBook, NewMember};
use library_core::{IsbnLookupClient, Library, LibraryConfig, LibraryError, ReturnOutcome};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "library-cli")]
#[command(about = "Library Manager CLI - books, members and loans", long_about = None)]
struct Cli {
    /// SQLite database file (overrides LIBRARY_DATABASE_PATH)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    yes: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the book catalog
    #[command(subcommand)]
    Book(BookCommand),
    /// Manage members
    #[command(subcommand)]
    Member(MemberCommand),
    /// Issue a book to a member
    Issue {
        #[arg(short, long)]
        member: i64,
        #[arg(short, long)]
        book: i64,
    },
    /// Return an issued book
    Return {
        /// Transaction ID
        transaction: i64,
    },
    /// Inspect and delete transactions
    #[command(subcommand)]
    Txn(TxnCommand),
}

#[derive(Subcommand)]
enum BookCommand {
    /// Add a book by hand
    Add(BookArgs),
    /// Fetch metadata for an ISBN, optionally adding it to the catalog
    Lookup {
        isbn: String,
        /// Add the result to the catalog
        #[arg(long)]
        add: bool,
        #[arg(long)]
        copies: Option<i64>,
    },
    /// List every book
    List,
    /// Delete a book
    Delete { book_id: i64 },
    /// Change the number of copies owned
    SetCopies { book_id: i64, total: i64 },
}

#[derive(Args)]
struct BookArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    isbn: Option<String>,
    #[arg(long, default_value = "")]
    author: String,
    #[arg(long, default_value = "")]
    publisher: String,
    #[arg(long)]
    year: Option<i32>,
    #[arg(long, default_value = "")]
    category: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    cover_url: Option<String>,
    #[arg(long)]
    copies: Option<i64>,
}

impl From<BookArgs> for NewBook {
    fn from(args: BookArgs) -> Self {
        NewBook {
            isbn: args.isbn,
            title: args.title,
            author: args.author,
            publisher: args.publisher,
            publication_year: args.year,
            category: args.category,
            description: args.description,
            cover_url: args.cover_url,
            total_copies: args.copies,
        }
    }
}

#[derive(Subcommand)]
enum MemberCommand {
    /// Register a member
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        /// Membership number, unique when given
        #[arg(long)]
        number: Option<String>,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
    },
    /// List every member
    List,
    /// Delete a member
    Delete { member_id: i64 },
}

#[derive(Subcommand)]
enum TxnCommand {
    /// List every transaction, newest first
    List,
    /// Delete a transaction (an issued one puts its copy back)
    Delete { transaction_id: i64 },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli).await {
        match err.downcast_ref::<LibraryError>() {
            Some(library_err) => eprintln!("{}", library_err.user_message()),
            None => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = LibraryConfig::from_env()?;
    if let Some(path) = cli.database {
        config.database_path = path;
    }
    tracing::debug!(database = %config.database_path.display(), "Opening library");

    let library = Library::open(&config).await?;

    match cli.command {
        Commands::Book(command) => run_book(&library, &config, command, cli.yes).await?,
        Commands::Member(command) => run_member(&library, command, cli.yes).await?,
        Commands::Issue { member, book } => {
            let loan = library.issue_book(member, book).await?;
            println!(
                "Issued transaction {} (due {})",
                loan.transaction_id, loan.due_date
            );
        }
        Commands::Return { transaction } => match library.return_book(transaction).await? {
            ReturnOutcome::Returned { transaction, .. } => {
                println!("Returned transaction {}", transaction.transaction_id);
            }
            ReturnOutcome::AlreadyReturned(Some(transaction)) => {
                println!("Transaction {} was already returned", transaction.transaction_id);
            }
            ReturnOutcome::AlreadyReturned(None) => {
                println!("No issued transaction {}", transaction);
            }
        },
        Commands::Txn(TxnCommand::List) => {
            println!(
                "{:>5}  {:<24} {:<32} {:<10} {:<10} {:<10} {}",
                "ID", "Member", "Book", "Issued", "Due", "Returned", "Status"
            );
            for row in library.list_transactions().await? {
                println!(
                    "{:>5}  {:<24} {:<32} {:<10} {:<10} {:<10} {}",
                    row.transaction_id,
                    truncate(&row.member_name, 24),
                    truncate(&row.book_title, 32),
                    row.issue_date,
                    row.due_date,
                    row.return_date,
                    row.status
                );
            }
        }
        Commands::Txn(TxnCommand::Delete { transaction_id }) => {
            if confirm(&format!("Delete transaction {}?", transaction_id), cli.yes)? {
                let deleted = library.delete_transaction(transaction_id).await?;
                println!("Deleted transaction {}", deleted.transaction.transaction_id);
            }
        }
    }

    library.database().clone().close().await?;
    Ok(())
}

async fn run_book(
    library: &Library,
    config: &LibraryConfig,
    command: BookCommand,
    yes: bool,
) -> anyhow::Result<()> {
    match command {
        BookCommand::Add(args) => {
            let book = library.add_book(args.into()).await?;
            println!("Added book {}: {} ({})", book.book_id, book.title, book.availability());
        }
        BookCommand::Lookup { isbn, add, copies } => {
            let client = IsbnLookupClient::with_config(config.lookup.clone())?;

            if add {
                match library.add_book_from_lookup(&client, &isbn, copies).await? {
                    Some(book) => println!(
                        "Added book {}: {} by {} ({})",
                        book.book_id,
                        book.title,
                        book.author,
                        book.availability()
                    ),
                    None => println!("No data for that ISBN"),
                }
                return Ok(());
            }

            let Some(metadata) = client.lookup(&isbn).await else {
                println!("No data for that ISBN");
                return Ok(());
            };

            println!("Title:       {}", metadata.title);
            println!("Author:      {}", metadata.author);
            println!("Publisher:   {}", metadata.publisher);
            println!("Year:        {}", metadata.publication_year);
            println!("Category:    {}", metadata.category);
            println!("Cover:       {}", metadata.cover_url.as_deref().unwrap_or(""));
        }
        BookCommand::List => {
            println!(
                "{:>5}  {:<14} {:<32} {:<24} {}",
                "ID", "ISBN", "Title", "Author", "Available"
            );
            for book in library.list_books().await? {
                println!(
                    "{:>5}  {:<14} {:<32} {:<24} {}",
                    book.book_id,
                    book.isbn.as_deref().unwrap_or(""),
                    truncate(&book.title, 32),
                    truncate(&book.author, 24),
                    book.availability()
                );
            }
        }
        BookCommand::Delete { book_id } => {
            let book = library.get_book(book_id).await?;
            if confirm(&format!("Delete book {} \"{}\"?", book_id, book.title), yes)? {
                let deleted = library.delete_book(book_id).await?;
                println!(
                    "Deleted book {} ({} returned transactions removed)",
                    book_id, deleted.history_removed
                );
            }
        }
        BookCommand::SetCopies { book_id, total } => {
            let book = library.set_total_copies(book_id, total).await?;
            println!("Book {} now {}", book.book_id, book.availability());
        }
    }
    Ok(())
}

async fn run_member(library: &Library, command: MemberCommand, yes: bool) -> anyhow::Result<()> {
    match command {
        MemberCommand::Add {
            first_name,
            last_name,
            number,
            email,
            phone,
            address,
        } => {
            let member = library
                .add_member(NewMember {
                    membership_number: number,
                    first_name,
                    last_name,
                    email,
                    phone,
                    address,
                })
                .await?;
            println!("Added member {}: {}", member.member_id, member.full_name());
        }
        MemberCommand::List => {
            println!(
                "{:>5}  {:<12} {:<28} {:<28} {:<10} {}",
                "ID", "Number", "Name", "Email", "Joined", "Status"
            );
            for member in library.list_members().await? {
                println!(
                    "{:>5}  {:<12} {:<28} {:<28} {:<10} {}",
                    member.member_id,
                    member.membership_number.as_deref().unwrap_or(""),
                    truncate(&member.full_name(), 28),
                    truncate(&member.email, 28),
                    member.join_date,
                    member.status
                );
            }
        }
        MemberCommand::Delete { member_id } => {
            let member = library.get_member(member_id).await?;
            if confirm(&format!("Delete member {} ({})?", member_id, member.full_name()), yes)? {
                let deleted = library.delete_member(member_id).await?;
                println!(
                    "Deleted member {} ({} returned transactions removed)",
                    member_id, deleted.history_removed
                );
            }
        }
    }
    Ok(())
}

fn confirm(question: &str, yes: bool) -> anyhow::Result<bool> {
    if yes {
        return Ok(true);
    }

    print!("{} [y/N] ", question);
    std::io::stdout().flush().context("Failed to write prompt")?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    let confirmed = matches!(answer.trim().to_lowercase().as_str(), "y" | "yes");
    if !confirmed {
        println!("Cancelled");
    }
    Ok(confirmed)
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut short: String = value.chars().take(width.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}
