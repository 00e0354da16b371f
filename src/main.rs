//! slowandarain CLI - content administration for the Slowandarain travel blog.

use clap::{Parser, Subcommand};
use slowandarain::cli;
use slowandarain::cli::destinations::DestinationCommand;
use slowandarain::cli::stories::StoryCommand;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slowandarain")]
#[command(author, version, about = "Content administration for the Slowandarain travel blog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as admin. Prompts for anything not given.
    Login {
        /// Admin email.
        #[arg(short, long)]
        email: Option<String>,

        /// Password (prompted without echo if omitted).
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out.
    Logout,

    /// Show backend and session state.
    Status,

    /// Manage carousel destinations.
    Destinations {
        #[command(subcommand)]
        command: DestinationCommand,
    },

    /// Manage travel stories.
    Stories {
        #[command(subcommand)]
        command: StoryCommand,
    },

    /// Send feedback to the site owners.
    Feedback {
        /// Your name.
        #[arg(long)]
        name: String,

        /// Your email.
        #[arg(long)]
        email: String,

        /// Message.
        message: String,
    },

    /// Render the landing page as text.
    Page {
        /// Carousel slide to show.
        #[arg(long)]
        slide: Option<usize>,
    },

    /// Print the digest to use as `admin.password_sha256`.
    HashPassword,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SLOWANDARAIN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Login { email, password } => cli::login::run(email, password),
        Commands::Logout => cli::logout::run(),
        Commands::Status => cli::status::run(),
        Commands::Destinations { command } => cli::destinations::run(command),
        Commands::Stories { command } => cli::stories::run(command),
        Commands::Feedback {
            name,
            email,
            message,
        } => cli::feedback::run(&name, &email, &message),
        Commands::Page { slide } => cli::page::run(slide),
        Commands::HashPassword => cli::hash::run(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("slowandarain: error: {e}");
            ExitCode::FAILURE
        }
    }
}
