use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studyweave::types::SearchFilter;

/// Parse a search filter from string
fn parse_search_filter(s: &str) -> Result<SearchFilter, String> {
    SearchFilter::from_str(s)
}

#[derive(Parser)]
#[command(name = "studyweave")]
#[command(
    version,
    about = "AI-driven interactive lesson and quiz generator for study documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Detect the chapter structure of a document
    Structure {
        #[arg(help = "Pages JSON or plain text file")]
        input: PathBuf,
    },

    /// Generate an interactive lesson from document pages
    Lesson {
        #[arg(help = "Pages JSON or plain text file")]
        input: PathBuf,
        #[arg(long, help = "First page of the lesson range")]
        start: Option<u32>,
        #[arg(long, help = "Last page of the lesson range")]
        end: Option<u32>,
    },

    /// Generate quiz questions
    Quiz {
        #[arg(help = "Pages JSON or plain text file")]
        input: PathBuf,
        #[arg(long, help = "Generate a short quiz for one page only")]
        page: Option<u32>,
    },

    /// Evaluate quiz answers and print feedback
    Evaluate {
        #[arg(help = "Questions JSON file (as produced by quiz)")]
        questions: PathBuf,
        #[arg(help = "Answers JSON file")]
        answers: PathBuf,
    },

    /// Summarize a chapter to a quarter of its length
    Summarize {
        #[arg(help = "Pages JSON or plain text file")]
        input: PathBuf,
        #[arg(long, help = "Optional style directive for the summary")]
        style: Option<String>,
    },

    /// Proofread text without translating it
    Proofread {
        #[arg(help = "Pages JSON or plain text file")]
        input: PathBuf,
        #[arg(long, help = "Correct all pages in one request, keeping page separators")]
        book: bool,
    },

    /// Explain a page of the document in detail
    Explain {
        #[arg(help = "Pages JSON or plain text file")]
        input: PathBuf,
        #[arg(long, help = "Explain this page only")]
        page: Option<u32>,
        #[arg(long, help = "Simpler, deeper re-explanation of a concept")]
        deeper: bool,
    },

    /// Answer a question from the document content only
    Ask {
        #[arg(help = "Pages JSON or plain text file")]
        input: PathBuf,
        #[arg(help = "The question to answer")]
        query: String,
    },

    /// Search the web for study materials
    Search {
        #[arg(help = "What to search for")]
        query: String,
        #[arg(long, value_parser = parse_search_filter, default_value = "all", help = "Source filter: all, video, sites")]
        filter: SearchFilter,
    },

    /// Chat with the academic assistant
    Chat {
        #[arg(long, help = "Ground the chat in this document")]
        context: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Store a user-entered API key
    Set {
        #[arg(help = "The API key")]
        value: String,
    },
    /// Show whether a credential is available
    Status,
    /// Remove the stored user key
    Clear,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show {
        #[arg(long, help = "Print as JSON instead of TOML")]
        json: bool,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mstudyweave encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> studyweave::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    use studyweave::cli::commands;

    match cli.command {
        Commands::Key { action } => match action {
            KeyAction::Set { value } => commands::key::set(&value)?,
            KeyAction::Status => commands::key::status()?,
            KeyAction::Clear => commands::key::clear()?,
        },
        Commands::Structure { input } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::structure::run(&input))?;
        }
        Commands::Lesson { input, start, end } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::lesson::run(&input, start, end))?;
        }
        Commands::Quiz { input, page } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::quiz::run(&input, page))?;
        }
        Commands::Evaluate { questions, answers } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::evaluate::run(&questions, &answers))?;
        }
        Commands::Summarize { input, style } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::summarize::run(&input, style.as_deref()))?;
        }
        Commands::Proofread { input, book } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::proofread::run(&input, book))?;
        }
        Commands::Explain { input, page, deeper } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::explain::run(&input, page, deeper))?;
        }
        Commands::Ask { input, query } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::ask::run(&input, &query))?;
        }
        Commands::Search { query, filter } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::search::run(&query, filter))?;
        }
        Commands::Chat { context } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::chat::run(context.as_deref()))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => commands::config::show(json)?,
            ConfigAction::Path => commands::config::path()?,
            ConfigAction::Init { force } => commands::config::init(force)?,
        },
    }

    Ok(())
}
