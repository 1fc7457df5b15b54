// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use bookwai::app_config::{self, Config, TranslationProvider};
use bookwai::app_controller::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Gemini,
    Groq,
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Gemini => TranslationProvider::Gemini,
            CliTranslationProvider::Groq => TranslationProvider::Groq,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract chapter text files from a PDF and write the metadata report
    Extract {
        /// PDF to extract (defaults to the first PDF in the input folder)
        #[arg(value_name = "PDF")]
        pdf: Option<PathBuf>,
    },

    /// Translate the extracted chapters, resuming where the last run stopped
    Translate(TranslateArgs),

    /// Regenerate the metadata report from the chapter files
    Metadata,

    /// Extract, then translate
    Run {
        /// PDF to extract (defaults to the first PDF in the input folder)
        #[arg(value_name = "PDF")]
        pdf: Option<PathBuf>,

        #[command(flatten)]
        overrides: ProviderOverrides,
    },

    /// Generate shell completions for bookwai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args, Debug)]
struct ProviderOverrides {
    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,
}

#[derive(clap::Args, Debug)]
struct TranslateArgs {
    /// Echo chunks back instead of calling a provider; writes to a scratch folder
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    overrides: ProviderOverrides,
}

/// BOOKwAI - Book translation with AI
///
/// Splits a PDF book into chapters and translates them chunk by chunk with an
/// LLM, carrying context between chunks and resuming interrupted runs.
#[derive(Parser, Debug)]
#[command(name = "bookwai")]
#[command(version)]
#[command(about = "AI-powered book translation tool")]
#[command(long_about = "BOOKwAI extracts chapters from a PDF and translates them with an LLM provider.

EXAMPLES:
    bookwai extract data/input_pdfs/book.pdf    # Split a book into chapter files
    bookwai translate                           # Translate pending chapters
    bookwai translate -p groq                   # Use Groq instead of the configured provider
    bookwai translate --dry-run                 # Exercise the pipeline without API calls
    bookwai run                                 # Extract the first PDF, then translate
    bookwai completions bash > bookwai.bash     # Generate bash completions

CONFIGURATION:
    Settings live in conf.json by default (created on first run). Languages,
    instructions and style rules live in config/prompts.json. API keys may be
    set in conf.json or through GEMINI_API_KEY, GROQ_API_KEY, OPENAI_API_KEY or
    ANTHROPIC_API_KEY (a .env file is read at startup).")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation; the level lives in `log::max_level`
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and marker for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌"),
            Level::Warn => ("\x1B[1;33m", "🚧"),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍"),
            Level::Trace => ("\x1B[1;35m", "📋"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, marker) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", colour, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialise logger: {}", e);
    }

    if let Err(e) = run(CommandLineOptions::parse()).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: CommandLineOptions) -> Result<()> {
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "bookwai", &mut std::io::stdout());
        return Ok(());
    }

    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(anyhow!("Failed to read .env: {}", e)),
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    match cli.command {
        Commands::Extract { pdf } => {
            let controller = Controller::with_config(config)?;
            let report = controller.run_extract(pdf).await?;
            info!("Done: {} chapter file(s)", report.written.len());
        }
        Commands::Translate(args) => {
            apply_overrides(&mut config, args.overrides);
            let controller = Controller::with_config(config)?;
            let summary = controller.run_translate(args.dry_run).await?;
            if !summary.is_clean() {
                return Err(anyhow!("{} chapter(s) unfinished or incomplete", summary.aborted() + summary.completed_with_gaps()));
            }
        }
        Commands::Metadata => {
            let controller = Controller::with_config(config)?;
            controller.run_metadata()?;
        }
        Commands::Run { pdf, overrides } => {
            apply_overrides(&mut config, overrides);
            let controller = Controller::with_config(config)?;
            let summary = controller.run_all(pdf).await?;
            if !summary.is_clean() {
                return Err(anyhow!("{} chapter(s) unfinished or incomplete", summary.aborted() + summary.completed_with_gaps()));
            }
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

// Override config with CLI options if provided
fn apply_overrides(config: &mut Config, overrides: ProviderOverrides) {
    if let Some(provider) = overrides.provider {
        config.translation.provider = provider.into();
    }
    if let Some(model) = overrides.model {
        config.translation.active_provider_config_mut().model = model;
    }
}
