//! Lexicon CLI
//!
//! Command-line interface for managing the word list and reviewing.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use colored::{ColoredString, Colorize};
use directories::ProjectDirs;
use lexicon_core::{
    record_review, Storage, SystemClock, Word, WordInput, WordStatus, WordStore,
    DEFAULT_REVIEW_BATCH,
};
use lexicon_server::{api, ServerConfig};

/// Lexicon - vocabulary flashcards
#[derive(Parser)]
#[command(name = "lexicon")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CLI for the Lexicon vocabulary trainer")]
#[command(long_about = "Lexicon keeps a vocabulary list and schedules each word for review \
on a fixed interval table (1, 2, 4, 7, 15, 30 days).")]
struct Cli {
    /// Directory holding lexicon.db (default: platform data directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Jsonl,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API and web UI
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,
        /// Bind port
        #[arg(long)]
        port: Option<u16>,
        /// Words per review session
        #[arg(long)]
        review_batch: Option<i32>,
        /// Open the web UI in a browser
        #[arg(long)]
        open: bool,
    },

    /// Add a word
    Add {
        word: String,
        definition: String,
        /// Example sentence
        #[arg(long)]
        example: Option<String>,
    },

    /// List all words
    List,

    /// Show words due for review now
    Due {
        #[arg(long, default_value_t = DEFAULT_REVIEW_BATCH)]
        limit: i32,
    },

    /// Record a review answer
    #[command(group(ArgGroup::new("answer").required(true).args(["correct", "incorrect"])))]
    Review {
        id: i64,
        #[arg(long)]
        correct: bool,
        #[arg(long)]
        incorrect: bool,
    },

    /// Show word statistics
    Stats,

    /// Import words from a JSON array of {word, definition, example}
    Import {
        file: PathBuf,
    },

    /// Export all words in JSON or JSONL format
    Export {
        /// Output file path
        output: PathBuf,
        #[arg(long, value_enum, default_value = "json")]
        format: ExportFormat,
    },

    /// Create a consistent copy of the SQLite database
    Backup {
        /// Output file (default: timestamped file in the backups directory)
        output: Option<PathBuf>,
    },

    /// Delete every word
    Clear {
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let db_path = cli
        .data_dir
        .as_ref()
        .map(|dir| dir.join(lexicon_server::config::DB_FILE_NAME));

    match cli.command {
        Commands::Serve {
            host,
            port,
            review_batch,
            open,
        } => run_serve(db_path, host, port, review_batch, open),
        Commands::Add {
            word,
            definition,
            example,
        } => run_add(db_path, word, definition, example),
        Commands::List => run_list(db_path),
        Commands::Due { limit } => run_due(db_path, limit),
        Commands::Review { id, correct, .. } => run_review(db_path, id, correct),
        Commands::Stats => run_stats(db_path),
        Commands::Import { file } => run_import(db_path, &file),
        Commands::Export { output, format } => run_export(db_path, &output, format),
        Commands::Backup { output } => run_backup(db_path, output),
        Commands::Clear { yes } => run_clear(db_path, yes),
    }
}

fn open_storage(db_path: Option<PathBuf>) -> anyhow::Result<Storage> {
    Ok(Storage::new(db_path)?)
}

fn status_label(status: WordStatus) -> ColoredString {
    match status {
        WordStatus::New => status.as_str().white(),
        WordStatus::Learning => status.as_str().yellow(),
        WordStatus::Review => status.as_str().cyan(),
        WordStatus::Mastered => status.as_str().green(),
    }
}

fn print_word_line(word: &Word) {
    let next = word
        .next_review_at
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {:>5}  {:10} {:20} {}  {}",
        word.id.to_string().dimmed(),
        status_label(word.status),
        truncate(&word.word, 20).bold(),
        truncate(&word.definition, 40),
        format!("next {}", next).dimmed()
    );
}

/// Run the HTTP server
fn run_serve(
    db_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    review_batch: Option<i32>,
    open_browser: bool,
) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut config = ServerConfig::from_env()?;
    if db_path.is_some() {
        config.db_path = db_path;
    }
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(batch) = review_batch {
        config.set_review_batch("--review-batch", &batch.to_string())?;
    }

    println!("{}", "=== Lexicon Server ===".cyan().bold());
    println!();
    println!("Starting server at {}...", config.base_url().cyan());

    let storage = Arc::new(open_storage(config.db_path.clone())?);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        api::serve(config, storage, open_browser)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))
    })
}

/// Add one word
fn run_add(
    db_path: Option<PathBuf>,
    word: String,
    definition: String,
    example: Option<String>,
) -> anyhow::Result<()> {
    let storage = open_storage(db_path)?;
    let mut input = WordInput::new(word, definition);
    if let Some(example) = example {
        input = input.with_example(example);
    }

    let word = storage.create_word(input, Utc::now())?;
    println!(
        "{} {} (id {})",
        "Added".green().bold(),
        word.word.bold(),
        word.id
    );
    Ok(())
}

/// List all words
fn run_list(db_path: Option<PathBuf>) -> anyhow::Result<()> {
    let storage = open_storage(db_path)?;
    let words = storage.list_words()?;

    println!("{}", "=== Lexicon Words ===".cyan().bold());
    println!();
    if words.is_empty() {
        println!("{}", "No words yet. Add one with `lexicon add <word> <definition>`.".dimmed());
        return Ok(());
    }
    for word in &words {
        print_word_line(word);
    }
    println!();
    println!("{}: {}", "Total".white().bold(), words.len());
    Ok(())
}

/// Show words due now
fn run_due(db_path: Option<PathBuf>, limit: i32) -> anyhow::Result<()> {
    let storage = open_storage(db_path)?;
    let words = storage.select_due_for_review(Utc::now(), limit.max(1))?;

    println!("{}", "=== Due for Review ===".cyan().bold());
    println!();
    if words.is_empty() {
        println!("{}", "Nothing is due.".green());
        return Ok(());
    }
    for word in &words {
        print_word_line(word);
    }
    Ok(())
}

/// Record an answer
fn run_review(db_path: Option<PathBuf>, id: i64, correct: bool) -> anyhow::Result<()> {
    let storage = open_storage(db_path)?;
    let outcome = record_review(&storage, id, correct, &SystemClock)?;

    let verdict = if correct {
        "Correct".green().bold()
    } else {
        "Incorrect".red().bold()
    };
    println!("{} - word {}", verdict, id);
    println!("  {}: {}", "Stage".white().bold(), outcome.memory_stage);
    println!("  {}: {}", "Status".white().bold(), status_label(outcome.status));
    println!("  {}: {}", "Reviews".white().bold(), outcome.review_count);
    println!(
        "  {}: {}",
        "Next review".white().bold(),
        outcome.next_review_at.format("%Y-%m-%d %H:%M")
    );
    Ok(())
}

/// Show statistics
fn run_stats(db_path: Option<PathBuf>) -> anyhow::Result<()> {
    let storage = open_storage(db_path)?;
    let stats = storage.get_stats(Utc::now())?;

    println!("{}", "=== Lexicon Statistics ===".cyan().bold());
    println!();
    println!("{}: {}", "Total Words".white().bold(), stats.total_words);
    println!("{}: {}", "Due for Review".white().bold(), stats.due_for_review);
    println!("{}: {}", "Correct Answers".white().bold(), stats.total_reviews);
    println!("{}: {:.1}%", "Mastered".white().bold(), stats.mastery_percent());

    println!();
    println!("{}", "=== Status Distribution ===".yellow().bold());
    let total = stats.total_words.max(0) as usize;
    for status in WordStatus::ALL {
        let color = match status {
            WordStatus::New => "white",
            WordStatus::Learning => "yellow",
            WordStatus::Review => "cyan",
            WordStatus::Mastered => "green",
        };
        print_distribution_bar(status.as_str(), stats.count_for(status).max(0) as usize, total, color);
    }
    Ok(())
}

fn print_distribution_bar(label: &str, count: usize, total: usize, color: &str) {
    let percentage = if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    let bar_width: usize = 30;
    let filled = ((percentage / 100.0) * bar_width as f64) as usize;
    let empty = bar_width.saturating_sub(filled);

    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));
    let colored_bar = match color {
        "green" => bar.green(),
        "yellow" => bar.yellow(),
        "cyan" => bar.cyan(),
        _ => bar.white(),
    };

    println!(
        "  {:10} [{:30}] {:>4} ({:>5.1}%)",
        label, colored_bar, count, percentage
    );
}

/// Import words from a JSON file
fn run_import(db_path: Option<PathBuf>, file: &Path) -> anyhow::Result<()> {
    println!("{}", "=== Lexicon Import ===".cyan().bold());
    println!();

    let contents = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Could not read {}: {}", file.display(), e))?;
    let inputs = WordInput::parse_batch(&contents)
        .map_err(|e| anyhow::anyhow!("{} is not a JSON array of words: {}", file.display(), e))?;

    let storage = open_storage(db_path)?;
    let report = storage.import_words(&inputs, Utc::now())?;

    println!("{}: {}", "Entries".white().bold(), inputs.len());
    println!("{}: {}", "Skipped (already present)".white().bold(), report.skipped);
    println!();
    println!(
        "{}",
        format!("Imported {} words", report.imported).green().bold()
    );
    Ok(())
}

/// Export all words
fn run_export(db_path: Option<PathBuf>, output: &Path, format: ExportFormat) -> anyhow::Result<()> {
    println!("{}", "=== Lexicon Export ===".cyan().bold());
    println!();

    let storage = open_storage(db_path)?;
    let words = storage.list_words()?;

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(output)?;
    let mut writer = BufWriter::new(file);

    let format_name = match format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &words)?;
            writer.write_all(b"\n")?;
            "json"
        }
        ExportFormat::Jsonl => {
            for word in &words {
                serde_json::to_writer(&mut writer, word)?;
                writer.write_all(b"\n")?;
            }
            "jsonl"
        }
    };

    writer.flush()?;

    let size_display = format_size(std::fs::metadata(output)?.len());
    println!(
        "{}",
        format!(
            "Exported {} words to {} ({}, {})",
            words.len(),
            output.display(),
            format_name,
            size_display
        )
        .green()
        .bold()
    );
    Ok(())
}

/// Back up the database with VACUUM INTO
fn run_backup(db_path: Option<PathBuf>, output: Option<PathBuf>) -> anyhow::Result<()> {
    println!("{}", "=== Lexicon Backup ===".cyan().bold());
    println!();

    let output = match output {
        Some(path) => path,
        None => {
            let proj_dirs = ProjectDirs::from("com", "lexicon", "lexicon")
                .ok_or_else(|| anyhow::anyhow!("Could not determine project directories"))?;
            proj_dirs
                .data_dir()
                .join("backups")
                .join(format!("lexicon-{}.db", Utc::now().format("%Y%m%d-%H%M%S")))
        }
    };

    if output.exists() {
        anyhow::bail!("Refusing to overwrite existing file: {}", output.display());
    }
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let storage = open_storage(db_path)?;
    println!("  {} {}", "From:".dimmed(), storage.path().display());
    println!("  {}   {}", "To:".dimmed(), output.display());

    storage.backup_to(&output)?;

    let size_display = format_size(std::fs::metadata(&output)?.len());
    println!();
    println!(
        "{}",
        format!("Backup complete: {} ({})", output.display(), size_display)
            .green()
            .bold()
    );
    Ok(())
}

/// Delete all words
fn run_clear(db_path: Option<PathBuf>, yes: bool) -> anyhow::Result<()> {
    let storage = open_storage(db_path)?;
    let total = storage.list_words()?.len();

    if total == 0 {
        println!("{}", "Nothing to delete.".dimmed());
        return Ok(());
    }

    if !yes {
        print!(
            "{} ",
            format!("Delete all {} words? This cannot be undone. [y/N]", total)
                .yellow()
                .bold()
        );
        std::io::stdout().flush()?;

        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("{}", "Aborted.".dimmed());
            return Ok(());
        }
    }

    let deleted = storage.delete_all_words()?;
    println!("{}", format!("Deleted {} words", deleted).green().bold());
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Truncate a string for display (UTF-8 safe)
fn truncate(s: &str, max_chars: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max_chars {
        s
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
