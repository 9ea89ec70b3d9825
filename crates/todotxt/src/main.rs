//! CLI entry point for the `todo` binary.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use todotxt_app::TodoConfig;
use todotxt_core::{Priority, SortField};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Plain-text task list in the todo.txt format.
#[derive(Parser, Debug)]
#[command(name = "todo", version, about = "todo: manage a todo.txt task list")]
struct Cli {
    /// Task file to operate on (overrides the config).
    #[arg(long, global = true)]
    todo_file: Option<PathBuf>,

    /// Done file used by archive, listall and report (overrides the config).
    #[arg(long, global = true)]
    done_file: Option<PathBuf>,

    /// Config file (defaults to `<config dir>/todotxt/config.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add one task per argument.
    #[command(alias = "a")]
    Add {
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Add one task per line of the argument.
    Addm { text: String },

    /// Toggle completion of the tasks on the given lines.
    Do {
        #[arg(required = true)]
        lines: Vec<usize>,
    },

    /// Set the priority of the tasks on the given lines.
    #[command(alias = "p")]
    Pri {
        #[arg(required = true)]
        lines: Vec<usize>,
        priority: Priority,
    },

    /// Remove the priority of a task.
    #[command(alias = "dp")]
    Depri { line: usize },

    /// Append text to a task.
    #[command(alias = "app")]
    Append {
        line: usize,
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Prepend text to a task, after its priority.
    #[command(alias = "prep")]
    Prepend {
        line: usize,
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Replace the text of a task.
    Replace {
        line: usize,
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Delete the tasks on the given lines.
    #[command(alias = "rm")]
    Del {
        #[arg(required = true)]
        lines: Vec<usize>,
    },

    /// List tasks containing all of the given terms.
    #[command(alias = "list")]
    Ls {
        terms: Vec<String>,
        #[command(flatten)]
        order: SortArgs,
    },

    /// List active and archived tasks.
    Listall {
        #[command(flatten)]
        order: SortArgs,
    },

    /// List incomplete prioritized tasks, optionally for one priority.
    #[command(alias = "lsp")]
    Listpri { priority: Option<Priority> },

    /// List contexts.
    #[command(alias = "lsc")]
    Listcon,

    /// List projects.
    #[command(alias = "lsprj")]
    Listproj,

    /// Move a task to another file.
    #[command(alias = "move")]
    Mv {
        line: usize,
        dest: PathBuf,
        src: Option<PathBuf>,
    },

    /// Move done tasks to the done file.
    Archive,

    /// Remove duplicate tasks.
    #[command(alias = "deduplicate")]
    Dedup,

    /// Count tasks and append the counts to the report file.
    Report,

    /// Remove done tasks without archiving them.
    Tidy,
}

/// Ordering applied to listings. The file itself is not reordered.
#[derive(clap::Args, Debug, Clone, Copy, Default)]
struct SortArgs {
    /// Field to sort by (`text` or `priority`).
    #[arg(long)]
    sort: Option<SortField>,

    /// Reverse the order.
    #[arg(long)]
    desc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let Cli {
        todo_file,
        done_file,
        config,
        verbose,
        format,
        cmd,
    } = Cli::parse();

    install_tracing(verbose);

    let config = TodoConfig::load(config.as_deref())?.with_overrides(todo_file, done_file)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::run(cmd, &config, format, &mut out)?;
    out.flush()?;
    Ok(())
}

const fn default_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::WARN }
}

fn install_tracing(verbose: bool) {
    // RUST_LOG overrides the default level.
    let filter = EnvFilter::builder()
        .with_default_directive(default_level(verbose).into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
