use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use todotxt_app::{ListOutput, TodoConfig, TodoError, TodoService, line_number_to_index};
use todotxt_core::{SortOrder, SortSpec, Task};
use todotxt_store::FileStore;
use tracing::debug;

use crate::{Command, OutputFormat, SortArgs};

/// Execute one subcommand against the files named by `config`.
pub fn run<W: Write>(command: Command, config: &TodoConfig, format: OutputFormat, out: &mut W) -> Result<()> {
    let todo_path = config.todo_path();
    debug!(todo = %todo_path.display(), "Resolved todo file");
    let mut render = Renderer { format, out };

    match command {
        Command::Add { texts } => {
            let added = open(&todo_path)?.add(texts.as_slice())?;
            render.tasks(&added)?;
            render.note(&format!("{} added.", added.len()))
        }
        Command::Addm { text } => {
            let added = open(&todo_path)?.add_multiline(&text)?;
            render.tasks(&added)?;
            render.note(&format!("{} added.", added.len()))
        }
        Command::Do { lines } => {
            let toggled = open(&todo_path)?.toggle_done(&to_indices(&lines)?)?;
            render.tasks(&toggled)?;
            let done = toggled.iter().filter(|task| task.is_done()).count();
            render.note(&format!(
                "{done} marked as done, {} reopened.",
                toggled.len() - done
            ))
        }
        Command::Pri { lines, priority } => {
            let updated = open(&todo_path)?.set_priority(&to_indices(&lines)?, priority)?;
            render.tasks(&updated)?;
            render.note(&format!("{} prioritized ({priority}).", updated.len()))
        }
        Command::Depri { line } => {
            let task = open(&todo_path)?.remove_priority(line_number_to_index(line)?)?;
            render.tasks(&[task])?;
            render.note("priority removed.")
        }
        Command::Append { line, text } => {
            let task = open(&todo_path)?.append(line_number_to_index(line)?, &text.join(" "))?;
            render.tasks(&[task])
        }
        Command::Prepend { line, text } => {
            let task = open(&todo_path)?.prepend(line_number_to_index(line)?, &text.join(" "))?;
            render.tasks(&[task])
        }
        Command::Replace { line, text } => {
            let replaced = open(&todo_path)?.replace(line_number_to_index(line)?, &text.join(" "))?;
            if render.format == OutputFormat::Json {
                return render.json(&replaced);
            }
            render.tasks(&[replaced.previous])?;
            render.note("replaced with:")?;
            render.tasks(&[replaced.current])
        }
        Command::Del { lines } => {
            let removed = open(&todo_path)?.delete(&to_indices(&lines)?)?;
            render.tasks(&removed)?;
            render.note(&format!("{} deleted.", removed.len()))
        }
        Command::Ls { terms, order } => {
            let service = open(&todo_path)?;
            let mut listed = service.list(terms.first().map_or("", String::as_str));
            for term in terms.iter().skip(1) {
                listed.tasks.retain(|task| task.text().contains(term.as_str()));
            }
            listed.shown = listed.tasks.len();
            apply_order(order, &mut listed.tasks);
            render.listing(&listed)
        }
        Command::Listall { order } => {
            let service = open(&todo_path)?;
            let mut tasks = service.list_all_with_done(&FileStore::new(config.done_path()))?;
            apply_order(order, &mut tasks);
            let total = tasks.len();
            render.listing(&ListOutput {
                tasks,
                total,
                shown: total,
            })
        }
        Command::Listpri { priority } => {
            let tasks = open(&todo_path)?.list_priority(priority);
            render.tasks(&tasks)
        }
        Command::Listcon => render.tokens(&open(&todo_path)?.list_contexts()),
        Command::Listproj => render.tokens(&open(&todo_path)?.list_projects()),
        Command::Mv { line, dest, src } => {
            let src_path = src.map_or_else(|| todo_path.clone(), |src| config.todo_dir.join(src));
            let dest_path = config.todo_dir.join(dest);
            if same_file(&src_path, &dest_path) {
                return Err(TodoError::ParseArg(format!(
                    "source and destination are the same file: {}",
                    dest_path.display()
                ))
                .into());
            }
            let mut source = open(&src_path)?;
            let mut destination = open(&dest_path)?;
            let moved = source.move_to(&mut destination, line)?;
            render.tasks(&[moved])?;
            render.note(&format!(
                "moved from {} to {}.",
                src_path.display(),
                dest_path.display()
            ))
        }
        Command::Archive => {
            let done_path = config.done_path();
            let archived = open(&todo_path)?.archive(&FileStore::new(&done_path))?;
            render.tasks(&archived)?;
            render.note(&format!("{} archived to {}.", archived.len(), done_path.display()))
        }
        Command::Dedup => {
            let removed = open(&todo_path)?.deduplicate()?;
            render.note(&format!("{removed} duplicate task(s) removed."))
        }
        Command::Report => {
            let report = open(&todo_path)?.report(&FileStore::new(config.done_path()))?;
            report.append_to(&FileStore::new(config.report_path()))?;
            if render.format == OutputFormat::Json {
                return render.json(&report);
            }
            let line = report.to_log_line().context("failed to format report")?;
            writeln!(render.out, "{line}")?;
            render.note("report file updated.")
        }
        Command::Tidy => {
            let removed = open(&todo_path)?.tidy()?;
            render.note(&format!("{removed} done task(s) removed."))
        }
    }
}

fn open(path: &Path) -> Result<TodoService<FileStore>> {
    TodoService::load(FileStore::new(path)).with_context(|| format!("failed to load {}", path.display()))
}

fn to_indices(lines: &[usize]) -> Result<Vec<usize>, TodoError> {
    lines.iter().map(|&line| line_number_to_index(line)).collect()
}

fn apply_order(order: SortArgs, tasks: &mut [Task]) {
    if order.sort.is_none() && !order.desc {
        return;
    }
    let direction = if order.desc {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };
    SortSpec::new(order.sort.unwrap_or_default(), direction).sort(tasks);
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

struct Renderer<'a, W> {
    format: OutputFormat,
    out: &'a mut W,
}

impl<W: Write> Renderer<'_, W> {
    fn tasks(&mut self, tasks: &[Task]) -> Result<()> {
        match self.format {
            OutputFormat::Table => self.task_lines(tasks),
            OutputFormat::Json => self.json(tasks),
        }
    }

    fn listing(&mut self, listed: &ListOutput) -> Result<()> {
        match self.format {
            OutputFormat::Table => {
                self.task_lines(&listed.tasks)?;
                writeln!(self.out, "--")?;
                self.note(&format!("{} of {} tasks shown", listed.shown, listed.total))
            }
            OutputFormat::Json => self.json(listed),
        }
    }

    fn tokens(&mut self, tokens: &[String]) -> Result<()> {
        match self.format {
            OutputFormat::Table => {
                for token in tokens {
                    writeln!(self.out, "{token}")?;
                }
                Ok(())
            }
            OutputFormat::Json => self.json(tokens),
        }
    }

    /// Status line; table output only.
    fn note(&mut self, message: &str) -> Result<()> {
        if self.format == OutputFormat::Table {
            writeln!(self.out, "TODO: {message}")?;
        }
        Ok(())
    }

    fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        writeln!(self.out, "{}", serde_json::to_string_pretty(value)?)?;
        Ok(())
    }

    fn task_lines(&mut self, tasks: &[Task]) -> Result<()> {
        let width = tasks
            .iter()
            .map(|task| task.line_number().to_string().len())
            .max()
            .unwrap_or(0)
            .max(2);
        for task in tasks {
            writeln!(self.out, "{:0width$} {}", task.line_number(), task.text())?;
        }
        Ok(())
    }
}
