//! Command-line front end for the task list core.
//!
//! # Responsibility
//! - Drive the same controller the mobile UI uses from a terminal.
//! - Keep output line-oriented for quick local checks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tasklist_core::db::open_db;
use tasklist_core::{
    core_version, init_logging, ping, ConnectivityMonitor, ConnectivityState, CoreConfig,
    KvTaskRepository, SimulatedBackend, SqliteKeyValueStore, Task, TaskListController,
    TaskService,
};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "tasklist")]
#[command(about = "Offline-first task list")]
struct Args {
    /// SQLite file holding tasks (overrides TASKLIST_DB_PATH)
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print stored tasks in insertion order
    List,
    /// Add a task
    Add { title: String },
    /// Delete a task by id
    Delete {
        id: Uuid,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Send unsynced tasks to the backend
    Sync {
        /// Simulate missing connectivity
        #[arg(long)]
        offline: bool,
    },
    /// Remove every stored task
    Clear,
    /// Check core linkage
    Ping,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = CoreConfig::from_env()?;
    if let Some(db) = args.db {
        config.db_path = db;
    }
    if let Some(log_dir) = &args.log_dir {
        let log_dir = log_dir
            .to_str()
            .context("log directory must be valid UTF-8")?;
        init_logging(config.log_level, log_dir).map_err(anyhow::Error::msg)?;
    }

    match args.command {
        Command::Ping => {
            println!("tasklist_core ping={}", ping());
            println!("tasklist_core version={}", core_version());
            Ok(())
        }
        command => run(command, &config),
    }
}

fn run(command: Command, config: &CoreConfig) -> Result<()> {
    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let repo = KvTaskRepository::new(SqliteKeyValueStore::try_new(&conn)?);
    let connectivity = ConnectivityMonitor::new(match command {
        Command::Sync { offline: true } => ConnectivityState::Disconnected,
        _ => ConnectivityState::Connected,
    });
    let mut controller = TaskListController::new(
        repo.clone(),
        SimulatedBackend::with_delay(config.sync_delay),
        connectivity,
    );
    controller.load().map_err(alert_error)?;

    match command {
        Command::List => {
            if controller.tasks().is_empty() {
                println!("No tasks.");
            }
            for task in controller.tasks() {
                print_task(task);
            }
        }
        Command::Add { title } => {
            let task = controller.add_task(&title).map_err(alert_error)?;
            print_task(&task);
        }
        Command::Delete { id, yes } => {
            if !yes && !confirm(&controller)? {
                println!("Cancelled.");
                return Ok(());
            }
            if controller.delete_task(id).map_err(alert_error)? {
                println!("Deleted {id}.");
            } else {
                println!("No task {id}.");
            }
        }
        Command::Sync { .. } => {
            let report = controller.synchronize().map_err(alert_error)?;
            println!(
                "Synced {} of {} pending task(s); {} rejected.",
                report.synced, report.attempted, report.rejected
            );
        }
        Command::Clear => {
            TaskService::new(repo).clear_all_tasks()?;
            println!("Cleared.");
        }
        Command::Ping => println!("tasklist_core ping={}", ping()),
    }

    Ok(())
}

fn print_task(task: &Task) {
    let status = if task.synced { "synced " } else { "pending" };
    println!(
        "[{status}] {} {} {}",
        task.id,
        task.created_at.format("%Y-%m-%d %H:%M"),
        task.title
    );
}

fn confirm<R, B, C>(controller: &TaskListController<R, B, C>) -> Result<bool>
where
    R: tasklist_core::TaskRepository + Clone,
    B: tasklist_core::RemoteBackend,
    C: tasklist_core::ConnectivityProvider,
{
    let prompt = controller.delete_confirmation();
    print!(
        "{}: {} [{}/{}] ",
        prompt.title, prompt.message, prompt.confirm_label, prompt.cancel_label
    );
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim();
    Ok(answer.eq_ignore_ascii_case(prompt.confirm_label) || answer.eq_ignore_ascii_case("y"))
}

fn alert_error(err: tasklist_core::AppError) -> anyhow::Error {
    let alert = err.alert();
    anyhow::Error::new(err).context(format!("{}: {}", alert.title, alert.message))
}

#[cfg(test)]
mod tests {
    use super::{Args, Command};
    use clap::Parser;

    #[test]
    fn parses_delete_with_yes() {
        let args = Args::parse_from([
            "tasklist",
            "delete",
            "00000000-0000-4000-8000-000000000001",
            "--yes",
        ]);
        assert!(matches!(args.command, Command::Delete { yes: true, .. }));
    }

    #[test]
    fn parses_offline_sync_with_db_override() {
        let args = Args::parse_from(["tasklist", "--db", "/tmp/t.sqlite3", "sync", "--offline"]);
        assert!(matches!(args.command, Command::Sync { offline: true }));
        assert_eq!(args.db.unwrap().to_str(), Some("/tmp/t.sqlite3"));
    }

    #[test]
    fn rejects_malformed_delete_id() {
        assert!(Args::try_parse_from(["tasklist", "delete", "nope"]).is_err());
    }
}
