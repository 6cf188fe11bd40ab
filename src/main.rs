mod config;
mod error;
mod server;
mod service;
mod store;
mod task;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

use config::Config;
use service::TaskService;
use store::Store;
use task::{NewTask, TaskPatch};

#[derive(Parser)]
#[command(name = "tb")]
#[command(about = "Task Board (tb) - JSON-file task tracker with a web UI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(long, global = true)]
    debug: bool,
    #[arg(long, global = true, env = "TASKS_FILE", default_value = config::DEFAULT_DATA_FILE)]
    data: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    Serve {
        #[arg(short, long, env = "PORT", default_value_t = config::DEFAULT_PORT)]
        port: u16,
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, env = "UI_DIR", default_value = config::DEFAULT_UI_DIR)]
        ui: PathBuf,
    },
    Task { #[command(subcommand)] action: TaskCommands },
}

#[derive(Subcommand)]
enum TaskCommands {
    Add { title: String, #[arg(short, long)] description: Option<String> },
    List,
    Done { id: String },
    Reopen { id: String },
    Edit { id: String, #[arg(short, long)] title: Option<String>, #[arg(short, long)] description: Option<String> },
    Rm { id: String },
}

/// `--debug` wins over `RUST_LOG`, which wins over the `info` default.
fn log_filter(debug: bool, rust_log: Option<String>) -> String {
    if debug { return "debug".to_string(); }
    rust_log.filter(|f| !f.trim().is_empty()).unwrap_or_else(|| "info".to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .parse_filters(&log_filter(cli.debug, std::env::var("RUST_LOG").ok()))
        .init();

    match cli.command {
        Commands::Serve { port, host, ui } => {
            let config = Config { data_file: cli.data, host, port, ui_dir: ui };
            tokio::runtime::Runtime::new()?.block_on(server::start_server(config))?;
        }
        Commands::Task { action } => {
            let store = Store::new(cli.data);
            log::debug!("using task file {}", store.path().display());
            run_task_command(TaskService::new(store), action)?;
        }
    }
    Ok(())
}

fn run_task_command(svc: TaskService, action: TaskCommands) -> Result<()> {
    match action {
        TaskCommands::Add { title, description } => {
            let task = svc.create(NewTask { title, description })?;
            println!("✅ Task [{}] added: {}", task.id, task.title);
        }
        TaskCommands::List => {
            let tasks = svc.list_all()?;
            println!("TASK BOARD ({} tasks):", tasks.len());
            for t in tasks {
                let marker = if t.completed { "x" } else { " " };
                println!("- [{}] {} {} ({})", marker, t.id, t.title, t.created_at.format("%Y-%m-%d %H:%M"));
                if !t.description.is_empty() { println!("      {}", t.description); }
            }
        }
        TaskCommands::Done { id } => {
            let task = svc.update(&id, TaskPatch { completed: Some(true), ..Default::default() })?;
            println!("🏁 Task [{}] marked as done.", task.id);
        }
        TaskCommands::Reopen { id } => {
            let task = svc.update(&id, TaskPatch { completed: Some(false), ..Default::default() })?;
            println!("↩️ Task [{}] reopened.", task.id);
        }
        TaskCommands::Edit { id, title, description } => {
            let task = svc.update(&id, TaskPatch { title, description, completed: None })?;
            println!("✏️ Task [{}] updated: {}", task.id, task.title);
        }
        TaskCommands::Rm { id } => {
            svc.delete(&id)?;
            println!("🗑️ Task [{}] removed.", id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_serve_defaults() {
        let cli = Cli::try_parse_from(["tb", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { ui, .. } => assert_eq!(ui, PathBuf::from("ui")),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn debug_flag_overrides_rust_log() {
        assert_eq!(log_filter(true, Some("warn".into())), "debug");
        assert_eq!(log_filter(false, Some("tb=trace".into())), "tb=trace");
        assert_eq!(log_filter(false, None), "info");
        assert_eq!(log_filter(false, Some("  ".into())), "info");
    }

    #[test]
    fn task_commands_drive_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let svc = || TaskService::new(Store::new(path.clone()));

        run_task_command(svc(), TaskCommands::Add { title: "Water plants".into(), description: None }).unwrap();
        let id = svc().list_all().unwrap()[0].id.clone();
        run_task_command(svc(), TaskCommands::Done { id: id.clone() }).unwrap();
        assert!(svc().get_by_id(&id).unwrap().completed);

        run_task_command(svc(), TaskCommands::Rm { id: id.clone() }).unwrap();
        assert!(run_task_command(svc(), TaskCommands::Rm { id }).is_err());
    }
}
