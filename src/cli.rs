//! CLI entrypoint wiring for the codebox binary.

use crate::config::types::ExecutionRequest;
use crate::config::{SandboxConfig, StageBudgets};
use crate::executor::CodeExecutor;
use crate::workspace::WorkspaceManager;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about = "Execute untrusted code snippets in disposable sandboxes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute source code and print the result as JSON
    Run {
        /// Programming language (python, java)
        #[arg(long)]
        language: String,
        /// Source code as string
        #[arg(long, conflicts_with = "file")]
        code: Option<String>,
        /// Read source code from a file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Source file name used inside the workspace (interpreted languages)
        #[arg(long)]
        entry_file_name: Option<String>,
        /// Compile-stage timeout in seconds
        #[arg(long)]
        compile_timeout: Option<u64>,
        /// Run-stage timeout in seconds
        #[arg(long)]
        run_timeout: Option<u64>,
        /// Workspace root directory
        #[arg(long)]
        workspace_root: Option<PathBuf>,
    },
    /// Remove workspaces left behind by crashed runs
    CleanupStale {
        /// Remove run directories older than this many seconds
        #[arg(long, default_value_t = 3600)]
        max_age: u64,
        /// Workspace root directory
        #[arg(long)]
        workspace_root: Option<PathBuf>,
    },
}

pub fn run() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            language,
            code,
            file,
            entry_file_name,
            compile_timeout,
            run_timeout,
            workspace_root,
        } => {
            let code = match (code, file) {
                (Some(code), None) => code,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                _ => bail!("provide source via exactly one of --code or --file"),
            };

            let mut config = SandboxConfig::default();
            if let Some(root) = workspace_root {
                config.workspace_root = root;
            }
            let mut budgets = StageBudgets::default();
            if let Some(secs) = compile_timeout {
                budgets.compile = Duration::from_secs(secs);
            }
            if let Some(secs) = run_timeout {
                budgets.run = Duration::from_secs(secs);
            }
            config.budgets = budgets;

            let executor = CodeExecutor::new(config)?;
            let mut request = ExecutionRequest::new(code, language);
            if let Some(name) = entry_file_name {
                request = request.with_entry_file_name(name);
            }

            let result = executor.execute(&request);
            println!("{}", serde_json::to_string_pretty(&result)?);

            if !result.success {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::CleanupStale {
            max_age,
            workspace_root,
        } => {
            let root = workspace_root.unwrap_or_else(SandboxConfig::runtime_root_dir);
            let manager = WorkspaceManager::new(root)?;
            let removed = manager.cleanup_stale(Duration::from_secs(max_age))?;
            eprintln!("Removed {} stale workspace(s)", removed);
            Ok(())
        }
    }
}
