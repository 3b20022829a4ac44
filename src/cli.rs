use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use dayPlanner::config::PlannerSettings;
use dayPlanner::handlers::prompter::InquirePrompter;
use dayPlanner::handlers::session::{read_snapshot, PlannerSession};
use dayPlanner::service::interval;
use dayPlanner::service::registry::ScheduleRegistry;
use dayPlanner::service::render::format_duration;
use dayPlanner::service::schedule_store::ScheduleStore;
use dayPlanner::service::time_parser::TimeParser;

#[derive(Parser)]
#[command(name = "dayPlanner", about = "Plan days, events and todos from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive planner menu.
    Plan {
        /// Seed the session from a previously exported JSON schedule.
        #[arg(long)]
        import: Option<PathBuf>,
    },
    /// Parse and validate a start/end pair without storing anything.
    Check { start: String, end: String },
    /// List the accepted time layouts.
    Layouts,
}

pub async fn cli(settings: PlannerSettings) -> ExitCode {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Plan { import: None }) {
        Commands::Plan { import } => plan(settings, import).await,
        Commands::Check { start, end } => check(&settings, &start, &end),
        Commands::Layouts => {
            for layout in &settings.layouts {
                println!("{layout}");
            }
            ExitCode::SUCCESS
        }
    }
}

async fn plan(settings: PlannerSettings, import: Option<PathBuf>) -> ExitCode {
    let registry = ScheduleRegistry::new(settings.policy);
    let store = match import {
        Some(path) => {
            let restored = read_snapshot(&path)
                .map_err(|e| e.to_string())
                .and_then(|snapshot| {
                    ScheduleStore::restore(snapshot, settings.policy).map_err(|e| e.to_string())
                });
            match restored {
                Ok(store) => {
                    info!(path = %path.display(), days = store.len(), "schedule imported");
                    registry.install(&settings.user, store).await
                }
                Err(e) => {
                    error!(path = %path.display(), "import failed: {e}");
                    eprintln!("Failed to import {}: {e}", path.display());
                    return ExitCode::FAILURE;
                }
            }
        }
        None => registry.store_for(&settings.user).await,
    };

    let session = tokio::task::spawn_blocking(move || {
        let mut session = PlannerSession::new(InquirePrompter, store, settings);
        session.run()
    })
    .await;

    match session {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            error!("session ended: {e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("session task failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn check(settings: &PlannerSettings, start: &str, end: &str) -> ExitCode {
    let parser = TimeParser::new(settings.layouts.clone(), settings.anchor);
    let checked = parser.parse(start).and_then(|(start, layout)| {
        parser
            .parse_with(end, &layout)
            .and_then(|end| interval::checked(start, end, &layout))
    });
    match checked {
        Ok(accepted) => {
            let layout = accepted.layout();
            println!(
                "{} - {} ({})",
                layout.format(&accepted.start()),
                layout.format(&accepted.end()),
                format_duration(accepted.duration())
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Invalid interval: {e}");
            ExitCode::FAILURE
        }
    }
}
