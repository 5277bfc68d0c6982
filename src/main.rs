use std::io;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use planner_core::models::{MilestoneStatus, NodeKind, Tree};
use planner_core::{DropPosition, EditSession, HierarchyMode};
use rocket_planner::config::{self, PlannerConfig};
use rocket_planner::sample::sample_tree;
use rocket_planner::shell::Shell;
use rocket_planner::tree_render::render_tree;

#[derive(Parser)]
#[command(name = "rplan")]
#[command(about = "Undoable editor for portfolio / program / project hierarchies")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive editing shell
    Shell {
        /// Keep portfolio children all programs or all projects
        #[arg(long, conflicts_with = "lenient")]
        strict: bool,

        /// Let a portfolio mix programs and projects
        #[arg(long)]
        lenient: bool,

        /// Number of commands kept for undo
        #[arg(long)]
        undo_depth: Option<usize>,

        /// Start from the sample portfolio instead of an empty one
        #[arg(long)]
        sample: bool,

        /// Name of the portfolio root when starting empty
        #[arg(long, default_value = "Portfolio")]
        name: String,
    },
    /// Run a scripted edit session on the sample portfolio
    Demo,
    /// Print the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

/// Initialize tracing with output to stderr so stdout stays clean for the shell
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "rocket_planner=info,planner_core=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing();

    let config = PlannerConfig::load();

    match cli.command {
        Some(Commands::Shell {
            strict,
            lenient,
            undo_depth,
            sample,
            name,
        }) => {
            let mut config = config;
            if strict {
                config.hierarchy_mode = HierarchyMode::Strict;
            } else if lenient {
                config.hierarchy_mode = HierarchyMode::Lenient;
            }
            if let Some(depth) = undo_depth {
                config.undo_depth = depth.max(1);
            }

            let tree = if sample {
                sample_tree().context("Failed to build sample portfolio")?
            } else {
                Tree::new(name)
            };
            tracing::info!(
                "Starting shell in {} mode with undo depth {}",
                config.hierarchy_mode.as_str(),
                config.undo_depth
            );

            let session = EditSession::new(tree, config.hierarchy_mode, config.undo_depth);
            let mut shell = Shell::new(session);
            shell.run(io::stdin().lock(), io::stdout().lock())?;

            if shell.session().state().dirty {
                tracing::warn!("Leaving with unsaved changes");
            }
        }
        Some(Commands::Config { save }) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&config).context("Failed to serialize config")?
            );
            if save {
                config.save()?;
                println!("Saved to {}", config::get_config_path()?.display());
            }
        }
        Some(Commands::Demo) | None => run_demo(&config)?,
    }

    Ok(())
}

/// Apply a few edits to the sample portfolio, then walk the history back.
fn run_demo(config: &PlannerConfig) -> anyhow::Result<()> {
    let tree = sample_tree().context("Failed to build sample portfolio")?;
    let mut session = EditSession::new(tree, config.hierarchy_mode, config.undo_depth);

    println!("{}", render_tree(session.tree()));

    let root = session.tree().root();
    let features = session.tree().features_in(root);
    let capabilities: Vec<_> = session
        .tree()
        .descendants(root)
        .into_iter()
        .filter(|id| session.tree().kind(*id) == Some(NodeKind::Capability))
        .collect();
    let (Some(&refund), Some(&apple_pay), Some(&wallets)) =
        (features.get(1), features.get(2), capabilities.get(1))
    else {
        anyhow::bail!("Sample portfolio is missing its features");
    };

    session.set_milestone_status(refund, 1, MilestoneStatus::InProgress)?;
    session.drop_node(refund, apple_pay, DropPosition::After)?;
    session.copy(wallets)?;
    let area = session
        .tree()
        .parent(wallets)
        .context("Wallets capability has no parent")?;
    session.paste(area)?;
    session.rename(wallets, "Digital wallets")?;

    println!("{}", render_tree(session.tree()));

    while session.state().undo_available {
        println!("undo: {}", session.state().next_undo_description);
        session.undo()?;
    }

    println!("\n{}", render_tree(session.tree()));
    Ok(())
}
