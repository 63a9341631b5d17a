//! `sm-tree`: load a session snapshot, run the session manager over it and
//! print the resulting tree and inputs list.

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use sm_core::{GraphFacade, MemoryGraph, NodeId, SessionConfig, SessionSnapshot};
use sm_editor::{NewFolder, SessionManager};
use std::path::PathBuf;
use std::time::Instant;

/// Print the session tree of a snapshot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Session snapshot (`.json`, otherwise MessagePack)
    #[arg(value_name = "SESSION")]
    session: PathBuf,

    /// Session manager settings (JSON)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// View this node before printing
    #[arg(long = "view", value_name = "NODE")]
    view: Option<String>,

    /// Put the viewed node into a new folder: empty, move or copy
    #[arg(long = "new-folder", value_name = "MODE")]
    new_folder: Option<String>,

    /// Print JSON instead of an outline
    #[arg(long = "json")]
    json: bool,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbosity: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = match args.verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = match &args.config {
        Some(path) => SessionConfig::load(path).map_err(|e| anyhow!(e))?,
        None => SessionConfig::default(),
    };
    let snapshot = SessionSnapshot::load(&args.session).map_err(|e| anyhow!(e))?;
    let mut graph = MemoryGraph::from_snapshot(&snapshot)
        .with_context(|| format!("cannot build session from {}", args.session.display()))?;
    if graph.view_node().is_none() {
        bail!("{} has no view node", args.session.display());
    }

    let mut manager = SessionManager::new(config);
    manager.activate(&mut graph);
    settle(&mut graph, &mut manager);

    if let Some(name) = &args.view {
        let node = NodeId::intern(name);
        graph
            .set_view_node(node)
            .with_context(|| format!("cannot view {name}"))?;
        settle(&mut graph, &mut manager);
    }

    if let Some(mode) = &args.new_folder {
        let mode = NewFolder::from_name(mode)
            .ok_or_else(|| anyhow!("unknown folder mode '{mode}' (empty, move, copy)"))?;
        match manager.new_folder(&mut graph, mode) {
            Some(folder) => log::info!("created {folder}"),
            None => log::warn!("folder refused"),
        }
        settle(&mut graph, &mut manager);
    }

    for (title, message) in graph.alerts() {
        log::warn!("{title}: {message}");
    }
    for line in graph.feedback() {
        log::info!("{line}");
    }

    if args.json {
        let out = serde_json::json!({
            "view": graph.view_node().map(|n| n.to_string()),
            "tree": manager.tree.outline(),
            "inputs": manager.inputs.texts(),
            "nav": {
                "label": manager.nav().label,
                "previous": manager.nav().has_previous,
                "next": manager.nav().has_next,
            },
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in manager.tree.outline() {
            println!("{line}");
        }
        if let Some(owner) = manager.inputs.owner() {
            println!();
            println!("inputs of {}:", graph.display_name(owner));
            for (i, text) in manager.inputs.texts().iter().enumerate() {
                println!("  {i}: {text}");
            }
        }
    }
    Ok(())
}

/// Deliver pending events and run every debounced action.
fn settle(graph: &mut MemoryGraph, manager: &mut SessionManager) {
    let config = manager.config();
    let horizon = config
        .inputs_debounce()
        .max(config.tree_update_delay())
        .max(config.folder_sort_delay());
    for _ in 0..32 {
        let events = graph.drain_events();
        if events.is_empty() && !manager.has_pending_timers() {
            return;
        }
        for event in &events {
            manager.handle_event(graph, event);
        }
        manager.poll_timers(graph, Instant::now() + horizon);
    }
    log::warn!("session did not settle");
}
