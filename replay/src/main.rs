//! Replays a scripted stream of inventory, craft and acquisition signals
//! against a set of craft lists and prints what happened.

mod scenario;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tally_core::services::local::LocalServices;
use tally_core::{
    FilterConfiguration, InventorySignal, JsonStore, Reconciler, ReconcilerService, SaveWait,
    SignalOutcome,
};
use tally_types::formatting::{format_pct_ratio, format_progress};
use tracing_subscriber::EnvFilter;

use scenario::{Scenario, ScenarioError};

#[derive(Parser)]
#[command(version, about = "Replay inventory signals against craft lists")]
struct Cli {
    /// Scenario file (TOML)
    scenario: PathBuf,

    /// Persist settings, lists and inventories into this directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Seed the default lists before replaying
    #[arg(long)]
    defaults: bool,
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    // If TALLY_LOG_PATH is set, append to that file
    if let Ok(path) = std::env::var("TALLY_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Replay failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ScenarioError> {
    let scenario = Scenario::load(&cli.scenario)?;
    tracing::info!(
        path = %cli.scenario.display(),
        lists = scenario.lists.len(),
        events = scenario.events.len(),
        "Loaded scenario"
    );

    let local = LocalServices::new();
    for character in scenario.characters {
        local.characters.add(character);
    }
    local.characters.set_active(scenario.active_character);
    for item in scenario.inventory {
        local.inventories.insert(item);
    }
    let services = match &cli.data_dir {
        Some(dir) => local.services_with_store(Arc::new(JsonStore::in_dir(dir))),
        None => local.services(),
    };

    let mut settings = scenario.settings;
    settings.first_run = cli.defaults;
    let mut reconciler = Reconciler::new(settings, Vec::new(), services);
    setup_lists(&mut reconciler, &scenario.lists);

    let (service, handle) = ReconcilerService::new(reconciler, Duration::from_secs(1));
    let task = tokio::spawn(service.run());

    for (idx, signal) in scenario.events.into_iter().enumerate() {
        if let InventorySignal::InventoryChanged { changes, .. } = &signal {
            local.inventories.apply_changes(changes);
        }
        let outcome = handle
            .dispatch(signal)
            .await
            .map_err(ScenarioError::Service)?;
        println!("#{:<3} {}", idx + 1, describe(&outcome));
    }

    let lists = handle.lists().await.map_err(ScenarioError::Service)?;
    println!();
    print_lists(&lists);

    for message in local.chat.messages() {
        println!("chat: {message}");
    }
    let checks = local.market.requests();
    if !checks.is_empty() {
        println!("price checks: {}", checks.len());
    }

    let report = handle.shutdown().await.map_err(ScenarioError::Service)?;
    if let SaveWait::Failed(e) = &report.inventories {
        tracing::warn!(error = %e, "Final inventory save failed");
    }
    let _ = task.await;
    Ok(())
}

fn setup_lists(reconciler: &mut Reconciler, specs: &[scenario::ListSpec]) {
    let toggles = reconciler.toggles().clone();
    let (lists, columns) = reconciler.lists_and_columns();
    for spec in specs {
        let key = if spec.ephemeral {
            lists.add_ephemeral_craft_list(&spec.name, columns)
        } else {
            lists.add_new_craft_list(Some(&spec.name), columns)
        };
        let Some(list) = lists.get_mut(&key) else {
            continue;
        };
        list.craft_list.mode = spec.mode;
        for item in &spec.required {
            list.craft_list
                .add_required(item.item_id, item.quality, item.quantity);
        }
        for reason in &spec.untracked {
            toggles.set_tracking(*reason, list, false);
        }
        if spec.active {
            lists.set_active_craft_list(Some(&key));
        }
    }
}

fn describe(outcome: &SignalOutcome) -> String {
    match outcome {
        SignalOutcome::Craft(reconciliation) => format!("craft: {reconciliation:?}"),
        SignalOutcome::Inventory(sync) => format!(
            "inventory: {} cached, {} price checks, {} newly seen",
            sync.snapshot_items, sync.price_checks, sync.newly_seen
        ),
        SignalOutcome::Configuration(sync) => format!("settings: {sync:?}"),
        SignalOutcome::Unlocks(stored) => format!("unlocks stored: {stored}"),
        SignalOutcome::Tick(tick) => format!("tick: {tick:?}"),
    }
}

fn print_lists(lists: &[FilterConfiguration]) {
    for list in lists.iter().filter(|l| l.craft_list.has_requirements()) {
        let (done, total) = list.craft_list.totals();
        let status = if list.craft_list.is_completed() {
            "complete"
        } else {
            "in progress"
        };
        println!(
            "{} ({:?}, {status}, {})",
            list.name,
            list.craft_list.mode,
            format_pct_ratio(done, total)
        );
        for row in list.craft_list.progress() {
            println!(
                "  {:>8} {}  {}",
                row.key.item_id,
                row.key.quality,
                format_progress(row.fulfilled, row.required)
            );
        }
    }
}
