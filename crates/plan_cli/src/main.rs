mod overrides;
mod report;
mod watch;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use plan_core::{
    plan_targets, BuffSnapshot, CharacterId, Debouncer, GameData, InventorySnapshot, Loadout,
    TrialEstimator, YieldFit, Z_99,
};
use plan_world::{load_content, load_inventory, load_loadout, parse_target, TargetStore};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "plan_cli", about = "Material requirement planner")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    #[arg(long = "content", global = true, default_value = "./content")]
    content_dir: String,
    /// Inventory snapshot JSON. Without it everything is planned from scratch.
    #[arg(long, global = true)]
    inventory: Option<PathBuf>,
    /// Drink slots and community buffs JSON.
    #[arg(long, global = true)]
    loadout: Option<PathBuf>,
    /// Directory holding one target file per character.
    #[arg(long = "store", global = true, default_value = "./targets")]
    store_dir: PathBuf,
    #[arg(long, global = true, default_value = "default")]
    character: String,
    /// Override a constant, e.g. `--set artisan_tea_bonus=0.12`. Repeatable.
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    overrides: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print required, owned, shortage and surplus for the active targets.
    Plan,
    /// Actions needed to collect `target` items at 99 % confidence.
    Trials {
        #[arg(long)]
        mu: f64,
        #[arg(long)]
        target: f64,
        #[arg(long, value_enum, default_value_t = FitArg::PowerLaw)]
        fit: FitArg,
        #[arg(long, default_value_t = Z_99)]
        z: f64,
    },
    /// Edit the persisted target list of `--character`.
    Targets {
        #[command(subcommand)]
        action: TargetsCommand,
    },
    /// Recompute the plan each time the inventory file changes.
    Watch {
        #[arg(long, default_value_t = 250)]
        poll_ms: u64,
        /// Exit after this many recomputes.
        #[arg(long)]
        max_runs: Option<u64>,
    },
}

#[derive(Subcommand)]
enum TargetsCommand {
    List,
    /// Add a target or replace its count. Negative item counts declare
    /// stock held elsewhere.
    Add {
        name: String,
        #[arg(allow_negative_numbers = true, value_parser = parse_count)]
        count: f64,
    },
    /// Change the count of an existing target.
    Set {
        name: String,
        #[arg(allow_negative_numbers = true, value_parser = parse_count)]
        count: f64,
    },
    Remove { name: String },
    Clear,
    /// Include or exclude a single target.
    Toggle { name: String },
    /// Include or exclude every target in a category.
    Category {
        name: String,
        #[arg(action = clap::ArgAction::Set, value_parser = clap::builder::BoolishValueParser::new())]
        enabled: bool,
    },
}

/// Target counts must be finite; `nan` and `inf` would not survive the JSON
/// target file.
fn parse_count(raw: &str) -> Result<f64, String> {
    let count: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if !count.is_finite() {
        return Err(format!("'{raw}' is not a finite number"));
    }
    Ok(count)
}

#[derive(Clone, Copy, ValueEnum)]
enum FitArg {
    PowerLaw,
    Linear,
}

impl From<FitArg> for YieldFit {
    fn from(fit: FitArg) -> Self {
        match fit {
            FitArg::PowerLaw => YieldFit::power_law(),
            FitArg::Linear => YieldFit::linear(),
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn load_data(global: &GlobalArgs) -> Result<GameData> {
    let mut data = load_content(&global.content_dir)?;
    let overrides = overrides::parse_overrides(&global.overrides)?;
    overrides::apply_overrides(&mut data.constants, &overrides)?;
    Ok(data)
}

fn load_owned(path: Option<&Path>, data: &GameData) -> Result<InventorySnapshot> {
    match path {
        Some(path) => load_inventory(path, data),
        None => Ok(InventorySnapshot::new()),
    }
}

fn render_current_plan(
    data: &GameData,
    inventory: &InventorySnapshot,
    loadout: &Loadout,
    store: &TargetStore,
    character: &CharacterId,
) -> Result<String> {
    let targets = store.load(character)?;
    let plan = plan_targets(&targets, inventory, data, loadout)?;
    let buffs = BuffSnapshot::capture(data, inventory, loadout);
    let estimator = TrialEstimator::from_constants(&data.constants);
    Ok(report::render_plan(&plan, data, &buffs, &estimator))
}

fn plan(global: &GlobalArgs) -> Result<()> {
    let data = load_data(global)?;
    let inventory = load_owned(global.inventory.as_deref(), &data)?;
    let loadout = load_loadout(global.loadout.as_deref())?;
    let store = TargetStore::new(&global.store_dir);
    let character = CharacterId::new(&global.character);
    print!(
        "{}",
        render_current_plan(&data, &inventory, &loadout, &store, &character)?
    );
    Ok(())
}

fn trials(mu: f64, target: f64, fit: FitArg, z: f64) -> Result<()> {
    let estimator = TrialEstimator::new(fit.into(), z);
    let Some(count) = estimator.estimate(mu, target) else {
        bail!("--mu must be a positive number, got {mu}");
    };
    println!("{count}");
    Ok(())
}

fn targets(global: &GlobalArgs, action: TargetsCommand) -> Result<()> {
    let data = load_data(global)?;
    let store = TargetStore::new(&global.store_dir);
    let character = CharacterId::new(&global.character);
    let mut list = store.load(&character)?;

    match action {
        TargetsCommand::List => {
            print!("{}", report::render_targets(&list, &data));
            return Ok(());
        }
        TargetsCommand::Add { name, count } => {
            let kind = parse_target(&data, &name)?;
            let described = report::describe_target(&kind, &data);
            if !list.upsert(kind, count) {
                bail!("count must be a finite number, got {count}");
            }
            println!(
                "added {} x {described}",
                plan_core::format_number(count.abs())
            );
        }
        TargetsCommand::Set { name, count } => {
            let kind = parse_target(&data, &name)?;
            if !list.set_count(&kind, count) {
                bail!("'{name}' is not in the target list");
            }
        }
        TargetsCommand::Remove { name } => {
            let kind = parse_target(&data, &name)?;
            if !list.remove(&kind) {
                bail!("'{name}' is not in the target list");
            }
        }
        TargetsCommand::Clear => list.clear(),
        TargetsCommand::Toggle { name } => {
            let kind = parse_target(&data, &name)?;
            let Some(enabled) = list.toggle(&kind) else {
                bail!("'{name}' is not in the target list");
            };
            println!("{kind}: {}", if enabled { "included" } else { "excluded" });
        }
        TargetsCommand::Category { name, enabled } => {
            let category = report::parse_category(&data, &name)
                .with_context(|| format!("unknown category '{name}'"))?;
            list.set_category(category, enabled);
        }
    }
    store.save(&character, &list)
}

fn watch(global: &GlobalArgs, poll_ms: u64, max_runs: Option<u64>) -> Result<()> {
    let Some(inventory_path) = global.inventory.clone() else {
        bail!("watch needs --inventory");
    };
    let data = load_data(global)?;
    let loadout = load_loadout(global.loadout.as_deref())?;
    let store = TargetStore::new(&global.store_dir);
    let character = CharacterId::new(&global.character);

    let recompute = |path: &Path| -> Result<()> {
        let inventory = load_inventory(path, &data)?;
        print!(
            "{}",
            render_current_plan(&data, &inventory, &loadout, &store, &character)?
        );
        Ok(())
    };
    recompute(&inventory_path)?;

    let inventory_watch = watch::InventoryWatch::new(
        inventory_path,
        Debouncer::from_millis(data.constants.debounce_ms),
    );
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("building tokio runtime")?;
    runtime.block_on(watch::run(
        inventory_watch,
        Duration::from_millis(poll_ms.max(1)),
        max_runs,
        recompute,
    ))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Plan => plan(&cli.global),
        Commands::Trials { mu, target, fit, z } => trials(mu, target, fit, z),
        Commands::Targets { action } => targets(&cli.global, action),
        Commands::Watch { poll_ms, max_runs } => watch(&cli.global, poll_ms, max_runs),
    }
}
