mod catalog;
mod reports;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use catalog::FileCatalog;
use emberloot_sim::{
    CancellationToken, CatalogSource, EmbeddedCatalog, GameCatalog, SimulationDraftState,
    SimulationEngine, SimulationReport,
};

#[derive(Debug, Parser)]
#[command(name = "emberloot-tester", version = "0.1.0")]
#[command(about = "Headless Monte Carlo battle simulations for Emberloot chapter nodes")]
struct Args {
    /// Chapter id to simulate
    #[arg(long)]
    chapter: Option<String>,

    /// Node id inside the chapter
    #[arg(long)]
    node: Option<String>,

    /// Player level
    #[arg(long)]
    level: Option<u32>,

    /// Number of runs in the batch
    #[arg(long)]
    iterations: Option<u32>,

    /// Deterministic seed (0 draws a fresh one)
    #[arg(long)]
    seed: Option<u64>,

    /// Monster HP multiplier
    #[arg(long)]
    hp_mult: Option<f64>,

    /// Monster attack multiplier
    #[arg(long)]
    atk_mult: Option<f64>,

    /// Monster defense multiplier
    #[arg(long)]
    def_mult: Option<f64>,

    /// Enable hard mode
    #[arg(long)]
    hard_mode: bool,

    /// Per-monster stat variance in percent
    #[arg(long)]
    variance: Option<f64>,

    /// Chance in percent that a spawned monster is promoted to elite
    #[arg(long)]
    elite_chance: Option<f64>,

    /// Draft state JSON to start from; other flags override its fields
    #[arg(long)]
    draft: Option<PathBuf>,

    /// Catalog JSON to use instead of the bundled one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// List chapters and nodes in the catalog and exit
    #[arg(long)]
    list: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json", "markdown"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(path) = args.catalog.clone() {
        let source = FileCatalog::new(path);
        log::info!("using catalog {}", source.path().display());
        run(&args, SimulationEngine::new(source)).await
    } else {
        run(&args, SimulationEngine::new(EmbeddedCatalog)).await
    }
}

async fn run<C: CatalogSource>(args: &Args, engine: SimulationEngine<C>) -> Result<()> {
    if args.list {
        let catalog = engine.catalog().context("failed to load catalog")?;
        let mut out = open_output(args.output.as_deref())?;
        write_node_list(&mut out, &catalog)?;
        out.flush()?;
        return Ok(());
    }

    let draft = build_draft(args)?;
    let quiet = args.report == "json" && args.output.is_none();
    if !quiet {
        announce_banner();
    }
    if args.verbose {
        eprintln!(
            "🧪 Simulating {}/{} at level {} for {} iterations",
            draft.chapter_id, draft.node_id, draft.player_level, draft.iterations
        );
    }

    let token = CancellationToken::new();
    let watcher = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            watcher.cancel();
        }
    });

    let start_time = Instant::now();
    let report = engine
        .simulate_async(&draft, &token)
        .await
        .with_context(|| format!("simulation of {}/{} failed", draft.chapter_id, draft.node_id))?;

    let seed = (draft.seed != 0).then_some(draft.seed);
    write_report(args, &report, seed, start_time)
}

fn announce_banner() {
    println!("{}", "🔥 Emberloot Battle Simulator".bright_cyan().bold());
    println!("{}", "=============================".cyan());
}

fn load_draft(path: &Path) -> Result<SimulationDraftState> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read draft {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse draft {}", path.display()))
}

fn build_draft(args: &Args) -> Result<SimulationDraftState> {
    let mut draft = match args.draft.as_deref() {
        Some(path) => load_draft(path)?,
        None => SimulationDraftState::default(),
    };
    if let Some(chapter) = &args.chapter {
        draft.chapter_id.clone_from(chapter);
    }
    if let Some(node) = &args.node {
        draft.node_id.clone_from(node);
    }
    if let Some(level) = args.level {
        draft.player_level = level;
    }
    if let Some(iterations) = args.iterations {
        draft.iterations = iterations;
    }
    if let Some(seed) = args.seed {
        draft.seed = seed;
    }
    if let Some(hp_mult) = args.hp_mult {
        draft.hp_mult = hp_mult;
    }
    if let Some(atk_mult) = args.atk_mult {
        draft.atk_mult = atk_mult;
    }
    if let Some(def_mult) = args.def_mult {
        draft.def_mult = def_mult;
    }
    if args.hard_mode {
        draft.hard_mode = true;
    }
    if let Some(variance) = args.variance {
        draft.stat_variance_pct = variance;
    }
    if let Some(elite_chance) = args.elite_chance {
        draft.elite_chance_pct = elite_chance;
    }
    Ok(draft)
}

fn write_node_list(out: &mut dyn Write, catalog: &GameCatalog) -> Result<()> {
    writeln!(out, "Available nodes:")?;
    for chapter in &catalog.chapters {
        writeln!(out, "  {} - {}", chapter.id, chapter.name)?;
        for node in &chapter.nodes {
            writeln!(
                out,
                "    {:10} {} (level {}, {} waves)",
                node.id,
                node.name,
                node.monster_level,
                node.waves.len()
            )?;
        }
    }
    Ok(())
}

fn write_report(
    args: &Args,
    report: &SimulationReport,
    seed: Option<u64>,
    start_time: Instant,
) -> Result<()> {
    let mut out = open_output(args.output.as_deref())?;
    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut out, report)?,
        "markdown" => reports::generate_markdown_report(&mut out, report)?,
        _ => {
            let duration = start_time.elapsed();
            reports::generate_console_report(&mut out, report, seed, duration)?;
            writeln!(out)?;
            writeln!(out, "🏁 Total time: {duration:?}")?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Buffered sink for the report: the `--output` file when given, stdout otherwise.
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let Some(path) = path else {
        return Ok(Box::new(BufWriter::new(stdout())));
    };
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}
