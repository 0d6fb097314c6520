use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use hexsettle::{
    engine::{EngineBuilder, EngineSettings},
    ledger::ResourceKind,
    scenario::ScenarioLoader,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Hex settlement economy runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/green_valley.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override snapshot interval in ticks
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Serve the HTTP API instead of running headless
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Wall-clock milliseconds per tick when serving
    #[arg(long, default_value_t = 1000)]
    tick_millis: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hexsettle=info")))
        .init();

    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let ticks = scenario.ticks(cli.ticks);
    let snapshot_interval = cli.snapshot_interval.unwrap_or(scenario.snapshot_interval_ticks);
    let snapshot_dir = cli.snapshot_dir.unwrap_or_else(|| PathBuf::from("snapshots"));

    if cli.serve {
        let runtime = Runtime::new()?;
        return runtime.block_on(web::run(WebServerConfig {
            scenario,
            ticks,
            snapshot_interval,
            snapshot_dir,
            host: cli.host,
            port: cli.port,
            tick_millis: cli.tick_millis,
        }));
    }

    let mut world = scenario.build_world()?;
    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        snapshot_interval_ticks: snapshot_interval,
        snapshot_dir,
    };
    let mut engine = EngineBuilder::new(settings).with_standard_systems().build();

    engine.run(&mut world, ticks)?;
    println!(
        "Scenario '{}' completed for {} ticks. Population: {} ({} employed), money: {:.0}",
        scenario.name,
        ticks,
        world.total_population(),
        world.employed_count(),
        world.ledger().amount(ResourceKind::Money)
    );
    println!("{}", world.ledger());
    Ok(())
}
