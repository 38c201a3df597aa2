use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use clap::Parser;
use env_logger::Builder;
use log::info;
use serde_json::json;

use pktsim_network::defaults::{
    DEFAULT_BANDWIDTH, DEFAULT_DURATION, DEFAULT_LATENCY, DEFAULT_NODE_COUNT, DEFAULT_PACKET_RATE,
    DEFAULT_QUEUE_SIZE, DEFAULT_SEED,
};
use pktsim_network::{NetworkSimulation, ScenarioConfig, SimulationHandle, TopologyConfig, TrafficConfig};

/// Runs a packet-level simulation of a network and prints node status and metrics as JSON
#[derive(Parser, Debug)]
#[clap(about, long_about = None)]
struct Args {
    /// YAML scenario file, other options are ignored if set
    #[clap(long)]
    scenario: Option<PathBuf>,

    /// Topology type: ring, mesh, star or line
    #[clap(long, default_value = "ring")]
    topology: String,

    /// Number of nodes
    #[clap(long = "nodes", default_value_t = DEFAULT_NODE_COUNT)]
    node_count: usize,

    /// Queue capacity of each node
    #[clap(long, default_value_t = DEFAULT_QUEUE_SIZE)]
    queue_size: usize,

    /// Link bandwidth
    #[clap(long, default_value_t = DEFAULT_BANDWIDTH)]
    bandwidth: f64,

    /// Link latency in seconds
    #[clap(long, default_value_t = DEFAULT_LATENCY)]
    latency: f64,

    /// Packets generated per second by each node
    #[clap(long, default_value_t = DEFAULT_PACKET_RATE)]
    rate: f64,

    /// Traffic pattern: constant, poisson or bursty
    #[clap(long, default_value = "constant")]
    pattern: String,

    /// Duration of the run in seconds
    #[clap(long, default_value_t = DEFAULT_DURATION)]
    duration: f64,

    /// Pace the run by wall-clock time
    #[clap(long)]
    realtime: bool,

    /// Interval in seconds between progress reports of a realtime run
    #[clap(long, default_value_t = 1.0)]
    progress: f64,

    /// Random seed
    #[clap(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

impl Args {
    fn scenario(&self) -> anyhow::Result<ScenarioConfig> {
        if let Some(path) = &self.scenario {
            return Ok(ScenarioConfig::from_file(path)?);
        }
        Ok(ScenarioConfig {
            seed: self.seed,
            duration: self.duration,
            realtime: self.realtime,
            traffic: TrafficConfig::new(self.rate, self.pattern.parse()?),
            network: None,
            topology: Some(TopologyConfig {
                kind: self.topology.parse()?,
                nodes: self.node_count,
                queue_size: self.queue_size,
                bandwidth: self.bandwidth,
                latency: self.latency,
            }),
        })
    }
}

fn report(sim: &NetworkSimulation) -> serde_json::Value {
    json!({
        "state": sim.state(),
        "time": sim.time(),
        "status": sim.status(),
        "metrics": sim.metrics(),
    })
}

fn run_realtime(sim: NetworkSimulation, scenario: &ScenarioConfig, progress: f64) -> anyhow::Result<serde_json::Value> {
    let handle = SimulationHandle::new(sim);
    let runner = {
        let handle = handle.clone();
        let traffic = scenario.traffic.clone();
        let duration = scenario.duration;
        thread::spawn(move || handle.start(traffic, duration, true))
    };
    let interval = Duration::try_from_secs_f64(progress).unwrap_or(Duration::from_secs(1));
    while !runner.is_finished() {
        thread::sleep(interval);
        let metrics = handle.metrics();
        println!(
            "{}",
            json!({"time": handle.time(), "delivered": metrics.delivered, "dropped": metrics.dropped})
        );
    }
    runner
        .join()
        .map_err(|_| anyhow!("simulation thread panicked"))??;
    Ok(handle.with(report))
}

fn main() -> anyhow::Result<()> {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let args = Args::parse();
    let scenario = args.scenario()?;
    let mut sim = scenario.build()?;
    info!(
        "Network: {} nodes, {} links",
        sim.topology().node_count(),
        sim.topology().link_count()
    );

    let start = Instant::now();
    let output = if scenario.realtime {
        run_realtime(sim, &scenario, args.progress)?
    } else {
        sim.start(scenario.traffic.clone(), scenario.duration, false)?;
        report(&sim)
    };
    info!("Finished in {:.2?}", start.elapsed());

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
