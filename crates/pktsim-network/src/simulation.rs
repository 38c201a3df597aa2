//! Simulation lifecycle and the drain loop.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;

use pktsim_core::{log_debug, log_info, log_warn, EventQueue, SimRng};

use crate::control::RunControl;
use crate::defaults::DEFAULT_SEED;
use crate::engine::{Engine, NetworkEvent, StepOutcome};
use crate::error::SimulationError;
use crate::link::LinkConfig;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::node::{NodeConfig, NodeStatus};
use crate::routing::{RoutingAlgorithm, RoutingTable, ShortestPathDijkstra};
use crate::topology::{generate, NetworkConfig, Topology, TopologyInfo, TopologyKind};
use crate::traffic::TrafficConfig;

const NAME: &str = "sim";

/// Lifecycle state of a simulation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationState {
    /// Nothing is configured.
    Idle,
    /// The network is configured, no run was started since.
    Configured,
    /// A run is in progress.
    Running,
    /// A run is suspended, pending events are kept.
    Paused,
    /// The run is over and its metrics are finalized.
    Stopped,
}

/// Packet-switched network simulation.
///
/// Owns the topology, the routing table, the event queue and the metrics of a run. Independent
/// instances do not share any state.
///
/// # Examples
///
/// ```rust
/// use pktsim_network::{NetworkSimulation, SimulationState, TopologyKind, TrafficConfig, TrafficPattern};
///
/// let mut sim = NetworkSimulation::new(123);
/// sim.create_topology(TopologyKind::Line, 3, 10, 100., 0.01).unwrap();
/// assert_eq!(sim.next_hop("Node0", "Node2"), Some("Node1"));
///
/// sim.start(TrafficConfig::new(20., TrafficPattern::Poisson), 5., false).unwrap();
/// assert_eq!(sim.state(), SimulationState::Stopped);
/// assert_eq!(sim.time(), 5.);
/// let metrics = sim.metrics();
/// assert!(metrics.delivered > 0);
/// assert!(metrics.packet_loss >= 0. && metrics.packet_loss <= 1.);
/// ```
pub struct NetworkSimulation {
    topology: Topology,
    routing: RoutingTable,
    algorithm: Box<dyn RoutingAlgorithm>,
    events: EventQueue<NetworkEvent>,
    metrics: Metrics,
    rng: SimRng,
    traffic: TrafficConfig,
    duration: f64,
    realtime: bool,
    next_packet_id: u64,
    state: SimulationState,
    control: RunControl,
}

impl Default for NetworkSimulation {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl NetworkSimulation {
    /// Creates a simulation with specified random seed which routes packets over shortest paths.
    pub fn new(seed: u64) -> Self {
        Self::with_routing(seed, Box::new(ShortestPathDijkstra))
    }

    /// Creates a simulation with specified random seed and routing algorithm.
    pub fn with_routing(seed: u64, algorithm: Box<dyn RoutingAlgorithm>) -> Self {
        Self {
            topology: Topology::new(),
            routing: RoutingTable::new(),
            algorithm,
            events: EventQueue::new(),
            metrics: Metrics::new(),
            rng: SimRng::new(seed),
            traffic: TrafficConfig::default(),
            duration: 0.,
            realtime: false,
            next_packet_id: 0,
            state: SimulationState::Idle,
            control: RunControl::new(),
        }
    }

    /// Returns the control used to pause or stop a run from another thread.
    pub fn control(&self) -> &RunControl {
        &self.control
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> f64 {
        self.events.time()
    }

    /// Returns the random seed.
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Returns the configured topology with current node queues and counters.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Returns the current routing table.
    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing
    }

    /// Returns the metrics of the current or last run.
    pub fn aggregator(&self) -> &Metrics {
        &self.metrics
    }

    /// Returns the traffic parameters of the current or last run.
    pub fn traffic(&self) -> &TrafficConfig {
        &self.traffic
    }

    /// Returns the duration of the current or last run.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Returns true if the current or last run is paced by wall-clock time.
    pub fn is_realtime(&self) -> bool {
        self.realtime
    }

    /// Returns the number of pending events.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Returns the number of packets generated in the current or last run.
    pub fn packets_created(&self) -> u64 {
        self.next_packet_id
    }

    /// Returns the time of the next pending event.
    pub fn next_event_time(&self) -> Option<f64> {
        self.events.peek().map(|event| event.time)
    }

    /// Returns the name of the node to which a packet is forwarded from `source` to reach `destination`.
    pub fn next_hop(&self, source: &str, destination: &str) -> Option<&str> {
        let src = self.topology.node_id(source)?;
        let dst = self.topology.node_id(destination)?;
        self.routing.next_hop(src, dst).map(|hop| self.topology.node_name(hop))
    }

    fn ensure_not_draining(&self) -> Result<(), SimulationError> {
        if self.control.is_draining() {
            Err(SimulationError::Busy)
        } else {
            Ok(())
        }
    }

    /// Replaces the network with specified nodes and links and recomputes the routing table.
    ///
    /// Nodes without explicit `queue_size` get `queue_size` as their queue capacity. On error the previous
    /// network is kept. On success, pending events and the results of the previous run are discarded.
    pub fn configure_network(
        &mut self,
        nodes: &[NodeConfig],
        links: &[LinkConfig],
        queue_size: usize,
    ) -> Result<(), SimulationError> {
        self.ensure_not_draining()?;
        let topology = Topology::build(nodes, links, queue_size)?;
        self.routing = self.algorithm.compute(&topology);
        self.topology = topology;
        self.events.clear();
        self.metrics = Metrics::new();
        self.next_packet_id = 0;
        self.state = SimulationState::Configured;
        log_info!(
            self.time(),
            NAME,
            "configured network: {}",
            json!({
                "nodes": self.topology.node_count(),
                "links": self.topology.link_count(),
                "routes": self.routing.len(),
            })
        );
        Ok(())
    }

    /// Same as [`configure_network`](Self::configure_network) for a network description.
    pub fn configure(&mut self, config: &NetworkConfig) -> Result<(), SimulationError> {
        self.configure_network(&config.nodes, &config.links, config.queue_size)
    }

    /// Configures a canonical topology of `node_count` nodes named `Node0`, `Node1`, ...
    pub fn create_topology(
        &mut self,
        kind: TopologyKind,
        node_count: usize,
        queue_size: usize,
        bandwidth: f64,
        latency: f64,
    ) -> Result<(), SimulationError> {
        self.ensure_not_draining()?;
        log_debug!(
            self.time(),
            NAME,
            "creating topology: {}",
            json!({"type": kind.as_str(), "nodes": node_count, "bandwidth": bandwidth, "latency": latency})
        );
        self.configure(&generate(kind, node_count, queue_size, bandwidth, latency))
    }

    /// Prepares a new run without processing any events.
    ///
    /// Resets metrics, packet ids, node queues and counters, recomputes the routing table and schedules the first
    /// packet generation of each node along with the end of the run at `duration`. The run can then be advanced
    /// with [`step`](Self::step) or [`run`](Self::run).
    pub fn schedule_run(
        &mut self,
        traffic: TrafficConfig,
        duration: f64,
        realtime: bool,
    ) -> Result<(), SimulationError> {
        self.ensure_not_draining()?;
        if self.state == SimulationState::Idle {
            return Err(SimulationError::config("network is not configured"));
        }
        traffic.validate()?;
        if !(duration >= 0.) || !duration.is_finite() {
            return Err(SimulationError::config(format!(
                "invalid duration {}, must be >= 0",
                duration
            )));
        }

        self.routing = self.algorithm.compute(&self.topology);
        self.topology.reset_nodes();
        self.events.clear();
        self.metrics = Metrics::new();
        self.next_packet_id = 0;
        self.rng.reseed();
        self.traffic = traffic;
        self.duration = duration;
        self.realtime = realtime;

        let node_count = self.topology.node_count();
        let mut engine = self.engine();
        for node in 0..node_count {
            engine.schedule_generation(node)?;
        }
        self.events.push(duration, NetworkEvent::SimulationEnd)?;
        self.state = SimulationState::Running;
        log_info!(
            self.time(),
            NAME,
            "scheduled run: {}",
            json!({
                "duration": duration,
                "packet_rate": self.traffic.packet_rate,
                "pattern": self.traffic.pattern.as_str(),
                "realtime": realtime,
            })
        );
        Ok(())
    }

    /// Prepares a new run and processes it until its end or until it is paused or stopped via
    /// [`control`](Self::control).
    pub fn start(&mut self, traffic: TrafficConfig, duration: f64, realtime: bool) -> Result<(), SimulationError> {
        self.schedule_run(traffic, duration, realtime)?;
        self.run()
    }

    /// Processes events of the scheduled run until its end or until it is paused or stopped.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        self.begin_drain()?;
        let control = self.control.clone();
        drain_loop(self, &control)
    }

    /// Suspends the run keeping its pending events.
    ///
    /// If events are being processed, the processing returns after the current event.
    pub fn pause(&mut self) {
        match self.state {
            SimulationState::Running => {
                self.control.pause();
                self.state = SimulationState::Paused;
                log_info!(self.time(), NAME, "paused");
            }
            state => log_warn!(self.time(), NAME, "cannot pause simulation in {:?} state", state),
        }
    }

    /// Continues a paused run.
    pub fn resume(&mut self) -> Result<(), SimulationError> {
        if self.prepare_resume()? {
            self.run()
        } else {
            Ok(())
        }
    }

    /// Checks that a paused run can be resumed, logs a warning if there is nothing to resume.
    pub(crate) fn prepare_resume(&mut self) -> Result<bool, SimulationError> {
        self.ensure_not_draining()?;
        if self.state == SimulationState::Paused {
            Ok(true)
        } else {
            log_warn!(self.time(), NAME, "cannot resume simulation in {:?} state", self.state);
            Ok(false)
        }
    }

    /// Ends the run and finalizes its metrics. Has no effect on a stopped simulation.
    ///
    /// If events are being processed, the processing returns after the current event.
    pub fn stop(&mut self) {
        match self.state {
            SimulationState::Running | SimulationState::Paused => {
                self.control.request_stop();
                self.finish_run();
            }
            SimulationState::Stopped => {}
            state => log_warn!(self.time(), NAME, "cannot stop simulation in {:?} state", state),
        }
    }

    fn finish_run(&mut self) {
        self.metrics.finalize();
        self.state = SimulationState::Stopped;
        log_info!(
            self.time(),
            NAME,
            "stopped: {}",
            json!({
                "delivered": self.metrics.delivered(),
                "dropped": self.metrics.dropped(),
                "latency": self.metrics.mean_latency(),
            })
        );
    }

    /// Discards the network, the routing table, pending events and metrics.
    pub fn reset(&mut self) -> Result<(), SimulationError> {
        self.ensure_not_draining()?;
        let seed = self.rng.seed();
        self.topology = Topology::new();
        self.routing = RoutingTable::new();
        self.events = EventQueue::new();
        self.metrics = Metrics::new();
        self.rng = SimRng::new(seed);
        self.traffic = TrafficConfig::default();
        self.duration = 0.;
        self.realtime = false;
        self.next_packet_id = 0;
        self.state = SimulationState::Idle;
        log_info!(self.time(), NAME, "reset");
        Ok(())
    }

    /// Processes the next event of the run.
    ///
    /// Fails with [`SimulationError::EmptyQueue`] if there are no pending events. An error raised by event
    /// processing stops the run.
    pub fn step(&mut self) -> Result<StepOutcome, SimulationError> {
        self.ensure_not_draining()?;
        match self.state {
            SimulationState::Running | SimulationState::Paused => self.dispatch(),
            state => Err(SimulationError::config(format!("no run in progress in {:?} state", state))),
        }
    }

    /// Returns the current state of all nodes in configuration order.
    pub fn status(&self) -> Vec<NodeStatus> {
        self.topology.status()
    }

    /// Returns the metrics of the current or last run.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.time())
    }

    /// Returns the description of the configured nodes and links.
    pub fn topology_info(&self) -> TopologyInfo {
        self.topology.info()
    }

    fn engine(&mut self) -> Engine<'_> {
        Engine {
            topology: &mut self.topology,
            routing: &self.routing,
            events: &mut self.events,
            metrics: &mut self.metrics,
            rng: &mut self.rng,
            next_packet_id: &mut self.next_packet_id,
            traffic: &self.traffic,
        }
    }

    fn dispatch(&mut self) -> Result<StepOutcome, SimulationError> {
        let event = self.events.pop()?;
        let result = match event.data {
            NetworkEvent::PacketGeneration { node } => self.engine().on_generation(node),
            NetworkEvent::PacketArrival { node, packet } => self.engine().on_arrival(node, packet),
            NetworkEvent::SimulationEnd => {
                log_debug!(self.time(), NAME, "reached the end of the run");
                self.finish_run();
                Ok(StepOutcome::Ended)
            }
        };
        if result.is_err() && self.state != SimulationState::Stopped {
            self.finish_run();
        }
        result
    }

    pub(crate) fn begin_drain(&mut self) -> Result<(), SimulationError> {
        match self.state {
            SimulationState::Running | SimulationState::Paused => {}
            state => return Err(SimulationError::config(format!("no run in progress in {:?} state", state))),
        }
        self.control.begin_drain()?;
        if self.state == SimulationState::Paused {
            log_info!(self.time(), NAME, "resumed");
        }
        self.state = SimulationState::Running;
        Ok(())
    }

    fn finish_drain(&mut self, stop: bool) {
        if self.state != SimulationState::Running {
            return;
        }
        if stop {
            self.finish_run();
        } else {
            self.state = SimulationState::Paused;
            log_info!(self.time(), NAME, "paused");
        }
    }
}

// Drain loop ----------------------------------------------------------------------------------------------------------

/// Gives the drain loop access to the simulation for the duration of a single event.
pub(crate) trait SimAccess {
    fn with_sim<R>(&mut self, f: impl FnOnce(&mut NetworkSimulation) -> R) -> R;
}

impl SimAccess for &mut NetworkSimulation {
    fn with_sim<R>(&mut self, f: impl FnOnce(&mut NetworkSimulation) -> R) -> R {
        f(&mut **self)
    }
}

// the lock is released between events, so that the simulation can be inspected during a run
impl SimAccess for &Mutex<NetworkSimulation> {
    fn with_sim<R>(&mut self, f: impl FnOnce(&mut NetworkSimulation) -> R) -> R {
        let mut sim = self.lock();
        f(&mut *sim)
    }
}

enum Tick {
    Interrupted,
    Exhausted,
    Processed(StepOutcome),
}

/// Processes events until the run ends, fails, or is paused or stopped via `control`.
///
/// Must be called after a successful [`NetworkSimulation::begin_drain`].
pub(crate) fn drain_loop<A: SimAccess>(mut access: A, control: &RunControl) -> Result<(), SimulationError> {
    let (realtime, start_time) = access.with_sim(|sim| (sim.realtime, sim.time()));
    // maps the simulation time at loop entry to the current wall-clock time
    let start_wall = Instant::now();
    let mut processed = 0u64;

    let result = loop {
        if realtime {
            let Some(next_time) = access.with_sim(|sim| sim.next_event_time()) else {
                break Ok(Tick::Exhausted);
            };
            let wait = next_time - start_time;
            if wait > 0. {
                let deadline = Duration::try_from_secs_f64(wait)
                    .ok()
                    .and_then(|delay| start_wall.checked_add(delay));
                if !control.wait_until(deadline) {
                    break Ok(Tick::Interrupted);
                }
            }
        }
        let tick = access.with_sim(|sim| {
            if !control.is_running() {
                Ok(Tick::Interrupted)
            } else if sim.events.is_empty() {
                Ok(Tick::Exhausted)
            } else {
                sim.dispatch().map(Tick::Processed)
            }
        });
        match tick {
            Ok(Tick::Processed(outcome)) if !matches!(outcome, StepOutcome::Ended) => processed += 1,
            tick => break tick,
        }
    };

    access.with_sim(|sim| {
        let stop_requested = control.finish_drain();
        sim.finish_drain(stop_requested || matches!(result, Ok(Tick::Exhausted)));
        log_debug!(sim.time(), NAME, "processed {} events", processed);
    });
    result.map(|_| ())
}
