//! Thread-safe access to a simulation.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::control::RunControl;
use crate::engine::StepOutcome;
use crate::error::SimulationError;
use crate::link::LinkConfig;
use crate::metrics::MetricsSnapshot;
use crate::node::{NodeConfig, NodeStatus};
use crate::simulation::{drain_loop, NetworkSimulation, SimulationState};
use crate::topology::{NetworkConfig, TopologyInfo, TopologyKind};
use crate::traffic::TrafficConfig;

/// Shares a [`NetworkSimulation`] between threads.
///
/// A run is processed by the thread that calls [`start`](Self::start) or [`resume`](Self::resume). The simulation
/// lock is released between events, so other threads can query the status and metrics or pause and stop the run
/// while it is in progress. Reconfiguration, reset and a second concurrent run are rejected with
/// [`SimulationError::Busy`] until the run returns.
///
/// # Examples
///
/// ```rust
/// use std::thread;
/// use std::time::Duration;
///
/// use pktsim_network::{NetworkSimulation, SimulationHandle, SimulationState, TopologyKind, TrafficConfig};
///
/// let handle = SimulationHandle::new(NetworkSimulation::new(123));
/// handle.create_topology(TopologyKind::Ring, 4, 10, 100., 0.01).unwrap();
///
/// let runner = {
///     let handle = handle.clone();
///     thread::spawn(move || handle.start(TrafficConfig::default(), 1000., true))
/// };
/// while !handle.is_busy() {
///     thread::sleep(Duration::from_millis(1));
/// }
/// handle.pause();
/// runner.join().unwrap().unwrap();
/// assert_eq!(handle.state(), SimulationState::Paused);
/// ```
#[derive(Clone)]
pub struct SimulationHandle {
    sim: Arc<Mutex<NetworkSimulation>>,
    control: RunControl,
}

impl SimulationHandle {
    /// Wraps the simulation.
    pub fn new(sim: NetworkSimulation) -> Self {
        let control = sim.control().clone();
        Self {
            sim: Arc::new(Mutex::new(sim)),
            control,
        }
    }

    /// Returns the control of the wrapped simulation.
    pub fn control(&self) -> &RunControl {
        &self.control
    }

    /// Returns true if a run is being processed by some thread.
    pub fn is_busy(&self) -> bool {
        self.control.is_draining()
    }

    /// Calls the function with the locked simulation.
    pub fn with<R>(&self, f: impl FnOnce(&NetworkSimulation) -> R) -> R {
        f(&*self.sim.lock())
    }

    /// See [`NetworkSimulation::create_topology`].
    pub fn create_topology(
        &self,
        kind: TopologyKind,
        node_count: usize,
        queue_size: usize,
        bandwidth: f64,
        latency: f64,
    ) -> Result<(), SimulationError> {
        self.sim
            .lock()
            .create_topology(kind, node_count, queue_size, bandwidth, latency)
    }

    /// See [`NetworkSimulation::configure_network`].
    pub fn configure_network(
        &self,
        nodes: &[NodeConfig],
        links: &[LinkConfig],
        queue_size: usize,
    ) -> Result<(), SimulationError> {
        self.sim.lock().configure_network(nodes, links, queue_size)
    }

    /// See [`NetworkSimulation::configure`].
    pub fn configure(&self, config: &NetworkConfig) -> Result<(), SimulationError> {
        self.sim.lock().configure(config)
    }

    /// Prepares a new run and processes it in the calling thread until it ends, fails, or is paused or stopped.
    pub fn start(&self, traffic: TrafficConfig, duration: f64, realtime: bool) -> Result<(), SimulationError> {
        {
            let mut sim = self.sim.lock();
            sim.schedule_run(traffic, duration, realtime)?;
            sim.begin_drain()?;
        }
        drain_loop(&*self.sim, &self.control)
    }

    /// Continues a paused run in the calling thread.
    pub fn resume(&self) -> Result<(), SimulationError> {
        {
            let mut sim = self.sim.lock();
            if !sim.prepare_resume()? {
                return Ok(());
            }
            sim.begin_drain()?;
        }
        drain_loop(&*self.sim, &self.control)
    }

    /// Suspends the run.
    ///
    /// A processing thread returns after the current event. The call blocks until it does, so the run
    /// can be resumed right away.
    pub fn pause(&self) {
        self.sim.lock().pause();
        self.control.wait_drained();
    }

    /// Ends the run and finalizes its metrics.
    ///
    /// Like [`pause`](Self::pause), blocks until a processing thread returns after the current event.
    pub fn stop(&self) {
        self.sim.lock().stop();
        self.control.wait_drained();
    }

    /// See [`NetworkSimulation::reset`].
    pub fn reset(&self) -> Result<(), SimulationError> {
        self.sim.lock().reset()
    }

    /// See [`NetworkSimulation::step`].
    pub fn step(&self) -> Result<StepOutcome, SimulationError> {
        self.sim.lock().step()
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> SimulationState {
        self.sim.lock().state()
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> f64 {
        self.sim.lock().time()
    }

    /// Returns the number of pending events.
    pub fn pending_events(&self) -> usize {
        self.sim.lock().pending_events()
    }

    /// Returns the next hop from `source` to `destination`.
    pub fn next_hop(&self, source: &str, destination: &str) -> Option<String> {
        self.sim.lock().next_hop(source, destination).map(str::to_string)
    }

    /// Returns the current state of all nodes.
    pub fn status(&self) -> Vec<NodeStatus> {
        self.sim.lock().status()
    }

    /// Returns the metrics of the current or last run.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.sim.lock().metrics()
    }

    /// Returns the description of the configured nodes and links.
    pub fn topology_info(&self) -> TopologyInfo {
        self.sim.lock().topology_info()
    }
}
