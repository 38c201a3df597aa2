use std::thread;
use std::time::{Duration, Instant};

use pktsim_network::{
    NetworkSimulation, SimulationError, SimulationHandle, SimulationState, TopologyKind, TrafficConfig,
    TrafficPattern,
};

fn ring_handle() -> SimulationHandle {
    let handle = SimulationHandle::new(NetworkSimulation::new(123));
    handle.create_topology(TopologyKind::Ring, 4, 10, 100., 0.01).unwrap();
    handle
}

fn wait_until_busy(handle: &SimulationHandle) {
    let start = Instant::now();
    while !handle.is_busy() {
        assert!(start.elapsed() < Duration::from_secs(10), "run did not start");
        thread::sleep(Duration::from_millis(1));
    }
}

fn spawn_run(
    handle: &SimulationHandle,
    traffic: TrafficConfig,
    duration: f64,
) -> thread::JoinHandle<Result<(), SimulationError>> {
    let handle = handle.clone();
    thread::spawn(move || handle.start(traffic, duration, true))
}

#[test]
fn handle_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SimulationHandle>();
}

#[test]
fn pause_interrupts_realtime_wait() {
    let handle = ring_handle();
    // the first packets are generated after one second
    let runner = spawn_run(&handle, TrafficConfig::new(1., TrafficPattern::Constant), 1000.);
    wait_until_busy(&handle);

    let paused_at = Instant::now();
    handle.pause();
    assert!(!handle.is_busy());
    runner.join().unwrap().unwrap();
    assert!(paused_at.elapsed() < Duration::from_millis(900));
    assert_eq!(handle.state(), SimulationState::Paused);
    assert!(!handle.is_busy());
    assert_eq!(handle.time(), 0.);
    assert_eq!(handle.pending_events(), 5);

    // resume continues the same run
    let resumer = {
        let handle = handle.clone();
        thread::spawn(move || handle.resume())
    };
    wait_until_busy(&handle);
    assert_eq!(handle.state(), SimulationState::Running);
    handle.stop();
    resumer.join().unwrap().unwrap();
    assert_eq!(handle.state(), SimulationState::Stopped);
    assert!(!handle.is_busy());
}

#[test]
fn resume_right_after_pause() {
    let handle = ring_handle();
    let runner = spawn_run(&handle, TrafficConfig::new(1., TrafficPattern::Constant), 1000.);
    wait_until_busy(&handle);

    handle.pause();
    for _ in 0..3 {
        let resumer = {
            let handle = handle.clone();
            thread::spawn(move || handle.resume())
        };
        wait_until_busy(&handle);
        handle.pause();
        resumer.join().unwrap().unwrap();
        assert_eq!(handle.state(), SimulationState::Paused);
    }
    runner.join().unwrap().unwrap();

    // a stopped run can be restarted right away
    let runner = spawn_run(&handle, TrafficConfig::new(1., TrafficPattern::Constant), 1000.);
    wait_until_busy(&handle);
    handle.stop();
    handle
        .start(TrafficConfig::new(10., TrafficPattern::Constant), 0.5, false)
        .unwrap();
    runner.join().unwrap().unwrap();
    assert_eq!(handle.state(), SimulationState::Stopped);
    assert_eq!(handle.time(), 0.5);
}

#[test]
fn configuration_is_rejected_while_running() {
    let handle = ring_handle();
    let runner = spawn_run(&handle, TrafficConfig::new(1., TrafficPattern::Constant), 1000.);
    wait_until_busy(&handle);

    assert_eq!(
        handle.create_topology(TopologyKind::Mesh, 3, 10, 100., 0.01),
        Err(SimulationError::Busy)
    );
    assert_eq!(handle.configure(&Default::default()), Err(SimulationError::Busy));
    assert_eq!(handle.reset(), Err(SimulationError::Busy));
    assert_eq!(handle.step(), Err(SimulationError::Busy));
    assert_eq!(
        handle.start(TrafficConfig::default(), 1., false),
        Err(SimulationError::Busy)
    );
    // queries are served during the run
    assert_eq!(handle.status().len(), 4);
    assert_eq!(handle.topology_info().links.len(), 4);
    assert_eq!(handle.next_hop("Node0", "Node3"), Some("Node1".to_string()));

    handle.stop();
    runner.join().unwrap().unwrap();
    assert_eq!(handle.state(), SimulationState::Stopped);
    assert!(handle.with(|sim| sim.aggregator().is_finalized()));
    handle.reset().unwrap();
    assert_eq!(handle.state(), SimulationState::Idle);
}

#[test]
fn realtime_run_follows_wall_clock() {
    let handle = ring_handle();
    let start = Instant::now();
    handle
        .start(TrafficConfig::new(50., TrafficPattern::Constant), 0.3, true)
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(250));
    assert_eq!(handle.state(), SimulationState::Stopped);
    assert_eq!(handle.time(), 0.3);
}

#[test]
fn status_is_updated_during_run() {
    let handle = ring_handle();
    let runner = spawn_run(&handle, TrafficConfig::new(200., TrafficPattern::Poisson), 1000.);
    wait_until_busy(&handle);

    let start = Instant::now();
    while handle.with(|sim| sim.packets_created()) == 0 {
        assert!(start.elapsed() < Duration::from_secs(10), "no packets were generated");
        thread::sleep(Duration::from_millis(5));
    }
    let time = handle.time();
    assert!(time > 0.);

    handle.stop();
    runner.join().unwrap().unwrap();
    assert!(handle.time() >= time);
    assert!(handle.time() < 1000.);
}
