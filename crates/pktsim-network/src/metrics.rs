//! Run metrics.

use serde::Serialize;

#[derive(Clone, Debug)]
enum Latency {
    Samples(Vec<f64>),
    Finalized(f64),
}

/// Metrics reported to the user.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// Mean latency of delivered packets.
    pub latency: f64,
    /// Delivered packets per unit of simulation time.
    pub throughput: f64,
    /// Fraction of finished packets that were dropped.
    pub packet_loss: f64,
    /// Number of delivered packets.
    pub delivered: u64,
    /// Number of dropped packets.
    pub dropped: u64,
}

/// Accumulates latency samples and delivery outcomes of a run.
#[derive(Clone, Debug)]
pub struct Metrics {
    latency: Latency,
    delivered: u64,
    dropped: u64,
    min_latency: f64,
    max_latency: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Creates empty metrics.
    pub fn new() -> Self {
        Self {
            latency: Latency::Samples(Vec::new()),
            delivered: 0,
            dropped: 0,
            min_latency: f64::INFINITY,
            max_latency: 0.,
        }
    }

    /// Records the delivery of a packet with specified end-to-end latency.
    ///
    /// A simulation stops recording once its run is finalized, but metrics owned by other code may keep
    /// receiving deliveries after [`finalize`](Self::finalize). The mean is then updated incrementally.
    pub fn record_delivery(&mut self, latency: f64) {
        match &mut self.latency {
            Latency::Samples(samples) => samples.push(latency),
            Latency::Finalized(mean) => *mean += (latency - *mean) / (self.delivered + 1) as f64,
        }
        self.delivered += 1;
        self.min_latency = self.min_latency.min(latency);
        self.max_latency = self.max_latency.max(latency);
    }

    /// Records a dropped packet.
    pub fn record_drop(&mut self) {
        self.dropped += 1;
    }

    /// Reduces the latency samples to their mean. Repeated calls have no effect.
    pub fn finalize(&mut self) {
        if let Latency::Samples(samples) = &self.latency {
            self.latency = Latency::Finalized(mean(samples));
        }
    }

    /// Returns true if the latency samples were reduced to their mean.
    pub fn is_finalized(&self) -> bool {
        matches!(self.latency, Latency::Finalized(_))
    }

    /// Returns the collected latency samples, or `None` after finalization.
    pub fn latency_samples(&self) -> Option<&[f64]> {
        match &self.latency {
            Latency::Samples(samples) => Some(samples.as_slice()),
            Latency::Finalized(_) => None,
        }
    }

    /// Returns the mean latency of delivered packets, 0 if there are none.
    pub fn mean_latency(&self) -> f64 {
        match &self.latency {
            Latency::Samples(samples) => mean(samples),
            Latency::Finalized(mean) => *mean,
        }
    }

    /// Returns the smallest recorded latency, if any packet was delivered.
    pub fn min_latency(&self) -> Option<f64> {
        (self.delivered > 0).then_some(self.min_latency)
    }

    /// Returns the largest recorded latency, if any packet was delivered.
    pub fn max_latency(&self) -> Option<f64> {
        (self.delivered > 0).then_some(self.max_latency)
    }

    /// Returns the number of delivered packets.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Returns the number of dropped packets.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Returns the number of packets that were delivered or dropped.
    pub fn finished(&self) -> u64 {
        self.delivered + self.dropped
    }

    /// Derives the reported metrics for a run that lasted `simulation_time`.
    pub fn snapshot(&self, simulation_time: f64) -> MetricsSnapshot {
        let finished = self.finished();
        MetricsSnapshot {
            latency: self.mean_latency(),
            throughput: if simulation_time > 0. {
                self.delivered as f64 / simulation_time
            } else {
                0.
            },
            packet_loss: if finished > 0 {
                self.dropped as f64 / finished as f64
            } else {
                0.
            },
            delivered: self.delivered,
            dropped: self.dropped,
        }
    }
}

fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        0.
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_metrics() {
        let metrics = Metrics::new();
        let snapshot = metrics.snapshot(0.);
        assert_eq!(snapshot.latency, 0.);
        assert_eq!(snapshot.throughput, 0.);
        assert_eq!(snapshot.packet_loss, 0.);
        assert_eq!(metrics.min_latency(), None);
    }

    #[test]
    fn snapshot_derives_rates() {
        let mut metrics = Metrics::new();
        metrics.record_delivery(0.1);
        metrics.record_delivery(0.3);
        metrics.record_drop();
        metrics.record_delivery(0.2);
        let snapshot = metrics.snapshot(2.);
        assert!((snapshot.latency - 0.2).abs() < 1e-12);
        assert_eq!(snapshot.throughput, 1.5);
        assert_eq!(snapshot.packet_loss, 0.25);
        assert_eq!(metrics.min_latency(), Some(0.1));
        assert_eq!(metrics.max_latency(), Some(0.3));
    }

    #[test]
    fn finalize_reduces_samples_once() {
        let mut metrics = Metrics::new();
        metrics.record_delivery(1.);
        metrics.record_delivery(2.);
        let before = metrics.snapshot(1.);
        metrics.finalize();
        metrics.finalize();
        assert!(metrics.is_finalized());
        assert!(metrics.latency_samples().is_none());
        assert_eq!(metrics.snapshot(1.), before);
    }

    #[test]
    fn delivery_after_finalize_updates_mean() {
        let mut metrics = Metrics::new();
        metrics.record_delivery(1.);
        metrics.record_delivery(2.);
        metrics.finalize();
        metrics.record_delivery(6.);
        assert!((metrics.mean_latency() - 3.).abs() < 1e-12);
    }
}
