//! Traffic generation models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use pktsim_core::SimRng;

use crate::defaults;
use crate::error::SimulationError;

/// Probability of a short inter-packet interval in [`TrafficPattern::Bursty`].
pub const BURST_PROBABILITY: f64 = 0.8;

/// Ratio between the burst rate and the nominal rate in [`TrafficPattern::Bursty`].
pub const BURST_FACTOR: f64 = 5.;

/// Defines how intervals between generated packets are distributed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficPattern {
    /// Fixed interval `1 / rate`.
    #[default]
    Constant,
    /// Exponentially distributed intervals with mean `1 / rate`.
    Poisson,
    /// Short intervals `1 / (rate * 5)` with probability 0.8, long intervals `5 / rate` otherwise.
    ///
    /// This is a simplified bimodal model: draws are independent, so there are no bursts
    /// in the sense of correlated runs of short intervals.
    Bursty,
}

impl TrafficPattern {
    /// All supported patterns.
    pub const ALL: [TrafficPattern; 3] = [TrafficPattern::Constant, TrafficPattern::Poisson, TrafficPattern::Bursty];

    /// Returns the name of the pattern.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficPattern::Constant => "constant",
            TrafficPattern::Poisson => "poisson",
            TrafficPattern::Bursty => "bursty",
        }
    }

    /// Returns the interval until the next packet for a node generating `rate` packets per second.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pktsim_core::SimRng;
    /// use pktsim_network::TrafficPattern;
    ///
    /// let mut rng = SimRng::new(123);
    /// assert_eq!(TrafficPattern::Constant.next_interval(20., &mut rng), 0.05);
    /// assert!(TrafficPattern::Poisson.next_interval(20., &mut rng) >= 0.);
    /// ```
    pub fn next_interval(&self, rate: f64, rng: &mut SimRng) -> f64 {
        match self {
            TrafficPattern::Constant => 1. / rate,
            // inverse CDF of the exponential distribution
            TrafficPattern::Poisson => -(1. - rng.rand()).ln() / rate,
            TrafficPattern::Bursty => {
                if rng.rand() < BURST_PROBABILITY {
                    1. / (rate * BURST_FACTOR)
                } else {
                    1. / (rate / BURST_FACTOR)
                }
            }
        }
    }
}

impl fmt::Display for TrafficPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrafficPattern {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "constant" => Ok(TrafficPattern::Constant),
            "poisson" => Ok(TrafficPattern::Poisson),
            "bursty" => Ok(TrafficPattern::Bursty),
            _ => Err(SimulationError::config(format!("unknown traffic pattern '{}'", s))),
        }
    }
}

/// Traffic parameters shared by all nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrafficConfig {
    /// Packets generated per second by each node.
    #[serde(default = "defaults::packet_rate")]
    pub packet_rate: f64,
    /// Distribution of intervals between packets.
    #[serde(default)]
    pub pattern: TrafficPattern,
    /// Per-hop processing delay. Accepted for compatibility, not used by the forwarding model.
    #[serde(default)]
    pub processing_delay: f64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self::new(defaults::DEFAULT_PACKET_RATE, TrafficPattern::Constant)
    }
}

impl TrafficConfig {
    /// Creates traffic parameters with zero processing delay.
    pub fn new(packet_rate: f64, pattern: TrafficPattern) -> Self {
        Self {
            packet_rate,
            pattern,
            processing_delay: 0.,
        }
    }

    /// Checks that the packet rate is positive.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.packet_rate > 0.) || !self.packet_rate.is_finite() {
            return Err(SimulationError::config(format!(
                "invalid packet rate {}, must be > 0",
                self.packet_rate
            )));
        }
        Ok(())
    }

    /// Returns the interval until the next packet of a node.
    pub fn next_interval(&self, rng: &mut SimRng) -> f64 {
        self.pattern.next_interval(self.packet_rate, rng)
    }
}
