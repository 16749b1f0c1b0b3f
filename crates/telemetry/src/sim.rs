//! Simulated pose publisher
//!
//! Drives the robot around an ellipse centred on the field so the display
//! can be exercised without a robot. Velocity keys can be withheld to force
//! the display to derive rates, and Gaussian noise can be added to the
//! published position to exercise the rate smoothing.

use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TelemetryError};
use crate::table::{keys, qualified_key, TelemetryTable};
use crate::udp::ProducerHandle;

/// Configuration for the simulated path
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ellipse center (m)
    pub center_x: f64,
    pub center_y: f64,
    /// Ellipse semi-axes (m)
    pub radius_x: f64,
    pub radius_y: f64,
    /// Path parameter advance per publication (rad)
    pub step_angle: f64,
    /// Time between publications (s)
    pub period: f64,
    /// Publish VX and VY alongside the pose
    pub publish_velocity: bool,
    /// Publish Omega alongside the pose
    pub publish_omega: bool,
    /// Standard deviation of position noise (m); 0 disables noise
    pub position_noise_std: f64,
    /// RNG seed for reproducible noise
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        // Center of a 16.46 m x 8.23 m field, publishing at 50 Hz
        Self {
            center_x: 8.23,
            center_y: 4.115,
            radius_x: 3.0,
            radius_y: 2.0,
            step_angle: 0.05,
            period: 0.02,
            publish_velocity: true,
            publish_omega: false,
            position_noise_std: 0.0,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Path parameter rate (rad/s)
    pub fn path_rate(&self) -> f64 {
        self.step_angle / self.period
    }
}

/// One simulated publication
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Publication {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub vx: Option<f64>,
    pub vy: Option<f64>,
    pub omega: Option<f64>,
}

impl Publication {
    /// Present keys and their values, in table key names
    pub fn values(&self) -> Vec<(&'static str, f64)> {
        let mut values = vec![(keys::X, self.x), (keys::Y, self.y), (keys::THETA, self.theta)];
        values.extend(
            [(keys::VX, self.vx), (keys::VY, self.vy), (keys::OMEGA, self.omega)]
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v))),
        );
        values
    }

    /// JSON datagram in the UDP wire format
    pub fn to_datagram(&self) -> Result<Vec<u8>> {
        let object: serde_json::Map<String, serde_json::Value> = self
            .values()
            .into_iter()
            .map(|(key, value)| (key.to_string(), serde_json::Value::from(value)))
            .collect();
        Ok(serde_json::to_vec(&object)?)
    }
}

/// Publisher walking the configured ellipse
#[derive(Debug, Clone)]
pub struct SimulatedPublisher {
    config: SimulationConfig,
    t: f64,
    rng: StdRng,
    noise: Option<Normal<f64>>,
}

impl SimulatedPublisher {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        if !(config.period > 0.0) {
            return Err(TelemetryError::InvalidConfig(format!(
                "simulation period must be positive, got {}",
                config.period
            )));
        }
        let noise = if config.position_noise_std > 0.0 {
            let normal = Normal::new(0.0, config.position_noise_std)
                .map_err(|e| TelemetryError::InvalidConfig(format!("position noise: {e}")))?;
            Some(normal)
        } else {
            None
        };

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            t: 0.0,
            noise,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Current path parameter (rad)
    pub fn path_parameter(&self) -> f64 {
        self.t
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(self.config.period)
    }

    /// Produce the publication for the current path position and advance.
    pub fn next_publication(&mut self) -> Publication {
        let c = &self.config;
        let w = c.path_rate();
        let (sin_t, cos_t) = self.t.sin_cos();

        let mut x = c.center_x + c.radius_x * cos_t;
        let mut y = c.center_y + c.radius_y * sin_t;
        if let Some(noise) = &self.noise {
            x += noise.sample(&mut self.rng);
            y += noise.sample(&mut self.rng);
        }

        let publication = Publication {
            x,
            y,
            theta: self.t + FRAC_PI_2,
            vx: c.publish_velocity.then(|| -c.radius_x * sin_t * w),
            vy: c.publish_velocity.then(|| c.radius_y * cos_t * w),
            omega: c.publish_omega.then_some(w),
        };

        self.t += c.step_angle;
        publication
    }

    /// Publish the next position into `table` under `namespace`.
    pub fn publish(&mut self, table: &TelemetryTable, namespace: &str) -> Publication {
        let publication = self.next_publication();
        let values: Vec<(String, f64)> = publication
            .values()
            .into_iter()
            .map(|(key, value)| (qualified_key(namespace, key), value))
            .collect();
        table.put_many(&values, Instant::now());
        publication
    }

    /// Publish on a background thread at the configured period, the way a
    /// transport library keeps its table current.
    pub fn spawn(mut self, table: TelemetryTable, namespace: String, running: Arc<AtomicBool>) -> Result<ProducerHandle> {
        let flag = Arc::clone(&running);
        let thread = thread::Builder::new()
            .name("telemetry-sim".to_string())
            .spawn(move || {
                info!(
                    "Simulated publisher running at {:.0} Hz",
                    1.0 / self.config.period
                );
                let period = self.period();
                table.set_connected(true);
                while flag.load(Ordering::Relaxed) {
                    self.publish(&table, &namespace);
                    thread::sleep(period);
                }
            })?;
        Ok(ProducerHandle::new(running, thread))
    }
}
