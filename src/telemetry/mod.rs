//! Data-producing side: the sensor collaborator and the sampler task.
//!
//! - [`Sensor`] external reading source (register map and bus I/O are its business)
//! - [`Sample`] one reading tagged with its backend application id
//! - [`Sampler`] task that gates on readiness, then samples periodically

mod sampler;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SensorError;

pub use sampler::Sampler;

/// Shared handle to a sensor collaborator.
pub type SensorRef = Arc<dyn Sensor>;

/// One reading from a sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Backend application id (e.g. `"TEMP"`).
    pub app_id: &'static str,
    /// Reading value in the sensor's unit.
    pub value: f64,
}

impl Sample {
    /// Creates a sample.
    pub fn new(app_id: &'static str, value: f64) -> Self {
        Self { app_id, value }
    }
}

/// # External sensor collaborator.
#[async_trait]
pub trait Sensor: Send + Sync + 'static {
    /// Takes one reading.
    async fn read(&self) -> Result<Sample, SensorError>;
}
