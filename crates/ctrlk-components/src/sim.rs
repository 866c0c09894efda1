//! In-process plant simulation for running the kernel without hardware.
//!
//! [`SimPlant`] is a first-order lag, `τ·ẋ = K·u − x`, shared between a
//! [`PlantSensor`] that publishes its state on `Inputs` and a
//! [`PlantEffector`] that applies the controller's `Outputs` to it.  The two
//! components hold clones of one handle, so the loop closes through the plant
//! exactly as it would through real hardware.
//!
//! # Example
//!
//! ```rust
//! use ctrlk_components::sim::{PlantConfig, SimPlant};
//!
//! let plant = SimPlant::new(PlantConfig { gain: 2.0, time_constant: 0.5, initial: 0.0 });
//! for _ in 0..1000 {
//!     plant.apply(1.0, 0.01);
//! }
//! assert!((plant.position() - 2.0).abs() < 1e-3);
//! ```

use std::sync::Arc;

use ctrlk_kernel::{Effector, Sensor, delegate_component};
use ctrlk_runtime::Stage;
use ctrlk_types::KernelError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Parameters of the simulated plant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    /// Steady-state gain `K`.
    pub gain: f64,
    /// Time constant `τ` in seconds.
    pub time_constant: f64,
    /// State at construction.
    pub initial: f64,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            gain: 1.0,
            time_constant: 0.5,
            initial: 0.0,
        }
    }
}

#[derive(Debug)]
struct PlantState {
    config: PlantConfig,
    position: f64,
    last_command: f64,
}

/// Shared handle to one simulated plant.
#[derive(Debug, Clone)]
pub struct SimPlant {
    state: Arc<Mutex<PlantState>>,
}

impl SimPlant {
    pub fn new(config: PlantConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(PlantState {
                config,
                position: config.initial,
                last_command: 0.0,
            })),
        }
    }

    pub fn position(&self) -> f64 {
        self.state.lock().position
    }

    /// The command applied most recently.
    pub fn last_command(&self) -> f64 {
        self.state.lock().last_command
    }

    /// Integrate the plant over `dt` seconds with input `u` held constant.
    ///
    /// Uses the exact discretisation of the first-order lag, so it is stable
    /// for any step size.  Non-positive `dt` only records the command.
    pub fn apply(&self, u: f64, dt: f64) {
        let mut s = self.state.lock();
        s.last_command = u;
        if dt <= 0.0 {
            return;
        }
        let target = s.config.gain * u;
        let tau = s.config.time_constant;
        s.position = if tau <= 0.0 {
            target
        } else {
            target + (s.position - target) * (-dt / tau).exp()
        };
    }

    /// Put the plant back to its initial state.
    pub fn reset(&self) {
        let mut s = self.state.lock();
        s.position = s.config.initial;
        s.last_command = 0.0;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sensor
// ────────────────────────────────────────────────────────────────────────────

/// Publishes the plant state on `Inputs`.
pub struct PlantSensor {
    sensor: Sensor<f64>,
    plant: SimPlant,
}

delegate_component!(PlantSensor => sensor: Sensor<f64>);

impl PlantSensor {
    pub fn new(name: &str, plant: SimPlant) -> Self {
        Self {
            sensor: Sensor::new(name),
            plant,
        }
    }

    pub fn ports(&self) -> &Sensor<f64> {
        &self.sensor
    }
}

impl Stage for PlantSensor {
    fn update(&mut self) -> Result<(), KernelError> {
        self.sensor.input().write(&self.plant.position())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Effector
// ────────────────────────────────────────────────────────────────────────────

/// Applies the controller's `Outputs` to the plant for one period.
pub struct PlantEffector {
    effector: Effector<f64, f64, f64>,
    plant: SimPlant,
    dt: f64,
    command: f64,
}

delegate_component!(PlantEffector => effector: Effector<f64, f64, f64>);

impl PlantEffector {
    /// `dt` is the cycle period in seconds.
    pub fn new(name: &str, plant: SimPlant, dt: f64) -> Self {
        Self {
            effector: Effector::new(name),
            plant,
            dt,
            command: 0.0,
        }
    }

    pub fn ports(&self) -> &Effector<f64, f64, f64> {
        &self.effector
    }
}

impl Stage for PlantEffector {
    fn update(&mut self) -> Result<(), KernelError> {
        self.effector.output().read_into(&mut self.command)?;
        self.plant.apply(self.command, self.dt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctrlk_kernel::{Component, ControlKernel, Producer};
    use ctrlk_types::ChannelRole;

    #[test]
    fn plant_converges_to_gain_times_input() {
        let plant = SimPlant::new(PlantConfig {
            gain: 3.0,
            time_constant: 0.1,
            initial: 0.0,
        });
        for _ in 0..200 {
            plant.apply(1.0, 0.01);
        }
        assert!((plant.position() - 3.0).abs() < 1e-6);
        assert_eq!(plant.last_command(), 1.0);
    }

    #[test]
    fn one_time_constant_covers_63_percent() {
        let plant = SimPlant::new(PlantConfig {
            gain: 1.0,
            time_constant: 1.0,
            initial: 0.0,
        });
        plant.apply(1.0, 1.0);
        assert!((plant.position() - (1.0 - (-1.0f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn zero_time_constant_tracks_immediately() {
        let plant = SimPlant::new(PlantConfig {
            gain: 2.0,
            time_constant: 0.0,
            initial: 5.0,
        });
        plant.apply(0.0, 0.0);
        assert_eq!(plant.position(), 5.0);
        plant.apply(1.5, 0.01);
        assert_eq!(plant.position(), 3.0);
        plant.reset();
        assert_eq!(plant.position(), 5.0);
    }

    #[test]
    fn clones_share_one_plant() {
        let plant = SimPlant::new(PlantConfig::default());
        let other = plant.clone();
        other.apply(1.0, 10.0);
        assert!(plant.position() > 0.99);
    }

    #[test]
    fn sensor_and_effector_close_the_loop_through_the_plant() {
        let mut kernel = ControlKernel::new("K");
        let plant = SimPlant::new(PlantConfig {
            gain: 1.0,
            time_constant: 0.0,
            initial: 0.25,
        });
        let mut out = ctrlk_channel::WritePort::<f64>::new();
        ctrlk_kernel::component::create_produced(&mut out, &mut kernel, ChannelRole::Outputs);
        ctrlk_kernel::component::bind_writer(&mut out, &kernel, ChannelRole::Outputs);

        let mut sensor = PlantSensor::new("enc", plant.clone());
        let mut effector = PlantEffector::new("motor", plant.clone(), 0.01);
        kernel.load(&mut sensor).unwrap();
        kernel.load(&mut effector).unwrap();
        assert!(effector.ports().write_port().is_none());

        sensor.update().unwrap();
        assert_eq!(effector.ports().input().read().unwrap(), 0.25);

        out.write(&0.75).unwrap();
        effector.update().unwrap();
        assert_eq!(plant.position(), 0.75);
        assert!(Component::<ControlKernel>::is_wired(&sensor));
    }
}
