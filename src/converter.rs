pub mod components;

mod rk4_solver;

pub use rk4_solver::{rk4_increments, rk4_step, Rk4Solver, Rk4SolverDescriptor, Target};

use crate::{Error, SimulationParameters};
use components::{BuckConverter, IdealDiode, Pwm};

/// The two topologies a switching converter alternates between.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SwitchMode {
    /// Energy storage phase, the input source drives the inductor.
    Closed,
    /// Freewheeling phase, the inductor discharges through the diode.
    Open,
}

impl SwitchMode {
    #[inline]
    pub fn from_closed(closed: bool) -> Self {
        if closed {
            SwitchMode::Closed
        } else {
            SwitchMode::Open
        }
    }

    #[inline]
    pub fn is_closed(self) -> bool {
        self == SwitchMode::Closed
    }
}

/// Describes the converter state at a single instant.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CircuitState {
    pub capacitor_voltage: f64,
    pub inductor_current: f64,
}

/// How the intermediate Runge-Kutta stages of the two state variables feed each other.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StageCoupling {
    /// Every stage evaluates both derivatives at the same advanced state.
    #[default]
    Coupled,
    /// Each variable is advanced through its stages while the other is held at its value
    /// from the start of the step.
    Frozen,
}

/// Defines the state derivatives of a converter for each switch mode.
pub trait Topology {
    fn input_voltage(&self) -> f64;

    fn capacitor_voltage_derivative(&self, state: CircuitState, mode: SwitchMode) -> f64;

    fn inductor_current_derivative(&self, state: CircuitState, mode: SwitchMode) -> f64;

    /// Rejects component values that would make the derivatives non-finite.
    fn validate(&self) -> Result<(), Error>;
}

/// Generates the switch control signal.
pub trait SwitchingFunction {
    fn mode(&self, time: f64) -> SwitchMode;

    fn validate(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Constrains the inductor current, representing the freewheeling path of the converter.
pub trait Rectifier {
    /// Returns the inductor current allowed to flow into the next step.
    fn clamp(&self, inductor_current: f64, mode: SwitchMode) -> f64;
}

/// Electrical description of a PWM driven converter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConverterParameters {
    /// [V]
    pub input_voltage: f64,
    /// [H]
    pub inductance: f64,
    /// [F]
    pub capacitance: f64,
    /// Load resistance. [Ω]
    pub resistance: f64,
    /// Switching frequency. [Hz]
    pub frequency: f64,
    /// Fraction of each period the switch is closed.
    pub duty_ratio: f64,
}

impl Default for ConverterParameters {
    fn default() -> Self {
        Self {
            input_voltage: 10.0,
            inductance: 20e-6,
            capacitance: 1e-6,
            resistance: 10.0,
            frequency: 1e6,
            duty_ratio: 0.5,
        }
    }
}

impl ConverterParameters {
    #[inline]
    pub fn period(&self) -> f64 {
        1.0 / self.frequency
    }

    /// Returns a copy with a new duty ratio, everything else unchanged.
    #[inline]
    pub fn with_duty_ratio(self, duty_ratio: f64) -> Self {
        Self { duty_ratio, ..self }
    }

    /// Returns a copy with the duty ratio set from an integer percentage in `[0, 100]`.
    #[inline]
    pub fn with_duty_percent(self, percent: u8) -> Self {
        self.with_duty_ratio(f64::from(percent.min(100)) / 100.0)
    }

    /// Builds simulation parameters with a horizon of `periods` switching periods.
    pub fn simulation_parameters(
        &self,
        delta_t: f64,
        periods: u32,
        sampling_start: f64,
    ) -> SimulationParameters {
        SimulationParameters {
            delta_t,
            horizon: f64::from(periods) * self.period(),
            sampling_start,
        }
    }

    /// Builds a solver using a buck power stage, a PWM switch and an ideal freewheeling diode.
    pub fn solver(&self, coupling: StageCoupling) -> Rk4Solver<BuckConverter> {
        Rk4Solver::new(Rk4SolverDescriptor {
            topology: BuckConverter {
                input_voltage: self.input_voltage,
                inductance: self.inductance,
                capacitance: self.capacitance,
                resistance: self.resistance,
            },
            switching: Box::new(Pwm::from_frequency(self.frequency, self.duty_ratio)),
            rectifier: Box::new(IdealDiode),
            coupling,
        })
    }
}

/// Text shown next to the duty ratio control.
pub fn duty_label(percent: u8) -> String {
    format!("Duty Ratio = {}%", percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn percent_maps_onto_unit_interval() {
        let params = ConverterParameters::default();

        assert_eq!(params.with_duty_percent(0).duty_ratio, 0.0);
        assert_eq!(params.with_duty_percent(25).duty_ratio, 0.25);
        assert_eq!(params.with_duty_percent(100).duty_ratio, 1.0);
        assert_eq!(params.with_duty_percent(250).duty_ratio, 1.0);
        assert_eq!(params.with_duty_percent(40).inductance, params.inductance);
    }

    #[test]
    fn horizon_is_a_multiple_of_the_period() {
        let params = ConverterParameters::default();
        let sim_params = params.simulation_parameters(1e-9, 250, 1.5e-4);

        assert_relative_eq!(params.period(), 1e-6);
        assert_relative_eq!(sim_params.horizon, 2.5e-4, max_relative = 1e-12);
        assert_eq!(sim_params.nsteps(), 250_000);
    }

    #[test]
    fn labels() {
        assert_eq!(duty_label(35), "Duty Ratio = 35%");
    }
}
