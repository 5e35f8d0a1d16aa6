use std::sync::atomic::Ordering;

use crate::converter::{
    CircuitState, Rectifier, StageCoupling, SwitchMode, SwitchingFunction, Topology,
};
use crate::series::{CAPACITOR_VOLTAGE, INDUCTOR_CURRENT};
use crate::steady_state::trapezoid;
use crate::{ComputeDescriptor, Error, Solver, TimeSeries};

/// Selects which state variable an `rk4_step` advances.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    CapacitorVoltage,
    InductorCurrent,
}

/// Returns the states the capacitor voltage and inductor current derivatives are evaluated at
/// for one intermediate stage.
#[inline]
fn stage_states(
    state: CircuitState,
    last: (f64, f64),
    scale: f64,
    coupling: StageCoupling,
) -> (CircuitState, CircuitState) {
    let advanced = CircuitState {
        capacitor_voltage: state.capacitor_voltage + scale * last.0,
        inductor_current: state.inductor_current + scale * last.1,
    };

    match coupling {
        StageCoupling::Coupled => (advanced, advanced),
        StageCoupling::Frozen => (
            CircuitState {
                inductor_current: state.inductor_current,
                ..advanced
            },
            CircuitState {
                capacitor_voltage: state.capacitor_voltage,
                ..advanced
            },
        ),
    }
}

/// Computes the classical fourth order Runge-Kutta increments of `(capacitor voltage,
/// inductor current)` over one step of length `delta_t`.
///
/// `mode` is held for all four stages.
pub fn rk4_increments<T: Topology + ?Sized>(
    topology: &T,
    state: CircuitState,
    mode: SwitchMode,
    delta_t: f64,
    coupling: StageCoupling,
) -> (f64, f64) {
    let slope = |last: (f64, f64), scale: f64| {
        let (vc_state, il_state) = stage_states(state, last, scale, coupling);
        (
            delta_t * topology.capacitor_voltage_derivative(vc_state, mode),
            delta_t * topology.inductor_current_derivative(il_state, mode),
        )
    };

    let k1 = slope((0.0, 0.0), 0.0);
    let k2 = slope(k1, 0.5);
    let k3 = slope(k2, 0.5);
    let k4 = slope(k3, 1.0);

    (
        (k1.0 + 2.0 * (k2.0 + k3.0) + k4.0) / 6.0,
        (k1.1 + 2.0 * (k2.1 + k3.1) + k4.1) / 6.0,
    )
}

/// The increment of a single state variable over one step.
#[inline]
pub fn rk4_step<T: Topology + ?Sized>(
    topology: &T,
    state: CircuitState,
    mode: SwitchMode,
    delta_t: f64,
    coupling: StageCoupling,
    target: Target,
) -> f64 {
    let (d_vc, d_il) = rk4_increments(topology, state, mode, delta_t, coupling);
    match target {
        Target::CapacitorVoltage => d_vc,
        Target::InductorCurrent => d_il,
    }
}

/// Describes the composition of an `Rk4Solver`.
pub struct Rk4SolverDescriptor<T: Topology> {
    pub topology: T,
    pub switching: Box<dyn SwitchingFunction>,
    pub rectifier: Box<dyn Rectifier>,
    pub coupling: StageCoupling,
}

/// Integrates a switching converter with fixed step RK4 on the CPU.
pub struct Rk4Solver<T: Topology> {
    topology: T,
    switching: Box<dyn SwitchingFunction>,
    rectifier: Box<dyn Rectifier>,
    coupling: StageCoupling,
}

impl<T: Topology> Rk4Solver<T> {
    #[inline]
    pub fn new(desc: Rk4SolverDescriptor<T>) -> Self {
        Self {
            topology: desc.topology,
            switching: desc.switching,
            rectifier: desc.rectifier,
            coupling: desc.coupling,
        }
    }
}

impl<T: Topology> Solver for Rk4Solver<T> {
    fn compute(&mut self, desc: ComputeDescriptor) -> Result<(TimeSeries, f64), Error> {
        let delta_t = desc.sim_params.delta_t;
        let sampling_start = desc.sim_params.sampling_start;
        let input_voltage = self.topology.input_voltage();
        let switch_level = |mode: SwitchMode| if mode.is_closed() { input_voltage } else { 0.0 };

        let mut series = TimeSeries::zeros(desc.nsteps);
        series.set(0, [0.0, switch_level(self.switching.mode(0.0)), 0.0, 0.0]);
        let mut sum = 0.0;

        // loop through time
        for t_index in 0..desc.nsteps {
            if let Some(cancel) = desc.cancel {
                if cancel.load(Ordering::Relaxed) {
                    return Err(Error::Cancelled { index: t_index });
                }
            }

            let t = (t_index as f64) * delta_t;
            let mode = self.switching.mode(t);

            // the stored current is clamped before it drives this step
            let inductor_current = self
                .rectifier
                .clamp(series.get(t_index, INDUCTOR_CURRENT), mode);
            series.set_value(t_index, INDUCTOR_CURRENT, inductor_current);

            let state = CircuitState {
                capacitor_voltage: series.get(t_index, CAPACITOR_VOLTAGE),
                inductor_current,
            };
            let (d_vc, d_il) = rk4_increments(&self.topology, state, mode, delta_t, self.coupling);
            let next_vc = state.capacitor_voltage + d_vc;

            series.set(
                t_index + 1,
                [
                    ((t_index + 1) as f64) * delta_t,
                    switch_level(mode),
                    next_vc,
                    state.inductor_current + d_il,
                ],
            );

            if t >= sampling_start {
                sum += trapezoid(state.capacitor_voltage, next_vc, delta_t);
            }

            if let Some(ref bar) = desc.bar {
                bar.inc(1)
            }
        }

        Ok((series, sum))
    }

    fn validate(&self) -> Result<(), Error> {
        self.topology.validate()?;
        self.switching.validate()
    }
}
