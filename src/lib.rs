//! A framework for simulating PWM driven switching DC-DC converters in the time domain.
//!
//! To get started, refer to the `demos` directory in the main repository.

mod series;
mod simulation;

pub mod converter;
pub mod prelude;
pub mod steady_state;

pub use series::TimeSeries;
pub use simulation::{
    RunDescriptor, RunOutput, SaveSettings, SaveType, Simulation, SimulationDescriptor,
    SimulationParameters,
};

/// Represents an error in the simulation.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Duty ratio must be a finite number ( duty ratio: {value} )")]
    InvalidDutyRatio { value: f64 },
    #[error("Sampling window must start within [0, horizon) \
        ( sampling start: {start}, horizon: {horizon} )")]
    InvalidSamplingWindow { start: f64, horizon: f64 },
    #[error("Circuit parameter {name} must be positive and finite ( {name}: {value} )")]
    DegenerateCircuit { name: &'static str, value: f64 },
    #[error("Time step must be positive and no longer than the horizon \
        ( time step: {step}, horizon: {horizon} )")]
    InvalidTimeStep { step: f64, horizon: f64 },
    #[error("Non-finite value in simulated series ( index: {index}, time: {time} )")]
    NumericOverflow { index: usize, time: f64 },
    #[error("Run was cancelled before completion ( completed steps: {index} )")]
    Cancelled { index: usize },
    #[error(transparent)]
    H5Error(#[from] hdf5::Error),
}

/// Manages actual computations.
pub trait Solver {
    /// Generates the time series for a run, along with the trapezoidal integral of the
    /// capacitor voltage over the sampling window.
    fn compute(&mut self, desc: ComputeDescriptor) -> Result<(TimeSeries, f64), Error>;

    /// Checks the solver configuration before any computation is done.
    fn validate(&self) -> Result<(), Error>;
}

/// Describes how a `Solver` should do computations.
pub struct ComputeDescriptor<'a> {
    pub sim_params: SimulationParameters,
    pub nsteps: usize,
    pub bar: &'a Option<indicatif::ProgressBar>,
    pub cancel: Option<&'a std::sync::atomic::AtomicBool>,
}
