//! Includes commonly used library components.

pub use crate::{
    ComputeDescriptor,
    RunDescriptor,
    RunOutput,
    SaveSettings,
    SaveType,
    Simulation,
    SimulationDescriptor,
    SimulationParameters,
    Solver,
    TimeSeries,
};
pub use crate::converter::{
    ConverterParameters,
    Rectifier,
    StageCoupling,
    SwitchMode,
    SwitchingFunction,
    Topology,
};
