//! Converter components.

mod buck_converter;
mod diode;
mod pwm;

pub use buck_converter::BuckConverter;
pub use diode::IdealDiode;
pub use pwm::{switch_closed, Pwm};
