use crate::converter::{CircuitState, SwitchMode, Topology};
use crate::Error;

/// The power stage of a PWM switching converter with a resistive load across the capacitor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BuckConverter {
    pub input_voltage: f64,
    pub inductance: f64,
    pub capacitance: f64,
    pub resistance: f64,
}

impl Topology for BuckConverter {
    #[inline]
    fn input_voltage(&self) -> f64 {
        self.input_voltage
    }

    #[inline]
    fn capacitor_voltage_derivative(&self, state: CircuitState, mode: SwitchMode) -> f64 {
        let rc = self.resistance * self.capacitance;

        match mode {
            SwitchMode::Closed => -state.capacitor_voltage / rc,
            SwitchMode::Open => {
                (-self.resistance * state.inductor_current - state.capacitor_voltage) / rc
            }
        }
    }

    #[inline]
    fn inductor_current_derivative(&self, state: CircuitState, mode: SwitchMode) -> f64 {
        match mode {
            SwitchMode::Closed => self.input_voltage / self.inductance,
            SwitchMode::Open => state.capacitor_voltage / self.inductance,
        }
    }

    fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("resistance", self.resistance),
            ("capacitance", self.capacitance),
            ("inductance", self.inductance),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::DegenerateCircuit { name, value });
            }
        }
        if !self.input_voltage.is_finite() {
            return Err(Error::DegenerateCircuit {
                name: "input voltage",
                value: self.input_voltage,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter() -> BuckConverter {
        BuckConverter {
            input_voltage: 10.0,
            inductance: 20e-6,
            capacitance: 1e-6,
            resistance: 10.0,
        }
    }

    #[test]
    fn closed_switch_charges_inductor_from_source() {
        let state = CircuitState {
            capacitor_voltage: 2.0,
            inductor_current: 0.5,
        };

        assert_eq!(
            converter().capacitor_voltage_derivative(state, SwitchMode::Closed),
            -2.0 / (10.0 * 1e-6),
        );
        assert_eq!(
            converter().inductor_current_derivative(state, SwitchMode::Closed),
            10.0 / 20e-6,
        );
    }

    #[test]
    fn open_switch_freewheels_through_capacitor() {
        let state = CircuitState {
            capacitor_voltage: 2.0,
            inductor_current: 0.5,
        };

        assert_eq!(
            converter().capacitor_voltage_derivative(state, SwitchMode::Open),
            (-10.0 * 0.5 - 2.0) / (10.0 * 1e-6),
        );
        assert_eq!(
            converter().inductor_current_derivative(state, SwitchMode::Open),
            2.0 / 20e-6,
        );
    }

    #[test]
    fn rejects_non_positive_components() {
        let bad = BuckConverter {
            capacitance: 0.0,
            ..converter()
        };
        assert!(matches!(
            bad.validate(),
            Err(Error::DegenerateCircuit { name: "capacitance", .. })
        ));

        let bad = BuckConverter {
            resistance: -1.0,
            ..converter()
        };
        assert!(matches!(
            bad.validate(),
            Err(Error::DegenerateCircuit { name: "resistance", .. })
        ));

        let bad = BuckConverter {
            inductance: f64::NAN,
            ..converter()
        };
        assert!(bad.validate().is_err());
        assert!(converter().validate().is_ok());
    }
}
