use crate::converter::{SwitchMode, SwitchingFunction};
use crate::Error;

/// Whether a PWM switch with the given period and duty ratio is closed at `time`.
#[inline]
pub fn switch_closed(time: f64, period: f64, duty_ratio: f64) -> bool {
    time % period < duty_ratio * period
}

/// A fixed frequency pulse width modulated switch, closed at the start of every period.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pwm {
    period: f64,
    duty_ratio: f64,
}

impl Pwm {
    /// Creates a new `Pwm`, clamping a finite duty ratio into `[0, 1]`.
    ///
    /// Non-finite duty ratios are kept as given and rejected by `validate`.
    pub fn new(period: f64, duty_ratio: f64) -> Self {
        let clamped = duty_ratio.clamp(0.0, 1.0);
        if clamped != duty_ratio && duty_ratio.is_finite() {
            log::warn!("duty ratio {} is outside [0, 1], using {}", duty_ratio, clamped);
        }

        Self {
            period,
            duty_ratio: if duty_ratio.is_finite() { clamped } else { duty_ratio },
        }
    }

    #[inline]
    pub fn from_frequency(frequency: f64, duty_ratio: f64) -> Self {
        Self::new(1.0 / frequency, duty_ratio)
    }

    #[inline]
    pub fn period(&self) -> f64 {
        self.period
    }

    #[inline]
    pub fn duty_ratio(&self) -> f64 {
        self.duty_ratio
    }
}

impl SwitchingFunction for Pwm {
    #[inline]
    fn mode(&self, time: f64) -> SwitchMode {
        SwitchMode::from_closed(switch_closed(time, self.period, self.duty_ratio))
    }

    fn validate(&self) -> Result<(), Error> {
        if !(self.period.is_finite() && self.period > 0.0) {
            return Err(Error::DegenerateCircuit {
                name: "switching period",
                value: self.period,
            });
        }
        if !self.duty_ratio.is_finite() {
            return Err(Error::InvalidDutyRatio {
                value: self.duty_ratio,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_duty_is_closed_for_half_of_each_period() {
        let pwm = Pwm::new(1.0, 0.5);
        let samples = 1000;

        for period in 0..3 {
            let closed = (0..samples)
                .map(|n| period as f64 + n as f64 / samples as f64)
                .filter(|&t| pwm.mode(t).is_closed())
                .count();
            assert_eq!(closed, samples / 2);
        }
    }

    #[test]
    fn closes_at_the_start_of_every_period() {
        let pwm = Pwm::new(4.0, 0.25);

        assert_eq!(pwm.mode(0.0), SwitchMode::Closed);
        assert_eq!(pwm.mode(0.999), SwitchMode::Closed);
        assert_eq!(pwm.mode(1.0), SwitchMode::Open);
        assert_eq!(pwm.mode(3.5), SwitchMode::Open);
        assert_eq!(pwm.mode(8.5), SwitchMode::Closed);
        assert_eq!(pwm.mode(9.0), SwitchMode::Open);
    }

    #[test]
    fn degenerate_duty_ratios() {
        let never = Pwm::new(1.0, 0.0);
        let always = Pwm::new(1.0, 1.0);
        for n in 0..100 {
            let t = n as f64 * 0.137;
            assert_eq!(never.mode(t), SwitchMode::Open);
            assert_eq!(always.mode(t), SwitchMode::Closed);
        }

        assert_eq!(Pwm::new(1.0, 1.7).duty_ratio(), 1.0);
        assert_eq!(Pwm::new(1.0, -0.2).duty_ratio(), 0.0);
        assert!(Pwm::new(1.0, -0.2).validate().is_ok());
        assert!(matches!(
            Pwm::new(1.0, f64::NAN).validate(),
            Err(Error::InvalidDutyRatio { .. })
        ));
        assert!(Pwm::from_frequency(0.0, 0.5).validate().is_err());
    }
}
