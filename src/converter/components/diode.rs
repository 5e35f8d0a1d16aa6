use crate::converter::{Rectifier, SwitchMode};

/// An ideal freewheeling diode, blocking reverse inductor current while the switch is open.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IdealDiode;

impl Rectifier for IdealDiode {
    #[inline]
    fn clamp(&self, inductor_current: f64, mode: SwitchMode) -> f64 {
        match mode {
            SwitchMode::Open if inductor_current < 0.0 => 0.0,
            _ => inductor_current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_reverse_current_only_while_open() {
        assert_eq!(IdealDiode.clamp(-0.3, SwitchMode::Open), 0.0);
        assert_eq!(IdealDiode.clamp(-0.3, SwitchMode::Closed), -0.3);
        assert_eq!(IdealDiode.clamp(0.3, SwitchMode::Open), 0.3);
    }

    #[test]
    fn clamping_is_idempotent() {
        for current in [-2.0, -1e-12, 0.0, 1e-12, 2.0] {
            for mode in [SwitchMode::Open, SwitchMode::Closed] {
                let once = IdealDiode.clamp(current, mode);
                assert_eq!(IdealDiode.clamp(once, mode), once);
            }
        }
    }
}
