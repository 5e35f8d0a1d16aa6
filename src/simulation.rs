use std::path::Path;
use std::sync::atomic::AtomicBool;

use crate::steady_state::average;
use crate::{ComputeDescriptor, Error, Solver, TimeSeries};

/// The most records a single run may hold, four values each.
pub const MAX_RECORDS: usize = 25_000_000;

/// Simulation specific parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimulationParameters {
    /// The length of each temporal step in the simulation.
    pub delta_t: f64,
    /// How long, in temporal units, every run lasts.
    pub horizon: f64,
    /// The time from which the capacitor voltage is averaged into the steady state value.
    pub sampling_start: f64,
}

impl SimulationParameters {
    /// The number of steps taken in a run, rounded down.
    #[inline]
    pub fn nsteps(&self) -> usize {
        (self.horizon / self.delta_t).floor() as usize
    }

    /// Checks that the time grid and sampling window describe a non-empty run that fits in
    /// `MAX_RECORDS`.
    pub fn validate(&self) -> Result<(), Error> {
        let nsteps = self.horizon / self.delta_t;
        if !(self.delta_t.is_finite() && self.delta_t > 0.0 && self.delta_t <= self.horizon)
            || !self.horizon.is_finite()
            || !(nsteps.is_finite() && nsteps < MAX_RECORDS as f64)
        {
            return Err(Error::InvalidTimeStep {
                step: self.delta_t,
                horizon: self.horizon,
            });
        }
        if !(self.sampling_start >= 0.0 && self.sampling_start < self.horizon) {
            return Err(Error::InvalidSamplingWindow {
                start: self.sampling_start,
                horizon: self.horizon,
            });
        }

        Ok(())
    }
}

/// Describes a simulation.
pub struct SimulationDescriptor<S: Solver> {
    /// The `Solver` for the simulation.
    pub solver: S,
    /// The parameters for the simulation.
    pub sim_params: SimulationParameters,
}

/// Describes a simulation run.
pub struct RunDescriptor<'a, P: AsRef<Path>> {
    /// Whether or not to print information to the console.
    pub verbose: bool,
    /// What, if any, information to save to file.
    pub save_settings: Option<SaveSettings<P>>,
    /// Aborts the run when set by another thread.
    pub cancel: Option<&'a AtomicBool>,
}

/// How data should be saved to file.
#[derive(Debug)]
pub struct SaveSettings<P: AsRef<Path>> {
    /// The path to the save file.
    pub filename: P,
    /// What information to save.
    pub save_type: SaveType,
    /// Whether to replace the file, or add this run next to the ones already saved in it.
    pub overwrite: bool,
}

/// Represents what data to save.
#[derive(PartialEq, Debug)]
pub enum SaveType {
    /// Save every record of the time series along with the steady state value.
    Full,
    /// Save only the steady state value and run parameters.
    Summary,
}

/// The results of one run.
#[derive(Clone, Debug)]
pub struct RunOutput {
    pub series: TimeSeries,
    /// Average capacitor voltage over the sampling window.
    pub steady_state: f64,
    pub horizon: f64,
}

impl RunOutput {
    /// Text reporting the steady state value.
    pub fn steady_state_label(&self) -> String {
        format!("Vsteady = {}V", format_general(self.steady_state, 6))
    }

    /// End points of a constant line at the steady state value spanning the run.
    pub fn reference_line(&self) -> [(f64, f64); 2] {
        [(0.0, self.steady_state), (self.horizon, self.steady_state)]
    }
}

/// Formats `value` with `precision` significant digits, dropping trailing zeros and switching
/// to exponent notation for very large or small magnitudes.
fn format_general(value: f64, precision: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{}", value);
    }

    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exponent) => (mantissa, exponent),
            Err(_) => return format!("{}", value),
        },
        None => return format!("{}", value),
    };

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exponent.abs())
    } else {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        trim_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// The main `struct` of the framework.
pub struct Simulation<S: Solver> {
    solver: S,
    sim_params: SimulationParameters,
}

impl<S: Solver> Simulation<S> {
    /// Creates a new `Simulation` instance, rejecting any configuration that can not produce
    /// a finite result.
    #[inline]
    pub fn new(desc: SimulationDescriptor<S>) -> Result<Self, Error> {
        desc.sim_params.validate()?;
        desc.solver.validate()?;

        Ok(Self {
            solver: desc.solver,
            sim_params: desc.sim_params,
        })
    }

    #[inline]
    pub fn sim_params(&self) -> SimulationParameters {
        self.sim_params
    }

    /// Gives access to the solver between runs, e.g. to change the switching signal.
    ///
    /// The solver is validated again at the start of the next run.
    #[inline]
    pub fn solver_mut(&mut self) -> &mut S {
        &mut self.solver
    }

    /// Does a computational run.
    ///
    /// Every run starts from a discharged circuit at time zero and its results replace any
    /// previous ones. Nothing is returned or saved when the run fails.
    pub fn run<P: AsRef<Path>>(&mut self, desc: RunDescriptor<P>) -> Result<RunOutput, Error> {
        self.solver.validate()?;
        let nsteps = self.sim_params.nsteps();

        // setup output if verbose
        let bar = if desc.verbose {
            println!("# of time steps: {}", nsteps);
            Some(indicatif::ProgressBar::new(nsteps as u64))
        } else {
            None
        };

        let (series, sum) = self.solver.compute(ComputeDescriptor {
            sim_params: self.sim_params,
            nsteps,
            bar: &bar,
            cancel: desc.cancel,
        })?;

        if let Some(ref bar) = bar {
            bar.finish();
        }

        if let Some((index, time)) = series.first_non_finite() {
            return Err(Error::NumericOverflow { index, time });
        }
        let steady_state = average(sum, self.sim_params.sampling_start, self.sim_params.horizon);
        if !steady_state.is_finite() {
            return Err(Error::NumericOverflow {
                index: nsteps,
                time: self.sim_params.horizon,
            });
        }
        log::debug!("run of {} steps settled at {} V", nsteps, steady_state);

        let output = RunOutput {
            series,
            steady_state,
            horizon: self.sim_params.horizon,
        };

        if let Some(ref settings) = desc.save_settings {
            save(settings, &self.sim_params, &output)?;
        }

        Ok(output)
    }
}

/// Writes one run into its own `run_NNN` group of the save file.
fn save<P: AsRef<Path>>(
    settings: &SaveSettings<P>,
    sim_params: &SimulationParameters,
    output: &RunOutput,
) -> Result<(), Error> {
    let filename = settings.filename.as_ref();
    let file = if filename.exists() && !settings.overwrite {
        hdf5::File::append(filename)?
    } else {
        hdf5::File::create(filename)?
    };

    let group_name = format!("run_{:03}", file.member_names()?.len());
    {
        let group = file.create_group(&group_name)?;

        if settings.save_type == SaveType::Full {
            let series = &output.series;
            for (name, column) in [
                ("time", series.time()),
                ("switch", series.switch()),
                ("capacitor_voltage", series.capacitor_voltage()),
                ("inductor_current", series.inductor_current()),
            ] {
                group
                    .new_dataset::<f64>()
                    .shape(series.len())
                    .create(name)?
                    .write(column.to_owned().view())?;
            }
        }

        for (name, value) in [
            ("time_step", sim_params.delta_t),
            ("horizon", sim_params.horizon),
            ("sampling_start", sim_params.sampling_start),
            ("steady_state", output.steady_state),
        ] {
            group
                .new_attr::<f64>()
                .shape(hdf5::Extents::Scalar)
                .create(name)?
                .write_scalar(&value)?;
        }
    }

    file.close()?;
    log::debug!("saved {} to {}", group_name, filename.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(delta_t: f64, horizon: f64, sampling_start: f64) -> SimulationParameters {
        SimulationParameters {
            delta_t,
            horizon,
            sampling_start,
        }
    }

    #[test]
    fn nsteps_rounds_down() {
        assert_eq!(params(0.25, 1.0, 0.0).nsteps(), 4);
        assert_eq!(params(0.3, 1.0, 0.0).nsteps(), 3);
    }

    #[test]
    fn rejects_empty_sampling_window() {
        assert!(params(0.1, 1.0, 0.5).validate().is_ok());
        assert!(matches!(
            params(0.1, 1.0, 1.0).validate(),
            Err(Error::InvalidSamplingWindow { .. })
        ));
        assert!(matches!(
            params(0.1, 1.0, -0.1).validate(),
            Err(Error::InvalidSamplingWindow { .. })
        ));
        assert!(matches!(
            params(0.1, 1.0, f64::NAN).validate(),
            Err(Error::InvalidSamplingWindow { .. })
        ));
    }

    #[test]
    fn rejects_bad_time_steps() {
        for delta_t in [0.0, -1e-9, 2.0, f64::NAN] {
            assert!(matches!(
                params(delta_t, 1.0, 0.5).validate(),
                Err(Error::InvalidTimeStep { .. })
            ));
        }
        assert!(params(0.1, f64::INFINITY, 0.5).validate().is_err());
    }

    #[test]
    fn rejects_runs_too_long_to_store() {
        for delta_t in [1e-300, 1e-13 / 2.5e-4] {
            assert!(matches!(
                params(delta_t, 1.0, 0.5).validate(),
                Err(Error::InvalidTimeStep { .. })
            ));
        }
        assert!(params(1.0 / (MAX_RECORDS as f64 / 2.0), 1.0, 0.5).validate().is_ok());
        assert!(params(1e-9, 2.5e-4, 1.5e-4).validate().is_ok());
    }

    #[test]
    fn labels_use_six_significant_digits() {
        let label = |steady_state| {
            RunOutput {
                series: TimeSeries::zeros(1),
                steady_state,
                horizon: 1.0,
            }
            .steady_state_label()
        };

        assert_eq!(label(-9.993258965079159), "Vsteady = -9.99326V");
        assert_eq!(label(-3.3310928637180828), "Vsteady = -3.33109V");
        assert_eq!(label(0.0), "Vsteady = 0V");
        assert_eq!(label(125.0), "Vsteady = 125V");
        assert_eq!(label(1.5e-7), "Vsteady = 1.5e-07V");
        assert_eq!(label(1234567.0), "Vsteady = 1.23457e+06V");
    }

    #[test]
    fn reference_line_spans_the_horizon() {
        let output = RunOutput {
            series: TimeSeries::zeros(1),
            steady_state: -9.99,
            horizon: 2.5e-4,
        };

        assert_eq!(output.reference_line(), [(0.0, -9.99), (2.5e-4, -9.99)]);
        assert_eq!(output.steady_state_label(), "Vsteady = -9.99V");
    }
}
