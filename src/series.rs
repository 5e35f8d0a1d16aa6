use ndarray::{s, Array2, ArrayView1, ArrayView2};

/// Column holding the simulated time.
pub(crate) const TIME: usize = 0;
/// Column holding the switch state scaled by the input voltage.
pub(crate) const SWITCH: usize = 1;
/// Column holding the capacitor voltage.
pub(crate) const CAPACITOR_VOLTAGE: usize = 2;
/// Column holding the inductor current.
pub(crate) const INDUCTOR_CURRENT: usize = 3;

const COLUMNS: usize = 4;

/// The recorded history of a run.
///
/// Each row is one time index holding `[time, switch, capacitor voltage, inductor current]`,
/// so the four sequences can never differ in length.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeries {
    data: Array2<f64>,
}

impl TimeSeries {
    /// Creates a zeroed series with `nsteps + 1` records.
    #[inline]
    pub(crate) fn zeros(nsteps: usize) -> Self {
        Self {
            data: Array2::zeros((nsteps + 1, COLUMNS)),
        }
    }

    /// Number of records, including the initial one.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    #[inline]
    pub fn time(&self) -> ArrayView1<f64> {
        self.data.column(TIME)
    }

    /// The switch waveform, `input voltage` while closed and `0` while open.
    #[inline]
    pub fn switch(&self) -> ArrayView1<f64> {
        self.data.column(SWITCH)
    }

    #[inline]
    pub fn capacitor_voltage(&self) -> ArrayView1<f64> {
        self.data.column(CAPACITOR_VOLTAGE)
    }

    #[inline]
    pub fn inductor_current(&self) -> ArrayView1<f64> {
        self.data.column(INDUCTOR_CURRENT)
    }

    /// Records whose time is at or after `start`.
    pub fn window(&self, start: f64) -> ArrayView2<f64> {
        let first = self
            .time()
            .iter()
            .position(|&t| t >= start)
            .unwrap_or_else(|| self.len());
        self.data.slice(s![first.., ..])
    }

    /// Returns the first record holding a non-finite value, as `(index, time)`.
    pub fn first_non_finite(&self) -> Option<(usize, f64)> {
        self.data
            .outer_iter()
            .enumerate()
            .find(|(_, row)| row.iter().any(|v| !v.is_finite()))
            .map(|(index, row)| (index, row[TIME]))
    }

    #[inline]
    pub(crate) fn set(&mut self, index: usize, record: [f64; COLUMNS]) {
        self.data
            .row_mut(index)
            .assign(&ArrayView1::from(&record[..]));
    }

    #[inline]
    pub(crate) fn get(&self, index: usize, column: usize) -> f64 {
        self.data[[index, column]]
    }

    #[inline]
    pub(crate) fn set_value(&mut self, index: usize, column: usize, value: f64) {
        self.data[[index, column]] = value;
    }
}
