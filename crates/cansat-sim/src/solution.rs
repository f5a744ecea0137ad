//! Row-major time-series output of the flight solver.
//!
//! Column layout of every row produced by [`crate::Flight`]:
//!
//! | index | quantity |
//! |-------|----------|
//! | 0     | t (s) |
//! | 1..=3 | x, y, z position (m, ENU; z above sea level) |
//! | 4..=6 | vx, vy, vz velocity (m/s) |
//! | 7..=10 | e0, e1, e2, e3 attitude quaternion, scalar first, body to world (body Z along the airframe) |
//! | 11..=13 | wx, wy, wz body angular rates (rad/s) |

/// Width of the rows written by the flight solver.
pub const SOLUTION_COLUMNS: usize = 14;

// Upper bound on rows reserved up front; longer flights grow the buffer.
const MAX_RESERVED_ROWS: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolutionMatrix {
    columns: usize,
    data: Vec<f64>,
}

impl SolutionMatrix {
    pub fn new(columns: usize) -> Self {
        Self {
            columns,
            data: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            data: Vec::with_capacity(columns.saturating_mul(rows.min(MAX_RESERVED_ROWS))),
        }
    }

    /// Wrap row-major data. Returns `None` when `data` is not a whole number of rows.
    pub fn from_row_major(columns: usize, data: Vec<f64>) -> Option<Self> {
        if columns == 0 {
            return data.is_empty().then(|| Self::new(0));
        }
        (data.len() % columns == 0).then_some(Self { columns, data })
    }

    /// Append one row. Rows of the wrong width are ignored and reported as `false`.
    pub fn push_row(&mut self, row: &[f64]) -> bool {
        if row.len() != self.columns {
            return false;
        }
        self.data.extend_from_slice(row);
        true
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        if self.columns == 0 {
            0
        } else {
            self.data.len() / self.columns
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.columns)?;
        self.data.get(start..start + self.columns)
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.columns.max(1))
    }

    /// All values of one column, top to bottom. Empty if the column does not exist.
    pub fn column(&self, index: usize) -> Vec<f64> {
        if index >= self.columns {
            return Vec::new();
        }
        self.iter_rows().map(|row| row[index]).collect()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
