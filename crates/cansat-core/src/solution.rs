//! Named access to the engine's row-major solution.

use crate::error::SolutionError;
use cansat_sim::SolutionMatrix;
use nalgebra::{Quaternion, UnitQuaternion};

/// Columns addressed by name. Indices follow the engine's row layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Time = 0,
    X = 1,
    Y = 2,
    Z = 3,
    Vx = 4,
    Vy = 5,
    Vz = 6,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Time,
        Column::X,
        Column::Y,
        Column::Z,
        Column::Vx,
        Column::Vy,
        Column::Vz,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Column::Time => "t",
            Column::X => "x",
            Column::Y => "y",
            Column::Z => "z",
            Column::Vx => "vx",
            Column::Vy => "vy",
            Column::Vz => "vz",
        }
    }
}

/// Columns every renderer relies on.
pub const REQUIRED_COLUMNS: usize = Column::ALL.len();
const QUATERNION_COLUMNS: std::ops::Range<usize> = 7..11;

/// A solution with at least two rows and the seven kinematic columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSolution {
    matrix: SolutionMatrix,
}

impl FlightSolution {
    pub fn new(matrix: SolutionMatrix) -> Result<Self, SolutionError> {
        let rows = matrix.rows();
        if rows < 2 {
            return Err(SolutionError::Degenerate { rows });
        }
        if matrix.columns() < REQUIRED_COLUMNS {
            return Err(SolutionError::Layout {
                columns: matrix.columns(),
                required: REQUIRED_COLUMNS,
            });
        }
        Ok(Self { matrix })
    }

    pub fn len(&self) -> usize {
        self.matrix.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    pub fn column(&self, column: Column) -> Vec<f64> {
        self.matrix.column(column.index())
    }

    pub fn time(&self) -> Vec<f64> {
        self.column(Column::Time)
    }

    pub fn x(&self) -> Vec<f64> {
        self.column(Column::X)
    }

    pub fn y(&self) -> Vec<f64> {
        self.column(Column::Y)
    }

    pub fn z(&self) -> Vec<f64> {
        self.column(Column::Z)
    }

    pub fn vx(&self) -> Vec<f64> {
        self.column(Column::Vx)
    }

    pub fn vy(&self) -> Vec<f64> {
        self.column(Column::Vy)
    }

    pub fn vz(&self) -> Vec<f64> {
        self.column(Column::Vz)
    }

    /// Body-to-world attitude at `row`, when the solution carries one.
    pub fn attitude(&self, row: usize) -> Option<UnitQuaternion<f64>> {
        let values = self.matrix.row(row)?.get(QUATERNION_COLUMNS)?;
        let q = Quaternion::new(values[0], values[1], values[2], values[3]);
        Some(UnitQuaternion::from_quaternion(q))
    }

    /// Last row, e.g. the landing state.
    pub fn last_row(&self) -> &[f64] {
        self.matrix.row(self.len() - 1).unwrap_or_default()
    }

    pub fn matrix(&self) -> &SolutionMatrix {
        &self.matrix
    }

    pub fn into_matrix(self) -> SolutionMatrix {
        self.matrix
    }
}

impl TryFrom<SolutionMatrix> for FlightSolution {
    type Error = SolutionError;

    fn try_from(matrix: SolutionMatrix) -> Result<Self, Self::Error> {
        Self::new(matrix)
    }
}
