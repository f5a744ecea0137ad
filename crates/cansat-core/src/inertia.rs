use nalgebra::Vector3;

/// Principal moments of inertia (kg*m^2) about the body axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InertiaEstimate {
    pub ix: f64,
    pub iy: f64,
    pub iz: f64, // longitudinal
}

impl InertiaEstimate {
    /// Solid uniform cylinder of the given mass, radius and height.
    pub fn cylinder(mass: f64, radius: f64, height: f64) -> Self {
        let transverse = mass * (3.0 * radius.powi(2) + height.powi(2)) / 12.0;
        Self {
            ix: transverse,
            iy: transverse,
            iz: mass * radius.powi(2) / 2.0,
        }
    }

    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.ix, self.iy, self.iz)
    }
}
