use crate::environment::Environment;
use crate::error::{check, EngineError};
use crate::motor::SolidMotor;
use crate::rocket::Rocket;
use crate::solution::{SolutionMatrix, SOLUTION_COLUMNS};
use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use std::cell::OnceCell;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------
const DT: f64 = 0.001; // 1kHz physics for stability
const SAMPLE_EVERY: usize = 10; // 100 Hz output rows
pub const DEFAULT_MAX_TIME: f64 = 600.0;

// ---------------------------------------------------------------------------
// Flight
// ---------------------------------------------------------------------------
/// Key events of a solved flight.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlightSummary {
    pub apogee: f64,      // m above sea level
    pub apogee_time: f64, // s
    pub out_of_rail_time: Option<f64>,
    pub out_of_rail_velocity: Option<f64>,
    pub max_speed: f64,   // m/s
    pub flight_time: f64, // s
}

struct Trajectory {
    solution: SolutionMatrix,
    summary: FlightSummary,
}

pub struct Flight {
    rocket: Rocket,
    environment: Environment,
    rail_length: f64, // m
    inclination: f64, // deg from horizontal
    heading: f64,     // deg from north
    max_time: f64,    // s
    outcome: OnceCell<Result<Trajectory, EngineError>>,
}

impl Flight {
    pub fn new(
        rocket: Rocket,
        environment: Environment,
        rail_length: f64,
        inclination: f64,
        heading: f64,
    ) -> Self {
        Self {
            rocket,
            environment,
            rail_length,
            inclination,
            heading,
            max_time: DEFAULT_MAX_TIME,
            outcome: OnceCell::new(),
        }
    }

    pub fn with_max_time(mut self, max_time: f64) -> Self {
        self.max_time = max_time;
        self.outcome = OnceCell::new();
        self
    }

    pub fn rocket(&self) -> &Rocket {
        &self.rocket
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Highest point reached (m above sea level). Runs the solver on first use.
    pub fn apogee(&self) -> Result<f64, EngineError> {
        self.trajectory().map(|t| t.summary.apogee)
    }

    pub fn summary(&self) -> Result<FlightSummary, EngineError> {
        self.trajectory().map(|t| t.summary)
    }

    pub fn solution(&self) -> Result<&SolutionMatrix, EngineError> {
        self.trajectory().map(|t| &t.solution)
    }

    fn trajectory(&self) -> Result<&Trajectory, EngineError> {
        self.outcome
            .get_or_init(|| self.integrate())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn integrate(&self) -> Result<Trajectory, EngineError> {
        let model = Model::new(self)?;
        tracing::debug!(
            rail_length = self.rail_length,
            inclination = self.inclination,
            heading = self.heading,
            lift_off_mass = self.rocket.lift_off_mass(),
            "integrating flight"
        );

        let mut s = State::new(&model, self.rocket.lift_off_mass());
        let max_steps = (self.max_time / DT).round() as usize;

        let mut solution = SolutionMatrix::with_capacity(SOLUTION_COLUMNS, max_steps / SAMPLE_EVERY + 2);
        let mut summary = FlightSummary {
            apogee: s.pos_w.z,
            ..FlightSummary::default()
        };
        let mut lifted_off = false;
        let mut last_recorded = None;

        for step in 0..max_steps {
            // Record
            if step % SAMPLE_EVERY == 0 {
                solution.push_row(&s.row());
                last_recorded = Some(step);
            }

            // RK4 Step
            let k1 = calculate_derivative(&s, &model);

            let s2 = step_state(&s, &k1, DT * 0.5);
            let k2 = calculate_derivative(&s2, &model);

            let s3 = step_state(&s, &k2, DT * 0.5);
            let k3 = calculate_derivative(&s3, &model);

            let s4 = step_state(&s, &k3, DT);
            let k4 = calculate_derivative(&s4, &model);

            // Combine
            s.pos_w += (k1.d_pos + k2.d_pos * 2.0 + k3.d_pos * 2.0 + k4.d_pos) * (DT / 6.0);
            s.vel_w += (k1.d_vel + k2.d_vel * 2.0 + k3.d_vel * 2.0 + k4.d_vel) * (DT / 6.0);
            s.mass += (k1.d_mass + k2.d_mass * 2.0 + k3.d_mass * 2.0 + k4.d_mass) * (DT / 6.0);
            s.ang_vel_b +=
                (k1.d_ang_vel + k2.d_ang_vel * 2.0 + k3.d_ang_vel * 2.0 + k4.d_ang_vel) * (DT / 6.0);

            // Quaternion integration with the step-mean body rate
            let w_mean = (k1.d_att + k2.d_att * 2.0 + k3.d_att * 2.0 + k4.d_att) / 6.0;
            s.att *= UnitQuaternion::from_scaled_axis(w_mean * DT);

            s.t = (step + 1) as f64 * DT;

            if !s.is_finite() {
                return Err(EngineError::Diverged { time: s.t });
            }

            // Events
            let speed = s.vel_w.norm();
            summary.max_speed = summary.max_speed.max(speed);
            if s.pos_w.z > summary.apogee {
                summary.apogee = s.pos_w.z;
                summary.apogee_time = s.t;
            }

            let travelled = model.travelled(&s);
            lifted_off |= travelled > 0.0;
            if !s.rail_cleared && travelled >= model.rail_length {
                s.rail_cleared = true;
                summary.out_of_rail_time = Some(s.t);
                summary.out_of_rail_velocity = Some(speed);
            }

            // Termination: ground impact
            if lifted_off && s.pos_w.z < model.origin.z {
                break;
            }
            // Termination: never left the pad
            if !lifted_off && s.t > model.motor.burn_time {
                break;
            }
        }

        if last_recorded.map_or(true, |step| step as f64 * DT < s.t) {
            solution.push_row(&s.row());
        }
        summary.flight_time = s.t;

        tracing::debug!(
            rows = solution.rows(),
            apogee = summary.apogee,
            flight_time = summary.flight_time,
            "flight integrated"
        );

        Ok(Trajectory { solution, summary })
    }
}

// ---------------------------------------------------------------------------
// Physical model, fixed for a whole flight
// ---------------------------------------------------------------------------
struct Model<'a> {
    rocket: &'a Rocket,
    motor: &'a SolidMotor,
    environment: &'a Environment,
    origin: Vector3<f64>,
    rail_dir: Vector3<f64>,
    rail_length: f64,
    ref_area: f64,
    inertia: Matrix3<f64>,
    inertia_inv: Matrix3<f64>,
    exhaust_velocity: Option<f64>,
}

impl<'a> Model<'a> {
    fn new(flight: &'a Flight) -> Result<Self, EngineError> {
        flight.rocket.validate()?;
        check("rail length", flight.rail_length, flight.rail_length >= 0.0)?;
        check("inclination", flight.inclination, true)?;
        check("heading", flight.heading, true)?;
        check("max time", flight.max_time, flight.max_time > 0.0)?;
        check("elevation", flight.environment.elevation, true)?;

        let motor = &flight
            .rocket
            .motor()
            .ok_or(EngineError::MissingMotor)?
            .motor;

        let inertia = flight.rocket.inertia_tensor();
        let inertia_inv = inertia.try_inverse().ok_or_else(|| {
            let d = inertia.diagonal();
            EngineError::SingularInertia([d.x, d.y, d.z])
        })?;

        // ENU: x east, y north, z up
        let (inc, hdg) = (flight.inclination.to_radians(), flight.heading.to_radians());
        let rail_dir = Vector3::new(inc.cos() * hdg.sin(), inc.cos() * hdg.cos(), inc.sin());

        Ok(Self {
            rocket: &flight.rocket,
            motor,
            environment: &flight.environment,
            origin: Vector3::new(0.0, 0.0, flight.environment.elevation),
            rail_dir,
            rail_length: flight.rail_length,
            ref_area: flight.rocket.reference_area(),
            inertia,
            inertia_inv,
            exhaust_velocity: motor.exhaust_velocity(),
        })
    }

    /// Distance covered along the rail from the pad.
    fn travelled(&self, s: &State) -> f64 {
        (s.pos_w - self.origin).dot(&self.rail_dir)
    }
}

// ---------------------------------------------------------------------------
// 6-DoF State
// ---------------------------------------------------------------------------
#[derive(Clone, Debug)]
struct State {
    t: f64,
    pos_w: Vector3<f64>,      // Position (World ENU)
    vel_w: Vector3<f64>,      // Velocity (World ENU)
    att: UnitQuaternion<f64>, // Attitude (Body -> World)
    ang_vel_b: Vector3<f64>,  // Angular Velocity (Body Frame)
    mass: f64,
    rail_cleared: bool,
}

impl State {
    fn new(model: &Model<'_>, mass: f64) -> Self {
        // Body Z points along the rail. A rail pointing straight down has no
        // shortest-arc rotation; flip about body X instead.
        let att = UnitQuaternion::rotation_between(&Vector3::z(), &model.rail_dir)
            .unwrap_or_else(|| {
                UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI)
            });

        Self {
            t: 0.0,
            pos_w: model.origin,
            vel_w: Vector3::zeros(),
            att,
            ang_vel_b: Vector3::zeros(),
            mass,
            rail_cleared: false,
        }
    }

    fn row(&self) -> [f64; SOLUTION_COLUMNS] {
        let q = self.att.quaternion();
        let v = q.imag();
        [
            self.t,
            self.pos_w.x,
            self.pos_w.y,
            self.pos_w.z,
            self.vel_w.x,
            self.vel_w.y,
            self.vel_w.z,
            q.scalar(),
            v.x,
            v.y,
            v.z,
            self.ang_vel_b.x,
            self.ang_vel_b.y,
            self.ang_vel_b.z,
        ]
    }

    fn is_finite(&self) -> bool {
        self.pos_w.iter().all(|x| x.is_finite())
            && self.vel_w.iter().all(|x| x.is_finite())
            && self.ang_vel_b.iter().all(|x| x.is_finite())
            && self.mass.is_finite()
    }
}

// ---------------------------------------------------------------------------
// Physics Engine
// ---------------------------------------------------------------------------
struct Derivative {
    d_pos: Vector3<f64>,
    d_vel: Vector3<f64>,
    d_att: Vector3<f64>, // Angular velocity vector for quaternion integration
    d_ang_vel: Vector3<f64>,
    d_mass: f64,
}

fn calculate_derivative(s: &State, m: &Model<'_>) -> Derivative {
    // 1. Environment
    let air = m.environment.atmosphere(s.pos_w.z);
    let g = m.environment.gravity(s.pos_w.z);

    // 2. Aerodynamics (World Frame, still air)
    let speed = s.vel_w.norm();
    let force_aero_w = if speed > 1e-9 {
        let q_dynamic = 0.5 * air.density * speed * speed;
        -s.vel_w / speed * (q_dynamic * m.ref_area * m.rocket.drag_coefficient(s.t))
    } else {
        Vector3::zeros()
    };

    // 3. Propulsion (Body Z)
    let thrust = m.motor.thrust(s.t);
    let force_thrust_w = s.att.transform_vector(&Vector3::new(0.0, 0.0, thrust));

    // 4. Gravity
    let force_gravity_w = Vector3::new(0.0, 0.0, -g * s.mass);

    let mut total_force_w = force_aero_w + force_thrust_w + force_gravity_w;

    // 5. Launch Rail Constraint
    // On the rail only the axial component acts and the vehicle cannot rotate.
    // A vehicle resting on the pad stays there until thrust beats weight.
    let travelled = m.travelled(s);
    let on_rail = !s.rail_cleared && travelled < m.rail_length;
    if on_rail {
        let axial = total_force_w.dot(&m.rail_dir);
        let resting = travelled <= 0.0 && s.vel_w.dot(&m.rail_dir) <= 0.0 && axial <= 0.0;
        total_force_w = if resting {
            Vector3::zeros()
        } else {
            m.rail_dir * axial
        };
    }

    // 6. Rotational dynamics
    // No aerodynamic moments are modelled; only gyroscopic coupling remains.
    // alpha = I_inv * (M - w x (I * w))
    let ang_accel_b = if on_rail {
        Vector3::zeros()
    } else {
        let gyroscopic = s.ang_vel_b.cross(&(m.inertia * s.ang_vel_b));
        m.inertia_inv * -gyroscopic
    };

    // Mass flow follows delivered impulse
    let d_mass = match m.exhaust_velocity {
        Some(ve) => -thrust / ve,
        None => 0.0,
    };

    Derivative {
        d_pos: s.vel_w,
        d_vel: total_force_w / s.mass,
        d_att: s.ang_vel_b,
        d_ang_vel: ang_accel_b,
        d_mass,
    }
}

fn step_state(s: &State, d: &Derivative, dt: f64) -> State {
    let mut ns = s.clone();
    ns.t += dt;
    ns.pos_w += d.d_pos * dt;
    ns.vel_w += d.d_vel * dt;
    ns.ang_vel_b += d.d_ang_vel * dt;
    ns.mass += d.d_mass * dt;

    // Simple Euler step for quaternion in intermediate RK stages
    ns.att *= UnitQuaternion::from_scaled_axis(d.d_att * dt);
    ns
}
