// bicycle_core/src/models/dynamics/bicycle.rs

use nalgebra::{DMatrix, Matrix4, Matrix4x2, Vector4};

use crate::error::{check_dim, Result};
use crate::layout::{StateLayout, BASE_DIM, IDX_HEADING, IDX_PX, IDX_PY, IDX_SPEED};
use crate::models::dynamics::ProcessModel;
use crate::types::{check_timestep, Control, ControlInput, State, VehicleGeometry, CONTROL_DIM};

/// Quadratic drag coefficient applied against the direction of travel (1/m).
pub const DRAG_COEFFICIENT: f64 = 0.63;

/// `[x, y, heading, speed]`, the part of the state every layout shares.
pub type BaseState = Vector4<f64>;

/// Kinematic bicycle model, discretized with a single explicit Euler step.
///
/// State (base part): `[x, y, heading, speed]`
/// Control input: `[steering_angle, acceleration]`
///
/// ```text
/// beta    = atan(L_f / (L_f + L_r) * tan(delta))
/// x'      = x + dt * v * cos(psi + beta)
/// y'      = y + dt * v * sin(psi + beta)
/// psi'    = psi + dt * v / L_r * sin(beta)
/// v'      = v + dt * (a - c_d * sign(v) * v^2)
/// ```
///
/// The same update drives all three layouts. The heading drift term is
/// carried through unchanged, and the look-ahead block is the updated base
/// state pushed a further `look_ahead_dt` along the same rates.
#[derive(Debug, Clone)]
pub struct KinematicBicycle {
    pub geometry: VehicleGeometry,
    layout: StateLayout,
    look_ahead_dt: f64,
}

impl KinematicBicycle {
    pub fn new(geometry: VehicleGeometry, layout: StateLayout) -> Self {
        log::debug!("Building {} kinematic bicycle model: {:?}", layout, geometry);
        Self {
            geometry,
            layout,
            look_ahead_dt: 0.0,
        }
    }

    /// `[x, y, heading, speed]`
    pub fn standard(geometry: VehicleGeometry) -> Self {
        Self::new(geometry, StateLayout::Standard)
    }

    /// `[x, y, heading, speed, heading_drift]`
    pub fn with_heading_drift(geometry: VehicleGeometry) -> Self {
        Self::new(geometry, StateLayout::HeadingDrift)
    }

    /// `[x, y, heading, speed, x_pred, y_pred, heading_pred, speed_pred]`
    pub fn predictive(geometry: VehicleGeometry) -> Self {
        Self::new(geometry, StateLayout::Predictive)
    }

    /// Sets the look-ahead horizon used for the predictive block. Defaults to 0,
    /// in which case the look-ahead block equals the updated base state.
    pub fn with_look_ahead(mut self, look_ahead_dt: f64) -> Result<Self> {
        check_timestep(look_ahead_dt)?;
        self.look_ahead_dt = look_ahead_dt;
        Ok(self)
    }

    pub fn look_ahead_dt(&self) -> f64 {
        self.look_ahead_dt
    }

    /// Slip angle `beta` between the heading and the velocity direction.
    pub fn slip_angle(&self, steering_angle: f64) -> f64 {
        (self.geometry.front_ratio() * steering_angle.tan()).atan()
    }

    /// Time derivatives of the base state, evaluated at `(s, u)`.
    pub fn rates(&self, s: &BaseState, u: &ControlInput) -> BaseState {
        let heading = s[IDX_HEADING];
        let v = s[IDX_SPEED];
        let beta = self.slip_angle(u.steering_angle);

        BaseState::new(
            v * (heading + beta).cos(),
            v * (heading + beta).sin(),
            v / self.geometry.cg_to_rear() * beta.sin(),
            u.acceleration - DRAG_COEFFICIENT * sign(v) * v * v,
        )
    }

    /// `∂rates/∂s` and `∂rates/∂u`.
    fn rate_jacobians(&self, s: &BaseState, u: &ControlInput) -> (Matrix4<f64>, Matrix4x2<f64>) {
        let heading = s[IDX_HEADING];
        let v = s[IDX_SPEED];
        let delta = u.steering_angle;
        let k = self.geometry.front_ratio();
        let l_r = self.geometry.cg_to_rear();

        let beta = self.slip_angle(delta);
        let course = heading + beta;
        // d(beta)/d(delta) = k * sec^2(delta) / (1 + (k * tan(delta))^2)
        let k_tan = k * delta.tan();
        let dbeta = k / (delta.cos().powi(2) * (1.0 + k_tan * k_tan));

        let mut r_s = Matrix4::<f64>::zeros();
        r_s[(IDX_PX, IDX_HEADING)] = -v * course.sin();
        r_s[(IDX_PX, IDX_SPEED)] = course.cos();
        r_s[(IDX_PY, IDX_HEADING)] = v * course.cos();
        r_s[(IDX_PY, IDX_SPEED)] = course.sin();
        r_s[(IDX_HEADING, IDX_SPEED)] = beta.sin() / l_r;
        // d(sign(v) * v^2)/dv = 2|v|
        r_s[(IDX_SPEED, IDX_SPEED)] = -2.0 * DRAG_COEFFICIENT * v.abs();

        let mut r_u = Matrix4x2::<f64>::zeros();
        r_u[(IDX_PX, 0)] = -v * course.sin() * dbeta;
        r_u[(IDX_PY, 0)] = v * course.cos() * dbeta;
        r_u[(IDX_HEADING, 0)] = v / l_r * beta.cos() * dbeta;
        r_u[(IDX_SPEED, 1)] = 1.0;

        (r_s, r_u)
    }

    fn read_inputs(&self, x: &State, u: &Control, dt: f64) -> Result<(BaseState, ControlInput)> {
        check_dim("state vector", self.layout.dim(), x.nrows())?;
        check_timestep(dt)?;
        let control = ControlInput::from_vector(u)?;
        let base: BaseState = x.fixed_rows::<BASE_DIM>(0).into_owned();
        Ok((base, control))
    }
}

impl ProcessModel for KinematicBicycle {
    fn get_state_layout(&self) -> StateLayout {
        self.layout
    }

    fn get_control_dim(&self) -> usize {
        CONTROL_DIM
    }

    fn propagate(&self, x: &State, u: &Control, dt: f64) -> Result<State> {
        let (base, control) = self.read_inputs(x, u, dt)?;

        let rates = self.rates(&base, &control);
        let next = base + rates * dt;

        // Entries past the base block (heading drift) pass through untouched.
        let mut x_next = x.clone();
        x_next.fixed_rows_mut::<BASE_DIM>(0).copy_from(&next);

        if let Some(offset) = self.layout.look_ahead_offset() {
            let look_ahead = next + rates * self.look_ahead_dt;
            x_next
                .fixed_rows_mut::<BASE_DIM>(offset)
                .copy_from(&look_ahead);
        }

        Ok(x_next)
    }

    fn calculate_jacobian(
        &self,
        x: &State,
        u: &Control,
        dt: f64,
    ) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
        let (base, control) = self.read_inputs(x, u, dt)?;
        let (r_s, r_u) = self.rate_jacobians(&base, &control);

        let n = self.layout.dim();
        // Identity covers the base block and the heading drift passthrough.
        let mut f_jac = DMatrix::<f64>::identity(n, n);
        let mut b_jac = DMatrix::<f64>::zeros(n, CONTROL_DIM);

        f_jac
            .fixed_view_mut::<BASE_DIM, BASE_DIM>(0, 0)
            .copy_from(&(Matrix4::<f64>::identity() + r_s * dt));
        b_jac
            .fixed_view_mut::<BASE_DIM, CONTROL_DIM>(0, 0)
            .copy_from(&(r_u * dt));

        if let Some(offset) = self.layout.look_ahead_offset() {
            // The look-ahead block depends only on the base block; its own inputs are overwritten.
            let horizon = dt + self.look_ahead_dt;
            f_jac
                .fixed_view_mut::<BASE_DIM, BASE_DIM>(offset, offset)
                .fill(0.0);
            f_jac
                .fixed_view_mut::<BASE_DIM, BASE_DIM>(offset, 0)
                .copy_from(&(Matrix4::<f64>::identity() + r_s * horizon));
            b_jac
                .fixed_view_mut::<BASE_DIM, CONTROL_DIM>(offset, 0)
                .copy_from(&(r_u * horizon));
        }

        Ok((f_jac, b_jac))
    }
}

/// Sign function with `sign(0) = 0`, unlike `f64::signum`.
fn sign(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v.signum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_PI_4;

    const EPS: f64 = 1e-12;

    fn geometry() -> VehicleGeometry {
        VehicleGeometry::new(1.0, 1.0).unwrap()
    }

    fn control(steering_angle: f64, acceleration: f64) -> Control {
        ControlInput::new(steering_angle, acceleration).to_vector()
    }

    fn assert_vectors_eq(actual: &State, expected: &[f64], epsilon: f64) {
        assert_eq!(actual.nrows(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(*a, *e, epsilon = epsilon);
        }
    }

    /// Central finite differences of `propagate` w.r.t. the state and the control.
    fn numerical_jacobian(
        model: &KinematicBicycle,
        x: &State,
        u: &Control,
        dt: f64,
    ) -> (DMatrix<f64>, DMatrix<f64>) {
        let h = 1e-6;
        let n = x.nrows();
        let mut f_num = DMatrix::zeros(n, n);
        for j in 0..n {
            let mut xp = x.clone();
            let mut xm = x.clone();
            xp[j] += h;
            xm[j] -= h;
            let diff = (model.propagate(&xp, u, dt).unwrap() - model.propagate(&xm, u, dt).unwrap())
                / (2.0 * h);
            f_num.set_column(j, &diff);
        }
        let mut b_num = DMatrix::zeros(n, CONTROL_DIM);
        for j in 0..CONTROL_DIM {
            let mut up = u.clone();
            let mut um = u.clone();
            up[j] += h;
            um[j] -= h;
            let diff = (model.propagate(x, &up, dt).unwrap() - model.propagate(x, &um, dt).unwrap())
                / (2.0 * h);
            b_num.set_column(j, &diff);
        }
        (f_num, b_num)
    }

    #[test]
    fn straight_line_example() {
        let model = KinematicBicycle::standard(geometry());
        let x = State::from_vec(vec![0.0, 0.0, 0.0, 1.0]);
        let x_next = model.propagate(&x, &control(0.0, 0.5), 0.1).unwrap();
        // v' = 1 + 0.1 * (0.5 - 0.63)
        assert_vectors_eq(&x_next, &[0.1, 0.0, 0.0, 0.987], EPS);
    }

    #[test]
    fn speed_from_rest_is_acceleration_times_dt() {
        let model = KinematicBicycle::standard(geometry());
        for (accel, dt) in [(0.5, 0.1), (-2.0, 0.02), (3.0, 1.0)] {
            let x = State::from_vec(vec![3.0, -1.0, 0.7, 0.0]);
            let x_next = model.propagate(&x, &control(0.3, accel), dt).unwrap();
            assert_abs_diff_eq!(x_next[IDX_SPEED], accel * dt, epsilon = EPS);
            // Nothing moves at zero speed.
            assert_vectors_eq(&x_next.rows(0, 3).into_owned(), &[3.0, -1.0, 0.7], EPS);
        }
    }

    #[test]
    fn zero_steering_drives_straight_along_heading() {
        let model = KinematicBicycle::standard(VehicleGeometry::new(1.2, 1.6).unwrap());
        let (x0, y0, heading, v, dt) = (2.0, -3.0, 0.9, 4.0, 0.05);
        let x = State::from_vec(vec![x0, y0, heading, v]);
        let x_next = model.propagate(&x, &control(0.0, 1.0), dt).unwrap();

        assert_abs_diff_eq!(model.slip_angle(0.0), 0.0);
        assert_abs_diff_eq!(x_next[IDX_PX], x0 + dt * v * heading.cos(), epsilon = EPS);
        assert_abs_diff_eq!(x_next[IDX_PY], y0 + dt * v * heading.sin(), epsilon = EPS);
        assert_abs_diff_eq!(x_next[IDX_HEADING], heading, epsilon = EPS);
    }

    #[test]
    fn drag_opposes_motion_in_both_directions() {
        let model = KinematicBicycle::standard(geometry());
        let forward = model
            .propagate(&State::from_vec(vec![0.0, 0.0, 0.0, 2.0]), &control(0.0, 0.0), 0.1)
            .unwrap();
        let reverse = model
            .propagate(&State::from_vec(vec![0.0, 0.0, 0.0, -2.0]), &control(0.0, 0.0), 0.1)
            .unwrap();

        assert_abs_diff_eq!(forward[IDX_SPEED], 2.0 - 0.1 * 0.63 * 4.0, epsilon = EPS);
        assert_abs_diff_eq!(reverse[IDX_SPEED], -forward[IDX_SPEED], epsilon = EPS);
    }

    #[test]
    fn turning_matches_closed_form() {
        let geometry = VehicleGeometry::new(1.0, 3.0).unwrap();
        let model = KinematicBicycle::standard(geometry);
        let (heading, v, delta, dt) = (0.2, 5.0, FRAC_PI_4, 0.1);
        let x = State::from_vec(vec![0.0, 0.0, heading, v]);
        let x_next = model.propagate(&x, &control(delta, 0.0), dt).unwrap();

        let beta = (0.25 * delta.tan()).atan();
        assert_abs_diff_eq!(model.slip_angle(delta), beta, epsilon = EPS);
        assert_vectors_eq(
            &x_next,
            &[
                dt * v * (heading + beta).cos(),
                dt * v * (heading + beta).sin(),
                heading + dt * v / 3.0 * beta.sin(),
                v - dt * 0.63 * v * v,
            ],
            EPS,
        );
    }

    #[test]
    fn heading_drift_passes_through() {
        let standard = KinematicBicycle::standard(geometry());
        let drift = KinematicBicycle::with_heading_drift(geometry());
        let u = control(-0.2, 0.4);

        for bias in [0.0, 0.013, -1.5, 1e-9] {
            let x = State::from_vec(vec![1.0, 2.0, 0.3, 1.5, bias]);
            let x_next = drift.propagate(&x, &u, 0.1).unwrap();
            assert_eq!(x_next[4], bias);

            let base_next = standard
                .propagate(&x.rows(0, BASE_DIM).into_owned(), &u, 0.1)
                .unwrap();
            assert_eq!(x_next.rows(0, BASE_DIM), base_next.rows(0, BASE_DIM));
        }
    }

    #[test]
    fn predictive_look_ahead_block_equals_update_by_default() {
        let model = KinematicBicycle::predictive(geometry());
        assert_eq!(model.look_ahead_dt(), 0.0);

        let x = State::from_vec(vec![1.0, -2.0, 0.4, 2.5, 9.0, 9.0, 9.0, 9.0]);
        let x_next = model.propagate(&x, &control(0.1, -0.3), 0.1).unwrap();
        assert_eq!(x_next.rows(4, 4), x_next.rows(0, 4));

        let standard = KinematicBicycle::standard(geometry());
        let base_next = standard
            .propagate(&x.rows(0, BASE_DIM).into_owned(), &control(0.1, -0.3), 0.1)
            .unwrap();
        assert_eq!(x_next.rows(0, BASE_DIM), base_next.rows(0, BASE_DIM));
    }

    #[test]
    fn predictive_look_ahead_extends_from_updated_state() {
        let model = KinematicBicycle::predictive(geometry())
            .with_look_ahead(0.5)
            .unwrap();
        let x = State::from_vec(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        let x_next = model.propagate(&x, &control(0.0, 0.5), 0.1).unwrap();

        // Rates evaluated at the pre-update state: [1, 0, 0, -0.13]
        assert_vectors_eq(
            &x_next,
            &[0.1, 0.0, 0.0, 0.987, 0.6, 0.0, 0.0, 0.987 - 0.5 * 0.13],
            EPS,
        );
    }

    #[test]
    fn negative_look_ahead_is_rejected() {
        let err = KinematicBicycle::predictive(geometry())
            .with_look_ahead(-1.0)
            .unwrap_err();
        assert_eq!(err, ModelError::InvalidTimestep(-1.0));
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        let model = KinematicBicycle::with_heading_drift(geometry());
        let x = State::from_vec(vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(
            model.propagate(&x, &control(0.0, 0.0), 0.1).unwrap_err(),
            ModelError::DimensionMismatch {
                what: "state vector",
                expected: 5,
                actual: 4
            }
        );

        let x = State::zeros(5);
        assert!(matches!(
            model.propagate(&x, &Control::zeros(3), 0.1),
            Err(ModelError::DimensionMismatch { expected: 2, actual: 3, .. })
        ));
        assert!(model.propagate(&x, &control(0.0, 0.0), f64::NAN).is_err());
    }

    #[test]
    fn jacobians_match_finite_differences() {
        let geometry = VehicleGeometry::new(1.1, 1.7).unwrap();
        let cases = [
            (
                KinematicBicycle::standard(geometry),
                State::from_vec(vec![1.0, 2.0, 0.6, 3.0]),
            ),
            (
                KinematicBicycle::with_heading_drift(geometry),
                State::from_vec(vec![1.0, 2.0, -0.6, -1.5, 0.02]),
            ),
            (
                KinematicBicycle::predictive(geometry)
                    .with_look_ahead(0.3)
                    .unwrap(),
                State::from_vec(vec![1.0, 2.0, 2.1, 2.0, 0.0, 0.0, 0.0, 0.0]),
            ),
        ];
        let u = control(0.25, 0.8);
        let dt = 0.05;

        for (model, x) in cases {
            let (f_jac, b_jac) = model.calculate_jacobian(&x, &u, dt).unwrap();
            let (f_num, b_num) = numerical_jacobian(&model, &x, &u, dt);
            assert_eq!(f_jac.shape(), (x.nrows(), x.nrows()));
            assert_eq!(b_jac.shape(), (x.nrows(), CONTROL_DIM));
            assert_relative_eq!(f_jac, f_num, epsilon = 1e-6);
            assert_relative_eq!(b_jac, b_num, epsilon = 1e-6);
        }
    }

    #[test]
    fn boxed_models_clone() {
        let boxed: Box<dyn ProcessModel> = Box::new(KinematicBicycle::predictive(geometry()));
        let cloned = boxed.clone();
        assert_eq!(cloned.get_state_dim(), 8);
        assert_eq!(cloned.get_control_dim(), 2);
        assert_eq!(cloned.get_state_variables().len(), 8);
    }
}
