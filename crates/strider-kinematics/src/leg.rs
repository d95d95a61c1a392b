//! One leg of the walking robot: chain construction, forward and inverse
//! kinematics, and quasi-static tip force estimation.

use nalgebra::{DVector, Matrix4, Vector3};
use tracing::{debug, warn};

use strider_core::config::LegConfig;
use strider_core::types::LegState;

use crate::chain::{Joint, Link, Tip};
use crate::dh::{self, DhParameters};
use crate::ik::{
    dls_pseudo_inverse, IkReport, LimitBound, LimitClamp, ToleranceViolation, IK_TOLERANCE,
};
use crate::jacobian::jacobian;

/// Record of a joint command clamped to its maximum angular speed.
#[derive(Debug, Clone)]
pub struct SpeedClamp {
    /// Full joint designation.
    pub joint: String,
    /// Commanded angular speed before clamping (rad/s).
    pub commanded_speed: f64,
    /// The configured maximum (rad/s).
    pub max_angular_speed: f64,
}

/// One kinematic chain from leg base to tip.
///
/// Owns its joint and link arenas plus the tip frame. All per-cycle
/// mutation happens through [`apply_fk`](Self::apply_fk),
/// [`apply_ik`](Self::apply_ik), [`update_tip_force`](Self::update_tip_force)
/// and the sensed-state fields on the joints themselves.
#[derive(Debug, Clone)]
pub struct Leg {
    id_number: usize,
    id_name: String,
    mirror_dir: f64,
    stance_yaw: f64,
    group: usize,
    state: LegState,
    time_delta: f64,
    dls_damping: f64,

    joints: Vec<Joint>,
    links: Vec<Link>,
    tip: Tip,

    local_tip_position: Option<Vector3<f64>>,
    desired_tip_position: Vector3<f64>,
    desired_tip_velocity: Vector3<f64>,
    tip_force: Vector3<f64>,
    delta_z: f64,

    max_virtual_leg_length: f64,
    min_virtual_leg_length: f64,
}

impl Leg {
    /// Build the chain from a validated leg configuration.
    ///
    /// The configuration must already satisfy the chain invariants
    /// (`links.len() == joints.len() + 1`, ordered limits); `Model::new`
    /// validates before constructing any leg.
    pub(crate) fn new(
        config: &LegConfig,
        id_number: usize,
        time_delta: f64,
        dls_damping: f64,
    ) -> Self {
        let links: Vec<Link> = config
            .links
            .iter()
            .enumerate()
            .map(|(index, link_config)| Link::new(&config.name, link_config, index))
            .collect();
        let joints: Vec<Joint> = config
            .joints
            .iter()
            .enumerate()
            .map(|(index, joint_config)| Joint::new(&config.name, joint_config, index))
            .collect();
        let tip = Tip::new(&config.name, &links[links.len() - 1]);

        // Left/right sign convention and phase grouping follow id parity.
        let mirror_dir = if id_number % 2 == 0 { -1.0 } else { 1.0 };
        let group = id_number % 2;

        // Reach with every joint at zero (clamped into its limits) bounds
        // the workspace; the tip can fold back onto the leg base, so the
        // minimum is zero.
        let mut reach = Matrix4::identity();
        for (link, joint) in links.iter().skip(1).zip(&joints) {
            let angle = 0.0_f64.clamp(joint.min_position, joint.max_position);
            reach *= link.dh_with_angle(angle).to_matrix();
        }
        let max_virtual_leg_length = dh::transform_point(&reach, &Vector3::zeros()).norm();

        debug!(
            leg = %config.name,
            dof = joints.len(),
            links = links.len(),
            max_virtual_leg_length,
            "leg chain constructed"
        );

        Self {
            id_number,
            id_name: config.name.clone(),
            mirror_dir,
            stance_yaw: config.stance_yaw,
            group,
            state: LegState::Walking,
            time_delta,
            dls_damping,
            joints,
            links,
            tip,
            local_tip_position: None,
            desired_tip_position: Vector3::zeros(),
            desired_tip_velocity: Vector3::zeros(),
            tip_force: Vector3::zeros(),
            delta_z: 0.0,
            max_virtual_leg_length,
            min_virtual_leg_length: 0.0,
        }
    }

    /// Initialise the leg for control.
    ///
    /// With `use_default_joint_positions` the sensed state is seeded with
    /// each joint's zero position clamped into its limits (for startup
    /// without encoder data); otherwise the current sensed positions are
    /// kept. Either way every joint's desired position is aligned with its
    /// current position, the previous-desired snapshot is taken, and FK
    /// establishes the local and desired tip positions.
    pub fn init(&mut self, use_default_joint_positions: bool) {
        for joint in &mut self.joints {
            if use_default_joint_positions {
                joint.current_position = 0.0_f64.clamp(joint.min_position, joint.max_position);
                joint.current_velocity = 0.0;
                joint.current_effort = 0.0;
            }
            joint.desired_position = joint.current_position;
            joint.prev_desired_position = joint.desired_position;
        }
        let tip_position = self.apply_fk(true);
        self.desired_tip_position = tip_position;
    }

    /// Run forward kinematics from the joints' desired positions.
    ///
    /// Recomputes each non-base link transform and the tip transform, then
    /// returns the tip position in the leg base frame. With `set_local` the
    /// local tip position is updated and, once a previous position exists,
    /// the desired tip velocity is derived from the position change over
    /// one control cycle.
    pub fn apply_fk(&mut self, set_local: bool) -> Vector3<f64> {
        // The first joint's frame comes from the fixed base link; its
        // transform never changes after construction.
        for k in 1..self.joints.len() {
            let link_index = self.joints[k].reference_link;
            let angle = self.actuating_angle(link_index);
            self.links[link_index].transform =
                self.links[link_index].dh_with_angle(angle).to_matrix();
        }
        let tip_link = &self.links[self.tip.reference_link];
        let last_angle = self.actuating_angle(self.tip.reference_link);
        self.tip.transform = tip_link.dh_with_angle(last_angle).to_matrix();

        let tip_position = self.tip_position_world();
        if set_local {
            if let Some(previous) = self.local_tip_position {
                self.desired_tip_velocity = (tip_position - previous) / self.time_delta;
            }
            self.local_tip_position = Some(tip_position);
        }
        tip_position
    }

    /// Move the joints one incremental step towards the desired tip
    /// position.
    ///
    /// Builds the Jacobian from the joints' desired positions (keeping
    /// consecutive calls consistent), solves the damped-least-squares
    /// system for the tip displacement expressed in the first joint's
    /// frame, adds the resulting deltas to the previous desired positions,
    /// optionally clamps to the position limits, and verifies the outcome
    /// with FK against a fixed per-axis tolerance. Clamping and tolerance
    /// violations are warned about and recorded in the report; neither
    /// aborts the step.
    pub fn apply_ik(&mut self, clamp_to_limits: bool) -> IkReport {
        // Each call is one incremental step from the current command.
        for joint in &mut self.joints {
            joint.prev_desired_position = joint.desired_position;
        }

        let dh_parameters = self.actuated_dh_parameters();
        let j = jacobian(&dh_parameters);
        let Some(ik_matrix) = dls_pseudo_inverse(&j, self.dls_damping) else {
            warn!(leg = %self.id_name, "non-finite Jacobian, joint commands left unchanged");
            return IkReport {
                within_workspace: true,
                tip_position: self.apply_fk(true),
                clamped: Vec::new(),
                tolerance_violations: Vec::new(),
            };
        };

        // Tip displacement in the first joint's frame.
        let base_inverse = dh::invert_rigid(&self.links[0].transform);
        let target = dh::transform_point(&base_inverse, &self.desired_tip_position);
        let current = dh::transform_point(
            &base_inverse,
            &self.local_tip_position.unwrap_or(self.desired_tip_position),
        );
        let displacement = target - current;
        let displacement =
            DVector::from_column_slice(&[displacement.x, displacement.y, displacement.z]);

        let joint_deltas = &ik_matrix * &displacement;

        let mut clamped = Vec::new();
        for (k, joint) in self.joints.iter_mut().enumerate() {
            joint.desired_position = joint.prev_desired_position + joint_deltas[k];
            if !clamp_to_limits {
                continue;
            }
            if joint.desired_position < joint.min_position {
                warn!(
                    leg = %self.id_name,
                    joint = %joint.name,
                    attempted = joint.desired_position,
                    limit = joint.min_position,
                    "desired position exceeds min joint limit, clamping"
                );
                clamped.push(LimitClamp {
                    joint: joint.name.clone(),
                    attempted: joint.desired_position,
                    limit: joint.min_position,
                    bound: LimitBound::Min,
                });
                joint.desired_position = joint.min_position;
            } else if joint.desired_position > joint.max_position {
                warn!(
                    leg = %self.id_name,
                    joint = %joint.name,
                    attempted = joint.desired_position,
                    limit = joint.max_position,
                    "desired position exceeds max joint limit, clamping"
                );
                clamped.push(LimitClamp {
                    joint: joint.name.clone(),
                    attempted: joint.desired_position,
                    limit: joint.max_position,
                    bound: LimitBound::Max,
                });
                joint.desired_position = joint.max_position;
            }
        }

        let result = self.apply_fk(true);

        let mut tolerance_violations = Vec::new();
        for (axis_index, axis) in ["x", "y", "z"].into_iter().enumerate() {
            let desired = self.desired_tip_position[axis_index];
            let actual = result[axis_index];
            if (actual - desired).abs() > IK_TOLERANCE {
                let error_percentage = ((actual - desired) / desired).abs() * 100.0;
                warn!(
                    leg = %self.id_name,
                    axis,
                    desired,
                    actual,
                    error_percentage,
                    "inverse kinematics tolerance exceeded"
                );
                tolerance_violations.push(ToleranceViolation {
                    axis,
                    desired,
                    actual,
                    error_percentage,
                });
            }
        }

        IkReport {
            within_workspace: true,
            tip_position: result,
            clamped,
            tolerance_violations,
        }
    }

    /// Estimate the force at the tip from the sensed joint efforts.
    ///
    /// Quasi-static mapping through the chain Jacobian, expressed in the
    /// first joint's frame; inertial and damping terms are ignored. The
    /// estimate is stored on the leg and returned.
    pub fn update_tip_force(&mut self) -> Vector3<f64> {
        let dh_parameters = self.actuated_dh_parameters();
        let j = jacobian(&dh_parameters);
        let efforts = DVector::from_iterator(
            self.joints.len(),
            self.joints.iter().map(|joint| joint.current_effort),
        );
        let force = &j * &efforts;
        self.tip_force = Vector3::new(force[0], force[1], force[2]);
        debug!(
            leg = %self.id_name,
            fx = self.tip_force.x,
            fy = self.tip_force.y,
            fz = self.tip_force.z,
            "estimated tip force"
        );
        self.tip_force
    }

    /// Set the desired tip position, lowering it by the impedance delta-z.
    ///
    /// Manually manipulated legs are exempt: the operator's commanded
    /// position is stored unmodified.
    pub fn apply_delta_z(&mut self, tip_position: Vector3<f64>) {
        let mut tip_position = tip_position;
        if self.state != LegState::Manual {
            tip_position.z -= self.delta_z;
        }
        self.desired_tip_position = tip_position;
    }

    /// Clamp joint commands whose implied angular speed over one control
    /// cycle exceeds the configured maximum.
    ///
    /// Not called by [`apply_ik`]; speed enforcement is an explicit policy
    /// choice of the orchestrating loop.
    pub fn enforce_speed_limits(&mut self) -> Vec<SpeedClamp> {
        let mut clamps = Vec::new();
        for joint in &mut self.joints {
            let commanded_speed =
                (joint.desired_position - joint.prev_desired_position) / self.time_delta;
            if commanded_speed.abs() > joint.max_angular_speed {
                warn!(
                    leg = %self.id_name,
                    joint = %joint.name,
                    commanded_speed,
                    max_angular_speed = joint.max_angular_speed,
                    "maximum angular speed exceeded, clamping"
                );
                clamps.push(SpeedClamp {
                    joint: joint.name.clone(),
                    commanded_speed,
                    max_angular_speed: joint.max_angular_speed,
                });
                joint.desired_position = joint.prev_desired_position
                    + commanded_speed.signum() * joint.max_angular_speed * self.time_delta;
            }
        }
        clamps
    }

    // -- chain helpers --

    /// DH parameter sets of all actuated segments, base to tip, with each
    /// joint's desired position as the angle. Excludes the fixed base and
    /// includes the tip's virtual joint, so the list length equals the
    /// degree-of-freedom count.
    fn actuated_dh_parameters(&self) -> Vec<DhParameters> {
        self.links
            .iter()
            .skip(1)
            .zip(&self.joints)
            .map(|(link, joint)| link.dh_with_angle(joint.desired_position))
            .collect()
    }

    /// Desired position of the joint actuating the given link.
    fn actuating_angle(&self, link_index: usize) -> f64 {
        match self.links[link_index].actuating_joint {
            Some(joint_index) => self.joints[joint_index].desired_position,
            None => self.links[link_index].angle,
        }
    }

    /// Tip position in the leg base frame from the current transforms.
    fn tip_position_world(&self) -> Vector3<f64> {
        let mut transform = Matrix4::identity();
        for link in &self.links[..self.links.len() - 1] {
            transform *= link.transform;
        }
        transform *= self.tip.transform;
        dh::transform_point(&transform, &Vector3::zeros())
    }

    // -- accessors --

    /// Leg identifier (index into the model's leg array).
    pub fn id_number(&self) -> usize {
        self.id_number
    }

    /// Symbolic leg name.
    pub fn id_name(&self) -> &str {
        &self.id_name
    }

    /// Left/right sign convention: -1 for even ids, +1 for odd.
    pub fn mirror_dir(&self) -> f64 {
        self.mirror_dir
    }

    /// Yaw of the default stance direction in the body frame.
    pub fn stance_yaw(&self) -> f64 {
        self.stance_yaw
    }

    /// Phase group (even/odd leg ids alternate).
    pub fn group(&self) -> usize {
        self.group
    }

    /// Current control state.
    pub fn state(&self) -> LegState {
        self.state
    }

    /// Set the control state.
    pub fn set_state(&mut self, state: LegState) {
        self.state = state;
    }

    /// Number of degrees of freedom.
    pub fn dof(&self) -> usize {
        self.joints.len()
    }

    /// The joint arena in chain order.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Mutable access to the joints, for the sensed-state writer.
    pub fn joints_mut(&mut self) -> &mut [Joint] {
        &mut self.joints
    }

    /// The link arena in chain order (index 0 is the fixed base).
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// The tip frame.
    pub fn tip(&self) -> &Tip {
        &self.tip
    }

    /// Find a joint by its full designation.
    pub fn joint_by_name(&self, name: &str) -> Option<&Joint> {
        self.joints.iter().find(|joint| joint.name == name)
    }

    /// Find a link by its full designation.
    pub fn link_by_name(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.name == name)
    }

    /// Tip position recorded by the last FK pass with `set_local`, if any.
    pub fn local_tip_position(&self) -> Option<Vector3<f64>> {
        self.local_tip_position
    }

    /// Target tip position for the next IK step.
    pub fn desired_tip_position(&self) -> Vector3<f64> {
        self.desired_tip_position
    }

    /// Set the target tip position directly, bypassing delta-z adjustment.
    pub fn set_desired_tip_position(&mut self, tip_position: Vector3<f64>) {
        self.desired_tip_position = tip_position;
    }

    /// Tip velocity derived from the last two FK passes.
    pub fn desired_tip_velocity(&self) -> Vector3<f64> {
        self.desired_tip_velocity
    }

    /// Latest quasi-static tip force estimate.
    pub fn tip_force(&self) -> Vector3<f64> {
        self.tip_force
    }

    /// Impedance controller z offset.
    pub fn delta_z(&self) -> f64 {
        self.delta_z
    }

    /// Set the impedance controller z offset.
    pub fn set_delta_z(&mut self, delta_z: f64) {
        self.delta_z = delta_z;
    }

    /// Greatest tip distance reachable from the leg base, computed once at
    /// construction from the limit-clamped zero pose.
    pub fn max_virtual_leg_length(&self) -> f64 {
        self.max_virtual_leg_length
    }

    /// Smallest tip distance; the tip can coincide with the leg base.
    pub fn min_virtual_leg_length(&self) -> f64 {
        self.min_virtual_leg_length
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;
    use strider_core::config::{JointConfig, LinkConfig};

    const TIME_DELTA: f64 = 0.02;
    const DAMPING: f64 = 0.02;

    fn joint_config(name: &str, min: f64, max: f64) -> JointConfig {
        JointConfig {
            name: name.into(),
            offset: 0.0,
            min,
            max,
            packed: 0.0,
            unpacked: 0.0,
            max_angular_speed: 5.0,
        }
    }

    fn link_config(name: &str, d: f64, r: f64, alpha: f64) -> LinkConfig {
        LinkConfig {
            name: name.into(),
            d,
            theta: 0.0,
            r,
            alpha,
        }
    }

    /// Three-DOF insect-style leg: coxa yaw, femur and tibia pitch.
    fn three_dof_leg() -> LegConfig {
        LegConfig {
            id: 0,
            name: "AL".into(),
            stance_yaw: 0.785,
            joints: vec![
                joint_config("coxa", -FRAC_PI_2, FRAC_PI_2),
                joint_config("femur", -FRAC_PI_2, FRAC_PI_2),
                joint_config("tibia", -2.0, 2.0),
            ],
            links: vec![
                link_config("base", 0.0, 0.0, 0.0),
                link_config("coxa", 0.0, 0.05, FRAC_PI_2),
                link_config("femur", 0.0, 0.2, 0.0),
                link_config("tibia", 0.0, 0.3, 0.0),
            ],
        }
    }

    fn make_leg() -> Leg {
        Leg::new(&three_dof_leg(), 0, TIME_DELTA, DAMPING)
    }

    // ---- construction ----

    #[test]
    fn mirror_and_group_follow_id_parity() {
        let left = Leg::new(&three_dof_leg(), 0, TIME_DELTA, DAMPING);
        let right = Leg::new(&three_dof_leg(), 1, TIME_DELTA, DAMPING);
        assert_relative_eq!(left.mirror_dir(), -1.0);
        assert_relative_eq!(right.mirror_dir(), 1.0);
        assert_eq!(left.group(), 0);
        assert_eq!(right.group(), 1);
    }

    #[test]
    fn chain_arity_and_lookups() {
        let leg = make_leg();
        assert_eq!(leg.dof(), 3);
        assert_eq!(leg.links().len(), 4);
        assert!(leg.joint_by_name("AL_femur_joint").is_some());
        assert!(leg.link_by_name("AL_tibia_link").is_some());
        assert!(leg.joint_by_name("AL_ankle_joint").is_none());
        assert_eq!(leg.tip().name, "AL_tip");
    }

    #[test]
    fn max_virtual_leg_length_is_zero_pose_reach() {
        // All joint ranges span zero, so the bound is the straight chain:
        // 0.05 + 0.2 + 0.3.
        let leg = make_leg();
        assert_relative_eq!(leg.max_virtual_leg_length(), 0.55, epsilon = 1e-12);
        assert_relative_eq!(leg.min_virtual_leg_length(), 0.0);
    }

    #[test]
    fn max_virtual_leg_length_respects_limits() {
        // A femur that cannot straighten shortens the reach.
        let mut config = three_dof_leg();
        config.joints[1].min = 0.5;
        config.joints[1].max = 1.5;
        let leg = Leg::new(&config, 0, TIME_DELTA, DAMPING);
        assert!(leg.max_virtual_leg_length() < 0.55);
    }

    #[test]
    fn local_tip_position_unassigned_before_first_fk() {
        let leg = make_leg();
        assert!(leg.local_tip_position().is_none());
    }

    // ---- init and FK ----

    #[test]
    fn init_aligns_desired_with_current_and_runs_fk() {
        let mut leg = make_leg();
        leg.init(true);
        for joint in leg.joints() {
            assert_relative_eq!(joint.desired_position, 0.0);
            assert_relative_eq!(joint.prev_desired_position, 0.0);
        }
        let local = leg.local_tip_position().unwrap();
        assert_relative_eq!(local, Vector3::new(0.55, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(leg.desired_tip_position(), local, epsilon = 1e-12);
    }

    #[test]
    fn init_keeps_sensed_positions_without_defaults() {
        let mut leg = make_leg();
        leg.joints_mut()[1].current_position = 0.4;
        leg.init(false);
        assert_relative_eq!(leg.joints()[1].desired_position, 0.4);
    }

    #[test]
    fn fk_bent_femur_lifts_tip() {
        // Rotating the femur up moves the tip out of the horizontal plane;
        // the coxa twist maps femur pitch onto base-frame z.
        let mut leg = make_leg();
        leg.init(true);
        leg.joints_mut()[1].desired_position = FRAC_PI_2;
        let tip = leg.apply_fk(false);
        assert_relative_eq!(tip.x, 0.05, epsilon = 1e-12);
        assert_relative_eq!(tip.z, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn fk_derives_tip_velocity_from_position_change() {
        let mut leg = make_leg();
        leg.init(true);
        let before = leg.local_tip_position().unwrap();
        leg.joints_mut()[1].desired_position = 0.1;
        let after = leg.apply_fk(true);
        let expected = (after - before) / TIME_DELTA;
        assert_relative_eq!(leg.desired_tip_velocity(), expected, epsilon = 1e-12);
    }

    // ---- delta-z gating ----

    #[test]
    fn delta_z_applied_while_walking() {
        let mut leg = make_leg();
        leg.set_delta_z(0.02);
        leg.apply_delta_z(Vector3::new(0.3, 0.1, -0.2));
        assert_relative_eq!(
            leg.desired_tip_position(),
            Vector3::new(0.3, 0.1, -0.22),
            epsilon = 1e-12
        );
    }

    #[test]
    fn delta_z_skipped_for_manual_leg() {
        let mut leg = make_leg();
        leg.set_delta_z(0.02);
        leg.set_state(LegState::Manual);
        leg.apply_delta_z(Vector3::new(0.3, 0.1, -0.2));
        assert_relative_eq!(
            leg.desired_tip_position(),
            Vector3::new(0.3, 0.1, -0.2),
            epsilon = 1e-12
        );
    }

    // ---- IK ----

    fn bend_and_init(leg: &mut Leg) {
        // A non-singular posture away from the straight chain.
        leg.joints_mut()[0].current_position = 0.2;
        leg.joints_mut()[1].current_position = 0.4;
        leg.joints_mut()[2].current_position = -0.8;
        leg.init(false);
    }

    #[test]
    fn ik_is_local_inverse_of_fk() {
        let mut leg = make_leg();
        bend_and_init(&mut leg);
        let angles: Vec<f64> = leg.joints().iter().map(|j| j.desired_position).collect();

        // Target the exact position FK produced: deltas must vanish.
        let report = leg.apply_ik(true);
        assert!(report.within_workspace);
        assert!(report.clamped.is_empty());
        assert!(report.tolerance_violations.is_empty());
        for (joint, angle) in leg.joints().iter().zip(&angles) {
            assert_relative_eq!(joint.desired_position, *angle, epsilon = 1e-9);
        }
    }

    #[test]
    fn ik_converges_to_nearby_target_over_cycles() {
        let mut leg = make_leg();
        bend_and_init(&mut leg);
        let target = leg.local_tip_position().unwrap() + Vector3::new(-0.004, 0.003, -0.002);
        leg.set_desired_tip_position(target);

        let mut report = leg.apply_ik(true);
        for _ in 0..3 {
            report = leg.apply_ik(true);
        }
        assert!(report.within_workspace);
        assert!(report.tolerance_violations.is_empty());
        assert_relative_eq!(report.tip_position, target, epsilon = IK_TOLERANCE);
    }

    #[test]
    fn ik_clamps_to_limits_and_reports() {
        let mut config = three_dof_leg();
        // A coxa that can barely move: any sideways target overruns it.
        config.joints[0].min = -0.01;
        config.joints[0].max = 0.01;
        let mut leg = Leg::new(&config, 0, TIME_DELTA, DAMPING);
        leg.init(true);
        let target = leg.local_tip_position().unwrap() + Vector3::new(0.0, 0.1, 0.0);
        leg.set_desired_tip_position(target);

        let report = leg.apply_ik(true);
        assert!(!report.clamped.is_empty());
        let clamp = &report.clamped[0];
        assert_eq!(clamp.joint, "AL_coxa_joint");
        let coxa = leg.joint_by_name("AL_coxa_joint").unwrap();
        assert!(
            (coxa.desired_position - 0.01).abs() < f64::EPSILON
                || (coxa.desired_position + 0.01).abs() < f64::EPSILON
        );
        assert!(coxa.desired_position >= -0.01 && coxa.desired_position <= 0.01);
    }

    #[test]
    fn ik_without_clamping_can_leave_limits() {
        let mut config = three_dof_leg();
        config.joints[0].min = -0.01;
        config.joints[0].max = 0.01;
        let mut leg = Leg::new(&config, 0, TIME_DELTA, DAMPING);
        leg.init(true);
        let target = leg.local_tip_position().unwrap() + Vector3::new(0.0, 0.1, 0.0);
        leg.set_desired_tip_position(target);

        let report = leg.apply_ik(false);
        assert!(report.clamped.is_empty());
        let coxa = leg.joint_by_name("AL_coxa_joint").unwrap();
        assert!(coxa.desired_position.abs() > 0.01);
    }

    #[test]
    fn ik_reports_tolerance_violation_for_unreachable_target() {
        let mut leg = make_leg();
        bend_and_init(&mut leg);
        // Far outside the 0.55 reach: one incremental step cannot get
        // there, and the report says so without failing.
        leg.set_desired_tip_position(Vector3::new(2.0, 2.0, -2.0));
        let report = leg.apply_ik(true);
        assert!(report.within_workspace);
        assert!(!report.tolerance_violations.is_empty());
        let violation = &report.tolerance_violations[0];
        assert!(violation.error_percentage > 0.0);
    }

    #[test]
    fn ik_finite_at_singular_full_extension() {
        // The straight chain is rank-deficient radially; the damped solve
        // must still produce finite commands.
        let mut leg = make_leg();
        leg.init(true);
        let target = leg.local_tip_position().unwrap() + Vector3::new(0.01, 0.0, 0.0);
        leg.set_desired_tip_position(target);
        leg.apply_ik(true);
        for joint in leg.joints() {
            assert!(joint.desired_position.is_finite());
        }
    }

    #[test]
    fn virtual_leg_length_unchanged_by_kinematics() {
        let mut leg = make_leg();
        let bound = leg.max_virtual_leg_length();
        bend_and_init(&mut leg);
        leg.set_desired_tip_position(Vector3::new(0.2, 0.1, -0.1));
        leg.apply_ik(true);
        leg.update_tip_force();
        assert_relative_eq!(leg.max_virtual_leg_length(), bound);
    }

    // ---- tip force ----

    #[test]
    fn tip_force_scales_linearly_with_effort() {
        let mut leg = make_leg();
        bend_and_init(&mut leg);
        for (joint, effort) in leg.joints_mut().iter_mut().zip([0.6, -0.3, 0.1]) {
            joint.current_effort = effort;
        }
        let force = leg.update_tip_force();

        for joint in leg.joints_mut() {
            joint.current_effort *= 2.5;
        }
        let scaled = leg.update_tip_force();
        assert_relative_eq!(scaled, force * 2.5, epsilon = 1e-12);
        assert_relative_eq!(leg.tip_force(), scaled);
    }

    #[test]
    fn tip_force_zero_for_zero_effort() {
        let mut leg = make_leg();
        leg.init(true);
        let force = leg.update_tip_force();
        assert_relative_eq!(force, Vector3::zeros());
    }

    // ---- speed limits ----

    #[test]
    fn speed_limit_clamps_step_and_reports() {
        let mut leg = make_leg();
        leg.init(true);
        // 5 rad/s over 0.02 s allows 0.1 rad per cycle.
        leg.joints_mut()[2].desired_position = 0.5;
        let clamps = leg.enforce_speed_limits();
        assert_eq!(clamps.len(), 1);
        assert_eq!(clamps[0].joint, "AL_tibia_joint");
        assert_relative_eq!(
            leg.joints()[2].desired_position,
            0.1,
            epsilon = 1e-12
        );
    }

    #[test]
    fn speed_limit_leaves_slow_commands_alone() {
        let mut leg = make_leg();
        leg.init(true);
        leg.joints_mut()[2].desired_position = 0.05;
        let clamps = leg.enforce_speed_limits();
        assert!(clamps.is_empty());
        assert_relative_eq!(leg.joints()[2].desired_position, 0.05);
    }
}
