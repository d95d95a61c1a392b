//! Differential kinematics: the linear-velocity Jacobian of a DH chain.

use nalgebra::{DMatrix, Matrix4, Vector3};

use crate::dh::DhParameters;

/// Build the 3×N Jacobian relating joint angle rates to tip linear velocity.
///
/// Takes one parameter set per actuated joint, ordered base to tip, with
/// each set's `angle` carrying the joint's current angle. The fixed base
/// transform is excluded, so the matrix is expressed in the first joint's
/// frame.
///
/// Column k is `z_k × (p − o_k)`: the joint's rotation axis and origin are
/// read from the cumulative transform before the joint's own rotation
/// applies, and `p` is the tip position. This closed-form construction is
/// well-defined for any finite parameters; rank deficiency at singular
/// configurations is left to the damped-least-squares solve.
pub fn jacobian(dh_parameters: &[DhParameters]) -> DMatrix<f64> {
    let n = dh_parameters.len();
    let mut transform = Matrix4::identity();
    let mut origins: Vec<Vector3<f64>> = Vec::with_capacity(n);
    let mut axes: Vec<Vector3<f64>> = Vec::with_capacity(n);

    for parameters in dh_parameters {
        origins.push(transform.fixed_view::<3, 1>(0, 3).into_owned());
        axes.push(transform.fixed_view::<3, 1>(0, 2).into_owned());
        transform *= parameters.to_matrix();
    }
    let tip = transform.fixed_view::<3, 1>(0, 3).into_owned();

    let mut matrix = DMatrix::zeros(3, n);
    for k in 0..n {
        let column = axes[k].cross(&(tip - origins[k]));
        matrix[(0, k)] = column.x;
        matrix[(1, k)] = column.y;
        matrix[(2, k)] = column.z;
    }
    matrix
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
