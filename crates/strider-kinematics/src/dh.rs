//! Denavit-Hartenberg frame transforms.

use nalgebra::{Matrix4, Vector3, Vector4};

/// One Denavit-Hartenberg parameter set.
///
/// Four scalars fully define a rigid link's transform relative to its
/// predecessor frame. For an actuated link, `angle` carries the live joint
/// position; for a fixed link it is the static reference angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DhParameters {
    /// Offset along the previous z axis (d).
    pub offset: f64,
    /// Rotation about the previous z axis (theta).
    pub angle: f64,
    /// Length along the rotated x axis (r).
    pub length: f64,
    /// Twist about the rotated x axis (alpha).
    pub twist: f64,
}

impl DhParameters {
    /// Homogeneous transform for this parameter set.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let (st, ct) = self.angle.sin_cos();
        let (sa, ca) = self.twist.sin_cos();
        Matrix4::new(
            ct, -st * ca, st * sa, self.length * ct,
            st, ct * ca, -ct * sa, self.length * st,
            0.0, sa, ca, self.offset,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}

/// Apply a homogeneous transform to a point.
pub fn transform_point(transform: &Matrix4<f64>, point: &Vector3<f64>) -> Vector3<f64> {
    let result = transform * Vector4::new(point.x, point.y, point.z, 1.0);
    Vector3::new(result.x, result.y, result.z)
}

/// Invert a rigid homogeneous transform (rotation + translation only).
///
/// Exact for any rigid transform; never fails, unlike a general 4×4
/// inversion.
pub fn invert_rigid(transform: &Matrix4<f64>) -> Matrix4<f64> {
    let rotation = transform.fixed_view::<3, 3>(0, 0).transpose();
    let translation = transform.fixed_view::<3, 1>(0, 3).into_owned();
    let inverse_translation = -(rotation * translation);

    let mut inverse = Matrix4::identity();
    inverse.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation);
    inverse
        .fixed_view_mut::<3, 1>(0, 3)
        .copy_from(&inverse_translation);
    inverse
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
