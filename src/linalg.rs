//! Stack-only linear algebra used by the solvers: Gauss-Jordan inversion with singularity
//! detection, pseudo-inverses for non-square Jacobians, sphere trilateration and the planar
//! two-link solution shared by SCARA and Scorbot.
//!
//! Everything here works on fixed-size `nalgebra` matrices. Runtime sizes (a serial chain
//! with fewer joints than the capacity) are handled by operating on the top-left block.

extern crate nalgebra as na;

use na::{SMatrix, SVector, Vector3};

use crate::kinematics_error::KinematicsError;

/// Pivots with smaller magnitude are treated as zero.
pub const SINGULAR_EPSILON: f64 = 1.0e-12;

/// Inverts the square matrix with Gauss-Jordan elimination and partial pivoting.
/// Returns `Singular` if no pivot of usable magnitude can be found, `InvalidInput` if an
/// element is NaN or infinite.
pub fn invert<const N: usize>(m: &SMatrix<f64, N, N>) -> Result<SMatrix<f64, N, N>, KinematicsError> {
    invert_block(m, N)
}

/// Inverts the top-left `n`x`n` block of `m`. Elements outside the block are ignored on
/// input and zero on output.
pub fn invert_block<const D: usize>(m: &SMatrix<f64, D, D>, n: usize) -> Result<SMatrix<f64, D, D>, KinematicsError> {
    if n > D {
        return Err(KinematicsError::InvalidInput("block larger than matrix"));
    }
    if !(0..n).all(|i| (0..n).all(|k| m[(i, k)].is_finite())) {
        return Err(KinematicsError::InvalidInput("matrix element is not finite"));
    }
    let mut a = *m;
    let mut inverse = SMatrix::<f64, D, D>::zeros();
    for i in 0..n {
        inverse[(i, i)] = 1.0;
    }

    for col in 0..n {
        // Largest remaining element in this column becomes the pivot
        let mut pivot_row = col;
        let mut pivot_magnitude = 0.0;
        for row in col..n {
            let magnitude = a[(row, col)].abs();
            if magnitude > pivot_magnitude {
                pivot_magnitude = magnitude;
                pivot_row = row;
            }
        }
        if !(pivot_magnitude >= SINGULAR_EPSILON) {
            return Err(KinematicsError::Singular);
        }
        if pivot_row != col {
            a.swap_rows(pivot_row, col);
            inverse.swap_rows(pivot_row, col);
        }

        let pivot = a[(col, col)];
        for k in 0..n {
            a[(col, k)] /= pivot;
            inverse[(col, k)] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[(row, col)];
            if factor == 0.0 {
                continue;
            }
            for k in 0..n {
                a[(row, k)] -= factor * a[(col, k)];
                inverse[(row, k)] -= factor * inverse[(col, k)];
            }
        }
    }
    Ok(inverse)
}

/// Matrix times vector. Cannot fail.
pub fn multiply<const R: usize, const C: usize>(m: &SMatrix<f64, R, C>, v: &SVector<f64, C>) -> SVector<f64, R> {
    m * v
}

/// Inverse of a 6 x `columns` Jacobian stored in a 6 x C matrix (unused columns are zero).
///
/// * `columns == 6`: plain inverse.
/// * `columns < 6` (more task-space rows than joints): least squares `(JᵗJ)⁻¹Jᵗ`.
/// * `columns > 6` (redundant chain): minimum norm `Jᵗ(JJᵗ)⁻¹`.
///
/// The result is C x 6 with rows beyond `columns` zero.
pub fn pseudo_inverse<const C: usize>(j: &SMatrix<f64, 6, C>, columns: usize) -> Result<SMatrix<f64, C, 6>, KinematicsError> {
    if columns == 0 || columns > C {
        return Err(KinematicsError::InvalidInput("Jacobian column count out of range"));
    }
    if columns == 6 {
        let square: SMatrix<f64, 6, 6> = j.fixed_view::<6, 6>(0, 0).into_owned();
        let inverse = invert(&square)?;
        let mut result = SMatrix::<f64, C, 6>::zeros();
        result.fixed_view_mut::<6, 6>(0, 0).copy_from(&inverse);
        Ok(result)
    } else if columns < 6 {
        let jt = j.transpose();
        let normal = invert_block(&(jt * j), columns)?;
        Ok(normal * jt)
    } else {
        let jt = j.transpose();
        let normal = invert(&(j * jt))?;
        Ok(jt * normal)
    }
}

/// Point common to three spheres of equal `radius`, taking the solution with the lower Z.
///
/// Subtracting sphere 0 from spheres 1 and 2 gives two planes, so X and Y are linear in Z;
/// substituting back into sphere 0 leaves a quadratic in Z. A negative discriminant means the
/// spheres do not meet.
pub fn sphere_intersection_lower(centers: &[Vector3<f64>; 3], radius: f64) -> Result<Vector3<f64>, KinematicsError> {
    let s0 = centers[0];
    let n1 = 2.0 * (centers[1] - s0);
    let n2 = 2.0 * (centers[2] - s0);
    let d1 = centers[1].norm_squared() - s0.norm_squared();
    let d2 = centers[2].norm_squared() - s0.norm_squared();

    let det = n1.x * n2.y - n2.x * n1.y;
    if det.abs() < SINGULAR_EPSILON {
        return Err(KinematicsError::Singular);
    }

    // x = x0 + xz * z, y = y0 + yz * z
    let x0 = (d1 * n2.y - d2 * n1.y) / det;
    let xz = -(n1.z * n2.y - n2.z * n1.y) / det;
    let y0 = (n1.x * d2 - n2.x * d1) / det;
    let yz = -(n1.x * n2.z - n2.x * n1.z) / det;

    let dx = x0 - s0.x;
    let dy = y0 - s0.y;
    let a = xz * xz + yz * yz + 1.0;
    let b = 2.0 * (xz * dx + yz * dy - s0.z);
    let c = dx * dx + dy * dy + s0.z * s0.z - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Err(KinematicsError::Unreachable("spheres do not intersect"));
    }
    let z = (-b - discriminant.sqrt()) / (2.0 * a);
    Ok(Vector3::new(x0 + xz * z, y0 + yz * z, z))
}

/// Planar two-link arm: angles (radians) of the first link and of the elbow (relative to the
/// first link) placing the tip at `(x, y)`. The elbow angle comes from the law of cosines,
/// `negative_elbow` selects the `-acos` branch.
pub fn two_link_inverse(x: f64, y: f64, l1: f64, l2: f64, negative_elbow: bool) -> Result<(f64, f64), KinematicsError> {
    let cos_elbow = (x * x + y * y - l1 * l1 - l2 * l2) / (2.0 * l1 * l2);
    if !(-1.0..=1.0).contains(&cos_elbow) {
        return Err(KinematicsError::Unreachable("point outside the two-link annulus"));
    }
    let mut elbow = cos_elbow.acos();
    if negative_elbow {
        elbow = -elbow;
    }
    let shoulder = y.atan2(x) - (l2 * elbow.sin()).atan2(l1 + l2 * elbow.cos());
    Ok((shoulder, elbow))
}

/// Tip of the planar two-link arm for the given angles (radians).
pub fn two_link_forward(shoulder: f64, elbow: f64, l1: f64, l2: f64) -> (f64, f64) {
    (
        l1 * shoulder.cos() + l2 * (shoulder + elbow).cos(),
        l1 * shoulder.sin() + l2 * (shoulder + elbow).sin(),
    )
}
