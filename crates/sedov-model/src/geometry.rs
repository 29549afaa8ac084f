//! Closed-form hexahedral element volume.

use nalgebra::Vector3;

use crate::Real;

/// Signed volume of a distorted hex from its eight corner coordinates,
/// ordered `{(0,0,0),(1,0,0),(1,1,0),(0,1,0),(0,0,1),(1,0,1),(1,1,1),(0,1,1)}`.
///
/// Uses the twelve-term mixed-determinant hex formula: three diagonal edge
/// vectors are formed from differences of opposite corners, and their scalar
/// triple product (summed over three such diagonal triples) gives six times
/// the tetrahedral decomposition volume.
///
/// `V > 0` for a properly oriented, non-degenerate element.
pub fn hex_volume(p: &[Vector3<Real>; 8]) -> Real {
    let d = |i: usize, j: usize| p[i] - p[j];

    let triple = |a: Vector3<Real>, b: Vector3<Real>, c: Vector3<Real>| a.dot(&b.cross(&c));

    let d31_72 = d(3, 1) + d(7, 2);
    let d43_57 = d(4, 3) + d(5, 7);
    let d14_25 = d(1, 4) + d(2, 5);

    let volume = triple(d31_72, d(6, 3), d(2, 0))
        + triple(d43_57, d(6, 4), d(7, 0))
        + triple(d14_25, d(6, 1), d(5, 0));

    volume / 12.0
}

/// Coefficient of corner `c` in a diagonal sum/difference term, used by
/// [`volume_gradient`]'s chain rule over the triple-product formula above.
fn coeff(term: &[(usize, Real)], c: usize) -> Real {
    term.iter().find(|&&(i, _)| i == c).map(|&(_, s)| s).unwrap_or(0.0)
}

/// `∂V/∂p_c` for each of the eight corners: the per-corner force shape used
/// by the element-to-node pressure/viscosity force integration (§4.4). Since
/// `hex_volume` is a sum of scalar triple products of quantities linear in
/// the corner positions, each partial derivative is itself a sum of cross
/// products weighted by the corresponding linear coefficients.
pub fn volume_gradient(p: &[Vector3<Real>; 8]) -> [Vector3<Real>; 8] {
    let d = |i: usize, j: usize| p[i] - p[j];

    let u1 = d(3, 1) + d(7, 2);
    let v1 = d(6, 3);
    let w1 = d(2, 0);
    let u2 = d(4, 3) + d(5, 7);
    let v2 = d(6, 4);
    let w2 = d(7, 0);
    let u3 = d(1, 4) + d(2, 5);
    let v3 = d(6, 1);
    let w3 = d(5, 0);

    // Linear coefficients of each corner in u/v/w above, as (corner, sign) pairs.
    let a1: [(usize, Real); 4] = [(1, -1.0), (2, -1.0), (3, 1.0), (7, 1.0)];
    let b1: [(usize, Real); 2] = [(3, -1.0), (6, 1.0)];
    let c1: [(usize, Real); 2] = [(0, -1.0), (2, 1.0)];

    let a2: [(usize, Real); 4] = [(3, -1.0), (4, 1.0), (5, 1.0), (7, -1.0)];
    let b2: [(usize, Real); 2] = [(4, -1.0), (6, 1.0)];
    let c2: [(usize, Real); 2] = [(0, -1.0), (7, 1.0)];

    let a3: [(usize, Real); 4] = [(1, 1.0), (2, 1.0), (4, -1.0), (5, -1.0)];
    let b3: [(usize, Real); 2] = [(1, -1.0), (6, 1.0)];
    let c3: [(usize, Real); 2] = [(0, -1.0), (5, 1.0)];

    let vw1 = v1.cross(&w1);
    let wu1 = w1.cross(&u1);
    let uv1 = u1.cross(&v1);
    let vw2 = v2.cross(&w2);
    let wu2 = w2.cross(&u2);
    let uv2 = u2.cross(&v2);
    let vw3 = v3.cross(&w3);
    let wu3 = w3.cross(&u3);
    let uv3 = u3.cross(&v3);

    std::array::from_fn(|c| {
        let g1 = vw1 * coeff(&a1, c) + wu1 * coeff(&b1, c) + uv1 * coeff(&c1, c);
        let g2 = vw2 * coeff(&a2, c) + wu2 * coeff(&b2, c) + uv2 * coeff(&c2, c);
        let g3 = vw3 * coeff(&a3, c) + wu3 * coeff(&b3, c) + uv3 * coeff(&c3, c);
        (g1 + g2 + g3) / 12.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> [Vector3<Real>; 8] {
        [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 1.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(0.0, 1.0, 1.0),
        ]
    }

    #[test]
    fn unit_cube_has_unit_volume() {
        let v = hex_volume(&unit_cube());
        assert!((v - 1.0).abs() < 1e-12, "got {v}");
    }

    #[test]
    fn coincident_corners_have_zero_volume() {
        let p = [Vector3::new(0.3, 0.1, 0.7); 8];
        assert_eq!(hex_volume(&p), 0.0);
    }

    #[test]
    fn scaled_cube_scales_volume() {
        let mut p = unit_cube();
        for c in &mut p {
            *c *= 2.0;
        }
        let v = hex_volume(&p);
        assert!((v - 8.0).abs() < 1e-12, "got {v}");
    }

    #[test]
    fn swapping_top_and_bottom_flips_sign() {
        let p = unit_cube();
        let swapped = [
            p[4], p[5], p[6], p[7], p[0], p[1], p[2], p[3],
        ];
        let v_orig = hex_volume(&p);
        let v_swapped = hex_volume(&swapped);
        assert!((v_orig + v_swapped).abs() < 1e-12);
    }

    #[test]
    fn matches_gauss_quadrature_for_a_sheared_hex() {
        // Reference: one-point vs eight-point Gauss quadrature of the
        // trilinear isoparametric map's Jacobian determinant agree for any
        // hex whose faces are planar (true here): both reduce to the same
        // closed form, so a direct numeric check against a hand-triangulated
        // decomposition into 5 tetrahedra is used instead.
        let p = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.2, 0.1, 0.0),
            Vector3::new(1.1, 1.3, 0.0),
            Vector3::new(-0.1, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.9),
            Vector3::new(1.0, 1.0, 1.1),
            Vector3::new(0.0, 1.0, 1.0),
        ];
        let v = hex_volume(&p);

        // Decompose into 5 tetrahedra (a standard hex-to-tet split) and sum
        // signed tetrahedron volumes as an independent cross-check.
        let tet_vol = |a: Vector3<Real>, b: Vector3<Real>, c: Vector3<Real>, d: Vector3<Real>| {
            (b - a).cross(&(c - a)).dot(&(d - a)) / 6.0
        };
        let tets = [
            (p[0], p[1], p[3], p[4]),
            (p[1], p[2], p[3], p[6]),
            (p[1], p[3], p[4], p[6]),
            (p[3], p[4], p[6], p[7]),
            (p[1], p[4], p[5], p[6]),
        ];
        let v_tet: Real = tets.iter().map(|(a, b, c, d)| tet_vol(*a, *b, *c, *d)).sum();

        // The two decompositions agree exactly only for hexes with planar
        // faces; for a sheared hex they differ by the (small) bilinear
        // warp of each face, so this is a sanity check, not an identity.
        assert!(
            (v - v_tet).abs() / v.abs() < 1e-2,
            "closed form {v} vs tet decomposition {v_tet}"
        );
    }

    #[test]
    fn volume_gradient_matches_central_difference() {
        let mut p = unit_cube();
        for (i, c) in p.iter_mut().enumerate() {
            *c += Vector3::new(0.05 * i as Real, -0.03 * i as Real, 0.02 * i as Real);
        }
        let analytic = volume_gradient(&p);
        let h = 1e-6;
        for c in 0..8 {
            for axis in 0..3 {
                let mut p_plus = p;
                let mut p_minus = p;
                p_plus[c][axis] += h;
                p_minus[c][axis] -= h;
                let numeric = (hex_volume(&p_plus) - hex_volume(&p_minus)) / (2.0 * h);
                assert!(
                    (analytic[c][axis] - numeric).abs() < 1e-6,
                    "corner {c} axis {axis}: analytic {} vs numeric {numeric}",
                    analytic[c][axis]
                );
            }
        }
    }
}
