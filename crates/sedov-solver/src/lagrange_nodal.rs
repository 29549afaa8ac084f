//! Nodal force assembly and motion: pressure/viscosity stress integration,
//! hourglass stabilization, and the kinematics update.

use nalgebra::Vector3;
use rayon::prelude::*;
use sedov_model::{volume_gradient, Domain, Real};

use crate::exchange::{Exchange, Field, MsgType};

/// Flanagan-Belytschko hourglass control basis: four modes per axis, one
/// coefficient per corner, fixed by the single-point-quadrature hex element.
const GAMMA: [[Real; 8]; 4] = [
    [1.0, 1.0, -1.0, -1.0, -1.0, -1.0, 1.0, 1.0],
    [1.0, -1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0],
    [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0, -1.0],
];

fn corner_positions(domain: &Domain, corners: &[usize; 8]) -> [Vector3<Real>; 8] {
    std::array::from_fn(|c| {
        let n = corners[c];
        Vector3::new(domain.x[n], domain.y[n], domain.z[n])
    })
}

fn corner_velocities(domain: &Domain, corners: &[usize; 8]) -> [Vector3<Real>; 8] {
    std::array::from_fn(|c| {
        let n = corners[c];
        Vector3::new(domain.xd[n], domain.yd[n], domain.zd[n])
    })
}

/// Hourglass stabilization force on each corner, following the γ-basis
/// projection: each mode's gamma vector is first orthogonalized against the
/// element's own volume-gradient shape (removing the part that couples to
/// uniform strain), then the corner force is the modal velocity response
/// scaled by `hgcoef * 0.01 * mass * soundspeed / volume^(1/3)`.
fn hourglass_forces(
    positions: &[Vector3<Real>; 8],
    velocities: &[Vector3<Real>; 8],
    grad_v: &[Vector3<Real>; 8],
    volume: Real,
    mass: Real,
    soundspeed: Real,
    hgcoef: Real,
) -> [Vector3<Real>; 8] {
    let volinv = 1.0 / volume;
    let mut hourgam = [[0.0 as Real; 8]; 4];
    for c in 0..8 {
        let proj = grad_v[c].dot(&positions[c]);
        for (m, row) in hourgam.iter_mut().enumerate() {
            row[c] = GAMMA[m][c] - volinv * proj * GAMMA[m][c];
        }
    }

    let mut modal_vel = [Vector3::zeros(); 4];
    for m in 0..4 {
        let mut acc = Vector3::zeros();
        for c in 0..8 {
            acc += velocities[c] * hourgam[m][c];
        }
        modal_vel[m] = acc;
    }

    let coefficient = hgcoef * 0.01 * mass * soundspeed / volume.cbrt().max(1e-30);

    std::array::from_fn(|c| {
        let mut f = Vector3::zeros();
        for m in 0..4 {
            f += modal_vel[m] * hourgam[m][c];
        }
        f * (-coefficient)
    })
}

/// Runs the element-to-node force integration, the node-parallel scatter,
/// and the kinematics update for one cycle, invoking the exchange
/// collaborator at the two suspension points this stage owns.
pub fn lagrange_nodal(domain: &mut Domain, exchange: &dyn Exchange) {
    let num_elems = domain.num_elems;
    let mut corner_fx = vec![0.0 as Real; num_elems * 8];
    let mut corner_fy = vec![0.0 as Real; num_elems * 8];
    let mut corner_fz = vec![0.0 as Real; num_elems * 8];

    corner_fx
        .par_chunks_mut(8)
        .zip(corner_fy.par_chunks_mut(8))
        .zip(corner_fz.par_chunks_mut(8))
        .enumerate()
        .for_each(|(ei, ((fx, fy), fz))| {
            let corners = domain.nodelist[ei];
            let positions = corner_positions(domain, &corners);
            let velocities = corner_velocities(domain, &corners);
            let grad_v = volume_gradient(&positions);

            // Positive pressure does work as the element expands, so the
            // nodal force is +(p+q)*grad_v (outward along increasing V),
            // the sign convention that makes work = force . dx = (p+q) dV.
            let stress = domain.p[ei] + domain.q[ei];
            // grad_v and positions are both in absolute (geometric) scale,
            // so the hourglass projection needs the absolute current volume,
            // not the v0-normalized relative volume tracked on domain.v.
            let abs_volume = (domain.v0[ei] * domain.v[ei]).max(1e-30);

            let hg = hourglass_forces(
                &positions,
                &velocities,
                &grad_v,
                abs_volume,
                domain.elem_mass[ei],
                domain.ss[ei],
                domain.constants.hgcoef,
            );

            for c in 0..8 {
                let f = grad_v[c] * stress + hg[c];
                fx[c] = f.x;
                fy[c] = f.y;
                fz[c] = f.z;
            }
        });

    exchange.exchange_recv(domain, MsgType::NodalSum, &[Field::Fx, Field::Fy, Field::Fz], false);
    exchange.exchange_send(domain, MsgType::NodalSum, &[Field::Fx, Field::Fy, Field::Fz], false);

    // Scatter: each node owns a disjoint CSR range of incident
    // element-corners, so this is write-disjoint across threads.
    domain
        .fx
        .par_iter_mut()
        .zip(domain.fy.par_iter_mut())
        .zip(domain.fz.par_iter_mut())
        .enumerate()
        .for_each(|(n, ((fx, fy), fz))| {
            let start = domain.node_elem_ptr[n];
            let end = domain.node_elem_ptr[n + 1];
            let mut sx = 0.0;
            let mut sy = 0.0;
            let mut sz = 0.0;
            for &packed in &domain.node_elem_corner[start..end] {
                let idx = packed as usize;
                sx += corner_fx[idx];
                sy += corner_fy[idx];
                sz += corner_fz[idx];
            }
            *fx = sx;
            *fy = sy;
            *fz = sz;
        });

    exchange.exchange_apply_sum(domain, &[Field::Fx, Field::Fy, Field::Fz]);

    kinematics(domain);
}

fn kinematics(domain: &mut Domain) {
    let dt = domain.dt;
    let u_cut = domain.constants.u_cut;

    domain
        .xdd
        .par_iter_mut()
        .zip(domain.ydd.par_iter_mut())
        .zip(domain.zdd.par_iter_mut())
        .enumerate()
        .for_each(|(n, ((ax, ay), az))| {
            let m = domain.nodal_mass[n];
            *ax = domain.fx[n] / m;
            *ay = domain.fy[n] / m;
            *az = domain.fz[n] / m;
        });

    for &n in &domain.symm_x {
        domain.xdd[n] = 0.0;
    }
    for &n in &domain.symm_y {
        domain.ydd[n] = 0.0;
    }
    for &n in &domain.symm_z {
        domain.zdd[n] = 0.0;
    }

    let clamp = |v: Real| if v.abs() < u_cut { 0.0 } else { v };

    for n in 0..domain.num_nodes {
        domain.xd[n] = clamp(domain.xd[n] + domain.xdd[n] * dt);
        domain.yd[n] = clamp(domain.yd[n] + domain.ydd[n] * dt);
        domain.zd[n] = clamp(domain.zd[n] + domain.zdd[n] * dt);

        domain.x[n] += domain.xd[n] * dt;
        domain.y[n] += domain.yd[n] * dt;
        domain.z[n] += domain.zd[n] * dt;
    }
}
