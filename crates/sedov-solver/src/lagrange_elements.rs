//! Strain/volume update, monotonic artificial viscosity, and the
//! gamma-law equation of state.

use nalgebra::Vector3;
use rayon::prelude::*;
use sedov_model::{hex_volume, volume_gradient, Domain, FaceBc, FaceNeighbor, Real};

use crate::errors::SolverError;
use crate::exchange::{Exchange, Field, MsgType};

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

/// The four corners bounding each of the six axial faces, in the canonical
/// ordering fixed by the domain's connectivity (§4.1).
const FACE_CORNERS: [[usize; 4]; 6] = [
    [0, 3, 7, 4], // xi-
    [1, 2, 6, 5], // xi+
    [0, 1, 5, 4], // eta-
    [3, 2, 6, 7], // eta+
    [0, 1, 2, 3], // zeta-
    [4, 5, 6, 7], // zeta+
];

fn quad_area(p: &[Vector3<Real>; 8], corners: [usize; 4]) -> Real {
    let diag1 = p[corners[2]] - p[corners[0]];
    let diag2 = p[corners[3]] - p[corners[1]];
    0.5 * diag1.cross(&diag2).norm()
}

fn max_face_area(p: &[Vector3<Real>; 8]) -> Real {
    FACE_CORNERS
        .iter()
        .map(|&c| quad_area(p, c))
        .fold(0.0, Real::max)
}

/// Strain, volume, and Δv gradient for a single element; computed in a
/// first parallel pass so every element's Δv is available before the
/// neighbor gather that follows.
struct ElemStrain {
    v_new: Real,
    delv: Real,
    vdov: Real,
    arealg: Real,
    dxx: Real,
    dyy: Real,
    dzz: Real,
}

fn elem_strain(domain: &Domain, ei: usize) -> Result<ElemStrain, SolverError> {
    let corners = domain.nodelist[ei];
    let positions = corner_positions(domain, &corners);
    let abs_volume = hex_volume(&positions);
    if abs_volume <= 0.0 {
        return Err(SolverError::VolumeError { elem: ei, volume: abs_volume, cycle: domain.cycle });
    }
    // v is tracked relative to the element's reference volume (starts at
    // 1.0, §3); abs_volume is the current geometric volume of the corners.
    let v_new = abs_volume / domain.v0[ei];

    // The strain rate is evaluated over half-step (time-centered) positions,
    // not the new positions used for the volume itself: x - 0.5*dt*v.
    let velocities = corner_velocities(domain, &corners);
    let half_positions: [Vector3<Real>; 8] =
        std::array::from_fn(|c| positions[c] - velocities[c] * (0.5 * domain.dt));
    let grad_v = volume_gradient(&half_positions);
    let half_volume = hex_volume(&half_positions);
    let inv_v = 1.0 / half_volume;
    let (mut dxx, mut dyy, mut dzz) = (0.0, 0.0, 0.0);
    for c in 0..8 {
        let n = corners[c];
        dxx += domain.xd[n] * grad_v[c].x;
        dyy += domain.yd[n] * grad_v[c].y;
        dzz += domain.zd[n] * grad_v[c].z;
    }
    dxx *= inv_v;
    dyy *= inv_v;
    dzz *= inv_v;

    let delv = v_new - domain.v[ei];
    // vdov is the volume-strain RATE (1/time), not a per-step fraction: the
    // hydro time-step constraint and the monotonic-q coefficients both scale
    // it by a time or time^2 of their own.
    let vdov = dxx + dyy + dzz;
    let arealg = abs_volume / max_face_area(&positions).max(1e-30);

    Ok(ElemStrain { v_new, delv, vdov, arealg, dxx, dyy, dzz })
}

fn neighbor_delv(domain: &Domain, ei: usize, dir_minus: usize, dir_plus: usize, delv: &[Real]) -> Real {
    let read = |dir: usize| -> Real {
        match (domain.face_bc[ei][dir], domain.face_neighbor[ei][dir]) {
            (FaceBc::Symmetry, _) => -delv[ei],
            (FaceBc::FreeSurface, _) | (FaceBc::Interior, FaceNeighbor::Local(_)) => delv[ei],
            (FaceBc::Comm, FaceNeighbor::Ghost(g)) => delv.get(domain.num_elems + g).copied().unwrap_or(delv[ei]),
            (_, FaceNeighbor::Local(other)) => delv[other],
            _ => delv[ei],
        }
    };
    read(dir_plus) - read(dir_minus)
}

/// Symmetric slope-limiter contribution for one axis: 1.0 (full suppression)
/// only when the neighbor gradient matches this element's own (a smooth,
/// linear region), falling back toward 0 (full viscosity) as the ratio
/// departs from 1 in either direction — including a steepening gradient
/// ahead of a forming shock, which a plain `clamp(ratio, 0, 1)` would
/// mistake for "smooth" and wrongly suppress.
fn monotonic_ratio(own: Real, neighbor_gradient: Real, max_slope: Real, limiter_mult: Real) -> Real {
    if own.abs() < 1e-30 {
        return 0.0;
    }
    let ratio = neighbor_gradient / own;
    if ratio <= 0.0 {
        return 0.0;
    }
    max_slope * (ratio * limiter_mult).min(1.0) * (limiter_mult / ratio).min(1.0)
}

/// Runs the strain/volume update, the neighbor Δv gather, monotonic
/// artificial viscosity, and the equation of state for one cycle.
/// `imbalance_cost` replicates the EOS loop that many times for the region
/// whose id is `(rank % num_regions) + 1`, a deliberate synthetic load
/// imbalance (§3, §10).
pub fn lagrange_elements(
    domain: &mut Domain,
    exchange: &dyn Exchange,
    rank: u32,
    imbalance_cost: u32,
) -> Result<(), SolverError> {
    let num_elems = domain.num_elems;

    let strains: Vec<ElemStrain> = (0..num_elems)
        .into_par_iter()
        .map(|ei| elem_strain(domain, ei))
        .collect::<Result<Vec<_>, _>>()?;

    for (ei, s) in strains.iter().enumerate() {
        domain.delv[ei] = s.delv;
        domain.dxx[ei] = s.dxx;
        domain.dyy[ei] = s.dyy;
        domain.dzz[ei] = s.dzz;
        domain.vdov[ei] = s.vdov;
        domain.arealg[ei] = s.arealg;
        domain.vnew[ei] = s.v_new;
    }

    exchange.exchange_recv(domain, MsgType::QGradientCopy, &[Field::DelvXi, Field::DelvEta, Field::DelvZeta], true);
    exchange.exchange_send(domain, MsgType::QGradientCopy, &[Field::DelvXi, Field::DelvEta, Field::DelvZeta], true);
    exchange.exchange_apply_copy(domain, &[Field::DelvXi, Field::DelvEta, Field::DelvZeta]);

    let delv_snapshot = domain.delv.clone();
    for ei in 0..num_elems {
        domain.delv_xi[ei] = neighbor_delv(domain, ei, 0, 1, &delv_snapshot);
        domain.delv_eta[ei] = neighbor_delv(domain, ei, 2, 3, &delv_snapshot);
        domain.delv_zeta[ei] = neighbor_delv(domain, ei, 4, 5, &delv_snapshot);
    }

    let c = domain.constants;
    let num_regions = domain.region_id.iter().copied().max().unwrap_or(1);
    let imbalanced_region = (rank as usize % num_regions) + 1;

    for ei in 0..num_elems {
        let v_new = domain.vnew[ei].clamp(c.eosvmin, c.eosvmax);

        let max_slope = c.monoq_max_slope;
        let mult = c.monoq_limiter_mult;
        let phi_xi = monotonic_ratio(domain.delv[ei], domain.delv_xi[ei], max_slope, mult);
        let phi_eta = monotonic_ratio(domain.delv[ei], domain.delv_eta[ei], max_slope, mult);
        let phi_zeta = monotonic_ratio(domain.delv[ei], domain.delv_zeta[ei], max_slope, mult);
        let phi = ((phi_xi + phi_eta + phi_zeta) / 3.0).clamp(0.0, max_slope);

        // elem_mass/v0 is the element's reference density (1.0 for this
        // single-material problem); current density scales it by 1/v.
        let density = (domain.elem_mass[ei] / domain.v0[ei]) / v_new;
        let l_char = domain.arealg[ei];
        let vdov = domain.vdov[ei];

        let (ql, qq, q) = if vdov < 0.0 {
            let ql = c.qlc_monoq * density * l_char * (-vdov) * (1.0 - phi);
            let qq = c.qqc_monoq * density * l_char * l_char * vdov * vdov * (1.0 - phi);
            (ql, qq, ql + qq)
        } else {
            (0.0, 0.0, 0.0)
        };

        if q > c.qstop {
            return Err(SolverError::QStopError { elem: ei, q, qstop: c.qstop, cycle: domain.cycle });
        }

        let region_repeats = if domain.region_id[ei] == imbalanced_region { imbalance_cost.max(1) } else { 1 };

        let (mut e_new, mut p_new, mut ss2) = (domain.e[ei], domain.p[ei], 0.0);
        for _ in 0..region_repeats {
            let p_old = domain.p[ei];
            // Predictor: work done over this step at the old pressure.
            let e_trial = (domain.e[ei] - 0.5 * domain.delv[ei] * (p_old + q)).max(c.energy_floor);
            let p_trial = ((c.gamma - 1.0) * density * e_trial).max(c.pressure_floor);
            // Corrector: redo the work integral with the average of the old
            // and trial pressure, damping the overshoot a pure old-pressure
            // estimate gives when p is falling fast across the step.
            let p_avg = 0.5 * (p_old + p_trial);
            e_new = (domain.e[ei] - domain.delv[ei] * (p_avg + q)).max(c.energy_floor);
            p_new = ((c.gamma - 1.0) * density * e_new).max(c.pressure_floor);
            ss2 = (c.gamma * (c.gamma - 1.0) * e_new).max(0.0);
        }

        domain.v[ei] = if (v_new - 1.0).abs() < c.v_cut { 1.0 } else { v_new };
        domain.e[ei] = if e_new.abs() < c.e_cut { 0.0 } else { e_new };
        domain.p[ei] = if p_new.abs() < c.p_cut { 0.0 } else { p_new };
        domain.q[ei] = if q.abs() < c.q_cut { 0.0 } else { q };
        domain.ql[ei] = ql;
        domain.qq[ei] = qq;
        domain.ss[ei] = ss2.sqrt();
    }

    Ok(())
}
