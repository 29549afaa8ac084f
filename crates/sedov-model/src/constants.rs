//! Material cutoffs and equation-of-state bounds.
//!
//! Fixed at domain construction and exposed as immutable fields rather than
//! process-wide globals, so a run's numerical behavior is fully determined
//! by the `Constants` it was built with.

use crate::Real;

/// Numerical floors, EOS clamps, and artificial-viscosity coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constants {
    /// Minimum relative volume after clamping.
    pub eosvmin: Real,
    /// Maximum relative volume after clamping.
    pub eosvmax: Real,
    /// Internal energy floor.
    pub energy_floor: Real,
    /// Pressure floor.
    pub pressure_floor: Real,
    /// Velocity snap-to-zero cutoff.
    pub u_cut: Real,
    /// Energy snap-to-zero cutoff.
    pub e_cut: Real,
    /// Pressure snap-to-zero cutoff.
    pub p_cut: Real,
    /// Artificial-viscosity snap-to-zero cutoff.
    pub q_cut: Real,
    /// Relative-volume snap-to-one cutoff: `|v - 1| < v_cut => v = 1`.
    pub v_cut: Real,
    /// Runaway-viscosity abort threshold (`QStopError`).
    pub qstop: Real,
    /// Monotonic limiter slope ceiling.
    pub monoq_max_slope: Real,
    /// Monotonic limiter multiplier.
    pub monoq_limiter_mult: Real,
    /// Linear artificial-viscosity coefficient.
    pub qlc_monoq: Real,
    /// Quadratic artificial-viscosity coefficient.
    pub qqc_monoq: Real,
    /// Courant-condition viscosity coefficient (used in `CalcTimeConstraintsForElems`).
    pub qqc: Real,
    /// Ideal-gas ratio of specific heats.
    pub gamma: Real,
    /// Hourglass stabilization coefficient.
    pub hgcoef: Real,
    /// Maximum allowed relative volume change per cycle (hydro time constraint).
    pub max_allowed_volume_change: Real,
    /// Time-step growth ceiling relative to the previous cycle.
    pub deltatime_mult_ub: Real,
    /// Time-step growth deadband floor: ratios below this keep the old `dt`.
    pub deltatime_mult_lb: Real,
    /// Absolute ceiling on any single `dt`.
    pub dtmax: Real,
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            eosvmin: 1.0e-9,
            eosvmax: 1.0e9,
            energy_floor: -1.0e15,
            pressure_floor: 0.0,
            u_cut: 1.0e-7,
            e_cut: 1.0e-7,
            p_cut: 1.0e-7,
            q_cut: 1.0e-7,
            v_cut: 1.0e-10,
            qstop: 1.0e12,
            monoq_max_slope: 1.0,
            monoq_limiter_mult: 2.0,
            qlc_monoq: 0.5,
            qqc_monoq: 2.0 / 3.0,
            qqc: 2.0,
            gamma: 1.4,
            hgcoef: 3.0,
            max_allowed_volume_change: 0.1,
            deltatime_mult_ub: 1.2,
            deltatime_mult_lb: 1.1,
            dtmax: 1.0e-2,
        }
    }
}
