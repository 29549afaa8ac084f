//! Per-cycle Courant and hydro time-step candidate minima.

use sedov_model::Domain;

/// Courant and hydro (volume-change) candidate minimum time steps across all
/// local elements, the two inputs [`crate::time_increment`] clamps against.
///
/// A distributed run additionally reduces both values across ranks before
/// passing them on; that reduction is a caller responsibility (via
/// `exchange`) since it is a single scalar min, not a field exchange, and
/// does not fit the [`crate::Exchange`] trait's per-field shape.
pub fn calc_time_constraints_for_elems(domain: &Domain) -> (f64, f64) {
    let c = &domain.constants;
    let mut courant_dt = f64::MAX;
    let mut hydro_dt = f64::MAX;

    for ei in 0..domain.num_elems {
        let l_char = domain.arealg[ei];
        let ss = domain.ss[ei];
        let vdov = domain.vdov[ei];

        let dt_courant = if vdov < 0.0 {
            l_char / (ss * ss + c.qqc * l_char * l_char * vdov * vdov).sqrt()
        } else {
            l_char / ss.max(1e-30)
        };
        if dt_courant < courant_dt {
            courant_dt = dt_courant;
        }

        if vdov.abs() > 1e-30 {
            let dt_hydro = c.max_allowed_volume_change / vdov.abs();
            if dt_hydro < hydro_dt {
                hydro_dt = dt_hydro;
            }
        }
    }

    (courant_dt, hydro_dt)
}
