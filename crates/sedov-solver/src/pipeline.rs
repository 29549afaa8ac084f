//! The per-cycle driver: `TimeIncrement → LagrangeNodal → LagrangeElements →
//! CalcTimeConstraintsForElems`, with the exchange and visualization
//! collaborators wired in at the points §6 names them.

use std::time::{Duration, Instant};

use sedov_model::{Domain, Real};

use crate::errors::SolverError;
use crate::exchange::Exchange;
use crate::lagrange_elements::lagrange_elements;
use crate::lagrange_nodal::lagrange_nodal;
use crate::time_constraints::calc_time_constraints_for_elems;
use crate::time_increment::time_increment;
use crate::visualization::VisualizationSink;

/// Result of advancing one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleOutcome {
    pub cycle: usize,
    pub dt: Real,
    pub time: Real,
}

/// End-of-run summary: the textual report described in §6.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOutcome {
    pub num_elems: usize,
    pub cycles: usize,
    pub final_time: Real,
    pub final_origin_energy: Real,
    pub elapsed: Duration,
    /// Microseconds per zone-cycle: `elapsed / (cycles * num_elems)`, scaled
    /// to microseconds. Lower is better.
    pub grind_time_us: Real,
}

/// Owns the domain and the run's collaborators and state across cycles.
/// `courant_dt`/`hydro_dt` are the previous cycle's constraints fed into
/// the next call to `TimeIncrement`; at cycle 0 they are unused because
/// `TimeIncrement` only consults them once `domain.cycle != 0`.
pub struct Pipeline<'a> {
    pub domain: Domain,
    pub exchange: &'a dyn Exchange,
    pub visualization: &'a dyn VisualizationSink,
    pub rank: u32,
    pub imbalance_cost: u32,
    pub stop_time: Real,
    pub fixed_dt: Option<Real>,
    pub vis_every: usize,
    courant_dt: Real,
    hydro_dt: Real,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        domain: Domain,
        exchange: &'a dyn Exchange,
        visualization: &'a dyn VisualizationSink,
        rank: u32,
        imbalance_cost: u32,
        stop_time: Real,
        fixed_dt: Option<Real>,
        vis_every: usize,
    ) -> Self {
        Pipeline {
            domain,
            exchange,
            visualization,
            rank,
            imbalance_cost,
            stop_time,
            fixed_dt,
            vis_every,
            courant_dt: Real::MAX,
            hydro_dt: Real::MAX,
        }
    }

    /// Runs until `max_cycles` cycles have executed (0 means "until
    /// `stop_time`"), invoking the visualization sink at the configured
    /// cadence and returning the end-of-run summary.
    pub fn run(&mut self, max_cycles: usize) -> Result<RunOutcome, SolverError> {
        let started = Instant::now();
        loop {
            if self.domain.time >= self.stop_time {
                break;
            }
            if max_cycles != 0 && self.domain.cycle >= max_cycles {
                break;
            }

            let outcome = run_cycle(self)?;

            if self.vis_every != 0 && outcome.cycle % self.vis_every == 0 {
                self.visualization.dump(&self.domain, outcome.cycle);
            }
        }

        let elapsed = started.elapsed();
        let cycles = self.domain.cycle;
        let zone_cycles = (cycles * self.domain.num_elems).max(1) as Real;
        Ok(RunOutcome {
            num_elems: self.domain.num_elems,
            cycles,
            final_time: self.domain.time,
            final_origin_energy: self.domain.e[0],
            elapsed,
            grind_time_us: elapsed.as_secs_f64() * 1.0e6 / zone_cycles,
        })
    }
}

/// Advances the domain held by `pipeline` by exactly one cycle.
pub fn run_cycle(pipeline: &mut Pipeline) -> Result<CycleOutcome, SolverError> {
    let dt = time_increment(
        &mut pipeline.domain,
        pipeline.courant_dt,
        pipeline.hydro_dt,
        pipeline.fixed_dt,
        pipeline.stop_time,
    );

    lagrange_nodal(&mut pipeline.domain, pipeline.exchange);
    lagrange_elements(&mut pipeline.domain, pipeline.exchange, pipeline.rank, pipeline.imbalance_cost)?;

    let (courant_dt, hydro_dt) = calc_time_constraints_for_elems(&pipeline.domain);
    pipeline.courant_dt = courant_dt;
    pipeline.hydro_dt = hydro_dt;

    Ok(CycleOutcome { cycle: pipeline.domain.cycle, dt, time: pipeline.domain.time })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::NoOpExchange;
    use crate::visualization::NoOpSink;

    #[test]
    fn a_single_cycle_advances_time_and_cycle_count() {
        let domain = Domain::from_rank(0, 1, 4, 1, 1).unwrap();
        let exchange = NoOpExchange;
        let sink = NoOpSink;
        let mut pipeline = Pipeline::new(domain, &exchange, &sink, 0, 1, 1.0e-2, None, 0);

        let outcome = run_cycle(&mut pipeline).unwrap();
        assert_eq!(outcome.cycle, 1);
        assert!(outcome.time > 0.0);
    }

    #[test]
    fn run_stops_at_the_requested_cycle_count() {
        let domain = Domain::from_rank(0, 1, 4, 1, 1).unwrap();
        let exchange = NoOpExchange;
        let sink = NoOpSink;
        let mut pipeline = Pipeline::new(domain, &exchange, &sink, 0, 1, 1.0e-2, None, 0);

        let outcome = pipeline.run(5).unwrap();
        assert_eq!(outcome.cycles, 5);
        assert_eq!(outcome.num_elems, 64);
    }

    #[test]
    fn run_stops_at_stop_time_when_max_cycles_is_zero() {
        let domain = Domain::from_rank(0, 1, 4, 1, 1).unwrap();
        let exchange = NoOpExchange;
        let sink = NoOpSink;
        let mut pipeline = Pipeline::new(domain, &exchange, &sink, 0, 1, 1.0e-4, None, 0);

        let outcome = pipeline.run(0).unwrap();
        assert!(outcome.final_time >= 1.0e-4);
        assert!(outcome.cycles > 0);
    }
}
