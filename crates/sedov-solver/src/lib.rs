//! The per-cycle Lagrangian shock-hydrodynamics pipeline: nodal force
//! assembly, monotonic artificial viscosity, the equation of state, and the
//! Courant/volume-change time-step controller, operating on a
//! [`sedov_model::Domain`].

pub mod errors;
pub mod exchange;
pub mod lagrange_elements;
pub mod lagrange_nodal;
pub mod pipeline;
pub mod time_constraints;
pub mod time_increment;
pub mod visualization;

pub use errors::SolverError;
pub use exchange::{Exchange, Field, MsgType, NoOpExchange, ThreadedExchange};
pub use lagrange_elements::lagrange_elements;
pub use lagrange_nodal::lagrange_nodal;
pub use pipeline::{run_cycle, CycleOutcome, Pipeline, RunOutcome};
pub use time_constraints::calc_time_constraints_for_elems;
pub use time_increment::time_increment;
pub use visualization::{NoOpSink, VisualizationSink};
