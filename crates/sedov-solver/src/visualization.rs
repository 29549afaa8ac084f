//! Visualization sink interface.
//!
//! Out of scope for this crate (§1): no SILO writer is implemented. The
//! pipeline only needs a place to call into when `-v` is set and the cycle
//! is a multiple of the configured file cadence.

use sedov_model::Domain;

/// Invoked by the pipeline at the configured dump cadence. The default
/// implementation, `NoOpSink`, does nothing; a real writer plugs in here
/// without the pipeline needing to know about file formats.
pub trait VisualizationSink: Send + Sync {
    fn dump(&self, domain: &Domain, cycle: usize);
}

/// Satisfies [`VisualizationSink`] without writing anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSink;

impl VisualizationSink for NoOpSink {
    fn dump(&self, _domain: &Domain, _cycle: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_op_sink_is_callable() {
        let dom = Domain::from_rank(0, 1, 2, 1, 1).unwrap();
        NoOpSink.dump(&dom, 0);
    }
}
