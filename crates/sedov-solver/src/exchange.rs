//! The ghost-exchange collaborator: keeps boundary nodes and elements
//! consistent across ranks at the three per-cycle suspension points.
//!
//! Modeled the same way this codebase already models its solver-backend
//! boundary: a small `Send + Sync` trait with a data-transfer-object
//! argument, a single default implementation, and room for a real
//! distributed-memory transport to be swapped in without touching the
//! physics kernels.

use sedov_model::Domain;

/// Which quantity a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgType {
    /// Sum-of-nodal-quantities (mass, force) across shared nodes.
    NodalSum,
    /// Position/velocity synchronization across shared nodes.
    PositionSync,
    /// Monotonic-q Δv gradient copy into ghost element slots.
    QGradientCopy,
}

/// A node- or element-centered field participating in an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Fx,
    Fy,
    Fz,
    MassSum,
    X,
    Y,
    Z,
    Xd,
    Yd,
    Zd,
    DelvXi,
    DelvEta,
    DelvZeta,
}

/// The ghost-exchange collaborator required by the core pipeline.
///
/// Implementations post receives, pack and send, then wait and apply the
/// result either as an accumulation (`apply_sum`, for mass/force sums) or
/// an overwrite (`apply_copy`, for Δv gradients and position/velocity
/// synchronization).
pub trait Exchange: Send + Sync {
    fn exchange_recv(&self, domain: &Domain, msg_type: MsgType, fields: &[Field], plane_only: bool);
    fn exchange_send(&self, domain: &Domain, msg_type: MsgType, fields: &[Field], plane_only: bool);
    fn exchange_apply_sum(&self, domain: &mut Domain, fields: &[Field]);
    fn exchange_apply_copy(&self, domain: &mut Domain, fields: &[Field]);
}

/// Single-rank implementation: there are no neighbor ranks, so every
/// operation is a no-op. Satisfies the trait without packing or unpacking
/// anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpExchange;

impl Exchange for NoOpExchange {
    fn exchange_recv(&self, _domain: &Domain, _msg_type: MsgType, _fields: &[Field], _plane_only: bool) {}
    fn exchange_send(&self, _domain: &Domain, _msg_type: MsgType, _fields: &[Field], _plane_only: bool) {}
    fn exchange_apply_sum(&self, _domain: &mut Domain, _fields: &[Field]) {}
    fn exchange_apply_copy(&self, _domain: &mut Domain, _fields: &[Field]) {}
}

/// Single-rank implementation that still runs the three suspension points
/// as explicit barriers, so the timing structure of a real multi-rank run
/// is preserved even when there is nothing to exchange.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadedExchange;

impl Exchange for ThreadedExchange {
    fn exchange_recv(&self, _domain: &Domain, _msg_type: MsgType, _fields: &[Field], _plane_only: bool) {
        std::sync::atomic::fence(std::sync::atomic::Ordering::SeqCst);
    }

    fn exchange_send(&self, _domain: &Domain, _msg_type: MsgType, _fields: &[Field], _plane_only: bool) {
        std::sync::atomic::fence(std::sync::atomic::Ordering::SeqCst);
    }

    fn exchange_apply_sum(&self, _domain: &mut Domain, _fields: &[Field]) {
        std::sync::atomic::fence(std::sync::atomic::Ordering::SeqCst);
    }

    fn exchange_apply_copy(&self, _domain: &mut Domain, _fields: &[Field]) {
        std::sync::atomic::fence(std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_op_exchange_is_callable_with_any_field_set() {
        let dom = Domain::from_rank(0, 1, 2, 1, 1).unwrap();
        let ex = NoOpExchange;
        ex.exchange_recv(&dom, MsgType::NodalSum, &[Field::Fx, Field::Fy, Field::Fz], false);
        ex.exchange_send(&dom, MsgType::NodalSum, &[Field::Fx, Field::Fy, Field::Fz], false);
    }

    #[test]
    fn threaded_exchange_runs_at_single_rank_too() {
        let dom = Domain::from_rank(0, 1, 2, 1, 1).unwrap();
        let ex = ThreadedExchange;
        ex.exchange_recv(&dom, MsgType::QGradientCopy, &[Field::DelvXi], true);
        ex.exchange_send(&dom, MsgType::QGradientCopy, &[Field::DelvXi], true);
    }
}
