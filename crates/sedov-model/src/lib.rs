//! Domain data model for the Sedov blast-wave Lagrangian hydrodynamics proxy.
//!
//! This crate owns the static topology and the node-/element-centered field
//! arrays described by the domain's data model: a uniform hexahedral mesh,
//! built and deposited with a single point-energy Sedov initial condition,
//! plus the constants (EOS bounds, numerical cutoffs) that parameterize the
//! physics kernels in `sedov-solver`.

pub mod constants;
pub mod domain;
pub mod geometry;
pub mod regions;

pub use constants::Constants;
pub use domain::{Domain, DomainError, FaceBc, FaceDir, FaceNeighbor};
pub use geometry::{hex_volume, volume_gradient};
pub use regions::assign_regions;

/// Floating-point type used throughout the domain. A single-precision build
/// only needs to change this alias; no call site depends on `f64` directly.
pub type Real = f64;
