//! The domain: static mesh topology plus node- and element-centered field
//! arrays, built once at setup and mutated in place by `sedov-solver`.

use nalgebra::Vector3;
use thiserror::Error;

use crate::constants::Constants;
use crate::geometry::hex_volume;
use crate::regions::assign_regions;
use crate::Real;

/// One of the six axial face directions of a hexahedral element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceDir {
    XiMinus,
    XiPlus,
    EtaMinus,
    EtaPlus,
    ZetaMinus,
    ZetaPlus,
}

impl FaceDir {
    pub const ALL: [FaceDir; 6] = [
        FaceDir::XiMinus,
        FaceDir::XiPlus,
        FaceDir::EtaMinus,
        FaceDir::EtaPlus,
        FaceDir::ZetaMinus,
        FaceDir::ZetaPlus,
    ];

    fn index(self) -> usize {
        match self {
            FaceDir::XiMinus => 0,
            FaceDir::XiPlus => 1,
            FaceDir::EtaMinus => 2,
            FaceDir::EtaPlus => 3,
            FaceDir::ZetaMinus => 4,
            FaceDir::ZetaPlus => 5,
        }
    }
}

/// What lies across a given element face: a local element, or a ghost slot
/// (an index `>= num_elems` populated by the exchange collaborator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceNeighbor {
    Local(usize),
    Ghost(usize),
}

/// The boundary condition carried by a single element face.
///
/// `Interior` is a fourth state beyond the three named in the domain model:
/// it marks a face shared with another element of the *same* subdomain,
/// where no boundary handling applies at all (the neighbor is read
/// directly, with no reflection, no free-surface treatment, and no
/// ghost exchange).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceBc {
    Interior,
    Symmetry,
    FreeSurface,
    Comm,
}

/// Fatal domain-construction errors.
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("rank count {0} is not a perfect cube")]
    NonCubeRankCount(u32),
    #[error("subdomain edge element count must be at least 1, got {0}")]
    ZeroSizedSubdomain(usize),
}

/// The node- and element-centered field arrays for one subdomain, plus the
/// static topology (connectivity, face neighbors, adjacency) built once at
/// construction time.
pub struct Domain {
    /// Per-subdomain edge element count.
    pub nx: usize,
    /// Number of local elements, `nx^3`.
    pub num_elems: usize,
    /// Number of ghost slots appended past `num_elems`.
    pub num_ghost: usize,
    /// Number of local nodes, `(nx+1)^3`.
    pub num_nodes: usize,

    // Node-centered fields, length `num_nodes`.
    pub x: Vec<Real>,
    pub y: Vec<Real>,
    pub z: Vec<Real>,
    pub xd: Vec<Real>,
    pub yd: Vec<Real>,
    pub zd: Vec<Real>,
    pub xdd: Vec<Real>,
    pub ydd: Vec<Real>,
    pub zdd: Vec<Real>,
    pub fx: Vec<Real>,
    pub fy: Vec<Real>,
    pub fz: Vec<Real>,
    pub nodal_mass: Vec<Real>,

    // Element-centered fields, length `num_elems`.
    pub nodelist: Vec<[usize; 8]>,
    pub face_neighbor: Vec<[FaceNeighbor; 6]>,
    pub face_bc: Vec<[FaceBc; 6]>,
    pub e: Vec<Real>,
    pub p: Vec<Real>,
    pub q: Vec<Real>,
    pub ql: Vec<Real>,
    pub qq: Vec<Real>,
    pub v: Vec<Real>,
    pub v0: Vec<Real>,
    pub delv: Vec<Real>,
    pub vdov: Vec<Real>,
    pub arealg: Vec<Real>,
    pub ss: Vec<Real>,
    pub elem_mass: Vec<Real>,
    pub region_id: Vec<usize>,

    // Scratch arrays. `delv_xi/eta/zeta` are sized `num_elems + num_ghost`
    // since ghost slots hold a copy of the neighbor's delta-volume.
    pub dxx: Vec<Real>,
    pub dyy: Vec<Real>,
    pub dzz: Vec<Real>,
    pub vnew: Vec<Real>,
    pub delv_xi: Vec<Real>,
    pub delv_eta: Vec<Real>,
    pub delv_zeta: Vec<Real>,

    /// Node indices lying on the subdomain's x=0, y=0, z=0 faces respectively
    /// (empty unless that face is at the global minimum).
    pub symm_x: Vec<usize>,
    pub symm_y: Vec<usize>,
    pub symm_z: Vec<usize>,

    /// CSR adjacency from node to incident element-corners: corner `k` of
    /// element `e` is encoded as `e * 8 + k`.
    pub node_elem_ptr: Vec<usize>,
    pub node_elem_corner: Vec<u32>,

    pub constants: Constants,
    pub time: Real,
    pub dt: Real,
    pub cycle: usize,
}

/// Canonical local node offsets (in element-edge units) for the 8 corners
/// of a hex, in the order fixed by §4.1 of the domain model.
const CORNER_OFFSETS: [(usize, usize, usize); 8] = [
    (0, 0, 0),
    (1, 0, 0),
    (1, 1, 0),
    (0, 1, 0),
    (0, 0, 1),
    (1, 0, 1),
    (1, 1, 1),
    (0, 1, 1),
];

/// Sedov point-energy calibration constant from the original benchmark.
const SEDOV_ENERGY_SCALE: Real = 3.948746e7;

impl Domain {
    /// Builds the subdomain owned by `rank` out of `num_ranks` total ranks
    /// arranged as an `r x r x r` cube (`r = num_ranks^(1/3)`, required to be
    /// an exact integer), each subdomain `nx` elements on a side.
    pub fn from_rank(rank: u32, num_ranks: u32, nx: usize, num_regions: usize, balance: i32) -> Result<Self, DomainError> {
        let r = cube_root(num_ranks).ok_or(DomainError::NonCubeRankCount(num_ranks))?;
        let col_loc = (rank % r) as usize;
        let row_loc = ((rank / r) % r) as usize;
        let plane_loc = (rank / (r * r)) as usize;
        Self::new(nx, r as usize, col_loc, row_loc, plane_loc, num_regions, balance, rank)
    }

    /// Builds the subdomain at `(col_loc, row_loc, plane_loc)` in a cube of
    /// `t x t x t` subdomains, each `nx` elements on a side.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nx: usize,
        t: usize,
        col_loc: usize,
        row_loc: usize,
        plane_loc: usize,
        num_regions: usize,
        balance: i32,
        rank: u32,
    ) -> Result<Self, DomainError> {
        if nx == 0 {
            return Err(DomainError::ZeroSizedSubdomain(nx));
        }

        let num_elems = nx * nx * nx;
        let edge_nodes = nx + 1;
        let num_nodes = edge_nodes * edge_nodes * edge_nodes;
        let constants = Constants::default();

        // Node lattice spacing is fixed by convention (§4.1); the global cube
        // spans `t * nx` elements on a side.
        let global_edge_elems = (t * nx) as Real;
        let spacing = 1.125 / global_edge_elems;

        let node_idx = |i: usize, j: usize, k: usize| -> usize {
            (k * edge_nodes + j) * edge_nodes + i
        };

        let mut x = vec![0.0; num_nodes];
        let mut y = vec![0.0; num_nodes];
        let mut z = vec![0.0; num_nodes];
        let origin_x = (col_loc * nx) as Real * spacing;
        let origin_y = (row_loc * nx) as Real * spacing;
        let origin_z = (plane_loc * nx) as Real * spacing;
        for k in 0..edge_nodes {
            for j in 0..edge_nodes {
                for i in 0..edge_nodes {
                    let n = node_idx(i, j, k);
                    x[n] = origin_x + i as Real * spacing;
                    y[n] = origin_y + j as Real * spacing;
                    z[n] = origin_z + k as Real * spacing;
                }
            }
        }

        let elem_idx = |col: usize, row: usize, plane: usize| -> usize { (plane * nx + row) * nx + col };

        let mut nodelist = Vec::with_capacity(num_elems);
        for plane in 0..nx {
            for row in 0..nx {
                for col in 0..nx {
                    let mut corners = [0usize; 8];
                    for (c, &(di, dj, dk)) in CORNER_OFFSETS.iter().enumerate() {
                        corners[c] = node_idx(col + di, row + dj, plane + dk);
                    }
                    nodelist.push(corners);
                }
            }
        }

        let mut face_neighbor = vec![[FaceNeighbor::Local(0); 6]; num_elems];
        let mut face_bc = vec![[FaceBc::Interior; 6]; num_elems];
        let mut num_ghost = 0usize;

        for plane in 0..nx {
            for row in 0..nx {
                for col in 0..nx {
                    let here = elem_idx(col, row, plane);
                    for dir in FaceDir::ALL {
                        let (neighbor, bc) = classify_face(
                            dir, col, row, plane, nx, t, col_loc, row_loc, plane_loc, elem_idx, &mut num_ghost,
                        );
                        face_neighbor[here][dir.index()] = neighbor;
                        face_bc[here][dir.index()] = bc;
                    }
                }
            }
        }

        let mut v0 = vec![0.0; num_elems];
        let mut elem_mass = vec![0.0; num_elems];
        let mut nodal_mass = vec![0.0; num_nodes];
        for (ei, corners) in nodelist.iter().enumerate() {
            let pts: [Vector3<Real>; 8] = std::array::from_fn(|c| {
                let n = corners[c];
                Vector3::new(x[n], y[n], z[n])
            });
            let vol = hex_volume(&pts);
            v0[ei] = vol;
            elem_mass[ei] = vol;
            for &n in corners {
                nodal_mass[n] += vol / 8.0;
            }
        }

        let einit = SEDOV_ENERGY_SCALE * (nx as Real * t as Real / 45.0).powi(3);
        let mut e = vec![0.0; num_elems];
        if col_loc == 0 && row_loc == 0 && plane_loc == 0 {
            e[elem_idx(0, 0, 0)] = einit;
        }
        let v = vec![1.0; num_elems];

        let initial_dt = 0.5 * v0[elem_idx(0, 0, 0)].cbrt() / (2.0 * einit).sqrt();

        let mut symm_x = Vec::new();
        let mut symm_y = Vec::new();
        let mut symm_z = Vec::new();
        for k in 0..edge_nodes {
            for j in 0..edge_nodes {
                if col_loc == 0 {
                    symm_x.push(node_idx(0, j, k));
                }
            }
        }
        for k in 0..edge_nodes {
            for i in 0..edge_nodes {
                if row_loc == 0 {
                    symm_y.push(node_idx(i, 0, k));
                }
            }
        }
        for j in 0..edge_nodes {
            for i in 0..edge_nodes {
                if plane_loc == 0 {
                    symm_z.push(node_idx(i, j, 0));
                }
            }
        }

        let (node_elem_ptr, node_elem_corner) = build_node_elem_adjacency(&nodelist, num_nodes);

        let region_id = assign_regions(num_elems, num_regions, balance, rank);

        Ok(Domain {
            nx,
            num_elems,
            num_ghost,
            num_nodes,
            x,
            y,
            z,
            xd: vec![0.0; num_nodes],
            yd: vec![0.0; num_nodes],
            zd: vec![0.0; num_nodes],
            xdd: vec![0.0; num_nodes],
            ydd: vec![0.0; num_nodes],
            zdd: vec![0.0; num_nodes],
            fx: vec![0.0; num_nodes],
            fy: vec![0.0; num_nodes],
            fz: vec![0.0; num_nodes],
            nodal_mass,
            nodelist,
            face_neighbor,
            face_bc,
            e,
            p: vec![0.0; num_elems],
            q: vec![0.0; num_elems],
            ql: vec![0.0; num_elems],
            qq: vec![0.0; num_elems],
            v,
            v0,
            delv: vec![0.0; num_elems],
            vdov: vec![0.0; num_elems],
            arealg: vec![0.0; num_elems],
            ss: vec![0.0; num_elems],
            elem_mass,
            region_id,
            dxx: vec![0.0; num_elems],
            dyy: vec![0.0; num_elems],
            dzz: vec![0.0; num_elems],
            vnew: vec![0.0; num_elems],
            delv_xi: vec![0.0; num_elems + num_ghost],
            delv_eta: vec![0.0; num_elems + num_ghost],
            delv_zeta: vec![0.0; num_elems + num_ghost],
            symm_x,
            symm_y,
            symm_z,
            node_elem_ptr,
            node_elem_corner,
            constants,
            time: 0.0,
            dt: initial_dt,
            cycle: 0,
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn classify_face(
    dir: FaceDir,
    col: usize,
    row: usize,
    plane: usize,
    nx: usize,
    t: usize,
    col_loc: usize,
    row_loc: usize,
    plane_loc: usize,
    elem_idx: impl Fn(usize, usize, usize) -> usize,
    num_ghost: &mut usize,
) -> (FaceNeighbor, FaceBc) {
    let (local_min, local_max, global_loc, axis_next) = match dir {
        FaceDir::XiMinus => (col == 0, col == nx - 1, col_loc, (col.wrapping_sub(1), row, plane)),
        FaceDir::XiPlus => (col == 0, col == nx - 1, col_loc, (col + 1, row, plane)),
        FaceDir::EtaMinus => (row == 0, row == nx - 1, row_loc, (col, row.wrapping_sub(1), plane)),
        FaceDir::EtaPlus => (row == 0, row == nx - 1, row_loc, (col, row + 1, plane)),
        FaceDir::ZetaMinus => (plane == 0, plane == nx - 1, plane_loc, (col, row, plane.wrapping_sub(1))),
        FaceDir::ZetaPlus => (plane == 0, plane == nx - 1, plane_loc, (col, row, plane + 1)),
    };

    let is_minus = matches!(dir, FaceDir::XiMinus | FaceDir::EtaMinus | FaceDir::ZetaMinus);
    let at_boundary = if is_minus { local_min } else { local_max };

    if !at_boundary {
        let (ni, nj, nk) = axis_next;
        return (FaceNeighbor::Local(elem_idx(ni, nj, nk)), FaceBc::Interior);
    }

    let at_global_min = is_minus && global_loc == 0;
    let at_global_max = !is_minus && global_loc == t - 1;

    if at_global_min {
        (FaceNeighbor::Local(elem_idx(col, row, plane)), FaceBc::Symmetry)
    } else if at_global_max {
        (FaceNeighbor::Local(elem_idx(col, row, plane)), FaceBc::FreeSurface)
    } else {
        let ghost = *num_ghost;
        *num_ghost += 1;
        (FaceNeighbor::Ghost(ghost), FaceBc::Comm)
    }
}

fn build_node_elem_adjacency(nodelist: &[[usize; 8]], num_nodes: usize) -> (Vec<usize>, Vec<u32>) {
    let mut counts = vec![0usize; num_nodes + 1];
    for corners in nodelist {
        for &n in corners {
            counts[n + 1] += 1;
        }
    }
    for i in 0..num_nodes {
        counts[i + 1] += counts[i];
    }
    let ptr = counts.clone();
    let mut fill = counts;
    let mut cols = vec![0u32; ptr[num_nodes]];
    for (ei, corners) in nodelist.iter().enumerate() {
        for (c, &n) in corners.iter().enumerate() {
            let slot = fill[n];
            cols[slot] = (ei * 8 + c) as u32;
            fill[n] += 1;
        }
    }
    (ptr, cols)
}

fn cube_root(n: u32) -> Option<u32> {
    if n == 0 {
        return None;
    }
    let approx = (n as f64).cbrt().round() as u32;
    (approx.saturating_sub(1)..=approx + 1).find(|&r| r > 0 && r * r * r == n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_rank_builds_expected_element_and_node_counts() {
        let dom = Domain::from_rank(0, 1, 3, 11, 1).unwrap();
        assert_eq!(dom.num_elems, 27);
        assert_eq!(dom.num_nodes, 4 * 4 * 4);
    }

    #[test]
    fn non_cube_rank_count_is_rejected() {
        match Domain::from_rank(0, 5, 3, 11, 1) {
            Err(e) => assert_eq!(e, DomainError::NonCubeRankCount(5)),
            Ok(_) => panic!("expected NonCubeRankCount"),
        }
    }

    #[test]
    fn zero_sized_subdomain_is_rejected() {
        match Domain::new(0, 1, 0, 0, 0, 11, 1, 0) {
            Err(e) => assert_eq!(e, DomainError::ZeroSizedSubdomain(0)),
            Ok(_) => panic!("expected ZeroSizedSubdomain"),
        }
    }

    #[test]
    fn single_rank_has_no_comm_faces() {
        let dom = Domain::from_rank(0, 1, 4, 11, 1).unwrap();
        assert_eq!(dom.num_ghost, 0);
        for faces in &dom.face_bc {
            assert!(faces.iter().all(|&bc| bc != FaceBc::Comm));
        }
    }

    #[test]
    fn mass_is_conserved_between_nodes_and_elements() {
        let dom = Domain::from_rank(0, 1, 4, 11, 1).unwrap();
        let node_total: Real = dom.nodal_mass.iter().sum();
        let elem_total: Real = dom.elem_mass.iter().sum();
        assert!((node_total - elem_total).abs() / elem_total < 1e-10);
    }

    #[test]
    fn sedov_point_energy_is_deposited_only_on_origin_subdomain_element_zero() {
        let dom = Domain::from_rank(0, 1, 4, 11, 1).unwrap();
        assert!(dom.e[0] > 0.0);
        assert!(dom.e[1..].iter().all(|&e| e == 0.0));
    }

    #[test]
    fn symmetry_faces_only_populated_at_global_minimum() {
        let dom = Domain::from_rank(0, 1, 3, 11, 1).unwrap();
        assert!(!dom.symm_x.is_empty());
        assert!(!dom.symm_y.is_empty());
        assert!(!dom.symm_z.is_empty());
    }

    #[test]
    fn node_elem_adjacency_visits_every_corner_exactly_once() {
        let dom = Domain::from_rank(0, 1, 3, 11, 1).unwrap();
        let total: usize = dom.node_elem_ptr.windows(2).map(|w| w[1] - w[0]).sum();
        assert_eq!(total, dom.num_elems * 8);
    }
}
