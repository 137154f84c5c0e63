//! # Finite Volume Mesh
//!
//! Face-addressed (owner/neighbour) description of a mesh, the form every operator in
//! [`super::fvm`] and [`super::fvc`] consumes. Internal faces are stored once, with the
//! area vector pointing from the owner cell to the neighbour cell. Boundary faces are
//! grouped into named patches, with area vectors pointing out of the domain.
//!
//! Only one builder is provided: [`FvMesh::rectangle`], an orthogonal structured mesh.
//! It is enough to exercise the solver core; general mesh construction is out of scope.
//!
//! ## Patches of `rectangle`
//! | Patch | Position | Outward normal |
//! |-------|----------|----------------|
//! | `left` | x = 0 | -x |
//! | `right` | x = lx | +x |
//! | `bottom` | y = 0 | -y |
//! | `top` | y = ly | +y |

use crate::FlameletSolver::flamelet_errors::FlameletError;
use nalgebra::Vector3;

/// Group of boundary faces sharing one boundary condition
#[derive(Debug, Clone)]
pub struct BoundaryPatch {
    pub name: String,
    /// cell adjacent to each face
    pub face_cells: Vec<usize>,
    /// outward area vectors
    pub face_areas: Vec<Vector3<f64>>,
    pub face_centres: Vec<Vector3<f64>>,
    /// 1/|d| where d is the cell centre to face centre distance
    pub delta_coeffs: Vec<f64>,
}

impl BoundaryPatch {
    pub fn len(&self) -> usize {
        self.face_cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.face_cells.is_empty()
    }

    pub fn mag_sf(&self, face: usize) -> f64 {
        self.face_areas[face].norm()
    }
}

#[derive(Debug, Clone)]
pub struct FvMesh {
    pub cell_volumes: Vec<f64>,
    pub cell_centres: Vec<Vector3<f64>>,
    /// owner cell of each internal face
    pub owner: Vec<usize>,
    /// neighbour cell of each internal face
    pub neighbour: Vec<usize>,
    /// area vectors of internal faces, owner -> neighbour
    pub face_areas: Vec<Vector3<f64>>,
    pub face_centres: Vec<Vector3<f64>>,
    /// linear interpolation weight of the owner value
    pub weights: Vec<f64>,
    /// 1/|d| where d joins owner and neighbour centres
    pub delta_coeffs: Vec<f64>,
    pub patches: Vec<BoundaryPatch>,
}

impl FvMesh {
    /// Orthogonal structured mesh of `nx` x `ny` cells covering `[0,lx] x [0,ly]`,
    /// extruded to `depth` in z. Cell `(i, j)` has index `i + nx*j`.
    pub fn rectangle(
        nx: usize,
        ny: usize,
        lx: f64,
        ly: f64,
        depth: f64,
    ) -> Result<Self, FlameletError> {
        if nx == 0 || ny == 0 {
            return Err(FlameletError::InvalidConfiguration(
                "mesh must have at least one cell in each direction".to_string(),
            ));
        }
        if !(lx > 0.0 && ly > 0.0 && depth > 0.0) {
            return Err(FlameletError::InvalidConfiguration(format!(
                "mesh extents must be positive, got lx={}, ly={}, depth={}",
                lx, ly, depth
            )));
        }
        let dx = lx / nx as f64;
        let dy = ly / ny as f64;
        let cell = |i: usize, j: usize| i + nx * j;
        let centre = |i: usize, j: usize| {
            Vector3::new((i as f64 + 0.5) * dx, (j as f64 + 0.5) * dy, 0.5 * depth)
        };

        let n_cells = nx * ny;
        let cell_volumes = vec![dx * dy * depth; n_cells];
        let mut cell_centres = Vec::with_capacity(n_cells);
        for j in 0..ny {
            for i in 0..nx {
                cell_centres.push(centre(i, j));
            }
        }

        let mut owner = Vec::new();
        let mut neighbour = Vec::new();
        let mut face_areas = Vec::new();
        let mut face_centres = Vec::new();
        let mut delta_coeffs = Vec::new();
        // x-normal internal faces
        for j in 0..ny {
            for i in 0..nx.saturating_sub(1) {
                owner.push(cell(i, j));
                neighbour.push(cell(i + 1, j));
                face_areas.push(Vector3::new(dy * depth, 0.0, 0.0));
                face_centres.push(Vector3::new((i + 1) as f64 * dx, (j as f64 + 0.5) * dy, 0.5 * depth));
                delta_coeffs.push(1.0 / dx);
            }
        }
        // y-normal internal faces
        for j in 0..ny.saturating_sub(1) {
            for i in 0..nx {
                owner.push(cell(i, j));
                neighbour.push(cell(i, j + 1));
                face_areas.push(Vector3::new(0.0, dx * depth, 0.0));
                face_centres.push(Vector3::new((i as f64 + 0.5) * dx, (j + 1) as f64 * dy, 0.5 * depth));
                delta_coeffs.push(1.0 / dy);
            }
        }
        let weights = vec![0.5; owner.len()];

        let mut left = Self::empty_patch("left");
        let mut right = Self::empty_patch("right");
        for j in 0..ny {
            let yc = (j as f64 + 0.5) * dy;
            left.face_cells.push(cell(0, j));
            left.face_areas.push(Vector3::new(-dy * depth, 0.0, 0.0));
            left.face_centres.push(Vector3::new(0.0, yc, 0.5 * depth));
            left.delta_coeffs.push(2.0 / dx);

            right.face_cells.push(cell(nx - 1, j));
            right.face_areas.push(Vector3::new(dy * depth, 0.0, 0.0));
            right.face_centres.push(Vector3::new(lx, yc, 0.5 * depth));
            right.delta_coeffs.push(2.0 / dx);
        }
        let mut bottom = Self::empty_patch("bottom");
        let mut top = Self::empty_patch("top");
        for i in 0..nx {
            let xc = (i as f64 + 0.5) * dx;
            bottom.face_cells.push(cell(i, 0));
            bottom.face_areas.push(Vector3::new(0.0, -dx * depth, 0.0));
            bottom.face_centres.push(Vector3::new(xc, 0.0, 0.5 * depth));
            bottom.delta_coeffs.push(2.0 / dy);

            top.face_cells.push(cell(i, ny - 1));
            top.face_areas.push(Vector3::new(0.0, dx * depth, 0.0));
            top.face_centres.push(Vector3::new(xc, ly, 0.5 * depth));
            top.delta_coeffs.push(2.0 / dy);
        }

        Ok(Self {
            cell_volumes,
            cell_centres,
            owner,
            neighbour,
            face_areas,
            face_centres,
            weights,
            delta_coeffs,
            patches: vec![left, right, bottom, top],
        })
    }

    fn empty_patch(name: &str) -> BoundaryPatch {
        BoundaryPatch {
            name: name.to_string(),
            face_cells: Vec::new(),
            face_areas: Vec::new(),
            face_centres: Vec::new(),
            delta_coeffs: Vec::new(),
        }
    }

    pub fn n_cells(&self) -> usize {
        self.cell_volumes.len()
    }

    pub fn n_internal_faces(&self) -> usize {
        self.owner.len()
    }

    pub fn patch_index(&self, name: &str) -> Option<usize> {
        self.patches.iter().position(|patch| patch.name == name)
    }

    pub fn mag_sf(&self, face: usize) -> f64 {
        self.face_areas[face].norm()
    }

    pub fn total_volume(&self) -> f64 {
        self.cell_volumes.iter().sum()
    }
}
