//! # Finite Volume Matrix
//!
//! Assembled linear system for one scalar field, stored in owner/neighbour (LDU) form:
//!
//! ```text
//! diag[P]*x[P] + sum_{faces f owned by P} upper[f]*x[N] + sum_{faces f neighbouring P} lower[f]*x[O] = source[P]
//! ```
//!
//! Boundary faces contribute `internal_coeffs` to the diagonal and `boundary_coeffs` to the
//! source. A matrix stands for the operator `A*x - source`; adding an explicit field `S`
//! to the operator therefore subtracts `V*S` from the source, and `M == S` adds it.
//!
//! The matrix knows how to
//! - under-relax itself while keeping diagonal dominance ([`FvScalarMatrix::relax`]);
//! - report the face flux implied by its off-diagonal and boundary parts ([`FvScalarMatrix::flux`]);
//! - split itself into the `A` / `H` decomposition used by pressure-velocity coupling;
//! - solve itself with the solver selected by [`SolverControls`].

use super::fields::{SurfaceScalarField, VolScalarField};
use super::fv_mesh::FvMesh;
use super::linear_solvers::{LinearSolver, LinearSolverBackend, SolverControls, SolverPerformance};
use log::info;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

#[derive(Debug, Clone, PartialEq)]
pub struct FvScalarMatrix {
    pub psi_name: String,
    pub diag: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    pub source: Vec<f64>,
    pub internal_coeffs: Vec<Vec<f64>>,
    pub boundary_coeffs: Vec<Vec<f64>>,
}

impl FvScalarMatrix {
    pub fn new(psi_name: &str, mesh: &FvMesh) -> Self {
        let n_cells = mesh.n_cells();
        let n_faces = mesh.n_internal_faces();
        Self {
            psi_name: psi_name.to_string(),
            diag: vec![0.0; n_cells],
            upper: vec![0.0; n_faces],
            lower: vec![0.0; n_faces],
            source: vec![0.0; n_cells],
            internal_coeffs: mesh.patches.iter().map(|p| vec![0.0; p.len()]).collect(),
            boundary_coeffs: mesh.patches.iter().map(|p| vec![0.0; p.len()]).collect(),
        }
    }

    /// operator + S, with S given per unit volume
    pub fn add_explicit(&mut self, mesh: &FvMesh, values: &[f64]) {
        for (cell, s) in self.source.iter_mut().enumerate() {
            *s -= mesh.cell_volumes[cell] * values[cell];
        }
    }

    /// operator == S, with S given per unit volume
    pub fn equals_explicit(&mut self, mesh: &FvMesh, values: &[f64]) {
        for (cell, s) in self.source.iter_mut().enumerate() {
            *s += mesh.cell_volumes[cell] * values[cell];
        }
    }

    /// Diagonal including the boundary internal coefficients
    pub fn total_diag(&self, mesh: &FvMesh) -> Vec<f64> {
        let mut d = self.diag.clone();
        for (patch, coeffs) in mesh.patches.iter().zip(self.internal_coeffs.iter()) {
            for (face, &cell) in patch.face_cells.iter().enumerate() {
                d[cell] += coeffs[face];
            }
        }
        d
    }

    /// Source including the boundary coefficients
    pub fn total_source(&self, mesh: &FvMesh) -> Vec<f64> {
        let mut b = self.source.clone();
        for (patch, coeffs) in mesh.patches.iter().zip(self.boundary_coeffs.iter()) {
            for (face, &cell) in patch.face_cells.iter().enumerate() {
                b[cell] += coeffs[face];
            }
        }
        b
    }

    /// A*x with boundary internal coefficients included
    pub fn amul(&self, mesh: &FvMesh, x: &[f64]) -> Vec<f64> {
        let d = self.total_diag(mesh);
        let mut ax: Vec<f64> = d.iter().zip(x.iter()).map(|(d, x)| d * x).collect();
        for f in 0..mesh.n_internal_faces() {
            let (o, n) = (mesh.owner[f], mesh.neighbour[f]);
            ax[o] += self.upper[f] * x[n];
            ax[n] += self.lower[f] * x[o];
        }
        ax
    }

    /// b - A*x
    pub fn residual(&self, mesh: &FvMesh, x: &[f64]) -> Vec<f64> {
        let ax = self.amul(mesh, x);
        self.total_source(mesh)
            .iter()
            .zip(ax.iter())
            .map(|(b, ax)| b - ax)
            .collect()
    }

    /// Sum of |off-diagonal| coefficients per row
    fn sum_mag_off_diag(&self, mesh: &FvMesh) -> Vec<f64> {
        let mut sum_off = vec![0.0; mesh.n_cells()];
        for f in 0..mesh.n_internal_faces() {
            sum_off[mesh.owner[f]] += self.upper[f].abs();
            sum_off[mesh.neighbour[f]] += self.lower[f].abs();
        }
        sum_off
    }

    /// Implicit under-relaxation.
    ///
    /// The diagonal is first made at least as large as the sum of the off-diagonal
    /// magnitudes, then divided by `alpha`; the change is compensated in the source with
    /// the current values of `psi`, so a converged solution is a fixed point.
    pub fn relax(&mut self, mesh: &FvMesh, psi: &VolScalarField, alpha: f64) {
        if alpha <= 0.0 {
            return;
        }
        let d0 = self.total_diag(mesh);
        let sum_off = self.sum_mag_off_diag(mesh);
        for cell in 0..mesh.n_cells() {
            let d = d0[cell].abs().max(sum_off[cell]) / alpha;
            self.source[cell] += (d - d0[cell]) * psi.internal[cell];
            self.diag[cell] += d - d0[cell];
        }
    }

    /// Face flux implied by the matrix for the field values `psi`
    pub fn flux(&self, mesh: &FvMesh, psi: &VolScalarField) -> SurfaceScalarField {
        let internal = (0..mesh.n_internal_faces())
            .map(|f| {
                self.upper[f] * psi.internal[mesh.neighbour[f]]
                    - self.lower[f] * psi.internal[mesh.owner[f]]
            })
            .collect();
        let boundary = mesh
            .patches
            .iter()
            .enumerate()
            .map(|(patch_i, patch)| {
                patch
                    .face_cells
                    .iter()
                    .enumerate()
                    .map(|(face, &cell)| {
                        self.internal_coeffs[patch_i][face] * psi.internal[cell]
                            - self.boundary_coeffs[patch_i][face]
                    })
                    .collect()
            })
            .collect();
        SurfaceScalarField {
            name: format!("{}Flux", self.psi_name),
            internal,
            boundary,
        }
    }

    /// Diagonal coefficient per unit volume
    pub fn a(&self, mesh: &FvMesh) -> Vec<f64> {
        self.total_diag(mesh)
            .iter()
            .zip(mesh.cell_volumes.iter())
            .map(|(d, v)| d / v)
            .collect()
    }

    /// (source - off-diagonal*psi)/V, boundary source included
    pub fn h(&self, mesh: &FvMesh, psi: &[f64]) -> Vec<f64> {
        let mut h = self.total_source(mesh);
        for f in 0..mesh.n_internal_faces() {
            let (o, n) = (mesh.owner[f], mesh.neighbour[f]);
            h[o] -= self.upper[f] * psi[n];
            h[n] -= self.lower[f] * psi[o];
        }
        h.iter()
            .zip(mesh.cell_volumes.iter())
            .map(|(h, v)| h / v)
            .collect()
    }

    /// Solve in place for `psi` and re-evaluate its boundary conditions
    pub fn solve(
        &self,
        mesh: &FvMesh,
        psi: &mut VolScalarField,
        controls: &SolverControls,
    ) -> SolverPerformance {
        let backend = LinearSolverBackend::from(controls);
        let performance = backend.solve(self, mesh, &mut psi.internal, controls);
        psi.correct_boundary_conditions(mesh);
        info!(
            "{}:  Solving for {}, Initial residual = {:e}, Final residual = {:e}, No Iterations {}",
            performance.solver_name,
            psi.name,
            performance.initial_residual,
            performance.final_residual,
            performance.n_iterations
        );
        performance
    }
}

impl AddAssign<&FvScalarMatrix> for FvScalarMatrix {
    fn add_assign(&mut self, rhs: &FvScalarMatrix) {
        add_into(&mut self.diag, &rhs.diag, 1.0);
        add_into(&mut self.upper, &rhs.upper, 1.0);
        add_into(&mut self.lower, &rhs.lower, 1.0);
        add_into(&mut self.source, &rhs.source, 1.0);
        for (mine, theirs) in self.internal_coeffs.iter_mut().zip(rhs.internal_coeffs.iter()) {
            add_into(mine, theirs, 1.0);
        }
        for (mine, theirs) in self.boundary_coeffs.iter_mut().zip(rhs.boundary_coeffs.iter()) {
            add_into(mine, theirs, 1.0);
        }
    }
}

impl SubAssign<&FvScalarMatrix> for FvScalarMatrix {
    fn sub_assign(&mut self, rhs: &FvScalarMatrix) {
        add_into(&mut self.diag, &rhs.diag, -1.0);
        add_into(&mut self.upper, &rhs.upper, -1.0);
        add_into(&mut self.lower, &rhs.lower, -1.0);
        add_into(&mut self.source, &rhs.source, -1.0);
        for (mine, theirs) in self.internal_coeffs.iter_mut().zip(rhs.internal_coeffs.iter()) {
            add_into(mine, theirs, -1.0);
        }
        for (mine, theirs) in self.boundary_coeffs.iter_mut().zip(rhs.boundary_coeffs.iter()) {
            add_into(mine, theirs, -1.0);
        }
    }
}

impl Add for FvScalarMatrix {
    type Output = FvScalarMatrix;
    fn add(mut self, rhs: FvScalarMatrix) -> FvScalarMatrix {
        self += &rhs;
        self
    }
}

impl Sub for FvScalarMatrix {
    type Output = FvScalarMatrix;
    fn sub(mut self, rhs: FvScalarMatrix) -> FvScalarMatrix {
        self -= &rhs;
        self
    }
}

impl Neg for FvScalarMatrix {
    type Output = FvScalarMatrix;
    fn neg(mut self) -> FvScalarMatrix {
        let flip = |v: &mut Vec<f64>| v.iter_mut().for_each(|x| *x = -*x);
        flip(&mut self.diag);
        flip(&mut self.upper);
        flip(&mut self.lower);
        flip(&mut self.source);
        self.internal_coeffs.iter_mut().for_each(flip);
        self.boundary_coeffs.iter_mut().for_each(flip);
        self
    }
}

fn add_into(target: &mut [f64], other: &[f64], sign: f64) {
    for (t, o) in target.iter_mut().zip(other.iter()) {
        *t += sign * o;
    }
}
