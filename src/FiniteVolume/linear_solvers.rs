//! # Linear Solvers
//!
//! Solution of an assembled [`FvScalarMatrix`]. The solver is picked by name from the
//! `solvers` section of the solution controls; two backends are available:
//!
//! | Backend | Method | Notes |
//! |---------|--------|-------|
//! | `Direct` | dense LU (nalgebra) | exact up to round-off, meant for small meshes |
//! | `GaussSeidel` | forward sweeps | stops on `tolerance`, `relTol` or `maxIter` |
//!
//! A solve never fails from the caller's point of view: a singular system or a
//! non-converged iteration is visible only through [`SolverPerformance`].
//!
//! Residuals are normalised the usual finite-volume way, by
//! `sum(|A x - A x_avg| + |b - A x_avg|)`, so that they are comparable between fields.

use super::fv_matrix::FvScalarMatrix;
use super::fv_mesh::FvMesh;
use enum_dispatch::enum_dispatch;
use log::warn;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

const SMALL: f64 = 1e-20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinearSolverKind {
    Direct,
    GaussSeidel,
}

/// Settings of one named solver entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverControls {
    pub solver: LinearSolverKind,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default, rename = "relTol")]
    pub rel_tol: f64,
    #[serde(default = "default_max_iter", rename = "maxIter")]
    pub max_iter: usize,
}

fn default_tolerance() -> f64 {
    1e-8
}

fn default_max_iter() -> usize {
    1000
}

impl Default for SolverControls {
    fn default() -> Self {
        Self {
            solver: LinearSolverKind::Direct,
            tolerance: default_tolerance(),
            rel_tol: 0.0,
            max_iter: default_max_iter(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverPerformance {
    pub solver_name: String,
    pub initial_residual: f64,
    pub final_residual: f64,
    pub n_iterations: usize,
    pub converged: bool,
}

#[enum_dispatch]
pub trait LinearSolver {
    fn solve(
        &self,
        matrix: &FvScalarMatrix,
        mesh: &FvMesh,
        psi: &mut [f64],
        controls: &SolverControls,
    ) -> SolverPerformance;
}

#[derive(Debug, Clone)]
#[enum_dispatch(LinearSolver)]
pub enum LinearSolverBackend {
    Direct(DirectSolver),
    GaussSeidel(GaussSeidelSolver),
}

impl From<&SolverControls> for LinearSolverBackend {
    fn from(controls: &SolverControls) -> Self {
        match controls.solver {
            LinearSolverKind::Direct => LinearSolverBackend::Direct(DirectSolver),
            LinearSolverKind::GaussSeidel => LinearSolverBackend::GaussSeidel(GaussSeidelSolver),
        }
    }
}

/// Normalised residual of `psi` for `matrix`
pub fn normalised_residual(matrix: &FvScalarMatrix, mesh: &FvMesh, psi: &[f64]) -> f64 {
    let n = psi.len();
    if n == 0 {
        return 0.0;
    }
    let ax = matrix.amul(mesh, psi);
    let b = matrix.total_source(mesh);
    let x_avg = psi.iter().sum::<f64>() / n as f64;
    let a_xavg = matrix.amul(mesh, &vec![x_avg; n]);
    let norm_factor: f64 = (0..n)
        .map(|i| (ax[i] - a_xavg[i]).abs() + (b[i] - a_xavg[i]).abs())
        .sum::<f64>()
        + SMALL;
    let residual: f64 = (0..n).map(|i| (b[i] - ax[i]).abs()).sum();
    residual / norm_factor
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectSolver;

impl LinearSolver for DirectSolver {
    fn solve(
        &self,
        matrix: &FvScalarMatrix,
        mesh: &FvMesh,
        psi: &mut [f64],
        _controls: &SolverControls,
    ) -> SolverPerformance {
        let n = psi.len();
        let initial_residual = normalised_residual(matrix, mesh, psi);
        let d = matrix.total_diag(mesh);
        let mut a = DMatrix::<f64>::zeros(n, n);
        for (cell, &d) in d.iter().enumerate() {
            a[(cell, cell)] = d;
        }
        for f in 0..mesh.n_internal_faces() {
            let (o, nb) = (mesh.owner[f], mesh.neighbour[f]);
            a[(o, nb)] += matrix.upper[f];
            a[(nb, o)] += matrix.lower[f];
        }
        let b = DVector::from_vec(matrix.total_source(mesh));
        match a.lu().solve(&b) {
            Some(x) => psi.copy_from_slice(x.as_slice()),
            None => warn!(
                "singular matrix for {}, keeping previous values",
                matrix.psi_name
            ),
        }
        let final_residual = normalised_residual(matrix, mesh, psi);
        SolverPerformance {
            solver_name: "Direct".to_string(),
            initial_residual,
            final_residual,
            n_iterations: 1,
            converged: final_residual.is_finite(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GaussSeidelSolver;

impl LinearSolver for GaussSeidelSolver {
    fn solve(
        &self,
        matrix: &FvScalarMatrix,
        mesh: &FvMesh,
        psi: &mut [f64],
        controls: &SolverControls,
    ) -> SolverPerformance {
        let n = psi.len();
        let d = matrix.total_diag(mesh);
        let b = matrix.total_source(mesh);
        let mut neighbours: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for f in 0..mesh.n_internal_faces() {
            let (o, nb) = (mesh.owner[f], mesh.neighbour[f]);
            neighbours[o].push((nb, matrix.upper[f]));
            neighbours[nb].push((o, matrix.lower[f]));
        }

        let initial_residual = normalised_residual(matrix, mesh, psi);
        let mut final_residual = initial_residual;
        let mut n_iterations = 0;
        let converged = |r: f64| r < controls.tolerance || r < controls.rel_tol * initial_residual;

        while !converged(final_residual) && n_iterations < controls.max_iter {
            for cell in 0..n {
                if d[cell] == 0.0 {
                    continue;
                }
                let off: f64 = neighbours[cell].iter().map(|&(c, a)| a * psi[c]).sum();
                psi[cell] = (b[cell] - off) / d[cell];
            }
            n_iterations += 1;
            final_residual = normalised_residual(matrix, mesh, psi);
        }
        if !converged(final_residual) {
            warn!(
                "GaussSeidel did not converge for {} in {} iterations, residual {:e}",
                matrix.psi_name, n_iterations, final_residual
            );
        }
        SolverPerformance {
            solver_name: "GaussSeidel".to_string(),
            initial_residual,
            final_residual,
            n_iterations,
            converged: converged(final_residual),
        }
    }
}
