//! # Finite Volume Toolkit
//!
//! Minimal cell-centred finite-volume machinery that the flamelet solver core is built on.
//!
//! ## Contents
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`fv_mesh`] | owner/neighbour mesh addressing, structured rectangle builder |
//! | [`fields`] | volume and surface fields, boundary conditions, relaxation and old-time storage |
//! | [`fv_matrix`] | LDU matrix with relaxation, face flux and `A`/`H` decomposition |
//! | [`fvm`] | implicit operators: `ddt`, `div`, `laplacian` |
//! | [`fvc`] | explicit operators: `interpolate`, `flux`, `div`, `grad`, `ddt`, `ddt_corr` |
//! | [`linear_solvers`] | direct and Gauss-Seidel solvers selected by solver controls |
//!
//! ## Conventions
//!
//! - Internal face area vectors point from owner to neighbour, boundary ones out of the domain.
//! - A matrix represents `A*x - b`; boundary conditions enter through per-face
//!   `internal_coeffs` (diagonal) and `boundary_coeffs` (source).
//! - Cell results of explicit operators are per unit volume.
//!
//! ## Example
//! ```rust, ignore
//! use FlameletCore::FiniteVolume::{fields::*, fv_mesh::FvMesh, fvm, linear_solvers::SolverControls};
//! let mesh = FvMesh::rectangle(10, 1, 1.0, 0.1, 0.1).unwrap();
//! let conditions = vec![
//!     PatchCondition::FixedValue(0.0),
//!     PatchCondition::FixedValue(1.0),
//!     PatchCondition::ZeroGradient,
//!     PatchCondition::ZeroGradient,
//! ];
//! let mut t = VolScalarField::new("T", &mesh, 0.0, conditions).unwrap();
//! let gamma = SurfaceScalarField::uniform("gamma", &mesh, 1.0);
//! let eqn = -fvm::laplacian(&gamma, &t, &mesh);
//! eqn.solve(&mesh, &mut t, &SolverControls::default());
//! ```

pub mod fields;
pub mod fv_matrix;
pub mod fv_mesh;
pub mod fvc;
pub mod fvm;
pub mod linear_solvers;
