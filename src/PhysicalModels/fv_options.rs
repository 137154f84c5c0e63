//! Model sources and constraints applied to the equations by name.
//!
//! Equation names are the field names: `p`, `rho` (mass source of the continuity
//! equation), `Z`, `Zvar`, `H`, and the velocity components `U.x`, `U.y`, `U.z`.

use crate::FiniteVolume::fields::VolVectorField;
use crate::FiniteVolume::fv_matrix::FvScalarMatrix;
use crate::FiniteVolume::fv_mesh::FvMesh;
use crate::FlameletSolver::flamelet_errors::FlameletError;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[enum_dispatch]
pub trait FvOptions {
    /// impose the constraints registered for `eqn.psi_name`
    fn constrain(&self, eqn: &mut FvScalarMatrix, mesh: &FvMesh);
    /// re-impose constrained velocity values after a correction
    fn correct_velocity(&self, u: &mut VolVectorField);
    /// explicit source of `field_name` per unit volume
    fn source(&self, field_name: &str, mesh: &FvMesh) -> Vec<f64>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NoFvOptions;

impl FvOptions for NoFvOptions {
    fn constrain(&self, _eqn: &mut FvScalarMatrix, _mesh: &FvMesh) {}

    fn correct_velocity(&self, _u: &mut VolVectorField) {}

    fn source(&self, _field_name: &str, mesh: &FvMesh) -> Vec<f64> {
        vec![0.0; mesh.n_cells()]
    }
}

/// Uniform explicit sources and fixed cell values, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplicitSources {
    #[serde(default)]
    pub sources: HashMap<String, f64>,
    /// (cell, value) pairs
    #[serde(default, rename = "fixedValues")]
    pub fixed_values: HashMap<String, Vec<(usize, f64)>>,
}

impl ExplicitSources {
    /// Turn the rows of the fixed cells into `x = value`, moving their coupling to the
    /// neighbours' sources.
    fn set_values(eqn: &mut FvScalarMatrix, mesh: &FvMesh, cells: &[(usize, f64)]) {
        let fixed: HashMap<usize, f64> = cells.iter().copied().collect();
        for f in 0..mesh.n_internal_faces() {
            let (o, n) = (mesh.owner[f], mesh.neighbour[f]);
            if let Some(&value) = fixed.get(&o) {
                eqn.source[n] -= eqn.lower[f] * value;
                eqn.upper[f] = 0.0;
                eqn.lower[f] = 0.0;
            }
            if let Some(&value) = fixed.get(&n) {
                eqn.source[o] -= eqn.upper[f] * value;
                eqn.upper[f] = 0.0;
                eqn.lower[f] = 0.0;
            }
        }
        let fixed_cells: HashSet<usize> = fixed.keys().copied().collect();
        for (patch, coeffs) in mesh.patches.iter().zip(eqn.boundary_coeffs.iter_mut()) {
            for (face, &cell) in patch.face_cells.iter().enumerate() {
                if fixed_cells.contains(&cell) {
                    coeffs[face] = 0.0;
                }
            }
        }
        let d = eqn.total_diag(mesh);
        for (&cell, &value) in fixed.iter() {
            let mut diag = d[cell];
            if diag == 0.0 {
                eqn.diag[cell] += 1.0;
                diag = 1.0;
            }
            eqn.source[cell] = diag * value;
        }
    }
}

impl FvOptions for ExplicitSources {
    fn constrain(&self, eqn: &mut FvScalarMatrix, mesh: &FvMesh) {
        if let Some(cells) = self.fixed_values.get(&eqn.psi_name) {
            Self::set_values(eqn, mesh, cells);
        }
    }

    fn correct_velocity(&self, u: &mut VolVectorField) {
        for (d, axis) in ["x", "y", "z"].iter().enumerate() {
            if let Some(cells) = self.fixed_values.get(&format!("{}.{}", u.name, axis)) {
                for &(cell, value) in cells {
                    u.internal[cell][d] = value;
                }
            }
        }
    }

    fn source(&self, field_name: &str, mesh: &FvMesh) -> Vec<f64> {
        let value = self.sources.get(field_name).copied().unwrap_or(0.0);
        vec![value; mesh.n_cells()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[enum_dispatch(FvOptions)]
pub enum FvOptionsModel {
    Disabled(NoFvOptions),
    Explicit(ExplicitSources),
}

impl Default for FvOptionsModel {
    fn default() -> Self {
        FvOptionsModel::Disabled(NoFvOptions)
    }
}

impl FvOptionsModel {
    /// Every fixed cell must exist on `mesh`
    pub fn check_mesh(&self, mesh: &FvMesh) -> Result<(), FlameletError> {
        let FvOptionsModel::Explicit(options) = self else {
            return Ok(());
        };
        for (name, cells) in &options.fixed_values {
            if let Some((cell, _)) = cells.iter().find(|(cell, _)| *cell >= mesh.n_cells()) {
                return Err(FlameletError::MeshMismatch(format!(
                    "fvOptions fixes {} in cell {}, mesh has {} cells",
                    name,
                    cell,
                    mesh.n_cells()
                )));
            }
        }
        Ok(())
    }
}
