//! # Implicit operators
//!
//! Each function returns an [`FvScalarMatrix`] for the field it discretises. Sign
//! convention: the matrix stands for the operator value, so `ddt(rho, psi) + div(phi, psi)
//! - laplacian(gamma, psi)` is obtained with the usual `+`/`-` on matrices.
//!
//! | Operator | Scheme |
//! |----------|--------|
//! | `ddt` | Euler implicit, or zero for steady runs |
//! | `div` | upwind |
//! | `laplacian` | Gauss linear, orthogonal correction only |

use super::fields::{SurfaceScalarField, VolScalarField};
use super::fv_matrix::FvScalarMatrix;
use super::fv_mesh::FvMesh;
use super::fvc;
use serde::{Deserialize, Serialize};

/// Time-derivative scheme of the case
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DdtScheme {
    Steady,
    Euler {
        #[serde(rename = "deltaT")]
        delta_t: f64,
    },
}

impl DdtScheme {
    pub fn is_steady(&self) -> bool {
        matches!(self, DdtScheme::Steady)
    }

    /// 1/dt, zero for steady runs
    pub fn rdelta_t(&self) -> f64 {
        match self {
            DdtScheme::Steady => 0.0,
            DdtScheme::Euler { delta_t } => 1.0 / delta_t,
        }
    }
}

/// ddt(coeff, psi). The old-time levels of both fields are used for the explicit part.
pub fn ddt(
    coeff: &VolScalarField,
    psi: &VolScalarField,
    scheme: DdtScheme,
    mesh: &FvMesh,
) -> FvScalarMatrix {
    let mut matrix = FvScalarMatrix::new(&psi.name, mesh);
    let rdt = scheme.rdelta_t();
    if rdt == 0.0 {
        return matrix;
    }
    let coeff_0 = coeff.old_time();
    let psi_0 = psi.old_time();
    for cell in 0..mesh.n_cells() {
        let v_rdt = mesh.cell_volumes[cell] * rdt;
        matrix.diag[cell] = coeff.internal[cell] * v_rdt;
        matrix.source[cell] = coeff_0.internal[cell] * psi_0.internal[cell] * v_rdt;
    }
    matrix
}

/// div(phi, psi) with upwind face values
pub fn div(phi: &SurfaceScalarField, psi: &VolScalarField, mesh: &FvMesh) -> FvScalarMatrix {
    let mut matrix = FvScalarMatrix::new(&psi.name, mesh);
    for f in 0..mesh.n_internal_faces() {
        let flux = phi.internal[f];
        let w = if flux >= 0.0 { 1.0 } else { 0.0 };
        matrix.lower[f] = -w * flux;
        matrix.upper[f] = (1.0 - w) * flux;
        matrix.diag[mesh.owner[f]] += w * flux;
        matrix.diag[mesh.neighbour[f]] -= (1.0 - w) * flux;
    }
    for (patch_i, patch) in mesh.patches.iter().enumerate() {
        let patch_field = &psi.boundary[patch_i];
        for face in 0..patch.len() {
            let flux = phi.boundary[patch_i][face];
            matrix.internal_coeffs[patch_i][face] = flux * patch_field.value_internal_coeff();
            matrix.boundary_coeffs[patch_i][face] =
                -flux * patch_field.value_boundary_coeff(face, patch.delta_coeffs[face]);
        }
    }
    matrix
}

/// laplacian(gamma, psi) with the diffusivity given on faces
pub fn laplacian(gamma: &SurfaceScalarField, psi: &VolScalarField, mesh: &FvMesh) -> FvScalarMatrix {
    let mut matrix = FvScalarMatrix::new(&psi.name, mesh);
    for f in 0..mesh.n_internal_faces() {
        let coeff = gamma.internal[f] * mesh.mag_sf(f) * mesh.delta_coeffs[f];
        matrix.upper[f] = coeff;
        matrix.lower[f] = coeff;
        matrix.diag[mesh.owner[f]] -= coeff;
        matrix.diag[mesh.neighbour[f]] -= coeff;
    }
    for (patch_i, patch) in mesh.patches.iter().enumerate() {
        let patch_field = &psi.boundary[patch_i];
        for face in 0..patch.len() {
            let gamma_mag_sf = gamma.boundary[patch_i][face] * patch.mag_sf(face);
            let dc = patch.delta_coeffs[face];
            matrix.internal_coeffs[patch_i][face] =
                gamma_mag_sf * patch_field.gradient_internal_coeff(dc);
            matrix.boundary_coeffs[patch_i][face] =
                -gamma_mag_sf * patch_field.gradient_boundary_coeff(face, dc);
        }
    }
    matrix
}

/// laplacian(gamma, psi) with a cell diffusivity, linearly interpolated to faces
pub fn laplacian_vol(gamma: &VolScalarField, psi: &VolScalarField, mesh: &FvMesh) -> FvScalarMatrix {
    laplacian(&fvc::interpolate(gamma, mesh), psi, mesh)
}
