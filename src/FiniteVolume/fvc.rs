//! # Explicit operators
//!
//! Evaluation of differential operators on known fields. Cell results are returned per
//! unit volume, face results as [`SurfaceField`]s.

use super::fields::{FieldValue, SurfaceField, SurfaceScalarField, VolField, VolScalarField, VolVectorField};
use super::fv_mesh::FvMesh;
use super::fvm::DdtScheme;
use nalgebra::Vector3;

const SMALL: f64 = 1e-15;

/// Linear interpolation to faces; boundary faces take the patch values
pub fn interpolate<T: FieldValue>(vf: &VolField<T>, mesh: &FvMesh) -> SurfaceField<T> {
    let internal = (0..mesh.n_internal_faces())
        .map(|f| {
            let w = mesh.weights[f];
            vf.internal[mesh.owner[f]] * w + vf.internal[mesh.neighbour[f]] * (1.0 - w)
        })
        .collect();
    SurfaceField {
        name: format!("interpolate({})", vf.name),
        internal,
        boundary: vf.boundary_values(),
    }
}

/// interpolate(U) & Sf
pub fn flux(u: &VolVectorField, mesh: &FvMesh) -> SurfaceScalarField {
    let u_f = interpolate(u, mesh);
    let internal = u_f
        .internal
        .iter()
        .zip(mesh.face_areas.iter())
        .map(|(u, sf)| u.dot(sf))
        .collect();
    let boundary = u_f
        .boundary
        .iter()
        .zip(mesh.patches.iter())
        .map(|(values, patch)| {
            values
                .iter()
                .zip(patch.face_areas.iter())
                .map(|(u, sf)| u.dot(sf))
                .collect()
        })
        .collect();
    SurfaceField {
        name: format!("flux({})", u.name),
        internal,
        boundary,
    }
}

/// Net outflow of a face flux, per unit cell volume
pub fn div(phi: &SurfaceScalarField, mesh: &FvMesh) -> Vec<f64> {
    let mut div = vec![0.0; mesh.n_cells()];
    for f in 0..mesh.n_internal_faces() {
        div[mesh.owner[f]] += phi.internal[f];
        div[mesh.neighbour[f]] -= phi.internal[f];
    }
    for (patch, values) in mesh.patches.iter().zip(phi.boundary.iter()) {
        for (&cell, &value) in patch.face_cells.iter().zip(values.iter()) {
            div[cell] += value;
        }
    }
    for (d, v) in div.iter_mut().zip(mesh.cell_volumes.iter()) {
        *d /= v;
    }
    div
}

/// Gauss linear gradient. Boundary values are copied from the adjacent cells.
pub fn grad(vf: &VolScalarField, mesh: &FvMesh) -> VolVectorField {
    let vf_f = interpolate(vf, mesh);
    let mut grad = vec![Vector3::zeros(); mesh.n_cells()];
    for f in 0..mesh.n_internal_faces() {
        let contribution = mesh.face_areas[f] * vf_f.internal[f];
        grad[mesh.owner[f]] += contribution;
        grad[mesh.neighbour[f]] -= contribution;
    }
    for (patch, values) in mesh.patches.iter().zip(vf_f.boundary.iter()) {
        for (face, &cell) in patch.face_cells.iter().enumerate() {
            grad[cell] += patch.face_areas[face] * values[face];
        }
    }
    for (g, v) in grad.iter_mut().zip(mesh.cell_volumes.iter()) {
        *g /= *v;
    }
    let boundary = mesh
        .patches
        .iter()
        .map(|patch| patch.face_cells.iter().map(|&c| grad[c]).collect())
        .collect();
    VolField::calculated(&format!("grad({})", vf.name), grad, boundary)
}

/// Euler time derivative of a field; zero for steady runs
pub fn ddt(vf: &VolScalarField, scheme: DdtScheme) -> VolScalarField {
    let rdt = scheme.rdelta_t();
    let old = vf.old_time();
    vf.zip_with(&old, &format!("ddt({})", vf.name), |v, v0| (v - v0) * rdt)
}

/// Flux correction coupling the face flux to the old-time velocity.
///
/// `ddtCouplingCoeff*(phi_0 - flux(rho_0*U_0))/dt` on internal faces, zero on boundary
/// faces and in steady runs.
pub fn ddt_corr(
    rho_0: &VolScalarField,
    u_0: &VolVectorField,
    phi_0: &SurfaceScalarField,
    scheme: DdtScheme,
    mesh: &FvMesh,
) -> SurfaceScalarField {
    let mut corr = SurfaceField::uniform("ddtCorr", mesh, 0.0);
    let rdt = scheme.rdelta_t();
    if rdt == 0.0 {
        return corr;
    }
    let rho_u_0 = rho_0.zip_with(u_0, "rhoU_0", |rho, u| u * rho);
    let phi_from_u = flux(&rho_u_0, mesh);
    for f in 0..mesh.n_internal_faces() {
        let defect = phi_0.internal[f] - phi_from_u.internal[f];
        let coupling = 1.0 - (defect.abs() / (phi_0.internal[f].abs() + SMALL)).min(1.0);
        corr.internal[f] = coupling * defect * rdt;
    }
    corr
}

/// Volume integral of a per-cell density
pub fn domain_integrate(values: &[f64], mesh: &FvMesh) -> f64 {
    values
        .iter()
        .zip(mesh.cell_volumes.iter())
        .map(|(value, v)| value * v)
        .sum()
}
