//! Moving reference frame corrections of face fluxes.

use crate::FiniteVolume::fields::{SurfaceScalarField, VolVectorField};
use crate::FiniteVolume::fv_mesh::FvMesh;
use crate::FiniteVolume::fvc;
use enum_dispatch::enum_dispatch;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[enum_dispatch]
pub trait FrameMotion {
    /// velocity of the frame at `position`
    fn frame_velocity(&self, position: &Vector3<f64>) -> Vector3<f64>;

    /// phi -= rho_f*(U_frame . Sf)
    fn make_relative(&self, mesh: &FvMesh, rho_f: &SurfaceScalarField, phi: &mut SurfaceScalarField) {
        for f in 0..mesh.n_internal_faces() {
            let frame_flux = self.frame_velocity(&mesh.face_centres[f]).dot(&mesh.face_areas[f]);
            phi.internal[f] -= rho_f.internal[f] * frame_flux;
        }
        for (patch_i, patch) in mesh.patches.iter().enumerate() {
            for face in 0..patch.len() {
                let frame_flux = self
                    .frame_velocity(&patch.face_centres[face])
                    .dot(&patch.face_areas[face]);
                phi.boundary[patch_i][face] -= rho_f.boundary[patch_i][face] * frame_flux;
            }
        }
    }

    /// (U - U_frame) . Sf on every face
    fn relative_flux(&self, mesh: &FvMesh, u: &VolVectorField) -> SurfaceScalarField {
        let ones = SurfaceScalarField::uniform("one", mesh, 1.0);
        let mut phi = fvc::flux(u, mesh);
        self.make_relative(mesh, &ones, &mut phi);
        phi
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NoFrameMotion;

impl FrameMotion for NoFrameMotion {
    fn frame_velocity(&self, _position: &Vector3<f64>) -> Vector3<f64> {
        Vector3::zeros()
    }

    fn make_relative(&self, _mesh: &FvMesh, _rho_f: &SurfaceScalarField, _phi: &mut SurfaceScalarField) {}
}

/// Whole domain rotating with angular velocity `omega` about `origin`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolidBodyRotation {
    pub origin: Vector3<f64>,
    /// rad/s
    pub omega: Vector3<f64>,
}

impl FrameMotion for SolidBodyRotation {
    fn frame_velocity(&self, position: &Vector3<f64>) -> Vector3<f64> {
        self.omega.cross(&(position - self.origin))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[enum_dispatch(FrameMotion)]
pub enum FrameMotionModel {
    Stationary(NoFrameMotion),
    SolidBody(SolidBodyRotation),
}

impl Default for FrameMotionModel {
    fn default() -> Self {
        FrameMotionModel::Stationary(NoFrameMotion)
    }
}
