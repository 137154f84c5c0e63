//! Momentum predictor and the `A`/`H` split handed to the pressure stage.

use super::flamelet_fields::{FlameletFields, FvContext};
use crate::FiniteVolume::fields::{VolScalarField, VolVectorField};
use crate::FiniteVolume::fv_matrix::FvScalarMatrix;
use crate::FiniteVolume::fv_mesh::FvMesh;
use crate::FiniteVolume::{fvc, fvm};
use crate::PhysicalModels::fv_options::FvOptions;
use crate::PhysicalModels::turbulence_provider::TurbulenceModel;
use nalgebra::Vector3;

/// Relaxed momentum matrices, one per velocity component
#[derive(Debug, Clone)]
pub struct MomentumOperator {
    pub components: [FvScalarMatrix; 3],
}

impl MomentumOperator {
    fn averaged_diag(&self, mesh: &FvMesh) -> Vec<f64> {
        let diags: Vec<Vec<f64>> = self.components.iter().map(|eqn| eqn.total_diag(mesh)).collect();
        (0..mesh.n_cells())
            .map(|cell| diags.iter().map(|d| d[cell]).sum::<f64>() / 3.0)
            .collect()
    }

    /// Component-averaged diagonal per unit volume
    pub fn a(&self, mesh: &FvMesh) -> VolScalarField {
        let a: Vec<f64> = self
            .averaged_diag(mesh)
            .iter()
            .zip(mesh.cell_volumes.iter())
            .map(|(d, v)| d / v)
            .collect();
        let boundary = mesh
            .patches
            .iter()
            .map(|patch| patch.face_cells.iter().map(|&c| a[c]).collect())
            .collect();
        VolScalarField::calculated("A", a, boundary)
    }

    /// (source - off-diagonal*U)/V with the component diagonals in excess of the
    /// averaged one moved to the right-hand side
    #[allow(non_snake_case)]
    pub fn h(&self, mesh: &FvMesh, U: &VolVectorField) -> VolVectorField {
        let d_avg = self.averaged_diag(mesh);
        let mut h = vec![Vector3::zeros(); mesh.n_cells()];
        for (d, eqn) in self.components.iter().enumerate() {
            let u_d: Vec<f64> = U.internal.iter().map(|u| u[d]).collect();
            let h_d = eqn.h(mesh, &u_d);
            let diag = eqn.total_diag(mesh);
            for cell in 0..mesh.n_cells() {
                h[cell][d] =
                    h_d[cell] - (diag[cell] - d_avg[cell]) * u_d[cell] / mesh.cell_volumes[cell];
            }
        }
        let boundary = mesh
            .patches
            .iter()
            .map(|patch| patch.face_cells.iter().map(|&c| h[c]).collect())
            .collect();
        VolVectorField::calculated("H", h, boundary)
    }
}

/// UEqn = ddt(rho, U) + div(phi, U) - laplacian(muEff, U), optionally solved with -grad(p)
#[derive(Debug, Clone, Copy, Default)]
pub struct MomentumPredictor;

impl MomentumPredictor {
    pub fn predict(
        fields: &mut FlameletFields,
        turbulence: &dyn TurbulenceModel,
        ctx: &FvContext,
    ) -> MomentumOperator {
        let mesh = ctx.mesh;
        let scheme = ctx.controls.ddt_scheme;
        let mu_eff_f = fvc::interpolate(turbulence.mu_eff(), mesh);
        let components: [FvScalarMatrix; 3] = std::array::from_fn(|d| {
            let u_d = fields.U.component(d);
            let mut eqn = fvm::ddt(&fields.rho, &u_d, scheme, mesh)
                + fvm::div(&fields.phi, &u_d, mesh)
                - fvm::laplacian(&mu_eff_f, &u_d, mesh);
            eqn.equals_explicit(mesh, &ctx.fv_options.source(&u_d.name, mesh));
            if let Some(alpha) = ctx.controls.equation_relaxation_factor("U") {
                eqn.relax(mesh, &u_d, alpha);
            }
            ctx.fv_options.constrain(&mut eqn, mesh);
            eqn
        });

        if ctx.controls.momentum_predictor {
            let grad_p = fvc::grad(&fields.p, mesh);
            let solver_controls = ctx.controls.solver_controls("U", false);
            for (d, eqn) in components.iter().enumerate() {
                let mut u_d = fields.U.component(d);
                let grad_p_d: Vec<f64> = grad_p.internal.iter().map(|g| g[d]).collect();
                // UEqn == -grad(p)
                let mut predictor = eqn.clone();
                predictor.add_explicit(mesh, &grad_p_d);
                predictor.solve(mesh, &mut u_d, &solver_controls);
                fields.U.replace_component(d, &u_d);
            }
            ctx.fv_options.correct_velocity(&mut fields.U);
            fields.K = fields.U.map("K", |u| 0.5 * u.norm_squared());
        }
        MomentumOperator { components }
    }
}
