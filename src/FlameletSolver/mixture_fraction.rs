//! Mixture fraction, its variance and the stoichiometric scalar dissipation rate.
//!
//! ```text
//! ddt(rho, Z) + div(phi, Z) - laplacian(muEff/sigmat, Z) == S_Z
//!
//! transport:  ddt(rho, Zvar) + div(phi, Zvar) - laplacian(mut/sigmat, Zvar)
//!               - Cg*mut*|grad Z|^2 + Cd*rho*epsilon/(k + k_small)*Zvar == S_Zvar
//! algebraic:  Zvar = Cg*mut*|grad Z|^2*k/(Cd*rho*(epsilon + epsilon_small))
//!
//! chi_st = Cx*epsilon/(k + k_small)*Zvar
//! ```
//! Production and dissipation of the variance are both explicit. The algebraic closure
//! only sets interior values; boundary values of Zvar keep their conditions.

use super::flamelet_fields::{FlameletFields, FvContext};
use super::flamelet_properties::FlameletProperties;
use crate::FiniteVolume::fields::VolScalarField;
use crate::FiniteVolume::fv_matrix::FvScalarMatrix;
use crate::FiniteVolume::fvm;
use crate::FiniteVolume::fvc;
use crate::FiniteVolume::linear_solvers::SolverPerformance;
use crate::PhysicalModels::fv_options::FvOptions;
use crate::PhysicalModels::turbulence_provider::TurbulenceModel;
use enum_dispatch::enum_dispatch;
use log::info;

#[enum_dispatch]
pub trait VarianceClosure {
    /// Update Zvar given |grad Z|^2 per cell; returns the solver performance when a
    /// matrix was solved
    fn update_variance(
        &self,
        fields: &mut FlameletFields,
        grad_z_sqr: &[f64],
        turbulence: &dyn TurbulenceModel,
        properties: &FlameletProperties,
        ctx: &FvContext,
    ) -> Option<SolverPerformance>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportVariance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgebraicVariance;

impl VarianceClosure for TransportVariance {
    #[allow(non_snake_case)]
    fn update_variance(
        &self,
        fields: &mut FlameletFields,
        grad_z_sqr: &[f64],
        turbulence: &dyn TurbulenceModel,
        properties: &FlameletProperties,
        ctx: &FvContext,
    ) -> Option<SolverPerformance> {
        let mesh = ctx.mesh;
        let mu_t = turbulence.mu_t();
        let (k, epsilon) = (turbulence.k(), turbulence.epsilon());
        let diffusivity = mu_t.map("mut/sigmat", |m| m / properties.sigmat);
        let mut ZvarEqn = transport_matrix(fields, &fields.Zvar, &diffusivity, ctx);
        let production: Vec<f64> = (0..mesh.n_cells())
            .map(|c| -properties.Cg * mu_t.internal[c] * grad_z_sqr[c])
            .collect();
        let dissipation: Vec<f64> = (0..mesh.n_cells())
            .map(|c| {
                properties.Cd * fields.rho.internal[c] * epsilon.internal[c]
                    / (k.internal[c] + properties.k_small)
                    * fields.Zvar.internal[c]
            })
            .collect();
        ZvarEqn.add_explicit(mesh, &production);
        ZvarEqn.add_explicit(mesh, &dissipation);
        ZvarEqn.equals_explicit(mesh, &ctx.fv_options.source("Zvar", mesh));
        if let Some(alpha) = ctx.controls.equation_relaxation_factor("Zvar") {
            ZvarEqn.relax(mesh, &fields.Zvar, alpha);
        }
        ctx.fv_options.constrain(&mut ZvarEqn, mesh);
        Some(ZvarEqn.solve(mesh, &mut fields.Zvar, &ctx.controls.solver_controls("Zvar", false)))
    }
}

impl VarianceClosure for AlgebraicVariance {
    fn update_variance(
        &self,
        fields: &mut FlameletFields,
        grad_z_sqr: &[f64],
        turbulence: &dyn TurbulenceModel,
        properties: &FlameletProperties,
        ctx: &FvContext,
    ) -> Option<SolverPerformance> {
        info!("Algebraic equation for Zvar");
        let (mu_t, k, epsilon) = (turbulence.mu_t(), turbulence.k(), turbulence.epsilon());
        for cell in 0..ctx.mesh.n_cells() {
            fields.Zvar.internal[cell] = properties.Cg * mu_t.internal[cell] * grad_z_sqr[cell]
                * k.internal[cell]
                / (properties.Cd
                    * fields.rho.internal[cell]
                    * (epsilon.internal[cell] + properties.epsilon_small));
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[enum_dispatch(VarianceClosure)]
pub enum VarianceModel {
    Transport(TransportVariance),
    Algebraic(AlgebraicVariance),
}

/// ddt(rho, psi) + div(phi, psi) - laplacian(gamma, psi)
fn transport_matrix(
    fields: &FlameletFields,
    psi: &VolScalarField,
    gamma: &VolScalarField,
    ctx: &FvContext,
) -> FvScalarMatrix {
    let mesh = ctx.mesh;
    fvm::ddt(&fields.rho, psi, ctx.controls.ddt_scheme, mesh) + fvm::div(&fields.phi, psi, mesh)
        - fvm::laplacian_vol(gamma, psi, mesh)
}

/// Solver performance of the mixture fraction stage; `zvar` is empty for the algebraic closure
#[derive(Debug, Clone)]
pub struct MixtureFractionReport {
    pub z: SolverPerformance,
    pub zvar: Option<SolverPerformance>,
}

#[derive(Debug, Clone)]
pub struct MixtureFractionSolver {
    pub properties: FlameletProperties,
    pub variance: VarianceModel,
}

impl MixtureFractionSolver {
    pub fn new(properties: &FlameletProperties) -> Self {
        Self {
            properties: properties.clone(),
            variance: properties.variance_model(),
        }
    }

    #[allow(non_snake_case)]
    pub fn solve_mixture_fraction(
        &self,
        fields: &mut FlameletFields,
        turbulence: &dyn TurbulenceModel,
        ctx: &FvContext,
    ) -> SolverPerformance {
        let mesh = ctx.mesh;
        let sigmat = self.properties.sigmat;
        let diffusivity = turbulence.mu_eff().map("muEff/sigmat", |m| m / sigmat);
        let mut ZEqn = transport_matrix(fields, &fields.Z, &diffusivity, ctx);
        ZEqn.equals_explicit(mesh, &ctx.fv_options.source("Z", mesh));
        if let Some(alpha) = ctx.controls.equation_relaxation_factor("Z") {
            ZEqn.relax(mesh, &fields.Z, alpha);
        }
        ctx.fv_options.constrain(&mut ZEqn, mesh);
        ZEqn.solve(mesh, &mut fields.Z, &ctx.controls.solver_controls("Z", false))
    }

    pub fn update_variance(
        &self,
        fields: &mut FlameletFields,
        turbulence: &dyn TurbulenceModel,
        ctx: &FvContext,
    ) -> Option<SolverPerformance> {
        let grad_z = fvc::grad(&fields.Z, ctx.mesh);
        let grad_z_sqr: Vec<f64> = grad_z.internal.iter().map(|g| g.norm_squared()).collect();
        self.variance
            .update_variance(fields, &grad_z_sqr, turbulence, &self.properties, ctx)
    }

    /// chi_st = Cx*epsilon/(k + k_small)*Zvar on interior and boundary values
    pub fn update_scalar_dissipation(
        &self,
        fields: &mut FlameletFields,
        turbulence: &dyn TurbulenceModel,
    ) {
        let (cx, k_small) = (self.properties.Cx, self.properties.k_small);
        let time_scale = turbulence
            .epsilon()
            .zip_with(turbulence.k(), "epsilon/k", |eps, k| eps / (k + k_small));
        let chi_st = time_scale.zip_with(&fields.Zvar, "chi_st", |rate, zvar| cx * rate * zvar);
        fields.chi_st.assign(&chi_st);
    }

    /// Z, then Zvar, then chi_st
    pub fn correct(
        &self,
        fields: &mut FlameletFields,
        turbulence: &dyn TurbulenceModel,
        ctx: &FvContext,
    ) -> MixtureFractionReport {
        let z = self.solve_mixture_fraction(fields, turbulence, ctx);
        let zvar = self.update_variance(fields, turbulence, ctx);
        self.update_scalar_dissipation(fields, turbulence);
        MixtureFractionReport { z, zvar }
    }
}
