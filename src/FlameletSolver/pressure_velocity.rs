//! # Pressure-velocity coupling
//!
//! One pressure corrector of a compressible PISO/SIMPLE loop:
//!
//! ```text
//! rAU     = 1/A
//! rhorAUf = interpolate(rho*rAU)
//! HbyA    = rAU*H               (U's value on fixed-velocity patches)
//! phiHbyA = flux(rho*HbyA) + rhorAUf*ddtCorr(rho, U, phi)     relative to the frame
//!
//! transonic:      phid = interpolate(psi)/interpolate(rho)*phiHbyA
//!                 phiHbyA -= interpolate(p)*phid
//!                 ddt(psi, p) + div(phiHbyA) + div(phid, p) - laplacian(rhorAUf, p) == S_rho
//! incompressible: ddt(psi, p) + div(phiHbyA) - laplacian(rhorAUf, p) == S_rho
//!
//! phi = phiHbyA + pEqn.flux()           on the last non-orthogonal pass
//! U   = HbyA - rAU*grad(p)
//! ```
//!
//! After the pressure solve the density is advanced through continuity, the continuity
//! errors are reported, p is relaxed and limited, and rho is refreshed from the provider.
//! Only the transonic matrix is under-relaxed; relaxing the incompressible one would
//! break the continuity of the corrected flux.

use super::flamelet_fields::{FlameletFields, FvContext};
use super::flamelet_properties::{PressureFormulation, PressureLimits};
use super::momentum_predictor::MomentumOperator;
use crate::FiniteVolume::fields::{
    PatchCondition, SurfaceScalarField, VolScalarField, VolVectorField,
};
use crate::FiniteVolume::fv_matrix::FvScalarMatrix;
use crate::FiniteVolume::fv_mesh::FvMesh;
use crate::FiniteVolume::{fvc, fvm};
use crate::PhysicalModels::frame_motion::{FrameMotion, FrameMotionModel};
use crate::PhysicalModels::fv_options::FvOptions;
use crate::PhysicalModels::thermo_provider::PropertyProvider;
use log::{debug, info, warn};

const VSMALL: f64 = 1e-300;

/// Continuity error report of one corrector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContinuityErrors {
    /// integral of |rho - psi*p| over the total mass
    pub sum_local: f64,
    /// integral of (rho - psi*p) over the total mass
    pub global: f64,
    /// running sum of `global`
    pub cumulative: f64,
}

/// Result of one pressure corrector
#[derive(Debug)]
pub struct PressureCorrection {
    /// momentum operator handed back when another corrector follows
    pub momentum: Option<MomentumOperator>,
    pub continuity_errors: ContinuityErrors,
    /// true when pressure had to be clipped to its limits
    pub pressure_limited: bool,
}

#[derive(Debug, Clone)]
pub struct PressureVelocitySolver {
    pub formulation: PressureFormulation,
    pub limits: PressureLimits,
    cumulative_continuity_error: f64,
}

/// On patches where U is fixed HbyA takes U's boundary value
#[allow(non_snake_case)]
pub fn constrain_hbya(HbyA: &mut VolVectorField, U: &VolVectorField) {
    for (h_patch, u_patch) in HbyA.boundary.iter_mut().zip(U.boundary.iter()) {
        if u_patch.fixes_value() {
            h_patch.values.clone_from(&u_patch.values);
        }
    }
}

/// Set the normal gradient of `FixedFluxPressure` patches so the boundary flux of the
/// pressure equation reproduces the imposed velocity flux
#[allow(non_snake_case)]
pub fn constrain_pressure(
    p: &mut VolScalarField,
    rho: &VolScalarField,
    U: &VolVectorField,
    phiHbyA: &SurfaceScalarField,
    rhorAUf: &SurfaceScalarField,
    mrf: &FrameMotionModel,
    mesh: &FvMesh,
) {
    if !p
        .boundary
        .iter()
        .any(|patch| patch.condition == PatchCondition::FixedFluxPressure)
    {
        return;
    }
    let relative_flux = mrf.relative_flux(mesh, U);
    for (patch_i, patch) in mesh.patches.iter().enumerate() {
        let patch_field = &mut p.boundary[patch_i];
        if patch_field.condition != PatchCondition::FixedFluxPressure {
            continue;
        }
        for face in 0..patch.len() {
            let denominator = patch.mag_sf(face) * rhorAUf.boundary[patch_i][face];
            patch_field.gradient[face] = if denominator.abs() > VSMALL {
                (phiHbyA.boundary[patch_i][face]
                    - rho.boundary[patch_i].values[face] * relative_flux.boundary[patch_i][face])
                    / denominator
            } else {
                0.0
            };
        }
    }
    p.correct_boundary_conditions(mesh);
}

/// phid = interpolate(psi)/interpolate(rho)*phiHbyA
#[allow(non_snake_case)]
pub fn compressibility_flux(
    psi: &VolScalarField,
    rho_f: &SurfaceScalarField,
    phiHbyA: &SurfaceScalarField,
    mesh: &FvMesh,
) -> SurfaceScalarField {
    let psi_f = fvc::interpolate(psi, mesh);
    let mut phid = psi_f
        .zip_with(rho_f, "psiByRho", |psi, rho| psi / rho)
        .zip_with(phiHbyA, "phid", |ratio, flux| ratio * flux);
    phid.name = "phid".to_string();
    phid
}

/// Pressure matrix shared by both formulations; the transonic one passes `phid`.
#[allow(non_snake_case)]
pub fn assemble_pressure_equation(
    fields: &FlameletFields,
    psi: &VolScalarField,
    phiHbyA: &SurfaceScalarField,
    rhorAUf: &SurfaceScalarField,
    phid: Option<&SurfaceScalarField>,
    mass_source: &[f64],
    ctx: &FvContext,
) -> FvScalarMatrix {
    let mesh = ctx.mesh;
    let mut pEqn = fvm::ddt(psi, &fields.p, ctx.controls.ddt_scheme, mesh)
        - fvm::laplacian(rhorAUf, &fields.p, mesh);
    pEqn.add_explicit(mesh, &fvc::div(phiHbyA, mesh));
    if let Some(phid) = phid {
        pEqn += &fvm::div(phid, &fields.p, mesh);
    }
    pEqn.equals_explicit(mesh, mass_source);
    pEqn
}

impl PressureVelocitySolver {
    pub fn new(formulation: PressureFormulation, limits: PressureLimits) -> Self {
        Self {
            formulation,
            limits,
            cumulative_continuity_error: 0.0,
        }
    }

    pub fn cumulative_continuity_error(&self) -> f64 {
        self.cumulative_continuity_error
    }

    /// One pressure corrector. `final_corrector` marks the last corrector of the outer
    /// iteration: the momentum operator is then released as soon as HbyA is formed.
    #[allow(non_snake_case)]
    pub fn correct(
        &mut self,
        fields: &mut FlameletFields,
        momentum: MomentumOperator,
        thermo: &dyn PropertyProvider,
        ctx: &FvContext,
        final_corrector: bool,
    ) -> PressureCorrection {
        let mesh = ctx.mesh;
        let controls = ctx.controls;
        let scheme = controls.ddt_scheme;

        let rAU = momentum.a(mesh).map("rAU", |a| 1.0 / a);
        let rhorAUf = fvc::interpolate(&fields.rho.zip_with(&rAU, "rhorAU", |r, a| r * a), mesh);
        let H = momentum.h(mesh, &fields.U);
        let mut HbyA = rAU.zip_with(&H, "HbyA", |r, h| h * r);
        constrain_hbya(&mut HbyA, &fields.U);
        let momentum = if final_corrector {
            drop(momentum);
            None
        } else {
            Some(momentum)
        };

        let mut phiHbyA = fvc::flux(&fields.rho.zip_with(&HbyA, "rhoHbyA", |r, u| u * r), mesh);
        phiHbyA.name = "phiHbyA".to_string();
        if let (false, Some(phi_old)) = (scheme.is_steady(), fields.phi_old.as_ref()) {
            let ddt_corr = fvc::ddt_corr(
                &fields.rho.old_time(),
                &fields.U.old_time(),
                phi_old,
                scheme,
                mesh,
            );
            for f in 0..mesh.n_internal_faces() {
                phiHbyA.internal[f] += rhorAUf.internal[f] * ddt_corr.internal[f];
            }
        }
        let rho_f = fvc::interpolate(&fields.rho, mesh);
        ctx.mrf.make_relative(mesh, &rho_f, &mut phiHbyA);

        constrain_pressure(
            &mut fields.p,
            &fields.rho,
            &fields.U,
            &phiHbyA,
            &rhorAUf,
            ctx.mrf,
            mesh,
        );

        let psi = thermo.compressibility();
        let mass_source = ctx.fv_options.source("rho", mesh);
        let phid = match self.formulation {
            PressureFormulation::Transonic => {
                let phid = compressibility_flux(psi, &rho_f, &phiHbyA, mesh);
                let p_f = fvc::interpolate(&fields.p, mesh);
                phiHbyA = phiHbyA.zip_with(
                    &p_f.zip_with(&phid, "pPhid", |p, phid| p * phid),
                    "phiHbyA",
                    |flux, p_phid| flux - p_phid,
                );
                Some(phid)
            }
            PressureFormulation::Incompressible => None,
        };

        let n_passes = controls.n_non_orth_correctors + 1;
        for pass in 0..n_passes {
            let final_pass = pass + 1 == n_passes;
            let mut pEqn = assemble_pressure_equation(
                fields,
                psi,
                &phiHbyA,
                &rhorAUf,
                phid.as_ref(),
                &mass_source,
                ctx,
            );
            if self.formulation == PressureFormulation::Transonic {
                if let Some(alpha) = controls.equation_relaxation_factor("p") {
                    pEqn.relax(mesh, &fields.p, alpha);
                }
            }
            let solver_controls = controls.solver_controls("p", final_corrector && final_pass);
            pEqn.solve(mesh, &mut fields.p, &solver_controls);
            if final_pass {
                let flux = pEqn.flux(mesh, &fields.p);
                fields.phi = phiHbyA.zip_with(&flux, "phi", |a, b| a + b);
            }
        }

        self.update_density(fields, &mass_source, ctx);
        let continuity_errors = self.continuity_errors(fields, thermo, mesh);

        if let Some(alpha) = controls.field_relaxation_factor("p") {
            fields.p.relax(alpha);
        }
        let (rho_min, rho_max) = fields.rho.min_max();
        info!("rho max/min : {} {}", rho_max, rho_min);

        let grad_p = fvc::grad(&fields.p, mesh);
        for cell in 0..mesh.n_cells() {
            fields.U.internal[cell] = HbyA.internal[cell] - grad_p.internal[cell] * rAU.internal[cell];
        }
        fields.U.correct_boundary_conditions(mesh);
        ctx.fv_options.correct_velocity(&mut fields.U);
        fields.K = fields.U.map("K", |u| 0.5 * u.norm_squared());

        let pressure_limited = self.limits.limit(&mut fields.p);
        if pressure_limited {
            debug!("pressure limited to [{}, {}]", self.limits.p_min, self.limits.p_max);
        }
        fields.p.correct_boundary_conditions(mesh);
        fields.rho.assign(&thermo.density(&fields.p));
        self.limits.limit_density(&mut fields.rho);

        if self.formulation != PressureFormulation::Transonic {
            if let Some(alpha) = controls.field_relaxation_factor("rho") {
                fields.rho.relax(alpha);
            }
        }

        if thermo.dpdt() {
            fields.dpdt.assign(&fvc::ddt(&fields.p, scheme));
        }

        PressureCorrection {
            momentum,
            continuity_errors,
            pressure_limited,
        }
    }

    /// ddt(rho) + div(phi) == S_rho, explicit in phi; nothing to do in steady runs
    fn update_density(&self, fields: &mut FlameletFields, mass_source: &[f64], ctx: &FvContext) {
        let scheme = ctx.controls.ddt_scheme;
        if scheme.is_steady() {
            return;
        }
        let dt = 1.0 / scheme.rdelta_t();
        let rho_0 = fields.rho.old_time();
        let div_phi = fvc::div(&fields.phi, ctx.mesh);
        for cell in 0..ctx.mesh.n_cells() {
            fields.rho.internal[cell] =
                rho_0.internal[cell] + dt * (mass_source[cell] - div_phi[cell]);
        }
        fields.rho.correct_boundary_conditions(ctx.mesh);
    }

    fn continuity_errors(
        &mut self,
        fields: &FlameletFields,
        thermo: &dyn PropertyProvider,
        mesh: &FvMesh,
    ) -> ContinuityErrors {
        let thermo_rho = thermo.density(&fields.p);
        let total_mass = fields.total_mass(mesh);
        if total_mass.abs() < VSMALL {
            warn!("total mass vanished, continuity errors not evaluated");
            return ContinuityErrors {
                cumulative: self.cumulative_continuity_error,
                ..ContinuityErrors::default()
            };
        }
        let difference: Vec<f64> = fields
            .rho
            .internal
            .iter()
            .zip(thermo_rho.internal.iter())
            .map(|(rho, thermo_rho)| rho - thermo_rho)
            .collect();
        let magnitude: Vec<f64> = difference.iter().map(|d| d.abs()).collect();
        let sum_local = fvc::domain_integrate(&magnitude, mesh) / total_mass;
        let global = fvc::domain_integrate(&difference, mesh) / total_mass;
        self.cumulative_continuity_error += global;
        info!(
            "time step continuity errors : sum local = {:e}, global = {:e}, cumulative = {:e}",
            sum_local, global, self.cumulative_continuity_error
        );
        ContinuityErrors {
            sum_local,
            global,
            cumulative: self.cumulative_continuity_error,
        }
    }
}
