//! Enthalpy transport with an optional grey-body radiative sink.
//!
//! ```text
//! ddt(rho, H) + div(phi, H) - laplacian(muEff/sigmat, H) [+ Qrad] == S_H
//! Qrad = 4*sigma*as*(T^4 - Tenv^4)
//! ```
//! The time derivative vanishes in steady runs. With `radiationMode` off, Qrad is
//! evaluated once as `0*(...)` and then frozen.

use super::flamelet_fields::{FlameletFields, FvContext};
use super::flamelet_properties::{EnergyMode, FlameletProperties};
use crate::FiniteVolume::fvm;
use crate::FiniteVolume::linear_solvers::SolverPerformance;
use crate::PhysicalModels::fv_options::FvOptions;
use crate::PhysicalModels::thermo_provider::PropertyProvider;
use crate::PhysicalModels::turbulence_provider::TurbulenceModel;
use log::info;

/// Stefan-Boltzmann constant, W/(m2 K4)
pub const SIGMA_SB: f64 = 5.6704e-8;

/// Qrad evaluation state of a non-adiabatic run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadiationState {
    /// Qrad recomputed every iteration
    On,
    /// Qrad zeroed on the next iteration
    PendingOff,
    /// Qrad frozen
    Off,
}

impl RadiationState {
    pub fn from_mode(radiation_mode: bool) -> Self {
        if radiation_mode {
            RadiationState::On
        } else {
            RadiationState::PendingOff
        }
    }

    pub fn advance(self) -> Self {
        match self {
            RadiationState::On => RadiationState::On,
            RadiationState::PendingOff | RadiationState::Off => RadiationState::Off,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnthalpySolver {
    pub mode: EnergyMode,
    sigmat: f64,
    t_env: f64,
}

impl EnthalpySolver {
    pub fn new(properties: &FlameletProperties) -> Self {
        Self {
            mode: properties.energy_mode(),
            sigmat: properties.sigmat,
            t_env: properties.Tenv,
        }
    }

    /// Evaluate Qrad according to the radiation state, then move the state on
    pub fn update_radiation(&mut self, fields: &mut FlameletFields, thermo: &dyn PropertyProvider) {
        let EnergyMode::NonAdiabatic(state) = self.mode else {
            return;
        };
        let t_env4 = self.t_env.powi(4);
        let emission = |a_s: f64, t: f64| 4.0 * SIGMA_SB * a_s * (t.powi(4) - t_env4);
        let absorption = thermo.absorption_coefficient();
        let temperature = thermo.temperature();
        match state {
            RadiationState::On => {
                fields
                    .Qrad
                    .assign(&absorption.zip_with(temperature, "Qrad", emission));
            }
            RadiationState::PendingOff => {
                fields.Qrad.assign(&absorption.zip_with(temperature, "Qrad", |a_s, t| {
                    0.0 * emission(a_s, t)
                }));
            }
            RadiationState::Off => {}
        }
        self.mode = EnergyMode::NonAdiabatic(state.advance());
    }

    /// Solve the enthalpy equation and refresh the provider
    #[allow(non_snake_case)]
    pub fn correct(
        &mut self,
        fields: &mut FlameletFields,
        thermo: &mut dyn PropertyProvider,
        turbulence: &dyn TurbulenceModel,
        ctx: &FvContext,
    ) -> SolverPerformance {
        let mesh = ctx.mesh;
        self.update_radiation(fields, &*thermo);

        let sigmat = self.sigmat;
        let diffusivity = turbulence.mu_eff().map("muEff/sigmat", |m| m / sigmat);
        let mut HEqn = fvm::ddt(&fields.rho, &fields.H, ctx.controls.ddt_scheme, mesh)
            + fvm::div(&fields.phi, &fields.H, mesh)
            - fvm::laplacian_vol(&diffusivity, &fields.H, mesh);
        if let EnergyMode::NonAdiabatic(_) = self.mode {
            HEqn.add_explicit(mesh, &fields.Qrad.internal);
        }
        if thermo.dpdt() {
            HEqn.equals_explicit(mesh, &fields.dpdt.internal);
        }
        HEqn.equals_explicit(mesh, &ctx.fv_options.source("H", mesh));
        if let Some(alpha) = ctx.controls.equation_relaxation_factor("H") {
            HEqn.relax(mesh, &fields.H, alpha);
        }
        ctx.fv_options.constrain(&mut HEqn, mesh);
        let performance = HEqn.solve(mesh, &mut fields.H, &ctx.controls.solver_controls("H", false));

        thermo.correct(fields, mesh);
        let (t_min, t_max) = thermo.temperature().min_max();
        info!(" * Tgas min/max = {}, {}", t_min, t_max);
        performance
    }
}
