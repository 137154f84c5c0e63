//! Outer iteration of the flamelet solver.
//!
//! One call of [`FlameletSolver::iterate`] runs the stages in their fixed order:
//! momentum predictor, `nCorrectors` pressure correctors, turbulence, mixture fraction
//! and variance, enthalpy and radiation, then monitoring.

use super::enthalpy_radiation::EnthalpySolver;
use super::flamelet_errors::FlameletError;
use super::flamelet_fields::{FlameletFields, FvContext};
use super::flamelet_properties::{FlameletProperties, SolutionControls};
use super::mixture_fraction::{MixtureFractionReport, MixtureFractionSolver};
use super::momentum_predictor::MomentumPredictor;
use super::pressure_velocity::{ContinuityErrors, PressureCorrection, PressureVelocitySolver};
use crate::FiniteVolume::fv_mesh::FvMesh;
use crate::FiniteVolume::linear_solvers::SolverPerformance;
use crate::PhysicalModels::frame_motion::FrameMotionModel;
use crate::PhysicalModels::fv_options::FvOptionsModel;
use crate::PhysicalModels::thermo_provider::PropertyProvider;
use crate::PhysicalModels::turbulence_provider::TurbulenceModel;
use log::{info, warn};

/// Physical sub-models plugged into the solver
pub struct FlameletModels {
    pub thermo: Box<dyn PropertyProvider>,
    pub turbulence: Box<dyn TurbulenceModel>,
    pub mrf: FrameMotionModel,
    pub fv_options: FvOptionsModel,
}

/// Diagnostics of one outer iteration
#[derive(Debug, Clone)]
pub struct IterationReport {
    pub iteration: usize,
    /// one entry per pressure corrector
    pub continuity_errors: Vec<ContinuityErrors>,
    /// true when any corrector clipped the pressure
    pub pressure_limited: bool,
    pub mixture_fraction: MixtureFractionReport,
    pub enthalpy: SolverPerformance,
    /// integral of rho over its value at setup
    pub mass_ratio: f64,
    /// Z left [0, 1] somewhere
    pub z_out_of_bounds: bool,
    /// Zvar went negative somewhere
    pub zvar_negative: bool,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub iterations: Vec<IterationReport>,
    pub initial_mass: f64,
    pub final_mass: f64,
    pub cumulative_continuity_error: f64,
}

impl RunSummary {
    pub fn mass_ratio(&self) -> f64 {
        self.final_mass / self.initial_mass
    }
}

pub struct FlameletSolver {
    pub mesh: FvMesh,
    pub fields: FlameletFields,
    pub controls: SolutionControls,
    pub properties: FlameletProperties,
    pub models: FlameletModels,
    pub pressure: PressureVelocitySolver,
    pub mixture: MixtureFractionSolver,
    pub enthalpy: EnthalpySolver,
    initial_mass: f64,
    iteration: usize,
}

impl FlameletSolver {
    /// Validate the configuration, resolve the pressure limits against the initial
    /// pressure field and record the initial mass.
    pub fn new(
        mesh: FvMesh,
        fields: FlameletFields,
        controls: SolutionControls,
        properties: FlameletProperties,
        models: FlameletModels,
    ) -> Result<Self, FlameletError> {
        properties.validate()?;
        controls.validate()?;
        if fields.p.internal.len() != mesh.n_cells() {
            return Err(FlameletError::MeshMismatch(format!(
                "pressure field has {} cells, mesh has {}",
                fields.p.internal.len(),
                mesh.n_cells()
            )));
        }
        models.fv_options.check_mesh(&mesh)?;
        let limits = controls.pressure_control.resolve(&fields.p)?;
        let initial_mass = fields.total_mass(&mesh);
        if !(initial_mass > 0.0 && initial_mass.is_finite()) {
            return Err(FlameletError::InvalidConfiguration(format!(
                "initial mass must be positive, got {}",
                initial_mass
            )));
        }
        info!(
            "flamelet solver: {} cells, {:?}, {:?}, {:?}",
            mesh.n_cells(),
            controls.pressure_formulation(),
            properties.variance_model(),
            properties.energy_mode()
        );
        Ok(Self {
            pressure: PressureVelocitySolver::new(controls.pressure_formulation(), limits),
            mixture: MixtureFractionSolver::new(&properties),
            enthalpy: EnthalpySolver::new(&properties),
            mesh,
            fields,
            controls,
            properties,
            models,
            initial_mass,
            iteration: 0,
        })
    }

    pub fn initial_mass(&self) -> f64 {
        self.initial_mass
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Store old-time levels before a transient step; nothing to store in steady runs
    pub fn advance_time(&mut self) {
        if self.controls.ddt_scheme.is_steady() {
            return;
        }
        self.fields.store_old_time();
        self.models.thermo.store_old_time();
    }

    pub fn iterate(&mut self) -> IterationReport {
        self.iteration += 1;
        info!("Iteration = {}", self.iteration);
        let ctx = FvContext {
            mesh: &self.mesh,
            controls: &self.controls,
            fv_options: &self.models.fv_options,
            mrf: &self.models.mrf,
        };
        self.fields.store_prev_iter();

        let mut momentum = Some(MomentumPredictor::predict(
            &mut self.fields,
            self.models.turbulence.as_ref(),
            &ctx,
        ));
        let n_correctors = self.controls.n_correctors;
        let mut continuity_errors = Vec::with_capacity(n_correctors);
        let mut pressure_limited = false;
        for corrector in 0..n_correctors {
            let Some(operator) = momentum.take() else {
                break;
            };
            let PressureCorrection {
                momentum: next,
                continuity_errors: errors,
                pressure_limited: limited,
            } = self.pressure.correct(
                &mut self.fields,
                operator,
                self.models.thermo.as_ref(),
                &ctx,
                corrector + 1 == n_correctors,
            );
            momentum = next;
            continuity_errors.push(errors);
            pressure_limited |= limited;
        }

        self.models.turbulence.correct(&self.fields, &self.mesh);
        let mixture_fraction =
            self.mixture
                .correct(&mut self.fields, self.models.turbulence.as_ref(), &ctx);
        let enthalpy = self.enthalpy.correct(
            &mut self.fields,
            self.models.thermo.as_mut(),
            self.models.turbulence.as_ref(),
            &ctx,
        );

        let mass_ratio = self.fields.total_mass(&self.mesh) / self.initial_mass;
        let (z_min, z_max) = self.fields.Z.min_max();
        let (zvar_min, _) = self.fields.Zvar.min_max();
        let z_out_of_bounds = z_min < 0.0 || z_max > 1.0;
        let zvar_negative = zvar_min < 0.0;
        if self.properties.monitoring {
            info!("Mass ratio: {}", mass_ratio);
            if z_out_of_bounds {
                warn!("Z out of [0, 1]: min {}, max {}", z_min, z_max);
            }
            if zvar_negative {
                warn!("negative Zvar: min {}", zvar_min);
            }
            self.print_field_ranges();
        }

        IterationReport {
            iteration: self.iteration,
            continuity_errors,
            pressure_limited,
            mixture_fraction,
            enthalpy,
            mass_ratio,
            z_out_of_bounds,
            zvar_negative,
        }
    }

    /// `n` outer iterations, each preceded by [`advance_time`](Self::advance_time)
    pub fn run(&mut self, n: usize) -> RunSummary {
        let mut iterations = Vec::with_capacity(n);
        for _ in 0..n {
            self.advance_time();
            iterations.push(self.iterate());
        }
        RunSummary {
            iterations,
            initial_mass: self.initial_mass,
            final_mass: self.fields.total_mass(&self.mesh),
            cumulative_continuity_error: self.pressure.cumulative_continuity_error(),
        }
    }
}
