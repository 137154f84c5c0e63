//! Case configuration: the flamelet model dictionary, the solution controls, and the
//! tagged variants the boolean switches are resolved into at setup.

use super::enthalpy_radiation::RadiationState;
use super::flamelet_errors::FlameletError;
use super::mixture_fraction::{AlgebraicVariance, TransportVariance, VarianceModel};
use crate::FiniteVolume::fields::{PatchCondition, VolScalarField};
use crate::FiniteVolume::fvm::DdtScheme;
use crate::FiniteVolume::linear_solvers::SolverControls;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Flamelet model dictionary (`flameletsProperties`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct FlameletProperties {
    /// mass ratio and min/max reporting every iteration
    #[serde(default)]
    pub monitoring: bool,
    /// production constant of the variance equation
    pub Cg: f64,
    /// dissipation constant of the variance equation
    pub Cd: f64,
    /// scalar dissipation rate constant
    pub Cx: f64,
    /// turbulent Schmidt/Prandtl number of Z, Zvar and H
    pub sigmat: f64,
    pub k_small: f64,
    pub epsilon_small: f64,
    /// environment temperature of the radiation sink, K
    pub Tenv: f64,
    /// false: transport equation for Zvar, true: algebraic closure
    #[serde(rename = "varianceEquation")]
    pub variance_equation: bool,
    #[serde(rename = "adiabaticMode")]
    pub adiabatic_mode: bool,
    #[serde(rename = "radiationMode")]
    pub radiation_mode: bool,
}

impl Default for FlameletProperties {
    fn default() -> Self {
        Self {
            monitoring: false,
            Cg: 2.86,
            Cd: 2.0,
            Cx: 2.0,
            sigmat: 0.85,
            k_small: 1e-6,
            epsilon_small: 1e-6,
            Tenv: 300.0,
            variance_equation: false,
            adiabatic_mode: true,
            radiation_mode: false,
        }
    }
}

impl FlameletProperties {
    pub fn validate(&self) -> Result<(), FlameletError> {
        let values = [
            ("Cg", self.Cg),
            ("Cd", self.Cd),
            ("Cx", self.Cx),
            ("sigmat", self.sigmat),
            ("k_small", self.k_small),
            ("epsilon_small", self.epsilon_small),
            ("Tenv", self.Tenv),
        ];
        if let Some((name, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(FlameletError::InvalidConfiguration(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }
        for (name, value) in [
            ("k_small", self.k_small),
            ("epsilon_small", self.epsilon_small),
            ("sigmat", self.sigmat),
            ("Cd", self.Cd),
        ] {
            if value <= 0.0 {
                return Err(FlameletError::InvalidConfiguration(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.Tenv < 0.0 {
            return Err(FlameletError::InvalidConfiguration(format!(
                "Tenv must not be negative, got {}",
                self.Tenv
            )));
        }
        Ok(())
    }

    /// Create from HashMap of numeric entries; switches are read as 0/1
    pub fn from_hashmap(map: &HashMap<String, f64>) -> Result<Self, FlameletError> {
        let get = |key: &str| {
            map.get(key).copied().ok_or_else(|| {
                FlameletError::MissingData(format!("Missing {} in flameletsProperties", key))
            })
        };
        let switch = |key: &str| get(key).map(|v| v != 0.0);
        let properties = Self {
            monitoring: map.get("monitoring").is_some_and(|&v| v != 0.0),
            Cg: get("Cg")?,
            Cd: get("Cd")?,
            Cx: get("Cx")?,
            sigmat: get("sigmat")?,
            k_small: get("k_small")?,
            epsilon_small: get("epsilon_small")?,
            Tenv: get("Tenv")?,
            variance_equation: switch("varianceEquation")?,
            adiabatic_mode: switch("adiabaticMode")?,
            radiation_mode: switch("radiationMode")?,
        };
        properties.validate()?;
        Ok(properties)
    }

    pub fn variance_model(&self) -> VarianceModel {
        if self.variance_equation {
            VarianceModel::Algebraic(AlgebraicVariance)
        } else {
            VarianceModel::Transport(TransportVariance)
        }
    }

    pub fn energy_mode(&self) -> EnergyMode {
        if self.adiabatic_mode {
            EnergyMode::Adiabatic
        } else {
            EnergyMode::NonAdiabatic(RadiationState::from_mode(self.radiation_mode))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureFormulation {
    /// density-flux linearised continuity with a convective pressure term
    Transonic,
    Incompressible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyMode {
    Adiabatic,
    NonAdiabatic(RadiationState),
}

/// Pressure bounds, given absolutely or as factors of the boundary pressure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PressureControl {
    #[serde(default, rename = "pMin")]
    pub p_min: Option<f64>,
    #[serde(default, rename = "pMax")]
    pub p_max: Option<f64>,
    #[serde(default, rename = "pMinFactor")]
    pub p_min_factor: Option<f64>,
    #[serde(default, rename = "pMaxFactor")]
    pub p_max_factor: Option<f64>,
    #[serde(default, rename = "rhoMin")]
    pub rho_min: Option<f64>,
    #[serde(default, rename = "rhoMax")]
    pub rho_max: Option<f64>,
}

/// Resolved pressure and density bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureLimits {
    pub p_min: f64,
    pub p_max: f64,
    pub rho_min: Option<f64>,
    pub rho_max: Option<f64>,
}

impl PressureControl {
    /// Resolve factors against the fixed-value boundary pressure of `p`
    /// (the whole field when no patch fixes it). A fixed-value pressure outside the
    /// resolved limits is rejected, since clipping never reaches it.
    pub fn resolve(&self, p: &VolScalarField) -> Result<PressureLimits, FlameletError> {
        let fixed: Vec<f64> = p
            .boundary
            .iter()
            .filter(|patch| matches!(patch.condition, PatchCondition::FixedValue(_)))
            .flat_map(|patch| patch.values.iter().copied())
            .collect();
        let (reference_min, reference_max) = if fixed.is_empty() {
            p.min_max()
        } else {
            fixed.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
        };
        let p_min = match (self.p_min, self.p_min_factor) {
            (Some(p_min), _) => p_min,
            (None, Some(factor)) => factor * reference_min,
            (None, None) => {
                return Err(FlameletError::MissingData(
                    "pressureControl needs pMin or pMinFactor".to_string(),
                ));
            }
        };
        let p_max = match (self.p_max, self.p_max_factor) {
            (Some(p_max), _) => p_max,
            (None, Some(factor)) => factor * reference_max,
            (None, None) => {
                return Err(FlameletError::MissingData(
                    "pressureControl needs pMax or pMaxFactor".to_string(),
                ));
            }
        };
        if !(p_min.is_finite() && p_max.is_finite() && p_min <= p_max) {
            return Err(FlameletError::InvalidConfiguration(format!(
                "pressure limits must be finite with pMin <= pMax, got [{}, {}]",
                p_min, p_max
            )));
        }
        if let Some(value) = fixed.iter().find(|&&v| v < p_min || v > p_max) {
            return Err(FlameletError::InvalidConfiguration(format!(
                "fixed boundary pressure {} lies outside [{}, {}]",
                value, p_min, p_max
            )));
        }
        if let (Some(lo), Some(hi)) = (self.rho_min, self.rho_max) {
            if lo > hi {
                return Err(FlameletError::InvalidConfiguration(format!(
                    "rhoMin {} exceeds rhoMax {}",
                    lo, hi
                )));
            }
        }
        Ok(PressureLimits {
            p_min,
            p_max,
            rho_min: self.rho_min,
            rho_max: self.rho_max,
        })
    }
}

impl PressureLimits {
    /// Clip interior pressure to [p_min, p_max]; non-finite values end up on a bound.
    /// Boundary values follow from `correct_boundary_conditions`; fixed-value patches are
    /// checked against the limits once, in [`PressureControl::resolve`].
    /// Returns true when any value was changed.
    pub fn limit(&self, p: &mut VolScalarField) -> bool {
        let mut limited = false;
        for value in p.internal.iter_mut() {
            let clipped = value.max(self.p_min).min(self.p_max);
            if clipped != *value {
                limited = true;
                *value = clipped;
            }
        }
        limited
    }

    /// Clip interior density when rhoMin/rhoMax are configured
    pub fn limit_density(&self, rho: &mut VolScalarField) {
        for value in rho.internal.iter_mut() {
            if let Some(lo) = self.rho_min {
                *value = value.max(lo);
            }
            if let Some(hi) = self.rho_max {
                *value = value.min(hi);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelaxationFactors {
    /// explicit factors applied to fields
    #[serde(default)]
    pub fields: HashMap<String, f64>,
    /// implicit factors applied to matrices
    #[serde(default)]
    pub equations: HashMap<String, f64>,
}

fn one() -> usize {
    1
}

fn yes() -> bool {
    true
}

fn steady() -> DdtScheme {
    DdtScheme::Steady
}

/// Algorithm controls of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionControls {
    #[serde(default, rename = "nNonOrthogonalCorrectors")]
    pub n_non_orth_correctors: usize,
    /// pressure correctors per outer iteration
    #[serde(default = "one", rename = "nCorrectors")]
    pub n_correctors: usize,
    #[serde(default = "yes", rename = "momentumPredictor")]
    pub momentum_predictor: bool,
    #[serde(default)]
    pub transonic: bool,
    #[serde(default = "steady", rename = "ddtScheme")]
    pub ddt_scheme: DdtScheme,
    #[serde(default, rename = "pressureControl")]
    pub pressure_control: PressureControl,
    #[serde(default, rename = "relaxationFactors")]
    pub relaxation_factors: RelaxationFactors,
    #[serde(default)]
    pub solvers: HashMap<String, SolverControls>,
}

impl Default for SolutionControls {
    fn default() -> Self {
        Self {
            n_non_orth_correctors: 0,
            n_correctors: 1,
            momentum_predictor: true,
            transonic: false,
            ddt_scheme: DdtScheme::Steady,
            pressure_control: PressureControl::default(),
            relaxation_factors: RelaxationFactors::default(),
            solvers: HashMap::new(),
        }
    }
}

impl SolutionControls {
    pub fn validate(&self) -> Result<(), FlameletError> {
        if self.n_correctors == 0 {
            return Err(FlameletError::InvalidConfiguration(
                "nCorrectors must be at least 1".to_string(),
            ));
        }
        if let DdtScheme::Euler { delta_t } = self.ddt_scheme {
            if !(delta_t > 0.0 && delta_t.is_finite()) {
                return Err(FlameletError::InvalidConfiguration(format!(
                    "deltaT must be positive, got {}",
                    delta_t
                )));
            }
        }
        let factors = self
            .relaxation_factors
            .fields
            .iter()
            .chain(self.relaxation_factors.equations.iter());
        for (name, &alpha) in factors {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(FlameletError::InvalidConfiguration(format!(
                    "relaxation factor of {} must be in (0, 1], got {}",
                    name, alpha
                )));
            }
        }
        Ok(())
    }

    pub fn pressure_formulation(&self) -> PressureFormulation {
        if self.transonic {
            PressureFormulation::Transonic
        } else {
            PressureFormulation::Incompressible
        }
    }

    /// Solver controls of `name`; on the final inner iteration `<name>Final` wins when present
    pub fn solver_controls(&self, name: &str, final_iteration: bool) -> SolverControls {
        let final_name = format!("{}Final", name);
        let entry = if final_iteration && self.solvers.contains_key(&final_name) {
            self.solvers.get(&final_name)
        } else {
            self.solvers.get(name)
        };
        entry.cloned().unwrap_or_default()
    }

    pub fn field_relaxation_factor(&self, name: &str) -> Option<f64> {
        self.relaxation_factors.fields.get(name).copied()
    }

    pub fn equation_relaxation_factor(&self, name: &str) -> Option<f64> {
        self.relaxation_factors.equations.get(name).copied()
    }
}
