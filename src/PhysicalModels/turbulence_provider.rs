use crate::FiniteVolume::fields::VolScalarField;
use crate::FiniteVolume::fv_mesh::FvMesh;
use crate::FlameletSolver::flamelet_errors::FlameletError;
use crate::FlameletSolver::flamelet_fields::FlameletFields;
use serde::{Deserialize, Serialize};

/// Turbulence quantities read by the solver stages
pub trait TurbulenceModel {
    /// laminar plus turbulent viscosity
    fn mu_eff(&self) -> &VolScalarField;
    /// turbulent viscosity
    fn mu_t(&self) -> &VolScalarField;
    fn k(&self) -> &VolScalarField;
    fn epsilon(&self) -> &VolScalarField;
    fn correct(&mut self, fields: &FlameletFields, mesh: &FvMesh);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrozenTurbulenceParameters {
    /// laminar viscosity, kg/(m s)
    pub mu: f64,
    #[serde(rename = "mut")]
    pub mu_t: f64,
    pub k: f64,
    pub epsilon: f64,
}

impl Default for FrozenTurbulenceParameters {
    fn default() -> Self {
        Self {
            mu: 1.8e-5,
            mu_t: 1e-3,
            k: 1.0,
            epsilon: 10.0,
        }
    }
}

/// Uniform turbulence fields that never change
#[derive(Debug, Clone)]
pub struct FrozenTurbulence {
    mu_eff: VolScalarField,
    mu_t: VolScalarField,
    k: VolScalarField,
    epsilon: VolScalarField,
}

impl FrozenTurbulence {
    pub fn new(parameters: &FrozenTurbulenceParameters, mesh: &FvMesh) -> Result<Self, FlameletError> {
        let values = [
            ("mu", parameters.mu),
            ("mut", parameters.mu_t),
            ("k", parameters.k),
            ("epsilon", parameters.epsilon),
        ];
        if let Some((name, value)) = values.iter().find(|(_, v)| !(*v >= 0.0 && v.is_finite())) {
            return Err(FlameletError::InvalidConfiguration(format!(
                "turbulence value {} must be finite and non-negative, got {}",
                name, value
            )));
        }
        Ok(Self {
            mu_eff: VolScalarField::uniform_calculated("muEff", mesh, parameters.mu + parameters.mu_t),
            mu_t: VolScalarField::uniform_calculated("mut", mesh, parameters.mu_t),
            k: VolScalarField::uniform_calculated("k", mesh, parameters.k),
            epsilon: VolScalarField::uniform_calculated("epsilon", mesh, parameters.epsilon),
        })
    }
}

impl TurbulenceModel for FrozenTurbulence {
    fn mu_eff(&self) -> &VolScalarField {
        &self.mu_eff
    }

    fn mu_t(&self) -> &VolScalarField {
        &self.mu_t
    }

    fn k(&self) -> &VolScalarField {
        &self.k
    }

    fn epsilon(&self) -> &VolScalarField {
        &self.epsilon
    }

    fn correct(&mut self, _fields: &FlameletFields, _mesh: &FvMesh) {}
}
