//! Thermodynamic state provider of the flamelet solver.
//!
//! The provider owns compressibility, temperature and the mean absorption coefficient.
//! Pressure is not owned here: it lives in [`FlameletFields`] and is passed in.

use crate::FiniteVolume::fields::VolScalarField;
use crate::FiniteVolume::fv_mesh::FvMesh;
use crate::FlameletSolver::flamelet_errors::FlameletError;
use crate::FlameletSolver::flamelet_fields::FlameletFields;
use serde::{Deserialize, Serialize};

/// Universal gas constant, J/(kmol K)
pub const R_UNIVERSAL: f64 = 8314.462618;
const T_FLOOR: f64 = 1.0;

pub trait PropertyProvider {
    /// rho = psi*p
    fn density(&self, p: &VolScalarField) -> VolScalarField;
    fn compressibility(&self) -> &VolScalarField;
    fn temperature(&self) -> &VolScalarField;
    /// mean absorption coefficient, 1/m
    fn absorption_coefficient(&self) -> &VolScalarField;
    /// refresh derived quantities from the current scalar state
    fn correct(&mut self, fields: &FlameletFields, mesh: &FvMesh);
    /// whether the energy equation needs dp/dt
    fn dpdt(&self) -> bool;
    fn store_old_time(&mut self);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct IdealGasParameters {
    /// J/(kg K)
    pub cp: f64,
    /// molar mass of the fuel stream (Z = 1), kg/kmol
    pub W_fuel: f64,
    /// molar mass of the oxidiser stream (Z = 0), kg/kmol
    pub W_oxidiser: f64,
    /// 1/m
    pub absorption: f64,
    #[serde(default)]
    pub dpdt: bool,
}

impl Default for IdealGasParameters {
    fn default() -> Self {
        Self {
            cp: 1000.0,
            W_fuel: 16.04,
            W_oxidiser: 28.85,
            absorption: 0.1,
            dpdt: false,
        }
    }
}

impl IdealGasParameters {
    pub fn validate(&self) -> Result<(), FlameletError> {
        for (name, value) in [
            ("cp", self.cp),
            ("W_fuel", self.W_fuel),
            ("W_oxidiser", self.W_oxidiser),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(FlameletError::InvalidConfiguration(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.absorption < 0.0 {
            return Err(FlameletError::InvalidConfiguration(format!(
                "absorption coefficient must not be negative, got {}",
                self.absorption
            )));
        }
        Ok(())
    }

    /// 1/W = Z/W_fuel + (1 - Z)/W_oxidiser, with Z clipped to [0, 1]
    pub fn mixture_molar_mass(&self, z: f64) -> f64 {
        let z = z.clamp(0.0, 1.0);
        1.0 / (z / self.W_fuel + (1.0 - z) / self.W_oxidiser)
    }
}

/// Two-stream ideal gas with constant cp standing in for the flamelet table
#[derive(Debug, Clone)]
pub struct IdealGasFlameletThermo {
    pub parameters: IdealGasParameters,
    pub psi: VolScalarField,
    pub T: VolScalarField,
    pub absorption: VolScalarField,
}

impl IdealGasFlameletThermo {
    #[allow(non_snake_case)]
    pub fn new(
        parameters: IdealGasParameters,
        mesh: &FvMesh,
        H: &VolScalarField,
        Z: &VolScalarField,
    ) -> Result<Self, FlameletError> {
        parameters.validate()?;
        let mut thermo = Self {
            psi: VolScalarField::uniform_calculated("psi", mesh, 0.0),
            T: VolScalarField::uniform_calculated("T", mesh, 0.0),
            absorption: VolScalarField::uniform_calculated("as", mesh, parameters.absorption),
            parameters,
        };
        thermo.evaluate(H, Z);
        Ok(thermo)
    }

    #[allow(non_snake_case)]
    fn evaluate(&mut self, H: &VolScalarField, Z: &VolScalarField) {
        let cp = self.parameters.cp;
        self.T.assign(&H.map("T", |h| (h / cp).max(T_FLOOR)));
        let parameters = &self.parameters;
        let psi = self.T.zip_with(Z, "psi", |t, z| {
            parameters.mixture_molar_mass(z) / (R_UNIVERSAL * t)
        });
        self.psi.assign(&psi);
    }
}

impl PropertyProvider for IdealGasFlameletThermo {
    fn density(&self, p: &VolScalarField) -> VolScalarField {
        self.psi.zip_with(p, "rho", |psi, p| psi * p)
    }

    fn compressibility(&self) -> &VolScalarField {
        &self.psi
    }

    fn temperature(&self) -> &VolScalarField {
        &self.T
    }

    fn absorption_coefficient(&self) -> &VolScalarField {
        &self.absorption
    }

    fn correct(&mut self, fields: &FlameletFields, _mesh: &FvMesh) {
        self.evaluate(&fields.H, &fields.Z);
    }

    fn dpdt(&self) -> bool {
        self.parameters.dpdt
    }

    fn store_old_time(&mut self) {
        self.psi.store_old_time();
        self.T.store_old_time();
    }
}
