//! # Case file
//!
//! A case is one JSON document with the mesh, the initial state and boundary
//! conditions of the transported fields, the sub-model parameters and the controls:
//!
//! ```json
//! {
//!   "mesh": {"nx": 20, "ny": 4, "lx": 1.0, "ly": 0.2, "depth": 0.1},
//!   "fields": {
//!     "U":    {"initial": [0.0, 0.0, 0.0], "boundary": {"left": {"FixedValue": [1.0, 0.0, 0.0]}, "...": "..."}},
//!     "p":    {"initial": 101325.0, "boundary": {"right": {"FixedValue": 101325.0}, "...": "..."}},
//!     "Z":    {"initial": 0.0, "boundary": {}},
//!     "Zvar": {"initial": 0.0, "boundary": {}},
//!     "H":    {"initial": 300000.0, "boundary": {}}
//!   },
//!   "thermo": {"cp": 1000.0, "W_fuel": 16.04, "W_oxidiser": 28.85, "absorption": 0.1},
//!   "turbulence": {"mu": 1.8e-5, "mut": 1e-3, "k": 1.0, "epsilon": 10.0},
//!   "flameletsProperties": {"Cg": 2.86, "...": "..."},
//!   "solutionControls": {"nCorrectors": 2, "...": "..."},
//!   "iterations": 10
//! }
//! ```
//! Patches missing from a `boundary` map are zero-gradient.

use super::flamelet_driver::{FlameletModels, FlameletSolver};
use super::flamelet_errors::FlameletError;
use super::flamelet_fields::FlameletFields;
use super::flamelet_properties::{FlameletProperties, SolutionControls};
use crate::FiniteVolume::fields::{FieldValue, PatchCondition, VolField};
use crate::FiniteVolume::fv_mesh::FvMesh;
use crate::PhysicalModels::frame_motion::FrameMotionModel;
use crate::PhysicalModels::fv_options::FvOptionsModel;
use crate::PhysicalModels::thermo_provider::{IdealGasFlameletThermo, IdealGasParameters};
use crate::PhysicalModels::turbulence_provider::{FrozenTurbulence, FrozenTurbulenceParameters};
use log::info;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDescription {
    pub nx: usize,
    pub ny: usize,
    pub lx: f64,
    pub ly: f64,
    pub depth: f64,
}

/// Uniform initial value and boundary conditions keyed by patch name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescription<T> {
    pub initial: T,
    #[serde(default)]
    pub boundary: HashMap<String, PatchCondition<T>>,
}

impl<T: FieldValue> FieldDescription<T> {
    pub fn build(&self, name: &str, mesh: &FvMesh) -> Result<VolField<T>, FlameletError> {
        if let Some(unknown) = self
            .boundary
            .keys()
            .find(|patch| mesh.patch_index(patch).is_none())
        {
            return Err(FlameletError::MeshMismatch(format!(
                "field {} sets a condition on unknown patch {}",
                name, unknown
            )));
        }
        let conditions = mesh
            .patches
            .iter()
            .map(|patch| {
                self.boundary
                    .get(&patch.name)
                    .cloned()
                    .unwrap_or(PatchCondition::ZeroGradient)
            })
            .collect();
        VolField::new(name, mesh, self.initial, conditions)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct FieldsDescription {
    pub U: FieldDescription<Vector3<f64>>,
    pub p: FieldDescription<f64>,
    pub Z: FieldDescription<f64>,
    pub Zvar: FieldDescription<f64>,
    pub H: FieldDescription<f64>,
}

fn default_iterations() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDescription {
    pub mesh: MeshDescription,
    pub fields: FieldsDescription,
    #[serde(default)]
    pub thermo: IdealGasParameters,
    #[serde(default)]
    pub turbulence: FrozenTurbulenceParameters,
    #[serde(rename = "flameletsProperties")]
    pub flamelets_properties: FlameletProperties,
    #[serde(default, rename = "solutionControls")]
    pub solution_controls: SolutionControls,
    #[serde(default, rename = "frameMotion")]
    pub frame_motion: FrameMotionModel,
    #[serde(default, rename = "fvOptions")]
    pub fv_options: FvOptionsModel,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
}

impl CaseDescription {
    pub fn from_json_str(json: &str) -> Result<Self, FlameletError> {
        let case: CaseDescription = serde_json::from_str(json)?;
        case.flamelets_properties.validate()?;
        case.solution_controls.validate()?;
        case.thermo.validate()?;
        Ok(case)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FlameletError> {
        let path = path.as_ref();
        info!("reading case from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), FlameletError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Mesh, fields, reference sub-models and the solver built from them
    #[allow(non_snake_case)]
    pub fn build_solver(&self) -> Result<FlameletSolver, FlameletError> {
        let m = &self.mesh;
        let mesh = FvMesh::rectangle(m.nx, m.ny, m.lx, m.ly, m.depth)?;
        let U = self.fields.U.build("U", &mesh)?;
        let p = self.fields.p.build("p", &mesh)?;
        let Z = self.fields.Z.build("Z", &mesh)?;
        let Zvar = self.fields.Zvar.build("Zvar", &mesh)?;
        let H = self.fields.H.build("H", &mesh)?;

        let thermo = IdealGasFlameletThermo::new(self.thermo.clone(), &mesh, &H, &Z)?;
        let turbulence = FrozenTurbulence::new(&self.turbulence, &mesh)?;
        let fields = FlameletFields::new(&mesh, U, p, Z, Zvar, H, &thermo);
        let models = FlameletModels {
            thermo: Box::new(thermo),
            turbulence: Box::new(turbulence),
            mrf: self.frame_motion,
            fv_options: self.fv_options.clone(),
        };
        FlameletSolver::new(
            mesh,
            fields,
            self.solution_controls.clone(),
            self.flamelets_properties.clone(),
            models,
        )
    }
}
