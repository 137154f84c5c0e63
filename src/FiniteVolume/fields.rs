//! # Fields
//!
//! Cell-centred fields ([`VolField`]) and face fields ([`SurfaceField`]) over an [`FvMesh`].
//! A field does not keep a reference to its mesh; every operation that needs geometry
//! takes `&FvMesh` explicitly.
//!
//! Besides the current values a `VolField` may carry
//! - a previous-iterate copy, used by explicit under-relaxation ([`VolField::relax`]);
//! - an old-time copy, used by time derivatives ([`VolField::old_time`]).
//!
//! ## Boundary conditions
//! | Condition | face value | used for |
//! |-----------|------------|----------|
//! | `FixedValue(v)` | v | inlets, walls, fixed outlet pressure |
//! | `ZeroGradient` | adjacent cell value | outlets, symmetry-like sides |
//! | `FixedGradient(g)` | cell + g/Δ | prescribed normal gradient |
//! | `FixedFluxPressure` | cell + g/Δ, g set by the pressure stage | pressure at velocity inlets/walls |
//! | `Calculated` | whatever was assigned | derived fields (rho, chi_st, ...) |

use super::fv_mesh::FvMesh;
use crate::FlameletSolver::flamelet_errors::FlameletError;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

/// Value stored per cell or per face
pub trait FieldValue:
    Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f64, Output = Self>
    + Neg<Output = Self>
{
    fn zero() -> Self;
    fn mag_sqr(&self) -> f64;
}

impl FieldValue for f64 {
    fn zero() -> Self {
        0.0
    }
    fn mag_sqr(&self) -> f64 {
        self * self
    }
}

impl FieldValue for Vector3<f64> {
    fn zero() -> Self {
        Vector3::zeros()
    }
    fn mag_sqr(&self) -> f64 {
        self.norm_squared()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PatchCondition<T> {
    FixedValue(T),
    ZeroGradient,
    FixedGradient(T),
    /// normal gradient recomputed from the imposed flux by the pressure stage
    FixedFluxPressure,
    Calculated,
}

#[derive(Debug, Clone)]
pub struct PatchField<T: FieldValue> {
    pub condition: PatchCondition<T>,
    pub values: Vec<T>,
    /// normal gradient per face, meaningful for gradient-type conditions
    pub gradient: Vec<T>,
}

impl<T: FieldValue> PatchField<T> {
    pub fn new(condition: PatchCondition<T>, n_faces: usize, initial: T) -> Self {
        let gradient = match &condition {
            PatchCondition::FixedGradient(g) => vec![*g; n_faces],
            _ => vec![T::zero(); n_faces],
        };
        let values = match &condition {
            PatchCondition::FixedValue(v) => vec![*v; n_faces],
            _ => vec![initial; n_faces],
        };
        Self {
            condition,
            values,
            gradient,
        }
    }

    /// true when the face value cannot be assigned by the solver
    pub fn fixes_value(&self) -> bool {
        matches!(self.condition, PatchCondition::FixedValue(_))
    }

    fn evaluate(&mut self, cell_values: &[T], delta_coeffs: &[f64]) {
        match &self.condition {
            PatchCondition::FixedValue(v) => {
                for value in self.values.iter_mut() {
                    *value = *v;
                }
            }
            PatchCondition::ZeroGradient => {
                self.values.copy_from_slice(cell_values);
            }
            PatchCondition::FixedGradient(_) | PatchCondition::FixedFluxPressure => {
                for (face, value) in self.values.iter_mut().enumerate() {
                    *value = cell_values[face] + self.gradient[face] * (1.0 / delta_coeffs[face]);
                }
            }
            PatchCondition::Calculated => {}
        }
    }
}

impl PatchField<f64> {
    /// face value = value_internal_coeff * cell value + value_boundary_coeff
    pub fn value_internal_coeff(&self) -> f64 {
        match self.condition {
            PatchCondition::FixedValue(_) | PatchCondition::Calculated => 0.0,
            _ => 1.0,
        }
    }

    pub fn value_boundary_coeff(&self, face: usize, delta_coeff: f64) -> f64 {
        match self.condition {
            PatchCondition::FixedValue(v) => v,
            PatchCondition::Calculated => self.values[face],
            PatchCondition::ZeroGradient => 0.0,
            PatchCondition::FixedGradient(_) | PatchCondition::FixedFluxPressure => {
                self.gradient[face] / delta_coeff
            }
        }
    }

    /// normal gradient = gradient_internal_coeff * cell value + gradient_boundary_coeff
    pub fn gradient_internal_coeff(&self, delta_coeff: f64) -> f64 {
        match self.condition {
            PatchCondition::FixedValue(_) | PatchCondition::Calculated => -delta_coeff,
            _ => 0.0,
        }
    }

    pub fn gradient_boundary_coeff(&self, face: usize, delta_coeff: f64) -> f64 {
        match self.condition {
            PatchCondition::FixedValue(v) => delta_coeff * v,
            PatchCondition::Calculated => delta_coeff * self.values[face],
            PatchCondition::ZeroGradient => 0.0,
            PatchCondition::FixedGradient(_) | PatchCondition::FixedFluxPressure => {
                self.gradient[face]
            }
        }
    }
}

/// Cell-centred field with boundary values on every patch
#[derive(Debug, Clone)]
pub struct VolField<T: FieldValue> {
    pub name: String,
    pub internal: Vec<T>,
    pub boundary: Vec<PatchField<T>>,
    prev_iter: Option<(Vec<T>, Vec<Vec<T>>)>,
    old_time: Option<(Vec<T>, Vec<Vec<T>>)>,
}

pub type VolScalarField = VolField<f64>;
pub type VolVectorField = VolField<Vector3<f64>>;

impl<T: FieldValue> VolField<T> {
    /// Uniform field with one boundary condition per mesh patch, in patch order.
    pub fn new(
        name: &str,
        mesh: &FvMesh,
        initial: T,
        conditions: Vec<PatchCondition<T>>,
    ) -> Result<Self, FlameletError> {
        if conditions.len() != mesh.patches.len() {
            return Err(FlameletError::MeshMismatch(format!(
                "field {} has {} boundary conditions, mesh has {} patches",
                name,
                conditions.len(),
                mesh.patches.len()
            )));
        }
        let boundary = conditions
            .into_iter()
            .zip(mesh.patches.iter())
            .map(|(condition, patch)| PatchField::new(condition, patch.len(), initial))
            .collect();
        let mut field = Self {
            name: name.to_string(),
            internal: vec![initial; mesh.n_cells()],
            boundary,
            prev_iter: None,
            old_time: None,
        };
        field.correct_boundary_conditions(mesh);
        Ok(field)
    }

    /// Derived field: every patch is `Calculated`.
    pub fn calculated(name: &str, internal: Vec<T>, boundary_values: Vec<Vec<T>>) -> Self {
        let boundary = boundary_values
            .into_iter()
            .map(|values| PatchField {
                condition: PatchCondition::Calculated,
                gradient: vec![T::zero(); values.len()],
                values,
            })
            .collect();
        Self {
            name: name.to_string(),
            internal,
            boundary,
            prev_iter: None,
            old_time: None,
        }
    }

    pub fn uniform_calculated(name: &str, mesh: &FvMesh, value: T) -> Self {
        let boundary_values = mesh
            .patches
            .iter()
            .map(|patch| vec![value; patch.len()])
            .collect();
        Self::calculated(name, vec![value; mesh.n_cells()], boundary_values)
    }

    pub fn boundary_values(&self) -> Vec<Vec<T>> {
        self.boundary.iter().map(|patch| patch.values.clone()).collect()
    }

    pub fn correct_boundary_conditions(&mut self, mesh: &FvMesh) {
        for (patch_field, patch) in self.boundary.iter_mut().zip(mesh.patches.iter()) {
            let cell_values: Vec<T> = patch.face_cells.iter().map(|&c| self.internal[c]).collect();
            patch_field.evaluate(&cell_values, &patch.delta_coeffs);
        }
    }

    /// Pointwise map into a `Calculated` field
    pub fn map<U: FieldValue>(&self, name: &str, f: impl Fn(T) -> U) -> VolField<U> {
        let internal = self.internal.iter().map(|&v| f(v)).collect();
        let boundary = self
            .boundary
            .iter()
            .map(|patch| patch.values.iter().map(|&v| f(v)).collect())
            .collect();
        VolField::calculated(name, internal, boundary)
    }

    /// Pointwise combination of two fields into a `Calculated` field
    pub fn zip_with<U: FieldValue, V: FieldValue>(
        &self,
        other: &VolField<U>,
        name: &str,
        f: impl Fn(T, U) -> V,
    ) -> VolField<V> {
        let internal = self
            .internal
            .iter()
            .zip(other.internal.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        let boundary = self
            .boundary
            .iter()
            .zip(other.boundary.iter())
            .map(|(pa, pb)| {
                pa.values
                    .iter()
                    .zip(pb.values.iter())
                    .map(|(&a, &b)| f(a, b))
                    .collect()
            })
            .collect();
        VolField::calculated(name, internal, boundary)
    }

    /// Assign interior and boundary values of `other`, keeping own boundary conditions
    pub fn assign(&mut self, other: &VolField<T>) {
        self.internal.clone_from(&other.internal);
        for (mine, theirs) in self.boundary.iter_mut().zip(other.boundary.iter()) {
            mine.values.clone_from(&theirs.values);
        }
    }

    pub fn store_prev_iter(&mut self) {
        self.prev_iter = Some((self.internal.clone(), self.boundary_values()));
    }

    /// Blend toward the previous iterate: x = x_prev + alpha*(x - x_prev).
    /// Nothing happens when no previous iterate was stored.
    pub fn relax(&mut self, alpha: f64) {
        let Some((prev_internal, prev_boundary)) = &self.prev_iter else {
            return;
        };
        for (value, &prev) in self.internal.iter_mut().zip(prev_internal.iter()) {
            *value = prev + (*value - prev) * alpha;
        }
        for (patch, prev_values) in self.boundary.iter_mut().zip(prev_boundary.iter()) {
            for (value, &prev) in patch.values.iter_mut().zip(prev_values.iter()) {
                *value = prev + (*value - prev) * alpha;
            }
        }
    }

    pub fn store_old_time(&mut self) {
        self.old_time = Some((self.internal.clone(), self.boundary_values()));
    }

    pub fn has_old_time(&self) -> bool {
        self.old_time.is_some()
    }

    /// Old-time level as a field; the current values when none was stored
    pub fn old_time(&self) -> VolField<T> {
        let (internal, boundary) = match &self.old_time {
            Some((internal, boundary)) => (internal.clone(), boundary.clone()),
            None => (self.internal.clone(), self.boundary_values()),
        };
        let mut old = VolField::calculated(&format!("{}_0", self.name), internal, boundary);
        for (old_patch, patch) in old.boundary.iter_mut().zip(self.boundary.iter()) {
            old_patch.condition = patch.condition.clone();
            old_patch.gradient.clone_from(&patch.gradient);
        }
        old
    }
}

impl VolField<f64> {
    /// (min, max) over interior and boundary values
    pub fn min_max(&self) -> (f64, f64) {
        self.internal
            .iter()
            .chain(self.boundary.iter().flat_map(|patch| patch.values.iter()))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

impl VolField<Vector3<f64>> {
    /// Scalar field of component `d` with the matching boundary conditions and old-time level
    pub fn component(&self, d: usize) -> VolField<f64> {
        let boundary = self
            .boundary
            .iter()
            .map(|patch| {
                let condition = match &patch.condition {
                    PatchCondition::FixedValue(v) => PatchCondition::FixedValue(v[d]),
                    PatchCondition::ZeroGradient => PatchCondition::ZeroGradient,
                    PatchCondition::FixedGradient(g) => PatchCondition::FixedGradient(g[d]),
                    PatchCondition::FixedFluxPressure => PatchCondition::FixedFluxPressure,
                    PatchCondition::Calculated => PatchCondition::Calculated,
                };
                PatchField {
                    condition,
                    values: patch.values.iter().map(|v| v[d]).collect(),
                    gradient: patch.gradient.iter().map(|g| g[d]).collect(),
                }
            })
            .collect();
        let old_time = self.old_time.as_ref().map(|(internal, boundary)| {
            (
                internal.iter().map(|v| v[d]).collect(),
                boundary
                    .iter()
                    .map(|values| values.iter().map(|v| v[d]).collect())
                    .collect(),
            )
        });
        VolField {
            name: format!("{}.{}", self.name, ["x", "y", "z"][d]),
            internal: self.internal.iter().map(|v| v[d]).collect(),
            boundary,
            prev_iter: None,
            old_time,
        }
    }

    pub fn replace_component(&mut self, d: usize, component: &VolField<f64>) {
        for (v, &c) in self.internal.iter_mut().zip(component.internal.iter()) {
            v[d] = c;
        }
        for (patch, comp_patch) in self.boundary.iter_mut().zip(component.boundary.iter()) {
            for (v, &c) in patch.values.iter_mut().zip(comp_patch.values.iter()) {
                v[d] = c;
            }
        }
    }
}

/// Face field: one value per internal face plus one per boundary face
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceField<T: FieldValue> {
    pub name: String,
    pub internal: Vec<T>,
    pub boundary: Vec<Vec<T>>,
}

pub type SurfaceScalarField = SurfaceField<f64>;

impl<T: FieldValue> SurfaceField<T> {
    pub fn uniform(name: &str, mesh: &FvMesh, value: T) -> Self {
        Self {
            name: name.to_string(),
            internal: vec![value; mesh.n_internal_faces()],
            boundary: mesh.patches.iter().map(|p| vec![value; p.len()]).collect(),
        }
    }

    pub fn map<U: FieldValue>(&self, name: &str, f: impl Fn(T) -> U) -> SurfaceField<U> {
        SurfaceField {
            name: name.to_string(),
            internal: self.internal.iter().map(|&v| f(v)).collect(),
            boundary: self
                .boundary
                .iter()
                .map(|values| values.iter().map(|&v| f(v)).collect())
                .collect(),
        }
    }

    pub fn zip_with<U: FieldValue, V: FieldValue>(
        &self,
        other: &SurfaceField<U>,
        name: &str,
        f: impl Fn(T, U) -> V,
    ) -> SurfaceField<V> {
        SurfaceField {
            name: name.to_string(),
            internal: self
                .internal
                .iter()
                .zip(other.internal.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
            boundary: self
                .boundary
                .iter()
                .zip(other.boundary.iter())
                .map(|(va, vb)| va.iter().zip(vb.iter()).map(|(&a, &b)| f(a, b)).collect())
                .collect(),
        }
    }
}
