//! Simulation state shared by the solver stages.

use super::flamelet_properties::SolutionControls;
use crate::FiniteVolume::fields::{SurfaceScalarField, VolScalarField, VolVectorField};
use crate::FiniteVolume::fv_mesh::FvMesh;
use crate::FiniteVolume::fvc;
use crate::PhysicalModels::frame_motion::FrameMotionModel;
use crate::PhysicalModels::fv_options::FvOptionsModel;
use crate::PhysicalModels::thermo_provider::PropertyProvider;

/// Fields advanced by the flamelet solver. Each stage receives `&mut FlameletFields`
/// for the duration of its own call.
#[derive(Debug, Clone)]
#[allow(non_snake_case)]
pub struct FlameletFields {
    /// kg/m3
    pub rho: VolScalarField,
    /// Pa
    pub p: VolScalarField,
    /// m/s
    pub U: VolVectorField,
    /// face mass flux, kg/s
    pub phi: SurfaceScalarField,
    /// face mass flux of the previous time step
    pub phi_old: Option<SurfaceScalarField>,
    /// kinetic energy, m2/s2
    pub K: VolScalarField,
    pub dpdt: VolScalarField,
    /// mixture fraction
    pub Z: VolScalarField,
    /// mixture fraction variance
    pub Zvar: VolScalarField,
    /// stoichiometric scalar dissipation rate, 1/s
    pub chi_st: VolScalarField,
    /// J/kg
    pub H: VolScalarField,
    /// radiative heat loss, W/m3
    pub Qrad: VolScalarField,
}

impl FlameletFields {
    /// Derived fields (rho, phi, K, chi_st, Qrad, dpdt) are initialised from the
    /// transported ones and the provider.
    #[allow(non_snake_case)]
    pub fn new(
        mesh: &FvMesh,
        U: VolVectorField,
        p: VolScalarField,
        Z: VolScalarField,
        Zvar: VolScalarField,
        H: VolScalarField,
        thermo: &dyn PropertyProvider,
    ) -> Self {
        let rho = thermo.density(&p);
        let rho_u = rho.zip_with(&U, "rhoU", |r, u| u * r);
        let mut phi = fvc::flux(&rho_u, mesh);
        phi.name = "phi".to_string();
        let K = U.map("K", |u| 0.5 * u.norm_squared());
        Self {
            rho,
            p,
            U,
            phi,
            phi_old: None,
            K,
            dpdt: VolScalarField::uniform_calculated("dpdt", mesh, 0.0),
            Z,
            Zvar,
            chi_st: VolScalarField::uniform_calculated("chi_st", mesh, 0.0),
            H,
            Qrad: VolScalarField::uniform_calculated("Qrad", mesh, 0.0),
        }
    }

    pub fn store_old_time(&mut self) {
        self.rho.store_old_time();
        self.p.store_old_time();
        self.U.store_old_time();
        self.Z.store_old_time();
        self.Zvar.store_old_time();
        self.H.store_old_time();
        self.phi_old = Some(self.phi.clone());
    }

    /// Previous iterates of the explicitly relaxed fields
    pub fn store_prev_iter(&mut self) {
        self.p.store_prev_iter();
        self.rho.store_prev_iter();
    }

    pub fn total_mass(&self, mesh: &FvMesh) -> f64 {
        fvc::domain_integrate(&self.rho.internal, mesh)
    }
}

/// Read-only collaborators shared by the stages of one iteration
#[derive(Debug, Clone, Copy)]
pub struct FvContext<'a> {
    pub mesh: &'a FvMesh,
    pub controls: &'a SolutionControls,
    pub fv_options: &'a FvOptionsModel,
    pub mrf: &'a FrameMotionModel,
}
