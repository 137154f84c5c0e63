#[cfg(test)]
mod tests {
    use crate::FiniteVolume::fields::{
        PatchCondition, SurfaceScalarField, VolScalarField, VolVectorField,
    };
    use crate::FiniteVolume::fv_mesh::FvMesh;
    use crate::FiniteVolume::fvm;
    use crate::FiniteVolume::linear_solvers::SolverControls;
    use crate::PhysicalModels::frame_motion::{FrameMotion, FrameMotionModel, SolidBodyRotation};
    use crate::PhysicalModels::fv_options::{ExplicitSources, FvOptions, FvOptionsModel};
    use crate::PhysicalModels::thermo_provider::{
        IdealGasFlameletThermo, IdealGasParameters, PropertyProvider, R_UNIVERSAL,
    };
    use crate::PhysicalModels::turbulence_provider::{
        FrozenTurbulence, FrozenTurbulenceParameters, TurbulenceModel,
    };
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use std::collections::HashMap;

    fn uniform(mesh: &FvMesh, name: &str, value: f64) -> VolScalarField {
        VolScalarField::new(name, mesh, value, vec![PatchCondition::ZeroGradient; 4]).unwrap()
    }

    #[test]
    fn test_ideal_gas_density() {
        let mesh = FvMesh::rectangle(2, 2, 1.0, 1.0, 1.0).unwrap();
        let parameters = IdealGasParameters {
            cp: 1000.0,
            W_fuel: 16.0,
            W_oxidiser: 32.0,
            absorption: 0.2,
            dpdt: true,
        };
        let h = uniform(&mesh, "H", 300_000.0);
        let z = uniform(&mesh, "Z", 0.5);
        let thermo = IdealGasFlameletThermo::new(parameters, &mesh, &h, &z).unwrap();
        // 1/W = 0.5/16 + 0.5/32
        let w = 1.0 / (0.5 / 16.0 + 0.5 / 32.0);
        assert_relative_eq!(thermo.temperature().internal[0], 300.0);
        assert_relative_eq!(
            thermo.compressibility().internal[1],
            w / (R_UNIVERSAL * 300.0),
            max_relative = 1e-12
        );
        let p = uniform(&mesh, "p", 101325.0);
        let rho = thermo.density(&p);
        assert_relative_eq!(
            rho.internal[2],
            101325.0 * w / (R_UNIVERSAL * 300.0),
            max_relative = 1e-12
        );
        assert_relative_eq!(rho.boundary[0].values[0], rho.internal[0]);
        assert_relative_eq!(thermo.absorption_coefficient().internal[3], 0.2);
        assert!(thermo.dpdt());
    }

    #[test]
    fn test_ideal_gas_rejects_bad_parameters() {
        let mesh = FvMesh::rectangle(1, 1, 1.0, 1.0, 1.0).unwrap();
        let h = uniform(&mesh, "H", 1.0);
        let z = uniform(&mesh, "Z", 0.0);
        let parameters = IdealGasParameters {
            cp: 0.0,
            ..IdealGasParameters::default()
        };
        assert!(IdealGasFlameletThermo::new(parameters, &mesh, &h, &z).is_err());
    }

    #[test]
    fn test_frozen_turbulence() {
        let mesh = FvMesh::rectangle(2, 1, 1.0, 1.0, 1.0).unwrap();
        let parameters = FrozenTurbulenceParameters {
            mu: 1e-5,
            mu_t: 2e-3,
            k: 0.5,
            epsilon: 4.0,
        };
        let turbulence = FrozenTurbulence::new(&parameters, &mesh).unwrap();
        assert_relative_eq!(turbulence.mu_eff().internal[0], 2.01e-3, max_relative = 1e-12);
        assert_relative_eq!(turbulence.mu_t().internal[1], 2e-3);
        assert_relative_eq!(turbulence.k().internal[0], 0.5);
        assert_relative_eq!(turbulence.epsilon().boundary[2].values[0], 4.0);
        let negative = FrozenTurbulenceParameters {
            k: -1.0,
            ..parameters
        };
        assert!(FrozenTurbulence::new(&negative, &mesh).is_err());
    }

    #[test]
    fn test_solid_body_rotation_flux() {
        let mesh = FvMesh::rectangle(3, 3, 1.0, 1.0, 1.0).unwrap();
        let rotation = FrameMotionModel::SolidBody(SolidBodyRotation {
            origin: Vector3::new(0.5, 0.5, 0.5),
            omega: Vector3::new(0.0, 0.0, 2.0),
        });
        let v = rotation.frame_velocity(&Vector3::new(1.0, 0.5, 0.5));
        assert_relative_eq!(v.y, 1.0);
        // fluid moving with the frame has no relative flux
        let mut u = VolVectorField::new("U", &mesh, Vector3::zeros(), vec![PatchCondition::Calculated; 4])
            .unwrap();
        for (cell, centre) in mesh.cell_centres.iter().enumerate() {
            u.internal[cell] = rotation.frame_velocity(centre);
        }
        for (patch_i, patch) in mesh.patches.iter().enumerate() {
            for (face, centre) in patch.face_centres.iter().enumerate() {
                u.boundary[patch_i].values[face] = rotation.frame_velocity(centre);
            }
        }
        let relative = rotation.relative_flux(&mesh, &u);
        for value in relative.internal.iter().chain(relative.boundary.iter().flatten()) {
            assert_relative_eq!(*value, 0.0, epsilon = 1e-12);
        }
        let stationary = FrameMotionModel::default();
        let mut phi = SurfaceScalarField::uniform("phi", &mesh, 1.0);
        let rho_f = SurfaceScalarField::uniform("rho", &mesh, 1.0);
        stationary.make_relative(&mesh, &rho_f, &mut phi);
        assert!(phi.internal.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_explicit_sources_fix_cell_value() {
        let mesh = FvMesh::rectangle(4, 1, 1.0, 1.0, 1.0).unwrap();
        let mut t = VolScalarField::new(
            "T",
            &mesh,
            0.0,
            vec![
                PatchCondition::FixedValue(0.0),
                PatchCondition::FixedValue(0.0),
                PatchCondition::ZeroGradient,
                PatchCondition::ZeroGradient,
            ],
        )
        .unwrap();
        let mut fixed_values = HashMap::new();
        fixed_values.insert("T".to_string(), vec![(0, 5.0)]);
        let mut sources = HashMap::new();
        sources.insert("T".to_string(), 2.0);
        let options = FvOptionsModel::Explicit(ExplicitSources {
            sources,
            fixed_values,
        });
        let gamma = SurfaceScalarField::uniform("gamma", &mesh, 1.0);
        let mut eqn = -fvm::laplacian(&gamma, &t, &mesh);
        eqn.equals_explicit(&mesh, &options.source("T", &mesh));
        options.constrain(&mut eqn, &mesh);
        eqn.solve(&mesh, &mut t, &SolverControls::default());
        assert_relative_eq!(t.internal[0], 5.0, epsilon = 1e-10);
        assert!(t.internal[1] < 5.0 && t.internal[1] > 0.0);
        assert!(options.source("Z", &mesh).iter().all(|&s| s == 0.0));

        let mut velocity_fix = HashMap::new();
        velocity_fix.insert("U.y".to_string(), vec![(2, -1.0)]);
        let options = ExplicitSources {
            sources: HashMap::new(),
            fixed_values: velocity_fix,
        };
        let mut u = VolVectorField::new("U", &mesh, Vector3::new(1.0, 1.0, 0.0), vec![PatchCondition::ZeroGradient; 4])
            .unwrap();
        options.correct_velocity(&mut u);
        assert_relative_eq!(u.internal[2].y, -1.0);
        assert_relative_eq!(u.internal[2].x, 1.0);
        assert_relative_eq!(u.internal[1].y, 1.0);
    }
}
