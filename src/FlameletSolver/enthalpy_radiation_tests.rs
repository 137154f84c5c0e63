#[cfg(test)]
mod tests {
    use crate::FiniteVolume::fields::{PatchCondition, VolScalarField, VolVectorField};
    use crate::FiniteVolume::fv_mesh::FvMesh;
    use crate::FiniteVolume::fvm::DdtScheme;
    use crate::FlameletSolver::enthalpy_radiation::{EnthalpySolver, RadiationState, SIGMA_SB};
    use crate::FlameletSolver::flamelet_fields::{FlameletFields, FvContext};
    use crate::FlameletSolver::flamelet_properties::{
        EnergyMode, FlameletProperties, SolutionControls,
    };
    use crate::PhysicalModels::frame_motion::FrameMotionModel;
    use crate::PhysicalModels::fv_options::FvOptionsModel;
    use crate::PhysicalModels::thermo_provider::{
        IdealGasFlameletThermo, IdealGasParameters, PropertyProvider,
    };
    use crate::PhysicalModels::turbulence_provider::{FrozenTurbulence, FrozenTurbulenceParameters};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    const CP: f64 = 1000.0;
    const ABSORPTION: f64 = 0.5;

    fn properties(adiabatic: bool, radiation: bool) -> FlameletProperties {
        FlameletProperties {
            adiabatic_mode: adiabatic,
            radiation_mode: radiation,
            Tenv: 300.0,
            ..FlameletProperties::default()
        }
    }

    /// Closed, quiescent 3x3 box at uniform enthalpy `h`
    fn quiescent_box(h: f64) -> (FvMesh, FlameletFields, IdealGasFlameletThermo) {
        let mesh = FvMesh::rectangle(3, 3, 1.0, 1.0, 0.1).unwrap();
        let zero_gradient = vec![PatchCondition::ZeroGradient; 4];
        let u = VolVectorField::new(
            "U",
            &mesh,
            Vector3::zeros(),
            vec![PatchCondition::FixedValue(Vector3::zeros()); 4],
        )
        .unwrap();
        let p = VolScalarField::new("p", &mesh, 1.0e5, zero_gradient.clone()).unwrap();
        let z = VolScalarField::new("Z", &mesh, 0.5, zero_gradient.clone()).unwrap();
        let zvar = VolScalarField::new("Zvar", &mesh, 0.0, zero_gradient.clone()).unwrap();
        let h = VolScalarField::new("H", &mesh, h, zero_gradient).unwrap();
        let parameters = IdealGasParameters {
            cp: CP,
            absorption: ABSORPTION,
            ..IdealGasParameters::default()
        };
        let thermo = IdealGasFlameletThermo::new(parameters, &mesh, &h, &z).unwrap();
        let fields = FlameletFields::new(&mesh, u, p, z, zvar, h, &thermo);
        (mesh, fields, thermo)
    }

    fn emission(t: f64) -> f64 {
        4.0 * SIGMA_SB * ABSORPTION * (t.powi(4) - 300.0_f64.powi(4))
    }

    #[test]
    fn test_radiation_state_transitions() {
        assert_eq!(RadiationState::from_mode(true), RadiationState::On);
        assert_eq!(RadiationState::from_mode(false), RadiationState::PendingOff);
        assert_eq!(RadiationState::On.advance(), RadiationState::On);
        assert_eq!(RadiationState::PendingOff.advance(), RadiationState::Off);
        assert_eq!(RadiationState::Off.advance(), RadiationState::Off);
        assert_eq!(properties(true, true).energy_mode(), EnergyMode::Adiabatic);
    }

    #[test]
    fn test_radiation_off_is_evaluated_once() {
        let (mesh, mut fields, mut thermo) = quiescent_box(1.2e6);
        let mut solver = EnthalpySolver::new(&properties(false, false));
        assert_eq!(
            solver.mode,
            EnergyMode::NonAdiabatic(RadiationState::PendingOff)
        );

        fields.Qrad.internal.iter_mut().for_each(|q| *q = 42.0);
        solver.update_radiation(&mut fields, &thermo);
        assert!(fields.Qrad.internal.iter().all(|&q| q == 0.0));
        assert_eq!(solver.mode, EnergyMode::NonAdiabatic(RadiationState::Off));

        // a new temperature is not picked up any more
        thermo.T.assign(&VolScalarField::uniform_calculated("T", &mesh, 2000.0));
        fields.Qrad.internal[4] = 7.0;
        solver.update_radiation(&mut fields, &thermo);
        assert_eq!(fields.Qrad.internal[4], 7.0);
        assert!(fields.Qrad.internal.iter().enumerate().all(|(c, &q)| c == 4 || q == 0.0));
        assert_eq!(solver.mode, EnergyMode::NonAdiabatic(RadiationState::Off));
    }

    #[test]
    fn test_radiation_on_follows_temperature() {
        let (mesh, mut fields, mut thermo) = quiescent_box(1.2e6);
        let mut solver = EnthalpySolver::new(&properties(false, true));
        solver.update_radiation(&mut fields, &thermo);
        assert_relative_eq!(fields.Qrad.internal[0], emission(1200.0), max_relative = 1e-12);

        thermo.T.assign(&VolScalarField::uniform_calculated("T", &mesh, 1500.0));
        solver.update_radiation(&mut fields, &thermo);
        assert_relative_eq!(fields.Qrad.internal[8], emission(1500.0), max_relative = 1e-12);
        assert_eq!(solver.mode, EnergyMode::NonAdiabatic(RadiationState::On));
    }

    #[test]
    fn test_radiative_loss_cools_gas() {
        let (mesh, mut fields, mut thermo) = quiescent_box(1.2e6);
        fields.store_old_time();
        thermo.store_old_time();
        let controls = SolutionControls {
            ddt_scheme: DdtScheme::Euler { delta_t: 1e-2 },
            ..SolutionControls::default()
        };
        let (mrf, fv_options) = (FrameMotionModel::default(), FvOptionsModel::default());
        let ctx = FvContext {
            mesh: &mesh,
            controls: &controls,
            fv_options: &fv_options,
            mrf: &mrf,
        };
        let turbulence = FrozenTurbulence::new(&FrozenTurbulenceParameters::default(), &mesh).unwrap();
        let mut solver = EnthalpySolver::new(&properties(false, true));
        let rho = fields.rho.internal[0];

        solver.correct(&mut fields, &mut thermo, &turbulence, &ctx);
        // uniform state: rho*(H - H0)/dt = -Qrad
        let expected = 1.2e6 - 1e-2 * emission(1200.0) / rho;
        for &h in &fields.H.internal {
            assert_relative_eq!(h, expected, max_relative = 1e-10);
        }
        assert_relative_eq!(thermo.temperature().internal[0], expected / CP, max_relative = 1e-10);
    }

    #[test]
    fn test_adiabatic_enthalpy_unchanged() {
        let (mesh, mut fields, mut thermo) = quiescent_box(1.2e6);
        let controls = SolutionControls {
            ddt_scheme: DdtScheme::Euler { delta_t: 1e-2 },
            ..SolutionControls::default()
        };
        let (mrf, fv_options) = (FrameMotionModel::default(), FvOptionsModel::default());
        let ctx = FvContext {
            mesh: &mesh,
            controls: &controls,
            fv_options: &fv_options,
            mrf: &mrf,
        };
        let turbulence = FrozenTurbulence::new(&FrozenTurbulenceParameters::default(), &mesh).unwrap();
        let mut solver = EnthalpySolver::new(&properties(true, true));
        assert_eq!(solver.mode, EnergyMode::Adiabatic);
        solver.correct(&mut fields, &mut thermo, &turbulence, &ctx);
        assert!(fields.Qrad.internal.iter().all(|&q| q == 0.0));
        for &h in &fields.H.internal {
            assert_relative_eq!(h, 1.2e6, max_relative = 1e-10);
        }
    }
}
