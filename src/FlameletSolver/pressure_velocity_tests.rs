#[cfg(test)]
mod tests {
    use crate::FiniteVolume::fields::{PatchCondition, SurfaceScalarField, VolScalarField};
    use crate::FiniteVolume::fvc;
    use crate::FlameletSolver::case_parser::CaseDescription;
    use crate::FlameletSolver::flamelet_driver::FlameletSolver;
    use crate::FlameletSolver::flamelet_fields::FvContext;
    use crate::FlameletSolver::flamelet_properties::PressureLimits;
    use crate::FlameletSolver::momentum_predictor::MomentumPredictor;
    use crate::FlameletSolver::pressure_velocity::{
        assemble_pressure_equation, compressibility_flux,
    };
    use approx::assert_relative_eq;
    use serde_json::json;

    fn flamelets_properties() -> serde_json::Value {
        json!({
            "monitoring": true,
            "Cg": 2.86, "Cd": 2.0, "Cx": 2.0, "sigmat": 0.85,
            "k_small": 1e-6, "epsilon_small": 1e-6, "Tenv": 300.0,
            "varianceEquation": false, "adiabaticMode": true, "radiationMode": false
        })
    }

    /// 4x4 box with no-slip walls, a swirling initial velocity and Euler time stepping
    fn closed_box(transonic: bool) -> FlameletSolver {
        let wall_u = json!({"FixedValue": [0.0, 0.0, 0.0]});
        let case = json!({
            "mesh": {"nx": 4, "ny": 4, "lx": 1.0, "ly": 1.0, "depth": 0.1},
            "fields": {
                "U": {"initial": [1.0, 0.5, 0.0], "boundary": {
                    "left": wall_u, "right": wall_u, "bottom": wall_u, "top": wall_u
                }},
                "p": {"initial": 1.0e5, "boundary": {
                    "left": "FixedFluxPressure", "right": "FixedFluxPressure",
                    "bottom": "FixedFluxPressure", "top": "FixedFluxPressure"
                }},
                "Z": {"initial": 0.3},
                "Zvar": {"initial": 0.0},
                "H": {"initial": 3.0e5}
            },
            "turbulence": {"mu": 1e-3, "mut": 1e-2, "k": 1.0, "epsilon": 1.0},
            "flameletsProperties": flamelets_properties(),
            "solutionControls": {
                "transonic": transonic,
                "ddtScheme": {"Euler": {"deltaT": 1e-3}},
                "pressureControl": {"pMin": 1.0e3, "pMax": 1.0e7}
            }
        });
        CaseDescription::from_json_str(&case.to_string())
            .unwrap()
            .build_solver()
            .unwrap()
    }

    /// 8x4 channel, fixed inlet velocity on the left and fixed pressure on the right
    fn steady_channel() -> FlameletSolver {
        let wall_u = json!({"FixedValue": [0.0, 0.0, 0.0]});
        let case = json!({
            "mesh": {"nx": 8, "ny": 4, "lx": 1.0, "ly": 0.2, "depth": 0.1},
            "fields": {
                "U": {"initial": [1.0, 0.0, 0.0], "boundary": {
                    "left": {"FixedValue": [1.0, 0.0, 0.0]}, "bottom": wall_u, "top": wall_u
                }},
                "p": {"initial": 1.0e5, "boundary": {
                    "right": {"FixedValue": 1.0e5},
                    "bottom": "FixedFluxPressure", "top": "FixedFluxPressure"
                }},
                "Z": {"initial": 0.0, "boundary": {"left": {"FixedValue": 1.0}}},
                "Zvar": {"initial": 0.0, "boundary": {"left": {"FixedValue": 0.0}}},
                "H": {"initial": 3.0e5, "boundary": {"left": {"FixedValue": 3.0e5}}}
            },
            "turbulence": {"mu": 1e-3, "mut": 1e-2, "k": 1.0, "epsilon": 1.0},
            "flameletsProperties": flamelets_properties(),
            "solutionControls": {
                "nCorrectors": 2,
                "nNonOrthogonalCorrectors": 1,
                "pressureControl": {"pMinFactor": 0.5, "pMaxFactor": 2.0}
            }
        });
        CaseDescription::from_json_str(&case.to_string())
            .unwrap()
            .build_solver()
            .unwrap()
    }

    #[test]
    fn test_closed_box_conserves_mass_incompressible() {
        let mut solver = closed_box(false);
        let summary = solver.run(1);
        assert_relative_eq!(summary.mass_ratio(), 1.0, max_relative = 1e-10);
        let errors = summary.iterations[0].continuity_errors[0];
        assert!(errors.sum_local < 1e-10);
        assert!(errors.global.abs() < 1e-10);
        // the swirl must actually have been corrected
        let (p_min, p_max) = solver.fields.p.min_max();
        assert!(p_max > p_min);
    }

    #[test]
    fn test_closed_box_conserves_mass_transonic() {
        let mut solver = closed_box(true);
        let summary = solver.run(1);
        assert_relative_eq!(summary.mass_ratio(), 1.0, max_relative = 1e-10);
        assert!(summary.iterations[0].continuity_errors[0].sum_local < 1e-10);
        assert!(!summary.iterations[0].pressure_limited);
    }

    #[test]
    fn test_closed_box_keeps_no_flux_through_walls() {
        let mut solver = closed_box(false);
        solver.run(2);
        for patch in &solver.fields.phi.boundary {
            for &flux in patch {
                assert_relative_eq!(flux, 0.0, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_steady_channel_flux_is_divergence_free() {
        let mut solver = steady_channel();
        solver.run(1);
        let mesh = &solver.mesh;
        let inlet = mesh.patch_index("left").unwrap();
        let inflow: f64 = solver.fields.phi.boundary[inlet].iter().map(|f| f.abs()).sum();
        assert!(inflow > 0.0);
        let div_phi = fvc::div(&solver.fields.phi, mesh);
        for (cell, div) in div_phi.iter().enumerate() {
            assert!(
                (div * mesh.cell_volumes[cell]).abs() < 1e-6 * inflow,
                "cell {} has div(phi) = {}",
                cell,
                div
            );
        }
        let outlet = mesh.patch_index("right").unwrap();
        let outflow: f64 = solver.fields.phi.boundary[outlet].iter().sum();
        assert_relative_eq!(outflow, inflow, max_relative = 1e-6);
    }

    #[test]
    fn test_zero_compressibility_transonic_matches_incompressible() {
        let mut solver = closed_box(true);
        solver.advance_time();
        let mesh = &solver.mesh;
        let fields = &solver.fields;
        let ctx = FvContext {
            mesh,
            controls: &solver.controls,
            fv_options: &solver.models.fv_options,
            mrf: &solver.models.mrf,
        };
        let psi = VolScalarField::uniform_calculated("psi", mesh, 0.0);
        let rho_f = fvc::interpolate(&fields.rho, mesh);
        let phi_hbya = fields.phi.clone();
        let rhor_auf = SurfaceScalarField::uniform("rhorAUf", mesh, 2e-3);
        let mass_source = vec![0.0; mesh.n_cells()];

        let phid = compressibility_flux(&psi, &rho_f, &phi_hbya, mesh);
        assert!(phid.internal.iter().all(|&f| f == 0.0));
        let transonic = assemble_pressure_equation(
            fields,
            &psi,
            &phi_hbya,
            &rhor_auf,
            Some(&phid),
            &mass_source,
            &ctx,
        );
        let incompressible = assemble_pressure_equation(
            fields,
            &psi,
            &phi_hbya,
            &rhor_auf,
            None,
            &mass_source,
            &ctx,
        );
        assert_eq!(transonic.diag, incompressible.diag);
        assert_eq!(transonic.upper, incompressible.upper);
        assert_eq!(transonic.lower, incompressible.lower);
        assert_eq!(transonic.source, incompressible.source);
        assert_eq!(transonic.internal_coeffs, incompressible.internal_coeffs);
        assert_eq!(transonic.boundary_coeffs, incompressible.boundary_coeffs);
    }

    #[test]
    fn test_pressure_limits_clip_bad_values() {
        let mesh = crate::FiniteVolume::fv_mesh::FvMesh::rectangle(5, 1, 1.0, 1.0, 1.0).unwrap();
        let mut p = VolScalarField::new("p", &mesh, 1.0e5, vec![PatchCondition::ZeroGradient; 4])
            .unwrap();
        p.internal = vec![-5.0, 1.0e30, f64::INFINITY, f64::NAN, 2.0e5];
        let limits = PressureLimits {
            p_min: 1.0e3,
            p_max: 1.0e6,
            rho_min: None,
            rho_max: None,
        };
        assert!(limits.limit(&mut p));
        assert_eq!(p.internal, vec![1.0e3, 1.0e6, 1.0e6, 1.0e3, 2.0e5]);
        assert!(!limits.limit(&mut p));
    }

    #[test]
    fn test_density_limits() {
        let mesh = crate::FiniteVolume::fv_mesh::FvMesh::rectangle(3, 1, 1.0, 1.0, 1.0).unwrap();
        let mut rho = VolScalarField::uniform_calculated("rho", &mesh, 1.0);
        rho.internal = vec![0.01, 1.0, 50.0];
        let limits = PressureLimits {
            p_min: 0.0,
            p_max: 1.0,
            rho_min: Some(0.1),
            rho_max: Some(10.0),
        };
        limits.limit_density(&mut rho);
        assert_eq!(rho.internal, vec![0.1, 1.0, 10.0]);
    }

    #[test]
    fn test_pressure_factors_use_fixed_boundary_value() {
        let solver = steady_channel();
        assert_relative_eq!(solver.pressure.limits.p_min, 0.5e5);
        assert_relative_eq!(solver.pressure.limits.p_max, 2.0e5);
    }

    #[test]
    fn test_cumulative_continuity_error_accumulates() {
        let mut solver = closed_box(false);
        let summary = solver.run(3);
        let sum: f64 = summary
            .iterations
            .iter()
            .flat_map(|report| report.continuity_errors.iter().map(|e| e.global))
            .sum();
        assert_relative_eq!(summary.cumulative_continuity_error, sum, epsilon = 1e-15);
        assert_relative_eq!(
            solver.pressure.cumulative_continuity_error(),
            summary.cumulative_continuity_error
        );
    }

    /// max |ddt(rho) + div(phi)| over the cells, Euler in time
    fn continuity_residual(solver: &FlameletSolver) -> f64 {
        let fields = &solver.fields;
        let rdt = solver.controls.ddt_scheme.rdelta_t();
        let rho_0 = fields.rho.old_time();
        let div_phi = fvc::div(&fields.phi, &solver.mesh);
        (0..solver.mesh.n_cells())
            .map(|c| ((fields.rho.internal[c] - rho_0.internal[c]) * rdt + div_phi[c]).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_second_correction_is_continuity_fixed_point() {
        for transonic in [false, true] {
            let mut solver = closed_box(transonic);
            solver.run(1);
            // rho/dt sets the scale of both terms
            let (_, rho_max) = solver.fields.rho.min_max();
            let tolerance = 1e-9 * rho_max * solver.controls.ddt_scheme.rdelta_t();
            assert!(continuity_residual(&solver) < tolerance);

            // same time level, predictor and corrector again on their own output
            for _ in 0..2 {
                let ctx = FvContext {
                    mesh: &solver.mesh,
                    controls: &solver.controls,
                    fv_options: &solver.models.fv_options,
                    mrf: &solver.models.mrf,
                };
                let momentum = MomentumPredictor::predict(
                    &mut solver.fields,
                    solver.models.turbulence.as_ref(),
                    &ctx,
                );
                let correction = solver.pressure.correct(
                    &mut solver.fields,
                    momentum,
                    solver.models.thermo.as_ref(),
                    &ctx,
                    true,
                );
                assert!(correction.momentum.is_none());
                assert!(!correction.pressure_limited);
                let residual = continuity_residual(&solver);
                assert!(
                    residual < tolerance,
                    "transonic = {}: continuity residual {} after a repeated correction",
                    transonic,
                    residual
                );
            }
        }
    }
}
