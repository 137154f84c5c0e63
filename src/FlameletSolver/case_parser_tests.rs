#[cfg(test)]
mod tests {
    use crate::FiniteVolume::fields::PatchCondition;
    use crate::FiniteVolume::fvm::DdtScheme;
    use crate::FiniteVolume::linear_solvers::{LinearSolverKind, SolverControls};
    use crate::FlameletSolver::case_parser::CaseDescription;
    use crate::FlameletSolver::flamelet_errors::FlameletError;
    use crate::FlameletSolver::flamelet_properties::{
        FlameletProperties, PressureControl, SolutionControls,
    };
    use crate::PhysicalModels::frame_motion::FrameMotionModel;
    use crate::PhysicalModels::fv_options::FvOptionsModel;
    use approx::assert_relative_eq;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn case_json() -> serde_json::Value {
        json!({
            "mesh": {"nx": 6, "ny": 2, "lx": 0.6, "ly": 0.2, "depth": 0.1},
            "fields": {
                "U": {"initial": [2.0, 0.0, 0.0], "boundary": {
                    "left": {"FixedValue": [2.0, 0.0, 0.0]},
                    "bottom": {"FixedValue": [0.0, 0.0, 0.0]},
                    "top": {"FixedValue": [0.0, 0.0, 0.0]}
                }},
                "p": {"initial": 101325.0, "boundary": {"right": {"FixedValue": 101325.0}}},
                "Z": {"initial": 0.0, "boundary": {"left": {"FixedValue": 1.0}}},
                "Zvar": {"initial": 0.0, "boundary": {"left": {"FixedValue": 0.0}}},
                "H": {"initial": 3.0e5, "boundary": {"left": {"FixedValue": 3.0e5}}}
            },
            "thermo": {"cp": 1100.0, "W_fuel": 16.04, "W_oxidiser": 28.85, "absorption": 0.2},
            "turbulence": {"mu": 1.8e-5, "mut": 1e-3, "k": 0.5, "epsilon": 5.0},
            "flameletsProperties": {
                "monitoring": false,
                "Cg": 2.86, "Cd": 2.0, "Cx": 2.0, "sigmat": 0.85,
                "k_small": 1e-6, "epsilon_small": 1e-6, "Tenv": 293.0,
                "varianceEquation": true, "adiabaticMode": false, "radiationMode": true
            },
            "solutionControls": {
                "nCorrectors": 2,
                "momentumPredictor": false,
                "ddtScheme": {"Euler": {"deltaT": 1e-4}},
                "pressureControl": {"pMinFactor": 0.8, "pMaxFactor": 1.2},
                "relaxationFactors": {"fields": {"p": 0.3}, "equations": {"U": 0.7}},
                "solvers": {
                    "p": {"solver": "GaussSeidel", "tolerance": 1e-6, "relTol": 0.05, "maxIter": 500},
                    "pFinal": {"solver": "Direct"}
                }
            },
            "frameMotion": {"Stationary": null},
            "fvOptions": {"Explicit": {"sources": {"H": -10.0}}},
            "iterations": 3
        })
    }

    #[test]
    fn test_parse_case() {
        let case = CaseDescription::from_json_str(&case_json().to_string()).unwrap();
        assert_eq!(case.mesh.nx, 6);
        assert_eq!(case.iterations, 3);
        assert_relative_eq!(case.thermo.cp, 1100.0);
        assert!(!case.thermo.dpdt);
        assert_relative_eq!(case.turbulence.mu_t, 1e-3);
        assert_relative_eq!(case.flamelets_properties.Tenv, 293.0);
        assert!(case.flamelets_properties.variance_equation);
        let controls = &case.solution_controls;
        assert_eq!(controls.n_correctors, 2);
        assert_eq!(controls.n_non_orth_correctors, 0);
        assert!(!controls.momentum_predictor);
        assert_eq!(controls.ddt_scheme, DdtScheme::Euler { delta_t: 1e-4 });
        assert_eq!(controls.field_relaxation_factor("p"), Some(0.3));
        assert_eq!(controls.equation_relaxation_factor("U"), Some(0.7));
        assert_eq!(controls.equation_relaxation_factor("p"), None);
        assert_eq!(case.frame_motion, FrameMotionModel::default());
        assert!(matches!(case.fv_options, FvOptionsModel::Explicit(_)));
        assert_eq!(
            case.fields.p.boundary.get("right"),
            Some(&PatchCondition::FixedValue(101325.0))
        );
    }

    #[test]
    fn test_final_solver_controls() {
        let case = CaseDescription::from_json_str(&case_json().to_string()).unwrap();
        let controls = &case.solution_controls;
        let p = controls.solver_controls("p", false);
        assert_eq!(p.solver, LinearSolverKind::GaussSeidel);
        assert_eq!(p.max_iter, 500);
        assert_relative_eq!(p.rel_tol, 0.05);
        assert_eq!(controls.solver_controls("p", true).solver, LinearSolverKind::Direct);
        // no HFinal entry: the regular one, then the default
        assert_eq!(controls.solver_controls("H", true), SolverControls::default());
    }

    #[test]
    fn test_case_file_round_trip() {
        let case = CaseDescription::from_json_str(&case_json().to_string()).unwrap();
        let file = NamedTempFile::new().unwrap();
        case.save(file.path()).unwrap();
        let reloaded = CaseDescription::from_file(file.path()).unwrap();
        assert_eq!(case, reloaded);
    }

    #[test]
    fn test_build_solver_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", case_json()).unwrap();
        let case = CaseDescription::from_file(file.path()).unwrap();
        let solver = case.build_solver().unwrap();
        assert_eq!(solver.mesh.n_cells(), 12);
        assert_relative_eq!(solver.pressure.limits.p_min, 0.8 * 101325.0, max_relative = 1e-12);
        assert_relative_eq!(solver.pressure.limits.p_max, 1.2 * 101325.0, max_relative = 1e-12);
        let left = solver.mesh.patch_index("left").unwrap();
        assert_eq!(
            solver.fields.Z.boundary[left].condition,
            PatchCondition::FixedValue(1.0)
        );
        let right = solver.mesh.patch_index("right").unwrap();
        assert_eq!(solver.fields.Z.boundary[right].condition, PatchCondition::ZeroGradient);
        assert!(solver.initial_mass() > 0.0);
    }

    #[test]
    fn test_missing_file() {
        let result = CaseDescription::from_file("/nonexistent/flamelet/case.json");
        assert!(matches!(result, Err(FlameletError::Io(_))));
    }

    #[test]
    fn test_malformed_case() {
        let mut case = case_json();
        case["flameletsProperties"]
            .as_object_mut()
            .unwrap()
            .remove("Cx");
        let result = CaseDescription::from_json_str(&case.to_string());
        assert!(matches!(result, Err(FlameletError::Json(_))));
    }

    #[test]
    fn test_unknown_patch_rejected() {
        let mut case = case_json();
        case["fields"]["Z"]["boundary"]["inlet"] = json!({"FixedValue": 1.0});
        let case = CaseDescription::from_json_str(&case.to_string()).unwrap();
        assert!(matches!(case.build_solver(), Err(FlameletError::MeshMismatch(_))));
    }

    #[test]
    fn test_validation_rejects_non_positive_floors() {
        for (key, value) in [
            ("k_small", 0.0),
            ("epsilon_small", -1e-6),
            ("sigmat", 0.0),
            ("Tenv", -1.0),
        ] {
            let mut case = case_json();
            case["flameletsProperties"][key] = json!(value);
            let result = CaseDescription::from_json_str(&case.to_string());
            assert!(
                matches!(result, Err(FlameletError::InvalidConfiguration(_))),
                "{} = {} accepted",
                key,
                value
            );
        }
    }

    #[test]
    fn test_validation_rejects_bad_controls() {
        let controls = SolutionControls {
            n_correctors: 0,
            ..SolutionControls::default()
        };
        assert!(controls.validate().is_err());
        let mut controls = SolutionControls::default();
        controls.relaxation_factors.fields.insert("p".to_string(), 1.5);
        assert!(controls.validate().is_err());
        let controls = SolutionControls {
            ddt_scheme: DdtScheme::Euler { delta_t: 0.0 },
            ..SolutionControls::default()
        };
        assert!(controls.validate().is_err());
    }

    #[test]
    fn test_pressure_control_needs_bounds() {
        let mut case = case_json();
        case["solutionControls"]["pressureControl"] = json!({"pMin": 1.0e3});
        let case = CaseDescription::from_json_str(&case.to_string()).unwrap();
        assert!(matches!(case.build_solver(), Err(FlameletError::MissingData(_))));
        let control = PressureControl {
            p_min: Some(2.0e5),
            p_max: Some(1.0e5),
            ..PressureControl::default()
        };
        let solver = CaseDescription::from_json_str(&case_json().to_string())
            .unwrap()
            .build_solver()
            .unwrap();
        assert!(control.resolve(&solver.fields.p).is_err());
    }

    #[test]
    fn test_properties_from_hashmap() {
        let mut map: HashMap<String, f64> = [
            ("Cg", 2.86),
            ("Cd", 2.0),
            ("Cx", 2.0),
            ("sigmat", 0.85),
            ("k_small", 1e-6),
            ("epsilon_small", 1e-6),
            ("Tenv", 300.0),
            ("varianceEquation", 0.0),
            ("adiabaticMode", 1.0),
            ("radiationMode", 0.0),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect();
        let properties = FlameletProperties::from_hashmap(&map).unwrap();
        assert!(!properties.monitoring);
        assert!(properties.adiabatic_mode);
        assert!(!properties.variance_equation);

        map.remove("Tenv");
        assert!(matches!(
            FlameletProperties::from_hashmap(&map),
            Err(FlameletError::MissingData(_))
        ));
    }

    #[test]
    fn test_fixed_cell_outside_mesh_rejected() {
        let mut case = case_json();
        case["fvOptions"] = json!({"Explicit": {"fixedValues": {"Z": [[99, 0.5]]}}});
        let case = CaseDescription::from_json_str(&case.to_string()).unwrap();
        assert!(matches!(case.build_solver(), Err(FlameletError::MeshMismatch(_))));

        let mut case = case_json();
        case["fvOptions"] = json!({"Explicit": {"fixedValues": {"U.x": [[11, 0.0]]}}});
        let mut solver = CaseDescription::from_json_str(&case.to_string())
            .unwrap()
            .build_solver()
            .unwrap();
        assert_eq!(solver.run(1).iterations.len(), 1);
        assert_relative_eq!(solver.fields.U.internal[11].x, 0.0);
    }

    #[test]
    fn test_fixed_pressure_outside_limits_rejected() {
        let mut case = case_json();
        case["solutionControls"]["pressureControl"] = json!({"pMin": 2.0e5, "pMax": 3.0e5});
        let case = CaseDescription::from_json_str(&case.to_string()).unwrap();
        assert!(matches!(
            case.build_solver(),
            Err(FlameletError::InvalidConfiguration(_))
        ));
    }
}
