//! # Flamelet Solver Core
//!
//! Per outer iteration the solver advances a compressible turbulent flow with a
//! flamelet/progress-variable closure:
//!
//! ```text
//! momentum predictor -> pressure correctors (U, p, rho, phi) -> continuity errors
//!     -> Z, Zvar, chi_st -> H, Qrad, T
//! ```
//!
//! Every stage receives the shared [`flamelet_fields::FlameletFields`] by `&mut` for the
//! duration of its call and reads the collaborators through a
//! [`flamelet_fields::FvContext`].
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`flamelet_properties`] | `flameletsProperties` dictionary, solution controls, pressure limits |
//! | [`flamelet_fields`] | simulation state and the per-iteration context |
//! | [`momentum_predictor`] | UEqn assembly and the `A`/`H` operator |
//! | [`pressure_velocity`] | pressure corrector: transonic or incompressible, non-orthogonal passes |
//! | [`mixture_fraction`] | Z transport, variance closure (transport or algebraic), chi_st |
//! | [`enthalpy_radiation`] | H transport, grey-body radiation with a one-shot switch-off |
//! | [`flamelet_driver`] | outer iteration, time levels, monitoring |
//! | [`flamelet_output`] | prettytable summaries |
//! | [`case_parser`] | JSON case files |
//! | [`flamelet_errors`] | setup errors |
//!
//! ## Configuration branches
//! - `transonic`: [`flamelet_properties::PressureFormulation`]
//! - `varianceEquation`: [`mixture_fraction::VarianceModel`]
//! - `adiabaticMode`, `radiationMode`: [`flamelet_properties::EnergyMode`]
//!
//! ## Example
//! ```rust, ignore
//! use FlameletCore::FlameletSolver::case_parser::CaseDescription;
//! let case = CaseDescription::from_file("case.json")?;
//! let mut solver = case.build_solver()?;
//! solver.pretty_print_case();
//! let summary = solver.run(case.iterations);
//! summary.pretty_print();
//! ```

pub mod case_parser;
pub mod enthalpy_radiation;
pub mod flamelet_driver;
pub mod flamelet_errors;
pub mod flamelet_fields;
pub mod flamelet_output;
pub mod flamelet_properties;
pub mod mixture_fraction;
pub mod momentum_predictor;
pub mod pressure_velocity;

mod case_parser_tests;
mod enthalpy_radiation_tests;
mod pressure_velocity_tests;
