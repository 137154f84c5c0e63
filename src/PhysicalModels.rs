//! # Physical Models
//!
//! Collaborators consumed by the flamelet solver core through trait contracts:
//!
//! | Trait | Reference implementation | Provides |
//! |-------|--------------------------|----------|
//! | [`thermo_provider::PropertyProvider`] | `IdealGasFlameletThermo` | rho = psi*p, psi, T, absorption coefficient |
//! | [`turbulence_provider::TurbulenceModel`] | `FrozenTurbulence` | muEff, mut, k, epsilon |
//! | [`frame_motion::FrameMotion`] | `NoFrameMotion`, `SolidBodyRotation` | relative face fluxes |
//! | [`fv_options::FvOptions`] | `NoFvOptions`, `ExplicitSources` | explicit sources, fixed cell values |
//!
//! The reference implementations are deliberately simple; the solver only relies on the
//! trait methods, so a flamelet table lookup or a transported turbulence model can be
//! plugged in without touching the stages.
//!
//! ## Ideal gas flamelet stand-in
//! ```text
//! T   = H/cp
//! 1/W = Z/W_fuel + (1 - Z)/W_oxidiser
//! psi = W/(R*T)
//! rho = psi*p
//! ```

pub mod frame_motion;
pub mod fv_options;
pub mod thermo_provider;
pub mod turbulence_provider;
mod physical_models_tests;
