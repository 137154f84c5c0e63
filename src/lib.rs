#[allow(non_snake_case)]
pub mod FiniteVolume;
#[allow(non_snake_case)]
pub mod FlameletSolver;
#[allow(non_snake_case)]
pub mod PhysicalModels;
pub mod cli;
