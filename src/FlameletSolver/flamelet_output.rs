//! # Tabular output of the flamelet solver
//!
//! Case summary, field ranges and run summary printed with prettytable.

use super::flamelet_driver::{FlameletSolver, RunSummary};
use super::flamelet_fields::FlameletFields;
use prettytable::{Table, row};

/// (name, min, max) of the fields reported by monitoring
pub fn field_ranges(fields: &FlameletFields) -> Vec<(String, f64, f64)> {
    [
        &fields.p,
        &fields.rho,
        &fields.Z,
        &fields.Zvar,
        &fields.chi_st,
        &fields.H,
        &fields.Qrad,
    ]
    .iter()
    .map(|field| {
        let (min, max) = field.min_max();
        (field.name.clone(), min, max)
    })
    .collect()
}

impl FlameletSolver {
    /// Min/max of the solved fields and the gas temperature
    pub fn print_field_ranges(&self) {
        let mut table = Table::new();
        table.add_row(row!["Field", "Min", "Max"]);
        for (name, min, max) in field_ranges(&self.fields) {
            table.add_row(row![name, format!("{:.6e}", min), format!("{:.6e}", max)]);
        }
        let (t_min, t_max) = self.models.thermo.temperature().min_max();
        table.add_row(row!["T", format!("{:.6e}", t_min), format!("{:.6e}", t_max)]);
        table.printstd();
    }

    /// Resolved configuration of the case
    pub fn pretty_print_case(&self) {
        println!("\n=== FLAMELET CASE SUMMARY ===");
        let mut mesh_table = Table::new();
        mesh_table.add_row(row!["Parameter", "Value"]);
        mesh_table.add_row(row!["Cells", self.mesh.n_cells()]);
        mesh_table.add_row(row!["Internal faces", self.mesh.n_internal_faces()]);
        let patches: Vec<&str> = self.mesh.patches.iter().map(|p| p.name.as_str()).collect();
        mesh_table.add_row(row!["Patches", patches.join(", ")]);
        mesh_table.add_row(row!["Volume, m3", format!("{:.6e}", self.mesh.total_volume())]);
        mesh_table.printstd();

        println!("\nModels:");
        let mut model_table = Table::new();
        model_table.add_row(row!["Model", "Selection"]);
        model_table.add_row(row!["Pressure", format!("{:?}", self.pressure.formulation)]);
        model_table.add_row(row!["Variance", format!("{:?}", self.mixture.variance)]);
        model_table.add_row(row!["Energy", format!("{:?}", self.enthalpy.mode)]);
        model_table.add_row(row!["Time", format!("{:?}", self.controls.ddt_scheme)]);
        model_table.add_row(row!["Frame", format!("{:?}", self.models.mrf)]);
        model_table.printstd();

        println!("\nFlamelet constants:");
        let p = &self.properties;
        let mut constants = Table::new();
        constants.add_row(row!["Constant", "Value"]);
        constants.add_row(row!["Cg", p.Cg]);
        constants.add_row(row!["Cd", p.Cd]);
        constants.add_row(row!["Cx", p.Cx]);
        constants.add_row(row!["sigmat", p.sigmat]);
        constants.add_row(row!["k_small", p.k_small]);
        constants.add_row(row!["epsilon_small", p.epsilon_small]);
        constants.add_row(row!["Tenv, K", p.Tenv]);
        constants.printstd();

        println!("\nPressure limits:");
        let limits = &self.pressure.limits;
        let mut limit_table = Table::new();
        limit_table.add_row(row!["Limit", "Value"]);
        limit_table.add_row(row!["pMin, Pa", limits.p_min]);
        limit_table.add_row(row!["pMax, Pa", limits.p_max]);
        if let Some(rho_min) = limits.rho_min {
            limit_table.add_row(row!["rhoMin, kg/m3", rho_min]);
        }
        if let Some(rho_max) = limits.rho_max {
            limit_table.add_row(row!["rhoMax, kg/m3", rho_max]);
        }
        limit_table.printstd();
    }
}

impl RunSummary {
    pub fn pretty_print(&self) {
        println!("\n=== RUN SUMMARY ===");
        let mut table = Table::new();
        table.add_row(row![
            "Iteration",
            "Sum local",
            "Global",
            "Z residual",
            "H residual",
            "Mass ratio",
            "p limited"
        ]);
        for report in &self.iterations {
            let (sum_local, global) = report
                .continuity_errors
                .last()
                .map(|e| (e.sum_local, e.global))
                .unwrap_or((0.0, 0.0));
            table.add_row(row![
                report.iteration,
                format!("{:.3e}", sum_local),
                format!("{:.3e}", global),
                format!("{:.3e}", report.mixture_fraction.z.initial_residual),
                format!("{:.3e}", report.enthalpy.initial_residual),
                format!("{:.8}", report.mass_ratio),
                report.pressure_limited
            ]);
        }
        table.printstd();
        println!(
            "mass {:.6e} -> {:.6e} kg, cumulative continuity error {:.3e}",
            self.initial_mass, self.final_mass, self.cumulative_continuity_error
        );
    }
}
