//! Fixed-width text report of a run summary.
use overload_core::prelude::*;
use std::fmt::Write;

const HEADER: [&str; 7] = ["Time", "Load", "Ambient", "Hot Spot", "Top Oil", "Top Duct", "Bottom Oil"];
const UNITS: [&str; 7] = ["(h)", "(pu)", "(C)", "(C)", "(C)", "(C)", "(C)"];

fn peak_line(label: &str, peak: &MaxTemp) -> String {
    format!(
        "{label:<28}{:>8.1} C at {:>6.2} h\n",
        peak.temp,
        peak.time / 60.0
    )
}

/// Renders the sampled time series and the peak and aging figures
pub fn format_report(summary: &RunSummary, normal_life_hours: f64) -> String {
    let mut out = String::new();
    for row in [HEADER, UNITS] {
        for cell in row {
            let _ = write!(out, "{cell:>11}");
        }
        out.push('\n');
    }
    for sample in summary.sampled() {
        let t = &sample.temperatures;
        let _ = writeln!(
            out,
            "{:>11.2}{:>11.3}{:>11.1}{:>11.1}{:>11.1}{:>11.1}{:>11.1}",
            sample.time / 60.0,
            sample.load_pu,
            t.ambient_temperature,
            t.hot_spot_winding_temperature,
            t.top_fluid_temperature_in_tank_and_rads,
            t.top_fluid_temperature_in_cooling_ducts,
            t.bottom_fluid_temperature,
        );
    }
    out.push('\n');
    out.push_str(&peak_line("Maximum hot spot", &summary.max_hot_spot));
    out.push_str(&peak_line("Maximum average winding", &summary.max_average_winding));
    out.push_str(&peak_line("Maximum average duct oil", &summary.max_average_oil));
    out.push_str(&peak_line("Maximum top oil", &summary.max_top_oil));
    let _ = writeln!(out, "{:<28}{:>8.4}", "Equivalent aging factor", summary.aging_factor);
    let _ = writeln!(
        out,
        "{:<28}{:>8.4} %",
        "Loss of life",
        summary.percent_loss_of_life(normal_life_hours)
    );
    out
}
