use clap::Parser;

extern crate overload_core;
use overload_core::params::NORMAL_INSULATION_LIFE_HOURS;
use overload_core::prelude::*;

mod report;

/// Transformer overload thermal simulation per IEEE C57.91 Annex G.
/// After running `cargo build --release`, run with
/// ```bash
/// ./target/release/overload-cli --model-file overload-core/resources/models/c57_91_example.yaml --cycle-file overload-core/resources/cycles/c57_91_daily.csv
/// ```
/// Without `--model-file` or `--cycle-file` the built-in worked example is used.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct OverloadApi {
    #[clap(long, value_parser)]
    /// Path to model file (yaml or json)
    model_file: Option<String>,
    #[clap(long, value_parser)]
    /// Path to load cycle file (csv, yaml or json)
    cycle_file: Option<String>,
    #[clap(long, value_parser)]
    /// Reporting interval in hours, defaults to the model's interval
    sample_interval: Option<f64>,
    #[clap(long, action)]
    /// Use the overexcited core loss
    overexcitation: bool,
    #[clap(long, value_parser)]
    /// Override of the duct fluid rise exponent
    x_exponent: Option<f64>,
    #[clap(long, value_parser)]
    /// Override of the average fluid rise exponent
    y_exponent: Option<f64>,
    #[clap(long, value_parser)]
    /// Override of the tank fluid gradient exponent
    z_exponent: Option<f64>,
    #[clap(long, value_parser)]
    /// How to return results: `table` (default), `json` or `yaml`
    res_fmt: Option<String>,
}

pub fn main() -> anyhow::Result<()> {
    let api = OverloadApi::parse();

    let mut model = match &api.model_file {
        Some(path) => OverloadModel::from_file(path)?,
        None => OverloadModel::c57_91_example()?,
    };
    let cycle = match &api.cycle_file {
        Some(path) if path.to_lowercase().ends_with(".csv") => LoadCycle::from_csv_file(path)?,
        Some(path) => LoadCycle::from_file(path)?,
        None => LoadCycle::c57_91_daily(),
    };
    if let Err(reason) = cycle.validate() {
        anyhow::bail!("Load cycle {:?} rejected: {reason}", cycle.name);
    }

    let options = RunOptions {
        sample_interval_hours: api.sample_interval,
        with_core_overexcitation: api.overexcitation,
        exponents: ExponentOverrides {
            x: api.x_exponent,
            y: api.y_exponent,
            z: api.z_exponent,
        },
    };
    let summary = model
        .do_overload_calculations(&cycle, &options)
        .ok_or_else(|| anyhow::anyhow!("Load cycle {:?} rejected", cycle.name))?;

    match api.res_fmt.as_deref().unwrap_or("table") {
        "table" => print!(
            "{}",
            report::format_report(summary, NORMAL_INSULATION_LIFE_HOURS)
        ),
        "json" => println!("{}", summary.to_json()?),
        "yaml" => print!("{}", summary.to_yaml()?),
        other => anyhow::bail!("Unsupported result format {other:?}, must be one of table, json, yaml"),
    }
    Ok(())
}
