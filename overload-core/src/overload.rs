//! Overload run orchestration: configuration of one transformer, the
//! time-stepping loop over a load cycle and the run summary.

use crate::heat_balance::{aging_acceleration_factor, winding_thermal_capacity};
use crate::imports::*;
use crate::load_cycle::LoadCycle;
use crate::losses::Losses;
use crate::materials::*;
use crate::params::*;
use crate::stability::{test_stability, StabilityHistory, StabilitySnapshot};
use crate::temperatures::Temperatures;
use crate::thermal::ThermalIntegrator;

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Per-run replacements for the cooling-mode exponents; `None` keeps the
/// table value.
pub struct ExponentOverrides {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl ExponentOverrides {
    pub fn resolve(&self, defaults: CoolingExponents) -> CoolingExponents {
        CoolingExponents {
            x: self.x.unwrap_or(defaults.x),
            y: self.y.unwrap_or(defaults.y),
            z: self.z.unwrap_or(defaults.z),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    /// reporting interval, hours; defaults to the model's interval
    pub sample_interval_hours: Option<f64>,
    /// use the overexcited core loss
    pub with_core_overexcitation: bool,
    pub exponents: ExponentOverrides,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, HistoryVec, ApproxEq)]
/// One entry of a run's time series
pub struct SavedData {
    /// minutes since the start of the cycle
    pub time: f64,
    pub load_pu: f64,
    pub temperatures: Temperatures,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize, ApproxEq)]
/// Peak value of a temperature over a run
pub struct MaxTemp {
    /// °C
    pub temp: f64,
    /// minutes since the start of the cycle
    pub time: f64,
}

impl MaxTemp {
    fn new(temp: f64, time: f64) -> Self {
        Self { temp, time }
    }

    /// Replaces the peak if `temp` exceeds it
    fn update(&mut self, temp: f64, time: f64) {
        if temp > self.temp {
            *self = Self::new(temp, time);
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
/// Result of one completed overload run
pub struct RunSummary {
    /// every integration step, starting with the rated state at time 0
    pub history: SavedDataHistoryVec,
    pub max_hot_spot: MaxTemp,
    pub max_average_winding: MaxTemp,
    /// average fluid in the winding cooling ducts
    pub max_average_oil: MaxTemp,
    /// top fluid in the tank
    pub max_top_oil: MaxTemp,
    /// equivalent aging factor over the cycle
    pub aging_factor: f64,
    /// aging acceleration factor integrated over time, minutes
    pub aging_integral: f64,
    pub sample_interval_hours: f64,
    /// step size in force when the run finished, minutes
    pub final_delta_t: f64,
}

impl SerdeAPI for RunSummary {}

impl RunSummary {
    fn start(temps: &Temperatures, load_pu: f64, sample_interval_hours: f64, delta_t: f64) -> Self {
        let mut history = SavedDataHistoryVec::new();
        history.push(SavedData {
            time: 0.0,
            load_pu,
            temperatures: temps.clone(),
        });
        Self {
            history,
            max_hot_spot: MaxTemp::new(temps.hot_spot_winding_temperature, 0.0),
            max_average_winding: MaxTemp::new(temps.average_winding_temperature, 0.0),
            max_average_oil: MaxTemp::new(temps.average_fluid_temperature_in_cooling_ducts(), 0.0),
            max_top_oil: MaxTemp::new(temps.top_fluid_temperature_in_tank_and_rads, 0.0),
            aging_factor: aging_acceleration_factor(temps.hot_spot_winding_temperature),
            aging_integral: 0.0,
            sample_interval_hours,
            final_delta_t: delta_t,
        }
    }

    fn record(&mut self, time: f64, load_pu: f64, temps: &Temperatures, delta_t: f64) {
        self.aging_integral += aging_acceleration_factor(temps.hot_spot_winding_temperature) * delta_t;
        self.max_hot_spot.update(temps.hot_spot_winding_temperature, time);
        self.max_average_winding.update(temps.average_winding_temperature, time);
        self.max_average_oil.update(temps.average_fluid_temperature_in_cooling_ducts(), time);
        self.max_top_oil.update(temps.top_fluid_temperature_in_tank_and_rads, time);
        self.history.push(SavedData {
            time,
            load_pu,
            temperatures: temps.clone(),
        });
    }

    fn finish(&mut self, delta_t: f64) {
        let duration = self.duration_minutes();
        if duration > 0.0 {
            self.aging_factor = self.aging_integral / duration;
        }
        self.final_delta_t = delta_t;
    }

    /// Time of the last entry, minutes
    pub fn duration_minutes(&self) -> f64 {
        self.history.time.last().copied().unwrap_or_default()
    }

    /// Hours of insulation life consumed over the cycle at the reference hot-spot temperature
    pub fn equivalent_aging_hours(&self) -> f64 {
        self.aging_factor * self.duration_minutes() / MINUTES_PER_HOUR
    }

    /// Percent of `normal_life_hours` consumed over the cycle
    pub fn percent_loss_of_life(&self, normal_life_hours: f64) -> f64 {
        self.equivalent_aging_hours() * 100.0 / normal_life_hours
    }

    /// Entries at the reporting interval: the first entry, the first entry
    /// at or after each multiple of the interval, and the last entry.
    pub fn sampled(&self) -> Vec<SavedData> {
        let interval = self.sample_interval_hours * MINUTES_PER_HOUR;
        let last_idx = self.history.len().saturating_sub(1);
        let mut next_mark = 0.0;
        let mut samples = Vec::new();
        for (idx, &time) in self.history.time.iter().enumerate() {
            let due = interval <= 0.0 || time >= next_mark - TIME_EPSILON_MIN;
            if due || idx == last_idx {
                if let Some(entry) = self.history.get(idx) {
                    samples.push(entry);
                }
                if interval > 0.0 {
                    while next_mark <= time + TIME_EPSILON_MIN {
                        next_mark += interval;
                    }
                }
            }
        }
        samples
    }

    pub fn time_hours(&self) -> Array1<f64> {
        self.history.time.iter().map(|t| t / MINUTES_PER_HOUR).collect()
    }

    pub fn hot_spot_temperatures(&self) -> Array1<f64> {
        self.history
            .temperatures
            .iter()
            .map(|t| t.hot_spot_winding_temperature)
            .collect()
    }

    pub fn top_fluid_temperatures(&self) -> Array1<f64> {
        self.history
            .temperatures
            .iter()
            .map(|t| t.top_fluid_temperature_in_tank_and_rads)
            .collect()
    }
}

/// Splits an untanking (core and coil) weight into winding and core masses,
/// taking the winding heat capacity implied by its time constant (G.7,
/// G.22, G.23). Returns `(mass_of_windings, mass_of_core)` in lb.
///
/// # Arguments
/// * `core_and_coil_mass` - untanking weight, lb
/// * `rated_winding_loss` - winding resistive plus eddy loss at rating, W
/// * `rated_temperatures` - rated temperature set
/// * `winding_time_constant` - min
/// * `conductor_specific_heat` - W·min/(lb·°C)
pub fn split_core_and_coil_mass(
    core_and_coil_mass: f64,
    rated_winding_loss: f64,
    rated_temperatures: &Temperatures,
    winding_time_constant: f64,
    conductor_specific_heat: f64,
) -> anyhow::Result<(f64, f64)> {
    let capacity = winding_thermal_capacity(
        rated_winding_loss,
        winding_time_constant,
        rated_temperatures.average_winding_temperature,
        rated_temperatures.average_fluid_temperature_in_cooling_ducts(),
    );
    let mass_of_windings = capacity / conductor_specific_heat;
    ensure!(
        mass_of_windings.is_finite() && mass_of_windings > 0.0,
        "{}\nWinding mass must be positive, check rated temperatures and losses",
        format_dbg!(mass_of_windings)
    );
    ensure!(
        mass_of_windings < core_and_coil_mass,
        "{}\nWinding mass exceeds core and coil mass {core_and_coil_mass}",
        format_dbg!(mass_of_windings)
    );
    Ok((mass_of_windings, core_and_coil_mass - mass_of_windings))
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Validate)]
/// Thermal configuration of one transformer plus the state of its most
/// recent run
pub struct OverloadModel {
    #[serde(default)]
    pub name: String,
    /// kVA at which `rated_temperatures` were measured
    #[validate(range(min = 0))]
    pub kva_base_for_temperatures: f64,
    /// kVA at which `tested_losses` were measured
    #[validate(range(min = 0))]
    pub kva_base_for_losses: f64,
    /// kVA corresponding to a per-unit load of 1.0 in load cycles
    #[validate(range(min = 0))]
    pub kva_base_for_overload: f64,
    pub cooling_mode: CoolingMode,
    pub fluid: FluidKind,
    pub conductor: ConductorKind,
    #[validate]
    pub rated_temperatures: Temperatures,
    #[validate]
    pub tested_losses: Losses,
    /// lb
    #[validate(range(min = 0))]
    pub mass_of_core: f64,
    /// lb
    #[validate(range(min = 0))]
    pub mass_of_fluid: f64,
    /// lb
    #[validate(range(min = 0))]
    pub mass_of_tank: f64,
    /// lb
    #[validate(range(min = 0))]
    pub mass_of_windings: f64,
    /// min
    #[validate(range(min = 0))]
    pub winding_time_constant: f64,
    /// default reporting interval, hours
    #[validate(range(min = 0))]
    pub sample_interval_hours: f64,
    #[serde(default)]
    pub tables: MaterialTables,
    #[serde(skip)]
    pub last_run: Option<RunSummary>,
}

impl SerdeAPI for OverloadModel {
    fn init(&mut self) -> anyhow::Result<()> {
        match self.validate() {
            Ok(_) => (),
            Err(e) => bail!(e),
        };
        self.tested_losses.init()?;
        ensure!(
            self.kva_base_for_temperatures > 0.0
                && self.kva_base_for_losses > 0.0
                && self.kva_base_for_overload > 0.0,
            "kVA bases must be positive: temperatures {}, losses {}, overload {}",
            self.kva_base_for_temperatures,
            self.kva_base_for_losses,
            self.kva_base_for_overload
        );
        ensure!(
            self.conductor == self.tested_losses.conductor,
            "Model conductor {:?} differs from loss data conductor {:?}",
            self.conductor,
            self.tested_losses.conductor
        );
        ensure!(
            self.tested_losses.winding_resistive_loss > 0.0,
            "{}\nWinding resistive loss must be positive",
            format_dbg!(self.tested_losses.winding_resistive_loss)
        );
        ensure!(
            self.mass_of_windings > 0.0 && self.winding_time_constant > 0.0,
            "Winding mass ({}) and time constant ({}) must be positive",
            self.mass_of_windings,
            self.winding_time_constant
        );
        let rated = &self.rated_temperatures;
        ensure!(
            rated.average_winding_temperature > rated.average_fluid_temperature_in_cooling_ducts(),
            "Rated average winding temperature {} must exceed rated average duct fluid temperature {}",
            rated.average_winding_temperature,
            rated.average_fluid_temperature_in_cooling_ducts()
        );
        ensure!(
            rated.hot_spot_winding_temperature > rated.hot_spot_fluid_temperature(),
            "Rated hot-spot temperature {} must exceed the fluid temperature next to it {}",
            rated.hot_spot_winding_temperature,
            rated.hot_spot_fluid_temperature()
        );
        ensure!(
            rated.average_fluid_temperature_in_tank_and_rads() > rated.ambient_temperature,
            "Rated average tank fluid temperature {} must exceed rated ambient {}",
            rated.average_fluid_temperature_in_tank_and_rads(),
            rated.ambient_temperature
        );
        ensure!(
            self.fluid_thermal_capacity() > 0.0,
            "Tank, core and fluid masses cannot all be zero"
        );
        Ok(())
    }
}

impl OverloadModel {
    /// The 52 267 kVA ONAF transformer of the C57.91 Annex G worked example
    pub fn c57_91_example() -> anyhow::Result<Self> {
        let tables = MaterialTables::default();
        let rated_temperatures = Temperatures::from_rises(30.0, 65.0, 63.0, 80.0, 55.0, 25.0);
        let tested_losses = Losses::new(
            ConductorKind::Copper,
            75.0,
            36_986.0,
            36_986.0,
            51_690.0,
            0.0,
            0.0,
            21_078.0,
        );
        let kva_base_for_overload = 52_267.0;
        let kva_base_for_losses = 28_000.0;
        let winding_time_constant = 5.0;
        let rated_winding_loss = tested_losses
            .losses_at_load_factor(kva_base_for_overload / kva_base_for_losses)
            .winding_loss();
        let (mass_of_windings, mass_of_core) = split_core_and_coil_mass(
            75_600.0,
            rated_winding_loss,
            &rated_temperatures,
            winding_time_constant,
            tables.copper.specific_heat,
        )?;
        let mut model = Self {
            name: "C57.91 Annex G example".into(),
            kva_base_for_temperatures: kva_base_for_overload,
            kva_base_for_losses,
            kva_base_for_overload,
            cooling_mode: CoolingMode::Onaf,
            fluid: FluidKind::MineralOil,
            conductor: ConductorKind::Copper,
            rated_temperatures,
            tested_losses,
            mass_of_core,
            mass_of_fluid: 4_910.0,
            mass_of_tank: 31_400.0,
            mass_of_windings,
            winding_time_constant,
            sample_interval_hours: 0.5,
            tables,
            last_run: None,
        };
        model.init()?;
        Ok(model)
    }

    /// Ratio converting a per-unit overload to a per-unit of the loss-test kVA
    pub fn loss_load_ratio(&self) -> f64 {
        self.kva_base_for_overload / self.kva_base_for_losses
    }

    /// Losses at a per-unit overload of 1.0, at the loss reference temperature
    pub fn rated_losses(&self) -> Losses {
        self.tested_losses.losses_at_load_factor(self.loss_load_ratio())
    }

    /// Winding mass times conductor specific heat, W·min/°C
    pub fn winding_thermal_capacity(&self) -> f64 {
        self.mass_of_windings * self.tables.conductor(self.conductor).specific_heat
    }

    /// Tank, core and fluid mass times specific heat, W·min/°C
    pub fn fluid_thermal_capacity(&self) -> f64 {
        (self.mass_of_tank + self.mass_of_core) * self.tables.steel_specific_heat
            + self.mass_of_fluid * self.tables.fluid(self.fluid).specific_heat
    }

    /// Runs the model over `cycle` without touching the stored run state.
    /// Returns `None` if the cycle is rejected.
    pub fn run(&self, cycle: &LoadCycle, options: &RunOptions) -> Option<RunSummary> {
        if let Err(reason) = cycle.validate() {
            log::warn!("{}: load cycle {:?} rejected: {reason}", self.name, cycle.name);
            return None;
        }
        let first_load = cycle.points.first()?.load_pu;
        let sample_interval_hours = options
            .sample_interval_hours
            .unwrap_or(self.sample_interval_hours);
        let exponents = options.exponents.resolve(self.tables.exponents(self.cooling_mode));
        let integrator = ThermalIntegrator::new(self, exponents, options.with_core_overexcitation);
        let fluid = self.tables.fluid(self.fluid);
        let reference = StabilitySnapshot::from_temperatures(&self.rated_temperatures, fluid);

        let mut delta_t = INITIAL_DELTA_T_MIN;
        let (stable, max_delta_t) = test_stability(
            StabilityHistory::Initial,
            self.cooling_mode,
            self.winding_time_constant,
            delta_t,
        );
        if !stable {
            delta_t = max_delta_t.max(MIN_DELTA_T_MIN);
        }

        let mut temps = self.rated_temperatures.clone();
        let mut summary = RunSummary::start(&temps, first_load, sample_interval_hours, delta_t);
        let mut time = 0.0;
        for segment in cycle.segments() {
            while segment.end_minutes - time > TIME_EPSILON_MIN {
                let remaining = segment.end_minutes - time;
                let next_time = if remaining - delta_t <= TIME_EPSILON_MIN {
                    segment.end_minutes
                } else {
                    time + delta_t
                };
                let step = next_time - time;
                temps = integrator.advance(&temps, &segment, next_time, step).temperatures;
                summary.record(next_time, segment.load_at(next_time), &temps, step);

                let present = StabilitySnapshot::from_temperatures(&temps, fluid);
                let (stable, max_delta_t) = test_stability(
                    StabilityHistory::Observed { reference, present },
                    self.cooling_mode,
                    self.winding_time_constant,
                    delta_t,
                );
                let adopted = max_delta_t.max(MIN_DELTA_T_MIN);
                if !stable && adopted < delta_t {
                    log::debug!(
                        "time step reduced from {delta_t:.4} to {adopted:.4} min at {next_time:.2} min"
                    );
                    delta_t = adopted;
                }
                time = next_time;
            }
        }
        summary.finish(delta_t);
        log::info!(
            "{}: peak hot spot {:.1} °C at {:.2} h, aging factor {:.4}",
            self.name,
            summary.max_hot_spot.temp,
            summary.max_hot_spot.time / MINUTES_PER_HOUR,
            summary.aging_factor
        );
        Some(summary)
    }

    /// Runs the model over `cycle` and keeps the summary as the model's most
    /// recent run. A rejected cycle leaves the previous run untouched.
    pub fn do_overload_calculations(
        &mut self,
        cycle: &LoadCycle,
        options: &RunOptions,
    ) -> Option<&RunSummary> {
        let summary = self.run(cycle, options)?;
        self.last_run = Some(summary);
        self.last_run.as_ref()
    }
}
