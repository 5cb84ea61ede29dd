//! Explicit-integration stability bound on the time step (G.27).

use crate::heat_balance::SurfaceGradient;
use crate::materials::{CoolingMode, FluidProperties};
use crate::params::*;
use crate::temperatures::Temperatures;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
/// A quantity at the winding-average and at the hot-spot location
pub struct ThermalPair {
    pub average: f64,
    pub hot_spot: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
/// Winding temperatures, adjacent fluid temperatures and film viscosities
/// at one instant
pub struct StabilitySnapshot {
    pub winding: ThermalPair,
    pub fluid: ThermalPair,
    pub viscosity: ThermalPair,
}

impl StabilitySnapshot {
    pub fn from_temperatures(temps: &Temperatures, fluid: &FluidProperties) -> Self {
        let winding = ThermalPair {
            average: temps.average_winding_temperature,
            hot_spot: temps.hot_spot_winding_temperature,
        };
        let fluid_temps = ThermalPair {
            average: temps.average_fluid_temperature_in_cooling_ducts(),
            hot_spot: temps.hot_spot_fluid_temperature(),
        };
        Self {
            winding,
            fluid: fluid_temps,
            viscosity: ThermalPair {
                average: fluid.viscosity((winding.average + fluid_temps.average) / 2.0),
                hot_spot: fluid.viscosity((winding.hot_spot + fluid_temps.hot_spot) / 2.0),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StabilityHistory {
    /// first call of a run, before any step has been taken
    Initial,
    /// `present` state compared against the `reference` (rated) state
    Observed {
        reference: StabilitySnapshot,
        present: StabilitySnapshot,
    },
}

fn surface(reference: &StabilitySnapshot, present: &StabilitySnapshot, hot_spot: bool) -> SurfaceGradient {
    let pick = |pair: &ThermalPair| if hot_spot { pair.hot_spot } else { pair.average };
    SurfaceGradient {
        gradient: pick(&present.winding) - pick(&present.fluid),
        rated_gradient: pick(&reference.winding) - pick(&reference.fluid),
        viscosity: pick(&present.viscosity),
        rated_viscosity: pick(&reference.viscosity),
    }
}

/// Largest stable step at one location: the winding time constant divided
/// by the sensitivity of its heat loss to its own temperature.
fn location_bound(surface: &SurfaceGradient, winding_tau: f64) -> f64 {
    let sensitivity = CONVECTION_EXPONENT
        * surface.gradient_ratio().powf(CONVECTION_EXPONENT - 1.0)
        * surface.viscosity_ratio().powf(VISCOSITY_EXPONENT);
    if sensitivity > 0.0 && sensitivity.is_finite() {
        winding_tau / sensitivity
    } else {
        winding_tau
    }
}

/// Checks `proposed_delta_t` against the explicit-integration stability bound.
///
/// Returns `(stable, max_allowed_delta_t)`. The first call of a run uses the
/// simplified bound `winding_tau / 9`. Later calls bound the step by the
/// winding and hot-spot heat-loss sensitivities at the present state; with
/// directed oil flow the bound is the winding time constant itself.
pub fn test_stability(
    history: StabilityHistory,
    cooling: CoolingMode,
    winding_tau: f64,
    proposed_delta_t: f64,
) -> (bool, f64) {
    let max_allowed = match history {
        StabilityHistory::Initial => winding_tau / INITIAL_STABILITY_DIVISOR,
        StabilityHistory::Observed { .. } if cooling.is_directed_flow() => winding_tau,
        StabilityHistory::Observed { reference, present } => {
            let average = location_bound(&surface(&reference, &present, false), winding_tau);
            let hot_spot = location_bound(&surface(&reference, &present, true), winding_tau);
            average.min(hot_spot)
        }
    };
    (proposed_delta_t <= max_allowed, max_allowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::MaterialTables;
    use approx::assert_relative_eq;

    fn rated() -> Temperatures {
        Temperatures::from_rises(30.0, 65.0, 63.0, 80.0, 55.0, 25.0)
    }

    #[test]
    fn test_initial_bound() {
        let (stable, max_dt) = test_stability(StabilityHistory::Initial, CoolingMode::Onaf, 5.0, 0.5);
        assert!(stable);
        assert_relative_eq!(max_dt, 5.0 / 9.0);
        let (stable, max_dt) = test_stability(StabilityHistory::Initial, CoolingMode::Onaf, 1.0, 0.5);
        assert!(!stable);
        assert!(max_dt < 0.5);
    }

    #[test]
    fn test_bound_at_rated_state() {
        let fluid = MaterialTables::default().mineral_oil;
        let snap = StabilitySnapshot::from_temperatures(&rated(), &fluid);
        let history = StabilityHistory::Observed {
            reference: snap,
            present: snap,
        };
        let (stable, max_dt) = test_stability(history, CoolingMode::Onan, 5.0, 0.5);
        assert!(stable);
        assert_relative_eq!(max_dt, 4.0, epsilon = 1e-12);
        let (_, odaf_dt) = test_stability(history, CoolingMode::Odaf, 5.0, 0.5);
        assert_eq!(odaf_dt, 5.0);
    }

    #[test]
    fn test_hotter_state_tightens_bound() {
        let fluid = MaterialTables::default().mineral_oil;
        let reference = StabilitySnapshot::from_temperatures(&rated(), &fluid);
        let mut hot = rated();
        hot.average_winding_temperature += 30.0;
        hot.hot_spot_winding_temperature += 40.0;
        let present = StabilitySnapshot::from_temperatures(&hot, &fluid);
        let (_, max_dt) = test_stability(
            StabilityHistory::Observed { reference, present },
            CoolingMode::Onaf,
            5.0,
            0.5,
        );
        assert!(max_dt < 4.0);
        assert!(max_dt > 0.5);
    }

    #[test]
    fn test_no_gradient_falls_back_to_time_constant() {
        let fluid = MaterialTables::default().mineral_oil;
        let reference = StabilitySnapshot::from_temperatures(&rated(), &fluid);
        let mut cold = rated();
        cold.average_winding_temperature = cold.average_fluid_temperature_in_cooling_ducts();
        cold.hot_spot_winding_temperature = cold.hot_spot_fluid_temperature();
        let present = StabilitySnapshot::from_temperatures(&cold, &fluid);
        let (stable, max_dt) = test_stability(
            StabilityHistory::Observed { reference, present },
            CoolingMode::Onan,
            5.0,
            0.5,
        );
        assert!(stable);
        assert_eq!(max_dt, 5.0);
    }
}
