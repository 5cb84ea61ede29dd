//! Heat-balance correlations of IEEE C57.91 Annex G.
//!
//! Every function here is pure. Heats are in watt-minutes, losses in watts,
//! temperatures in °C and time steps in minutes.

use crate::losses::Losses;
use crate::materials::CoolingMode;
use crate::params::*;

/// Winding hottest-spot temperature from its components (G.1)
pub fn hot_spot_temperature(ambient: f64, top_fluid_rise: f64, hot_spot_over_top_fluid: f64) -> f64 {
    ambient + top_fluid_rise + hot_spot_over_top_fluid
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Conductor-to-fluid gradient at one location together with its rated
/// counterpart and the fluid viscosities that govern the film coefficient.
pub struct SurfaceGradient {
    pub gradient: f64,
    pub rated_gradient: f64,
    pub viscosity: f64,
    pub rated_viscosity: f64,
}

impl SurfaceGradient {
    /// Present gradient over rated gradient, never negative
    pub fn gradient_ratio(&self) -> f64 {
        (self.gradient / self.rated_gradient).max(0.0)
    }

    /// Rated viscosity over present viscosity
    pub fn viscosity_ratio(&self) -> f64 {
        self.rated_viscosity / self.viscosity
    }

    /// Heat transferred now as a fraction of the rated heat transfer.
    /// Zero when the conductor is not hotter than the fluid.
    pub fn heat_transfer_ratio(&self, cooling: CoolingMode) -> f64 {
        if self.gradient <= 0.0 {
            return 0.0;
        }
        if cooling.is_directed_flow() {
            self.gradient_ratio()
        } else {
            self.gradient_ratio().powf(CONVECTION_EXPONENT)
                * self.viscosity_ratio().powf(VISCOSITY_EXPONENT)
        }
    }
}

/// Heat carried from a conductor into the fluid over `delta_t` (G.6, G.16)
///
/// # Arguments
/// * `cooling` - cooling mode, selects the directed-flow form
/// * `surface` - present and rated gradients and viscosities
/// * `rated_loss` - conductor loss at rated load and temperature, W
/// * `delta_t` - time step, min
pub fn convective_heat_lost(
    cooling: CoolingMode,
    surface: &SurfaceGradient,
    rated_loss: f64,
    delta_t: f64,
) -> f64 {
    surface.heat_transfer_ratio(cooling) * rated_loss * delta_t
}

/// Conductor temperature after a step (G.8, G.17)
pub fn winding_temperature_after(
    previous: f64,
    heat_generated: f64,
    heat_lost: f64,
    thermal_capacity: f64,
) -> f64 {
    previous + (heat_generated - heat_lost) / thermal_capacity
}

/// Winding mass times specific heat from the winding time constant (G.7)
///
/// # Arguments
/// * `rated_winding_loss` - resistive plus eddy loss at rating, W
/// * `winding_time_constant` - min
/// * `rated_average_winding` - rated average winding temperature
/// * `rated_average_duct_fluid` - rated average fluid temperature in the ducts
pub fn winding_thermal_capacity(
    rated_winding_loss: f64,
    winding_time_constant: f64,
    rated_average_winding: f64,
    rated_average_duct_fluid: f64,
) -> f64 {
    rated_winding_loss * winding_time_constant / (rated_average_winding - rated_average_duct_fluid)
}

/// Rise of the fluid leaving the winding ducts over the bottom fluid (G.9)
///
/// # Arguments
/// * `winding_heat_lost` - heat given to the fluid by the windings this step, W·min
/// * `rated_winding_loss` - resistive plus eddy loss at rating, W
/// * `delta_t` - time step, min
/// * `x` - duct fluid rise exponent
/// * `rated_duct_rise` - rated top duct fluid minus rated bottom fluid
pub fn duct_fluid_rise(
    winding_heat_lost: f64,
    rated_winding_loss: f64,
    delta_t: f64,
    x: f64,
    rated_duct_rise: f64,
) -> f64 {
    if winding_heat_lost <= 0.0 {
        return 0.0;
    }
    (winding_heat_lost / (delta_t * rated_winding_loss)).powf(x) * rated_duct_rise
}

/// Fluid temperature next to the hot-spot (G.10, G.11). When the ducts
/// discharge cooler than the tank top, the tank top fluid is used.
pub fn fluid_temperature_at_hot_spot(
    hot_spot_location_pu: f64,
    bottom_fluid: f64,
    top_duct_fluid: f64,
    top_tank_fluid: f64,
) -> f64 {
    if top_duct_fluid < top_tank_fluid {
        top_tank_fluid
    } else {
        bottom_fluid + hot_spot_location_pu * (top_duct_fluid - bottom_fluid)
    }
}

/// Resistive and eddy losses at the hot-spot at rated load, `(P_HS, P_EHS)`
/// (G.12, G.13). `losses` are the rated-load losses referred to their own
/// reference temperature.
pub fn hot_spot_losses(losses: &Losses, rated_hot_spot: f64) -> (f64, f64) {
    let resistive =
        losses.winding_resistive_loss * losses.temperature_correction_factor(rated_hot_spot);
    (resistive, losses.winding_hotspot_eddy_loss_pu() * resistive)
}

/// Ratio of hot-spot resistance at `hot_spot` to that at `rated_hot_spot` (G.15)
pub fn hot_spot_resistance_ratio(hot_spot: f64, rated_hot_spot: f64, temperature_factor: f64) -> f64 {
    (hot_spot + temperature_factor) / (rated_hot_spot + temperature_factor)
}

/// Heat generated at the hot-spot over `delta_t` (G.14). Resistive loss rises
/// with resistance while eddy loss falls with it.
pub fn hot_spot_heat_generated(
    load_pu: f64,
    hot_spot_resistive: f64,
    hot_spot_eddy: f64,
    resistance_ratio: f64,
    delta_t: f64,
) -> f64 {
    load_pu.powi(2)
        * (hot_spot_resistive * resistance_ratio + hot_spot_eddy / resistance_ratio)
        * delta_t
}

/// Heat rejected by the fluid to ambient through tank and radiators (G.21)
///
/// # Arguments
/// * `average_fluid` - average tank fluid temperature at the step start
/// * `ambient` - ambient at the step start
/// * `rated_average_fluid` - rated average tank fluid temperature
/// * `rated_ambient` - rated ambient temperature
/// * `y` - average fluid rise exponent
/// * `rated_total_loss` - total loss at rated load, W
/// * `delta_t` - time step, min
pub fn fluid_heat_lost(
    average_fluid: f64,
    ambient: f64,
    rated_average_fluid: f64,
    rated_ambient: f64,
    y: f64,
    rated_total_loss: f64,
    delta_t: f64,
) -> f64 {
    let rise = average_fluid - ambient;
    if rise <= 0.0 {
        return 0.0;
    }
    (rise / (rated_average_fluid - rated_ambient)).powf(1.0 / y) * rated_total_loss * delta_t
}

/// Average tank fluid temperature after a step (G.25)
///
/// # Arguments
/// * `previous` - average tank fluid temperature at the step start
/// * `winding_heat_lost` - heat from the windings, W·min
/// * `stray_heat` - stray loss heat, W·min
/// * `core_heat` - core loss heat, W·min
/// * `fluid_heat_lost` - heat rejected to ambient, W·min
/// * `sum_mass_specific_heat` - tank, core and fluid heat capacity, W·min/°C
pub fn average_fluid_temperature_after(
    previous: f64,
    winding_heat_lost: f64,
    stray_heat: f64,
    core_heat: f64,
    fluid_heat_lost: f64,
    sum_mass_specific_heat: f64,
) -> f64 {
    previous + (winding_heat_lost + stray_heat + core_heat - fluid_heat_lost) / sum_mass_specific_heat
}

/// Top-to-bottom fluid gradient in the tank (G.26)
pub fn tank_fluid_gradient(
    fluid_heat_lost: f64,
    rated_total_loss: f64,
    delta_t: f64,
    z: f64,
    rated_gradient: f64,
) -> f64 {
    if fluid_heat_lost <= 0.0 {
        return 0.0;
    }
    (fluid_heat_lost / (rated_total_loss * delta_t)).powf(z) * rated_gradient
}

/// Insulation aging acceleration factor at hot-spot temperature `hot_spot`
pub fn aging_acceleration_factor(hot_spot: f64) -> f64 {
    (AGING_RATE_CONSTANT / AGING_REFERENCE_TEMP_K
        - AGING_RATE_CONSTANT / (hot_spot + KELVIN_OFFSET))
        .exp()
}
