//! One explicit time step of the Annex G heat balances.

use crate::heat_balance::*;
use crate::load_cycle::LoadSegment;
use crate::losses::Losses;
use crate::materials::{CoolingExponents, FluidProperties};
use crate::overload::OverloadModel;
use crate::temperatures::Temperatures;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
/// Heats exchanged during one step, W·min
pub struct HeatBalance {
    pub winding_generated: f64,
    pub winding_lost: f64,
    pub hot_spot_generated: f64,
    pub hot_spot_lost: f64,
    pub stray: f64,
    pub core: f64,
    pub fluid_lost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThermalStep {
    pub temperatures: Temperatures,
    pub heat: HeatBalance,
}

#[derive(Debug, Clone)]
/// Advances a temperature snapshot by one explicit step for a given model.
/// Rated references that do not change over a run are computed once here.
pub struct ThermalIntegrator<'a> {
    model: &'a OverloadModel,
    fluid: &'a FluidProperties,
    exponents: CoolingExponents,
    with_core_overexcitation: bool,
    /// tested losses projected to a per-unit overload of 1.0
    rated_losses: Losses,
    /// (I²R, eddy) at the hot-spot at rated load
    hot_spot_losses: (f64, f64),
    /// rated (average, hot-spot) film viscosities
    rated_viscosity: (f64, f64),
    winding_capacity: f64,
    fluid_capacity: f64,
}

impl<'a> ThermalIntegrator<'a> {
    pub fn new(
        model: &'a OverloadModel,
        exponents: CoolingExponents,
        with_core_overexcitation: bool,
    ) -> Self {
        let rated_losses = model.rated_losses();
        let hot_spot_losses = hot_spot_losses(
            &rated_losses,
            model.rated_temperatures.hot_spot_winding_temperature,
        );
        Self {
            model,
            fluid: model.tables.fluid(model.fluid),
            exponents,
            with_core_overexcitation,
            rated_losses,
            hot_spot_losses,
            rated_viscosity: model
                .tables
                .fluid_viscosity(model.fluid, &model.rated_temperatures),
            winding_capacity: model.winding_thermal_capacity(),
            fluid_capacity: model.fluid_thermal_capacity(),
        }
    }

    /// Computes the snapshot at `time_minutes` from `start`, taken
    /// `delta_t` minutes earlier, with load and ambient following `segment`.
    pub fn advance(
        &self,
        start: &Temperatures,
        segment: &LoadSegment,
        time_minutes: f64,
        delta_t: f64,
    ) -> ThermalStep {
        let rated = &self.model.rated_temperatures;
        let cooling = self.model.cooling_mode;
        let load_pu = segment.load_at(time_minutes);
        let ambient = segment.ambient_at(time_minutes);

        // losses at this load and the starting winding temperature
        let corrected = self.model.tested_losses.losses_at_load_and_temperature(
            load_pu * self.model.loss_load_ratio(),
            start.average_winding_temperature,
        );
        let rated_winding_loss = self.rated_losses.winding_loss();

        // average winding
        let winding_generated = corrected.winding_loss() * delta_t;
        let start_duct_fluid = start.average_fluid_temperature_in_cooling_ducts();
        let winding_surface = SurfaceGradient {
            gradient: start.average_winding_temperature - start_duct_fluid,
            rated_gradient: rated.average_winding_temperature
                - rated.average_fluid_temperature_in_cooling_ducts(),
            viscosity: self
                .fluid
                .viscosity((start.average_winding_temperature + start_duct_fluid) / 2.0),
            rated_viscosity: self.rated_viscosity.0,
        };
        let winding_lost =
            convective_heat_lost(cooling, &winding_surface, rated_winding_loss, delta_t);
        let average_winding = winding_temperature_after(
            start.average_winding_temperature,
            winding_generated,
            winding_lost,
            self.winding_capacity,
        )
        .max(start.bottom_fluid_temperature);

        // fluid in the ducts; the hot-spot fluid sees the unclamped duct rise
        let duct_rise = duct_fluid_rise(
            winding_lost,
            rated_winding_loss,
            delta_t,
            self.exponents.x,
            rated.top_fluid_temperature_in_cooling_ducts - rated.bottom_fluid_temperature,
        );
        let top_duct_fluid = start.bottom_fluid_temperature + duct_rise;
        let hot_spot_fluid = fluid_temperature_at_hot_spot(
            start.hot_spot_location_pu,
            start.bottom_fluid_temperature,
            top_duct_fluid,
            start.top_fluid_temperature_in_tank_and_rads,
        );

        // hot-spot
        let hot_spot_start = start
            .hot_spot_winding_temperature
            .max(average_winding)
            .max(hot_spot_fluid);
        let (hot_spot_resistive, hot_spot_eddy) = self.hot_spot_losses;
        let resistance_ratio = hot_spot_resistance_ratio(
            hot_spot_start,
            rated.hot_spot_winding_temperature,
            self.model.tested_losses.conductor.temperature_factor(),
        );
        let hot_spot_generated = hot_spot_heat_generated(
            load_pu,
            hot_spot_resistive,
            hot_spot_eddy,
            resistance_ratio,
            delta_t,
        );
        let hot_spot_surface = SurfaceGradient {
            gradient: hot_spot_start - hot_spot_fluid,
            rated_gradient: rated.hot_spot_winding_temperature - rated.hot_spot_fluid_temperature(),
            viscosity: self.fluid.viscosity((hot_spot_start + hot_spot_fluid) / 2.0),
            rated_viscosity: self.rated_viscosity.1,
        };
        let hot_spot_lost = convective_heat_lost(
            cooling,
            &hot_spot_surface,
            hot_spot_resistive + hot_spot_eddy,
            delta_t,
        );
        let hot_spot = winding_temperature_after(
            hot_spot_start,
            hot_spot_generated,
            hot_spot_lost,
            self.winding_capacity,
        )
        .max(average_winding);

        // bulk fluid
        let rated_total_loss = self.rated_losses.total_loss(false);
        let stray = corrected.stray_loss * delta_t;
        let fluid_lost = fluid_heat_lost(
            start.average_fluid_temperature_in_tank_and_rads(),
            start.ambient_temperature,
            rated.average_fluid_temperature_in_tank_and_rads(),
            rated.ambient_temperature,
            self.exponents.y,
            rated_total_loss,
            delta_t,
        );
        let core_loss = if self.with_core_overexcitation {
            self.model.tested_losses.core_loss_with_overexcitation
        } else {
            self.model.tested_losses.core_loss
        };
        let core = core_loss * delta_t;
        let average_fluid = average_fluid_temperature_after(
            start.average_fluid_temperature_in_tank_and_rads(),
            winding_lost,
            stray,
            core,
            fluid_lost,
            self.fluid_capacity,
        );
        let tank_gradient = tank_fluid_gradient(
            fluid_lost,
            rated_total_loss,
            delta_t,
            self.exponents.z,
            rated.top_fluid_temperature_in_tank_and_rads - rated.bottom_fluid_temperature,
        );
        let top_tank_fluid = average_fluid + tank_gradient / 2.0;
        let bottom_fluid = (average_fluid - tank_gradient / 2.0).max(ambient);

        ThermalStep {
            temperatures: Temperatures {
                ambient_temperature: ambient,
                rated_average_winding_rise: start.rated_average_winding_rise,
                average_winding_temperature: average_winding,
                hot_spot_winding_temperature: hot_spot,
                bottom_fluid_temperature: bottom_fluid,
                top_fluid_temperature_in_cooling_ducts: top_duct_fluid.max(bottom_fluid),
                top_fluid_temperature_in_tank_and_rads: top_tank_fluid,
                hot_spot_location_pu: start.hot_spot_location_pu,
            },
            heat: HeatBalance {
                winding_generated,
                winding_lost,
                hot_spot_generated,
                hot_spot_lost,
                stray,
                core,
                fluid_lost,
            },
        }
    }
}
