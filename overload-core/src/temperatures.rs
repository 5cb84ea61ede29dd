use crate::imports::*;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, ApproxEq, Validate)]
/// Snapshot of the transformer temperatures at one instant, °C.
///
/// Snapshots are values: the integrator produces a new one per step and
/// never modifies the one it was given.
pub struct Temperatures {
    /// ambient air temperature
    pub ambient_temperature: f64,
    /// guaranteed average winding rise over ambient at rated load
    pub rated_average_winding_rise: f64,
    pub average_winding_temperature: f64,
    /// winding hottest-spot temperature
    pub hot_spot_winding_temperature: f64,
    /// fluid entering the bottom of the windings and leaving the radiators
    pub bottom_fluid_temperature: f64,
    /// fluid at the top of the winding cooling ducts
    pub top_fluid_temperature_in_cooling_ducts: f64,
    /// fluid at the top of the tank, entering the radiators
    pub top_fluid_temperature_in_tank_and_rads: f64,
    /// per-unit height of the hot-spot above the winding bottom
    #[validate(range(min = 0, max = 1))]
    pub hot_spot_location_pu: f64,
}

impl Temperatures {
    /// Builds the rated temperature set from the ambient and the tested rises
    /// over ambient. At rating the oil leaving the ducts is the tank top oil
    /// and the hot-spot sits at the top of the winding.
    ///
    /// # Arguments
    /// * `ambient` - rated ambient temperature
    /// * `rated_average_winding_rise` - guaranteed average winding rise
    /// * `average_winding_rise` - tested average winding rise
    /// * `hot_spot_rise` - winding hottest-spot rise
    /// * `top_fluid_rise` - top oil rise
    /// * `bottom_fluid_rise` - bottom oil rise
    pub fn from_rises(
        ambient: f64,
        rated_average_winding_rise: f64,
        average_winding_rise: f64,
        hot_spot_rise: f64,
        top_fluid_rise: f64,
        bottom_fluid_rise: f64,
    ) -> Self {
        Self {
            ambient_temperature: ambient,
            rated_average_winding_rise,
            average_winding_temperature: ambient + average_winding_rise,
            hot_spot_winding_temperature: ambient + hot_spot_rise,
            bottom_fluid_temperature: ambient + bottom_fluid_rise,
            top_fluid_temperature_in_cooling_ducts: ambient + top_fluid_rise,
            top_fluid_temperature_in_tank_and_rads: ambient + top_fluid_rise,
            hot_spot_location_pu: 1.0,
        }
    }

    pub fn average_fluid_temperature_in_cooling_ducts(&self) -> f64 {
        (self.top_fluid_temperature_in_cooling_ducts + self.bottom_fluid_temperature) / 2.0
    }

    pub fn average_fluid_temperature_in_tank_and_rads(&self) -> f64 {
        (self.top_fluid_temperature_in_tank_and_rads + self.bottom_fluid_temperature) / 2.0
    }

    /// Temperature of the fluid adjacent to the hot-spot (G.10, G.11)
    pub fn hot_spot_fluid_temperature(&self) -> f64 {
        crate::heat_balance::fluid_temperature_at_hot_spot(
            self.hot_spot_location_pu,
            self.bottom_fluid_temperature,
            self.top_fluid_temperature_in_cooling_ducts,
            self.top_fluid_temperature_in_tank_and_rads,
        )
    }

    /// Hottest-spot rise over ambient
    pub fn hot_spot_rise(&self) -> f64 {
        self.hot_spot_winding_temperature - self.ambient_temperature
    }

    /// True when every field is a finite number
    pub fn is_finite(&self) -> bool {
        [
            self.ambient_temperature,
            self.rated_average_winding_rise,
            self.average_winding_temperature,
            self.hot_spot_winding_temperature,
            self.bottom_fluid_temperature,
            self.top_fluid_temperature_in_cooling_ducts,
            self.top_fluid_temperature_in_tank_and_rads,
            self.hot_spot_location_pu,
        ]
        .iter()
        .all(|t| t.is_finite())
    }
}
