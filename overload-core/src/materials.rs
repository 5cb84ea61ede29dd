//! Material and cooling property tables (Annex G Tables G.2 and G.3).
//!
//! The tables are plain data held by each model, so alternative property
//! sets can be injected without touching any global state.

use crate::imports::*;
use crate::params::KELVIN_OFFSET;
use crate::temperatures::Temperatures;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Winding conductor material
pub enum ConductorKind {
    #[default]
    Copper,
    Aluminum,
}

impl ConductorKind {
    /// Temperature factor for resistance change, °C
    pub fn temperature_factor(self) -> f64 {
        match self {
            Self::Copper => 234.5,
            Self::Aluminum => 225.0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Insulating fluid
pub enum FluidKind {
    #[default]
    MineralOil,
    Silicone,
    /// high-temperature hydrocarbon
    Hthc,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Cooling class of the transformer
pub enum CoolingMode {
    /// oil natural, air natural
    #[default]
    Onan,
    /// oil natural, air forced
    Onaf,
    /// oil forced (non-directed), air forced
    Ofaf,
    /// oil directed, air forced
    Odaf,
}

impl CoolingMode {
    /// True when oil is pumped through the winding ducts, which removes the
    /// viscosity dependence of the winding heat transfer.
    pub fn is_directed_flow(self) -> bool {
        self == Self::Odaf
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConductorProperties {
    /// specific heat, W·min/(lb·°C)
    pub specific_heat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidProperties {
    /// specific heat, W·min/(lb·°C)
    pub specific_heat: f64,
    /// viscosity constant `D`, cP
    pub viscosity_d: f64,
    /// viscosity constant `G`, K
    pub viscosity_g: f64,
}

impl FluidProperties {
    /// Fluid viscosity in cP at `temp` °C (G.28)
    pub fn viscosity(&self, temp: f64) -> f64 {
        self.viscosity_d * (self.viscosity_g / (temp + KELVIN_OFFSET)).exp()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Empirical exponents of the oil heat-transfer correlations
pub struct CoolingExponents {
    /// duct oil rise over bottom oil
    pub x: f64,
    /// average oil rise over ambient
    pub y: f64,
    /// tank top-to-bottom oil gradient
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialTables {
    pub copper: ConductorProperties,
    pub aluminum: ConductorProperties,
    pub mineral_oil: FluidProperties,
    pub silicone: FluidProperties,
    pub hthc: FluidProperties,
    /// specific heat of tank and core steel, W·min/(lb·°C)
    pub steel_specific_heat: f64,
    pub onan: CoolingExponents,
    pub onaf: CoolingExponents,
    pub ofaf: CoolingExponents,
    pub odaf: CoolingExponents,
}

impl Default for MaterialTables {
    fn default() -> Self {
        Self {
            copper: ConductorProperties {
                specific_heat: 2.91,
            },
            aluminum: ConductorProperties {
                specific_heat: 6.80,
            },
            mineral_oil: FluidProperties {
                specific_heat: 13.92,
                viscosity_d: 0.0013573,
                viscosity_g: 2797.3,
            },
            silicone: FluidProperties {
                specific_heat: 11.49,
                viscosity_d: 0.12127,
                viscosity_g: 1782.3,
            },
            hthc: FluidProperties {
                specific_heat: 14.55,
                viscosity_d: 0.00007343,
                viscosity_g: 4434.7,
            },
            steel_specific_heat: 3.51,
            onan: CoolingExponents {
                x: 0.5,
                y: 0.8,
                z: 0.5,
            },
            onaf: CoolingExponents {
                x: 0.5,
                y: 0.9,
                z: 0.5,
            },
            ofaf: CoolingExponents {
                x: 0.5,
                y: 0.9,
                z: 1.0,
            },
            odaf: CoolingExponents {
                x: 1.0,
                y: 1.0,
                z: 1.0,
            },
        }
    }
}

impl MaterialTables {
    pub fn conductor(&self, kind: ConductorKind) -> &ConductorProperties {
        match kind {
            ConductorKind::Copper => &self.copper,
            ConductorKind::Aluminum => &self.aluminum,
        }
    }

    pub fn fluid(&self, kind: FluidKind) -> &FluidProperties {
        match kind {
            FluidKind::MineralOil => &self.mineral_oil,
            FluidKind::Silicone => &self.silicone,
            FluidKind::Hthc => &self.hthc,
        }
    }

    pub fn exponents(&self, mode: CoolingMode) -> CoolingExponents {
        match mode {
            CoolingMode::Onan => self.onan,
            CoolingMode::Onaf => self.onaf,
            CoolingMode::Ofaf => self.ofaf,
            CoolingMode::Odaf => self.odaf,
        }
    }

    /// Returns `(average, hot_spot)` fluid viscosities for `temps`: the first
    /// evaluated at the mean of the average winding and average duct oil
    /// temperatures, the second at the mean of the hot-spot and the oil
    /// adjacent to it.
    pub fn fluid_viscosity(&self, fluid: FluidKind, temps: &Temperatures) -> (f64, f64) {
        let props = self.fluid(fluid);
        let average = props.viscosity(
            (temps.average_winding_temperature
                + temps.average_fluid_temperature_in_cooling_ducts())
                / 2.0,
        );
        let hot_spot = props.viscosity(
            (temps.hot_spot_winding_temperature + temps.hot_spot_fluid_temperature()) / 2.0,
        );
        (average, hot_spot)
    }
}
