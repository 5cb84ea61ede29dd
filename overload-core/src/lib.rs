//! Crate implementing the transformer overload thermal model of IEEE C57.91
//! Annex G: given nameplate losses, rated temperatures, masses and a cyclic
//! daily load schedule, it integrates the winding, hot-spot and oil heat
//! balances in time and reports peak temperatures and insulation aging.
//!
//! # Features:
//! - resources: embeds the worked-example model and load cycle
//! - bincode: enables binary (de)serialization via `SerdeAPI`

#[macro_use]
pub mod macros;

pub mod heat_balance;
pub mod imports;
pub mod load_cycle;
pub mod losses;
pub mod materials;
pub mod overload;
pub mod overload_iter;
pub mod params;
pub mod prelude;
#[cfg(feature = "resources")]
pub mod resources;
pub mod stability;
pub mod temperatures;
pub mod thermal;
pub mod traits;
