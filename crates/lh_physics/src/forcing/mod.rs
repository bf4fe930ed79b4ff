// crates/lh_physics/src/forcing/mod.rs

//! 外部强迫：边界时序与气象

pub mod meteo;
pub mod schedule;

pub use meteo::{
    atmospheric_longwave, back_radiation, conduction_flux, evaporation_flux, penetrating_flux,
    saturation_vapor_mmhg, surface_heat_flux, MeteoRecord,
};
pub use schedule::{ScheduleCursor, ScheduleSeries};
