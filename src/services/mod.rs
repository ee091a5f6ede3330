pub mod forecast;
pub mod meteo;
pub mod normalize;
pub mod stats;
