//! capdns Application Layer
pub mod ports;
