//! capdns Infrastructure Layer
pub mod batcher;
pub mod capture;
pub mod database;
pub mod repositories;
