//! Tactical map renderer: composites strongpoint markers and faction
//! capture-progress bars over a game map's base image, served over HTTP.

pub mod asset_cache;
pub mod catalog;
pub mod compositor;
pub mod config;
pub mod error;
pub mod geometry;
pub mod models;
pub mod server;
pub mod utils;
pub mod validate;
