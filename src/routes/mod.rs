//! Router assembly.

mod common;
mod world;

pub use common::common_routes;
pub use world::world_routes;
