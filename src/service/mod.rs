//! Business layer above the repositories.

mod world;

pub use world::WorldService;
