mod rps_world;
mod setups;
mod steps;

pub use rps_world::{RpsWorld, WagerSystem};
