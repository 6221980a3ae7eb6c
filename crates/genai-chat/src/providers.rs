pub mod base;
pub mod configs;
pub mod utils;
pub mod vertex;

#[cfg(test)]
pub mod mock;
