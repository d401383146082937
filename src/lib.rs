pub mod accidents;
pub mod config;
pub mod fetch;
pub mod filter;
pub mod geo;
pub mod output;
pub mod plot;
pub mod weights;
