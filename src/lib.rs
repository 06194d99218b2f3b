// Sprout - asset pipeline compiler
// Orchestrates glob input selection, engine-based compilation, digest paths,
// gzip siblings and manifest emission. Clean separation of concerns:
// core (domain), infrastructure (adapters), cli, utils.

pub mod cli;
pub mod config;
pub mod core;
pub mod infrastructure;
pub mod utils;
