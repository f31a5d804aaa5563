pub mod adapters;
pub mod commands;
pub mod config;
pub mod domain;
pub mod model;
pub mod observable;
pub mod ports;
