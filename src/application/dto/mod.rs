//! # Data Transfer Objects

pub mod submit_config;
