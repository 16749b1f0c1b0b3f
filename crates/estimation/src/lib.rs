//! Kinematic state estimation from pose telemetry
//!
//! This crate provides:
//! - A single-pole rate filter for finite-difference jitter
//! - The estimator that turns raw, possibly incomplete samples into full
//!   kinematic states

pub mod estimator;
pub mod filter;

pub use estimator::*;
pub use filter::*;
