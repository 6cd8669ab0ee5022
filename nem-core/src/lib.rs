#![warn(missing_docs)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

/// Core domain models for market clearing.
///
/// This module contains the entity registry (regions, generators, bid curves and
/// transmission links) and the outcome types a clearing run produces.
///
/// The models are plain data with validation at construction time; they carry no
/// optimization logic, which lives behind the [`ports::Solver`] trait.
pub mod models;

/// Interface traits for market clearing.
///
/// This module contains the "ports" in the hexagonal architecture pattern: the
/// contract between the registry and whatever engine computes dispatch and prices.
pub mod ports;
