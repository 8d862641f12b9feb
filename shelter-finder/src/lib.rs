//! Evacuation shelter finder.
//!
//! Picks the shelter with the shortest drive from a given origin by asking a
//! routing service for an ETA to each candidate, and batch-geocodes the
//! shelter dataset those candidates come from.

pub mod agent;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod geocode;
pub mod ranking;
pub mod retry;
pub mod routing;
pub mod telemetry;
pub mod web;

#[cfg(test)]
mod test_support;
