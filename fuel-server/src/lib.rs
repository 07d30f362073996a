//! Fuel station lookup server.
//!
//! Answers "which petrol stations are within N km of this suburb, and what
//! do they charge?" from a SQLite price history, a persistent geocode cache
//! and an in-memory result cache.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod geocode;
pub mod lookup;
pub mod web;

#[cfg(test)]
mod testing;
