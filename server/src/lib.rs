//! PaceCrew server library
//!
//! A self-hosted social running-group server: groups, scheduled runs with
//! RSVPs, an individual run log, shoe mileage, per-group real-time chat and
//! distance/streak challenges.

pub mod api;
pub mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
