//! API route handlers

pub mod activities;
pub mod auth;
pub mod challenges;
pub mod chat;
pub mod groups;
pub mod health;
pub mod runs;
pub mod shoes;
pub mod uploads;
pub mod users;
