//! Comptoir API Library
//!
//! Business management backend for small French companies: organizations and
//! their members, clients, suppliers, the product catalogue and fiscal years.
//! Every operation lives in [`actions`]; [`api`] exposes them over HTTP.

pub mod actions;
pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod state;
