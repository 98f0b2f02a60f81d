// storefront/src/lib.rs

//! Garage sale storefront: public catalog, buyer reservations and checkout,
//! and the admin back-office API.

pub mod config;
pub mod errors;
pub mod lifecycle;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
