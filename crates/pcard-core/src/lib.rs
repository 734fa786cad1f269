//! Core pcard library (config, OAuth login, profile client, controller).

pub mod callback;
pub mod config;
pub mod controller;
pub mod logging;
pub mod oauth;
pub mod profile;
pub mod view;
