pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod display;
pub mod docs;
pub mod error;
pub mod gateway;
pub mod model;
pub mod models;
pub mod navigation;
pub mod routes;
pub mod state;
pub mod views;
