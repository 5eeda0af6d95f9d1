//! Feature toggle management service.
//!
//! Operators manage toggles through a role gated JSON API; client applications
//! read the toggles switched on in their deployment context with an API key.

pub mod api_key;
pub mod app_config;
pub mod authz;
pub mod db;
pub mod middleware;
pub mod orm;
pub mod store;
pub mod toggle;
pub mod validation;
pub mod web;
