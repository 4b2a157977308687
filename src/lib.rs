//! Logbook Admin - document review service for student logbooks
//!
//! The server side owns documents and their review status; the client side
//! drives approve/reject and the cached admin statistics query.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod services;
