//! HTTP host for the dashboard: session gate, routing, and JSON responses.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
