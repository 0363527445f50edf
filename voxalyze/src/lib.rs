pub mod api;
pub mod classify;
pub mod collector;
pub mod config;
pub mod debug;
pub mod event;
pub mod middleware;
pub mod prometheus;
pub mod router;
pub mod server;
pub mod track;
pub mod tracker;
