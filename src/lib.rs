pub mod aggregate;
pub mod app;
pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod http;
pub mod output;
pub mod transform;
