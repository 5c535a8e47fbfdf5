pub mod auth;
pub mod chain;
pub mod constants;
pub mod engine;
pub mod metrics;
pub mod richlist;
pub mod rpc;
pub mod scheduler;
pub mod snapshot;
pub mod stream;
pub mod web;
pub mod window;
