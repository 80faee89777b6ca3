//! Type definitions for the worker

pub mod geocode;
pub mod messages;
pub mod route;

pub use geocode::*;
pub use messages::*;
pub use route::*;
