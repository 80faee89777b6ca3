//! Business logic services

pub mod geocoding;
pub mod matrix;
pub mod nominatim;
pub mod optimizer;
pub mod projector;
pub mod reporter;
pub mod sequencer;
pub mod timeline;
