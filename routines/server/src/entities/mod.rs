//! SeaORM entities for the routine tracker schema.

pub mod routine;
pub mod task;
pub mod user;
