//! Domain layer: equipment model, reconciliation and benchmark services

pub mod model;
pub mod repository;
pub mod service;
