// Domain layer - Core data models and windowing rules
pub mod alarm;
pub mod dashboard;
pub mod telemetry;
