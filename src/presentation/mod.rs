// Presentation layer - Snapshot rendering
pub mod console;
