//! Bridge between the egui thread and the async wallet controller.

pub mod commands;
pub mod runtime;
