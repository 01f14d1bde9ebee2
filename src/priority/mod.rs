//! Priority classes and feature ordering for the solid-geometry consumer.

mod manager;

pub use manager::{PriorityClass, PriorityManager};
