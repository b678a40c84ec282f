//! Application layer
//!
//! Use cases that turn loosely typed commands into validated domain input,
//! call the invoice service and shape its results into response DTOs.

pub mod invoice;
