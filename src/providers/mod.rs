//! Gateway implementations for remote image services.

pub mod bria;

pub use bria::BriaClient;
