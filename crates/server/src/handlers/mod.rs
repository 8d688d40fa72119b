//! HTTP request handlers.

pub mod common;
pub mod links;
pub mod uploads;

pub use common::*;
pub use links::*;
pub use uploads::*;
