#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod error;
pub mod graph;
pub mod nickname;
pub mod profiles;
pub mod ratings;
pub mod selector;

#[cfg(test)]
mod testing;
