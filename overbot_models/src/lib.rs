#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod discord;
pub mod id;
pub mod nickname;
pub mod profile;
pub mod rating;
