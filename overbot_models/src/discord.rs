pub use twilight_model::*;
