#![forbid(unsafe_code)]

mod envelope;
mod inputs;
mod payload;
mod service;
mod support;

pub use envelope::{ApiError, ApiResponse};
pub use inputs::*;
pub use service::RecipeService;
