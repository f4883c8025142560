//! Rating module: thumbs-up/down feedback on segmentation results

pub mod routes;
mod types;

pub use routes::rating_routes;
pub use types::{Rating, RatingLabel, RatingRequest};
