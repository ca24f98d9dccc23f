//! Route geometry sources.
//!
//! - [`RouteBuilder`]: tracks assembled from legs of known bearing and length

mod routes;

pub use routes::{Leg, RouteBuilder};
