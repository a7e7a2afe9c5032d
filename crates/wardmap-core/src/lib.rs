//! # wardmap-core
//!
//! District geometry, boundary data and session state for wardmap.
//!
//! The heart of the crate is the locator: point-in-polygon detection over
//! an ordered district table, vertex centroids, and radial marker layout.
//! Around it sit the data modules (district boundaries, game state), the
//! display/original coordinate scaling, and the collector session that
//! accumulates clicked boundary points.
//!
//! ## Rust Lesson #8: Modules
//!
//! Rust modules are like ES6 modules but more explicit:
//! - `mod foo;` = load from `foo.rs` or `foo/mod.rs`
//! - `pub mod foo;` = also export it publicly
//! - `pub use foo::Bar;` = re-export Bar at this level
//!
//! Unlike Node.js, you must explicitly declare every module.

pub mod districts;
pub mod gamestate;
pub mod geometry;
pub mod locator;
pub mod scale;
pub mod session;

// Re-export common types at crate root for convenience.
pub use districts::{DataError, District, DistrictMap};
pub use gamestate::{canonical_name, DistrictRecord, GameState};
pub use geometry::{Point, Polygon};
pub use locator::{centroid, detect_district, point_in_polygon, radial_positions, GeometryError};
pub use scale::DisplayScale;
pub use session::{ClickRecord, CollectorSession};
