//! # Casegen Core
//!
//! Schema-driven test case generation for API endpoints.
//!
//! An [`Endpoint`] describes one API operation: a path, an HTTP method and one
//! JSON Schema per request axis (path parameters, headers, cookies, query,
//! body, form data). From it this crate builds:
//!
//! - a [`CompositeSource`]: a `proptest` strategy drawing complete [`Case`]s,
//!   one independent draw per axis;
//! - a deterministic set of example cases, one per axis whose schema declares
//!   an `"example"` value, with every other axis sampled;
//! - a [`BoundTest`] that runs a test procedure against every example case
//!   first and then against randomized draws.
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` - returns `Result` instead
//! - No `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only
//!
//! ## Example
//!
//! ```rust
//! use casegen_core::{bind, Axis, Endpoint, HttpMethod, JsonSchemaGenerator, RunSettings};
//! use serde_json::json;
//!
//! # fn main() -> casegen_core::Result<()> {
//! let endpoint = Endpoint::builder("/users/{id}", HttpMethod::Get)
//!     .schema(
//!         Axis::PathParameters,
//!         json!({
//!             "type": "object",
//!             "properties": {"id": {"type": "integer"}},
//!             "required": ["id"],
//!             "example": {"id": 42}
//!         }),
//!     )
//!     .build()?;
//!
//! let settings = RunSettings::default().max_examples(16);
//! let bound = bind(
//!     |case: &casegen_core::Case| {
//!         proptest::prop_assert_eq!(case.path.as_str(), "/users/{id}");
//!         Ok(())
//!     },
//!     &endpoint,
//!     &JsonSchemaGenerator::default(),
//!     Some(settings),
//! )?;
//! let report = bound.run()?;
//! assert_eq!(report.examples_executed, 1);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod assembler;
pub mod axis;
pub mod binder;
pub mod case;
pub mod collector;
pub mod config;
pub mod endpoint;
mod error;
pub mod schema;

pub use assembler::{build_composite_source, CompositeSource, Draws};
pub use axis::{Axis, AxisMap};
pub use binder::{bind, BoundTest, RunReport};
pub use case::Case;
pub use collector::{collect, declared_examples, merge_example, ExampleCases};
pub use config::RunSettings;
pub use endpoint::{Endpoint, EndpointBuilder, HttpMethod};
pub use error::{Error, Result};
pub use schema::{JsonSchemaGenerator, SchemaGenerator};
