//! Document parsers for catalog resources

pub mod resource;

pub use resource::{parse_resource, parse_resources, Resource, TypedResource};
