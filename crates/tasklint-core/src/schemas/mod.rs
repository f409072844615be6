//! Schema definitions for task-like resources

pub mod k8s;
pub mod step;
pub mod v1;
pub mod v1beta1;

pub use k8s::{EnvFromSource, EnvVar, ObjectMeta};
pub use step::Step;
