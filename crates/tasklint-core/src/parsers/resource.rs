//! YAML/JSON resource decoding
//!
//! Decoding happens in two stages. [`parse_resources`] only reads the type
//! header (`apiVersion`, `kind`, `metadata.name`) so that every document can
//! be dispatched, and [`Resource::to_type`] coerces the document into the
//! schema revision it declares.

use serde::Deserialize;
use serde_yaml::Value;

use crate::diagnostics::{LintError, LintResult};
use crate::schemas::{v1, v1beta1, ObjectMeta, Step};
use crate::ResourceKind;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeMeta {
    #[serde(default)]
    api_version: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    metadata: ObjectMeta,
}

/// A decoded document whose kind is known but whose body is still untyped
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    document: Value,
}

impl Resource {
    pub fn from_value(document: Value) -> LintResult<Self> {
        let meta: TypeMeta = serde_yaml::from_value(document.clone())
            .map_err(|source| LintError::YamlParse { source })?;

        if meta.kind.is_empty() {
            return Err(LintError::MissingField { field: "kind" });
        }

        Ok(Self {
            api_version: meta.api_version,
            kind: meta.kind,
            name: meta.metadata.name,
            document,
        })
    }

    pub fn resource_kind(&self) -> ResourceKind {
        ResourceKind::parse(&self.kind)
    }

    /// Coerce the document into the typed schema for its kind and apiVersion.
    pub fn to_type(&self) -> LintResult<TypedResource> {
        let decode_err = |source| LintError::YamlParse { source };

        match (self.resource_kind(), self.api_version.as_str()) {
            (ResourceKind::Task, v1::API_VERSION) => serde_yaml::from_value(self.document.clone())
                .map(TypedResource::TaskV1)
                .map_err(decode_err),
            (ResourceKind::Task, v1beta1::API_VERSION) => {
                serde_yaml::from_value(self.document.clone())
                    .map(TypedResource::TaskV1Beta1)
                    .map_err(decode_err)
            }
            (ResourceKind::ClusterTask, v1beta1::API_VERSION) => {
                serde_yaml::from_value(self.document.clone())
                    .map(TypedResource::ClusterTask)
                    .map_err(decode_err)
            }
            (ResourceKind::Task | ResourceKind::ClusterTask, _) => {
                Err(LintError::UnsupportedVersion {
                    api_version: self.api_version.clone(),
                    kind: self.kind.clone(),
                })
            }
            (ResourceKind::Unrecognized(kind), _) => Err(LintError::NotATask { kind }),
        }
    }
}

/// A resource coerced into one of the supported schema revisions
#[derive(Debug, Clone, PartialEq)]
pub enum TypedResource {
    TaskV1(v1::Task),
    TaskV1Beta1(v1beta1::Task),
    ClusterTask(v1beta1::ClusterTask),
}

impl TypedResource {
    pub fn name(&self) -> &str {
        match self {
            TypedResource::TaskV1(task) => &task.metadata.name,
            TypedResource::TaskV1Beta1(task) | TypedResource::ClusterTask(task) => {
                &task.metadata.name
            }
        }
    }

    /// Steps in declared order, normalized across schema revisions
    pub fn steps(&self) -> Vec<Step> {
        match self {
            TypedResource::TaskV1(task) => task.spec.steps.iter().map(Step::from).collect(),
            TypedResource::TaskV1Beta1(task) | TypedResource::ClusterTask(task) => {
                task.spec.steps.iter().map(Step::from).collect()
            }
        }
    }
}

/// Parse a single-document resource
pub fn parse_resource(content: &str) -> LintResult<Resource> {
    let document: Value =
        serde_yaml::from_str(content).map_err(|source| LintError::YamlParse { source })?;
    Resource::from_value(document)
}

/// Parse every document of a (possibly multi-document) YAML stream.
///
/// Only a syntax error in the stream fails the whole call. A document that
/// parses but lacks a usable type header is returned as its own `Err`, in
/// stream order, so its siblings are still validated. Empty documents are
/// skipped.
pub fn parse_resources(content: &str) -> LintResult<Vec<LintResult<Resource>>> {
    let mut resources = Vec::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        let value =
            Value::deserialize(document).map_err(|source| LintError::YamlParse { source })?;
        if value.is_null() {
            continue;
        }
        resources.push(Resource::from_value(value));
    }

    Ok(resources)
}
