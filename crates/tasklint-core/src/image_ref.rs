//! Container image reference parsing
//!
//! Lenient ("weak") validation in the style of registry client libraries:
//! references without a registry or tag are accepted and defaulted, but each
//! component must still be made of allowed characters.

use std::fmt;

use thiserror::Error;

pub const DEFAULT_TAG: &str = "latest";

const REPOSITORY_CHARS: &str = "abcdefghijklmnopqrstuvwxyz0123456789_-./";
const DIGEST_ALGORITHM: &str = "sha256:";
const DIGEST_HEX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageRefError {
    #[error("a repository name must be specified")]
    EmptyRepository,

    #[error("{element} must be between {min} and {max} characters in length: {value}")]
    BadLength {
        element: &'static str,
        min: usize,
        max: usize,
        value: String,
    },

    #[error("{element} can only contain the characters `{allowed}`: {value}")]
    BadCharacters {
        element: &'static str,
        allowed: &'static str,
        value: String,
    },

    #[error("tag must start with a letter, digit or underscore: {0}")]
    BadTagStart(String),

    #[error("registries must be valid RFC 3986 URI authorities: {0}")]
    BadRegistry(String),

    #[error("a digest must contain exactly one '@' separator (e.g. registry/repository@digest) saw: {0}")]
    DigestSeparator(String),

    #[error("unsupported digest algorithm, expected sha256: {0}")]
    DigestAlgorithm(String),
}

/// Registry host (if explicit) and repository path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub registry: Option<String>,
    pub path: String,
}

impl Repository {
    pub fn parse(name: &str) -> Result<Self, ImageRefError> {
        if name.is_empty() {
            return Err(ImageRefError::EmptyRepository);
        }

        let (registry, path) = match name.split_once('/') {
            Some((host, rest)) if looks_like_registry(host) => (Some(host), rest),
            _ => (None, name),
        };

        check_element("repository", path, REPOSITORY_CHARS, 2, 255)?;
        if let Some(host) = registry {
            check_registry(host)?;
        }

        Ok(Self {
            registry: registry.map(str::to_string),
            path: path.to_string(),
        })
    }

    pub fn name(&self) -> String {
        match &self.registry {
            Some(registry) => format!("{}/{}", registry, self.path),
            None => self.path.clone(),
        }
    }
}

/// `repository[:tag]`, the tag defaulting to `latest`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    pub repository: Repository,
    tag: String,
    original: String,
}

impl TagRef {
    pub fn identifier(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for TagRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// `repository[:tag]@sha256:<hex>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestRef {
    pub repository: Repository,
    pub tag: Option<String>,
    pub digest: String,
    original: String,
}

impl DigestRef {
    /// Whether a specific (non-`latest`) tag accompanies the digest
    pub fn has_specific_tag(&self) -> bool {
        self.tag
            .as_deref()
            .is_some_and(|tag| !tag.eq_ignore_ascii_case(DEFAULT_TAG))
    }
}

impl fmt::Display for DigestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

pub fn parse_tag(name: &str) -> Result<TagRef, ImageRefError> {
    let (base, tag) = split_tag(name);
    let tag = tag.unwrap_or(DEFAULT_TAG);
    check_tag(tag)?;
    let repository = Repository::parse(base)?;

    Ok(TagRef {
        repository,
        tag: tag.to_string(),
        original: name.to_string(),
    })
}

pub fn parse_digest(name: &str) -> Result<DigestRef, ImageRefError> {
    let mut parts = name.split('@');
    let (base, digest) = match (parts.next(), parts.next(), parts.next()) {
        (Some(base), Some(digest), None) => (base, digest),
        _ => return Err(ImageRefError::DigestSeparator(name.to_string())),
    };

    check_digest(digest)?;

    let (repo_name, tag) = split_tag(base);
    if let Some(tag) = tag {
        check_tag(tag)?;
    }
    let repository = Repository::parse(repo_name)?;

    Ok(DigestRef {
        repository,
        tag: tag.map(str::to_string),
        digest: digest.to_string(),
        original: name.to_string(),
    })
}

/// Split off a trailing `:tag`, ignoring colons that belong to a registry port.
fn split_tag(name: &str) -> (&str, Option<&str>) {
    match name.rfind(':') {
        Some(i) if !name[i..].contains('/') => (&name[..i], Some(&name[i + 1..])),
        _ => (name, None),
    }
}

fn looks_like_registry(host: &str) -> bool {
    host.contains('.') || host.contains(':') || host == "localhost"
}

fn check_tag(tag: &str) -> Result<(), ImageRefError> {
    const TAG_CHARS: &str =
        "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-.";
    check_element("tag", tag, TAG_CHARS, 1, 128)?;
    if tag.starts_with(['.', '-']) {
        return Err(ImageRefError::BadTagStart(tag.to_string()));
    }
    Ok(())
}

fn check_digest(digest: &str) -> Result<(), ImageRefError> {
    let hex = digest
        .strip_prefix(DIGEST_ALGORITHM)
        .ok_or_else(|| ImageRefError::DigestAlgorithm(digest.to_string()))?;
    check_element("digest", hex, "0123456789abcdef", DIGEST_HEX_LEN, DIGEST_HEX_LEN)
}

fn check_registry(host: &str) -> Result<(), ImageRefError> {
    let valid = !host.is_empty()
        && !host.starts_with(':')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']'));
    if valid {
        Ok(())
    } else {
        Err(ImageRefError::BadRegistry(host.to_string()))
    }
}

fn check_element(
    element: &'static str,
    value: &str,
    allowed: &'static str,
    min: usize,
    max: usize,
) -> Result<(), ImageRefError> {
    if value.len() < min || value.len() > max {
        return Err(ImageRefError::BadLength {
            element,
            min,
            max,
            value: value.to_string(),
        });
    }
    if !value.chars().all(|c| allowed.contains(c)) {
        return Err(ImageRefError::BadCharacters {
            element,
            allowed,
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "4ff3ca91275773af45cb4b0834e12b7eb47d1c18f770a0b151381cd227f4c253";

    #[test]
    fn test_tag_defaults_to_latest() {
        let tag = parse_tag("ubuntu").unwrap();
        assert_eq!(tag.identifier(), "latest");
        assert_eq!(tag.repository.registry, None);
    }

    #[test]
    fn test_tag_with_registry_port() {
        let tag = parse_tag("localhost:5000/tools/builder").unwrap();
        assert_eq!(tag.identifier(), "latest");
        assert_eq!(tag.repository.registry.as_deref(), Some("localhost:5000"));
        assert_eq!(tag.repository.path, "tools/builder");
    }

    #[test]
    fn test_explicit_tag() {
        let tag = parse_tag("gcr.io/tekton-releases/git-init:v0.40.2").unwrap();
        assert_eq!(tag.identifier(), "v0.40.2");
        assert_eq!(tag.repository.name(), "gcr.io/tekton-releases/git-init");
        assert_eq!(tag.to_string(), "gcr.io/tekton-releases/git-init:v0.40.2");
    }

    #[test]
    fn test_uppercase_repository_rejected() {
        let err = parse_tag("docker.io/Library/Ubuntu:1.0").unwrap_err();
        assert!(matches!(err, ImageRefError::BadCharacters { element: "repository", .. }));
    }

    #[test]
    fn test_bad_tag_characters() {
        let err = parse_tag("docker.io/library/ubuntu:1.0+x").unwrap_err();
        assert!(matches!(err, ImageRefError::BadCharacters { element: "tag", .. }));
    }

    #[test]
    fn test_empty_tag_rejected() {
        let err = parse_tag("docker.io/library/ubuntu:").unwrap_err();
        assert!(matches!(err, ImageRefError::BadLength { element: "tag", .. }));
    }

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(parse_tag("").unwrap_err(), ImageRefError::EmptyRepository);
    }

    #[test]
    fn test_digest_without_tag() {
        let digest = parse_digest(&format!("gcr.io/foo/bar@sha256:{}", HEX)).unwrap();
        assert_eq!(digest.tag, None);
        assert!(!digest.has_specific_tag());
        assert_eq!(digest.digest, format!("sha256:{}", HEX));
    }

    #[test]
    fn test_digest_with_tag() {
        let name = format!("gcr.io/foo/bar:v1@sha256:{}", HEX);
        let digest = parse_digest(&name).unwrap();
        assert_eq!(digest.tag.as_deref(), Some("v1"));
        assert!(digest.has_specific_tag());
        assert_eq!(digest.to_string(), name);
    }

    #[test]
    fn test_digest_with_latest_tag() {
        let digest = parse_digest(&format!("gcr.io/foo/bar:latest@sha256:{}", HEX)).unwrap();
        assert!(!digest.has_specific_tag());
    }

    #[test]
    fn test_short_digest_rejected() {
        let err = parse_digest("gcr.io/foo/bar@sha256:abc123").unwrap_err();
        assert!(matches!(err, ImageRefError::BadLength { element: "digest", .. }));
    }

    #[test]
    fn test_uppercase_digest_rejected() {
        let err = parse_digest(&format!("gcr.io/foo/bar@sha256:{}", HEX.to_uppercase())).unwrap_err();
        assert!(matches!(err, ImageRefError::BadCharacters { element: "digest", .. }));
    }

    #[test]
    fn test_double_at_rejected() {
        let err = parse_digest(&format!("gcr.io/foo@bar@sha256:{}", HEX)).unwrap_err();
        assert!(matches!(err, ImageRefError::DigestSeparator(_)));
    }
}
