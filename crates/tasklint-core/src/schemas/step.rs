//! Normalized step shared by all schema revisions
//!
//! Rules only ever see this shape. Each revision converts into it once, so a
//! rule is written a single time regardless of which revision a resource uses.

use super::k8s::{EnvFromSource, EnvVar};
use super::{v1, v1beta1};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    pub name: String,
    pub image: String,
    /// `None` when the step has no inline script or it is empty
    pub script: Option<String>,
    pub env: Vec<EnvVar>,
    pub env_from: Vec<EnvFromSource>,
}

fn non_empty(script: &str) -> Option<String> {
    (!script.is_empty()).then(|| script.to_string())
}

impl From<&v1::Step> for Step {
    fn from(step: &v1::Step) -> Self {
        Self {
            name: step.name.clone(),
            image: step.image.clone(),
            script: non_empty(&step.script),
            env: step.env.clone(),
            env_from: step.env_from.clone(),
        }
    }
}

impl From<&v1beta1::Step> for Step {
    fn from(step: &v1beta1::Step) -> Self {
        Self {
            name: step.name.clone(),
            image: step.image.clone(),
            script: non_empty(&step.script),
            env: step.env.clone(),
            env_from: step.env_from.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revisions_normalize_identically() {
        let yaml = r#"
name: build
image: gcr.io/kaniko-project/executor:v1.9.0
script: |
  echo building
env:
  - name: TOKEN
    valueFrom:
      secretKeyRef:
        name: creds
        key: token
envFrom:
  - secretRef:
      name: registry
"#;
        let from_v1: Step = (&serde_yaml::from_str::<v1::Step>(yaml).unwrap()).into();
        let from_beta: Step = (&serde_yaml::from_str::<v1beta1::Step>(yaml).unwrap()).into();

        assert_eq!(from_v1, from_beta);
        assert_eq!(from_v1.script.as_deref(), Some("echo building\n"));
        assert!(from_v1.env[0].is_secret_backed());
        assert!(from_v1.env_from[0].is_secret_backed());
    }

    #[test]
    fn test_empty_script_is_none() {
        let step = v1::Step {
            name: "noop".to_string(),
            image: "docker.io/library/alpine:3.18".to_string(),
            ..Default::default()
        };
        assert_eq!(Step::from(&step).script, None);
    }
}
