//! Prompt templates.
//!
//! Each template renders a single user message telling the caller which tool
//! to invoke with which arguments.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, Serialize)]
pub struct PromptArgument {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// A prompt as listed by `prompts/list`.
#[derive(Debug, Clone, Serialize)]
pub struct PromptDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: Vec<PromptArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
    pub role: &'static str,
    pub content: PromptContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl PromptMessage {
    fn user(text: String) -> Self {
        Self {
            role: "user",
            content: PromptContent { kind: "text", text },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Template {
    ListTags,
    ListArchitectures,
    ListDigests,
    ListAnnotations,
}

const TEMPLATES: [(&str, Template, &str); 4] = [
    (
        "list_tags_prompt",
        Template::ListTags,
        "Instructions for listing the tags of an OCI repository.",
    ),
    (
        "list_architectures_prompt",
        Template::ListArchitectures,
        "Instructions for finding the architectures supported by a tag or digest.",
    ),
    (
        "list_digests_prompt",
        Template::ListDigests,
        "Instructions for retrieving the SHA256 digest of a tag.",
    ),
    (
        "list_annotations_prompt",
        Template::ListAnnotations,
        "Instructions for retrieving the OCI annotations of a tag or digest.",
    ),
];

const REGISTRY_ARG: PromptArgument = PromptArgument {
    name: "registry",
    description: "Registry host, e.g. \"registry-1.docker.io\", \"ghcr.io\"",
    required: true,
};

const REPOSITORY_ARG: PromptArgument = PromptArgument {
    name: "repository",
    description: "Repository path, e.g. \"library/alpine\", \"owner/image\"",
    required: true,
};

const REFERENCE_ARG: PromptArgument = PromptArgument {
    name: "reference",
    description: "Tag or digest, e.g. \"latest\", \"3.22.2\", \"sha256:...\"",
    required: true,
};

impl Template {
    fn arguments(self) -> Vec<PromptArgument> {
        match self {
            Template::ListTags => vec![REGISTRY_ARG, REPOSITORY_ARG],
            _ => vec![REGISTRY_ARG, REPOSITORY_ARG, REFERENCE_ARG],
        }
    }

    fn render(self, registry: &str, repository: &str, reference: &str) -> String {
        let details_call = format!(
            "Use the get_oci_details tool with registry='{}', repository='{}', and reference='{}'.",
            registry, repository, reference
        );
        match self {
            Template::ListTags => format!(
                "List all available tags for the OCI image {0}/{1}. \
                 Use the list_oci_tags tool with registry='{0}' and repository='{1}'.",
                registry, repository
            ),
            Template::ListArchitectures => format!(
                "List all supported architectures for the OCI image {}/{}:{}. {} \
                 The response will include an 'architectures' field with the list of supported CPU architectures.",
                registry, repository, reference, details_call
            ),
            Template::ListDigests => format!(
                "Get the digest (SHA256 hash) for the OCI image {}/{}:{}. {} \
                 The response will include a 'digest' field containing the SHA256 digest of the manifest.",
                registry, repository, reference, details_call
            ),
            Template::ListAnnotations => format!(
                "List all annotations (metadata) for the OCI image {}/{}:{}. {} \
                 The response will include an 'annotations' field containing a dictionary of key-value pairs with OCI annotations.",
                registry, repository, reference, details_call
            ),
        }
    }
}

/// All prompt definitions, in registration order.
pub fn definitions() -> Vec<PromptDefinition> {
    TEMPLATES
        .iter()
        .map(|&(name, template, description)| PromptDefinition {
            name,
            description,
            arguments: template.arguments(),
        })
        .collect()
}

/// Why a prompt could not be rendered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),
}

/// Render prompt `name` with string `arguments`.
pub fn render(
    name: &str,
    arguments: &Map<String, Value>,
) -> Result<Vec<PromptMessage>, PromptError> {
    let template = TEMPLATES
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|&(_, template, _)| template)
        .ok_or_else(|| PromptError::UnknownPrompt(name.to_string()))?;

    let value = |arg: &'static str| {
        arguments
            .get(arg)
            .and_then(Value::as_str)
            .ok_or(PromptError::MissingArgument(arg))
    };
    let registry = value("registry")?;
    let repository = value("repository")?;
    let reference = match template {
        Template::ListTags => "",
        _ => value("reference")?,
    };

    Ok(vec![PromptMessage::user(
        template.render(registry, repository, reference),
    )])
}

/// Description of prompt `name`, if it exists.
pub fn description(name: &str) -> Option<&'static str> {
    TEMPLATES
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, _, description)| *description)
}
