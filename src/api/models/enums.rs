use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Rendering style requested for a diagram.
///
/// The wire value is free text; anything outside the known tags falls back to
/// [`DiagramStyle::Colored`] rather than being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum DiagramStyle {
    #[default]
    #[serde(rename = "colored")]
    Colored,
    #[serde(rename = "hand-drawn")]
    HandDrawn,
    #[serde(rename = "aws")]
    Aws,
    #[serde(rename = "azure")]
    Azure,
    #[serde(rename = "gcp")]
    Gcp,
}

impl DiagramStyle {
    /// Resolve a free-form style tag. Matching is case-insensitive and total.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "hand-drawn" | "handdrawn" | "hand_drawn" => DiagramStyle::HandDrawn,
            "aws" => DiagramStyle::Aws,
            "azure" => DiagramStyle::Azure,
            "gcp" => DiagramStyle::Gcp,
            _ => DiagramStyle::Colored,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            DiagramStyle::Colored => "colored",
            DiagramStyle::HandDrawn => "hand-drawn",
            DiagramStyle::Aws => "aws",
            DiagramStyle::Azure => "azure",
            DiagramStyle::Gcp => "gcp",
        }
    }

    /// Cloud provider whose icons this style embeds, if any.
    pub fn cloud_provider(&self) -> Option<CloudProvider> {
        match self {
            DiagramStyle::Aws => Some(CloudProvider::Aws),
            DiagramStyle::Azure => Some(CloudProvider::Azure),
            DiagramStyle::Gcp => Some(CloudProvider::Gcp),
            DiagramStyle::Colored | DiagramStyle::HandDrawn => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Azure,
    Gcp,
}

impl CloudProvider {
    pub fn display_name(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "AWS",
            CloudProvider::Azure => "Azure",
            CloudProvider::Gcp => "Google Cloud",
        }
    }
}

/// Canned instruction block keyed to a domain detected in the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    Kubernetes,
    Aws,
    Azure,
    Gcp,
    Microservices,
    CiCd,
}

impl Template {
    /// Detection order. The first template whose triggers match wins.
    pub const PRECEDENCE: [Template; 6] = [
        Template::Kubernetes,
        Template::Aws,
        Template::Azure,
        Template::Gcp,
        Template::Microservices,
        Template::CiCd,
    ];

    /// Built-in trigger keywords, all lower case.
    pub fn default_triggers(&self) -> &'static [&'static str] {
        match self {
            Template::Kubernetes => &["kubernetes", "k8s", "ingress"],
            Template::Aws => &["aws", "vpc", "ec2", "s3", "lambda", "rds"],
            Template::Azure => &["azure", "virtual machine", "cosmos"],
            Template::Gcp => &["gcp", "google cloud", "compute engine"],
            Template::Microservices => &["microservice", "api gateway"],
            Template::CiCd => &["ci/cd", "pipeline", "jenkins", "github actions"],
        }
    }

    /// Provider whose icon table accompanies this template.
    pub fn cloud_provider(&self) -> Option<CloudProvider> {
        match self {
            Template::Aws => Some(CloudProvider::Aws),
            Template::Azure => Some(CloudProvider::Azure),
            Template::Gcp => Some(CloudProvider::Gcp),
            _ => None,
        }
    }
}
