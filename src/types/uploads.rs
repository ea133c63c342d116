//! Upload artifact types
//!
//! Two bulk datasets feed a job: the primary list (`combo`) and the
//! auxiliary endpoint list (`proxy`). The client tracks only whether each
//! one is uploaded and how many lines the backend accepted.

use serde::{Deserialize, Serialize};

/// Category of a bulk dataset, named as on the wire (`file_type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadCategory {
    /// Primary list of records
    Combo,
    /// Auxiliary list of connection endpoints
    Proxy,
}

impl UploadCategory {
    /// Wire name of the category
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Combo => "combo",
            Self::Proxy => "proxy",
        }
    }

    /// Human label used in input placeholders
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Combo => "Combo",
            Self::Proxy => "Proxy",
        }
    }
}

impl std::fmt::Display for UploadCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection-kind tag for the auxiliary list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    /// Plain HTTP proxy
    #[default]
    Http,
    /// SOCKS4 proxy
    Socks4,
    /// SOCKS5 proxy
    Socks5,
}

impl ProxyKind {
    /// Wire name of the kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Socks4 => "socks4",
            Self::Socks5 => "socks5",
        }
    }

    /// Parse a wire name; anything unrecognized falls back to `http`
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "socks4" => Self::Socks4,
            "socks5" => Self::Socks5,
            "http" => Self::Http,
            other => {
                log::warn!("Unknown proxy kind '{other}', falling back to http");
                Self::Http
            }
        }
    }
}

impl<'de> Deserialize<'de> for ProxyKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

impl std::fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bulk dataset as last reported by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadArtifact {
    /// Which dataset this is
    pub category: UploadCategory,
    /// Lines accepted by the backend, when known
    pub line_count: Option<u64>,
    /// Backend has the dataset
    pub uploaded: bool,
    /// Connection kind, only for [`UploadCategory::Proxy`]
    pub auxiliary_kind: Option<ProxyKind>,
}

impl UploadArtifact {
    /// Artifact that has not been uploaded
    #[must_use]
    pub const fn empty(category: UploadCategory) -> Self {
        Self {
            category,
            line_count: None,
            uploaded: false,
            auxiliary_kind: None,
        }
    }

    /// Artifact confirmed by the backend
    #[must_use]
    pub const fn uploaded(
        category: UploadCategory,
        line_count: Option<u64>,
        auxiliary_kind: Option<ProxyKind>,
    ) -> Self {
        Self {
            category,
            line_count,
            uploaded: true,
            auxiliary_kind,
        }
    }
}

/// Both datasets of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadState {
    combo: UploadArtifact,
    proxy: UploadArtifact,
}

impl UploadState {
    /// Artifact for a category
    #[must_use]
    pub const fn get(&self, category: UploadCategory) -> &UploadArtifact {
        match category {
            UploadCategory::Combo => &self.combo,
            UploadCategory::Proxy => &self.proxy,
        }
    }

    /// Replace the artifact of its category wholesale
    pub fn replace(&mut self, artifact: UploadArtifact) {
        match artifact.category {
            UploadCategory::Combo => self.combo = artifact,
            UploadCategory::Proxy => self.proxy = artifact,
        }
    }

    /// Forget both datasets
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Default for UploadState {
    fn default() -> Self {
        Self {
            combo: UploadArtifact::empty(UploadCategory::Combo),
            proxy: UploadArtifact::empty(UploadCategory::Proxy),
        }
    }
}
