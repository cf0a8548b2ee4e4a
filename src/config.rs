// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;
use anyhow::Result;
use serde::Deserialize;

// Domain attributes are all optional here so that a missing one surfaces as
// a MalformedDomain error instead of a deserialization error.
#[derive(Debug, Deserialize)]
pub struct DomainConfig {
   pub address: Option<String>,
   pub name: Option<String>,
   pub blocks: Option<Vec<BlockConfig>>,
}

#[derive(Debug, Deserialize)]
pub struct BlockConfig {
   pub offset: String,
   #[serde(rename = "type")]
   pub type_: String,
   pub name: String,
   pub count: Option<u32>,
   pub aligned: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => Format::Json,
        }
    }
}

pub fn parse_document(text: &str, format: Format) -> Result<Vec<DomainConfig>> {
    Ok(match format {
        Format::Json => serde_json::from_str(text)?,
        Format::Yaml => serde_yaml::from_str(text)?,
    })
}
