// SPDX-License-Identifier: GPL-3.0-or-later

mod structure;

pub use structure::{Field, GeneratedStructure, PaddingSize, RESERVED_ANNOTATION};

use std::error::Error;
use std::fmt;
use std::num::ParseIntError;
use std::path::Path;
use anyhow::{Context, Result};

use crate::config::{self, BlockConfig, DomainConfig, Format};
use crate::util;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Domain `domain` (index in the document) lacks a required attribute
    MalformedDomain { domain: usize, missing: &'static str },
    InvalidHex { value: String, source: ParseIntError },
    InvalidCount { domain: String, block: String },
    UnsortedBlocks { domain: String, block: String, offset: u32, previous: u32 },
    InvalidIdentifier { what: &'static str, value: String },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::MalformedDomain { domain, missing } => {
                write!(f, "Domain #{} has no '{}' attribute", domain, missing)
            }
            LayoutError::InvalidHex { value, .. } => {
                write!(f, "Invalid hexadecimal value '{}'", value)
            }
            LayoutError::InvalidCount { domain, block } => {
                write!(f, "Block {}.{} must have a count of at least 1", domain, block)
            }
            LayoutError::UnsortedBlocks { domain, block, offset, previous } => {
                write!(f, "Blocks of {} must be sorted by offset: {} at 0x{:08x} follows 0x{:08x}",
                    domain, block, offset, previous)
            }
            LayoutError::InvalidIdentifier { what, value } => {
                write!(f, "Invalid {} '{}'", what, value)
            }
        }
    }
}

impl Error for LayoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LayoutError::InvalidHex { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn parse_hex(value: &str) -> Result<u32, LayoutError> {
    util::parse_hex(value)
        .map_err(|source| LayoutError::InvalidHex { value: value.to_string(), source })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeripheralBlock {
    pub offset: u32,
    pub type_: String,
    pub name: String,
    pub count: u32,
    pub aligned: bool,
}

impl PeripheralBlock {
    pub fn new(offset: u32, type_: &str, name: &str) -> Self {
        Self {
            offset,
            type_: type_.to_string(),
            name: name.to_string(),
            count: 1,
            aligned: false,
        }
    }

    pub fn with_count(self, count: u32) -> Self {
        Self { count, ..self }
    }

    pub fn with_aligned(self, aligned: bool) -> Self {
        Self { aligned, ..self }
    }
}

impl TryFrom<BlockConfig> for PeripheralBlock {
    type Error = LayoutError;

    fn try_from(config: BlockConfig) -> Result<Self, LayoutError> {
        Ok(Self {
            offset: parse_hex(&config.offset)?,
            type_: config.type_,
            name: config.name,
            count: config.count.unwrap_or(1),
            aligned: config.aligned.unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDomain {
    address: u32,
    name: String,
    blocks: Vec<PeripheralBlock>,
}

impl MemoryDomain {
    /// Blocks must come sorted by strictly ascending offset. No sorting
    /// happens here: the order of the fields is the order of the input.
    pub fn new(address: u32, name: &str, blocks: Vec<PeripheralBlock>) -> Result<Self, LayoutError> {
        if !util::is_identifier(name) {
            return Err(LayoutError::InvalidIdentifier { what: "domain name", value: name.to_string() });
        }

        for block in &blocks {
            if !util::is_identifier(&block.name) {
                return Err(LayoutError::InvalidIdentifier { what: "field name", value: block.name.clone() });
            }
            if !util::is_type_name(&block.type_) {
                return Err(LayoutError::InvalidIdentifier { what: "type name", value: block.type_.clone() });
            }
            if block.count == 0 {
                return Err(LayoutError::InvalidCount { domain: name.to_string(), block: block.name.clone() });
            }
        }

        for pair in blocks.windows(2) {
            let (previous, block) = (&pair[0], &pair[1]);
            if block.offset <= previous.offset {
                return Err(LayoutError::UnsortedBlocks {
                    domain: name.to_string(),
                    block: block.name.clone(),
                    offset: block.offset,
                    previous: previous.offset,
                });
            }
        }

        Ok(Self { address, name: name.to_string(), blocks })
    }

    /// `index` is the position of the domain in its document, used for
    /// error reporting.
    pub fn from_config(index: usize, config: DomainConfig) -> Result<Self, LayoutError> {
        let missing = |attribute| LayoutError::MalformedDomain { domain: index, missing: attribute };

        let address = config.address.ok_or_else(|| missing("address"))?;
        let blocks = config.blocks.ok_or_else(|| missing("blocks"))?;
        let name = config.name.ok_or_else(|| missing("name"))?;

        let address = parse_hex(&address)?;
        let blocks = blocks.into_iter()
            .map(PeripheralBlock::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(address, &name, blocks)
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blocks(&self) -> &[PeripheralBlock] {
        &self.blocks
    }

    pub fn type_name(&self) -> String {
        format!("{}_Type", self.name)
    }

    pub fn generate(&self) -> GeneratedStructure {
        let mut fields = vec![];
        let mut reserved = 0;
        let mut previous: Option<&PeripheralBlock> = None;

        debug!("Domain name={} base=0x{:08x} blocks={}", self.name, self.address, self.blocks.len());

        if self.blocks.is_empty() {
            warn!("Domain {} has no blocks", self.name);
        }

        for block in &self.blocks {
            // `aligned` only concerns the gap after the previous block
            let size = match previous {
                None if block.offset != 0 => Some(PaddingSize::Bytes(block.offset)),
                None => None,
                Some(_) if block.aligned => None,
                Some(prev) => Some(PaddingSize::Gap {
                    delta: block.offset - prev.offset,
                    type_: prev.type_.clone(),
                    count: prev.count,
                }),
            };

            if let Some(size) = size {
                trace!("{} RESERVED{} [{}]", self.name, reserved, size);
                fields.push(Field::Reserved { index: reserved, size });
                reserved += 1;
            }

            trace!("{} offset=0x{:08x} {}", self.name, block.offset, block.name);
            fields.push(Field::Named {
                type_: block.type_.clone(),
                name: block.name.clone(),
                count: block.count,
            });

            previous = Some(block);
        }

        GeneratedStructure { type_name: self.type_name(), fields }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GenerateOptions {
    /// Follow the structures with `extern <name>_Type <name>;` declarations
    pub extern_decls: bool,
}

pub fn parse_domains(text: &str, format: Format) -> Result<Vec<MemoryDomain>> {
    config::parse_document(text, format)?
        .into_iter()
        .enumerate()
        .map(|(i, c)| MemoryDomain::from_config(i, c).map_err(anyhow::Error::from))
        .collect()
}

/// Renders every domain of a document. The whole document is validated
/// before anything is rendered.
pub fn generate_document(text: &str, format: Format, opts: GenerateOptions) -> Result<String> {
    let domains = parse_domains(text, format)?;

    let mut out = domains.iter()
        .map(|d| d.generate().to_string())
        .collect::<Vec<_>>()
        .join("\n");

    if opts.extern_decls && !domains.is_empty() {
        out.push('\n');
        for d in &domains {
            out.push_str(&format!("extern {} {};\n", d.type_name(), d.name()));
        }
    }

    Ok(out)
}

pub fn generate_file(path: impl AsRef<Path>, opts: GenerateOptions) -> Result<String> {
    let path = path.as_ref();
    info!("Processing {}", path.display());

    let text = util::read_file_str(path)?;
    generate_document(&text, Format::from_path(path), opts)
        .with_context(|| format!("Failed to process {}", path.display()))
}
