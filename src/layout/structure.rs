// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;

/// Annotation token put in front of padding fields.
pub const RESERVED_ANNOTATION: &str = "__ne__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaddingSize {
    /// Literal byte count, from the domain base to the first block
    Bytes(u32),
    /// Distance between two block offsets minus the size of the earlier
    /// block. The generator knows nothing about type sizes, so the
    /// subtraction is left to the C compiler.
    Gap { delta: u32, type_: String, count: u32 },
}

impl fmt::Display for PaddingSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaddingSize::Bytes(n) => write!(f, "0x{:X}", n),
            PaddingSize::Gap { delta, type_, count: 1 } => {
                write!(f, "0x{:X} - sizeof({})", delta, type_)
            }
            PaddingSize::Gap { delta, type_, count } => {
                write!(f, "0x{:X} - sizeof({}) * {}", delta, type_, count)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Reserved { index: usize, size: PaddingSize },
    Named { type_: String, name: String, count: u32 },
}

impl Field {
    pub fn name(&self) -> String {
        match self {
            Field::Reserved { index, .. } => format!("RESERVED{}", index),
            Field::Named { name, .. } => name.clone(),
        }
    }

    pub fn is_reserved(&self) -> bool {
        matches!(self, Field::Reserved { .. })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Reserved { size, .. } => {
                write!(f, "{} uint8_t {}[{}];", RESERVED_ANNOTATION, self.name(), size)
            }
            Field::Named { type_, name, count: 1 } => write!(f, "{} {};", type_, name),
            Field::Named { type_, name, count } => write!(f, "{} {}[{}];", type_, name, count),
        }
    }
}

/// A `typedef struct` declaration, ready to be printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedStructure {
    pub type_name: String,
    pub fields: Vec<Field>,
}

impl GeneratedStructure {
    pub fn reserved_fields(&self) -> impl Iterator<Item=&Field> {
        self.fields.iter().filter(|f| f.is_reserved())
    }
}

impl fmt::Display for GeneratedStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "typedef struct")?;
        writeln!(f, "{{")?;
        for field in &self.fields {
            writeln!(f, "  {}", field)?;
        }
        writeln!(f, "}} {};", self.type_name)
    }
}
