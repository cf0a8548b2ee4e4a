// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::prelude::*;
use std::path::Path;
use anyhow::{Context, Result};
use env_logger::fmt::Color;
use log::LevelFilter;
use regex::Regex;

lazy_static::lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    // "uint32_t", "struct foo", "volatile uint8_t", "uint32_t *", "char * const"
    static ref TYPE_NAME: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\s*\*|\s+[A-Za-z_][A-Za-z0-9_]*)*$").unwrap();
}

pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut buf = Vec::new();
    file.read_to_end(&mut buf)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(buf)
}

pub fn read_file_str(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let content = read_file(path)?;
    let str = String::from_utf8(content)
        .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
    Ok(str)
}

/// Parses a base-16 string, with or without a `0x` prefix. `_` separators
/// are accepted, as in `0x4000_0000`.
pub fn parse_hex(s: &str) -> Result<u32, std::num::ParseIntError> {
    let s = s.trim();
    let digits = s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(&digits.replace('_', ""), 16)
}

pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

pub fn is_type_name(s: &str) -> bool {
    TYPE_NAME.is_match(s)
}

/// Logs go to stderr: stdout belongs to the generated output.
pub fn init_logging(level: u8) {
    let lf = match level {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(lf)
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            let mut style = buf.style();
            let level = match record.level() {
                log::Level::Error => style.set_color(Color::Red).set_intense(true).value("ERROR"),
                log::Level::Warn =>  style.set_color(Color::Yellow).set_intense(true).value("WARN "),
                log::Level::Info =>  style.set_color(Color::Green).set_intense(true).value("INFO "),
                log::Level::Debug => style.set_color(Color::Cyan).set_intense(true).value("DEBUG"),
                log::Level::Trace => style.set_color(Color::Blue).set_intense(true).value("TRACE"),
            };

            writeln!(buf, "{} {}", level, record.args())
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_with_and_without_prefix() {
        assert_eq!(parse_hex("0x50000000").unwrap(), 0x5000_0000);
        assert_eq!(parse_hex("0X1f").unwrap(), 0x1F);
        assert_eq!(parse_hex("400").unwrap(), 0x400);
        assert_eq!(parse_hex("0x4000_0000").unwrap(), 0x4000_0000);
    }

    #[test]
    fn bad_hex_is_rejected() {
        assert!(parse_hex("0xZZ").is_err());
        assert!(parse_hex("").is_err());
        assert!(parse_hex("0x1_0000_0000").is_err());
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("RESERVED0"));
        assert!(is_identifier("_gpio"));
        assert!(!is_identifier("0abc"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier(""));

        assert!(is_type_name("uint32_t"));
        assert!(is_type_name("struct foo"));
        assert!(is_type_name("uint32_t *"));
        assert!(is_type_name("uint32_t*"));
        assert!(is_type_name("const char * const"));
        assert!(!is_type_name("foo;"));
        assert!(!is_type_name("*foo"));
        assert!(!is_type_name("uint32_t[4]"));
        assert!(!is_type_name("uint32_t "));
    }
}
