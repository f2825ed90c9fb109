// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property file adapter.
//!
//! This module reads and writes line-oriented `key=value` property files using
//! the familiar `.properties` escaping rules, and locates the per-instance
//! override file in OS-appropriate directories.

use crate::domain::{PropertyError, Result};
use crate::ports::{FormatError, PropertyFormat};
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Maximum allowed size for a property file (10MB)
const MAX_PROPERTIES_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Comment written at the top of every saved override file.
pub const GENERATED_HEADER: &str = "This file is automatically generated, DO NOT EDIT";

/// File name used for the override file in the default location.
pub const DEFAULT_OVERRIDE_FILE: &str = "instance.properties";

/// `.properties` format.
///
/// Supported syntax:
/// - `#` and `!` start comment lines; blank lines are ignored
/// - the key ends at the first unescaped `=`, `:` or whitespace
/// - `\t`, `\n`, `\r`, `\f`, `\uXXXX` and `\<char>` escapes
/// - a line ending in an odd number of backslashes continues on the next line
///
/// Entries with an empty key or a malformed `\u` escape are errors.
///
/// # Examples
///
/// ```rust
/// use hexprops::adapters::PropertiesFormat;
/// use hexprops::ports::PropertyFormat;
///
/// let format = PropertiesFormat::new();
/// let values = format.parse("imq.port = 7676\nimq.hostname: broker1\n").unwrap();
/// assert_eq!(values.get("imq.port"), Some(&"7676".to_string()));
/// assert_eq!(values.get("imq.hostname"), Some(&"broker1".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertiesFormat;

impl PropertiesFormat {
    /// Creates a new properties format.
    pub fn new() -> Self {
        PropertiesFormat
    }

    /// Joins physical lines into logical lines, dropping comments and blanks.
    ///
    /// Returns each logical line with the 1-based number of its first line.
    fn logical_lines(content: &str) -> Vec<(usize, String)> {
        let mut result = Vec::new();
        let mut pending: Option<(usize, String)> = None;

        for (index, raw) in physical_lines(content).into_iter().enumerate() {
            let line = raw.trim_start_matches(is_separator_space);

            let (start, mut buffer) = match pending.take() {
                Some(continued) => continued,
                None => {
                    if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                        continue;
                    }
                    (index + 1, String::new())
                }
            };

            let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
            if trailing % 2 == 1 {
                buffer.push_str(&line[..line.len() - 1]);
                pending = Some((start, buffer));
            } else {
                buffer.push_str(line);
                result.push((start, buffer));
            }
        }

        if let Some(last) = pending {
            result.push(last);
        }
        result
    }

    /// Splits a logical line into its raw (still escaped) key and value.
    fn split_entry(line: &str) -> (&str, &str) {
        let mut escaped = false;
        let mut key_end = line.len();
        let mut separator_is_space = false;

        for (i, c) in line.char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                '=' | ':' => {
                    key_end = i;
                    break;
                }
                c if is_separator_space(c) => {
                    key_end = i;
                    separator_is_space = true;
                    break;
                }
                _ => {}
            }
        }

        let key = &line[..key_end];
        let mut rest = &line[key_end..];
        if separator_is_space {
            rest = rest.trim_start_matches(is_separator_space);
            if let Some(stripped) = rest.strip_prefix(|c: char| c == '=' || c == ':') {
                rest = stripped;
            }
        } else if !rest.is_empty() {
            rest = &rest[1..];
        }
        (key, rest.trim_start_matches(is_separator_space))
    }

    /// Resolves backslash escapes.
    fn unescape(raw: &str, line: usize) -> std::result::Result<String, FormatError> {
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        let mut high_surrogate: Option<u16> = None;

        while let Some(c) = chars.next() {
            if c != '\\' {
                if high_surrogate.is_some() {
                    return Err(FormatError::new(line, "unpaired surrogate in \\u escape"));
                }
                out.push(c);
                continue;
            }

            let Some(next) = chars.next() else { break };
            if next != 'u' {
                if high_surrogate.is_some() {
                    return Err(FormatError::new(line, "unpaired surrogate in \\u escape"));
                }
                out.push(match next {
                    't' => '\t',
                    'n' => '\n',
                    'r' => '\r',
                    'f' => '\u{0c}',
                    other => other,
                });
                continue;
            }

            let hex: String = chars.by_ref().take(4).collect();
            let unit = if hex.len() == 4 && hex.chars().all(|h| h.is_ascii_hexdigit()) {
                u16::from_str_radix(&hex, 16).ok()
            } else {
                None
            }
            .ok_or_else(|| FormatError::new(line, "malformed \\uxxxx encoding"))?;

            match (high_surrogate.take(), unit) {
                (None, 0xD800..=0xDBFF) => high_surrogate = Some(unit),
                (Some(high), 0xDC00..=0xDFFF) => {
                    let decoded = char::decode_utf16([high, unit])
                        .next()
                        .and_then(|r| r.ok())
                        .ok_or_else(|| FormatError::new(line, "invalid surrogate pair"))?;
                    out.push(decoded);
                }
                (None, _) => match char::from_u32(u32::from(unit)) {
                    Some(decoded) => out.push(decoded),
                    None => return Err(FormatError::new(line, "unpaired surrogate in \\u escape")),
                },
                (Some(_), _) => {
                    return Err(FormatError::new(line, "unpaired surrogate in \\u escape"))
                }
            }
        }

        if high_surrogate.is_some() {
            return Err(FormatError::new(line, "unpaired surrogate in \\u escape"));
        }
        Ok(out)
    }

    /// Escapes a key or value for writing.
    fn escape(text: &str, is_key: bool, out: &mut String) {
        for (i, c) in text.chars().enumerate() {
            match c {
                ' ' if is_key || i == 0 => out.push_str("\\ "),
                '\\' => out.push_str("\\\\"),
                '\t' => out.push_str("\\t"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\u{0c}' => out.push_str("\\f"),
                '=' | ':' | '#' | '!' => {
                    out.push('\\');
                    out.push(c);
                }
                c if c.is_control() => {
                    let mut units = [0u16; 2];
                    for unit in c.encode_utf16(&mut units) {
                        out.push_str(&format!("\\u{:04X}", unit));
                    }
                }
                c => out.push(c),
            }
        }
    }
}

/// Splits `content` on `\n`, `\r` or `\r\n`. A trailing terminator does
/// not produce an empty final line.
fn physical_lines(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = content.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\n' => {
                lines.push(&content[start..i]);
                start = i + 1;
            }
            '\r' => {
                lines.push(&content[start..i]);
                start = i + 1;
                if let Some(&(_, '\n')) = chars.peek() {
                    chars.next();
                    start += 1;
                }
            }
            _ => {}
        }
    }

    if start < content.len() {
        lines.push(&content[start..]);
    }
    lines
}

fn is_separator_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{0c}')
}

impl PropertyFormat for PropertiesFormat {
    fn parse(&self, content: &str) -> std::result::Result<BTreeMap<String, String>, FormatError> {
        let mut result = BTreeMap::new();
        for (line, logical) in Self::logical_lines(content) {
            let (raw_key, raw_value) = Self::split_entry(&logical);
            let key = Self::unescape(raw_key, line)?;
            if key.is_empty() {
                return Err(FormatError::new(line, "entry has an empty key"));
            }
            let value = Self::unescape(raw_value, line)?;
            result.insert(key, value);
        }
        Ok(result)
    }

    fn render(&self, header: &str, values: &BTreeMap<String, String>) -> String {
        let mut out = String::new();
        out.push('#');
        out.push_str(header);
        out.push('\n');
        for (key, value) in values {
            Self::escape(key, true, &mut out);
            out.push('=');
            Self::escape(value, false, &mut out);
            out.push('\n');
        }
        out
    }

    fn supported_extensions(&self) -> &[&str] {
        &["properties"]
    }
}

/// Reads and writes property files through a [`PropertyFormat`].
///
/// # Examples
///
/// ```rust,no_run
/// use hexprops::adapters::PropertiesFile;
/// use std::collections::BTreeMap;
///
/// # fn main() -> hexprops::domain::Result<()> {
/// let file = PropertiesFile::new();
/// let mut values = BTreeMap::new();
/// values.insert("imq.port".to_string(), "7676".to_string());
/// file.write("/var/imq/instance.properties", &values).unwrap();
/// let loaded = file.read("/var/imq/instance.properties")?;
/// assert_eq!(loaded, values);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PropertiesFile {
    format: Arc<dyn PropertyFormat>,
}

impl PropertiesFile {
    /// Creates a property file handler using [`PropertiesFormat`].
    pub fn new() -> Self {
        Self::with_format(Arc::new(PropertiesFormat::new()))
    }

    /// Creates a property file handler using a custom format.
    pub fn with_format(format: Arc<dyn PropertyFormat>) -> Self {
        Self { format }
    }

    /// Reads every entry of the file at `path`.
    ///
    /// Files that are not valid UTF-8 are decoded as Latin-1.
    ///
    /// # Errors
    ///
    /// - [`PropertyError::Io`] if the file cannot be read or is too large
    /// - [`PropertyError::Parse`] if an entry is malformed
    pub fn read(&self, path: impl AsRef<Path>) -> Result<BTreeMap<String, String>> {
        let path = path.as_ref();
        let io_error = |source| PropertyError::Io {
            path: path.to_path_buf(),
            source,
        };

        let metadata = fs::metadata(path).map_err(io_error)?;
        if metadata.len() > MAX_PROPERTIES_FILE_SIZE {
            return Err(io_error(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "property file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    MAX_PROPERTIES_FILE_SIZE
                ),
            )));
        }

        let bytes = fs::read(path).map_err(io_error)?;
        let content = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
        };

        self.format
            .parse(&content)
            .map_err(|e| PropertyError::Parse {
                path: path.to_path_buf(),
                line: e.line,
                message: e.message,
            })
    }

    /// Replaces the file at `path` with `values`, preceded by [`GENERATED_HEADER`].
    ///
    /// Missing parent directories are created. The file is truncated and
    /// rewritten in place, so a crash in the middle of the write can leave a
    /// partial file behind.
    pub fn write(&self, path: impl AsRef<Path>, values: &BTreeMap<String, String>) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = self.format.render(GENERATED_HEADER, values);
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()
    }

    /// Returns the file extensions handled by the configured format.
    pub fn supported_extensions(&self) -> &[&str] {
        self.format.supported_extensions()
    }
}

impl Default for PropertiesFile {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PropertiesFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertiesFile")
            .field("extensions", &self.format.supported_extensions())
            .finish()
    }
}

/// Returns the OS-appropriate location of the override file.
///
/// Uses the `directories` crate to find the configuration directory for
/// `app_name`, e.g. `~/.config/<app_name>/instance.properties` on Linux.
///
/// # Examples
///
/// ```rust,no_run
/// use hexprops::adapters::default_override_path;
///
/// let path = default_override_path("imqbroker", "org.example").unwrap();
/// assert!(path.ends_with("instance.properties"));
/// ```
pub fn default_override_path(app_name: &str, qualifier: &str) -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from(qualifier, "", app_name).ok_or_else(|| PropertyError::Config {
        message: "Failed to determine project directories".to_string(),
    })?;

    Ok(proj_dirs.config_dir().join(DEFAULT_OVERRIDE_FILE))
}
