//! Embedded metadata tag extraction
//!
//! Module sources carry their metadata as comments of the form
//! `/* $ModDesc: Does a thing */` or, on a line of its own,
//! `/// $ModDesc: Does a thing`. The scan is purely textual: it does not
//! care whether the comment sits inside code, strings, or preprocessor
//! blocks.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Tags that become manifest directives, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    Depends,
    Conflicts,
    Description,
    Mask,
}

impl Directive {
    /// All directives in the order they appear under a module header
    pub const ALL: [Directive; 4] = [
        Directive::Depends,
        Directive::Conflicts,
        Directive::Description,
        Directive::Mask,
    ];

    /// Tag name as written in module sources
    pub fn tag(self) -> &'static str {
        match self {
            Directive::Depends => "ModDepends",
            Directive::Conflicts => "ModConflicts",
            Directive::Description => "ModDesc",
            Directive::Mask => "ModMask",
        }
    }

    /// Keyword written into the manifest
    pub fn keyword(self) -> &'static str {
        match self {
            Directive::Depends => "depends",
            Directive::Conflicts => "conflicts",
            Directive::Description => "description",
            Directive::Mask => "mask",
        }
    }
}

impl Serialize for Directive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.keyword())
    }
}

/// Values of every tag found in one file
///
/// Tag names are case-insensitive. Values of a repeated tag keep the order
/// in which they appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    values: HashMap<String, Vec<String>>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tag: &str, value: impl Into<String>) {
        self.values
            .entry(tag.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// Values recorded for a tag, empty if the tag never appeared
    pub fn get(&self, tag: &str) -> &[String] {
        self.values
            .get(&tag.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn directive(&self, directive: Directive) -> &[String] {
        self.get(directive.tag())
    }

    pub fn contains(&self, tag: &str) -> bool {
        !self.get(tag).is_empty()
    }

    /// Number of distinct tag names
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn tag_pattern() -> &'static Regex {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    TAG_REGEX.get_or_init(|| {
        Regex::new(concat!(
            r"(?im)",
            r"/\*\s*\$(?P<block_tag>[^\s:]+):\s*(?P<block_value>.+?)\s*\*/",
            r"|",
            r"^[ \t]*///[ \t]*\$(?P<line_tag>[^\s:]+):(?P<line_value>.*)$",
        ))
        .expect("valid regex")
    })
}

/// Extracts every `$Tag: value` comment from source text
pub fn extract_tags(text: &str) -> TagSet {
    let mut tags = TagSet::new();

    for caps in tag_pattern().captures_iter(text) {
        let (tag, value) = match (caps.name("block_tag"), caps.name("block_value")) {
            (Some(tag), Some(value)) => (tag, value),
            _ => match (caps.name("line_tag"), caps.name("line_value")) {
                (Some(tag), Some(value)) => (tag, value),
                _ => continue,
            },
        };

        let value = value.as_str().trim();
        if value.is_empty() {
            continue;
        }
        tags.push(tag.as_str(), value);
    }

    tags
}
