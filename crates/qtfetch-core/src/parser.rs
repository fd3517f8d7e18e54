//! `Updates.xml` parsing and validation.
//!
//! The document is first streamed into a minimal element tree so that a tag
//! appearing once and a tag appearing many times look the same (a list of
//! children). The tree is then converted into [`Manifest`] records, checking
//! the fixed application markers and the required field set of every
//! package. Nothing partial is ever returned.

use std::collections::HashSet;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

use qtfetch_schema::{
    APPLICATION_NAME, APPLICATION_VERSION, CHECKSUM, Manifest, PackageName, PackageRecord,
};

/// Fields every `PackageUpdate` must carry, in document order.
pub const REQUIRED_PACKAGE_FIELDS: [&str; 10] = [
    "Name",
    "DisplayName",
    "Description",
    "Version",
    "ReleaseDate",
    "Default",
    "AutoDependOn",
    "Script",
    "DownloadableArchives",
    "SHA1",
];

/// Errors that can occur while parsing a manifest document.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The document is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document ended with elements still open, or had no root.
    #[error("Truncated document: {0}")]
    Truncated(String),

    /// A fixed marker is missing or does not hold its expected value.
    #[error("Schema violation: {field} is '{found}', expected '{expected}'")]
    SchemaViolation {
        /// Element that failed the check.
        field: &'static str,
        /// Required value.
        expected: &'static str,
        /// Value found, or `<missing>`.
        found: String,
    },

    /// A package entry lacks a required field or holds an invalid value.
    #[error("Malformed package entry #{index} ({name}): {field} {problem}")]
    MalformedEntry {
        /// Zero-based position of the entry in the document.
        index: usize,
        /// Package name if it could be read, otherwise `<unnamed>`.
        name: String,
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        problem: String,
    },
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            ..Self::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Token value of a fixed-vocabulary field (markers, `Default`).
    fn token(&self) -> &str {
        self.text.trim()
    }
}

fn read_tree(document: &str) -> Result<Element, ManifestError> {
    let mut reader = Reader::from_str(document);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::open(&start)),
            Event::Empty(start) => attach(&mut stack, &mut root, Element::open(&start))?,
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ManifestError::Truncated("unexpected closing tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ManifestError::Truncated(format!(
            "<{}> is never closed",
            open.name
        )));
    }

    root.ok_or_else(|| ManifestError::Truncated("no root element".into()))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ManifestError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(ManifestError::Truncated(format!(
            "second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

/// Parse and validate a manifest document.
///
/// # Errors
///
/// Returns [`ManifestError::Xml`] or [`ManifestError::Truncated`] for broken
/// markup, [`ManifestError::SchemaViolation`] if the root or one of the fixed
/// `ApplicationName` / `ApplicationVersion` / `Checksum` markers is wrong, and
/// [`ManifestError::MalformedEntry`] if any package lacks a required field.
pub fn parse(document: &str) -> Result<Manifest, ManifestError> {
    let root = read_tree(document)?;

    if root.name != "Updates" {
        return Err(ManifestError::SchemaViolation {
            field: "root element",
            expected: "Updates",
            found: root.name,
        });
    }

    let application_name = marker(&root, "ApplicationName", APPLICATION_NAME)?;
    let application_version = marker(&root, "ApplicationVersion", APPLICATION_VERSION)?;
    let checksum = marker(&root, "Checksum", CHECKSUM)?;

    let mut packages = Vec::new();
    let mut seen = HashSet::new();

    for (index, element) in root.children_named("PackageUpdate").enumerate() {
        let record = package_record(index, element)?;
        if !seen.insert(record.name.clone()) {
            return Err(ManifestError::MalformedEntry {
                index,
                name: record.name.to_string(),
                field: "Name",
                problem: "duplicates an earlier entry".into(),
            });
        }
        packages.push(record);
    }

    tracing::debug!("Parsed manifest with {} packages", packages.len());

    Ok(Manifest {
        application_name,
        application_version,
        checksum,
        packages,
    })
}

fn marker(
    root: &Element,
    field: &'static str,
    expected: &'static str,
) -> Result<String, ManifestError> {
    match root.child(field) {
        Some(element) if element.token() == expected => Ok(expected.to_string()),
        Some(element) => Err(ManifestError::SchemaViolation {
            field,
            expected,
            found: element.token().to_string(),
        }),
        None => Err(ManifestError::SchemaViolation {
            field,
            expected,
            found: "<missing>".into(),
        }),
    }
}

fn package_record(index: usize, element: &Element) -> Result<PackageRecord, ManifestError> {
    let name = element
        .child("Name")
        .map(|n| n.text.clone())
        .filter(|n| !n.is_empty());

    let malformed = |field: &'static str, problem: &str| ManifestError::MalformedEntry {
        index,
        name: name.clone().unwrap_or_else(|| "<unnamed>".into()),
        field,
        problem: problem.to_string(),
    };

    for field in REQUIRED_PACKAGE_FIELDS {
        if element.child(field).is_none() {
            return Err(malformed(field, "is missing"));
        }
    }

    let Some(name) = name.clone() else {
        return Err(malformed("Name", "is empty"));
    };

    let default = match element.child("Default").map_or("", Element::token) {
        v if v.eq_ignore_ascii_case("true") => true,
        v if v.eq_ignore_ascii_case("false") => false,
        other => return Err(malformed("Default", &format!("has invalid value '{other}'"))),
    };

    let version = field_text(element, "Version");
    if version.is_empty() {
        return Err(malformed("Version", "is empty"));
    }

    Ok(PackageRecord {
        name: PackageName::new(name),
        display_name: field_text(element, "DisplayName").to_string(),
        description: field_text(element, "Description").to_string(),
        version: version.to_string(),
        release_date: field_text(element, "ReleaseDate").to_string(),
        default,
        auto_depend_on: split_list(field_text(element, "AutoDependOn"))
            .map(PackageName::from)
            .collect(),
        script: field_text(element, "Script").to_string(),
        downloadable_archives: archive_list(field_text(element, "DownloadableArchives")),
        sha1: field_text(element, "SHA1").to_string(),
    })
}

fn field_text<'e>(element: &'e Element, field: &str) -> &'e str {
    element.child(field).map_or("", |c| c.text.as_str())
}

/// Comma-separated list with whitespace and empty items dropped.
fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// `DownloadableArchives` listing: `a.7z, b.7z`.
///
/// Only the whitespace around separators is removed. Empty items between
/// commas are kept so the archive resolver can reject them.
fn archive_list(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',')
        .map(|item| item.trim_matches(|c: char| c.is_ascii_whitespace()).to_string())
        .collect()
}
