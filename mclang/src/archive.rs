//! Reading translation resources out of mod packages.
//!
//! Mods keep their translations at `assets/<namespace>/lang/<code>.json`. The
//! namespace is not known up front, so [`locate_resources`] discovers it by
//! listing entries and matching that layout.

use std::{
    fs::File,
    io::{BufReader, Read, Seek, Write},
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;
use regex::Regex;
use zip::{ZipArchive, ZipWriter, result::ZipError, write::SimpleFileOptions};

use crate::{error::Error, traits::ArchiveSource};

lazy_static! {
    static ref LANG_ENTRY_REGEX: Regex =
        Regex::new(r"(?i)(?:^|/)assets/([^/]+)/lang/([^/]+)\.json$").unwrap();
}

/// A zip-formatted mod package (`.jar`) opened for reading.
pub struct JarArchive {
    path: PathBuf,
    zip: ZipArchive<BufReader<File>>,
}

impl JarArchive {
    /// Opens `path` as a zip archive. Anything that is not a readable zip
    /// fails with [`Error::NotAnArchive`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::not_an_archive(path, e))?;
        let zip =
            ZipArchive::new(BufReader::new(file)).map_err(|e| Error::not_an_archive(path, e))?;
        Ok(JarArchive {
            path: path.to_path_buf(),
            zip,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArchiveSource for JarArchive {
    fn entry_names(&self) -> Vec<String> {
        self.zip.file_names().map(str::to_string).collect()
    }

    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, Error> {
        let mut entry = match self.zip.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Err(Error::EntryNotFound(name.to_string())),
            Err(e) => return Err(Error::not_an_archive(&self.path, e)),
        };
        // The declared size comes from the archive header and may be forged.
        let capacity = entry_size_hint(entry.size());
        read_capped(&mut entry, capacity, MAX_ENTRY_BYTES)
            .map_err(|e| Error::not_an_archive(&self.path, format!("{}: {}", name, e)))
    }
}

/// Largest lang document read from an archive. Real ones are a few hundred
/// kilobytes at most.
pub const MAX_ENTRY_BYTES: u64 = 32 * 1024 * 1024;

const MAX_INITIAL_CAPACITY: u64 = 1024 * 1024;

fn entry_size_hint(declared: u64) -> usize {
    declared.min(MAX_INITIAL_CAPACITY) as usize
}

/// Reads `reader` to the end, failing once more than `limit` bytes arrive.
fn read_capped<R: Read>(reader: R, capacity: usize, limit: u64) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(capacity);
    reader.take(limit.saturating_add(1)).read_to_end(&mut buf)?;
    if buf.len() as u64 > limit {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("entry larger than {} bytes", limit),
        ));
    }
    Ok(buf)
}

/// An archive held entirely in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: Vec<(String, Vec<u8>)>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.entries.push((name.into(), bytes.into()));
        self
    }

    /// Serializes the entries as a zip file, e.g. to build a `.jar` fixture
    /// on disk.
    pub fn write_zip<W: Write + Seek>(&self, writer: W) -> Result<(), Error> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default();
        for (name, bytes) in &self.entries {
            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::Io(std::io::Error::other(e)))?;
            zip.write_all(bytes)?;
        }
        zip.finish()
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        Ok(())
    }

    /// Writes the archive to `path` as a zip file.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::write(path, e))?;
        self.write_zip(file)
    }
}

impl ArchiveSource for MemoryArchive {
    fn entry_names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, Error> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))
    }
}

/// Entry paths of the reference and target documents inside one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangResources {
    pub namespace: String,
    pub reference: String,
    pub target: Option<String>,
}

#[derive(Debug, Default)]
struct NamespaceFiles {
    name: String,
    reference: Option<String>,
    target: Option<String>,
}

/// Splits a lang entry path into `(namespace, language code)`.
pub fn parse_lang_entry(name: &str) -> Option<(&str, &str)> {
    let caps = LANG_ENTRY_REGEX.captures(name)?;
    let namespace = caps.get(1)?.as_str();
    let code = caps.get(2)?.as_str();
    Some((namespace, code))
}

/// Picks the namespace to compare and the entry paths of its reference and
/// target documents. Returns `None` when no namespace has a reference
/// document.
///
/// Selection order:
/// 1. a namespace equal to `mod_id` (case-insensitive) that has a reference;
/// 2. the first namespace, in archive order, with both reference and target;
/// 3. the first namespace, in archive order, with a reference.
pub fn locate_resources(
    entry_names: &[String],
    mod_id: &str,
    reference_lang: &str,
    target_lang: &str,
) -> Option<LangResources> {
    let mut namespaces: Vec<NamespaceFiles> = Vec::new();
    for name in entry_names {
        let Some((namespace, code)) = parse_lang_entry(name) else {
            continue;
        };
        let idx = match namespaces.iter().position(|ns| ns.name == namespace) {
            Some(idx) => idx,
            None => {
                namespaces.push(NamespaceFiles {
                    name: namespace.to_string(),
                    ..NamespaceFiles::default()
                });
                namespaces.len() - 1
            }
        };
        let files = &mut namespaces[idx];
        if code.eq_ignore_ascii_case(reference_lang) && files.reference.is_none() {
            files.reference = Some(name.clone());
        } else if code.eq_ignore_ascii_case(target_lang) && files.target.is_none() {
            files.target = Some(name.clone());
        }
    }

    let chosen = namespaces
        .iter()
        .position(|ns| ns.reference.is_some() && ns.name.eq_ignore_ascii_case(mod_id))
        .or_else(|| {
            namespaces
                .iter()
                .position(|ns| ns.reference.is_some() && ns.target.is_some())
        })
        .or_else(|| namespaces.iter().position(|ns| ns.reference.is_some()))?;

    for (idx, ns) in namespaces.iter().enumerate() {
        if idx != chosen {
            tracing::debug!(event = "namespace_ignored", mod_id, namespace = %ns.name);
        }
    }

    let ns = namespaces.swap_remove(chosen);
    Some(LangResources {
        namespace: ns.name,
        reference: ns.reference?,
        target: ns.target,
    })
}
