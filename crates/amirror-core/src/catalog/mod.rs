//! Catalog: the ordered, immutable list of `(name, source URL)` pairs to mirror.
//!
//! Built once from catalog text (a file, or the built-in list) and validated
//! up front: malformed lines, empty or unsafe names, duplicate names and
//! unparseable URLs are all `ConfigError`s before any network or filesystem work.

mod error;
mod name;
mod parse;

pub use error::ConfigError;
pub use name::is_valid_entry_name;

use std::collections::HashMap;
use std::path::Path;
use url::Url;

/// Editor plugins mirrored when no catalog file is configured.
pub const BUILTIN_CATALOG: &str = "\
ack.vim https://github.com/mileszs/ack.vim
ctrlp.vim https://github.com/ctrlpvim/ctrlp.vim
goyo.vim https://github.com/junegunn/goyo.vim
gruvbox https://github.com/morhetz/gruvbox
lightline.vim https://github.com/itchyny/lightline.vim
limelight.vim https://github.com/junegunn/limelight.vim
nerdtree https://github.com/scrooloose/nerdtree
tagbar https://github.com/majutsushi/tagbar
vim-gitgutter https://github.com/airblade/vim-gitgutter
vim-multiple-cursors https://github.com/terryma/vim-multiple-cursors
vim-surround https://github.com/tpope/vim-surround
";

/// One catalog line: a unique name and the URL its archive is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    name: String,
    source_url: Url,
}

impl CatalogEntry {
    /// Builds a validated entry. `line` is only used for error messages.
    pub fn new(line: usize, name: &str, source_url: &str) -> Result<Self, ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::EmptyName { line });
        }
        if !is_valid_entry_name(name) {
            return Err(ConfigError::InvalidName {
                line,
                name: name.to_string(),
            });
        }
        let url = Url::parse(source_url).map_err(|e| ConfigError::InvalidUrl {
            line,
            url: source_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https" | "file") {
            return Err(ConfigError::InvalidUrl {
                line,
                url: source_url.to_string(),
                reason: format!("unsupported scheme {:?}", url.scheme()),
            });
        }
        Ok(Self {
            name: name.to_string(),
            source_url: url,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_url(&self) -> &Url {
        &self.source_url
    }
}

/// Ordered set of catalog entries with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Parses catalog text (`<name> <sourceURL>` per line). No side effects.
    pub fn load(text: &str) -> Result<Self, ConfigError> {
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        let mut entries = Vec::new();
        for raw in parse::parse_lines(text)? {
            if let Some(&first) = first_seen.get(raw.name) {
                return Err(ConfigError::DuplicateName {
                    line: raw.line,
                    name: raw.name.to_string(),
                    first,
                });
            }
            entries.push(CatalogEntry::new(raw.line, raw.name, raw.url)?);
            first_seen.insert(raw.name, raw.line);
        }
        Ok(Self { entries })
    }

    /// Reads and parses a catalog file.
    pub fn load_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load(&text)
    }

    /// The built-in plugin catalog.
    pub fn builtin() -> Self {
        // Constant text; see `builtin_catalog_parses`.
        Self::load(BUILTIN_CATALOG).unwrap_or_default()
    }

    /// Narrows the catalog to `names`, keeping catalog order. Empty `names` keeps everything.
    pub fn select(&self, names: &[String]) -> Result<Self, ConfigError> {
        if names.is_empty() {
            return Ok(self.clone());
        }
        if let Some(unknown) = names.iter().find(|n| self.get(n).is_none()) {
            return Err(ConfigError::UnknownName(unknown.clone()));
        }
        let entries = self
            .entries
            .iter()
            .filter(|e| names.iter().any(|n| n == e.name()))
            .cloned()
            .collect();
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Catalog {
    type Item = CatalogEntry;
    type IntoIter = std::vec::IntoIter<CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
