//! Category and file run order.
//!
//! File order specs come from loosely typed configuration: each element is
//! either a bare file name or a `{ group: [file, ...] }` map. They are turned
//! into [`FileOrderEntry`] values while decoding, and anything that fits
//! neither shape (numbers, booleans, nested lists, non-string file names) is
//! dropped at that point without an error.
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;

use super::init::InitConfig;
use super::source::BlueprintLocation;
use crate::config::format::Format;
use crate::error::BlueprintError;

/// Category order used when the init descriptor declares none.
pub const DEFAULT_CATEGORY_ORDER: [&str; 4] = ["repositories", "packages", "files", "services"];

/// One element of a file order declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOrderEntry {
    /// A file name relative to the category directory.
    Bare(String),
    /// Files inside a sub-directory named after a sub-processor.
    Group {
        /// Sub-directory name.
        name: String,
        /// File names inside it, in declaration order.
        files: Vec<String>,
    },
}

/// A decoded file order declaration for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileOrderSpec(Vec<FileOrderEntry>);

impl FileOrderSpec {
    /// The well-formed entries, in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[FileOrderEntry] {
        &self.0
    }
}

impl From<Vec<FileOrderEntry>> for FileOrderSpec {
    fn from(entries: Vec<FileOrderEntry>) -> Self {
        Self(entries)
    }
}

/// Resolve the category run order.
///
/// Returns the declared order verbatim (no validation, no deduplication) or
/// [`DEFAULT_CATEGORY_ORDER`] when none is declared.
#[must_use]
pub fn resolve_category_order(init: &InitConfig) -> Vec<String> {
    init.blueprints.order.clone().unwrap_or_else(|| {
        DEFAULT_CATEGORY_ORDER
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    })
}

/// Expand a file order declaration into paths relative to the category directory.
///
/// Bare names are kept verbatim; groups expand to `group/file` for each
/// file. Declaration order is preserved throughout.
#[must_use]
pub fn resolve_file_order(entries: &[FileOrderEntry]) -> Vec<PathBuf> {
    entries
        .iter()
        .flat_map(|entry| match entry {
            FileOrderEntry::Bare(file) => vec![PathBuf::from(file)],
            FileOrderEntry::Group { name, files } => {
                files.iter().map(|file| Path::new(name).join(file)).collect()
            }
        })
        .collect()
}

/// Directory holding the blueprint files for `category`.
#[must_use]
pub fn category_dir(location: &BlueprintLocation, init: &InitConfig, category: &str) -> PathBuf {
    init.blueprints
        .location
        .as_deref()
        .map_or_else(|| location.root.clone(), |sub| location.root.join(sub))
        .join(category)
}

/// Blueprint files for `category`, relative to its [`category_dir`].
///
/// Uses the declared file order when present. Otherwise lists the category
/// directory's blueprint files sorted by name, unless `runOnlyListed` is set.
/// A missing category directory has no files.
///
/// # Errors
///
/// Returns an error if the category directory exists but cannot be listed.
pub fn category_files(
    location: &BlueprintLocation,
    init: &InitConfig,
    category: &str,
) -> Result<Vec<PathBuf>, BlueprintError> {
    if let Some(spec) = init.blueprints.file_order.get(category) {
        return Ok(resolve_file_order(spec.entries()));
    }
    if init.blueprints.run_only_listed {
        return Ok(Vec::new());
    }

    let dir = category_dir(location, init, category);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let read_err = |source| BlueprintError::Read {
        path: dir.clone(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(&dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() && Format::from_path(&path).is_ok() {
            if let Some(name) = path.file_name() {
                files.push(PathBuf::from(name));
            }
        }
    }
    files.sort();
    Ok(files)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Implement the scalar `visit_*` methods of a [`Visitor`] so that each one
/// returns the same fallback value.
macro_rules! visit_scalars_as {
    ($fallback:expr) => {
        fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
            Ok($fallback)
        }
        fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
            Ok($fallback)
        }
        fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
            Ok($fallback)
        }
        fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
            Ok($fallback)
        }
        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok($fallback)
        }
        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok($fallback)
        }
    };
}

fn drain_seq<'de, A: SeqAccess<'de>>(mut seq: A) -> Result<(), A::Error> {
    while seq.next_element::<IgnoredAny>()?.is_some() {}
    Ok(())
}

fn drain_map<'de, A: MapAccess<'de>>(mut map: A) -> Result<(), A::Error> {
    while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
    Ok(())
}

/// A token that is kept only when it is a string.
struct Token(Option<String>);

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TokenVisitor)
    }
}

struct TokenVisitor;

impl<'de> Visitor<'de> for TokenVisitor {
    type Value = Token;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a file name")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Token, E> {
        Ok(Token(Some(v.to_string())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Token, E> {
        Ok(Token(Some(v)))
    }

    visit_scalars_as!(Token(None));

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Token, A::Error> {
        drain_seq(seq)?;
        Ok(Token(None))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Token, A::Error> {
        drain_map(map)?;
        Ok(Token(None))
    }
}

/// The value side of a group: a list of file names, or nothing usable.
struct GroupFiles(Option<Vec<String>>);

impl<'de> Deserialize<'de> for GroupFiles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(GroupFilesVisitor)
    }
}

struct GroupFilesVisitor;

impl<'de> Visitor<'de> for GroupFilesVisitor {
    type Value = GroupFiles;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of file names")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<GroupFiles, A::Error> {
        let mut files = Vec::new();
        while let Some(Token(token)) = seq.next_element::<Token>()? {
            files.extend(token);
        }
        Ok(GroupFiles(Some(files)))
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<GroupFiles, E> {
        Ok(GroupFiles(None))
    }

    visit_scalars_as!(GroupFiles(None));

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<GroupFiles, A::Error> {
        drain_map(map)?;
        Ok(GroupFiles(None))
    }
}

/// Zero or more entries produced by one element of the declaration.
struct RawEntry(Vec<FileOrderEntry>);

impl<'de> Deserialize<'de> for RawEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawEntryVisitor)
    }
}

struct RawEntryVisitor;

impl<'de> Visitor<'de> for RawEntryVisitor {
    type Value = RawEntry;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a file name or a map of group name to file names")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RawEntry, E> {
        Ok(RawEntry(vec![FileOrderEntry::Bare(v.to_string())]))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RawEntry, E> {
        Ok(RawEntry(vec![FileOrderEntry::Bare(v)]))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawEntry, A::Error> {
        let mut groups = Vec::new();
        while let Some(Token(name)) = map.next_key::<Token>()? {
            let GroupFiles(files) = map.next_value::<GroupFiles>()?;
            if let (Some(name), Some(files)) = (name, files) {
                groups.push(FileOrderEntry::Group { name, files });
            }
        }
        Ok(RawEntry(groups))
    }

    visit_scalars_as!(RawEntry(Vec::new()));

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<RawEntry, A::Error> {
        drain_seq(seq)?;
        Ok(RawEntry(Vec::new()))
    }
}

impl<'de> Deserialize<'de> for FileOrderSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<RawEntry>::deserialize(deserializer)?;
        Ok(Self(raw.into_iter().flat_map(|RawEntry(e)| e).collect()))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::blueprints::init::Init;

    fn spec(format: Format, data: &str) -> FileOrderSpec {
        format.decode(data.as_bytes(), "order").unwrap()
    }

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    // -----------------------------------------------------------------------
    // resolve_category_order
    // -----------------------------------------------------------------------

    #[test]
    fn category_order_defaults_when_absent() {
        let init = InitConfig::default();
        assert_eq!(
            resolve_category_order(&init),
            vec!["repositories", "packages", "files", "services"]
        );
    }

    #[test]
    fn category_order_passes_declared_order_through() {
        let init = InitConfig {
            blueprints: Init {
                order: Some(vec![
                    "packages".to_string(),
                    "custom".to_string(),
                    "packages".to_string(),
                ]),
                ..Init::default()
            },
            ..InitConfig::default()
        };
        assert_eq!(
            resolve_category_order(&init),
            vec!["packages", "custom", "packages"]
        );
    }

    #[test]
    fn category_order_empty_declaration_is_kept() {
        let init = InitConfig {
            blueprints: Init {
                order: Some(Vec::new()),
                ..Init::default()
            },
            ..InitConfig::default()
        };
        assert!(resolve_category_order(&init).is_empty());
    }

    // -----------------------------------------------------------------------
    // resolve_file_order
    // -----------------------------------------------------------------------

    #[test]
    fn file_order_expands_bare_and_group_entries() {
        let spec = spec(Format::Json, r#"["a.yaml", {"packages": ["b.yaml", "c.yaml"]}]"#);
        assert_eq!(
            resolve_file_order(spec.entries()),
            paths(&["a.yaml", "packages/b.yaml", "packages/c.yaml"])
        );
    }

    #[test]
    fn file_order_same_result_from_yaml_and_toml() {
        let yaml = spec(Format::Yaml, "- a.yaml\n- packages: [b.yaml, c.yaml]\n");
        let toml: Init = Format::Toml
            .decode(
                b"[fileOrder]\npackages = [\"a.yaml\", { packages = [\"b.yaml\", \"c.yaml\"] }]\n",
                "init.toml",
            )
            .unwrap();
        assert_eq!(&yaml, &toml.file_order["packages"]);
    }

    #[test]
    fn file_order_preserves_group_declaration_order() {
        let spec = spec(
            Format::Yaml,
            "- zeta: [z1.yaml]\n- alpha: [a2.yaml, a1.yaml]\n- last.yaml\n",
        );
        assert_eq!(
            resolve_file_order(spec.entries()),
            paths(&["zeta/z1.yaml", "alpha/a2.yaml", "alpha/a1.yaml", "last.yaml"])
        );
    }

    #[test]
    fn file_order_multi_key_group_keeps_key_order() {
        let spec = spec(Format::Json, r#"[{"b": ["1.json"], "a": ["2.json"]}]"#);
        assert_eq!(
            resolve_file_order(spec.entries()),
            paths(&["b/1.json", "a/2.json"])
        );
    }

    #[test]
    fn file_order_silently_skips_malformed_elements() {
        let spec = spec(
            Format::Json,
            r#"["a.yaml", 42, true, null, ["nested.yaml"], {"g": "not-a-list"}, {"h": ["ok.yaml", 7, {"x": 1}]}, "b.yaml"]"#,
        );
        assert_eq!(
            resolve_file_order(spec.entries()),
            paths(&["a.yaml", "h/ok.yaml", "b.yaml"])
        );
    }

    #[test]
    fn file_order_skips_non_string_group_keys() {
        let spec = spec(Format::Yaml, "- 1: [a.yaml]\n- ok: [b.yaml]\n");
        assert_eq!(resolve_file_order(spec.entries()), paths(&["ok/b.yaml"]));
    }

    #[test]
    fn file_order_empty_spec() {
        assert!(resolve_file_order(&[]).is_empty());
    }

    // -----------------------------------------------------------------------
    // category_files
    // -----------------------------------------------------------------------

    fn location(root: &Path) -> BlueprintLocation {
        BlueprintLocation {
            root: root.to_path_buf(),
            init_file: root.join("init.yaml"),
        }
    }

    #[test]
    fn category_files_lists_blueprints_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let packages = dir.path().join("packages");
        std::fs::create_dir_all(packages.join("nested")).unwrap();
        for name in ["b.yaml", "a.json", "c.toml", "notes.md"] {
            std::fs::write(packages.join(name), "").unwrap();
        }
        let files =
            category_files(&location(dir.path()), &InitConfig::default(), "packages").unwrap();
        assert_eq!(files, paths(&["a.json", "b.yaml", "c.toml"]));
    }

    #[test]
    fn category_files_prefers_declared_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut init = InitConfig::default();
        init.blueprints.file_order.insert(
            "packages".to_string(),
            vec![FileOrderEntry::Bare("z.yaml".to_string())].into(),
        );
        let files = category_files(&location(dir.path()), &init, "packages").unwrap();
        assert_eq!(files, paths(&["z.yaml"]));
    }

    #[test]
    fn category_files_run_only_listed_skips_unlisted_categories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("packages")).unwrap();
        std::fs::write(dir.path().join("packages/a.yaml"), "").unwrap();
        let mut init = InitConfig::default();
        init.blueprints.run_only_listed = true;
        assert!(category_files(&location(dir.path()), &init, "packages")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn category_files_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(category_files(&location(dir.path()), &InitConfig::default(), "services")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn category_dir_honours_location() {
        let loc = location(Path::new("/bp"));
        let mut init = InitConfig::default();
        assert_eq!(category_dir(&loc, &init, "packages"), PathBuf::from("/bp/packages"));
        init.blueprints.location = Some("hosts/laptop".to_string());
        assert_eq!(
            category_dir(&loc, &init, "packages"),
            PathBuf::from("/bp/hosts/laptop/packages")
        );
    }
}
