use crate::error::{ModmapError, Result};
use crate::lmod::LuaTable;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Module path -> module names visible there (values are not used)
pub type ModulePathTable = LuaTable<LuaTable<Value>>;

/// Module path -> package name -> package record
pub type SpiderTable = BTreeMap<String, LuaTable<PackageRecord>>;

/// One package under one module path in `spiderT`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PackageRecord {
    /// Fullname (`name/version`) -> version record
    #[serde(rename = "fileT", default)]
    pub files: LuaTable<VersionRecord>,

    #[serde(
        rename = "defaultT",
        default,
        deserialize_with = "deserialize_default_declaration"
    )]
    pub default: Option<DefaultDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VersionRecord {
    #[serde(rename = "Version")]
    pub version: String,

    pub canonical: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl VersionRecord {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            canonical: version.to_string(),
            extra: BTreeMap::new(),
        }
    }
}

/// A `.version`/`default` file found for a package
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DefaultDeclaration {
    /// Either `version` or `name/version`; may be empty
    #[serde(default)]
    pub value: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DefaultDeclaration {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            extra: BTreeMap::new(),
        }
    }
}

fn deserialize_default_declaration<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DefaultDeclaration>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let empty = match &value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    };
    if empty {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

#[derive(Deserialize)]
struct RawTables {
    #[serde(rename = "mpathMapT", default)]
    mpath_map: ModulePathTable,

    #[serde(rename = "spiderT", default)]
    spider: LuaTable<Value>,
}

fn escape_fix_regex() -> &'static Regex {
    static ESCAPE_FIX_REGEX: OnceLock<Regex> = OnceLock::new();
    ESCAPE_FIX_REGEX.get_or_init(|| Regex::new(r"\\x").expect("Invalid escape fix regex"))
}

/// The two tables exported from the Lmod spider cache
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LmodTables {
    pub mpath_map: ModulePathTable,
    pub spider: SpiderTable,
}

impl LmodTables {
    /// Decodes the JSON dump of `{"mpathMapT": ..., "spiderT": ...}`
    ///
    /// Lua prints non-UTF-8 bytes as `\xNN`, which is not valid JSON; those
    /// escapes are replaced by `_____` before parsing.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let safe = escape_fix_regex().replace_all(raw, "_____");
        let tables: RawTables =
            serde_json::from_str(&safe).map_err(|source| ModmapError::Decode {
                what: "Lmod cache tables".to_string(),
                source,
            })?;

        let mut spider = SpiderTable::new();
        for (key, value) in tables.spider.0 {
            match serde_json::from_value::<LuaTable<PackageRecord>>(value) {
                Ok(software) => {
                    spider.insert(key, software);
                }
                Err(source) if key.starts_with('/') => {
                    return Err(ModmapError::MalformedModulePath {
                        modulepath: key,
                        source,
                    });
                }
                Err(err) => debug!("Skipping non-modulepath spiderT key {}: {}", key, err),
            }
        }

        Ok(Self {
            mpath_map: tables.mpath_map,
            spider,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ModmapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read Lmod cache dump {}", path.display());
        Self::from_json_str(&raw)
    }
}
