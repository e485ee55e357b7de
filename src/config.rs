use crate::api_client::{LEETCODE_BASE_URL, LEETCODE_CN_BASE_URL};
use crate::error::AppError;
use ini::Ini;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SECTION_NAME: &str = "LEETCODE";
const DEFAULT_SITE: &str = "leetcode.com";
const USERNAME_ENV: &str = "LEETCODE_USERNAME";
const LOCAL_CONFIG_FILES: [&str; 2] = ["config.ini", "config.toml"];

/// Which deployment of the service to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    LeetCode,
    LeetCodeCn,
}

impl Site {
    /// Map a configured site name. Anything unrecognized falls back to the primary site.
    pub fn from_name(name: &str) -> Self {
        match name {
            "leetcode.cn" => Site::LeetCodeCn,
            "leetcode.com" => Site::LeetCode,
            other => {
                tracing::warn!(site = other, "unrecognized site, using leetcode.com");
                Site::LeetCode
            }
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Site::LeetCode => LEETCODE_BASE_URL,
            Site::LeetCodeCn => LEETCODE_CN_BASE_URL,
        }
    }
}

#[derive(Serialize, Deserialize, Default)]
struct ConfigFile {
    #[serde(rename = "LEETCODE", default)]
    leetcode: LeetCodeSection,
}

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct LeetCodeSection {
    pub username: Option<String>,
    pub site: Option<String>,
    pub animated: Option<bool>,
}

/// Values given on the command line; they win over the environment and the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub username: Option<String>,
    pub site: Option<String>,
    pub animated: Option<bool>,
}

/// Resolved run settings, built once and passed down the pipeline.
#[derive(Debug, Clone)]
pub struct Settings {
    pub username: String,
    /// Site name as configured, used for the output file name.
    pub site_name: String,
    pub site: Site,
    pub animated: bool,
}

impl Settings {
    pub fn resolve(
        section: LeetCodeSection,
        env_username: Option<String>,
        overrides: Overrides,
    ) -> Result<Self, AppError> {
        let username = overrides
            .username
            .or(env_username.filter(|u| !u.trim().is_empty()))
            .or(section.username)
            .map(|u| u.trim().to_string())
            .unwrap_or_default();
        if username.is_empty() {
            return Err(AppError::MissingUsername);
        }

        let site_name = overrides
            .site
            .or(section.site)
            .unwrap_or_else(|| DEFAULT_SITE.to_string());
        let site = Site::from_name(&site_name);
        let animated = overrides.animated.or(section.animated).unwrap_or(false);

        Ok(Self {
            username,
            site_name,
            site,
            animated,
        })
    }
}

/// Where `load` looks for settings when no explicit file is given.
#[derive(Debug, Clone)]
pub struct ConfigSearch {
    /// Directory checked for `config.ini` then `config.toml`.
    pub local_dir: PathBuf,
    /// Platform config directory, checked last.
    pub user_config_dir: Option<PathBuf>,
}

impl Default for ConfigSearch {
    fn default() -> Self {
        Self {
            local_dir: PathBuf::from("."),
            user_config_dir: dirs::config_dir(),
        }
    }
}

impl ConfigSearch {
    fn find(&self) -> Option<PathBuf> {
        for name in LOCAL_CONFIG_FILES {
            let path = self.local_dir.join(name);
            if path.exists() {
                return Some(path);
            }
        }
        let path = self
            .user_config_dir
            .as_ref()?
            .join("leetcode-badge-svg")
            .join("config.toml");
        path.exists().then_some(path)
    }
}

/// Booleans the way Python's configparser spells them.
fn parse_ini_bool(key: &str, value: &str) -> Result<bool, AppError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(AppError::InvalidConfigValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parse an INI file; option names are matched case-insensitively.
pub fn parse_ini_section(contents: &str) -> Result<LeetCodeSection, AppError> {
    let ini = Ini::load_from_str(contents).map_err(|e| AppError::IniParseError(e.to_string()))?;
    let mut section = LeetCodeSection::default();
    let Some(props) = ini.section(Some(SECTION_NAME)) else {
        return Ok(section);
    };

    for (key, value) in props.iter() {
        match key.to_ascii_lowercase().as_str() {
            "username" => section.username = Some(value.to_string()),
            "site" => section.site = Some(value.to_string()),
            "animated" => section.animated = Some(parse_ini_bool(key, value)?),
            other => tracing::debug!(key = other, "ignoring unknown config key"),
        }
    }
    Ok(section)
}

pub fn parse_toml_section(contents: &str) -> Result<LeetCodeSection, AppError> {
    let config: ConfigFile = toml::from_str(contents)?;
    Ok(config.leetcode)
}

/// `.toml` files are TOML; everything else is read as INI.
fn parse_config_file(path: &Path) -> Result<LeetCodeSection, AppError> {
    let contents = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        parse_toml_section(&contents)
    } else {
        parse_ini_section(&contents)
    }
}

/// Read the config file (explicit path, or the first one found) and apply overrides.
pub fn load(explicit_path: Option<&Path>, overrides: Overrides) -> Result<Settings, AppError> {
    load_with(
        explicit_path,
        &ConfigSearch::default(),
        std::env::var(USERNAME_ENV).ok(),
        overrides,
    )
}

pub fn load_with(
    explicit_path: Option<&Path>,
    search: &ConfigSearch,
    env_username: Option<String>,
    overrides: Overrides,
) -> Result<Settings, AppError> {
    let path = match explicit_path {
        Some(path) => Some(path.to_path_buf()),
        None => search.find(),
    };

    let section = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "reading config");
            parse_config_file(&path)?
        }
        None => LeetCodeSection::default(),
    };

    Settings::resolve(section, env_username, overrides)
}
