//! Sync policy configuration.
//!
//! Loaded from YAML and optionally overridden from `MEMBER_SYNC_*` environment
//! variables. The policy is handed to the engine at construction and is
//! read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{SyncError, SyncResult};

// Directory attributes that always carry binary image data.
const PHOTO_ATTRIBUTES: &[&str] = &["thumbnailPhoto", "jpegPhoto", "photo"];

/// One entry of the attribute mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Directory attribute name (case-insensitive).
    pub directory_attribute: String,
    /// Local record field name.
    pub local_field: String,
    /// The attribute holds binary content that is stored as a file locally.
    #[serde(default)]
    pub binary: bool,
}

impl FieldMapping {
    pub fn new(directory_attribute: impl Into<String>, local_field: impl Into<String>) -> Self {
        Self {
            directory_attribute: directory_attribute.into(),
            local_field: local_field.into(),
            binary: false,
        }
    }

    /// A mapping for a binary attribute.
    pub fn binary_attribute(directory_attribute: impl Into<String>, local_field: impl Into<String>) -> Self {
        Self {
            binary: true,
            ..Self::new(directory_attribute, local_field)
        }
    }

    /// Whether the local field holds a file path rather than the directory
    /// value. Well-known photo attributes count as binary even without the
    /// flag. Such fields are pulled only, never written to the directory.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.binary
            || PHOTO_ATTRIBUTES
                .iter()
                .any(|a| a.eq_ignore_ascii_case(&self.directory_attribute))
    }
}

/// Policy switches controlling which sync directions are enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPolicy {
    /// Pull directory attributes into local records.
    #[serde(default = "default_true")]
    update_local_from_directory: bool,

    /// Push local changes back to the directory (write-back).
    #[serde(default)]
    update_directory_from_local: bool,

    /// Create directory entries for local records that have none.
    #[serde(default)]
    create_users_in_directory: bool,

    /// Delete directory entries when the local record is deleted.
    #[serde(default)]
    delete_users_in_directory: bool,

    /// Let logins proceed with stale data when the directory refresh fails.
    #[serde(default)]
    allow_update_failure_during_login: bool,

    /// Ordered directory attribute to local field mapping.
    #[serde(default = "default_attribute_mapping")]
    attribute_mapping: Vec<FieldMapping>,

    /// Directory attribute holding the login handle.
    #[serde(default = "default_username_attribute")]
    username_attribute: String,

    /// Directory where member thumbnails pulled from the directory are stored.
    #[serde(default = "default_thumbnail_path")]
    thumbnail_path: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_attribute_mapping() -> Vec<FieldMapping> {
    vec![
        FieldMapping::new("givenName", "first_name"),
        FieldMapping::new("sn", "surname"),
        FieldMapping::new("mail", "email"),
    ]
}

fn default_username_attribute() -> String {
    "sAMAccountName".to_string()
}

fn default_thumbnail_path() -> PathBuf {
    PathBuf::from("assets/member-thumbnails")
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            update_local_from_directory: true,
            update_directory_from_local: false,
            create_users_in_directory: false,
            delete_users_in_directory: false,
            allow_update_failure_during_login: false,
            attribute_mapping: default_attribute_mapping(),
            username_attribute: default_username_attribute(),
            thumbnail_path: default_thumbnail_path(),
        }
    }
}

/// Environment variables read by [`SyncPolicy::apply_env_overrides`].
pub const ENV_UPDATE_LOCAL: &str = "MEMBER_SYNC_UPDATE_LOCAL_FROM_DIRECTORY";
pub const ENV_UPDATE_DIRECTORY: &str = "MEMBER_SYNC_UPDATE_DIRECTORY_FROM_LOCAL";
pub const ENV_CREATE_USERS: &str = "MEMBER_SYNC_CREATE_USERS_IN_DIRECTORY";
pub const ENV_DELETE_USERS: &str = "MEMBER_SYNC_DELETE_USERS_IN_DIRECTORY";
pub const ENV_ALLOW_LOGIN_FAILURE: &str = "MEMBER_SYNC_ALLOW_UPDATE_FAILURE_DURING_LOGIN";
pub const ENV_THUMBNAIL_PATH: &str = "MEMBER_SYNC_THUMBNAIL_PATH";

impl SyncPolicy {
    /// Load the policy from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SyncResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SyncError::configuration(format!(
                "Failed to read policy file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse the policy from a YAML string and validate it.
    pub fn from_yaml(content: &str) -> SyncResult<Self> {
        let policy: Self = serde_yaml::from_str(content)
            .map_err(|e| SyncError::configuration(format!("Failed to parse policy: {e}")))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Unparseable boolean
    /// values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).and_then(|v| parse_flag(&v));

        if let Some(v) = flag(ENV_UPDATE_LOCAL) {
            self.update_local_from_directory = v;
        }
        if let Some(v) = flag(ENV_UPDATE_DIRECTORY) {
            self.update_directory_from_local = v;
        }
        if let Some(v) = flag(ENV_CREATE_USERS) {
            self.create_users_in_directory = v;
        }
        if let Some(v) = flag(ENV_DELETE_USERS) {
            self.delete_users_in_directory = v;
        }
        if let Some(v) = flag(ENV_ALLOW_LOGIN_FAILURE) {
            self.allow_update_failure_during_login = v;
        }
        if let Some(path) = lookup(ENV_THUMBNAIL_PATH).filter(|p| !p.is_empty()) {
            self.thumbnail_path = PathBuf::from(path);
        }
    }

    /// Check the mapping table and paths.
    ///
    /// A directory attribute listed twice, or two directory attributes
    /// feeding the same local field, cannot be translated both ways and is
    /// rejected as `MappingAmbiguous`.
    pub fn validate(&self) -> SyncResult<()> {
        let mut directory_keys = HashSet::new();
        let mut local_keys = HashSet::new();

        for mapping in &self.attribute_mapping {
            if mapping.directory_attribute.trim().is_empty() || mapping.local_field.trim().is_empty()
            {
                return Err(SyncError::configuration(
                    "Attribute mapping entries need both a directory attribute and a local field",
                ));
            }
            if !directory_keys.insert(mapping.directory_attribute.to_ascii_lowercase()) {
                return Err(SyncError::mapping_ambiguous(format!(
                    "directory attribute '{}' is mapped more than once",
                    mapping.directory_attribute
                )));
            }
            if !local_keys.insert(mapping.local_field.as_str()) {
                return Err(SyncError::mapping_ambiguous(format!(
                    "local field '{}' is the target of more than one directory attribute",
                    mapping.local_field
                )));
            }
        }

        if self.username_attribute.trim().is_empty() {
            return Err(SyncError::configuration("Username attribute cannot be empty"));
        }
        if self.thumbnail_path.as_os_str().is_empty() {
            return Err(SyncError::configuration("Thumbnail path cannot be empty"));
        }
        Ok(())
    }

    // Accessors

    #[must_use]
    pub fn update_local_from_directory(&self) -> bool {
        self.update_local_from_directory
    }

    #[must_use]
    pub fn update_directory_from_local(&self) -> bool {
        self.update_directory_from_local
    }

    #[must_use]
    pub fn create_users_in_directory(&self) -> bool {
        self.create_users_in_directory
    }

    #[must_use]
    pub fn delete_users_in_directory(&self) -> bool {
        self.delete_users_in_directory
    }

    #[must_use]
    pub fn allow_update_failure_during_login(&self) -> bool {
        self.allow_update_failure_during_login
    }

    #[must_use]
    pub fn attribute_mapping(&self) -> &[FieldMapping] {
        &self.attribute_mapping
    }

    #[must_use]
    pub fn username_attribute(&self) -> &str {
        &self.username_attribute
    }

    #[must_use]
    pub fn thumbnail_path(&self) -> &Path {
        &self.thumbnail_path
    }

    // Builders

    #[must_use]
    pub fn with_update_local_from_directory(mut self, enabled: bool) -> Self {
        self.update_local_from_directory = enabled;
        self
    }

    #[must_use]
    pub fn with_update_directory_from_local(mut self, enabled: bool) -> Self {
        self.update_directory_from_local = enabled;
        self
    }

    #[must_use]
    pub fn with_create_users_in_directory(mut self, enabled: bool) -> Self {
        self.create_users_in_directory = enabled;
        self
    }

    #[must_use]
    pub fn with_delete_users_in_directory(mut self, enabled: bool) -> Self {
        self.delete_users_in_directory = enabled;
        self
    }

    #[must_use]
    pub fn with_allow_update_failure_during_login(mut self, enabled: bool) -> Self {
        self.allow_update_failure_during_login = enabled;
        self
    }

    #[must_use]
    pub fn with_attribute_mapping(mut self, mapping: Vec<FieldMapping>) -> Self {
        self.attribute_mapping = mapping;
        self
    }

    pub fn with_username_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.username_attribute = attribute.into();
        self
    }

    pub fn with_thumbnail_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.thumbnail_path = path.into();
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
