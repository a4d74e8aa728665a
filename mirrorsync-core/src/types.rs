//! Domain types for mirror description files.
//!
//! A mirror file is `<name>.yaml`; the stem is the mirror's identifier in the
//! registry and must match the `Name` key inside the file.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Suffix every mirror description file carries.
pub const MIRROR_FILE_SUFFIX: &str = ".yaml";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed mirror identifier, as known to the mirror registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MirrorName(pub String);

impl MirrorName {
    /// Derive the mirror name from a file name by stripping the `.yaml` suffix.
    ///
    /// Returns `None` for anything that is not a mirror file (other
    /// extensions, or a bare `.yaml`).
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        file_name
            .strip_suffix(MIRROR_FILE_SUFFIX)
            .filter(|stem| !stem.is_empty())
            .map(Self::from)
    }

    /// `<name>.yaml`
    pub fn file_name(&self) -> String {
        format!("{}{MIRROR_FILE_SUFFIX}", self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MirrorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for MirrorName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MirrorName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Required keys of a mirror description file, other than `Name` and `Enabled`.
///
/// Declaration order is the order flags are passed to the registry's `add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MirrorField {
    AdminEmail,
    AdminName,
    AsOnly,
    ContinentOnly,
    CountryOnly,
    FtpUrl,
    HttpUrl,
    RsyncUrl,
    Score,
    SponsorLogoUrl,
    SponsorName,
    SponsorUrl,
    NetworkBandwidth,
    Latitude,
    Longitude,
    Country,
}

impl MirrorField {
    pub const ALL: [MirrorField; 16] = [
        MirrorField::AdminEmail,
        MirrorField::AdminName,
        MirrorField::AsOnly,
        MirrorField::ContinentOnly,
        MirrorField::CountryOnly,
        MirrorField::FtpUrl,
        MirrorField::HttpUrl,
        MirrorField::RsyncUrl,
        MirrorField::Score,
        MirrorField::SponsorLogoUrl,
        MirrorField::SponsorName,
        MirrorField::SponsorUrl,
        MirrorField::NetworkBandwidth,
        MirrorField::Latitude,
        MirrorField::Longitude,
        MirrorField::Country,
    ];

    /// Key as written in the YAML file.
    pub fn key(self) -> &'static str {
        match self {
            MirrorField::AdminEmail => "AdminEmail",
            MirrorField::AdminName => "AdminName",
            MirrorField::AsOnly => "ASOnly",
            MirrorField::ContinentOnly => "ContinentOnly",
            MirrorField::CountryOnly => "CountryOnly",
            MirrorField::FtpUrl => "FtpURL",
            MirrorField::HttpUrl => "HttpURL",
            MirrorField::RsyncUrl => "RsyncURL",
            MirrorField::Score => "Score",
            MirrorField::SponsorLogoUrl => "SponsorLogoURL",
            MirrorField::SponsorName => "SponsorName",
            MirrorField::SponsorUrl => "SponsorURL",
            MirrorField::NetworkBandwidth => "NetworkBandwidth",
            MirrorField::Latitude => "Latitude",
            MirrorField::Longitude => "Longitude",
            MirrorField::Country => "Country",
        }
    }

    /// Flag name understood by `mirrorbits add`.
    pub fn flag(self) -> &'static str {
        match self {
            MirrorField::AdminEmail => "admin-email",
            MirrorField::AdminName => "admin-name",
            MirrorField::AsOnly => "as-only",
            MirrorField::ContinentOnly => "continent-only",
            MirrorField::CountryOnly => "country-only",
            MirrorField::FtpUrl => "ftp",
            MirrorField::HttpUrl => "http",
            MirrorField::RsyncUrl => "rsync",
            MirrorField::Score => "score",
            MirrorField::SponsorLogoUrl => "sponsor-logo",
            MirrorField::SponsorName => "sponsor-name",
            MirrorField::SponsorUrl => "sponsor-url",
            MirrorField::NetworkBandwidth => "net-bandwidth",
            MirrorField::Latitude => "latitude",
            MirrorField::Longitude => "longitude",
            MirrorField::Country => "country",
        }
    }

    /// Row label used when logging an added mirror.
    pub fn table_label(self) -> &'static str {
        match self {
            MirrorField::NetworkBandwidth => "NetBandwidth",
            other => other.key(),
        }
    }
}

impl fmt::Display for MirrorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A fully validated mirror description.
///
/// Field values are opaque strings handed to the registry verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRecord {
    pub name: MirrorName,
    pub values: BTreeMap<MirrorField, String>,
    pub enabled: bool,
}

impl MirrorRecord {
    /// Value of `field`; every field is present once a record is built.
    pub fn get(&self, field: MirrorField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or_default()
    }

    /// `(label, value)` rows in flag order, starting with the name.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = Vec::with_capacity(MirrorField::ALL.len() + 1);
        rows.push(("Name", self.name.0.clone()));
        for field in MirrorField::ALL {
            rows.push((field.table_label(), self.get(field).to_owned()));
        }
        rows
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_name_from_yaml_file() {
        assert_eq!(
            MirrorName::from_file_name("tuna.yaml"),
            Some(MirrorName::from("tuna"))
        );
        assert_eq!(MirrorName::from_file_name("tuna.yml"), None);
        assert_eq!(MirrorName::from_file_name("README.md"), None);
        assert_eq!(MirrorName::from_file_name(".yaml"), None);
    }

    #[test]
    fn mirror_name_display_and_file_name() {
        let name = MirrorName::from("huawei-cloud");
        assert_eq!(name.to_string(), "huawei-cloud");
        assert_eq!(name.file_name(), "huawei-cloud.yaml");
    }

    #[test]
    fn field_keys_and_flags_are_unique() {
        let keys: std::collections::BTreeSet<_> =
            MirrorField::ALL.iter().map(|f| f.key()).collect();
        let flags: std::collections::BTreeSet<_> =
            MirrorField::ALL.iter().map(|f| f.flag()).collect();
        assert_eq!(keys.len(), MirrorField::ALL.len());
        assert_eq!(flags.len(), MirrorField::ALL.len());
    }

    #[test]
    fn network_bandwidth_has_short_table_label() {
        assert_eq!(MirrorField::NetworkBandwidth.key(), "NetworkBandwidth");
        assert_eq!(MirrorField::NetworkBandwidth.table_label(), "NetBandwidth");
        assert_eq!(MirrorField::FtpUrl.table_label(), "FtpURL");
    }

    #[test]
    fn record_rows_start_with_name() {
        let record = MirrorRecord {
            name: MirrorName::from("tuna"),
            values: MirrorField::ALL
                .iter()
                .map(|f| (*f, format!("v-{}", f.key())))
                .collect(),
            enabled: true,
        };
        let rows = record.rows();
        assert_eq!(rows.len(), 17);
        assert_eq!(rows[0], ("Name", "tuna".to_string()));
        assert_eq!(rows[1], ("AdminEmail", "v-AdminEmail".to_string()));
    }
}
