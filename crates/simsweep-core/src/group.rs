//! Duplicate groups, gestures and the actions that resolve them.

use chrono::NaiveDateTime;
use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString, FromRepr, IntoEnumIterator};

use crate::selection::SelectionStore;

/// One entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Display name.
    pub name: CompactString,
    /// Absolute path, usable as input to another listing.
    pub path: String,
}

impl DirEntry {
    /// Create a new entry.
    pub fn new(name: impl Into<CompactString>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Where a candidate file's date came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize, Display,
)]
pub enum DateSource {
    /// Filesystem timestamp; can be overwritten.
    #[default]
    #[serde(rename = "filesystem")]
    #[strum(to_string = "filesystem")]
    Filesystem,
    /// Date embedded in the image metadata; read-only.
    #[serde(rename = "embedded-metadata", alias = "embedded_metadata", alias = "exif")]
    #[strum(to_string = "embedded metadata")]
    EmbeddedMetadata,
}

impl DateSource {
    /// Whether a date can be copied onto a file with this date source.
    pub fn is_writable(self) -> bool {
        self == Self::Filesystem
    }
}

/// A file the backend considers a duplicate candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFile {
    /// Every path of this file; the first is canonical. Hardlinked copies
    /// share one entry.
    #[serde(alias = "path", deserialize_with = "one_or_many")]
    pub paths: Vec<String>,

    /// Size in bytes.
    #[serde(default)]
    pub size: u64,

    /// Capture or modification date.
    #[serde(with = "date_format")]
    pub date: NaiveDateTime,

    /// Origin of `date`.
    #[serde(default, alias = "dateSource")]
    pub date_source: DateSource,

    /// Whether the target filesystem supports replacing this file with a hardlink.
    #[serde(default, alias = "hardlinkEligible")]
    pub hardlink_eligible: bool,

    /// Filesystem/volume identifier.
    #[serde(default, alias = "deviceId")]
    pub device_id: u64,

    /// Thumbnail image bytes.
    #[serde(default, with = "thumbnail_base64")]
    pub thumbnail: Vec<u8>,
}

impl CandidateFile {
    /// The path used as this file's identity in gestures.
    pub fn canonical_path(&self) -> &str {
        self.paths.first().map(String::as_str).unwrap_or_default()
    }

    /// Number of hardlinked paths beyond the canonical one.
    pub fn extra_links(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }
}

/// Files the backend judges to have equivalent content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DuplicateGroup {
    pub files: Vec<CandidateFile>,
}

impl DuplicateGroup {
    /// Create a group from its files.
    pub fn new(files: Vec<CandidateFile>) -> Self {
        Self { files }
    }

    /// Number of candidate files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the group is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Find a file by canonical path.
    pub fn find(&self, canonical_path: &str) -> Option<&CandidateFile> {
        self.files
            .iter()
            .find(|f| f.canonical_path() == canonical_path)
    }

    /// Position of a file by canonical path.
    pub fn position(&self, canonical_path: &str) -> Option<usize> {
        self.files
            .iter()
            .position(|f| f.canonical_path() == canonical_path)
    }

    /// Space that keeping only the largest file would reclaim.
    pub fn wasted_bytes(&self) -> u64 {
        let total: u64 = self.files.iter().map(|f| f.size).sum();
        let largest = self.files.iter().map(|f| f.size).max().unwrap_or(0);
        total - largest
    }
}

/// A drag of one tile onto another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragGesture {
    pub source_path: String,
    pub source_group: usize,
    pub target_path: String,
    pub target_group: usize,
}

impl DragGesture {
    /// Create a new gesture.
    pub fn new(
        source_path: impl Into<String>,
        source_group: usize,
        target_path: impl Into<String>,
        target_group: usize,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            source_group,
            target_path: target_path.into(),
            target_group,
        }
    }

    /// Only drops within one group onto a different file are meaningful.
    pub fn is_valid(&self) -> bool {
        self.source_group == self.target_group && self.source_path != self.target_path
    }
}

/// Remediation applied to the target of a gesture.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GroupAction {
    /// Copy the source's date onto the target.
    CopyDate,
    /// Replace the target with a hardlink to the source.
    HardlinkImage,
    /// Replace the target with a byte copy of the source.
    CopyImage,
}

impl GroupAction {
    /// Operator-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::CopyDate => "Copy date to target",
            Self::HardlinkImage => "Replace target with hardlink",
            Self::CopyImage => "Replace target with copy",
        }
    }

    /// Whether this action can be applied from `source` to `target`.
    pub fn is_enabled(self, source: &CandidateFile, target: &CandidateFile) -> bool {
        match self {
            Self::CopyDate => target.date_source.is_writable(),
            // Hardlinks cannot cross device boundaries.
            Self::HardlinkImage => {
                target.hardlink_eligible && source.device_id == target.device_id
            }
            Self::CopyImage => true,
        }
    }

    /// All actions in menu order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

/// Body of a duplicate group action call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: GroupAction,
    pub source: String,
    pub target: String,
}

impl ActionRequest {
    /// Build the request for a validated gesture.
    pub fn new(action: GroupAction, gesture: &DragGesture) -> Self {
        Self {
            action,
            source: gesture.source_path.clone(),
            target: gesture.target_path.clone(),
        }
    }
}

/// Perceptual hash used by the backend to compare images.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    FromRepr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Phash,
    Ahash,
    Dhash,
    Whash,
}

impl Algorithm {
    /// Cycle to the next algorithm.
    pub fn next(self) -> Self {
        let current = self as usize;
        let next = (current + 1) % Self::iter().count();
        Self::from_repr(next).unwrap_or_default()
    }
}

/// What the settings screen submits to start a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsSubmission {
    /// Directories with redundant descendants already dropped.
    pub directories: Vec<String>,
    pub algorithm: Algorithm,
    /// Similarity threshold in percent.
    pub similarity: u8,
}

impl SettingsSubmission {
    /// Highest similarity threshold (exact matches only).
    pub const MAX_SIMILARITY: u8 = 100;

    /// Build a submission from the current selection.
    pub fn from_selection(store: &SelectionStore, algorithm: Algorithm, similarity: u8) -> Self {
        Self {
            directories: store.snapshot_for_submit(),
            algorithm,
            similarity: similarity.min(Self::MAX_SIMILARITY),
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(path) => vec![path],
        OneOrMany::Many(paths) => paths,
    })
}

mod date_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y/%m/%d %H:%M:%S";
    const ACCEPTED: [&str; 3] = [FORMAT, "%Y:%m:%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"];

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        ACCEPTED
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("unsupported date format: {raw}")))
    }
}

mod thumbnail_base64 {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    /// Missing or undecodable thumbnails become empty.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .and_then(|text| STANDARD.decode(text.trim()).ok())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn file(path: &str) -> CandidateFile {
        CandidateFile {
            paths: vec![path.to_string()],
            size: 1024,
            date: NaiveDate::from_ymd_opt(2021, 5, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            date_source: DateSource::Filesystem,
            hardlink_eligible: true,
            device_id: 7,
            thumbnail: Vec::new(),
        }
    }

    #[test]
    fn test_gesture_validity() {
        assert!(DragGesture::new("/a.jpg", 0, "/b.jpg", 0).is_valid());
        assert!(!DragGesture::new("/a.jpg", 0, "/b.jpg", 1).is_valid());
        assert!(!DragGesture::new("/a.jpg", 2, "/a.jpg", 2).is_valid());
    }

    #[test]
    fn test_copy_date_disabled_for_embedded_metadata() {
        let source = file("/a.jpg");
        let mut target = file("/b.jpg");
        assert!(GroupAction::CopyDate.is_enabled(&source, &target));
        target.date_source = DateSource::EmbeddedMetadata;
        assert!(!GroupAction::CopyDate.is_enabled(&source, &target));
        assert!(GroupAction::CopyImage.is_enabled(&source, &target));
    }

    #[test]
    fn test_hardlink_requires_eligibility_and_same_device() {
        let source = file("/a.jpg");
        let mut target = file("/b.jpg");
        assert!(GroupAction::HardlinkImage.is_enabled(&source, &target));

        target.device_id = 8;
        assert!(!GroupAction::HardlinkImage.is_enabled(&source, &target));

        target.device_id = 7;
        target.hardlink_eligible = false;
        assert!(!GroupAction::HardlinkImage.is_enabled(&source, &target));
    }

    #[test]
    fn test_action_identifiers() {
        assert_eq!(GroupAction::CopyDate.to_string(), "copy_date");
        assert_eq!(GroupAction::HardlinkImage.to_string(), "hardlink_image");
        assert_eq!(
            "copy_image".parse::<GroupAction>().unwrap(),
            GroupAction::CopyImage
        );
        assert_eq!(GroupAction::all().count(), 3);
    }

    #[test]
    fn test_algorithm_cycles() {
        assert_eq!(Algorithm::Phash.next(), Algorithm::Ahash);
        assert_eq!(Algorithm::Whash.next(), Algorithm::Phash);
        assert_eq!(Algorithm::Dhash.to_string(), "dhash");
    }

    #[test]
    fn test_group_lookup_and_waste() {
        let mut big = file("/b.jpg");
        big.size = 4096;
        let group = DuplicateGroup::new(vec![file("/a.jpg"), big]);
        assert_eq!(group.position("/b.jpg"), Some(1));
        assert!(group.find("/c.jpg").is_none());
        assert_eq!(group.wasted_bytes(), 1024);
    }

    #[test]
    fn test_submission_clamps_similarity() {
        let mut store = SelectionStore::new();
        store.add("/a").unwrap();
        store.add("/a/b").unwrap();
        let submission = SettingsSubmission::from_selection(&store, Algorithm::Dhash, 150);
        assert_eq!(submission.directories, vec!["/a"]);
        assert_eq!(submission.similarity, 100);
    }
}
