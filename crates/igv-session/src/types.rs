//! Load configuration and session state types
//!
//! The viewer engine accepts a loosely typed nested configuration. Only the
//! reference and track URL fields are given a precise schema here; every
//! other key is kept in an `extra` map and passed through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Genome loaded when no session has been stored
pub const DEFAULT_GENOME: &str = "hg38";

/// Catalog genome identifiers the engine can load by id alone
pub const KNOWN_GENOMES: &[&str] = &[
    "hs1",
    "chm13v1.1",
    "hg38",
    "hg38_1kg",
    "hg19",
    "hg18",
    "mm39",
    "mm10",
    "mm9",
    "rn7",
    "rn6",
    "gorGor6",
    "gorGor4",
    "panTro6",
    "panTro5",
    "panTro4",
    "macFas5",
    "GCA_011100615.1",
    "panPan2",
    "canFam3",
    "canFam4",
    "canFam5",
    "bosTau9",
    "bosTau8",
    "susScr11",
    "galGal6",
    "danRer11",
    "danRer10",
    "ce11",
    "dm6",
    "dm3",
    "dmel_r5.9",
    "sacCer3",
    "ASM294v2",
    "ASM985889v3",
    "tair10",
];

/// What the viewer should display
///
/// Track order is display order and is preserved through resolution and
/// persistence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadConfiguration {
    /// Catalog genome id, used when no custom reference is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genome: Option<String>,

    /// Custom reference assembly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceSpec>,

    /// Tracks in display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<TrackSpec>,

    /// Engine fields this crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LoadConfiguration {
    /// Empty configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration showing a catalog genome and nothing else
    #[must_use]
    pub fn for_genome(genome: impl Into<String>) -> Self {
        Self {
            genome: Some(genome.into()),
            ..Self::default()
        }
    }

    /// With catalog genome
    #[inline]
    #[must_use]
    pub fn with_genome(mut self, genome: impl Into<String>) -> Self {
        self.genome = Some(genome.into());
        self
    }

    /// With custom reference
    #[inline]
    #[must_use]
    pub fn with_reference(mut self, reference: ReferenceSpec) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Append a track
    #[inline]
    #[must_use]
    pub fn with_track(mut self, track: TrackSpec) -> Self {
        self.tracks.push(track);
        self
    }

    /// Identity of the reference this configuration loads
    ///
    /// A custom reference wins over the catalog genome.
    #[must_use]
    pub fn reference_id(&self) -> Option<&str> {
        self.reference
            .as_ref()
            .and_then(|r| r.id.as_deref().or(r.name.as_deref()))
            .or(self.genome.as_deref())
    }

    /// Number of URL fields flagged as presigned
    #[must_use]
    pub fn protected_field_count(&self) -> usize {
        let reference = self.reference.as_ref().map_or(0, |r| {
            usize::from(r.is_presigned_fasta() && !r.fasta_url.is_empty())
                + usize::from(r.is_presigned_index() && r.index_url.as_deref().is_some_and(|u| !u.is_empty()))
        });
        let tracks: usize = self
            .tracks
            .iter()
            .map(|t| {
                usize::from(t.is_presigned_url() && !t.url.is_empty())
                    + usize::from(t.is_presigned_index() && t.index_url.as_deref().is_some_and(|u| !u.is_empty()))
            })
            .sum();
        reference + tracks
    }

    /// Serialize into a JSON value
    ///
    /// # Errors
    /// Returns an error if an `extra` value cannot be represented.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Custom reference assembly
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferenceSpec {
    /// Reference identity (shown in the title)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// FASTA location
    #[serde(rename = "fastaURL", default, skip_serializing_if = "String::is_empty")]
    pub fasta_url: String,

    /// FASTA index location
    #[serde(rename = "indexURL", default, skip_serializing_if = "Option::is_none")]
    pub index_url: Option<String>,

    /// `fasta_url` refers to protected storage
    #[serde(rename = "isPresignedFasta", default, skip_serializing_if = "Option::is_none")]
    pub presigned_fasta: Option<bool>,

    /// `index_url` refers to protected storage
    #[serde(rename = "isPresignedIndex", default, skip_serializing_if = "Option::is_none")]
    pub presigned_index: Option<bool>,

    /// Object-store identifier `fasta_url` was presigned from
    #[serde(rename = "sourceFastaURL", default, skip_serializing_if = "Option::is_none")]
    pub source_fasta_url: Option<String>,

    /// Object-store identifier `index_url` was presigned from
    #[serde(rename = "sourceIndexURL", default, skip_serializing_if = "Option::is_none")]
    pub source_index_url: Option<String>,

    /// Engine fields this crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReferenceSpec {
    /// Reference with a public FASTA URL
    #[must_use]
    pub fn new(fasta_url: impl Into<String>) -> Self {
        Self {
            fasta_url: fasta_url.into(),
            ..Self::default()
        }
    }

    /// With id and display name
    #[inline]
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.id = Some(name.clone());
        self.name = Some(name);
        self
    }

    /// With FASTA index
    #[inline]
    #[must_use]
    pub fn with_index(mut self, index_url: impl Into<String>) -> Self {
        self.index_url = Some(index_url.into());
        self
    }

    /// Flag both URLs as protected storage
    #[inline]
    #[must_use]
    pub fn presigned(mut self) -> Self {
        self.presigned_fasta = Some(true);
        if self.index_url.is_some() {
            self.presigned_index = Some(true);
        }
        self
    }

    /// Check if the FASTA URL must be presigned
    #[inline]
    #[must_use]
    pub fn is_presigned_fasta(&self) -> bool {
        self.presigned_fasta.unwrap_or(false)
    }

    /// Check if the index URL must be presigned
    #[inline]
    #[must_use]
    pub fn is_presigned_index(&self) -> bool {
        self.presigned_index.unwrap_or(false)
    }
}

/// One overlay dataset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackSpec {
    /// Display name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Data location; sequence tracks have none
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,

    /// Index location (`.bai`, `.tbi`, `.idx`)
    #[serde(rename = "indexURL", default, skip_serializing_if = "Option::is_none")]
    pub index_url: Option<String>,

    /// `url` refers to protected storage
    #[serde(rename = "isPresignedURL", default, skip_serializing_if = "Option::is_none")]
    pub presigned_url: Option<bool>,

    /// `index_url` refers to protected storage
    #[serde(rename = "isPresignedIndex", default, skip_serializing_if = "Option::is_none")]
    pub presigned_index: Option<bool>,

    /// Object-store identifier `url` was presigned from
    #[serde(rename = "sourceURL", default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    /// Object-store identifier `index_url` was presigned from
    #[serde(rename = "sourceIndexURL", default, skip_serializing_if = "Option::is_none")]
    pub source_index_url: Option<String>,

    /// Engine fields this crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TrackSpec {
    /// Track with a public URL
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// With index
    #[inline]
    #[must_use]
    pub fn with_index(mut self, index_url: impl Into<String>) -> Self {
        self.index_url = Some(index_url.into());
        self
    }

    /// Flag the URL (and index, if any) as protected storage
    #[inline]
    #[must_use]
    pub fn presigned(mut self) -> Self {
        self.presigned_url = Some(true);
        if self.index_url.is_some() {
            self.presigned_index = Some(true);
        }
        self
    }

    /// Check if the data URL must be presigned
    #[inline]
    #[must_use]
    pub fn is_presigned_url(&self) -> bool {
        self.presigned_url.unwrap_or(false)
    }

    /// Check if the index URL must be presigned
    #[inline]
    #[must_use]
    pub fn is_presigned_index(&self) -> bool {
        self.presigned_index.unwrap_or(false)
    }
}

/// Serialized form of a live viewer
///
/// A superset of [`LoadConfiguration`] with whatever transient fields the
/// engine adds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState(Value);

impl SessionState {
    /// Wrap an engine snapshot
    #[inline]
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the raw snapshot
    #[inline]
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the raw snapshot
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// `reference.locus`, if present
    #[must_use]
    pub fn reference_locus(&self) -> Option<&Value> {
        self.0.get("reference").and_then(|r| r.get("locus"))
    }

    /// Remove `reference.locus`
    ///
    /// Sessions saved with this field fail to reload for some reference
    /// genomes. Returns whether the field was present.
    pub fn strip_reference_locus(&mut self) -> bool {
        self.0
            .get_mut("reference")
            .and_then(Value::as_object_mut)
            .and_then(|reference| reference.remove("locus"))
            .is_some()
    }

    /// Snapshot ready for persistence
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.strip_reference_locus();
        self
    }

    /// Read the snapshot as a load configuration
    ///
    /// # Errors
    /// Returns an error if the snapshot is not an object of the expected shape.
    pub fn to_load_configuration(&self) -> Result<LoadConfiguration, serde_json::Error> {
        LoadConfiguration::deserialize(&self.0)
    }
}

impl From<Value> for SessionState {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl TryFrom<&LoadConfiguration> for SessionState {
    type Error = serde_json::Error;

    fn try_from(config: &LoadConfiguration) -> Result<Self, Self::Error> {
        config.to_value().map(Self)
    }
}
