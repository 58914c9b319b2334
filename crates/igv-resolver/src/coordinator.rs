//! Resolver Coordinator
//!
//! Walks a configuration once, presigns every flagged field concurrently and
//! substitutes the results by field path once every call has settled.

use crate::error::ResolveError;
use crate::presign::Presigner;
use futures::future::try_join_all;
use igv_session::LoadConfiguration;
use igv_uri::{Classifier, ObjectIdentifier};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Position of a protected URL inside a [`LoadConfiguration`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtectedField {
    /// `reference.fastaURL`
    ReferenceFasta,
    /// `reference.indexURL`
    ReferenceIndex,
    /// `tracks[i].url`
    TrackUrl(usize),
    /// `tracks[i].indexURL`
    TrackIndex(usize),
}

impl ProtectedField {
    /// Current value of this field
    #[must_use]
    pub fn value<'a>(&self, config: &'a LoadConfiguration) -> Option<&'a str> {
        match *self {
            Self::ReferenceFasta => config.reference.as_ref().map(|r| r.fasta_url.as_str()),
            Self::ReferenceIndex => config.reference.as_ref().and_then(|r| r.index_url.as_deref()),
            Self::TrackUrl(i) => config.tracks.get(i).map(|t| t.url.as_str()),
            Self::TrackIndex(i) => config.tracks.get(i).and_then(|t| t.index_url.as_deref()),
        }
    }

    /// Object-store identifier this field was last presigned from
    #[must_use]
    pub fn source<'a>(&self, config: &'a LoadConfiguration) -> Option<&'a str> {
        match *self {
            Self::ReferenceFasta => config.reference.as_ref().and_then(|r| r.source_fasta_url.as_deref()),
            Self::ReferenceIndex => config.reference.as_ref().and_then(|r| r.source_index_url.as_deref()),
            Self::TrackUrl(i) => config.tracks.get(i).and_then(|t| t.source_url.as_deref()),
            Self::TrackIndex(i) => config.tracks.get(i).and_then(|t| t.source_index_url.as_deref()),
        }
    }

    fn source_mut<'a>(&self, config: &'a mut LoadConfiguration) -> Option<&'a mut Option<String>> {
        match *self {
            Self::ReferenceFasta => config.reference.as_mut().map(|r| &mut r.source_fasta_url),
            Self::ReferenceIndex => config.reference.as_mut().map(|r| &mut r.source_index_url),
            Self::TrackUrl(i) => config.tracks.get_mut(i).map(|t| &mut t.source_url),
            Self::TrackIndex(i) => config.tracks.get_mut(i).map(|t| &mut t.source_index_url),
        }
    }

    fn slot_mut<'a>(&self, config: &'a mut LoadConfiguration) -> Option<&'a mut String> {
        match *self {
            Self::ReferenceFasta => config.reference.as_mut().map(|r| &mut r.fasta_url),
            Self::ReferenceIndex => config.reference.as_mut().and_then(|r| r.index_url.as_mut()),
            Self::TrackUrl(i) => config.tracks.get_mut(i).map(|t| &mut t.url),
            Self::TrackIndex(i) => config.tracks.get_mut(i).and_then(|t| t.index_url.as_mut()),
        }
    }
}

impl Display for ProtectedField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReferenceFasta => write!(f, "reference.fastaURL"),
            Self::ReferenceIndex => write!(f, "reference.indexURL"),
            Self::TrackUrl(i) => write!(f, "tracks[{i}].url"),
            Self::TrackIndex(i) => write!(f, "tracks[{i}].indexURL"),
        }
    }
}

/// Collect every flagged, non-empty URL with its identifier
///
/// Fields come out in configuration order: reference FASTA, reference index,
/// then each track's URL and index. A field that carries the identifier it
/// was presigned from is classified from that identifier, not from the
/// presigned URL.
///
/// # Errors
/// Returns [`ResolveError::Malformed`] for the first URL that cannot be classified.
pub fn collect_protected(
    config: &LoadConfiguration,
    classifier: &Classifier,
) -> Result<Vec<(ProtectedField, ObjectIdentifier)>, ResolveError> {
    let mut candidates = Vec::new();

    if let Some(reference) = &config.reference {
        if reference.is_presigned_fasta() {
            candidates.push(ProtectedField::ReferenceFasta);
        }
        if reference.is_presigned_index() {
            candidates.push(ProtectedField::ReferenceIndex);
        }
    }
    for (i, track) in config.tracks.iter().enumerate() {
        if track.is_presigned_url() {
            candidates.push(ProtectedField::TrackUrl(i));
        }
        if track.is_presigned_index() {
            candidates.push(ProtectedField::TrackIndex(i));
        }
    }

    candidates
        .into_iter()
        .filter_map(|field| {
            let value = field.value(config).filter(|url| !url.is_empty())?;
            let source = field.source(config).filter(|id| !id.is_empty());
            Some((field, source.unwrap_or(value)))
        })
        .map(|(field, url)| {
            classifier
                .classify(url)
                .map(|id| (field, id))
                .map_err(|source| ResolveError::Malformed { field, source })
        })
        .collect()
}

/// Resolves protected URLs through an injected presigner
#[derive(Clone)]
pub struct ResolverCoordinator {
    presigner: Arc<dyn Presigner>,
    classifier: Classifier,
}

impl fmt::Debug for ResolverCoordinator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverCoordinator")
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}

impl ResolverCoordinator {
    /// Create coordinator with the default `s3` classifier
    #[must_use]
    pub fn new(presigner: Arc<dyn Presigner>) -> Self {
        Self {
            presigner,
            classifier: Classifier::default(),
        }
    }

    /// With classifier
    #[inline]
    #[must_use]
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Classifier in use
    #[inline]
    #[must_use]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Return a copy of `config` with every protected URL presigned
    ///
    /// Classification happens for every field before the first presign call.
    /// Presign calls run concurrently; results are written back by field path
    /// only after all of them have succeeded, each next to the canonical
    /// identifier it came from (`sourceURL`, `sourceIndexURL`,
    /// `sourceFastaURL`). Unflagged fields and the pass-through remainder are
    /// left untouched.
    ///
    /// # Errors
    /// - [`ResolveError::Malformed`] if a flagged URL cannot be classified
    /// - [`ResolveError::ResolutionFailed`] with the first rejection
    pub async fn resolve(
        &self,
        config: &LoadConfiguration,
    ) -> Result<LoadConfiguration, ResolveError> {
        let fields = collect_protected(config, &self.classifier)?;
        if fields.is_empty() {
            return Ok(config.clone());
        }

        tracing::debug!("Resolving {} protected field(s)", fields.len());

        let presigner = &self.presigner;
        let lookups = fields.into_iter().map(|(field, id)| async move {
            match presigner.presign(&id).await {
                Ok(url) => {
                    tracing::debug!(%field, %id, "Presigned");
                    Ok((field, id, url))
                }
                Err(source) => Err(ResolveError::ResolutionFailed {
                    field,
                    identifier: id,
                    source,
                }),
            }
        });

        let resolved = match try_join_all(lookups).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!("Resolution failed: {}", e);
                return Err(e);
            }
        };

        let mut output = config.clone();
        for (field, id, url) in resolved {
            if let Some(slot) = field.slot_mut(&mut output) {
                *slot = url.into_string();
            }
            if let Some(source) = field.source_mut(&mut output) {
                *source = Some(id.to_string());
            }
        }
        Ok(output)
    }
}

/// Resolve `config` with the default classifier
///
/// # Errors
/// See [`ResolverCoordinator::resolve`].
pub async fn resolve(
    config: &LoadConfiguration,
    presigner: Arc<dyn Presigner>,
) -> Result<LoadConfiguration, ResolveError> {
    ResolverCoordinator::new(presigner).resolve(config).await
}
