//! Build inputs and their cache fingerprint.

use std::path::{Component, Path, PathBuf};

/// Source set and options for one graph build.
///
/// Immutable once constructed; options are set through consuming builder
/// methods. The normalized form ([`BuildInputs::fingerprint`]) is the
/// cache key, so two input sets naming the same sources the same way map
/// to the same build.
#[derive(Debug, Clone)]
pub struct BuildInputs {
    transit: Option<PathBuf>,
    street: Option<PathBuf>,
    transfer_radius_m: Option<u32>,
    flex_service: bool,
}

impl BuildInputs {
    pub fn transit_only(feed: impl Into<PathBuf>) -> Self {
        Self {
            transit: Some(feed.into()),
            street: None,
            transfer_radius_m: None,
            flex_service: false,
        }
    }

    pub fn street_only(extract: impl Into<PathBuf>) -> Self {
        Self {
            transit: None,
            street: Some(extract.into()),
            transfer_radius_m: None,
            flex_service: false,
        }
    }

    pub fn combined(extract: impl Into<PathBuf>, feed: impl Into<PathBuf>) -> Self {
        Self {
            transit: Some(feed.into()),
            street: Some(extract.into()),
            transfer_radius_m: None,
            flex_service: false,
        }
    }

    /// Enable transfer generation. Radius `0` keeps it disabled.
    #[must_use]
    pub fn with_transfer_radius(mut self, radius_m: u32) -> Self {
        self.transfer_radius_m = (radius_m > 0).then_some(radius_m);
        self
    }

    /// Mark the feed as carrying flexible/on-demand service.
    #[must_use]
    pub fn with_flex_service(mut self) -> Self {
        self.flex_service = true;
        self
    }

    pub fn transit_path(&self) -> Option<&Path> {
        self.transit.as_deref()
    }

    pub fn street_path(&self) -> Option<&Path> {
        self.street.as_deref()
    }

    pub fn transfer_radius_m(&self) -> Option<u32> {
        self.transfer_radius_m
    }

    pub fn flex_service(&self) -> bool {
        self.flex_service
    }

    pub(crate) fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            transit: self.transit.as_deref().map(normalize_path),
            street: self.street.as_deref().map(normalize_path),
            transfer_radius_m: self.transfer_radius_m,
            flex_service: self.flex_service,
        }
    }
}

/// Normalized identity of a build's input combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Fingerprint {
    pub(crate) transit: Option<PathBuf>,
    pub(crate) street: Option<PathBuf>,
    pub(crate) transfer_radius_m: Option<u32>,
    pub(crate) flex_service: bool,
}

/// Absolute, lexically normalized form of `path`.
///
/// Never touches the filesystem: a missing source must stay a read-stage
/// failure, not a fingerprinting one.
fn normalize_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
