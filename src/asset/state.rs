//! Built asset and its lifecycle.

use super::AssetError;
use crate::engine::AssetSpec;

/// Lifecycle of an asset. Moves out of `Pending` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetState {
    Pending,
    Created,
    Failed,
}

/// One produced asset, addressed by its public URL.
#[derive(Debug)]
pub struct Asset {
    url: &'static str,
    mimetype: &'static str,
    contents: Option<String>,
    state: AssetState,
    failure: Option<AssetError>,
}

impl Asset {
    /// A pending asset for `spec`.
    pub fn pending(spec: &AssetSpec) -> Self {
        Self {
            url: spec.url(),
            mimetype: spec.mimetype(),
            contents: None,
            state: AssetState::Pending,
            failure: None,
        }
    }

    pub fn url(&self) -> &'static str {
        self.url
    }

    pub fn mimetype(&self) -> &'static str {
        self.mimetype
    }

    pub fn state(&self) -> AssetState {
        self.state
    }

    /// Built contents; `None` unless the asset was created.
    pub fn contents(&self) -> Option<&str> {
        match self.state {
            AssetState::Created => self.contents.as_deref(),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&AssetError> {
        self.failure.as_ref()
    }

    /// Take the recorded failure out of a failed asset.
    pub fn take_failure(&mut self) -> Option<AssetError> {
        self.failure.take()
    }

    /// Resolve to `Created`. Ignored unless pending; returns whether it applied.
    pub fn create(&mut self, contents: String) -> bool {
        if self.state != AssetState::Pending {
            return false;
        }
        self.contents = Some(contents);
        self.state = AssetState::Created;
        true
    }

    /// Resolve to `Failed`. Ignored unless pending; returns whether it applied.
    pub fn fail(&mut self, error: AssetError) -> bool {
        if self.state != AssetState::Pending {
            return false;
        }
        self.failure = Some(error);
        self.state = AssetState::Failed;
        true
    }
}
