//! Layer loading error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::FeatureId;

/// Errors produced while validating a layer document.
#[derive(Debug, Error)]
pub enum LayerError {
    #[error("malformed geometry{}: {reason}", describe_feature(.feature))]
    MalformedGeometry {
        /// Input position of the offending feature, if the problem is per-feature
        feature: Option<usize>,
        reason: String,
    },

    #[error("duplicate feature id {0}")]
    DuplicateFeatureId(FeatureId),

    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LayerError {
    pub(crate) fn malformed(feature: Option<usize>, reason: impl Into<String>) -> Self {
        LayerError::MalformedGeometry {
            feature,
            reason: reason.into(),
        }
    }
}

fn describe_feature(feature: &Option<usize>) -> String {
    match feature {
        Some(i) => format!(" in feature {}", i),
        None => String::new(),
    }
}

pub type LayerResult<T> = Result<T, LayerError>;
