//! Error types shared across the viewer

use std::path::PathBuf;

use thiserror::Error;

/// Failures while rasterizing a text label
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("font specifier `{0}` has no unit, expected something like `10px`")]
    MissingFontUnit(String),
    #[error("font unit `{unit}` in `{spec}` is not supported, only `px` is")]
    UnsupportedFontUnit { spec: String, unit: String },
    #[error("font size in `{0}` must be a positive number")]
    InvalidFontSize(String),
    #[error("`{0}` is not a recognised colour")]
    InvalidColor(String),
    #[error("label of {width}x{height} pixels exceeds the {max} pixel texture limit", max = crate::gfx::label::MAX_LABEL_DIMENSION)]
    TooLarge { width: u64, height: u64 },
}

/// Failures while loading a model file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to import model {path:?}")]
    Import {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("model {0:?} contains no scene")]
    NoScene(PathBuf),
    #[error("model load was dropped before it completed")]
    Canceled,
}

/// Failures while attaching a loaded model and its label to the scene
#[derive(Debug, Error)]
pub enum AttachError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("label creation failed")]
    Label(#[from] LabelError),
    #[error("label is already attached")]
    AlreadyAttached,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to acquire the next surface texture")]
    Surface(#[from] wgpu::SurfaceError),
}
