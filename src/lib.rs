//! Panelcraft batch-generates social-media promo images.
//!
//! Each job takes a background photo, finds a calm region for the copy, chooses contrasting
//! colors, composes a declarative [`Template`] and rasterizes it for one output format:
//!
//! - [`compute_region_statistics`] samples candidate regions of a [`SourceImage`]
//! - [`decide_placement`] turns statistics and an optional override into a [`PlacementDecision`]
//! - [`compose_template`] merges campaign copy, format and decision into a [`Template`]
//! - a [`Rasterizer`] (by default [`SvgRasterizer`]) renders it to an [`EncodedImage`]
//! - [`plan_jobs`] and [`Orchestrator::run_batch`] run the whole cross product of sources ×
//!   formats on a bounded worker pool and report a [`BatchSummary`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub(crate) mod analysis;
pub(crate) mod assets;
pub(crate) mod batch;
pub(crate) mod compose;
pub(crate) mod foundation;
pub(crate) mod model;
pub(crate) mod placement;
pub(crate) mod render;

pub use crate::foundation::core::{Point, Rect, Rgb8, Rgba8, luminance};
pub use crate::foundation::error::{PanelError, PanelResult};

pub use crate::analysis::region::{FracBounds, Region, Side};
pub use crate::analysis::stats::{
    RegionStatistics, RegionStatsMap, WORKING_RESOLUTION, compute_region_statistics,
};
pub use crate::assets::logo::{LogoKind, PreparedLogo};
pub use crate::assets::source::{IMAGE_EXTENSIONS, SourceImage, is_image_path, list_images};
pub use crate::assets::store::PreparedAssets;
pub use crate::batch::job::{
    BatchMode, BatchRequest, RenderJob, plan_jobs, select_background, slugify,
};
pub use crate::batch::orchestrator::{BatchConfig, CancelToken, Orchestrator};
pub use crate::batch::summary::{
    BatchStatus, BatchSummary, FailureKind, JobFailure, JobOutcome, SourceTally,
};
pub use crate::compose::composer::{
    Metrics, TALL_SAFE_BOTTOM, TALL_SAFE_TOP, TALL_SCALE_BOOST, compose_template, cover_crop,
};
pub use crate::compose::template::{
    BackgroundLayer, ButtonSpec, CoverImage, Edge, FooterLayer, ImageRef, Layer, LogoLayer,
    LogoRef, OverlayLayer, PanelLayer, Template, TextLine, TextRole,
};
pub use crate::model::campaign::Campaign;
pub use crate::model::catalog::{Catalog, SelectionStrategy};
pub use crate::model::format::{OutputFormat, TALL_ASPECT_THRESHOLD};
pub use crate::placement::decision::{
    Align, OverridePlacement, PlacementDecision, PlacementOverride, PlacementPolicy,
    decide_placement,
};
pub use crate::placement::overrides::OverrideTable;
pub use crate::render::backend::{
    DEFAULT_JPEG_QUALITY, EncodedImage, OutputEncoding, Rasterizer, RasterizerFactory,
    write_encoded,
};
pub use crate::render::cpu::{DEVICE_PIXEL_RATIO, SvgRasterizer, SvgRasterizerFactory};
