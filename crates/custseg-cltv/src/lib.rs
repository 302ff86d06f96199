#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod models;
pub mod optimize;
pub mod projector;
pub mod special;
pub mod tier;

pub use error::{CltvError, Result};
pub use models::{
    BetaGeoFitter, BetaGeoModel, BetaGeoParams, FitConfig, GammaGammaFitter, GammaGammaModel,
    GammaGammaParams, LifetimeHorizon, PurchaseModel, SpendModel,
};
pub use optimize::{Minimum, NelderMead, NelderMeadConfig};
pub use projector::{CltvConfig, CltvDataset, CltvProjector, CltvRecord, CltvTable, TierSummary};
pub use tier::{Tier, assign_tiers};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
