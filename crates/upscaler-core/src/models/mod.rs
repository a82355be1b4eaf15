pub mod asset;
pub mod upscale;

pub use asset::{Asset, AssetId, AssetKey, AssetRole};
pub use upscale::{ScaleFactor, ScaleFactorError, UpscaleOutcome, UpscaleRequest};
