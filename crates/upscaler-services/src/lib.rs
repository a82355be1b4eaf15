pub mod cleanup;
pub mod upscale;

pub use cleanup::{RetentionSweeper, SweepReport};
pub use upscale::{PipelineError, UpscaleService};
