pub mod service;

pub use service::{PipelineError, UpscaleService};
