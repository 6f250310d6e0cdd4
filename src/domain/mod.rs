pub mod error;
pub mod form;
pub mod model;

pub use error::DownloadError;
pub use form::{build_request, FormState};
pub use model::{
    Bitrate, DownloadRequest, EqualizerPreset, OutputFormat, Provider, Quality, Resolution,
    TransferPhase,
};
