mod download_coordinator;

pub use download_coordinator::{DialogPicker, DownloadCoordinator, DownloadEvent, SavePicker};
