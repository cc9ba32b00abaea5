mod file;

pub use file::{UploadedFile, UploadedFileSummary};
