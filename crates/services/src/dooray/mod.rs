//! Client for the Dooray Drive REST API and the operations built on it.

pub mod client;
pub mod error;
pub mod model;
pub mod transfer;
pub mod walker;

pub use client::{ApiToken, DoorayClient, UploadPart};
pub use error::{Step, UpstreamError};
pub use model::{Drive, File, Folder, Node};
pub use transfer::{DownloadedFile, FileTransfer};
pub use walker::DriveWalker;
