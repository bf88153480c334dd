pub mod threadfix_client;
pub mod uploader;

pub use threadfix_client::ThreadFixClient;
pub use uploader::{ScanUploader, UploadOutcome};
