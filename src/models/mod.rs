pub mod app_id;
pub mod loaders;
pub mod scan_file;

pub use app_id::{parse_app_id, parse_app_id_from_path, AppId};
pub use loaders::list_scan_files;
pub use scan_file::{DirSnapshot, ScanFile};
