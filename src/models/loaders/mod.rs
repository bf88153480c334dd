pub mod dir_loader;

pub use dir_loader::list_scan_files;
