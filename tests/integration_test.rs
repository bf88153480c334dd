use async_trait::async_trait;
use scan_uploader::clients::{ScanUploader, UploadOutcome};
use scan_uploader::config::Config;
use scan_uploader::models::AppId;
use scan_uploader::App;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// 按文件名返回预设结果的上传器，未配置的文件视为上传成功
#[derive(Default)]
struct ScriptedUploader {
    outcomes: HashMap<String, UploadOutcome>,
    calls: Mutex<Vec<(String, AppId)>>,
}

impl ScriptedUploader {
    fn with(mut self, file_name: &str, outcome: UploadOutcome) -> Self {
        self.outcomes.insert(file_name.to_string(), outcome);
        self
    }

    fn calls(&self) -> Vec<(String, AppId)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScanUploader for ScriptedUploader {
    async fn upload(&self, path: &Path, app_id: AppId) -> UploadOutcome {
        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        self.calls
            .lock()
            .unwrap()
            .push((file_name.clone(), app_id));
        self.outcomes
            .get(&file_name)
            .cloned()
            .unwrap_or_else(|| UploadOutcome::success("ok"))
    }
}

fn write_files(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), format!("<scan name=\"{}\"/>", name)).unwrap();
    }
}

fn config_for(dir: &Path) -> Config {
    Config {
        watch_location: dir.to_string_lossy().to_string(),
        threadfix_url: "http://threadfix.invalid".to_string(),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_end_to_end_mixed_batch() {
    let dir = TempDir::new().unwrap();
    write_files(
        dir.path(),
        &["5_[App].xml", "bad.xml", "7_[App2].xml", "9_[App3].xml"],
    );
    std::fs::create_dir(dir.path().join("nested")).unwrap();

    let uploader = Arc::new(
        ScriptedUploader::default()
            .with("7_[App2].xml", UploadOutcome::rejected("Invalid scan format"))
            .with("9_[App3].xml", UploadOutcome::transport("operation timed out")),
    );
    let app = App::with_uploader(config_for(dir.path()), uploader.clone());

    let report = app.run().await.expect("批处理应该成功");

    // 上传成功 → 删除
    assert!(!dir.path().join("5_[App].xml").exists());
    // 文件名错误 → 隔离
    assert!(!dir.path().join("bad.xml").exists());
    assert!(dir.path().join("parse-errors/bad.xml").exists());
    // 内容被拒绝 → 隔离
    assert!(!dir.path().join("7_[App2].xml").exists());
    assert!(dir.path().join("parse-errors/7_[App2].xml").exists());
    // 网络失败 → 保留原处且内容不变
    assert_eq!(
        std::fs::read_to_string(dir.path().join("9_[App3].xml")).unwrap(),
        "<scan name=\"9_[App3].xml\"/>"
    );
    // 子目录不处理
    assert!(dir.path().join("nested").is_dir());

    assert_eq!(report.total_entries, 5);
    assert_eq!(report.regular_files, 4);
    assert_eq!(report.uploaded, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.quarantined, 2);
    assert_eq!(report.left_in_place, 1);
    assert_eq!(report.delete_failed, 0);

    // bad.xml 不会被上传
    let mut called: Vec<_> = uploader.calls();
    called.sort();
    assert_eq!(
        called,
        vec![
            ("5_[App].xml".to_string(), AppId(5)),
            ("7_[App2].xml".to_string(), AppId(7)),
            ("9_[App3].xml".to_string(), AppId(9)),
        ]
    );
}

#[tokio::test]
async fn test_second_run_processes_nothing() {
    let dir = TempDir::new().unwrap();
    write_files(dir.path(), &["1_[A].xml", "no-id.xml", "x_[B].xml"]);

    let first = Arc::new(ScriptedUploader::default());
    App::with_uploader(config_for(dir.path()), first.clone())
        .run()
        .await
        .unwrap();
    assert_eq!(first.calls().len(), 1);

    let second = Arc::new(ScriptedUploader::default());
    let report = App::with_uploader(config_for(dir.path()), second.clone())
        .run()
        .await
        .unwrap();

    assert!(second.calls().is_empty(), "第二次运行不应上传任何文件");
    assert_eq!(report.regular_files, 0);
    assert_eq!(report.uploaded + report.quarantined + report.left_in_place, 0);
    assert_eq!(
        std::fs::read_dir(dir.path().join("parse-errors"))
            .unwrap()
            .count(),
        2
    );
}

#[tokio::test]
async fn test_empty_directory_is_successful_noop() {
    let dir = TempDir::new().unwrap();
    let uploader = Arc::new(ScriptedUploader::default());

    let report = App::with_uploader(config_for(dir.path()), uploader.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(report.total_entries, 0);
    assert!(uploader.calls().is_empty());
    assert!(!dir.path().join("parse-errors").exists());
}

#[tokio::test]
async fn test_unreadable_watch_dir_fails_batch() {
    let dir = TempDir::new().unwrap();
    let uploader = Arc::new(ScriptedUploader::default());

    let result = App::with_uploader(config_for(&dir.path().join("missing")), uploader)
        .run()
        .await;

    assert!(result.is_err(), "无法读取目录时应返回错误");
}

#[cfg(unix)]
#[tokio::test]
async fn test_non_utf8_file_name_is_quarantined() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = TempDir::new().unwrap();
    let name = OsStr::from_bytes(b"bad\xff.xml");
    std::fs::write(dir.path().join(name), "<scan/>").unwrap();
    let uploader = Arc::new(ScriptedUploader::default());

    let report = App::with_uploader(config_for(dir.path()), uploader.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(report.regular_files, 1);
    assert_eq!(report.quarantined, 1);
    assert_eq!(report.left_in_place, 0);
    assert!(uploader.calls().is_empty());
    assert!(!dir.path().join(name).exists());
    assert!(dir.path().join("parse-errors").join(name).exists());
}
