/// ThreadFix API 客户端
///
/// 负责把扫描文件上传到 ThreadFix，并把响应归类为 `UploadOutcome`
use crate::clients::uploader::{ScanUploader, UploadOutcome};
use crate::config::Config;
use crate::models::AppId;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// ThreadFix 上传接口的响应
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "responseCode", default)]
    pub response_code: Option<i64>,
}

/// ThreadFix API 客户端
///
/// 整个批次共用一个 `reqwest::Client`
pub struct ThreadFixClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ThreadFixClient {
    /// 根据配置创建客户端
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .context("无法创建 ThreadFix HTTP 客户端")?;

        Ok(Self {
            http,
            base_url: config.threadfix_url.trim_end_matches('/').to_string(),
            api_key: config.threadfix_api_key.clone(),
        })
    }

    /// 上传接口地址
    fn upload_url(&self, app_id: AppId) -> String {
        format!("{}/rest/applications/{}/upload", self.base_url, app_id)
    }

    /// 把 HTTP 200 的响应体归类
    ///
    /// - 无法解析为响应对象 → `MalformedResponse`
    /// - `success == false` → `ContentRejected`
    pub fn classify_body(body: &str) -> UploadOutcome {
        let response: UploadResponse = match serde_json::from_str(body) {
            Ok(r) => r,
            Err(e) => return UploadOutcome::malformed(e.to_string()),
        };

        let message = response.message.unwrap_or_default();
        if response.success {
            UploadOutcome::success(message)
        } else {
            match response.response_code {
                Some(code) => {
                    UploadOutcome::rejected(format!("{} (responseCode {})", message, code))
                }
                None => UploadOutcome::rejected(message),
            }
        }
    }
}

#[async_trait]
impl ScanUploader for ThreadFixClient {
    async fn upload(&self, file_path: &Path, app_id: AppId) -> UploadOutcome {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let bytes = match tokio::fs::read(file_path).await {
            Ok(b) => b,
            Err(e) => {
                return UploadOutcome::transport(format!(
                    "无法读取文件 {}: {}",
                    file_path.display(),
                    e
                ))
            }
        };

        let url = self.upload_url(app_id);
        debug!("上传 {} ({} 字节) → {}", file_path.display(), bytes.len(), url);

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));

        let response = match self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("APIKEY {}", self.api_key))
            .multipart(form)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return UploadOutcome::transport(format!("请求失败 ({}): {}", url, e)),
        };

        let status = response.status();
        if !status.is_success() {
            return UploadOutcome::transport(format!("HTTP {} ({})", status, url));
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => return UploadOutcome::transport(format!("读取响应失败: {}", e)),
        };

        debug!("上传结果: {}", body);

        Self::classify_body(&body)
    }
}
