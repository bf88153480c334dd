use anyhow::{Context, Result};
use scan_uploader::config::Config;
use scan_uploader::error::ConfigError;
use scan_uploader::utils::logging;
use scan_uploader::App;
use std::path::Path;
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config_path = Config::config_path();
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(ConfigError::DefaultCreated { path }) => {
            print_default_created(&path);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("无法读取配置文件 {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
    };

    // 初始化日志
    if let Err(e) = logging::init(&config) {
        eprintln!(
            "\n请先创建日志目录，确保可以写入 {}\n",
            config.log_file_path().display()
        );
        return Err(e).context("日志初始化失败");
    }

    logging::log_startup(&config);

    if let Err(e) = config.validate() {
        error!("{}", e);
        return Err(e).context("配置无效");
    }

    // 初始化并运行应用
    let app = App::initialize(config)?;
    if let Err(e) = app.run().await {
        error!("{:#}", e);
        eprintln!("{:#}", e);
        return Err(e);
    }

    Ok(())
}

fn print_default_created(path: &Path) {
    println!("=====[ 已生成默认配置文件 ]=====");
    println!();
    println!("已在 {} 生成 scan-uploader 的默认配置文件，", path.display());
    println!("请先修改 watch_location、threadfix_url、threadfix_api_key 等配置项，");
    println!("然后重新运行本程序。");
    println!("=====[ 已生成默认配置文件 ]=====");
    println!();
}
