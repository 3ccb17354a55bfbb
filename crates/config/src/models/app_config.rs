use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    api_observability::{ApiConfig, ObservabilityConfig},
    scheduler_monitor::{MonitorConfig, SchedulerConfig},
};
use crate::validation::ConfigValidator;

const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "config/scheduler.toml",
    "scheduler.toml",
    "/etc/priority-scheduler/config.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub scheduler: SchedulerConfig,
    pub monitor: MonitorConfig,
    pub api: ApiConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 加载配置：内置默认值 < 配置文件 < 环境变量（SCHEDULER__API__BIND_ADDRESS 形式）
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = AppConfig::default();
        let mut builder = ConfigBuilder::builder()
            .set_default("scheduler.duplicate_policy", defaults.scheduler.duplicate_policy)?
            .set_default(
                "scheduler.restore_pending_on_startup",
                defaults.scheduler.restore_pending_on_startup,
            )?
            .set_default("monitor.enabled", defaults.monitor.enabled)?
            .set_default(
                "monitor.scan_interval_seconds",
                defaults.monitor.scan_interval_seconds,
            )?
            .set_default(
                "monitor.processing_timeout_seconds",
                defaults.monitor.processing_timeout_seconds,
            )?
            .set_default("monitor.fail_stuck_tasks", defaults.monitor.fail_stuck_tasks)?
            .set_default("api.enabled", defaults.api.enabled)?
            .set_default("api.bind_address", defaults.api.bind_address)?
            .set_default("api.cors_enabled", defaults.api.cors_enabled)?
            .set_default("observability.log_level", defaults.observability.log_level)?
            .set_default("observability.log_format", defaults.observability.log_format)?
            .set_default(
                "observability.metrics_enabled",
                defaults.observability.metrics_enabled,
            )?;

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else if let Some(path) = DEFAULT_CONFIG_PATHS
            .iter()
            .find(|path| Path::new(path).exists())
        {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("SCHEDULER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }
}

impl ConfigValidator for AppConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        self.scheduler.validate()?;
        self.monitor.validate()?;
        self.api.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}
