use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use scheduler_config::MonitorConfig;
use scheduler_domain::{StatusChange, Task, TaskRepository, TaskStatus};
use scheduler_errors::SchedulerResult;
use scheduler_infrastructure::MetricsCollector;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// 卡住任务检测配置
#[derive(Debug, Clone)]
pub struct StuckTaskDetectorConfig {
    /// 检测间隔（秒）
    pub scan_interval_seconds: u64,
    /// PROCESSING 状态超时时间（秒）
    pub processing_timeout_seconds: u64,
    /// 是否把卡住的任务标记为 FAILED
    pub fail_stuck_tasks: bool,
}

impl Default for StuckTaskDetectorConfig {
    fn default() -> Self {
        Self {
            scan_interval_seconds: 60,
            processing_timeout_seconds: 900, // 15分钟
            fail_stuck_tasks: false,
        }
    }
}

impl From<&MonitorConfig> for StuckTaskDetectorConfig {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            scan_interval_seconds: config.scan_interval_seconds,
            processing_timeout_seconds: config.processing_timeout_seconds,
            fail_stuck_tasks: config.fail_stuck_tasks,
        }
    }
}

/// 卡住任务检测器
///
/// 周期性查询处于 PROCESSING 且长时间未更新的任务。
pub struct StuckTaskDetector {
    task_repo: Arc<dyn TaskRepository>,
    metrics: Arc<MetricsCollector>,
    config: StuckTaskDetectorConfig,
}

impl StuckTaskDetector {
    pub fn new(
        task_repo: Arc<dyn TaskRepository>,
        metrics: Arc<MetricsCollector>,
        config: Option<StuckTaskDetectorConfig>,
    ) -> Self {
        Self {
            task_repo,
            metrics,
            config: config.unwrap_or_default(),
        }
    }

    pub fn config(&self) -> &StuckTaskDetectorConfig {
        &self.config
    }

    /// 超时时间超出 chrono 可表示范围时截断到最早时间，此时不会有任务被判定为卡住
    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        i64::try_from(self.config.processing_timeout_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|timeout| now.checked_sub_signed(timeout))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// 只查询，不修改任务状态
    pub async fn find_stuck_tasks(&self) -> SchedulerResult<Vec<Task>> {
        let tasks = self.task_repo.find_stuck_tasks(self.cutoff(Utc::now())).await?;
        self.metrics.update_stuck_tasks(tasks.len());
        Ok(tasks)
    }

    /// 执行一次检测；开启 `fail_stuck_tasks` 时返回的是已标记为 FAILED 的任务
    pub async fn scan_once(&self) -> SchedulerResult<Vec<Task>> {
        debug!("开始检测卡住的任务");
        let stuck = self.find_stuck_tasks().await?;

        for task in &stuck {
            warn!(
                task_id = %task.id(),
                "检测到卡住的任务: {} (上次更新: {})",
                task.name(),
                task.updated_at().format("%Y-%m-%d %H:%M:%S UTC")
            );
        }

        if !self.config.fail_stuck_tasks {
            return Ok(stuck);
        }

        let mut failed = Vec::with_capacity(stuck.len());
        for task in stuck {
            match self.task_repo.update_status(task.id(), TaskStatus::Failed).await {
                Ok(StatusChange { from, task: updated }) => {
                    self.metrics.record_transition(from, TaskStatus::Failed);
                    info!(task_id = %updated.id(), "卡住的任务已标记为失败");
                    failed.push(updated);
                }
                Err(e) => error!(task_id = %task.id(), "标记卡住的任务失败: {}", e),
            }
        }
        self.metrics.update_stuck_tasks(0);
        Ok(failed)
    }

    /// 检测循环，收到关闭信号后退出
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            "启动卡住任务检测，间隔 {} 秒，超时 {} 秒",
            self.config.scan_interval_seconds, self.config.processing_timeout_seconds
        );

        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.scan_interval_seconds.max(1)));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.scan_once().await {
                        Ok(tasks) if !tasks.is_empty() => {
                            info!("本轮检测到 {} 个卡住的任务", tasks.len());
                        }
                        Ok(_) => {}
                        Err(e) => error!("卡住任务检测出错: {}", e),
                    }
                }
                _ = shutdown.recv() => {
                    info!("收到停止信号，退出卡住任务检测循环");
                    break;
                }
            }
        }
    }
}
