use std::sync::Arc;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use scheduler_api::{create_app, AppState};
use scheduler_config::AppConfig;
use scheduler_dispatcher::{
    PriorityScheduler, StuckTaskDetector, StuckTaskDetectorConfig, TaskDispatchService,
};
use scheduler_domain::{DuplicatePolicy, TaskRepository};
use scheduler_infrastructure::{InMemoryTaskRepository, MetricsCollector};
use tokio::{net::TcpListener, sync::broadcast};
use tracing::{error, info};

/// 主应用程序
pub struct Application {
    config: AppConfig,
    dispatch_service: Arc<TaskDispatchService>,
    stuck_detector: Arc<StuckTaskDetector>,
    metrics_handle: Option<PrometheusHandle>,
}

impl Application {
    pub fn new(config: AppConfig, metrics_handle: Option<PrometheusHandle>) -> Result<Self> {
        let policy: DuplicatePolicy = config
            .scheduler
            .duplicate_policy
            .parse()
            .context("解析重复任务策略失败")?;
        info!("初始化应用程序，重复任务策略: {}", policy);

        let task_repo: Arc<dyn TaskRepository> = Arc::new(InMemoryTaskRepository::new());
        let metrics = Arc::new(MetricsCollector::new());

        let dispatch_service = Arc::new(TaskDispatchService::new(
            Arc::new(PriorityScheduler::with_policy(policy)),
            Arc::clone(&task_repo),
            Arc::clone(&metrics),
        ));
        let stuck_detector = Arc::new(StuckTaskDetector::new(
            task_repo,
            metrics,
            Some(StuckTaskDetectorConfig::from(&config.monitor)),
        ));

        Ok(Self {
            config,
            dispatch_service,
            stuck_detector,
            metrics_handle,
        })
    }

    pub fn dispatch_service(&self) -> &Arc<TaskDispatchService> {
        &self.dispatch_service
    }

    /// 运行所有组件直到收到关闭信号
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        if self.config.scheduler.restore_pending_on_startup {
            self.dispatch_service
                .restore_pending_tasks()
                .await
                .context("恢复待调度任务失败")?;
        }

        let detector_handle = if self.config.monitor.enabled {
            let detector = Arc::clone(&self.stuck_detector);
            let shutdown_rx = shutdown_rx.resubscribe();
            Some(tokio::spawn(async move { detector.run(shutdown_rx).await }))
        } else {
            info!("卡住任务检测已禁用");
            None
        };

        if self.config.api.enabled {
            self.run_api(shutdown_rx.resubscribe()).await?;
        } else {
            let _ = shutdown_rx.recv().await;
        }

        if let Some(handle) = detector_handle {
            if let Err(e) = handle.await {
                error!("卡住任务检测任务异常退出: {e}");
            }
        }

        info!("所有组件已停止");
        Ok(())
    }

    async fn run_api(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        info!("启动API服务器: {}", self.config.api.bind_address);

        let state = AppState {
            dispatch_service: Arc::clone(&self.dispatch_service),
            stuck_detector: Arc::clone(&self.stuck_detector),
            metrics_handle: self.metrics_handle.clone(),
        };
        let app = create_app(state, &self.config.api);

        let listener = TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {}", self.config.api.bind_address))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await
            .context("API服务器运行失败")?;

        info!("API服务器已停止");
        Ok(())
    }
}
