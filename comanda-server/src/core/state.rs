use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::auth::JwtService;
use crate::core::Config;
use crate::orders::{OrderStore, TransitionEngine};
use crate::realtime::{ConnectionRegistry, EventBroadcaster};

/// 服务器状态 - 持有所有服务的单例引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | store | Arc<OrderStore> | 订单权威存储 |
/// | engine | Arc<TransitionEngine> | 状态流转引擎 |
/// | registry | Arc<ConnectionRegistry> | 实时连接注册表 |
/// | jwt_service | Arc<JwtService> | 令牌验证服务 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 订单权威存储
    pub store: Arc<OrderStore>,
    /// 状态流转引擎 - 所有订单变更的唯一入口
    pub engine: Arc<TransitionEngine>,
    /// 实时连接注册表
    pub registry: Arc<ConnectionRegistry>,
    /// 令牌验证服务
    pub jwt_service: Arc<JwtService>,
    /// 关闭信号令牌
    shutdown: CancellationToken,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按依赖顺序组装: store → registry → broadcaster → engine。
    /// 所有变更都经由 engine 写入 store 并同步发布到 broadcaster。
    pub fn initialize(config: &Config) -> Self {
        let store = Arc::new(OrderStore::new());
        let registry = Arc::new(ConnectionRegistry::new(config.heartbeat_timeout_ms as i64));
        let broadcaster = Arc::new(EventBroadcaster::new(registry.clone()));
        let engine = Arc::new(TransitionEngine::new(store.clone(), broadcaster));
        let jwt_service = Arc::new(JwtService::new(&config.jwt_secret));

        Self {
            config: config.clone(),
            store,
            engine,
            registry,
            jwt_service,
            shutdown: CancellationToken::new(),
        }
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用
    ///
    /// 启动的任务：
    /// - 死连接清扫 (心跳超时回收)
    pub fn start_background_tasks(&self) {
        let registry = self.registry.clone();
        let interval = self.config.sweep_interval_ms;
        let token = self.shutdown.clone();
        tokio::spawn(async move {
            registry.run_sweeper(interval, token).await;
        });
    }

    /// 获取关闭令牌 (用于监控关闭信号)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }
}
