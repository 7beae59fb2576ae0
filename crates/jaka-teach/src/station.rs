//! 示教站
//!
//! 控制面的统一入口，持有会话、点位存储、位姿同步、序列回放和速度设定，
//! 以类型化的方法暴露全部面板操作。后台线程的结果通过 [`EventReceiver`] 送回调用方。
//!
//! # 同步与使能
//!
//! - 使能成功后启动位姿同步；去使能、下电、关机后停止
//! - 手动编辑关节期间挂起同步（[`begin_joint_edit`](TeachStation::begin_joint_edit)）
//! - [`SyncPolicy::SuspendDuringPlayback`] 时，回放线程存活期间持有挂起守卫

use crate::commander::MotionCommander;
use crate::config::{SyncPolicy, TeachConfig};
use crate::error::{ConfigError, TeachError};
use crate::event::{EventReceiver, EventSink, TeachEvent};
use crate::interpolator::SmoothMoveReport;
use crate::player::{LoopTarget, PlaybackState, PlaybackSummary, SequencePlayer, SequenceRunState};
use crate::poller::LiveSyncPoller;
use crate::store::{PointStore, TaughtPoint};
use jaka_actuator::{ActuatorSession, MotionActuator, SessionState, TimeoutActuator};
use jaka_types::{CartesianPose, Deg, JointArray, JointPose, SharedSpeed, SpeedSetting};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// 示教站
pub struct TeachStation {
    config: TeachConfig,
    session: Arc<ActuatorSession>,
    speed: Arc<SharedSpeed>,
    store: Mutex<PointStore>,
    commander: MotionCommander,
    poller: LiveSyncPoller,
    player: SequencePlayer,
    events: EventSink,
    jog_cancel: AtomicBool,
}

impl TeachStation {
    /// 创建示教站，返回事件接收端
    ///
    /// 配置先经过 [`TeachConfig::validate`]；配置了超时时，执行器会被 [`TimeoutActuator`] 包装。
    pub fn new(
        actuator: Arc<dyn MotionActuator>,
        config: TeachConfig,
    ) -> Result<(Self, EventReceiver), ConfigError> {
        let (events, rx) = EventSink::channel();
        Ok((Self::with_events(actuator, config, events)?, rx))
    }

    /// 使用指定的事件发送端创建示教站
    pub fn with_events(
        actuator: Arc<dyn MotionActuator>,
        config: TeachConfig,
        events: EventSink,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let actuator: Arc<dyn MotionActuator> = if config.timeouts.is_some() {
            Arc::new(TimeoutActuator::new(actuator, config.actuator_timeouts()))
        } else {
            actuator
        };
        let session = Arc::new(ActuatorSession::new(actuator));
        let speed = Arc::new(SharedSpeed::new(config.speed()));

        let commander = MotionCommander::new(session.clone(), speed.clone(), config.smooth);
        let poller = LiveSyncPoller::new(session.clone(), config.sync.interval(), events.clone());
        let player = SequencePlayer::new(
            session.clone(),
            speed.clone(),
            config.playback,
            events.clone(),
        );

        Ok(Self {
            config,
            session,
            speed,
            store: Mutex::new(PointStore::new()),
            commander,
            poller,
            player,
            events,
            jog_cancel: AtomicBool::new(false),
        })
    }

    /// 当前配置
    pub fn config(&self) -> &TeachConfig {
        &self.config
    }

    /// 执行器会话
    pub fn session(&self) -> &ActuatorSession {
        &self.session
    }

    /// 会话状态
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    fn publish(&self, state: SessionState) -> SessionState {
        self.events.emit(TeachEvent::Session(state));
        state
    }

    // ==================== 会话 ====================

    /// 连接控制器
    pub fn connect(&self, address: &str) -> Result<SessionState, TeachError> {
        let state = self.session.connect(address)?;
        Ok(self.publish(state))
    }

    /// 断开连接
    pub fn disconnect(&self) -> Result<SessionState, TeachError> {
        self.poller.stop();
        let state = self.session.disconnect()?;
        Ok(self.publish(state))
    }

    /// 上电
    pub fn power_on(&self) -> Result<SessionState, TeachError> {
        let state = self.session.power_on()?;
        Ok(self.publish(state))
    }

    /// 下电（先去使能），停止位姿同步
    pub fn power_off(&self) -> Result<SessionState, TeachError> {
        self.poller.stop();
        let state = self.session.power_off()?;
        Ok(self.publish(state))
    }

    /// 使能，成功后启动位姿同步
    pub fn enable(&self) -> Result<SessionState, TeachError> {
        let state = self.session.enable()?;
        self.poller.start();
        Ok(self.publish(state))
    }

    /// 去使能，停止位姿同步
    pub fn disable(&self) -> Result<SessionState, TeachError> {
        self.poller.stop();
        let state = self.session.disable()?;
        Ok(self.publish(state))
    }

    /// 中止运动并关闭控制柜，停止位姿同步
    pub fn shutdown(&self) -> Result<SessionState, TeachError> {
        self.poller.stop();
        let state = self.session.shutdown()?;
        Ok(self.publish(state))
    }

    // ==================== 速度 ====================

    /// 当前速度
    pub fn speed(&self) -> SpeedSetting {
        self.speed.get()
    }

    /// 设置速度百分比（限幅到 [5, 100] 并量化到 0.25）
    pub fn set_speed(&self, percent: f64) -> SpeedSetting {
        let speed = SpeedSetting::from_percent(percent);
        self.speed.set(speed);
        info!("Speed set to {} (ratio {:.4})", speed, speed.ratio());
        speed
    }

    // ==================== 运动 ====================

    /// 单关节平滑移动（阻塞，可由 [`cancel_jog`](Self::cancel_jog) 取消）
    pub fn jog(&self, joint_number: usize, target: Deg) -> Result<SmoothMoveReport, TeachError> {
        self.jog_cancel.store(false, Ordering::Release);
        Ok(self
            .commander
            .jog_joint(joint_number, target, &self.jog_cancel)?)
    }

    /// 取消正在进行的平滑移动（在下一步之前生效）
    pub fn cancel_jog(&self) {
        self.jog_cancel.store(true, Ordering::Release);
    }

    /// 全关节移动
    pub fn move_all(&self, targets: &JointArray<Deg>) -> Result<(), TeachError> {
        Ok(self.commander.move_all(targets)?)
    }

    /// 回到零位
    pub fn move_home(&self) -> Result<(), TeachError> {
        Ok(self.commander.move_home()?)
    }

    /// 读取末端位姿
    pub fn cartesian_pose(&self) -> Result<CartesianPose, TeachError> {
        Ok(self.commander.cartesian_pose()?)
    }

    /// 笛卡尔直线移动，返回逆解结果
    pub fn move_linear(&self, target: &CartesianPose) -> Result<JointPose, TeachError> {
        Ok(self.commander.move_linear(target)?)
    }

    /// 逆解后关节移动到笛卡尔目标，返回逆解结果
    pub fn move_joint_to_cartesian(&self, target: &CartesianPose) -> Result<JointPose, TeachError> {
        Ok(self.commander.move_joint_to_cartesian(target)?)
    }

    // ==================== 点位 ====================

    /// 记录当前位置
    pub fn record(
        &self,
        name: Option<&str>,
        delay_secs: Option<f64>,
    ) -> Result<TaughtPoint, TeachError> {
        let mut store = self.store.lock();
        let point = store.record(&self.session, name, delay_secs)?;
        Ok(point.clone())
    }

    /// 点位快照
    pub fn points(&self) -> Vec<TaughtPoint> {
        self.store.lock().snapshot()
    }

    /// 点位数
    pub fn point_count(&self) -> usize {
        self.store.lock().len()
    }

    /// 清空点位
    pub fn clear_points(&self) {
        self.store.lock().clear();
        info!("Cleared all points");
    }

    /// 保存点位，返回写入的点位数
    pub fn save_points<P: AsRef<Path>>(&self, path: P) -> Result<usize, TeachError> {
        Ok(self.store.lock().save(path)?)
    }

    /// 加载点位（替换现有点位，失败时保持不变）
    pub fn load_points<P: AsRef<Path>>(&self, path: P) -> Result<usize, TeachError> {
        Ok(self.store.lock().load(path)?)
    }

    // ==================== 回放 ====================

    /// 开始回放当前点位
    pub fn run(&self, target: LoopTarget) -> Result<(), TeachError> {
        let points = self.points();
        match self.config.sync.policy {
            SyncPolicy::Concurrent => self.player.start(points, target)?,
            SyncPolicy::SuspendDuringPlayback => {
                let guard = self.poller.suspend_guard();
                self.player.start_holding(points, target, guard)?
            },
        }
        Ok(())
    }

    /// 暂停回放
    pub fn pause(&self) -> bool {
        self.player.pause()
    }

    /// 恢复回放
    pub fn resume(&self) -> bool {
        self.player.resume()
    }

    /// 请求停止回放（在下一个点位边界生效）
    pub fn stop(&self) -> bool {
        self.player.stop()
    }

    /// 等待回放结束
    pub fn wait(&self) -> Option<PlaybackSummary> {
        self.player.wait()
    }

    /// 回放状态
    pub fn playback_state(&self) -> PlaybackState {
        self.player.state()
    }

    /// 回放状态快照
    pub fn playback_snapshot(&self) -> SequenceRunState {
        self.player.snapshot()
    }

    // ==================== 位姿同步 ====================

    /// 开始手动编辑关节（挂起同步）
    pub fn begin_joint_edit(&self) {
        self.poller.suspend();
    }

    /// 结束手动编辑关节（恢复同步）
    pub fn end_joint_edit(&self) {
        self.poller.resume();
    }

    /// 启动位姿同步
    pub fn start_sync(&self) -> bool {
        self.poller.start()
    }

    /// 停止位姿同步
    pub fn stop_sync(&self) -> bool {
        self.poller.stop()
    }

    /// 位姿同步是否在运行
    pub fn sync_running(&self) -> bool {
        self.poller.is_running()
    }

    /// 位姿同步是否挂起
    pub fn sync_suspended(&self) -> bool {
        self.poller.is_suspended()
    }

    /// 最近一次同步的位姿（度）
    pub fn latest_pose(&self) -> Option<Arc<JointArray<Deg>>> {
        self.poller.latest()
    }
}
