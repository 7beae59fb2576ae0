//! REPL 模式（交互式示教 Shell）
//!
//! 专用输入线程 + crossbeam 通道，保留历史记录，不阻塞 tokio。
//! 命令在 `spawn_blocking` 中执行；Ctrl+C 由输入线程直接取消平滑移动并停止回放。

use crate::utils::{describe_event, print_points, simulated_actuator};
use crate::validation::{PathValidator, parse_cartesian, parse_joint_list};
use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, bounded};
use jaka_teach::{EventReceiver, LoopTarget, TeachConfig, TeachStation};
use jaka_types::Deg;
use rustyline::Editor;
use std::path::Path;
use std::sync::Arc;
use std::thread;

/// 未指定地址时连接的控制器
const DEFAULT_ADDRESS: &str = "sim";

/// Ctrl+C 回调
type InterruptHandler = Arc<dyn Fn() + Send + Sync>;

/// REPL 输入（专用输入线程）
pub struct ReplInput {
    command_rx: Receiver<String>,
    _input_thread: thread::JoinHandle<Result<()>>,
}

impl ReplInput {
    /// 创建专用输入线程（保留历史记录）
    ///
    /// `on_interrupt` 在输入线程内、Ctrl+C 发生时立即调用。
    pub fn new(on_interrupt: InterruptHandler) -> Self {
        let (command_tx, command_rx) = bounded::<String>(10);

        // Editor 在专用线程内创建（生命周期 = REPL 会话）
        let input_thread = thread::spawn(move || {
            use rustyline::history::DefaultHistory;

            let mut rl = Editor::<(), DefaultHistory>::new()
                .map_err(|e| anyhow::anyhow!("Failed to initialize readline: {}", e))?;

            let history_path = ".jaka_history";
            rl.load_history(history_path).ok(); // 首次运行时不存在

            println!("JAKA CLI v{} - 交互式示教 Shell", env!("CARGO_PKG_VERSION"));
            println!("输入 'help' 查看帮助，'exit' 退出");
            println!();

            loop {
                let readline = rl.readline("jaka> ");

                match readline {
                    Ok(line) => {
                        let line: String = line.trim().to_string();

                        if line.is_empty() {
                            continue;
                        }

                        if line == "exit" || line == "quit" {
                            rl.save_history(history_path).ok();
                            let _ = command_tx.send(line);
                            break;
                        }

                        let _ = rl.add_history_entry(line.clone());

                        if command_tx.send(line).is_err() {
                            break; // 主线程已关闭
                        }
                    },

                    Err(rustyline::error::ReadlineError::Interrupted) => {
                        println!("^C");
                        on_interrupt();
                        let _ = command_tx.send("SIGINT".to_string());
                    },

                    Err(rustyline::error::ReadlineError::Eof) => {
                        // Ctrl+D：退出
                        rl.save_history(history_path).ok();
                        let _ = command_tx.send("exit".to_string());
                        break;
                    },

                    Err(err) => {
                        eprintln!("Error: {:?}", err);
                        break;
                    },
                }
            }

            Ok(())
        });

        Self {
            command_rx,
            _input_thread: input_thread,
        }
    }

    /// 等待用户输入（在 tokio 任务中使用）
    pub async fn recv_command(&self) -> Option<String> {
        let rx = self.command_rx.clone();
        tokio::task::spawn_blocking(move || rx.recv())
            .await
            .ok()
            .and_then(|result| result.ok())
    }
}

/// 后台打印示教站事件
fn spawn_event_printer(events: EventReceiver) {
    let spawned = thread::Builder::new()
        .name("jaka-events".to_string())
        .spawn(move || {
            // 示教站释放后通道断开，线程退出
            for event in events.iter() {
                if let Some(text) = describe_event(&event) {
                    println!("{}", text);
                }
            }
        });
    if let Err(e) = spawned {
        tracing::warn!("Failed to spawn event printer: {}", e);
    }
}

/// 运行 REPL 模式
pub async fn run_repl(config: TeachConfig) -> Result<()> {
    let (station, events) =
        TeachStation::new(simulated_actuator(), config).context("配置无效")?;
    let station = Arc::new(station);
    spawn_event_printer(events);

    let interrupt_target = station.clone();
    let input = ReplInput::new(Arc::new(move || {
        interrupt_target.cancel_jog();
        interrupt_target.stop();
    }));

    println!();
    println!("💡 提示: connect → power-on → enable 后即可示教（模拟执行器）");
    println!();

    loop {
        tokio::select! {
            // 优先级1：用户输入
            line = input.recv_command() => {
                let Some(line) = line else {
                    break; // 输入线程已退出
                };

                match line.as_str() {
                    "SIGINT" => {
                        eprintln!("🛑 已取消移动并请求停止回放");
                    }

                    "exit" | "quit" => {
                        println!("👋 再见！");
                        break;
                    }

                    "help" => {
                        print_help();
                    }

                    _ => {
                        // 阻塞命令放到专用线程；panic 被 JoinError 隔离
                        let worker = station.clone();
                        let command = line.clone();
                        match tokio::task::spawn_blocking(move || handle_command(&command, &worker)).await {
                            Ok(Ok(())) => {},
                            Ok(Err(err)) => {
                                eprintln!("❌ Error: {:#}", err);
                                print_help_hint(&line);
                            },
                            Err(panic_err) => {
                                eprintln!("❌ Command panicked: {}", panic_err);
                            },
                        }
                    }
                }
            }

            // 优先级2：输入线程之外收到的 Ctrl+C
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\n🛑 收到 Ctrl+C，停止回放...");
                station.cancel_jog();
                station.stop();
                break;
            }
        }
    }

    // 退出前结束回放
    station.stop();
    let closer = station.clone();
    tokio::task::spawn_blocking(move || closer.wait())
        .await
        .map_err(|e| anyhow::anyhow!("任务执行失败: {}", e))?;

    Ok(())
}

/// 处理命令（阻塞）
fn handle_command(line: &str, station: &TeachStation) -> Result<()> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    let Some(&command) = parts.first() else {
        return Ok(());
    };
    let args = &parts[1..];

    match command {
        // ==================== 会话 ====================
        "connect" => {
            let address = args.first().copied().unwrap_or(DEFAULT_ADDRESS);
            println!("⏳ 连接到 {}...", address);
            station.connect(address)?;
            println!("✅ 已连接");
        },

        "disconnect" => {
            station.disconnect()?;
            println!("✅ 已断开");
        },

        "power-on" => {
            station.power_on()?;
            println!("✅ 已上电");
        },

        "power-off" => {
            station.power_off()?;
            println!("✅ 已下电");
        },

        "enable" => {
            station.enable()?;
            println!("✅ 已使能（位姿同步已启动）");
        },

        "disable" => {
            station.disable()?;
            println!("✅ 已去使能");
        },

        "shutdown" => {
            station.stop();
            station.shutdown()?;
            println!("✅ 已关机");
        },

        "status" => print_status(station),

        // ==================== 速度 ====================
        "speed" => match args.first() {
            Some(value) => {
                let percent: f64 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("无效的速度: {}", value))?;
                let speed = station.set_speed(percent);
                println!("⚡ 速度: {} (比例 {:.4})", speed, speed.ratio());
            },
            None => {
                let speed = station.speed();
                println!("⚡ 速度: {} (比例 {:.4})", speed, speed.ratio());
            },
        },

        // ==================== 运动 ====================
        "jog" => {
            let [joint, deg] = args else {
                anyhow::bail!("用法: jog <关节 1-6> <角度>");
            };
            let joint: usize = joint
                .parse()
                .map_err(|_| anyhow::anyhow!("无效的关节编号: {}", joint))?;
            let deg: f64 = deg
                .parse()
                .map_err(|_| anyhow::anyhow!("无效的角度: {}", deg))?;

            println!("⏳ J{} → {}", joint, Deg(deg));
            let report = station.jog(joint, Deg(deg))?;
            if report.cancelled {
                println!("⚠️  已取消（完成 {} 步）", report.steps_completed);
            } else if report.is_clean() {
                println!("✅ 到位（{} 步）", report.steps_completed);
            } else {
                println!(
                    "⚠️  完成，{} 步失败{}",
                    report.steps_failed,
                    report
                        .last_error
                        .map(|e| format!("（最后错误: {}）", e))
                        .unwrap_or_default()
                );
            }
        },

        "move-all" => {
            let joints = args
                .first()
                .ok_or_else(|| anyhow::anyhow!("缺少关节角度"))?;
            let targets = parse_joint_list(joints)?;
            println!("⏳ 移动到 {}", targets);
            station.move_all(&targets)?;
            println!("✅ 移动完成");
        },

        "home" => {
            println!("⏳ 回到零位...");
            station.move_home()?;
            println!("✅ 回零完成");
        },

        "pose" => {
            let pose = station.cartesian_pose()?;
            println!("📍 末端: {}", pose);
            if let Some(joints) = station.latest_pose() {
                println!("📍 关节: {}", joints);
            }
        },

        "linear" => {
            let target = parse_cartesian(
                args.first()
                    .ok_or_else(|| anyhow::anyhow!("缺少目标位姿"))?,
            )?;
            println!("⏳ 直线移动到 {}", target);
            let solution = station.move_linear(&target)?;
            println!("✅ 移动完成，逆解: {}", solution.to_degrees());
        },

        "ik-move" => {
            let target = parse_cartesian(
                args.first()
                    .ok_or_else(|| anyhow::anyhow!("缺少目标位姿"))?,
            )?;
            println!("⏳ 关节移动到 {}", target);
            let solution = station.move_joint_to_cartesian(&target)?;
            println!("✅ 移动完成，逆解: {}", solution.to_degrees());
        },

        // ==================== 点位 ====================
        "record" => {
            let name = args.first().copied();
            let delay = args
                .get(1)
                .map(|d| {
                    d.parse::<f64>()
                        .map_err(|_| anyhow::anyhow!("无效的延时: {}", d))
                })
                .transpose()?;
            let point = station.record(name, delay)?;
            println!("✅ 已记录 {}", point);
        },

        "list" => {
            println!("📋 点位 ({}):", station.point_count());
            print_points(&station.points());
        },

        "save" => {
            let path = Path::new(args.first().ok_or_else(|| anyhow::anyhow!("缺少文件路径"))?);
            PathValidator::new().validate_output_path(path)?;
            let count = station.save_points(path)?;
            println!("✅ 已保存 {} 个点位到 {}", count, path.display());
        },

        "load" => {
            let path = Path::new(args.first().ok_or_else(|| anyhow::anyhow!("缺少文件路径"))?);
            PathValidator::new().must_exist().validate_path(path)?;
            let count = station.load_points(path)?;
            println!("✅ 已加载 {} 个点位", count);
        },

        "clear" => {
            if args.first() != Some(&"--yes") {
                println!(
                    "⚠️  将删除全部 {} 个点位，使用 'clear --yes' 确认",
                    station.point_count()
                );
                return Ok(());
            }
            station.clear_points();
            println!("✅ 已清空点位");
        },

        // ==================== 回放 ====================
        "run" => {
            let target = match args.first() {
                None => LoopTarget::Count(1),
                Some(&"inf") | Some(&"infinite") => LoopTarget::Infinite,
                Some(value) => LoopTarget::Count(
                    value
                        .parse()
                        .map_err(|_| anyhow::anyhow!("无效的循环次数: {}", value))?,
                ),
            };
            station.run(target)?;
        },

        "pause" => {
            if !station.pause() {
                println!("⚠️  没有正在运行的回放");
            }
        },

        "resume" => {
            if !station.resume() {
                println!("⚠️  回放未暂停");
            }
        },

        "stop" => {
            if station.stop() {
                println!("🛑 将在当前点位结束后停止");
            } else {
                println!("⚠️  没有正在运行的回放");
            }
        },

        // ==================== 位姿同步 ====================
        "edit-begin" => {
            station.begin_joint_edit();
            println!("✏️  手动编辑中（位姿同步已挂起）");
        },

        "edit-end" => {
            station.end_joint_edit();
            println!("✅ 编辑结束（位姿同步已恢复）");
        },

        "sync" => match args.first() {
            Some(&"on") => {
                if !station.session_state().is_ready() {
                    anyhow::bail!("执行器未使能");
                }
                station.start_sync();
                println!("✅ 位姿同步已启动");
            },
            Some(&"off") => {
                station.stop_sync();
                println!("✅ 位姿同步已停止");
            },
            _ => anyhow::bail!("用法: sync on|off"),
        },

        _ => {
            anyhow::bail!("未知命令: {}", command);
        },
    }

    Ok(())
}

/// 打印状态
fn print_status(station: &TeachStation) {
    let snapshot = station.playback_snapshot();

    println!("📊 会话: {}", station.session_state());
    println!("⚡ 速度: {}", station.speed());
    println!("📋 点位: {}", station.point_count());
    match snapshot.loop_target {
        Some(target) if snapshot.running() => println!(
            "▶️  回放: {} (已完成 {}/{} 轮)",
            snapshot.state, snapshot.loop_index, target
        ),
        _ => println!("▶️  回放: {}", snapshot.state),
    }
    println!(
        "🔄 同步: {}{}",
        if station.sync_running() { "运行" } else { "停止" },
        if station.sync_suspended() { "（已挂起）" } else { "" }
    );
    if let Some(joints) = station.latest_pose() {
        println!("📍 关节: {}", joints);
    }
}

/// 打印帮助信息
fn print_help() {
    println!("会话:");
    println!("  connect [address]             连接控制器（默认 sim）");
    println!("  disconnect                    断开连接");
    println!("  power-on / power-off          上电 / 下电");
    println!("  enable / disable              使能 / 去使能");
    println!("  shutdown                      中止运动并关机");
    println!("  status                        显示状态");
    println!();
    println!("运动:");
    println!("  speed [percent]               查看或设置速度（5-100）");
    println!("  jog <joint> <deg>             单关节平滑移动");
    println!("  move-all <a,b,c,d,e,f>        全关节移动（度）");
    println!("  home                          回到零位");
    println!("  pose                          读取末端位姿");
    println!("  linear <x,y,z,rx,ry,rz>       直线移动（mm / 度）");
    println!("  ik-move <x,y,z,rx,ry,rz>      逆解后关节移动");
    println!();
    println!("点位:");
    println!("  record [name] [delay]         记录当前位置");
    println!("  list                          列出点位");
    println!("  save <file> / load <file>     保存 / 加载点位文件");
    println!("  clear --yes                   清空点位");
    println!();
    println!("回放:");
    println!("  run [N|inf]                   开始回放（默认 1 轮）");
    println!("  pause / resume / stop         暂停 / 恢复 / 停止");
    println!();
    println!("同步:");
    println!("  edit-begin / edit-end         手动编辑关节时挂起同步");
    println!("  sync on|off                   启动 / 停止位姿同步");
    println!();
    println!("  help                          显示帮助");
    println!("  exit / quit                   退出");
    println!();
    println!("快捷键:");
    println!("  Ctrl+C                        取消移动并停止回放");
    println!("  Ctrl+D                        退出");
    println!();
}

/// 提供基于错误的帮助提示
fn print_help_hint(command: &str) {
    if command.starts_with("jog") {
        eprintln!("💡 提示: 使用 'jog 2 45' 把 J2 平滑移动到 45°");
    } else if command.starts_with("move-all") {
        eprintln!("💡 提示: 使用 'move-all 0,90,-45,90,0,0' 移动全部关节");
    } else if command.starts_with("linear") || command.starts_with("ik-move") {
        eprintln!("💡 提示: 位姿格式为 x,y,z,rx,ry,rz（mm / 度）");
    } else if command.starts_with("enable") || command.starts_with("power") {
        eprintln!("💡 提示: 需要先使用 'connect' 连接控制器");
    } else {
        eprintln!("💡 提示: 输入 'help' 查看所有命令");
    }
}
