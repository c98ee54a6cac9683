// ==========================================
// 城市走廊通行决策系统 - 命令行入口
// ==========================================
// 输出: 结果以 JSON 写 stdout，日志写 stderr
// ==========================================

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use corridor_advisor::api::DEFAULT_TREND_POINTS;
use corridor_advisor::app::{get_default_config_path, get_default_data_path};
use corridor_advisor::domain::{ServicePriority, TripOverrides};
use corridor_advisor::{logging, AppState, ConfigManager, CorridorId, TripQuery, VehicleClass};

#[derive(Parser, Debug)]
#[command(author, version, about = "城市走廊通行决策系统", long_about = None)]
struct Cli {
    /// 历史数据集路径（.csv / .xlsx / .xls）
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// 配置文件路径（JSON）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 配置覆写 key=value，可重复（如 --set hub.w1=0.7）
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    overrides: Vec<String>,

    /// 替换限行规则目录（JSON 数组）
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// 替换微枢纽目录（JSON 数组）
    #[arg(long, global = true)]
    hubs: Option<PathBuf>,

    /// JSON 格式日志
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 列出走廊及基准指标
    Corridors,

    /// 列出走廊下的道路
    Roads { corridor: String },

    /// 走廊最近趋势
    Trend {
        corridor: String,
        #[arg(long)]
        road: Option<String>,
        #[arg(long, default_value_t = DEFAULT_TREND_POINTS)]
        points: usize,
    },

    /// 训练模型并输出训练报告
    Train,

    /// 训练报告 + 数据质量报告
    Quality,

    /// 输出生效配置（合并文件 / 环境变量 / --set 之后）
    Config,

    /// 规划行程
    Plan {
        origin: String,
        destination: String,

        /// 出发时间: "YYYY-MM-DD HH:MM" 或 "YYYY-MM-DDTHH:MM"
        #[arg(long)]
        departure: String,

        /// 载重（吨）
        #[arg(long, default_value_t = 0.0)]
        payload: f64,

        /// 车型 light/medium/heavy（缺省按载重推荐）
        #[arg(long)]
        vehicle: Option<VehicleClass>,

        /// 服务优先级 standard/express/night_linehaul
        #[arg(long, default_value = "standard")]
        priority: ServicePriority,

        #[arg(long, default_value_t = 3)]
        top_k: usize,

        #[arg(long)]
        origin_road: Option<String>,

        #[arg(long)]
        destination_road: Option<String>,

        /// 人工覆写（JSON），如 '{"origin":{"incident_reports":3}}'
        #[arg(long)]
        overrides: Option<String>,
    },
}

fn parse_departure(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .with_context(|| format!("出发时间格式错误: {}", value))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ConfigManager> {
    let config_path = cli.config.clone().unwrap_or_else(get_default_config_path);
    let mut manager = ConfigManager::load(&config_path)
        .with_context(|| format!("加载配置失败: {}", config_path.display()))?;

    let applied = manager.apply_env_overrides()?;
    manager.apply_overrides(&cli.overrides)?;
    if let Some(path) = &cli.rules {
        manager.load_rule_catalog(path)?;
    }
    if let Some(path) = &cli.hubs {
        manager.load_hub_catalog(path)?;
    }

    info!(
        env_overrides = applied,
        cli_overrides = cli.overrides.len(),
        "配置加载完成"
    );
    Ok(manager)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    let manager = load_config(&cli)?;
    if let Command::Config = cli.command {
        println!("{}", manager.snapshot()?);
        return Ok(());
    }

    let data_path = cli.data.clone().unwrap_or_else(get_default_data_path);
    let state = AppState::initialize(&data_path, manager.into_config())
        .with_context(|| format!("初始化失败: {}", data_path.display()))?;
    let api = state.trip_api();

    match cli.command {
        Command::Corridors => print_json(&api.list_corridors())?,
        Command::Roads { corridor } => print_json(&api.list_roads(&CorridorId::new(corridor))?)?,
        Command::Trend {
            corridor,
            road,
            points,
        } => print_json(&api.corridor_trend(&CorridorId::new(corridor), road.as_deref(), points)?)?,
        Command::Train => {
            let report = state
                .pipeline
                .report()
                .context("模型未训练")?;
            print_json(report)?
        }
        Command::Quality => print_json(&api.model_quality()?)?,
        Command::Plan {
            origin,
            destination,
            departure,
            payload,
            vehicle,
            priority,
            top_k,
            origin_road,
            destination_road,
            overrides,
        } => {
            if !payload.is_finite() || payload < 0.0 {
                bail!("载重必须为非负数: {}", payload);
            }

            let mut query = TripQuery::new(origin, destination, parse_departure(&departure)?, payload)
                .with_priority(priority)
                .with_top_k(top_k)
                .with_roads(origin_road, destination_road);
            if let Some(class) = vehicle {
                query = query.with_vehicle_class(class);
            }
            if let Some(raw) = overrides {
                let parsed: TripOverrides =
                    serde_json::from_str(&raw).context("覆写参数 JSON 解析失败")?;
                query = query.with_overrides(parsed);
            }

            print_json(&api.plan_trip(&query)?)?
        }
        Command::Config => {}
    }

    Ok(())
}
