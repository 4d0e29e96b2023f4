// ==========================================
// 装箱发货计划 - 命令行入口
// ==========================================
// 子命令:
// - serve      启动 HTTP 服务
// - calculate  单笔计算（输出 JSON）
// - batch      CSV 批量计算
// - packs      查看 / 替换已保存的箱型
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use pack_planner::api::{validate_pack_sizes, CalculatePacksRequest, UpdatePackSizesRequest};
use pack_planner::config::AppConfig;
use pack_planner::domain::parse_pack_sizes;
use pack_planner::{app, logging, AppState, BatchPlanner};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQLite 数据库路径（覆盖 PACK_PLANNER_DB_PATH）
    #[arg(long, global = true)]
    db_path: Option<String>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 启动 HTTP 服务
    Serve {
        /// 监听端口（覆盖 PACK_PLANNER_PORT）
        #[arg(long)]
        port: Option<u16>,
    },
    /// 计算单笔订单的发货方案
    Calculate {
        /// 订单数量
        items: i64,
        /// 临时指定箱型，如 250,500,1000（不写入存储）
        #[arg(long)]
        packs: Option<String>,
    },
    /// CSV 批量计算（输入需包含 items 列）
    Batch {
        /// 输入 CSV 文件
        #[arg(long)]
        input: PathBuf,
        /// 输出 CSV 文件（缺省输出到 stdout）
        #[arg(long)]
        output: Option<PathBuf>,
        /// 临时指定箱型，如 250,500,1000（不写入存储）
        #[arg(long)]
        packs: Option<String>,
    },
    /// 查看或替换已保存的箱型
    Packs {
        /// 新箱型列表，如 250,500,1000
        #[arg(long)]
        set: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_with_format(cli.log_json);

    let mut config = AppConfig::from_env().context("加载配置失败")?;
    if let Some(db_path) = cli.db_path {
        config.db_path = Some(db_path);
    }

    tracing::debug!("{} v{}", pack_planner::APP_NAME, pack_planner::VERSION);

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            let state = Arc::new(AppState::new(config).context("初始化AppState失败")?);
            app::serve(state).await?;
        }
        Command::Calculate { items, packs } => {
            let state = build_state(config, packs.as_deref())?;
            let resp = state
                .pack_api
                .calculate_packs(CalculatePacksRequest { items })?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
        Command::Batch {
            input,
            output,
            packs,
        } => {
            let limits = config.limits;
            let state = build_state(config, packs.as_deref())?;
            let sizes = state.pack_api.get_pack_sizes()?.packs;
            validate_pack_sizes(&sizes, &limits).context("已保存的箱型无效")?;

            let reader = BufReader::new(
                File::open(&input).with_context(|| format!("无法打开 {}", input.display()))?,
            );
            let writer: Box<dyn Write> = match output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(&path)
                        .with_context(|| format!("无法创建 {}", path.display()))?,
                )),
                None => Box::new(io::stdout().lock()),
            };

            let summary =
                BatchPlanner::new(limits.max_order_quantity).run(reader, writer, &sizes)?;
            eprintln!("{}", serde_json::to_string(&summary)?);
        }
        Command::Packs { set } => {
            let state = AppState::new(config).context("初始化AppState失败")?;
            let packs = match set {
                Some(raw) => {
                    let packs = parse_pack_sizes(&raw).map_err(anyhow::Error::msg)?;
                    state
                        .pack_api
                        .update_pack_sizes(UpdatePackSizesRequest { packs })?
                        .packs
                }
                None => state.pack_api.get_pack_sizes()?.packs,
            };
            println!("{}", serde_json::to_string(&packs)?);
        }
    }

    Ok(())
}

/// 指定 --packs 时使用临时内存存储，否则使用配置的存储
fn build_state(config: AppConfig, packs: Option<&str>) -> Result<AppState> {
    match packs {
        Some(raw) => {
            let sizes = parse_pack_sizes(raw).map_err(anyhow::Error::msg)?;
            AppState::with_pack_sizes(config, &sizes).context("--packs 无效")
        }
        None => AppState::new(config).context("初始化AppState失败"),
    }
}
