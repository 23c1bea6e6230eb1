//! 命令行工具：生成绕过令牌摘要、离线判定某个URL/UA组合的检测结果

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use rsdisable_devtool::{BypassPolicy, Config, DetectorRegistry, EnvProbe, GuardSet, token_digest};

#[derive(Debug, Parser)]
#[command(name = "rsdisable-devtool", version, about = "开发者工具检测引擎命令行工具", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 计算令牌摘要（填入配置的 md5 字段）
    Token {
        value: String,
    },

    /// 判定指定环境下是否会启动检测，以及会启用哪些检测器
    Check {
        #[arg(long)]
        url: String,

        #[arg(long)]
        ua: String,

        /// JSON配置文件，按类型校验规则合并
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long, default_value = "")]
        platform: String,

        #[arg(long, default_value_t = 0)]
        touch: u32,

        #[arg(long, default_value_t = 0)]
        frame_depth: usize,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Token { value } => {
            println!("{}", token_digest(&value));
        }
        Command::Check { url, ua, config, platform, touch, frame_depth } => {
            let mut merged = Config::default();
            if let Some(path) = config {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("读取配置文件失败：{}", path.display()))?;
                let patch: serde_json::Value = serde_json::from_str(&raw)
                    .with_context(|| format!("配置文件不是合法JSON：{}", path.display()))?;
                let applied = merged.merge_json(&patch);
                debug!("配置合并完成，生效项：{}", applied);
            }

            let probe = EnvProbe::from_parts(&ua, &platform, touch, frame_depth > 0);
            let bypass = BypassPolicy::new().evaluate(&merged, &probe, &url)?;
            let registered = DetectorRegistry::build(&merged.options.detectors, &probe);

            let report = json!({
                "url": url,
                "probe": probe,
                "bypass": bypass,
                "willStart": bypass.is_none(),
                "activeDetectors": registered.active_kinds(),
                "disabledDetectors": registered.disabled,
                "guards": GuardSet::from_options(&merged.options, &probe),
                "options": merged.options,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
