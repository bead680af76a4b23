use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zenchat_core_sdk::{
    catalog::Catalog,
    config::{self, Config},
    models::ChatRequest,
    relay::Relay,
    server, telemetry,
};

/**
 * \brief CLI 程序入口：启动服务，或在终端里直接聊天。
 */
#[derive(Parser, Debug)]
#[command(name = "zenchat", version, about = "OpenCode Zen chat relay")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

/**
 * \brief 进程级配置，命令行参数优先于环境变量。
 */
#[derive(Args, Debug)]
struct Settings {
    /** \brief 上游 API 密钥 */
    #[arg(long, env = "OPENCODE_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    #[arg(long, env = "OPENCODE_BASE_URL", default_value = config::DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /** \brief 缺省模型 ID，未设置时取目录第一项 */
    #[arg(long, env = "ZENCHAT_DEFAULT_MODEL", global = true)]
    default_model: Option<String>,

    /** \brief 事件日志目录 */
    #[arg(long, env = "ZENCHAT_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /**
     * \brief 启动 HTTP 服务并提供聊天页面。
     */
    Serve {
        #[arg(long, env = "ZENCHAT_HOST", default_value = config::DEFAULT_HOST)]
        host: String,
        #[arg(long, env = "PORT", default_value_t = config::DEFAULT_PORT)]
        port: u16,
        #[arg(long, env = "ZENCHAT_UI_DIR", default_value = config::DEFAULT_UI_DIR)]
        ui_dir: PathBuf,
    },

    /**
     * \brief 列出可用模型。
     */
    Models,

    /**
     * \brief 发送一条消息并打印模型回复。
     */
    Chat {
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        prompt: String,
    },
}

impl Settings {
    fn into_config(self) -> Config {
        Config {
            base_url: self.base_url,
            default_model: self.default_model,
            log_dir: self.log_dir,
            ..Config::default()
        }
        .with_api_key(self.api_key)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = cli.settings.into_config();
    telemetry::init(config.log_dir.as_deref());

    match cli.command {
        Commands::Serve { host, port, ui_dir } => {
            config.host = host;
            config.port = port;
            config.ui_dir = ui_dir;
            server::run(config).await?;
        }
        Commands::Models => {
            for m in Catalog::default().list_models() {
                println!("{:<20} {:<20} ({})", m.id, m.name, m.provider);
            }
        }
        Commands::Chat { model, prompt } => chat_once(&config, model, prompt).await?,
    }

    Ok(())
}

/**
 * \brief 终端一次性聊天：成功时打印回复，失败时打印细节并返回错误。
 */
async fn chat_once(config: &Config, model: Option<String>, prompt: String) -> Result<()> {
    let relay = Relay::new(config, Arc::new(Catalog::default())).context("build relay failed")?;
    let request = ChatRequest {
        message: Some(prompt),
        model,
        history: None,
    };
    match relay.handle_chat(request).await {
        Ok(reply) => {
            println!("{}", reply.message);
            if let Some(usage) = reply.usage {
                tracing::debug!(model = %reply.model, %usage, "chat finished");
            }
            Ok(())
        }
        Err(e) => {
            let body = e.to_response();
            if let Some(models) = body.available_models {
                eprintln!("Available models: {}", models.join(", "));
            }
            if let Some(instructions) = body.instructions {
                eprintln!("{}", instructions);
            }
            let status = e.status();
            Err(e).with_context(|| format!("chat failed ({})", status))
        }
    }
}
