use std::path::PathBuf;

use secrecy::SecretString;

pub const DEFAULT_BASE_URL: &str = "https://opencode.ai/zen/v1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_UI_DIR: &str = "web";

pub const ENV_API_KEY: &str = "OPENCODE_API_KEY";

/**
 * \brief 进程级配置：入口处读取一次，之后显式传递给各组件。
 */
#[derive(Debug, Clone)]
pub struct Config {
    /** \brief 上游 API 密钥；为空视为未配置 */
    pub api_key: Option<SecretString>,
    /** \brief 上游 OpenAI 兼容接口基地址 */
    pub base_url: String,
    pub host: String,
    pub port: u16,
    /** \brief 缺省模型 ID；未设置时取目录第一项 */
    pub default_model: Option<String>,
    /** \brief 静态页面目录 */
    pub ui_dir: PathBuf,
    /** \brief 遥测日志目录；未设置时不写文件 */
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            default_model: None,
            ui_dir: PathBuf::from(DEFAULT_UI_DIR),
            log_dir: None,
        }
    }
}

impl Config {
    /**
     * \brief 设置密钥，空串或全空白视为未配置。
     */
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);
        self
    }

    pub fn api_key_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /**
     * \brief 去掉结尾斜杠后的上游基地址。
     */
    pub fn upstream_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
