pub mod catalog;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod relay;
pub mod server;
pub mod telemetry;

/**
 * \brief SDK 预导入集合，方便外部引用常用模块。
 */
pub mod prelude {
    pub use crate::catalog::Catalog;
    pub use crate::config::Config;
    pub use crate::error::RelayError;
    pub use crate::models::{ChatRequest, ChatResponse, ChatTurn, ModelDescriptor, Role};
    pub use crate::relay::Relay;
    pub use crate::{server, telemetry};
}
