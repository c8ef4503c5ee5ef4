//! 基础设施层（Infrastructure Layer）
//!
//! 持有稀缺资源（Page），只暴露能力：
//! - `session` - 上层使用的会话接口
//! - `js_executor` - 唯一的 page owner，提供 eval() 和轮询能力
//! - `cdp_session` - 用 JsExecutor 实现会话接口

pub mod cdp_session;
pub mod js_executor;
pub mod session;

pub use cdp_session::CdpSession;
pub use js_executor::JsExecutor;
pub use session::Session;
