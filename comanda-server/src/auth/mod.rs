//! Authentication - trusted identity extraction
//!
//! 会话签发属于外部认证服务；核心只验证令牌并提取
//! `(user_id, role, restaurant_id)` 三元组与顾客可见范围。

mod extractor;
mod jwt;

pub use jwt::{Claims, JwtError, JwtService};

use shared::{Actor, ViewerScope};

/// Verified identity attached to a request or live connection
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub actor: Actor,
    /// Customer viewing scope; empty for staff roles
    pub scope: ViewerScope,
}
