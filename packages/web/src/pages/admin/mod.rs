//! Admin and moderation pages.

mod audit;
mod dashboard;
mod moderation;
mod reports;
mod users;

pub use audit::AdminAuditPage;
pub use dashboard::AdminDashboardPage;
pub use moderation::AdminModerationPage;
pub use reports::AdminReportsPage;
pub use users::AdminUsersPage;

use uuid::Uuid;

use crate::context::AppContext;
use crate::types::NewAuditEntry;

/// Write an audit-log entry for an admin action. Failures are logged but do
/// not block the action they describe.
pub(crate) async fn record_audit(
    ctx: &AppContext,
    action: &str,
    target_id: Option<Uuid>,
    detail: Option<String>,
) {
    let Some(user) = ctx.session.user() else {
        return;
    };
    let entry = NewAuditEntry {
        actor_id: user.id,
        action: action.to_owned(),
        target_id,
        detail,
    };
    if let Err(err) = ctx
        .backend
        .table("audit_log")
        .insert::<_, serde_json::Value>(&entry)
        .await
    {
        tracing::warn!(%err, action, "failed to record audit entry");
    }
}
