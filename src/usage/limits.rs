use super::error::UsageError;
use super::plan::{Limit, Plan};
use crate::types::TaskType;

/// The plan cap that governs `task`.
pub fn resolve_limit(plan: &Plan, task: TaskType) -> Limit {
    match task {
        TaskType::Chat => plan.effective_chat_token_limit(),
        TaskType::Embedding => plan.effective_embedding_token_limit(),
        TaskType::Image => Limit::from_raw(plan.monthly_image_credits),
        TaskType::Video => Limit::from_raw(plan.monthly_video_minutes),
    }
}

/// Parse a task type name and resolve its cap. Blank or unknown names are
/// [`UsageError::InvalidRequest`].
pub fn resolve_task_limit(plan: &Plan, task_type: &str) -> Result<(TaskType, Limit), UsageError> {
    let task: TaskType = task_type.parse()?;
    Ok((task, resolve_limit(plan, task)))
}
