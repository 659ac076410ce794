//! Source analysis snapshot attached to a project.

use crate::model::project::ProjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AnalysisId = Uuid;

/// One completed analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub id: AnalysisId,
    pub project_id: ProjectId,
    /// Unix epoch milliseconds of the last refresh.
    pub updated_at: i64,
}

impl Analysis {
    pub fn new(project_id: ProjectId, updated_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            updated_at,
        }
    }
}
