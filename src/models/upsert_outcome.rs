use serde::Serialize;

/// What an upsert did with its draft.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created { id: u64 },
    Updated { id: u64 },
}

impl UpsertOutcome {
    pub fn id(&self) -> u64 {
        match self {
            UpsertOutcome::Created { id } | UpsertOutcome::Updated { id } => *id,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created { .. })
    }
}
