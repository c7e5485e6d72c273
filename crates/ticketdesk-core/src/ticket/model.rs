use super::status::TicketStatus;
use serde::{Deserialize, Deserializer, Serialize};

/// Client-side cached copy of a server-owned ticket.
///
/// The same struct is filled from `GET /api/incidents/:id` and from pushed
/// `ticket_details` snapshots, which name a few fields differently; the
/// serde aliases cover both shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(alias = "ticket_id", alias = "sys_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub classified_team: Option<String>,
    /// Snapshot payloads repeat the team under this key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, alias = "l2_resolution")]
    pub resolution: Option<String>,
    #[serde(default)]
    pub rca: Option<String>,
    #[serde(default)]
    pub pm: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_feedback: Option<serde_json::Value>,
    #[serde(default)]
    pub l2_is_new: Option<bool>,
    #[serde(default)]
    pub l3_resolution: Option<String>,
    #[serde(default)]
    pub l4_status: Option<String>,
}

impl Ticket {
    /// Creates a ticket with only an id and a status (mostly for tests).
    pub fn new(id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: status.into(),
            ..Self::default()
        }
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    pub fn parsed_status(&self) -> TicketStatus {
        TicketStatus::parse(&self.status)
    }

    /// True iff a non-empty resolution is present, whatever the status says.
    pub fn has_resolution(&self) -> bool {
        self.resolution.as_deref().is_some_and(|r| !r.is_empty())
    }

    pub fn assigned_team(&self) -> Option<&str> {
        self.classified_team
            .as_deref()
            .or(self.team.as_deref())
            .filter(|t| !t.is_empty())
    }

    /// First line of the description.
    pub fn headline(&self) -> Option<&str> {
        self.description.lines().next().filter(|line| !line.is_empty())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
