//! Ticket status classification.
//!
//! The server reports status as free text. Known values are classified
//! through [`STATUS_TABLE`]; anything else is [`StatusCode::Unrecognized`]
//! and falls back to a loose `l3`/`l4` substring scan, which is reported as
//! [`EscalationMatch::Loose`] because it can hit unrelated text.

use super::action::TicketAction;
use serde::{Deserialize, Serialize};

/// Enumerated status codes the server is known to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    New,
    MoreInfoNeeded,
    MoreInfoReceived,
    FeedbackNeeded,
    FeedbackReceived,
    PassedToL3,
    PassedToL4,
    Resolved,
    Unrecognized,
}

/// Presentation class of a status, used by summary entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    New,
    AwaitingInfo,
    AwaitingFeedback,
    FeedbackReceived,
    EscalatedL3,
    EscalatedL4,
    Neutral,
}

/// How an escalation was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationMatch {
    /// Taken from the status table.
    Exact,
    /// Substring scan over unrecognized status text.
    Loose,
}

/// Escalation levels implied by a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escalation {
    pub l3: bool,
    pub l4: bool,
    pub matched: EscalationMatch,
}

impl Escalation {
    const NONE: Escalation = Escalation {
        l3: false,
        l4: false,
        matched: EscalationMatch::Exact,
    };
    const L3: Escalation = Escalation {
        l3: true,
        l4: false,
        matched: EscalationMatch::Exact,
    };
    const L4: Escalation = Escalation {
        l3: false,
        l4: true,
        matched: EscalationMatch::Exact,
    };

    fn loose(lowered: &str) -> Self {
        Self {
            l3: lowered.contains("l3"),
            l4: lowered.contains("l4"),
            matched: EscalationMatch::Loose,
        }
    }
}

enum StatusPattern {
    Exact(&'static str),
    /// Escalation statuses carry trailing detail ("passed to l4, team: ...").
    Prefix(&'static str),
}

impl StatusPattern {
    fn matches(&self, lowered: &str) -> bool {
        match self {
            StatusPattern::Exact(code) => lowered == *code,
            StatusPattern::Prefix(prefix) => lowered.starts_with(prefix),
        }
    }
}

struct StatusRule {
    code: StatusCode,
    pattern: StatusPattern,
    escalation: Escalation,
    action: Option<TicketAction>,
    tone: StatusTone,
}

const STATUS_TABLE: &[StatusRule] = &[
    StatusRule {
        code: StatusCode::New,
        pattern: StatusPattern::Exact("new"),
        escalation: Escalation::NONE,
        action: None,
        tone: StatusTone::New,
    },
    StatusRule {
        code: StatusCode::MoreInfoNeeded,
        pattern: StatusPattern::Exact("more_info_needed"),
        escalation: Escalation::NONE,
        action: Some(TicketAction::SubmitAdditionalInfo),
        tone: StatusTone::AwaitingInfo,
    },
    StatusRule {
        code: StatusCode::MoreInfoReceived,
        pattern: StatusPattern::Exact("more_info_received"),
        escalation: Escalation::NONE,
        action: None,
        tone: StatusTone::Neutral,
    },
    StatusRule {
        code: StatusCode::FeedbackNeeded,
        pattern: StatusPattern::Exact("feedback_needed"),
        escalation: Escalation::NONE,
        action: Some(TicketAction::SubmitFeedback),
        tone: StatusTone::AwaitingFeedback,
    },
    StatusRule {
        code: StatusCode::FeedbackReceived,
        pattern: StatusPattern::Exact("feedback_received"),
        escalation: Escalation::NONE,
        action: None,
        tone: StatusTone::FeedbackReceived,
    },
    StatusRule {
        code: StatusCode::PassedToL3,
        pattern: StatusPattern::Prefix("passed to l3"),
        escalation: Escalation::L3,
        action: None,
        tone: StatusTone::EscalatedL3,
    },
    StatusRule {
        code: StatusCode::PassedToL4,
        pattern: StatusPattern::Prefix("passed to l4"),
        escalation: Escalation::L4,
        action: None,
        tone: StatusTone::EscalatedL4,
    },
    StatusRule {
        code: StatusCode::Resolved,
        pattern: StatusPattern::Exact("resolved"),
        escalation: Escalation::NONE,
        action: None,
        tone: StatusTone::Neutral,
    },
];

/// A ticket status: the raw server text plus its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketStatus {
    raw: String,
    lowered: String,
    code: StatusCode,
}

impl TicketStatus {
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        let code = Self::rule_for(&lowered)
            .map(|rule| rule.code)
            .unwrap_or(StatusCode::Unrecognized);
        Self {
            raw: raw.to_string(),
            lowered,
            code,
        }
    }

    fn rule_for(lowered: &str) -> Option<&'static StatusRule> {
        STATUS_TABLE.iter().find(|rule| rule.pattern.matches(lowered))
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn escalation(&self) -> Escalation {
        match Self::rule_for(&self.lowered) {
            Some(rule) => rule.escalation,
            None => {
                let escalation = Escalation::loose(&self.lowered);
                if escalation.l3 || escalation.l4 {
                    tracing::debug!(
                        status = %self.raw,
                        l3 = escalation.l3,
                        l4 = escalation.l4,
                        "Escalation inferred from unrecognized status text"
                    );
                }
                escalation
            }
        }
    }

    /// The single user action this status legalizes, if any.
    pub fn legal_action(&self) -> Option<TicketAction> {
        Self::rule_for(&self.lowered).and_then(|rule| rule.action)
    }

    pub fn tone(&self) -> StatusTone {
        Self::rule_for(&self.lowered)
            .map(|rule| rule.tone)
            .unwrap_or(StatusTone::Neutral)
    }
}
