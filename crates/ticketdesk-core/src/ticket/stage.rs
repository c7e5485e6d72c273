use super::model::Ticket;
use serde::{Deserialize, Serialize};

/// One step in a ticket's escalation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    L1,
    L2,
    L3,
    L4,
    Resolved,
}

impl PipelineStage {
    pub fn id(&self) -> &'static str {
        match self {
            PipelineStage::L1 => "l1",
            PipelineStage::L2 => "l2",
            PipelineStage::L3 => "l3",
            PipelineStage::L4 => "l4",
            PipelineStage::Resolved => "resolved",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::L1 => "L1",
            PipelineStage::L2 => "L2",
            PipelineStage::L3 => "L3",
            PipelineStage::L4 => "L4",
            PipelineStage::Resolved => "Resolved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMarker {
    pub stage: PipelineStage,
    pub active: bool,
}

impl StageMarker {
    fn active(stage: PipelineStage) -> Self {
        Self {
            stage,
            active: true,
        }
    }
}

/// Ordered stages derived from one ticket snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub stages: Vec<StageMarker>,
}

impl Pipeline {
    /// Index of the last derived stage, for a linear progress display.
    pub fn current_step(&self) -> usize {
        self.stages.len().saturating_sub(1)
    }

    pub fn stage_list(&self) -> Vec<PipelineStage> {
        self.stages.iter().map(|marker| marker.stage).collect()
    }

    pub fn contains(&self, stage: PipelineStage) -> bool {
        self.stages.iter().any(|marker| marker.stage == stage)
    }
}

/// Derives the pipeline for a ticket.
///
/// L1 and L2 are always present. L3/L4 follow the status escalation, and
/// `Resolved` follows the resolution field alone. Each call re-derives from
/// scratch, so a status that drops an escalation token simply yields a
/// shorter pipeline.
pub fn derive_stages(ticket: &Ticket) -> Pipeline {
    let mut stages = vec![
        StageMarker::active(PipelineStage::L1),
        StageMarker::active(PipelineStage::L2),
    ];

    let escalation = ticket.parsed_status().escalation();
    if escalation.l3 {
        stages.push(StageMarker::active(PipelineStage::L3));
    }
    if escalation.l4 {
        stages.push(StageMarker::active(PipelineStage::L4));
    }
    if ticket.has_resolution() {
        stages.push(StageMarker::active(PipelineStage::Resolved));
    }

    Pipeline { stages }
}
