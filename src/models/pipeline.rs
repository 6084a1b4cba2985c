use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Post-interview deployment chain for overseas placement, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentStage {
    MedicalScheduled,
    MedicalCleared,
    PoliceClearanceApplied,
    PoliceClearanceIssued,
    DocumentsSubmitted,
    EmbassyAttestation,
    VisaApplied,
    VisaApproved,
    LabourPermitIssued,
    PreDepartureOrientation,
    InsuranceIssued,
    TicketBooked,
    TravelConfirmed,
    DepartureBriefing,
    Departed,
}

impl DeploymentStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            DeploymentStage::MedicalScheduled => "medical-scheduled",
            DeploymentStage::MedicalCleared => "medical-cleared",
            DeploymentStage::PoliceClearanceApplied => "police-clearance-applied",
            DeploymentStage::PoliceClearanceIssued => "police-clearance-issued",
            DeploymentStage::DocumentsSubmitted => "documents-submitted",
            DeploymentStage::EmbassyAttestation => "embassy-attestation",
            DeploymentStage::VisaApplied => "visa-applied",
            DeploymentStage::VisaApproved => "visa-approved",
            DeploymentStage::LabourPermitIssued => "labour-permit-issued",
            DeploymentStage::PreDepartureOrientation => "pre-departure-orientation",
            DeploymentStage::InsuranceIssued => "insurance-issued",
            DeploymentStage::TicketBooked => "ticket-booked",
            DeploymentStage::TravelConfirmed => "travel-confirmed",
            DeploymentStage::DepartureBriefing => "departure-briefing",
            DeploymentStage::Departed => "departed",
        }
    }
}

impl fmt::Display for DeploymentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown deployment stage '{0}'")]
pub struct UnknownDeploymentStage(pub String);

impl FromStr for DeploymentStage {
    type Err = UnknownDeploymentStage;

    /// Accepts both `visa-approved` and `visa_approved`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        crate::services::pipeline_service::stages()
            .iter()
            .map(|definition| definition.id)
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| UnknownDeploymentStage(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StageCategory {
    Medical,
    Clearance,
    Attestation,
    Visa,
    Permit,
    Orientation,
    Travel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentRequirement {
    pub name: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStageDefinition {
    pub id: DeploymentStage,
    pub order: u8,
    pub label: &'static str,
    pub category: StageCategory,
    pub required_documents: &'static [DocumentRequirement],
    /// Fields that must be supplied when moving into this stage.
    pub required_fields: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PipelineProgress {
    pub stage: DeploymentStage,
    pub order: u8,
    pub percentage: u8,
    pub completed: u8,
    pub remaining: u8,
    pub total: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChecklistItem {
    pub name: String,
    pub required: bool,
    pub submitted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DocumentChecklist {
    pub stage: DeploymentStage,
    pub items: Vec<ChecklistItem>,
    pub missing_required: Vec<String>,
    pub complete: bool,
}
