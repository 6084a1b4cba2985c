use std::collections::BTreeSet;

use crate::models::pipeline::{
    ChecklistItem, DeploymentStage, DocumentChecklist, DocumentRequirement, PipelineProgress,
    PipelineStageDefinition, StageCategory,
};
use crate::models::stage::ApplicationStage;
use crate::services::transition_validator::{ValidationResult, NOT_NEXT_STAGE};

const fn doc(name: &'static str, required: bool) -> DocumentRequirement {
    DocumentRequirement { name, required }
}

const PIPELINE: [PipelineStageDefinition; 15] = [
    PipelineStageDefinition {
        id: DeploymentStage::MedicalScheduled,
        order: 1,
        label: "Medical Scheduled",
        category: StageCategory::Medical,
        required_documents: &[doc("passport_copy", true), doc("passport_photo", true)],
        required_fields: &["medical_center", "medical_date"],
    },
    PipelineStageDefinition {
        id: DeploymentStage::MedicalCleared,
        order: 2,
        label: "Medical Cleared",
        category: StageCategory::Medical,
        required_documents: &[doc("medical_certificate", true), doc("vaccination_record", false)],
        required_fields: &["medical_result", "medical_certificate_number"],
    },
    PipelineStageDefinition {
        id: DeploymentStage::PoliceClearanceApplied,
        order: 3,
        label: "Police Clearance Applied",
        category: StageCategory::Clearance,
        required_documents: &[doc("national_id", true), doc("police_application_receipt", true)],
        required_fields: &["police_application_number"],
    },
    PipelineStageDefinition {
        id: DeploymentStage::PoliceClearanceIssued,
        order: 4,
        label: "Police Clearance Issued",
        category: StageCategory::Clearance,
        required_documents: &[doc("police_clearance_certificate", true)],
        required_fields: &["police_certificate_number", "police_certificate_issued_on"],
    },
    PipelineStageDefinition {
        id: DeploymentStage::DocumentsSubmitted,
        order: 5,
        label: "Documents Submitted",
        category: StageCategory::Attestation,
        required_documents: &[
            doc("educational_certificates", true),
            doc("experience_letters", false),
            doc("employment_contract", true),
        ],
        required_fields: &["submission_reference"],
    },
    PipelineStageDefinition {
        id: DeploymentStage::EmbassyAttestation,
        order: 6,
        label: "Embassy Attestation",
        category: StageCategory::Attestation,
        required_documents: &[doc("attested_contract", true), doc("attested_certificates", true)],
        required_fields: &["attestation_reference", "attested_on"],
    },
    PipelineStageDefinition {
        id: DeploymentStage::VisaApplied,
        order: 7,
        label: "Visa Applied",
        category: StageCategory::Visa,
        required_documents: &[doc("visa_application_form", true), doc("demand_letter", true)],
        required_fields: &["visa_application_number"],
    },
    PipelineStageDefinition {
        id: DeploymentStage::VisaApproved,
        order: 8,
        label: "Visa Approved",
        category: StageCategory::Visa,
        required_documents: &[doc("visa_copy", true)],
        required_fields: &["visa_number", "visa_expiry"],
    },
    PipelineStageDefinition {
        id: DeploymentStage::LabourPermitIssued,
        order: 9,
        label: "Labour Permit Issued",
        category: StageCategory::Permit,
        required_documents: &[doc("labour_permit", true)],
        required_fields: &["labour_permit_number"],
    },
    PipelineStageDefinition {
        id: DeploymentStage::PreDepartureOrientation,
        order: 10,
        label: "Pre-Departure Orientation",
        category: StageCategory::Orientation,
        required_documents: &[doc("orientation_certificate", true)],
        required_fields: &["orientation_completed_on"],
    },
    PipelineStageDefinition {
        id: DeploymentStage::InsuranceIssued,
        order: 11,
        label: "Insurance Issued",
        category: StageCategory::Permit,
        required_documents: &[doc("insurance_policy", true), doc("welfare_fund_receipt", false)],
        required_fields: &["insurance_policy_number"],
    },
    PipelineStageDefinition {
        id: DeploymentStage::TicketBooked,
        order: 12,
        label: "Ticket Booked",
        category: StageCategory::Travel,
        required_documents: &[doc("e_ticket", true)],
        required_fields: &["flight_number", "departure_date"],
    },
    PipelineStageDefinition {
        id: DeploymentStage::TravelConfirmed,
        order: 13,
        label: "Travel Confirmed",
        category: StageCategory::Travel,
        required_documents: &[doc("travel_itinerary", true)],
        required_fields: &["pnr"],
    },
    PipelineStageDefinition {
        id: DeploymentStage::DepartureBriefing,
        order: 14,
        label: "Departure Briefing",
        category: StageCategory::Travel,
        required_documents: &[doc("document_handover_receipt", true)],
        required_fields: &["briefing_completed_on"],
    },
    PipelineStageDefinition {
        id: DeploymentStage::Departed,
        order: 15,
        label: "Departed",
        category: StageCategory::Travel,
        required_documents: &[doc("boarding_pass", false)],
        required_fields: &["departed_on"],
    },
];

pub fn stages() -> &'static [PipelineStageDefinition] {
    &PIPELINE
}

pub fn total_stages() -> u8 {
    PIPELINE.len() as u8
}

pub fn definition(stage: DeploymentStage) -> &'static PipelineStageDefinition {
    // The table lists every variant exactly once, in declaration order.
    &PIPELINE[stage as usize]
}

pub fn stage_at(order: u8) -> Option<&'static PipelineStageDefinition> {
    PIPELINE.iter().find(|definition| definition.order == order)
}

pub fn entry_stage() -> &'static PipelineStageDefinition {
    &PIPELINE[0]
}

/// Only candidates who passed their interview may enter deployment.
/// Entering is a separate, explicit step taken by the caller.
pub fn is_eligible(stage: ApplicationStage) -> bool {
    stage == ApplicationStage::InterviewPassed
}

pub fn next_stage(stage: DeploymentStage) -> Option<&'static PipelineStageDefinition> {
    let order = definition(stage).order;
    stage_at(order + 1)
}

pub fn progress(stage: DeploymentStage) -> PipelineProgress {
    let order = definition(stage).order;
    let total = total_stages();
    let percentage = (f64::from(order) / f64::from(total) * 100.0).round() as u8;

    PipelineProgress {
        stage,
        order,
        percentage,
        completed: order,
        remaining: total - order,
        total,
    }
}

pub fn required_documents(stage: DeploymentStage) -> &'static [DocumentRequirement] {
    definition(stage).required_documents
}

pub fn document_checklist(stage: DeploymentStage, submitted: &BTreeSet<String>) -> DocumentChecklist {
    let items: Vec<ChecklistItem> = required_documents(stage)
        .iter()
        .map(|requirement| ChecklistItem {
            name: requirement.name.to_string(),
            required: requirement.required,
            submitted: submitted.contains(requirement.name),
        })
        .collect();

    let missing_required: Vec<String> = items
        .iter()
        .filter(|item| item.required && !item.submitted)
        .map(|item| item.name.clone())
        .collect();

    DocumentChecklist {
        stage,
        complete: missing_required.is_empty(),
        items,
        missing_required,
    }
}

/// Adjacency plus field completeness for a move along the deployment chain.
/// `supplied_fields` lists the names of non-blank fields the caller provides.
pub fn validate_transition(
    from: DeploymentStage,
    to: DeploymentStage,
    supplied_fields: &BTreeSet<String>,
) -> ValidationResult {
    let adjacent = next_stage(from).map(|next| next.id == to).unwrap_or(false);
    if !adjacent {
        return ValidationResult::rejected(NOT_NEXT_STAGE);
    }

    let missing: Vec<String> = definition(to)
        .required_fields
        .iter()
        .filter(|field| {
            !supplied_fields
                .iter()
                .any(|supplied| supplied.trim() == **field)
        })
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        ValidationResult::accepted()
    } else {
        ValidationResult::missing(missing)
    }
}
