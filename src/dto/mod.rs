pub mod pipeline_dto;
pub mod workflow_dto;
