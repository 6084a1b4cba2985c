pub mod application_api;
pub mod pipeline_service;
pub mod stage_vocabulary;
pub mod transition_executor;
pub mod transition_rules;
pub mod transition_validator;
