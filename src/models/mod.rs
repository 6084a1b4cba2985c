pub mod application;
pub mod interview;
pub mod pipeline;
pub mod stage;
pub mod transition;
