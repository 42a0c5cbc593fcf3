pub mod handlers;
pub mod machine;
pub mod service;


pub use machine::WorkflowTransition;
