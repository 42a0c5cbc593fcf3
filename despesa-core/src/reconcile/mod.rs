pub mod handlers;
pub mod service;
pub mod settlement;


pub use settlement::Settlement;
