pub mod orchestrate;
pub mod research;
pub mod synthesize;
pub mod verify;
