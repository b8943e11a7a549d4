//! The three worker agents. Each is a pure function over its request with no
//! memory between calls, which is what lets the workers scale horizontally.

pub mod research;
pub mod synthesis;
pub mod verification;

pub use research::ResearchAgent;
pub use synthesis::SynthesisAgent;
pub use verification::VerificationAgent;
