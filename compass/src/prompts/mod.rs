//! Prompt composition
//!
//! Every turn sends a fully composed instruction document. The document is
//! an ordered concatenation of named sections; the order is load-bearing
//! for model priming and must not change. Static methodology text lives in
//! [`sections`]; the assembly logic lives in [`composer`].

pub mod composer;
pub mod sections;

pub use composer::{
    ProfilingState, ProfilingStatus, build_coaching_prompt, build_intake_prompt, generate_opening_message,
};
