//! Error types.
//!
//! Only configuration mistakes are errors. Running out of arguments, sentences
//! or coherent positions during a simulation is an ordinary outcome and is
//! reported through the simulation log instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed argument: {reason}")]
    MalformedArgument { reason: String },

    #[error("Unknown growth mode '{name}', expected 'random' or 'tree'")]
    UnknownGrowthMode { name: String },

    #[error("Unknown update strategy '{name}', expected 'closest_coherent' or 'closest_closed_partial_coherent'")]
    UnknownUpdateStrategy { name: String },

    #[error("Unknown argument selection strategy '{name}', expected 'any' or 'max'")]
    UnknownSelectionStrategy { name: String },

    #[error("Unknown introduction strategy '{name}'")]
    UnknownIntroductionStrategy { name: String },

    #[error("Invalid sentence pool '{pattern}': {reason}")]
    InvalidSentencePool { pattern: String, reason: String },

    #[error("Invalid event weights (introduction: {introduction}, new_sentence: {new_sentence})")]
    InvalidEventWeights { introduction: u32, new_sentence: u32 },

    #[error("Invalid argument length: {reason}")]
    InvalidArgumentLength { reason: String },

    #[error("Positions range over different sentences ({left} vs {right})")]
    DomainMismatch { left: String, right: String },

    #[error("Requirements are only defined for literals, found '{formula}'")]
    NonLiteralRequirement { formula: String },
}

pub type Result<T> = std::result::Result<T, Error>;
