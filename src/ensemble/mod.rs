//! Voting ensemble

mod voting;

pub use voting::{EnsembleParams, SoftVotingClassifier, VotingMember};
