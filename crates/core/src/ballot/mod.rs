//! Anonymous ballots: inputs, the vote predicate, and double-vote tracking
//!
//! - `inputs`: typed and JSON forms of the private witness and public statement
//! - `validator`: native evaluation of the vote predicate
//! - `registry`: per-poll set of spent nullifiers
//! - `poll`: verifier-side poll config and vote acceptance

pub mod inputs;
pub mod poll;
pub mod registry;
pub mod validator;

pub use inputs::{
    PublicInputs, PublicInputsJson, VoteInputs, VoteWitness, VoterInputs, NUM_PUBLIC_INPUTS,
    VOTE_CHOICE_BITS,
};
pub use poll::{accept_vote, Poll};
pub use registry::NullifierRegistry;
pub use validator::{vote_choice_in_range, VoteEvaluation, VoteValidator};
