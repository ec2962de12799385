pub mod deadline;
pub mod reward_kind;
pub mod signature;

pub use deadline::DeadlineStage;
pub use reward_kind::RewardKindStage;
pub use signature::SignatureStage;
