//! Ports - traits implemented by the infrastructure crates

mod clock;
mod publisher;
mod repositories;

pub use clock::{Clock, ManualClock, SystemClock};
pub use publisher::{EventPublisher, NoopPublisher};
pub use repositories::{
    ConversationRepository, MembershipRepository, MessageRepository, RepoResult, UserRepository,
};
