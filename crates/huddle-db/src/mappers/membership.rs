//! Membership entity <-> model mapper

use huddle_core::entities::Membership;
use huddle_core::value_objects::Snowflake;

use crate::models::MembershipModel;

impl From<MembershipModel> for Membership {
    fn from(model: MembershipModel) -> Self {
        Membership {
            conversation_id: Snowflake::new(model.conversation_id),
            user_id: Snowflake::new(model.user_id),
            last_seen_at: model.last_seen_at,
            typing_until: model.typing_until,
            joined_at: model.joined_at,
        }
    }
}
