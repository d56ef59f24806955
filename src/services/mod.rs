//! Domain services built on the generic [`Repository`](crate::repository::Repository).

pub mod contact_messages;
pub mod profiles;
pub mod skills;
pub mod users;

pub use contact_messages::{ContactMessagesService, NewContactMessage};
pub use profiles::{FormattedProfile, ProfileWithLinks, ProfilesService};
pub use skills::{FormattedSkill, SkillsService};
pub use users::{PrivateUser, PublicUser, UsersService};
