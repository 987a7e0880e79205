pub mod client;
pub mod error;
pub mod model;

pub use client::RosterApi;
pub use error::RosterError;
pub use model::{
    EntityKind, Group, GroupPatch, GroupWithMembers, Member, MemberPatch, MemberWithGroup,
    NewGroup, NewMember,
};
