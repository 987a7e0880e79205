use crate::contract::model::Group;
use crate::domain::repo::StoredMember;
use crate::infra::storage::entity::{group, member};

/// Convert a group row to the contract model
pub fn group_to_contract(row: group::Model) -> Group {
    Group {
        id: row.id,
        name: row.name,
        location: row.location,
    }
}

/// Convert a member row to the domain's stored representation (hash included)
pub fn member_to_stored(row: member::Model) -> StoredMember {
    StoredMember {
        id: row.id,
        name: row.name,
        alias: row.alias,
        age: row.age,
        group_id: row.group_id,
        credential_hash: row.credential_hash,
    }
}
