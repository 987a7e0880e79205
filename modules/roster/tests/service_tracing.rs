//! Tests to verify that the service layer emits expected tracing spans and
//! keeps secrets out of the logs. Runs against an in-memory fake store.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use tracing_test::traced_test;

use roster::contract::model::{Group, MemberPatch, NewGroup, NewMember};
use roster::domain::credentials::{CredentialHasher, HashError};
use roster::domain::error::DomainError;
use roster::domain::repo::{
    GroupsRepository, MembersRepository, NewStoredMember, StoredMember, Transaction, UnitOfWork,
};
use roster::domain::service::{Service, ServiceConfig};

#[derive(Default)]
struct MemoryStore {
    groups: Mutex<Vec<Group>>,
    members: Mutex<Vec<StoredMember>>,
}

/// Writes go straight to the store; commit is a no-op.
struct MemoryTx(Arc<MemoryStore>);

fn page<T: Clone>(items: &[T], offset: u64, limit: u64) -> Vec<T> {
    items
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect()
}

#[async_trait::async_trait]
impl GroupsRepository for MemoryTx {
    async fn find_group(&self, id: i32) -> Result<Option<Group>> {
        Ok(self.0.groups.lock().unwrap().iter().find(|g| g.id == id).cloned())
    }

    async fn insert_group(&self, new_group: NewGroup) -> Result<Group> {
        let mut groups = self.0.groups.lock().unwrap();
        let group = Group {
            id: groups.len() as i32 + 1,
            name: new_group.name,
            location: new_group.location,
        };
        groups.push(group.clone());
        Ok(group)
    }

    async fn update_group(&self, group: Group) -> Result<()> {
        let mut groups = self.0.groups.lock().unwrap();
        if let Some(slot) = groups.iter_mut().find(|g| g.id == group.id) {
            *slot = group;
        }
        Ok(())
    }

    async fn delete_group(&self, id: i32) -> Result<bool> {
        let mut groups = self.0.groups.lock().unwrap();
        let before = groups.len();
        groups.retain(|g| g.id != id);
        Ok(groups.len() < before)
    }

    async fn list_groups(&self, offset: u64, limit: u64) -> Result<Vec<Group>> {
        Ok(page(&self.0.groups.lock().unwrap(), offset, limit))
    }
}

#[async_trait::async_trait]
impl MembersRepository for MemoryTx {
    async fn find_member(&self, id: i32) -> Result<Option<StoredMember>> {
        Ok(self.0.members.lock().unwrap().iter().find(|m| m.id == id).cloned())
    }

    async fn insert_member(&self, m: NewStoredMember) -> Result<StoredMember> {
        let mut members = self.0.members.lock().unwrap();
        let stored = StoredMember {
            id: members.len() as i32 + 1,
            name: m.name,
            alias: m.alias,
            age: m.age,
            group_id: m.group_id,
            credential_hash: m.credential_hash,
        };
        members.push(stored.clone());
        Ok(stored)
    }

    async fn update_member(&self, member: StoredMember) -> Result<()> {
        let mut members = self.0.members.lock().unwrap();
        if let Some(slot) = members.iter_mut().find(|m| m.id == member.id) {
            *slot = member;
        }
        Ok(())
    }

    async fn delete_member(&self, id: i32) -> Result<bool> {
        let mut members = self.0.members.lock().unwrap();
        let before = members.len();
        members.retain(|m| m.id != id);
        Ok(members.len() < before)
    }

    async fn list_members(&self, offset: u64, limit: u64) -> Result<Vec<StoredMember>> {
        Ok(page(&self.0.members.lock().unwrap(), offset, limit))
    }

    async fn members_of_group(&self, group_id: i32) -> Result<Vec<StoredMember>> {
        Ok(self
            .0
            .members
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.group_id == Some(group_id))
            .cloned()
            .collect())
    }

    async fn detach_members(&self, group_id: i32) -> Result<u64> {
        let mut detached = 0;
        for m in self.0.members.lock().unwrap().iter_mut() {
            if m.group_id == Some(group_id) {
                m.group_id = None;
                detached += 1;
            }
        }
        Ok(detached)
    }
}

#[async_trait::async_trait]
impl Transaction for MemoryTx {
    async fn commit(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

struct MemoryUow(Arc<MemoryStore>);

#[async_trait::async_trait]
impl UnitOfWork for MemoryUow {
    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        Ok(Box::new(MemoryTx(self.0.clone())))
    }
}

/// Store that is always down.
struct BrokenUow;

#[async_trait::async_trait]
impl UnitOfWork for BrokenUow {
    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        Err(anyhow::anyhow!("connection refused"))
    }
}

/// Reversible stand-in for a real hasher.
struct ReversedHasher;

impl CredentialHasher for ReversedHasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        if plaintext.is_empty() {
            return Err(HashError::Empty);
        }
        Ok(format!("rev${}", plaintext.chars().rev().collect::<String>()))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        self.hash(plaintext).map(|h| h == hash).unwrap_or(false)
    }
}

type CallLog = Arc<Mutex<Vec<&'static str>>>;

/// Records every `begin` before delegating to the memory store.
struct RecordingUow {
    inner: MemoryUow,
    calls: CallLog,
}

#[async_trait::async_trait]
impl UnitOfWork for RecordingUow {
    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        self.calls.lock().unwrap().push("begin");
        self.inner.begin().await
    }
}

/// Records every `hash` before delegating to `ReversedHasher`.
struct RecordingHasher(CallLog);

impl CredentialHasher for RecordingHasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        self.0.lock().unwrap().push("hash");
        ReversedHasher.hash(plaintext)
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        ReversedHasher.verify(plaintext, hash)
    }
}

fn recording_service() -> (Service, CallLog) {
    let calls = CallLog::default();
    let service = Service::new(
        Arc::new(RecordingUow {
            inner: MemoryUow(Arc::new(MemoryStore::default())),
            calls: calls.clone(),
        }),
        Arc::new(RecordingHasher(calls.clone())),
        ServiceConfig::default(),
    );
    (service, calls)
}

fn memory_service() -> (Service, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = Service::new(
        Arc::new(MemoryUow(store.clone())),
        Arc::new(ReversedHasher),
        ServiceConfig::default(),
    );
    (service, store)
}

#[traced_test]
#[tokio::test]
async fn create_group_emits_spans() {
    let (service, _store) = memory_service();

    let result = service
        .create_group(NewGroup {
            name: "Preventers".to_string(),
            location: "Sharp Tower".to_string(),
        })
        .await;

    assert!(result.is_ok());
    assert!(logs_contain("roster.service.create_group"));
    assert!(logs_contain("Successfully created group with id=1"));
}

#[traced_test]
#[tokio::test]
async fn member_secrets_never_reach_the_logs() {
    let (service, store) = memory_service();

    let member = service
        .create_member(NewMember {
            name: "Deadpond".to_string(),
            alias: "Wade Wilson".to_string(),
            age: None,
            group_id: None,
            secret: "chimichanga".to_string(),
        })
        .await
        .unwrap();
    service
        .update_member(
            member.id,
            MemberPatch {
                secret: Some("tacos".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(logs_contain("roster.service.create_member"));
    assert!(logs_contain("roster.service.update_member"));
    assert!(!logs_contain("chimichanga"));
    assert!(!logs_contain("tacos"));

    let stored = store.members.lock().unwrap()[0].clone();
    assert!(ReversedHasher.verify("tacos", &stored.credential_hash));
}

#[traced_test]
#[tokio::test]
async fn delete_group_logs_detached_members() {
    let (service, store) = memory_service();

    let group = service
        .create_group(NewGroup {
            name: "Z-Force".to_string(),
            location: "Dive Bar".to_string(),
        })
        .await
        .unwrap();
    service
        .create_member(NewMember {
            name: "Shatterstar".to_string(),
            alias: "Gaveedra-Seven".to_string(),
            age: None,
            group_id: Some(group.id),
            secret: "mojo".to_string(),
        })
        .await
        .unwrap();

    service.delete_group(group.id).await.unwrap();

    assert!(logs_contain("roster.service.delete_group"));
    assert!(logs_contain("detached=1"));
    assert_eq!(store.members.lock().unwrap()[0].group_id, None);
}

#[tokio::test]
async fn store_outage_is_a_database_error() {
    let service = Service::new(
        Arc::new(BrokenUow),
        Arc::new(ReversedHasher),
        ServiceConfig::default(),
    );

    let err = service.list_groups(None, None).await.unwrap_err();
    match err {
        DomainError::Database { message } => assert!(message.contains("connection refused")),
        other => panic!("expected database error, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_secret_fails_before_touching_the_store() {
    let (service, store) = memory_service();

    let err = service
        .create_member(NewMember {
            name: "Deadpond".to_string(),
            alias: "Wade Wilson".to_string(),
            age: None,
            group_id: None,
            secret: String::new(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Credential { .. }));
    assert!(store.members.lock().unwrap().is_empty());
}

fn new_deadpond(secret: &str) -> NewMember {
    NewMember {
        name: "Deadpond".to_string(),
        alias: "Wade Wilson".to_string(),
        age: None,
        group_id: None,
        secret: secret.to_string(),
    }
}

#[tokio::test]
async fn secrets_are_hashed_before_any_transaction_opens() {
    let (service, calls) = recording_service();

    let member = service
        .create_member(new_deadpond("chimichanga"))
        .await
        .unwrap();
    assert_eq!(*calls.lock().unwrap(), ["hash", "begin"]);

    calls.lock().unwrap().clear();
    service
        .update_member(
            member.id,
            MemberPatch {
                secret: Some("tacos".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    // Short existence check, then the hash with no transaction open.
    assert_eq!(*calls.lock().unwrap(), ["begin", "hash", "begin"]);

    calls.lock().unwrap().clear();
    service
        .update_member(
            member.id,
            MemberPatch {
                age: Some(Some(30)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(*calls.lock().unwrap(), ["begin"]);
}

#[tokio::test]
async fn rekeying_a_missing_member_skips_the_hash() {
    let (service, calls) = recording_service();

    let err = service
        .update_member(
            4242,
            MemberPatch {
                secret: Some("x".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(
        matches!(err, DomainError::NotFound { id: 4242, .. }),
        "unexpected error: {err:?}"
    );
    assert!(!calls.lock().unwrap().contains(&"hash"));
}
