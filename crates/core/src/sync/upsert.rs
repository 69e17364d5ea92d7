use crate::directory::DestinationDirectory;
use crate::domain::customer::{Customer, RecordId};
use crate::domain::validation::Rejection;
use crate::errors::{SyncCall, SyncError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated { id: RecordId },
}

/// Create-or-update keyed on `name`.
///
/// The lookup and the write are two separate requests, so a concurrent writer can still slip a
/// duplicate in between them. When several destination records share the name, the first one is
/// updated and the rest are left alone.
pub async fn upsert<D>(destination: &D, customer: &Customer) -> Result<UpsertOutcome, SyncError>
where
    D: DestinationDirectory + ?Sized,
{
    let matches = destination.find_existing(&customer.name).await?;
    let payload = customer.write_payload();

    match matches.into_iter().next() {
        Some(existing) => {
            let id = existing.id.ok_or(SyncError::Validation {
                call: SyncCall::FindDestination,
                reason: Rejection::MissingId,
            })?;
            destination.update(&id, &payload).await?;
            Ok(UpsertOutcome::Updated { id })
        }
        None => {
            destination.create(&payload).await?;
            Ok(UpsertOutcome::Created)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{upsert, UpsertOutcome};
    use crate::directory::InMemoryDestination;
    use crate::domain::customer::{Customer, IdPolicy, RecordId};
    use crate::domain::validation::validate;
    use crate::errors::{SyncCall, SyncError};

    fn source_customer(name: &str) -> Customer {
        validate(
            &json!({
                "name": name,
                "activeAt": "2024-05-05T12:00:00Z",
                "arr": 9100.25,
                "teamMemberId": [11, 12],
                "tier": "gold",
            }),
            IdPolicy::Optional,
        )
        .expect("valid source record")
    }

    fn stored(id: Value, name: &str) -> Value {
        json!({ "id": id, "name": name, "activeAt": "old", "arr": 1, "teamMemberId": [] })
    }

    #[tokio::test]
    async fn no_match_creates_with_the_four_synced_fields() {
        let destination = InMemoryDestination::new();

        let outcome = upsert(&destination, &source_customer("Hooli")).await.expect("upsert");

        assert_eq!(outcome, UpsertOutcome::Created);
        let writes = destination.writes().await;
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].call, SyncCall::CreateDestination);
        assert_eq!(writes[0].id, None);
        assert_eq!(
            writes[0].body,
            json!({
                "name": "Hooli",
                "activeAt": "2024-05-05T12:00:00Z",
                "arr": 9100.25,
                "teamMemberId": [11, 12],
            })
        );
    }

    #[tokio::test]
    async fn single_match_updates_that_record() {
        let destination = InMemoryDestination::seeded(vec![stored(json!("c-9"), "Hooli")]);

        let outcome = upsert(&destination, &source_customer("Hooli")).await.expect("upsert");

        assert_eq!(outcome, UpsertOutcome::Updated { id: RecordId::from("c-9") });
        let clients = destination.clients().await;
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0]["activeAt"], json!("2024-05-05T12:00:00Z"));
        assert_eq!(clients[0]["id"], json!("c-9"));
    }

    #[tokio::test]
    async fn several_matches_update_only_the_first() {
        let destination = InMemoryDestination::seeded(vec![
            stored(json!(3), "Hooli"),
            stored(json!(8), "Hooli"),
        ]);

        let outcome = upsert(&destination, &source_customer("Hooli")).await.expect("upsert");

        assert_eq!(outcome, UpsertOutcome::Updated { id: RecordId::from(3) });
        let writes = destination.writes().await;
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].id, Some(RecordId::from(3)));
        assert_eq!(destination.clients().await[1]["activeAt"], json!("old"));
    }

    #[tokio::test]
    async fn lookup_failure_prevents_any_write() {
        let destination = InMemoryDestination::new().failing(SyncCall::FindDestination, 503);

        let error = upsert(&destination, &source_customer("Hooli")).await.expect_err("lookup fails");

        assert_eq!(error, SyncError::Transport { call: SyncCall::FindDestination, status: 503 });
        assert!(destination.writes().await.is_empty());
    }

    #[tokio::test]
    async fn rejected_update_reports_the_update_call() {
        let destination = InMemoryDestination::seeded(vec![stored(json!(1), "Hooli")])
            .failing(SyncCall::UpdateDestination, 422);

        let error = upsert(&destination, &source_customer("Hooli")).await.expect_err("update fails");

        assert_eq!(error, SyncError::Transport { call: SyncCall::UpdateDestination, status: 422 });
    }

    #[tokio::test]
    async fn destination_record_without_id_is_a_validation_error() {
        let destination = InMemoryDestination::seeded(vec![json!({
            "name": "Hooli",
            "activeAt": "old",
            "arr": 1,
            "teamMemberId": [],
        })]);

        let error = upsert(&destination, &source_customer("Hooli")).await.expect_err("no id");

        assert!(matches!(error, SyncError::Validation { call: SyncCall::FindDestination, .. }));
        assert!(destination.writes().await.is_empty());
    }
}
