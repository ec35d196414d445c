//! HostedStore Tests
//!
//! Runs the hosted backend against an in-process fake of the Data API.
//!
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use ttc_core::{DonationId, DonationStatus, StatusUpdate};
use ttc_store::{
    CharitySource, DataApiClient, DonationStore, HostedCharities, HostedConfig, HostedStore,
    StoreError,
};
use ttc_store::hosted::{DONATIONS_COLLECTION, MAX_PAGES};
use ttc_test_utils::donation_for;
use warp::Filter;

const TOKEN: &str = "test-token";
const PAGE_SIZE: usize = 2;

#[derive(Default)]
struct FakeDataApi {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    unavailable: AtomicBool,
}

fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |v, key| v.get(key))
}

fn matches(doc: &Value, filter: &Value) -> bool {
    filter
        .as_object()
        .map(|f| f.iter().all(|(k, v)| lookup(doc, k) == Some(v)))
        .unwrap_or(true)
}

fn sort_key(doc: &Value) -> i64 {
    lookup(doc, "timestamp.$date").and_then(Value::as_i64).unwrap_or(0)
}

impl FakeDataApi {
    fn handle(&self, collection: &str, command: Value) -> Value {
        if self.unavailable.load(Ordering::SeqCst) {
            return json!({ "errors": [{ "message": "service unavailable" }] });
        }
        let (name, body) = match command.as_object().and_then(|m| m.iter().next()) {
            Some((name, body)) => (name.clone(), body.clone()),
            None => return json!({ "errors": [{ "message": "empty command" }] }),
        };

        let mut collections = self.collections.lock().unwrap();
        let docs = collections.entry(collection.to_string()).or_default();

        match name.as_str() {
            "insertOne" => {
                let doc = body["document"].clone();
                if docs.iter().any(|d| d["_id"] == doc["_id"]) {
                    return json!({ "errors": [{
                        "message": "document already exists",
                        "errorCode": "DOCUMENT_ALREADY_EXISTS"
                    }] });
                }
                let id = doc["_id"].clone();
                docs.push(doc);
                json!({ "status": { "insertedIds": [id] } })
            }
            "insertMany" => {
                let new_docs = body["documents"].as_array().cloned().unwrap_or_default();
                let ids: Vec<Value> = new_docs.iter().map(|d| d["_id"].clone()).collect();
                docs.extend(new_docs);
                json!({ "status": { "insertedIds": ids } })
            }
            "find" => {
                let mut found: Vec<Value> = docs
                    .iter()
                    .filter(|d| matches(d, &body["filter"]))
                    .cloned()
                    .collect();
                if body.get("sort").is_some() {
                    found.sort_by_key(|d| std::cmp::Reverse(sort_key(d)));
                }
                if let Some(limit) = body["options"]["limit"].as_u64() {
                    found.truncate(limit as usize);
                }
                let offset: usize = body["options"]["pageState"]
                    .as_str()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0);
                let page: Vec<Value> = found.iter().skip(offset).take(PAGE_SIZE).cloned().collect();
                let next = offset + page.len();
                let next_state = if next < found.len() {
                    Value::String(next.to_string())
                } else {
                    Value::Null
                };
                json!({ "data": { "documents": page, "nextPageState": next_state } })
            }
            "findOne" => {
                let doc = docs.iter().find(|d| matches(d, &body["filter"])).cloned();
                json!({ "data": { "document": doc } })
            }
            "findOneAndUpdate" => {
                let target = docs.iter_mut().find(|d| matches(d, &body["filter"]));
                match target {
                    Some(doc) => {
                        if let Some(set) = body["update"]["$set"].as_object() {
                            for (k, v) in set {
                                doc[k] = v.clone();
                            }
                        }
                        json!({ "data": { "document": doc.clone() }, "status": { "matchedCount": 1, "modifiedCount": 1 } })
                    }
                    None => json!({ "data": { "document": null }, "status": { "matchedCount": 0, "modifiedCount": 0 } }),
                }
            }
            other => json!({ "errors": [{ "message": format!("unsupported command {other}") }] }),
        }
    }
}

async fn spawn_fake() -> (Arc<FakeDataApi>, SocketAddr) {
    let api = Arc::new(FakeDataApi::default());
    let shared = Arc::clone(&api);
    let routes = warp::post()
        .and(warp::path!("api" / "json" / "v1" / String / String))
        .and(warp::header::<String>("token"))
        .and(warp::body::json())
        .map(move |_keyspace: String, collection: String, token: String, command: Value| {
            if token != TOKEN {
                return warp::reply::with_status(
                    warp::reply::json(&json!({ "errors": [{ "message": "bad token" }] })),
                    warp::http::StatusCode::UNAUTHORIZED,
                );
            }
            warp::reply::with_status(
                warp::reply::json(&shared.handle(&collection, command)),
                warp::http::StatusCode::OK,
            )
        });
    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    (api, addr)
}

fn client(addr: SocketAddr, token: &str) -> DataApiClient {
    DataApiClient::new(&HostedConfig {
        endpoint: format!("http://{addr}/"),
        token: token.to_string(),
        keyspace: "ks".to_string(),
        timeout_secs: 5,
        charity_cache_secs: 60,
    })
    .unwrap()
}

#[tokio::test]
async fn test_create_update_and_lookup() {
    let (_api, addr) = spawn_fake().await;
    let store = HostedStore::new(client(addr, TOKEN));

    let donation = donation_for("a@x.com", 50);
    let id = store.create(donation.clone()).await.unwrap();
    assert_eq!(id, donation.id);

    let updated = store
        .update_status(
            &id,
            StatusUpdate::new(DonationStatus::Completed).with_transaction_hash("0xbeef"),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, DonationStatus::Completed);
    assert_eq!(updated.transaction_hash.as_deref(), Some("0xbeef"));

    let found = store.find_by_email("a@x.com").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].amount, donation.amount);
    assert_eq!(found[0].status, DonationStatus::Completed);
}

#[tokio::test]
async fn test_duplicate_insert_maps_to_duplicate() {
    let (_api, addr) = spawn_fake().await;
    let store = HostedStore::new(client(addr, TOKEN));
    let donation = donation_for("a@x.com", 5);
    store.create(donation.clone()).await.unwrap();
    let err = store.create(donation).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)));
}

#[tokio::test]
async fn test_update_distinguishes_missing_from_settled() {
    let (_api, addr) = spawn_fake().await;
    let store = HostedStore::new(client(addr, TOKEN));

    let err = store
        .update_status(&DonationId::from("nope"), StatusUpdate::new(DonationStatus::Failed))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let donation = donation_for("b@x.com", 5);
    store.create(donation.clone()).await.unwrap();
    store
        .update_status(&donation.id, StatusUpdate::new(DonationStatus::Failed))
        .await
        .unwrap();
    let err = store
        .update_status(&donation.id, StatusUpdate::new(DonationStatus::Completed))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    let stored = store.get(&donation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, DonationStatus::Failed);
}

#[tokio::test]
async fn test_listing_follows_pages_and_respects_limit() {
    let (_api, addr) = spawn_fake().await;
    let store = HostedStore::new(client(addr, TOKEN));

    for amount in 1..=5 {
        store.create(donation_for("c@x.com", amount)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let all = store.find_by_email("c@x.com").await.unwrap();
    assert_eq!(all.len(), 5);

    let recent = store.list_recent(3).await.unwrap();
    assert_eq!(recent.len(), 3);
    assert!(recent.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    assert!(store.list_recent(0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lookup_stops_at_page_cap() {
    let (api, addr) = spawn_fake().await;
    let store = HostedStore::new(client(addr, TOKEN));

    let total = MAX_PAGES * PAGE_SIZE + 3;
    let docs: Vec<Value> = (0..total)
        .map(|i| {
            let donation = donation_for("cap@x.com", i64::try_from(i).unwrap() + 1);
            let mut doc = serde_json::to_value(&donation).unwrap();
            doc["_id"] = json!(donation.id.as_str());
            doc["timestamp"] = json!({ "$date": donation.created_at.timestamp_millis() });
            doc
        })
        .collect();
    api.collections
        .lock()
        .unwrap()
        .insert(DONATIONS_COLLECTION.to_string(), docs);

    let found = store.find_by_email("cap@x.com").await.unwrap();
    assert_eq!(found.len(), MAX_PAGES * PAGE_SIZE);
}

#[tokio::test]
async fn test_errors_are_backend_errors() {
    let (api, addr) = spawn_fake().await;

    let bad_token = HostedStore::new(client(addr, "wrong"));
    let err = bad_token.list_recent(5).await.unwrap_err();
    assert!(err.is_backend());

    api.unavailable.store(true, Ordering::SeqCst);
    let store = HostedStore::new(client(addr, TOKEN));
    let err = store.create(donation_for("d@x.com", 1)).await.unwrap_err();
    assert!(err.is_backend());
    assert!(err.to_string().contains("service unavailable"));
}

#[tokio::test]
async fn test_charities_seed_cache_and_degrade() {
    let (api, addr) = spawn_fake().await;
    let charities = HostedCharities::new(client(addr, TOKEN), Duration::from_secs(60));

    assert_eq!(charities.seed_if_empty().await.unwrap(), 3);
    assert_eq!(charities.seed_if_empty().await.unwrap(), 0);

    let listed = charities.list().await.unwrap();
    assert_eq!(listed.len(), 3);
    assert!(charities.get("education-for-all").await.unwrap().is_some());

    // a cached listing survives an outage
    api.unavailable.store(true, Ordering::SeqCst);
    assert_eq!(charities.list().await.unwrap().len(), 3);

    // an uncached source degrades to the built-in catalog
    let cold = HostedCharities::new(client(addr, TOKEN), Duration::from_secs(60));
    let fallback = cold.list().await.unwrap();
    let ids: Vec<&str> = fallback.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ttc_core::catalog::APPROVED_IDS.to_vec());
}

#[test]
fn test_filter_matching_uses_dotted_paths() {
    let doc = json!({ "donor": { "email": "a@x.com" }, "status": "pending" });
    assert!(matches(&doc, &json!({ "donor.email": "a@x.com" })));
    assert!(!matches(&doc, &json!({ "donor.email": "A@x.com" })));
    assert!(matches(&doc, &Value::Object(Map::new())));
}
