//! Hosted document collection over the Data API
//!
//! Every operation is one JSON command posted to
//! `{endpoint}/api/json/v1/{keyspace}/{collection}` with a `Token` header.
//! Replies carry `data`, `status` and `errors` sections.

use async_trait::async_trait;
use moka::future::Cache;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use ttc_core::{Charity, DomainError, Donation, DonationId, StatusUpdate};

use crate::config::HostedConfig;
use crate::error::{StoreError, StoreResult};
use crate::store::{CharitySource, DonationStore};

/// Collection holding donation documents
pub const DONATIONS_COLLECTION: &str = "donations";

/// Collection holding charity documents
pub const CHARITIES_COLLECTION: &str = "charities";

/// Upper bound on pages followed by a single `find`
pub const MAX_PAGES: usize = 50;

#[derive(Debug, Default, Deserialize)]
struct CommandReply {
    #[serde(default)]
    data: Option<ReplyData>,
    #[serde(default)]
    status: Option<Map<String, Value>>,
    #[serde(default)]
    errors: Vec<ReplyError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyData {
    #[serde(default)]
    documents: Vec<Value>,
    #[serde(default)]
    document: Option<Value>,
    #[serde(default)]
    next_page_state: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyError {
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

/// Thin Data API client bound to one keyspace
#[derive(Debug, Clone)]
pub struct DataApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl DataApiClient {
    /// Build client from configuration
    ///
    /// # Errors
    /// - `StoreError::Http` if the HTTP client cannot be constructed
    pub fn new(config: &HostedConfig) -> StoreResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: format!(
                "{}/api/json/v1/{}",
                config.endpoint.trim_end_matches('/'),
                config.keyspace
            ),
            token: config.token.clone(),
        })
    }

    /// Post one command to a collection
    async fn command(&self, collection: &str, name: &str, body: Value) -> StoreResult<CommandReply> {
        let url = format!("{}/{}", self.base_url, collection);
        tracing::debug!("Data API {} on {}", name, collection);

        let response = self
            .http
            .post(&url)
            .header("Token", &self.token)
            .json(&json!({ name: body }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::hosted(name, format!("HTTP {status}: {text}")));
        }

        let reply: CommandReply = response.json().await?;
        if let Some(first) = reply.errors.first() {
            let message = match &first.error_code {
                Some(code) => format!("{code}: {}", first.message),
                None => first.message.clone(),
            };
            return Err(StoreError::hosted(name, message));
        }
        Ok(reply)
    }

    /// Run `find`, following page state until exhausted or `limit` reached
    async fn find_all(
        &self,
        collection: &str,
        filter: Value,
        sort: Option<Value>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Value>> {
        let mut documents = Vec::new();
        let mut page_state: Option<String> = None;
        let mut reached_limit = false;

        for _ in 0..MAX_PAGES {
            let mut options = Map::new();
            if let Some(limit) = limit {
                options.insert("limit".to_string(), json!(limit));
            }
            if let Some(state) = &page_state {
                options.insert("pageState".to_string(), json!(state));
            }
            let mut body = json!({ "filter": filter, "options": options });
            if let Some(sort) = &sort {
                body["sort"] = sort.clone();
            }

            let data = self.command(collection, "find", body).await?.data.unwrap_or_default();
            documents.extend(data.documents);
            page_state = data.next_page_state;

            if limit.is_some_and(|l| documents.len() >= l) {
                reached_limit = true;
                break;
            }
            if page_state.is_none() {
                break;
            }
        }

        if page_state.is_some() && !reached_limit {
            tracing::warn!(
                collection,
                pages = MAX_PAGES,
                fetched = documents.len(),
                "find stopped at the page cap; remaining documents were not read"
            );
        }

        if let Some(limit) = limit {
            documents.truncate(limit);
        }
        Ok(documents)
    }

    async fn find_one(&self, collection: &str, filter: Value) -> StoreResult<Option<Value>> {
        let reply = self
            .command(collection, "findOne", json!({ "filter": filter }))
            .await?;
        Ok(reply
            .data
            .and_then(|d| d.document)
            .filter(|d| !d.is_null()))
    }
}

fn to_document(donation: &Donation) -> StoreResult<Value> {
    let mut doc = serde_json::to_value(donation)?;
    if let Some(fields) = doc.as_object_mut() {
        fields.insert("_id".to_string(), json!(donation.id.as_str()));
        fields.insert(
            "timestamp".to_string(),
            json!({ "$date": donation.created_at.timestamp_millis() }),
        );
    }
    Ok(doc)
}

fn from_documents<T: serde::de::DeserializeOwned>(docs: Vec<Value>) -> StoreResult<Vec<T>> {
    docs.into_iter()
        .map(|d| serde_json::from_value(d).map_err(StoreError::from))
        .collect()
}

/// Donation store backed by the hosted collection
#[derive(Debug, Clone)]
pub struct HostedStore {
    client: DataApiClient,
}

impl HostedStore {
    /// Create store over an existing client
    #[inline]
    #[must_use]
    pub fn new(client: DataApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DonationStore for HostedStore {
    async fn create(&self, donation: Donation) -> StoreResult<DonationId> {
        let document = to_document(&donation)?;
        let reply = self
            .client
            .command(DONATIONS_COLLECTION, "insertOne", json!({ "document": document }))
            .await
            .map_err(|e| match e {
                StoreError::Hosted { ref message, .. } if message.contains("DOCUMENT_ALREADY_EXISTS") => {
                    StoreError::Duplicate(donation.id.clone())
                }
                other => other,
            })?;

        let inserted = reply
            .status
            .as_ref()
            .and_then(|s| s.get("insertedIds"))
            .and_then(Value::as_array)
            .is_some_and(|ids| !ids.is_empty());
        if !inserted {
            return Err(StoreError::hosted("insertOne", "no id acknowledged"));
        }

        tracing::info!("Stored donation {} in hosted collection", donation.id);
        Ok(donation.id)
    }

    async fn update_status(&self, id: &DonationId, update: StatusUpdate) -> StoreResult<Donation> {
        let mut set = json!({ "status": update.status });
        if let Some(hash) = &update.transaction_hash {
            set["transactionHash"] = json!(hash);
        }

        let reply = self
            .client
            .command(
                DONATIONS_COLLECTION,
                "findOneAndUpdate",
                json!({
                    "filter": { "_id": id.as_str(), "status": "pending" },
                    "update": { "$set": set },
                    "options": { "returnDocument": "after" },
                }),
            )
            .await?;

        if let Some(document) = reply.data.and_then(|d| d.document).filter(|d| !d.is_null()) {
            let donation: Donation = serde_json::from_value(document)?;
            tracing::info!("Donation {} is now {}", id, donation.status);
            return Ok(donation);
        }

        // Nothing pending matched: tell missing apart from already settled
        match self.get(id).await? {
            None => Err(StoreError::NotFound(id.clone())),
            Some(current) => Err(DomainError::InvalidTransition {
                from: current.status,
                to: update.status,
            }
            .into()),
        }
    }

    async fn get(&self, id: &DonationId) -> StoreResult<Option<Donation>> {
        self.client
            .find_one(DONATIONS_COLLECTION, json!({ "_id": id.as_str() }))
            .await?
            .map(serde_json::from_value)
            .transpose()
            .map_err(StoreError::from)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Vec<Donation>> {
        let docs = self
            .client
            .find_all(
                DONATIONS_COLLECTION,
                json!({ "donor.email": email }),
                Some(json!({ "timestamp": -1 })),
                None,
            )
            .await?;
        from_documents(docs)
    }

    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<Donation>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let docs = self
            .client
            .find_all(
                DONATIONS_COLLECTION,
                json!({}),
                Some(json!({ "timestamp": -1 })),
                Some(limit),
            )
            .await?;
        from_documents(docs)
    }

    fn backend(&self) -> &'static str {
        "hosted"
    }
}

/// Charity source backed by the hosted collection
///
/// Listings are cached for `ttl`. Any backend failure degrades to the
/// built-in catalog instead of failing the request.
#[derive(Debug, Clone)]
pub struct HostedCharities {
    client: DataApiClient,
    cache: Cache<(), Arc<Vec<Charity>>>,
}

impl HostedCharities {
    /// Create source with a listing cache of the given lifetime
    #[must_use]
    pub fn new(client: DataApiClient, ttl: Duration) -> Self {
        Self {
            client,
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    async fn fetch(&self) -> StoreResult<Vec<Charity>> {
        let docs = self
            .client
            .find_all(CHARITIES_COLLECTION, json!({}), None, None)
            .await?;
        from_documents(docs)
    }

    /// Insert the default catalog when the collection is empty
    ///
    /// Returns the number of charities written.
    ///
    /// # Errors
    /// Backend errors from the hosted collection.
    pub async fn seed_if_empty(&self) -> StoreResult<usize> {
        let existing = self
            .client
            .find_all(CHARITIES_COLLECTION, json!({}), None, Some(1))
            .await?;
        if !existing.is_empty() {
            tracing::info!("Charity collection already seeded");
            return Ok(0);
        }

        let documents = ttc_core::catalog::default_charities()
            .iter()
            .map(|c| -> StoreResult<Value> {
                let mut doc = serde_json::to_value(c)?;
                doc["_id"] = json!(c.id);
                Ok(doc)
            })
            .collect::<StoreResult<Vec<Value>>>()?;
        let count = documents.len();

        self.client
            .command(CHARITIES_COLLECTION, "insertMany", json!({ "documents": documents }))
            .await?;
        self.cache.invalidate_all();

        tracing::info!("Seeded {} charities", count);
        Ok(count)
    }
}

#[async_trait]
impl CharitySource for HostedCharities {
    async fn list(&self) -> StoreResult<Vec<Charity>> {
        if let Some(cached) = self.cache.get(&()).await {
            return Ok(cached.as_ref().clone());
        }

        match self.fetch().await {
            Ok(charities) => {
                self.cache.insert((), Arc::new(charities.clone())).await;
                Ok(charities)
            }
            Err(e) => {
                tracing::warn!("Falling back to built-in charities: {}", e);
                Ok(ttc_core::catalog::default_charities())
            }
        }
    }

    fn backend(&self) -> &'static str {
        "hosted"
    }
}
