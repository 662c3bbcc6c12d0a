use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;

use crate::core::errors::{Result, TresorError};
use crate::core::models::object_attrs::{DeletePolicy, Generation, ObjectAttrs};
use crate::core::models::object_metadata::MetadataRecord;
use crate::core::traits::blob_store::BlobStore;

/// Public Google Cloud Storage endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// Environment variable holding an OAuth2 bearer token.
pub const ACCESS_TOKEN_ENV: &str = "TRESOR_ACCESS_TOKEN";

/// Which timeout a request runs under.
#[derive(Debug, Clone, Copy)]
enum OperationClass {
    /// Attribute reads, listings, deletes and metadata patches.
    Metadata,
    /// Uploads, downloads and copies.
    Transfer,
}

/// Google Cloud Storage through its JSON API.
///
/// Every call builds its own runtime and HTTP client and drops both before
/// returning, so no connection outlives the operation that opened it.
#[derive(Debug, Clone)]
pub struct GcsStore {
    endpoint: String,
    access_token: Option<String>,
    metadata_timeout: Duration,
    transfer_timeout: Duration,
    delete_policy: DeletePolicy,
}

/// Object resource as returned by the JSON API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GcsObject {
    name: String,
    /// int64 values are sent as strings.
    generation: String,
    #[serde(default)]
    size: Option<String>,
    updated: DateTime<Utc>,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    md5_hash: Option<String>,
    #[serde(default)]
    metadata: MetadataRecord,
    #[serde(default)]
    time_deleted: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GcsListing {
    #[serde(default)]
    items: Vec<GcsObject>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl GcsObject {
    fn into_attrs(self) -> Result<ObjectAttrs> {
        let generation = self.generation.parse::<Generation>().map_err(|_| {
            TresorError::StorageTransport {
                operation: "decode".into(),
                key: self.name.clone(),
                reason: format!("invalid generation '{}'", self.generation),
            }
        })?;

        Ok(ObjectAttrs {
            generation,
            size: self
                .size
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            updated: self.updated,
            content_type: self.content_type,
            // base64 on the wire; hex is what `md5sum` prints.
            md5: self
                .md5_hash
                .and_then(|b64| BASE64.decode(b64).ok())
                .map(hex::encode),
            metadata: self.metadata,
            live: self.time_deleted.is_none(),
            name: self.name,
        })
    }
}

impl GcsStore {
    pub fn new(
        endpoint: impl Into<String>,
        metadata_timeout: Duration,
        transfer_timeout: Duration,
        delete_policy: DeletePolicy,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_token: None,
            metadata_timeout,
            transfer_timeout,
            delete_policy,
        }
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|t| !t.is_empty());
        self
    }

    fn timeout(&self, class: OperationClass) -> Duration {
        match class {
            OperationClass::Metadata => self.metadata_timeout,
            OperationClass::Transfer => self.transfer_timeout,
        }
    }

    /// `<endpoint>/<prefix...>/b/<bucket>/o[/<segments>...]`, each segment
    /// percent-encoded on its own so object names may contain `/`.
    fn url(&self, api_prefix: &[&str], bucket: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| TresorError::InvalidConfig {
            detail: format!("invalid storage endpoint '{}': {e}", self.endpoint),
        })?;
        url.path_segments_mut()
            .map_err(|_| TresorError::InvalidConfig {
                detail: format!("storage endpoint '{}' cannot carry a path", self.endpoint),
            })?
            .pop_if_empty()
            .extend(api_prefix)
            .extend(["b", bucket, "o"])
            .extend(segments);
        Ok(url)
    }

    fn object_url(&self, bucket: &str, key: &str) -> Result<Url> {
        self.url(&["storage", "v1"], bucket, &[key])
    }

    /// Run one request to completion and hand back the successful response body.
    fn execute(
        &self,
        call: Call<'_>,
        method: Method,
        url: Url,
        body: Option<RequestBody>,
    ) -> Result<Vec<u8>> {
        let Call {
            operation,
            bucket,
            key,
            class,
        } = call;
        let transport = |reason: String| TresorError::StorageTransport {
            operation: operation.to_string(),
            key: key.to_string(),
            reason,
        };

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| transport(format!("failed to create async runtime: {e}")))?;

        let timeout = self.timeout(class);
        tracing::debug!(operation, bucket, key, %method, timeout_secs = timeout.as_secs(), "storage request");

        rt.block_on(async {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(format!("tresor/{}", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| transport(format!("failed to create HTTP client: {e}")))?;

            let mut request = client.request(method, url);
            if let Some(token) = &self.access_token {
                request = request.bearer_auth(token);
            }
            request = match body {
                Some(RequestBody::Bytes(bytes)) => request
                    .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                    .body(bytes),
                Some(RequestBody::Json(value)) => request.json(&value),
                None => request,
            };

            let response = request
                .send()
                .await
                .map_err(|e| transport(describe_reqwest(&e)))?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(TresorError::ObjectNotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                });
            }
            if !status.is_success() {
                return Err(transport(format!("server returned {status}")));
            }

            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| transport(describe_reqwest(&e)))
        })
    }

    fn execute_json<T: for<'de> Deserialize<'de>>(
        &self,
        call: Call<'_>,
        method: Method,
        url: Url,
        body: Option<RequestBody>,
    ) -> Result<T> {
        let bytes = self.execute(call, method, url, body)?;
        serde_json::from_slice(&bytes).map_err(|e| TresorError::StorageTransport {
            operation: call.operation.to_string(),
            key: call.key.to_string(),
            reason: format!("unexpected response: {e}"),
        })
    }

    fn list_pages(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        versions: bool,
    ) -> Result<Vec<GcsObject>> {
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.url(&["storage", "v1"], bucket, &[])?;
            {
                let mut query = url.query_pairs_mut();
                if let Some(prefix) = prefix {
                    query.append_pair("prefix", prefix);
                }
                if versions {
                    query.append_pair("versions", "true");
                }
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let page: GcsListing = self.execute_json(
                Call::new("list", bucket, prefix.unwrap_or(""), OperationClass::Metadata),
                Method::GET,
                url,
                None,
            )?;
            objects.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(objects)
    }

    fn delete_generation(&self, bucket: &str, key: &str, generation: Option<Generation>) -> Result<()> {
        let mut url = self.object_url(bucket, key)?;
        if let Some(generation) = generation {
            url.query_pairs_mut()
                .append_pair("generation", &generation.to_string());
        }
        self.execute(
            Call::new("delete", bucket, key, OperationClass::Metadata),
            Method::DELETE,
            url,
            None,
        )
        .map(|_| ())
    }
}

/// Context of one storage request, carried into its errors.
#[derive(Debug, Clone, Copy)]
struct Call<'a> {
    operation: &'a str,
    bucket: &'a str,
    key: &'a str,
    class: OperationClass,
}

impl<'a> Call<'a> {
    fn new(operation: &'a str, bucket: &'a str, key: &'a str, class: OperationClass) -> Self {
        Self {
            operation,
            bucket,
            key,
            class,
        }
    }
}

enum RequestBody {
    Bytes(Vec<u8>),
    Json(serde_json::Value),
}

/// Flatten a reqwest error into one line, naming timeouts explicitly.
fn describe_reqwest(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else {
        e.to_string()
    }
}

impl BlobStore for GcsStore {
    fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<ObjectAttrs> {
        let mut url = self.url(&["upload", "storage", "v1"], bucket, &[])?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key);

        let object: GcsObject = self.execute_json(
            Call::new("put", bucket, key, OperationClass::Transfer),
            Method::POST,
            url,
            Some(RequestBody::Bytes(bytes.to_vec())),
        )?;
        object.into_attrs()
    }

    fn get(&self, bucket: &str, key: &str, version: Option<Generation>) -> Result<Vec<u8>> {
        let mut url = self.object_url(bucket, key)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("alt", "media");
            if let Some(generation) = version {
                query.append_pair("generation", &generation.to_string());
            }
        }
        self.execute(
            Call::new("get", bucket, key, OperationClass::Transfer),
            Method::GET,
            url,
            None,
        )
    }

    fn stat(&self, bucket: &str, key: &str) -> Result<ObjectAttrs> {
        let url = self.object_url(bucket, key)?;
        let object: GcsObject = self.execute_json(
            Call::new("stat", bucket, key, OperationClass::Metadata),
            Method::GET,
            url,
            None,
        )?;
        object.into_attrs()
    }

    fn list(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        include_versions: bool,
    ) -> Result<Vec<ObjectAttrs>> {
        let mut listing = self
            .list_pages(bucket, prefix, include_versions)?
            .into_iter()
            .map(GcsObject::into_attrs)
            .collect::<Result<Vec<_>>>()?;
        listing.sort_by(|a, b| a.name.cmp(&b.name).then(a.generation.cmp(&b.generation)));
        Ok(listing)
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        match self.delete_policy {
            // Turns the live generation noncurrent on a versioned bucket;
            // without bucket versioning the object is deleted permanently.
            DeletePolicy::Retain => self.delete_generation(bucket, key, None),
            DeletePolicy::Purge => {
                let generations: Vec<Generation> = self
                    .list_pages(bucket, Some(key), true)?
                    .into_iter()
                    .filter(|object| object.name == key)
                    .map(GcsObject::into_attrs)
                    .map(|attrs| attrs.map(|a| a.generation))
                    .collect::<Result<_>>()?;
                if generations.is_empty() {
                    return Err(TresorError::ObjectNotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    });
                }
                for generation in generations {
                    self.delete_generation(bucket, key, Some(generation))?;
                }
                Ok(())
            }
        }
    }

    fn copy(&self, bucket: &str, source: &str, destination: &str) -> Result<ObjectAttrs> {
        let mut url = self.object_url(bucket, source)?;
        url.path_segments_mut()
            .map_err(|_| TresorError::InvalidConfig {
                detail: format!("storage endpoint '{}' cannot carry a path", self.endpoint),
            })?
            .extend(["copyTo", "b", bucket, "o", destination]);

        let object: GcsObject = self.execute_json(
            Call::new("copy", bucket, source, OperationClass::Transfer),
            Method::POST,
            url,
            None,
        )?;
        object.into_attrs()
    }

    fn update_metadata(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        metadata: &MetadataRecord,
    ) -> Result<()> {
        let url = self.object_url(bucket, key)?;
        let body = serde_json::json!({
            "contentType": content_type,
            "metadata": metadata,
        });
        self.execute(
            Call::new("update metadata", bucket, key, OperationClass::Metadata),
            Method::PATCH,
            url,
            Some(RequestBody::Json(body)),
        )
        .map(|_| ())
    }

    fn name(&self) -> &str {
        "gcs"
    }
}
