//! REST portal backend
//!
//! `Portal` over the content portal's REST surface. Exact-match searches go
//! through the `filter` channel with an empty fuzzy `q`. The token is
//! acquired once at connect time and reused for every call; each request
//! carries the session timeout and a timed-out request is retried exactly
//! once before the error is surfaced.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use super::error::{DirectoryError, DirectoryResult};
use super::portal::Portal;
use super::query::ItemQuery;
use super::record::{
    ArtifactId, ArtifactRecord, ContentStatus, GroupId, ItemProperties, ItemType, ItemUpdate,
    PublishParams, Sharing,
};
use crate::observability::Logger;
use crate::session::PortalSession;

/// Live portal backend.
pub struct RestPortal {
    session: PortalSession,
    client: Client,
    token: String,
}

/// The slice of an item payload the release flow reads. Sharing and comment
/// details live behind separate endpoints and are not needed here.
#[derive(Debug, Deserialize)]
struct RestItem {
    id: String,
    title: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default, rename = "accessInformation")]
    access_information: Option<String>,
    #[serde(default, rename = "licenseInfo")]
    license_info: Option<String>,
    #[serde(default, rename = "contentStatus")]
    content_status: Option<String>,
    #[serde(default)]
    protected: bool,
}

impl RestItem {
    /// Items of a type this tooling does not handle are skipped.
    fn into_record(self) -> Option<ArtifactRecord> {
        let item_type = ItemType::parse(&self.item_type)?;
        let content_status = match self.content_status.as_deref() {
            Some("authoritative") => ContentStatus::Authoritative,
            Some("deprecated") => ContentStatus::Deprecated,
            _ => ContentStatus::None,
        };
        Some(ArtifactRecord {
            id: ArtifactId::new(self.id),
            name: self.name.unwrap_or_else(|| self.title.replace(' ', "_")),
            title: self.title,
            item_type,
            description: self.description.unwrap_or_default(),
            snippet: self.snippet.unwrap_or_default(),
            access_information: self.access_information.unwrap_or_default(),
            license_info: self.license_info.unwrap_or_default(),
            content_status,
            protected: self.protected,
            sharing: Sharing::default(),
            comments: Vec::new(),
            thumbnail: None,
        })
    }
}

fn map_transport(session: &PortalSession, error: reqwest::Error) -> DirectoryError {
    if error.is_timeout() {
        DirectoryError::Timeout(session.timeout().as_secs())
    } else {
        DirectoryError::Network(error.to_string())
    }
}

impl RestPortal {
    /// Authenticate once and return a ready backend.
    pub fn connect(session: PortalSession) -> DirectoryResult<Self> {
        let client = Client::builder()
            .timeout(session.timeout())
            .build()
            .map_err(|e| DirectoryError::Network(e.to_string()))?;

        let url = session.rest_url("generateToken");
        let response = client
            .post(&url)
            .form(&[
                ("username", session.username()),
                ("password", session.password()),
                ("client", "referer"),
                ("referer", session.base_url()),
                ("f", "json"),
            ])
            .send()
            .map_err(|e| map_transport(&session, e))?;
        let body: Value = response.json().map_err(|e| map_transport(&session, e))?;

        let token = body
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                let detail = body
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("no token in response");
                DirectoryError::Auth(detail.to_string())
            })?
            .to_string();

        Logger::info("portal.connected", &[("user", session.username())]);
        Ok(Self {
            session,
            client,
            token,
        })
    }

    /// Backend with a pre-acquired token, for tests that exercise the
    /// transport without a live authentication endpoint.
    #[cfg(test)]
    fn with_token(session: PortalSession, token: &str) -> Self {
        let client = Client::builder()
            .timeout(session.timeout())
            .build()
            .expect("client");
        Self {
            session,
            client,
            token: token.to_string(),
        }
    }

    fn post_once(&self, url: &str, params: &[(&str, &str)]) -> DirectoryResult<Value> {
        let mut form: Vec<(&str, &str)> = params.to_vec();
        form.push(("f", "json"));
        form.push(("token", &self.token));

        let response = self
            .client
            .post(url)
            .form(&form)
            .send()
            .map_err(|e| map_transport(&self.session, e))?;
        let body: Value = response
            .json()
            .map_err(|e| map_transport(&self.session, e))?;

        if let Some(error) = body.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown portal error")
                .to_string();
            return Err(if code == 498 || code == 499 {
                DirectoryError::Auth(message)
            } else {
                DirectoryError::Backend(message)
            });
        }
        Ok(body)
    }

    /// POST with a single retry after a timeout.
    fn post(&self, path: &str, params: &[(&str, &str)]) -> DirectoryResult<Value> {
        let url = self.session.rest_url(path);
        match self.post_once(&url, params) {
            Err(error) if error.is_timeout() => {
                Logger::warn("portal.retry_after_timeout", &[("path", path)]);
                self.post_once(&url, params)
            }
            other => other,
        }
    }

    fn expect_success(body: &Value) -> DirectoryResult<()> {
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(DirectoryError::Backend(body.to_string()));
        }
        Ok(())
    }

    fn user_path(&self, tail: &str) -> String {
        format!("content/users/{}/{}", self.session.username(), tail)
    }
}

impl Portal for RestPortal {
    fn search(&self, query: &ItemQuery) -> DirectoryResult<Vec<ArtifactRecord>> {
        query.validate()?;
        // q is required by the endpoint but left empty; filter is the exact
        // match channel.
        let filter = query.filter_expression();
        let body = self.post("search", &[("q", ""), ("filter", &filter), ("num", "100")])?;
        let results = body
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let mut records = Vec::with_capacity(results.len());
        for value in results {
            if let Ok(item) = serde_json::from_value::<RestItem>(value) {
                if let Some(record) = item.into_record() {
                    records.push(record);
                }
            }
        }
        Ok(records)
    }

    fn get(&self, id: &ArtifactId) -> DirectoryResult<Option<ArtifactRecord>> {
        match self.post(&format!("content/items/{}", id), &[]) {
            Ok(body) => {
                let item: RestItem = serde_json::from_value(body)
                    .map_err(|e| DirectoryError::Backend(e.to_string()))?;
                Ok(item.into_record())
            }
            // The items endpoint reports an unknown id as an error payload.
            Err(DirectoryError::Backend(message)) if message.contains("does not exist") => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn add(
        &self,
        properties: ItemProperties,
        data: Option<&[u8]>,
        folder: Option<&str>,
    ) -> DirectoryResult<ArtifactRecord> {
        let item_type = properties
            .item_type
            .ok_or_else(|| DirectoryError::Backend("item type is required".to_string()))?;
        let path = match folder {
            Some(folder) => format!(
                "content/users/{}/{}/addItem",
                self.session.username(),
                folder
            ),
            None => self.user_path("addItem"),
        };

        let tags = properties.tags.join(",");
        let encoded = data.map(|bytes| BASE64.encode(bytes));
        let mut params: Vec<(&str, &str)> = vec![
            ("title", &properties.title),
            ("name", &properties.name),
            ("type", item_type.as_str()),
            ("description", &properties.description),
            ("snippet", &properties.snippet),
            ("accessInformation", &properties.access_information),
            ("licenseInfo", &properties.license_info),
            ("tags", &tags),
        ];
        if let Some(encoded) = &encoded {
            params.push(("data", encoded));
        }

        let body = self.post(&path, &params)?;
        Self::expect_success(&body)?;
        let id = body
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| DirectoryError::Backend("addItem returned no id".to_string()))?;
        self.get(&ArtifactId::new(id))?
            .ok_or_else(|| DirectoryError::NotFound(ArtifactId::new(id)))
    }

    fn update(
        &self,
        id: &ArtifactId,
        update: &ItemUpdate,
        thumbnail: Option<&[u8]>,
    ) -> DirectoryResult<()> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(title) = &update.title {
            params.push(("title", title));
        }
        if let Some(text) = &update.description {
            params.push(("description", text));
        }
        if let Some(text) = &update.snippet {
            params.push(("snippet", text));
        }
        if let Some(text) = &update.access_information {
            params.push(("accessInformation", text));
        }
        if let Some(text) = &update.license_info {
            params.push(("licenseInfo", text));
        }
        if let Some(status) = update.content_status {
            params.push(("contentStatus", status.as_str()));
        }
        let tags = update.tags.as_ref().map(|t| t.join(","));
        if let Some(tags) = &tags {
            params.push(("tags", tags));
        }
        let encoded = thumbnail.map(|bytes| BASE64.encode(bytes));
        if let Some(encoded) = &encoded {
            params.push(("thumbnail", encoded));
        }

        let body = self.post(&self.user_path(&format!("items/{}/update", id)), &params)?;
        Self::expect_success(&body)
    }

    fn replace(
        &self,
        target: &ArtifactId,
        source: &ArtifactId,
        archive_name: &str,
        replace_metadata: bool,
    ) -> DirectoryResult<()> {
        let replace_metadata = replace_metadata.to_string();
        let body = self.post(
            &self.user_path("replaceService"),
            &[
                ("toReplaceItemId", target.as_str()),
                ("replacementItemId", source.as_str()),
                ("replacedServiceName", archive_name),
                ("replaceMetadata", &replace_metadata),
            ],
        )?;
        Self::expect_success(&body)
    }

    fn publish(&self, id: &ArtifactId, params: &PublishParams) -> DirectoryResult<ArtifactRecord> {
        let body = self.post(
            &self.user_path("publish"),
            &[
                ("itemId", id.as_str()),
                ("fileType", &params.file_type),
                ("outputType", &params.output_type),
            ],
        )?;
        let service_id = body
            .get("services")
            .and_then(Value::as_array)
            .and_then(|services| services.first())
            .and_then(|service| service.get("serviceItemId"))
            .and_then(Value::as_str)
            .ok_or_else(|| DirectoryError::Backend("publish returned no service".to_string()))?;
        self.get(&ArtifactId::new(service_id))?
            .ok_or_else(|| DirectoryError::NotFound(ArtifactId::new(service_id)))
    }

    fn delete(&self, id: &ArtifactId) -> DirectoryResult<()> {
        match self.post(&self.user_path(&format!("items/{}/delete", id)), &[]) {
            Ok(body) => Self::expect_success(&body),
            Err(DirectoryError::Backend(message)) if message.contains("protected") => {
                Err(DirectoryError::Protected(id.clone()))
            }
            Err(error) => Err(error),
        }
    }

    fn protect(&self, id: &ArtifactId, enable: bool) -> DirectoryResult<()> {
        let action = if enable { "protect" } else { "unprotect" };
        let body = self.post(&self.user_path(&format!("items/{}/{}", id, action)), &[])?;
        Self::expect_success(&body)
    }

    fn share(&self, id: &ArtifactId, sharing: &Sharing) -> DirectoryResult<()> {
        let groups = sharing
            .groups
            .iter()
            .map(GroupId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let everyone = sharing.everyone.to_string();
        let org = sharing.org.to_string();
        // confirmItemControl is the wire name for allow-members-to-edit; the
        // backend ignores the group list without it.
        let confirm = sharing.allow_members_to_edit.to_string();
        let body = self.post(
            &self.user_path(&format!("items/{}/share", id)),
            &[
                ("everyone", &everyone),
                ("org", &org),
                ("groups", &groups),
                ("confirmItemControl", &confirm),
            ],
        )?;
        Self::expect_success(&body)
    }

    fn add_comment(&self, id: &ArtifactId, text: &str) -> DirectoryResult<()> {
        let body = self.post(
            &format!("content/items/{}/addComment", id),
            &[("comment", text)],
        )?;
        Self::expect_success(&body)
    }

    fn search_groups(&self, title: &str) -> DirectoryResult<Vec<GroupId>> {
        let filter = format!("title:\"{}\"", title);
        let body = self.post("community/groups", &[("q", ""), ("filter", &filter)])?;
        let results = body
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(results
            .iter()
            .filter_map(|group| group.get("id").and_then(Value::as_str))
            .map(GroupId::new)
            .collect())
    }
}
