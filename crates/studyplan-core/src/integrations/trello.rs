//! Trello export -- one board per course, one list per plan day, one card
//! per (day, section) with the day's lessons as a checklist.

use std::path::Path;
use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::duration::format_compact;
use crate::error::{CoreError, Result, ValidationError};
use crate::integrations::keyring_store;
use crate::integrations::traits::Integration;
use crate::integrations::truncate_body;
use crate::plan::{PlanDay, SectionChunk};
use crate::storage::data_dir;

const SERVICE: &str = "trello";
const SECRETS_FILE: &str = "trello-secrets.json";
const LONG_LESSON_LABEL_COLOR: &str = "red";
const UNGROUPED_SECTION: &str = "Ungrouped";

/// API key + token pair. Loaded once at startup and handed to [`TrelloClient`].
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloCredentials {
    pub api_key: String,
    pub token: String,
}

impl std::fmt::Debug for TrelloCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrelloCredentials")
            .field("api_key", &"<redacted>")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl TrelloCredentials {
    pub fn new(api_key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            token: token.into(),
        }
    }

    fn usable(self) -> Option<Self> {
        (!self.api_key.is_empty() && !self.token.is_empty()).then_some(self)
    }

    /// Check the pair against `GET /members/me` without storing anything.
    pub async fn verify(&self, base_url: &str) -> Result<()> {
        let resp = Client::new()
            .get(format!("{}/members/me", base_url.trim_end_matches('/')))
            .query(&[("key", self.api_key.as_str()), ("token", self.token.as_str())])
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(CoreError::integration(
                SERVICE,
                format!("Trello auth check failed: HTTP {}", resp.status()),
            ))
        }
    }

    /// `TRELLO_API_KEY` + `TRELLO_TOKEN`, both required.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("TRELLO_API_KEY").ok()?;
        let token = std::env::var("TRELLO_TOKEN").ok()?;
        Self::new(api_key, token).usable()
    }

    /// Credentials stored by `auth trello login`.
    pub fn from_keyring() -> Result<Option<Self>> {
        let api_key = keyring_store::get("trello_api_key")?.unwrap_or_default();
        let token = keyring_store::get("trello_token")?.unwrap_or_default();
        Ok(Self::new(api_key, token).usable())
    }

    /// `{"apiKey": "...", "token": "..."}` file.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        let content = std::fs::read_to_string(path)?;
        let creds: TrelloCredentials = serde_json::from_str(&content)?;
        Ok(creds.usable())
    }

    /// Environment, then keyring, then `trello-secrets.json` in the data dir.
    pub fn load() -> Option<Self> {
        if let Some(creds) = Self::from_env() {
            tracing::debug!("trello credentials loaded from environment");
            return Some(creds);
        }

        match Self::from_keyring() {
            Ok(Some(creds)) => {
                tracing::debug!("trello credentials loaded from keyring");
                return Some(creds);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "could not read trello credentials from keyring"),
        }

        let path = data_dir().ok()?.join(SECRETS_FILE);
        match Self::from_file(&path) {
            Ok(creds) => {
                tracing::debug!(path = %path.display(), "trello credentials loaded from file");
                creds
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no trello secrets file");
                None
            }
        }
    }
}

/// Credential holder for the `auth trello` commands.
#[derive(Default)]
pub struct TrelloIntegration {
    credentials: Option<TrelloCredentials>,
}

impl TrelloIntegration {
    /// Load stored credentials from the OS keyring (none if absent).
    pub fn new() -> Self {
        Self {
            credentials: TrelloCredentials::from_keyring().ok().flatten(),
        }
    }

    /// Persist user-provided credentials to the OS keyring and update in-memory state.
    pub fn set_credentials(&mut self, api_key: &str, token: &str) -> Result<()> {
        keyring_store::set("trello_api_key", api_key)?;
        keyring_store::set("trello_token", token)?;
        self.credentials = TrelloCredentials::new(api_key, token).usable();
        Ok(())
    }
}

impl Integration for TrelloIntegration {
    fn name(&self) -> &str {
        SERVICE
    }

    fn display_name(&self) -> &str {
        "Trello"
    }

    fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    fn disconnect(&mut self) -> Result<()> {
        keyring_store::delete("trello_api_key")?;
        keyring_store::delete("trello_token")?;
        self.credentials = None;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Board {
    id: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct Label {
    id: String,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub board_id: String,
    pub board_url: String,
    pub lists: usize,
    pub cards: usize,
    pub check_items: usize,
    /// Checklist items Trello refused; the export carries on without them.
    pub failed_check_items: usize,
}

/// Whether a card for this chunk gets the long-lesson label.
pub fn has_long_lesson(chunk: &SectionChunk<'_>, threshold_secs: u64) -> bool {
    chunk.lessons.iter().any(|l| l.seconds() > threshold_secs)
}

/// Card title: `"{section} - {compact total}"`.
pub fn card_title(chunk: &SectionChunk<'_>) -> String {
    format!(
        "{} - {}",
        chunk.section.unwrap_or(UNGROUPED_SECTION),
        format_compact(chunk.total_seconds)
    )
}

pub struct TrelloClient {
    http: Client,
    base_url: String,
    credentials: TrelloCredentials,
    request_delay: Duration,
    long_lesson_secs: u64,
}

impl TrelloClient {
    /// Client against `base_url` (normally `https://api.trello.com/1`).
    pub fn new(base_url: impl Into<String>, credentials: TrelloCredentials) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            request_delay: Duration::from_millis(100),
            long_lesson_secs: 600,
        }
    }

    /// Pause after each card.
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_long_lesson_secs(mut self, secs: u64) -> Self {
        self.long_lesson_secs = secs;
        self
    }

    fn auth_query(&self) -> [(&'static str, String); 2] {
        [
            ("key", self.credentials.api_key.clone()),
            ("token", self.credentials.token.clone()),
        ]
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let resp = request.query(&self.auth_query()).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::error!(%status, body = %truncate_body(&text, 400), "trello refused {what}");
            return Err(CoreError::integration(
                SERVICE,
                format!("Failed to create {what}. Trello says: {}", truncate_body(&text, 400)),
            ));
        }

        Ok(resp.json::<T>().await?)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        what: &str,
    ) -> Result<T> {
        let request = self
            .http
            .post(format!("{}{path}", self.base_url))
            .query(params);
        self.send(request, what).await
    }

    /// Create a board for `course_title` and fill it from `plan`.
    ///
    /// Lists, cards and checklists are created one at a time so Trello keeps
    /// their order; the items of one checklist go out together.
    pub async fn export_plan(&self, course_title: &str, plan: &[PlanDay]) -> Result<ExportSummary> {
        let course_title = course_title.trim();
        if course_title.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "course_title".into(),
                message: "a board name is required".into(),
            }
            .into());
        }
        if plan.is_empty() {
            return Err(ValidationError::EmptyCollection("plan has no days".into()).into());
        }

        tracing::debug!(course_title, days = plan.len(), "creating trello board");
        let board: Board = self
            .post(
                "/boards",
                &[
                    ("name", course_title.to_string()),
                    ("defaultLists", "false".into()),
                    ("defaultLabels", "true".into()),
                ],
                "Trello board",
            )
            .await?;
        tracing::info!(board_id = %board.id, "trello board created");

        let label_id = self.long_lesson_label(&board.id).await?;

        let mut list_ids = Vec::with_capacity(plan.len());
        for day in plan {
            let name = format!("Day {}", day.day);
            let list: Created = self
                .post(
                    "/lists",
                    &[
                        ("name", name.clone()),
                        ("idBoard", board.id.clone()),
                        ("pos", "bottom".into()),
                    ],
                    &format!("list for {name}"),
                )
                .await?;
            list_ids.push(list.id);
        }
        tracing::debug!(lists = list_ids.len(), "day lists created");

        let mut summary = ExportSummary {
            board_id: board.id.clone(),
            board_url: board.url.clone(),
            lists: list_ids.len(),
            cards: 0,
            check_items: 0,
            failed_check_items: 0,
        };

        for (day, list_id) in plan.iter().zip(&list_ids) {
            for chunk in day.section_chunks() {
                self.export_chunk(day.day, list_id, &chunk, label_id.as_deref(), &mut summary)
                    .await?;
                if !self.request_delay.is_zero() {
                    tokio::time::sleep(self.request_delay).await;
                }
            }
        }

        tracing::info!(
            cards = summary.cards,
            check_items = summary.check_items,
            failed = summary.failed_check_items,
            "trello export finished"
        );
        Ok(summary)
    }

    /// Id of the board's default red label, if Trello created one.
    async fn long_lesson_label(&self, board_id: &str) -> Result<Option<String>> {
        let request = self
            .http
            .get(format!("{}/boards/{board_id}/labels", self.base_url));
        let labels: Vec<Label> = self.send(request, "board labels lookup").await?;

        let red = labels
            .into_iter()
            .find(|l| l.color.as_deref() == Some(LONG_LESSON_LABEL_COLOR))
            .map(|l| l.id);
        if red.is_none() {
            tracing::warn!(board_id, "board has no red label; long lessons stay unlabelled");
        }
        Ok(red)
    }

    async fn export_chunk(
        &self,
        day: u32,
        list_id: &str,
        chunk: &SectionChunk<'_>,
        label_id: Option<&str>,
        summary: &mut ExportSummary,
    ) -> Result<()> {
        let title = card_title(chunk);
        let mut params = vec![("idList", list_id.to_string()), ("name", title.clone())];
        if let Some(label_id) = label_id.filter(|_| has_long_lesson(chunk, self.long_lesson_secs)) {
            params.push(("idLabels", label_id.to_string()));
        }

        let card: Created = self
            .post("/cards", &params, &format!("card for {title} (Day {day})"))
            .await?;
        summary.cards += 1;

        let checklist: Created = self
            .post(
                "/checklists",
                &[("idCard", card.id.clone()), ("name", "Lessons".into())],
                &format!("checklist for {title}"),
            )
            .await?;

        let items_path = format!("/checklists/{}/checkItems", checklist.id);
        let results = join_all(chunk.lessons.iter().map(|lesson| {
            let name = format!("{} - {}", lesson.title, lesson.duration);
            let items_path = items_path.as_str();
            async move {
                self.post::<serde_json::Value>(items_path, &[("name", name)], "checklist item")
                    .await
            }
        }))
        .await;

        for result in results {
            match result {
                Ok(_) => summary.check_items += 1,
                Err(e) => {
                    tracing::warn!(card = %title, error = %e, "checklist item skipped");
                    summary.failed_check_items += 1;
                }
            }
        }

        tracing::debug!(card = %title, "card finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::Lesson;
    use crate::plan::build_plan;

    fn lesson(id: &str, duration: &str, section: &str) -> Lesson {
        Lesson::new(id, id, duration, Some(section.to_string()))
    }

    #[test]
    fn card_titles_use_compact_totals() {
        let plan = build_plan(
            &[lesson("a", "45:00", "Intro"), lesson("b", "20:00", "Intro"), lesson("c", "2:00", "Next")],
            8.0,
        );
        let chunks = plan[0].section_chunks();
        assert_eq!(card_title(&chunks[0]), "Intro - 1h 5m");
        assert_eq!(card_title(&chunks[1]), "Next - 2m");
    }

    #[test]
    fn missing_section_gets_placeholder_title() {
        let plan = build_plan(&[Lesson::new("a", "a", "1:00:00", None)], 8.0);
        assert_eq!(card_title(&plan[0].section_chunks()[0]), "Ungrouped - 1h");
    }

    #[test]
    fn long_lesson_threshold_is_exclusive() {
        let plan = build_plan(&[lesson("a", "10:00", "S"), lesson("b", "10:01", "T")], 8.0);
        let chunks = plan[0].section_chunks();
        assert!(!has_long_lesson(&chunks[0], 600));
        assert!(has_long_lesson(&chunks[1], 600));
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let creds = TrelloCredentials::new("key-123", "token-456");
        let shown = format!("{creds:?}");
        assert!(!shown.contains("key-123"));
        assert!(!shown.contains("token-456"));
    }

    #[test]
    fn credentials_file_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trello-secrets.json");
        std::fs::write(&path, r#"{"apiKey": "k", "token": "t"}"#).unwrap();
        assert_eq!(
            TrelloCredentials::from_file(&path).unwrap(),
            Some(TrelloCredentials::new("k", "t"))
        );

        std::fs::write(&path, r#"{"apiKey": "", "token": "t"}"#).unwrap();
        assert_eq!(TrelloCredentials::from_file(&path).unwrap(), None);
    }
}
