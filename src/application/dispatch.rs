//! Action dispatch - the single entry point for callers.
//!
//! A request is a flat JSON object with an `action` field plus parameters:
//!
//! ```json
//! {"action": "write_doc", "document_id": "doxcn...", "content": "Hello", "index": -1}
//! ```
//!
//! Every request, valid or not, produces an [`ActionEnvelope`].

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::handlers::{
    CreateDocCommand, CreateDocHandler, GetDocContentHandler, GetDocContentQuery,
    GetDocOutlineHandler, GetDocOutlineQuery, ListFolderDocsHandler, ListFolderDocsQuery,
    RunSelfTestCommand, RunSelfTestHandler, WriteDocCommand, WriteDocHandler,
};
use crate::domain::document::{RenderLimits, APPEND_INDEX, DEFAULT_MAX_BLOCKS, DEFAULT_MAX_CHARS};
use crate::domain::folder::{PaginationLimits, DEFAULT_MAX_ITEMS, DEFAULT_PAGE_SIZE};
use crate::domain::foundation::{DocsError, DocumentId, FolderToken, ValidationError};
use crate::ports::DocsApi;

/// Action name reported when the request carries none.
pub const UNKNOWN_ACTION: &str = "unknown";

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn default_max_items() -> i64 {
    DEFAULT_MAX_ITEMS
}

fn default_index() -> i64 {
    APPEND_INDEX
}

fn default_max_blocks() -> i64 {
    DEFAULT_MAX_BLOCKS
}

fn default_max_chars() -> i64 {
    DEFAULT_MAX_CHARS
}

/// Integer parameter that may arrive as a JSON number or a numeric string.
fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .ok_or_else(|| D::Error::custom(format!("integer out of range: {}", n))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| D::Error::custom(format!("expected an integer, got \"{}\"", s))),
        other => Err(D::Error::custom(format!("expected an integer, got {}", other))),
    }
}

/// Flag that may arrive as a bool, a number or a string.
///
/// Strings are true when they read `1`, `true`, `yes`, `y` or `on`
/// (case-insensitive); null is false.
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Null => Ok(false),
        Value::Number(n) => Ok(n.as_f64().map_or(false, |f| f != 0.0)),
        Value::String(s) => Ok(matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        )),
        other => Err(D::Error::custom(format!("expected a flag, got {}", other))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListFolderDocsParams {
    #[serde(default, alias = "folder_token")]
    pub ai_folder_token: Option<String>,
    #[serde(default = "default_page_size", deserialize_with = "lenient_int")]
    pub page_size: i64,
    #[serde(default = "default_max_items", deserialize_with = "lenient_int")]
    pub max_items: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateDocParams {
    #[serde(default, alias = "folder_token")]
    pub ai_folder_token: Option<String>,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WriteDocParams {
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_index", deserialize_with = "lenient_int")]
    pub index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetDocContentParams {
    #[serde(default)]
    pub document_id: String,
    #[serde(default = "default_max_blocks", deserialize_with = "lenient_int")]
    pub max_blocks: i64,
    #[serde(default = "default_max_chars", deserialize_with = "lenient_int")]
    pub max_chars: i64,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub raw: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetDocOutlineParams {
    #[serde(default)]
    pub document_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelfTestParams {
    #[serde(default, alias = "folder_token")]
    pub ai_folder_token: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub run_write_test: bool,
}

/// The closed set of actions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    ListFolderDocs(ListFolderDocsParams),
    CreateDoc(CreateDocParams),
    WriteDoc(WriteDocParams),
    GetDocContent(GetDocContentParams),
    GetDocOutline(GetDocOutlineParams),
    SelfTest(SelfTestParams),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::ListFolderDocs(_) => "list_folder_docs",
            Action::CreateDoc(_) => "create_doc",
            Action::WriteDoc(_) => "write_doc",
            Action::GetDocContent(_) => "get_doc_content",
            Action::GetDocOutline(_) => "get_doc_outline",
            Action::SelfTest(_) => "self_test",
        }
    }

    /// Parses a request object.
    pub fn from_request(request: Value) -> Result<Self, ValidationError> {
        match request.get("action") {
            Some(Value::String(_)) => {}
            Some(_) => {
                return Err(ValidationError::invalid_format("action", "must be a string"));
            }
            None => return Err(ValidationError::empty_field("action")),
        }
        serde_json::from_value(request)
            .map_err(|e| ValidationError::invalid_format("request", e.to_string()))
    }
}

/// Uniform result of every action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionEnvelope {
    pub ok: bool,
    pub action: String,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl ActionEnvelope {
    pub fn success(action: impl Into<String>, data: Value) -> Self {
        Self {
            ok: true,
            action: action.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(action: impl Into<String>, error: &DocsError) -> Self {
        Self {
            ok: false,
            action: action.into(),
            data: None,
            error: Some(error.envelope_message()),
        }
    }
}

/// Routes actions to handlers and wraps every outcome in an envelope.
pub struct Dispatcher {
    api: Arc<dyn DocsApi>,
    default_folder: Option<FolderToken>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn DocsApi>, default_folder: Option<FolderToken>) -> Self {
        Self {
            api,
            default_folder,
        }
    }

    /// Parses and runs a raw request.
    pub async fn dispatch(&self, request: Value) -> ActionEnvelope {
        let name = request
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_ACTION)
            .to_string();

        match Action::from_request(request) {
            Ok(action) => self.dispatch_action(action).await,
            Err(err) => {
                let err = DocsError::from(err);
                tracing::error!(action = %name, "Rejected request: {}", err);
                ActionEnvelope::failure(name, &err)
            }
        }
    }

    /// Runs a parsed action.
    pub async fn dispatch_action(&self, action: Action) -> ActionEnvelope {
        let name = action.name();
        tracing::debug!(action = name, "Dispatching");

        match self.execute(action).await {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::error!(action = name, code = %err.code(), "Action failed: {}", err);
                ActionEnvelope::failure(name, &err)
            }
        }
    }

    async fn execute(&self, action: Action) -> Result<ActionEnvelope, DocsError> {
        let name = action.name();
        let api = self.api.clone();

        match action {
            Action::ListFolderDocs(params) => {
                let query = ListFolderDocsQuery {
                    folder_token: self.resolve_folder(params.ai_folder_token)?,
                    limits: PaginationLimits::new(params.page_size, params.max_items)?,
                };
                let listing = ListFolderDocsHandler::new(api).handle(query).await?;
                Ok(ActionEnvelope::success(name, to_data(&listing)?))
            }
            Action::CreateDoc(params) => {
                let cmd = CreateDocCommand {
                    folder_token: self.resolve_folder(params.ai_folder_token)?,
                    title: params.title,
                };
                let created = CreateDocHandler::new(api).handle(cmd).await?;
                Ok(ActionEnvelope::success(name, to_data(&created)?))
            }
            Action::WriteDoc(params) => {
                let cmd = WriteDocCommand {
                    document_id: DocumentId::new(params.document_id)?,
                    content: params.content,
                    index: params.index,
                };
                let result = WriteDocHandler::new(api).handle(cmd).await?;
                Ok(ActionEnvelope::success(name, to_data(&result)?))
            }
            Action::GetDocContent(params) => {
                let query = GetDocContentQuery {
                    document_id: DocumentId::new(params.document_id)?,
                    limits: RenderLimits::new(params.max_blocks, params.max_chars)?,
                    raw: params.raw,
                };
                let content = GetDocContentHandler::new(api).handle(query).await?;
                Ok(ActionEnvelope::success(name, to_data(&content)?))
            }
            Action::GetDocOutline(params) => {
                let query = GetDocOutlineQuery {
                    document_id: DocumentId::new(params.document_id)?,
                };
                let outline = GetDocOutlineHandler::new(api).handle(query).await?;
                Ok(ActionEnvelope::success(name, to_data(&outline)?))
            }
            Action::SelfTest(params) => {
                let folder_token = match non_blank(params.ai_folder_token) {
                    Some(token) => Some(FolderToken::new(token)?),
                    None => self.default_folder.clone(),
                };
                let cmd = RunSelfTestCommand {
                    folder_token,
                    run_write_test: params.run_write_test,
                };
                let report = RunSelfTestHandler::new(api).handle(cmd).await?;

                let error = report
                    .first_failure()
                    .map(|step| format!("self_test step {} failed", step.step_name));
                Ok(ActionEnvelope {
                    ok: report.ok,
                    action: name.to_string(),
                    data: Some(to_data(&report)?),
                    error,
                })
            }
        }
    }

    /// Explicit token first, then the configured default.
    fn resolve_folder(&self, explicit: Option<String>) -> Result<FolderToken, DocsError> {
        match non_blank(explicit) {
            Some(token) => Ok(FolderToken::new(token)?),
            None => self.default_folder.clone().ok_or_else(|| {
                DocsError::configuration_missing(
                    "ai_folder_token not given and FEISHU_AI_FOLDER_TOKEN not set",
                )
            }),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn to_data<T: Serialize>(value: &T) -> Result<Value, DocsError> {
    serde_json::to_value(value)
        .map_err(|e| DocsError::transport(format!("failed to encode result: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryDocsApi;
    use crate::domain::folder::FolderEntry;
    use serde_json::json;

    fn dispatcher(api: InMemoryDocsApi, folder: Option<&str>) -> Dispatcher {
        Dispatcher::new(
            Arc::new(api),
            folder.map(|f| FolderToken::new(f).unwrap()),
        )
    }

    #[test]
    fn parses_with_defaults() {
        let action = Action::from_request(json!({"action": "list_folder_docs"})).unwrap();
        assert_eq!(
            action,
            Action::ListFolderDocs(ListFolderDocsParams {
                ai_folder_token: None,
                page_size: 100,
                max_items: 500,
            })
        );

        let action = Action::from_request(json!({"action": "write_doc", "document_id": "d"})).unwrap();
        match action {
            Action::WriteDoc(params) => assert_eq!(params.index, -1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let action = Action::from_request(
            json!({"action": "list_folder_docs", "page_size": "20", "max_items": " 40 "}),
        )
        .unwrap();
        assert_eq!(
            action,
            Action::ListFolderDocs(ListFolderDocsParams {
                ai_folder_token: None,
                page_size: 20,
                max_items: 40,
            })
        );

        let action = Action::from_request(
            json!({"action": "write_doc", "document_id": "d", "content": "x", "index": "-1"}),
        )
        .unwrap();
        match action {
            Action::WriteDoc(params) => assert_eq!(params.index, -1),
            other => panic!("unexpected {:?}", other),
        }

        let action = Action::from_request(json!({
            "action": "get_doc_content",
            "document_id": "d",
            "max_blocks": "10",
            "max_chars": 300.0,
            "raw": "yes"
        }))
        .unwrap();
        match action {
            Action::GetDocContent(params) => {
                assert_eq!(params.max_blocks, 10);
                assert_eq!(params.max_chars, 300);
                assert!(params.raw);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn non_numeric_string_is_rejected() {
        assert!(Action::from_request(json!({"action": "list_folder_docs", "page_size": "many"}))
            .is_err());
    }

    #[test]
    fn truthy_strings_enable_flags() {
        for (value, expected) in [
            (json!("true"), true),
            (json!("1"), true),
            (json!("ON"), true),
            (json!("y"), true),
            (json!("false"), false),
            (json!("no"), false),
            (json!(""), false),
            (json!(1), true),
            (json!(0), false),
            (Value::Null, false),
        ] {
            let action =
                Action::from_request(json!({"action": "self_test", "run_write_test": value.clone()}))
                    .unwrap();
            match action {
                Action::SelfTest(params) => {
                    assert_eq!(params.run_write_test, expected, "value {}", value)
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn string_flag_runs_write_self_test() {
        let api = InMemoryDocsApi::new().with_folder("fld", vec![]);
        let envelope = dispatcher(api.clone(), Some("fld"))
            .dispatch(json!({"action": "self_test", "run_write_test": "true"}))
            .await;

        assert!(envelope.ok, "{:?}", envelope.error);
        assert_eq!(envelope.data.unwrap()["mode"], "write");
        assert_eq!(api.document_count(), 1);
    }

    #[test]
    fn folder_token_alias_is_accepted() {
        let action =
            Action::from_request(json!({"action": "create_doc", "folder_token": "fld", "title": "T"}))
                .unwrap();
        match action {
            Action::CreateDoc(params) => assert_eq!(params.ai_folder_token.as_deref(), Some("fld")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_and_missing_actions_are_rejected() {
        assert!(Action::from_request(json!({"action": "delete_doc"})).is_err());
        assert!(Action::from_request(json!({"page_size": 5})).is_err());
        assert!(Action::from_request(json!({"action": 7})).is_err());
    }

    #[tokio::test]
    async fn missing_action_reports_unknown() {
        let envelope = dispatcher(InMemoryDocsApi::new(), None)
            .dispatch(json!({}))
            .await;

        assert!(!envelope.ok);
        assert_eq!(envelope.action, "unknown");
        assert!(envelope.data.is_none());
        assert!(envelope.error.unwrap().starts_with("[VALIDATION_FAILED]"));
    }

    #[tokio::test]
    async fn unsupported_action_keeps_its_name() {
        let envelope = dispatcher(InMemoryDocsApi::new(), None)
            .dispatch(json!({"action": "delete_doc"}))
            .await;

        assert!(!envelope.ok);
        assert_eq!(envelope.action, "delete_doc");
    }

    #[tokio::test]
    async fn list_uses_configured_folder() {
        let api = InMemoryDocsApi::new()
            .with_folder("fld", vec![FolderEntry::new("doxA", "A", "docx")]);

        let envelope = dispatcher(api, Some("fld"))
            .dispatch(json!({"action": "list_folder_docs"}))
            .await;

        assert!(envelope.ok, "{:?}", envelope.error);
        let data = envelope.data.unwrap();
        assert_eq!(data["folder_token"], "fld");
        assert_eq!(data["count"], 1);
        assert_eq!(data["items"][0]["document_id"], "doxA");
    }

    #[tokio::test]
    async fn missing_folder_is_configuration_error() {
        let envelope = dispatcher(InMemoryDocsApi::new(), None)
            .dispatch(json!({"action": "create_doc", "title": "T"}))
            .await;

        assert!(!envelope.ok);
        assert!(envelope
            .error
            .unwrap()
            .starts_with("[CONFIGURATION_MISSING]"));
    }

    #[tokio::test]
    async fn invalid_page_size_is_validation_error() {
        let api = InMemoryDocsApi::new().with_folder("fld", vec![]);
        let envelope = dispatcher(api.clone(), Some("fld"))
            .dispatch(json!({"action": "list_folder_docs", "page_size": 0}))
            .await;

        assert!(!envelope.ok);
        assert!(envelope.error.unwrap().starts_with("[VALIDATION_FAILED]"));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_document_id_is_validation_error() {
        let envelope = dispatcher(InMemoryDocsApi::new(), None)
            .dispatch(json!({"action": "get_doc_outline"}))
            .await;

        assert!(!envelope.ok);
        assert!(envelope.error.unwrap().starts_with("[VALIDATION_FAILED]"));
    }

    #[tokio::test]
    async fn failed_self_test_names_the_step() {
        let envelope = dispatcher(InMemoryDocsApi::new(), None)
            .dispatch(json!({"action": "self_test"}))
            .await;

        assert!(!envelope.ok);
        assert_eq!(envelope.error.as_deref(), Some("self_test step start failed"));
        assert_eq!(envelope.data.unwrap()["steps"][0]["ok"], false);
    }

    #[test]
    fn envelope_serializes_nulls() {
        let envelope = ActionEnvelope::failure("x", &DocsError::not_found("doc"));
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            json,
            json!({"ok": false, "action": "x", "data": null, "error": "[NOT_FOUND] not found: doc"})
        );
    }
}
