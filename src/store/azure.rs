//! Azure DevOps implementation of [`PlanStore`].
//!
//! Talks to the classic test-management REST API (`_apis/test/plans`,
//! `_apis/wit/workitems`). Configuration is via environment variables:
//! - `PLANBRIDGE_ADO_URL` - Organization base URL
//! - `PLANBRIDGE_ADO_TOKEN` - Personal access token
//! - `PLANBRIDGE_ADO_API_VERSION` - API version (default `5.0`)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};

use crate::import::suites::normalize_suite_name;
use crate::models::{PlanHandle, PlanSummary};
use crate::store::{PlanStore, StoreError};

/// Default API version for on-prem Azure DevOps Server installs.
const DEFAULT_API_VERSION: &str = "5.0";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct AzureStore {
    org_url: String,
    token: String,
    api_version: String,
    client: Client,
}

impl AzureStore {
    /// Create store from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let org_url = std::env::var("PLANBRIDGE_ADO_URL")
            .map_err(|_| anyhow::anyhow!("PLANBRIDGE_ADO_URL is not set"))?;
        let token = std::env::var("PLANBRIDGE_ADO_TOKEN")
            .map_err(|_| anyhow::anyhow!("PLANBRIDGE_ADO_TOKEN is not set"))?;
        let api_version = std::env::var("PLANBRIDGE_ADO_API_VERSION")
            .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());
        Ok(Self::new(org_url, token, api_version))
    }

    /// Create with explicit configuration.
    pub fn new(
        org_url: impl Into<String>,
        token: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .build()
            .expect("reqwest client construction cannot fail with static options");

        Self {
            org_url: org_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            api_version: api_version.into(),
            client,
        }
    }

    fn url(&self, project: &str, path: &str) -> String {
        format!(
            "{}/{}/{}?api-version={}",
            self.org_url,
            urlencode(project),
            path,
            self.api_version
        )
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        // PAT auth: empty username, token as password.
        self.client.request(method, url).basic_auth("", Some(&self.token))
    }

    /// Send a request and decode the JSON body, mapping HTTP errors to
    /// [`StoreError`].
    async fn handle_response(&self, response: reqwest::Response) -> Result<Value, StoreError> {
        let status = response.status();
        if status.is_success() {
            if status == StatusCode::NO_CONTENT {
                return Ok(Value::Null);
            }
            let body = response.text().await?;
            if body.is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&body)
                .map_err(|e| StoreError::UnexpectedResponse(format!("invalid JSON: {}", e)))
        } else {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| {
                    v.get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| body.chars().take(500).collect());
            Err(StoreError::RequestFailed {
                status: status.as_u16(),
                detail,
            })
        }
    }

    async fn get(&self, url: &str) -> Result<Value, StoreError> {
        tracing::debug!("GET {}", url);
        let response = self.request(Method::GET, url).send().await?;
        self.handle_response(response).await
    }

    async fn post(&self, url: &str, payload: &Value) -> Result<Value, StoreError> {
        tracing::debug!("POST {}", url);
        let response = self.request(Method::POST, url).json(payload).send().await?;
        self.handle_response(response).await
    }

    /// Send a work-item JSON-patch document. Creation uses POST, updates use
    /// PATCH, both with the `json-patch` media type.
    async fn patch_document(
        &self,
        method: Method,
        url: &str,
        payload: &Value,
    ) -> Result<Value, StoreError> {
        tracing::debug!("{} {}", method, url);
        let response = self
            .request(method, url)
            .header("Content-Type", "application/json-patch+json")
            .json(payload)
            .send()
            .await?;
        self.handle_response(response).await
    }

    fn id_of(value: &Value) -> Result<i64, StoreError> {
        value
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| StoreError::UnexpectedResponse(format!("missing 'id' field: {}", value)))
    }
}

#[async_trait]
impl PlanStore for AzureStore {
    async fn list_plans(&self, project: &str) -> Result<Vec<PlanSummary>, StoreError> {
        let url = self.url(project, "_apis/test/plans");
        let data = self.get(&url).await?;

        let plans = data
            .get("value")
            .and_then(Value::as_array)
            .map(|plans| {
                plans
                    .iter()
                    .filter_map(|p| {
                        Some(PlanSummary {
                            id: p.get("id")?.as_i64()?,
                            name: p.get("name")?.as_str()?.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(plans)
    }

    async fn create_plan(&self, project: &str, name: &str) -> Result<PlanHandle, StoreError> {
        let url = self.url(project, "_apis/test/plans");
        let payload = json!({
            "name": name,
            "description": format!("Test plan created by automation script - {}", name),
            "startDate": null,
            "endDate": null,
            "iteration": project,
            "areaPath": project,
        });

        tracing::info!("Creating test plan '{}'", name);
        let data = self.post(&url, &payload).await?;

        let root_suite_id = data
            .get("rootSuite")
            .and_then(|s| s.get("id"))
            .and_then(root_suite_id_value)
            .ok_or_else(|| {
                StoreError::UnexpectedResponse(format!("plan response missing root suite: {}", data))
            })?;

        Ok(PlanHandle {
            id: Self::id_of(&data)?,
            root_suite_id,
        })
    }

    async fn delete_plan(&self, project: &str, plan_id: i64) -> Result<bool, StoreError> {
        let url = self.url(project, &format!("_apis/test/plans/{}", plan_id));
        tracing::info!("Deleting test plan {}", plan_id);

        let response = self.request(Method::DELETE, &url).send().await?;
        Ok(response.status().is_success())
    }

    async fn find_or_create_suite(
        &self,
        project: &str,
        plan_id: i64,
        parent_suite_id: i64,
        name: &str,
    ) -> Result<i64, StoreError> {
        let url = self.url(
            project,
            &format!("_apis/test/plans/{}/suites/{}/suites", plan_id, parent_suite_id),
        );

        // Match against existing siblings by normalized name so cosmetic
        // differences (version suffixes, punctuation) do not duplicate suites.
        let wanted = normalize_suite_name(name);
        match self.get(&url).await {
            Ok(data) => {
                if let Some(suites) = data.get("value").and_then(Value::as_array) {
                    for suite in suites {
                        let existing = suite.get("name").and_then(Value::as_str).unwrap_or("");
                        if normalize_suite_name(existing) == wanted {
                            let id = Self::id_of(suite)?;
                            tracing::debug!("Found existing suite {} ('{}')", id, existing);
                            return Ok(id);
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Could not list suites under parent {}: {}",
                    parent_suite_id,
                    e
                );
            }
        }

        let payload = json!({
            "name": name,
            "description": format!("Test suite created by automation script - {}", name),
            "suiteType": "StaticTestSuite",
        });
        let data = self.post(&url, &payload).await?;

        // Suite creation responds with either {"value": [{"id": ...}]} or a
        // bare {"id": ...} depending on server version.
        if let Some(first) = data
            .get("value")
            .and_then(Value::as_array)
            .and_then(|v| v.first())
        {
            return Self::id_of(first);
        }
        Self::id_of(&data)
    }

    async fn create_case(
        &self,
        project: &str,
        title: &str,
        description: &str,
    ) -> Result<i64, StoreError> {
        let url = self.url(project, "_apis/wit/workitems/$Test%20Case");
        let payload = json!([
            { "op": "add", "path": "/fields/System.Title", "value": title },
            { "op": "add", "path": "/fields/System.Description", "value": description },
        ]);

        let data = self.patch_document(Method::POST, &url, &payload).await?;
        Self::id_of(&data)
    }

    async fn update_case(
        &self,
        project: &str,
        case_id: i64,
        description: &str,
        steps_xml: &str,
        params_xml: Option<&str>,
    ) -> Result<(), StoreError> {
        let url = self.url(project, &format!("_apis/wit/workitems/{}", case_id));
        let mut ops = vec![
            json!({ "op": "add", "path": "/fields/System.Description", "value": description }),
            json!({ "op": "add", "path": "/fields/Microsoft.VSTS.TCM.Steps", "value": steps_xml }),
        ];
        if let Some(params) = params_xml {
            ops.push(json!({
                "op": "add",
                "path": "/fields/Microsoft.VSTS.TCM.LocalDataSource",
                "value": params,
            }));
        }

        self.patch_document(Method::PATCH, &url, &Value::Array(ops))
            .await?;
        Ok(())
    }

    async fn add_case_to_suite(
        &self,
        project: &str,
        plan_id: i64,
        suite_id: i64,
        case_id: i64,
    ) -> Result<(), StoreError> {
        let url = self.url(
            project,
            &format!(
                "_apis/test/plans/{}/suites/{}/testcases/{}",
                plan_id, suite_id, case_id
            ),
        );
        tracing::debug!("Adding test case {} to suite {}", case_id, suite_id);
        let response = self.request(Method::POST, &url).send().await?;
        self.handle_response(response).await?;
        Ok(())
    }
}

/// Some API versions return the root suite id as a JSON string.
fn root_suite_id_value(id: &Value) -> Option<i64> {
    id.as_i64().or_else(|| id.as_str()?.parse().ok())
}

/// Minimal percent-encoding for project names in URL paths.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            ' ' => out.push_str("%20"),
            '%' => out.push_str("%25"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            _ => out.push(c),
        }
    }
    out
}
