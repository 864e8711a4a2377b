use crate::domain::model::{BranchRecord, Coordinates, FetchedPage};
use crate::domain::ports::{BranchSource, ConfigProvider};
use crate::utils::error::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

pub const BRANCH_PAGE_QUERY: &str = r#"query BranchPage($limit: Int, $skip: Int) {
  Branch(limit: $limit, skip: $skip) {
    total
    items {
      Name
      City
      Street
      Coordinates
      Phone
      Email
    }
  }
}"#;

/// Branch item as the content API spells it.
#[derive(Debug, Deserialize)]
struct RawBranch {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "City")]
    city: Option<String>,
    #[serde(rename = "Street")]
    street: Option<String>,
    #[serde(rename = "Coordinates")]
    coordinates: Option<String>,
    #[serde(rename = "Phone")]
    phone: Option<String>,
    #[serde(rename = "Email")]
    email: Option<String>,
}

/// Fetches branch pages from a headless-CMS GraphQL endpoint.
pub struct GraphQlBranchSource {
    client: Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl GraphQlBranchSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            auth_token: None,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        let mut source = Self::new(config.api_endpoint());
        source.auth_token = config.auth_token().map(str::to_string);
        source
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

#[async_trait]
impl BranchSource for GraphQlBranchSource {
    async fn fetch_page(&self, skip: usize, limit: usize) -> Result<FetchedPage, FetchError> {
        tracing::debug!("Requesting branches skip={} limit={} from {}", skip, limit, self.endpoint);

        let payload = serde_json::json!({
            "query": BRANCH_PAGE_QUERY,
            "variables": { "limit": limit, "skip": skip },
        });

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                FetchError::Decode(e.to_string())
            } else {
                FetchError::Transport(e)
            }
        })?;

        parse_branch_page(&body)
    }
}

/// Turns a GraphQL response body into a page of records.
///
/// Any reported error fails the fetch with its first message. A body without
/// `data.Branch.items` is an empty page, not a failure.
pub fn parse_branch_page(body: &Value) -> Result<FetchedPage, FetchError> {
    if let Some(message) = body.get("errors").and_then(api_error_message) {
        return Err(FetchError::Api(message));
    }

    let Some(items) = body.pointer("/data/Branch/items").and_then(Value::as_array) else {
        tracing::debug!("Response has no branch items, treating as empty page");
        return Ok(FetchedPage::empty());
    };

    let total = body
        .pointer("/data/Branch/total")
        .and_then(Value::as_u64)
        .unwrap_or(0) as usize;

    let records = items.iter().filter_map(normalize_item).collect();

    Ok(FetchedPage { records, total })
}

/// `None` when the payload carries no error: absent, null, `false` or an
/// empty list. Servers that send a single error object instead of a list
/// are honored too.
fn api_error_message(errors: &Value) -> Option<String> {
    let first = match errors {
        Value::Null | Value::Bool(false) => return None,
        Value::Array(list) => list.first()?,
        other => other,
    };

    let message = match first {
        Value::String(message) => message.as_str(),
        other => other
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown API error"),
    };
    Some(message.to_string())
}

fn normalize_item(item: &Value) -> Option<BranchRecord> {
    let raw: RawBranch = match serde_json::from_value(item.clone()) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Skipping malformed branch item: {}", e);
            return None;
        }
    };

    let Some(name) = non_empty(raw.name) else {
        tracing::warn!("Skipping branch item without a name");
        return None;
    };

    let coordinates = raw.coordinates.as_deref().and_then(|value| {
        let parsed = Coordinates::parse(value);
        if parsed.is_none() {
            tracing::debug!("Branch '{}' has unusable coordinates '{}'", name, value);
        }
        parsed
    });

    Some(BranchRecord {
        name,
        city: non_empty(raw.city),
        street: non_empty(raw.street),
        phone: non_empty(raw.phone),
        email: non_empty(raw.email),
        coordinates,
        distance_miles: None,
        is_hidden_by_filter: false,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn branch_page(total: u64, items: Value) -> Value {
        serde_json::json!({ "data": { "Branch": { "total": total, "items": items } } })
    }

    #[test]
    fn test_parse_full_item() {
        let body = branch_page(
            1,
            serde_json::json!([{
                "Name": "Spring Branch",
                "City": "Springfield",
                "Street": "742 Evergreen Terrace",
                "Coordinates": "39.7817,-89.6501",
                "Phone": "555-0100",
                "Email": "spring@example.com"
            }]),
        );

        let page = parse_branch_page(&body).unwrap();
        assert_eq!(page.total, 1);
        let record = &page.records[0];
        assert_eq!(record.name, "Spring Branch");
        assert_eq!(record.city.as_deref(), Some("Springfield"));
        assert_eq!(record.coordinates, Some(Coordinates::new(39.7817, -89.6501)));
        assert_eq!(record.email.as_deref(), Some("spring@example.com"));
        assert!(record.distance_miles.is_none());
    }

    #[test]
    fn test_missing_items_is_empty_page() {
        let body = serde_json::json!({ "data": { "Branch": { "total": 12 } } });
        assert_eq!(parse_branch_page(&body).unwrap(), FetchedPage::empty());

        let body = serde_json::json!({ "data": null });
        assert_eq!(parse_branch_page(&body).unwrap(), FetchedPage::empty());
    }

    #[test]
    fn test_missing_total_defaults_to_zero() {
        let body = serde_json::json!({ "data": { "Branch": { "items": [{ "Name": "Solo" }] } } });
        let page = parse_branch_page(&body).unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.records.len(), 1);
    }

    #[test]
    fn test_error_list_fails_with_first_message() {
        let body = serde_json::json!({
            "errors": [{ "message": "Field 'Branch' is not defined" }, { "message": "second" }]
        });
        match parse_branch_page(&body) {
            Err(FetchError::Api(message)) => assert_eq!(message, "Field 'Branch' is not defined"),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_object_fails_even_with_data() {
        let body = serde_json::json!({
            "errors": { "message": "rate limited" },
            "data": { "Branch": { "total": 1, "items": [{ "Name": "A" }] } }
        });
        assert!(matches!(
            parse_branch_page(&body),
            Err(FetchError::Api(message)) if message == "rate limited"
        ));

        let body = serde_json::json!({ "errors": [{ "code": 429 }] });
        assert!(matches!(
            parse_branch_page(&body),
            Err(FetchError::Api(message)) if message == "Unknown API error"
        ));
    }

    #[test]
    fn test_empty_or_null_errors_are_ignored() {
        for errors in [serde_json::json!([]), serde_json::Value::Null] {
            let body = serde_json::json!({
                "errors": errors,
                "data": { "Branch": { "total": 1, "items": [{ "Name": "A" }] } }
            });
            assert_eq!(parse_branch_page(&body).unwrap().records.len(), 1);
        }
    }

    #[test]
    fn test_malformed_coordinates_degrade_to_absent() {
        let body = branch_page(
            2,
            serde_json::json!([
                { "Name": "Broken", "Coordinates": "somewhere" },
                { "Name": "Blank", "Coordinates": "", "City": "" }
            ]),
        );
        let page = parse_branch_page(&body).unwrap();
        assert_eq!(page.records.len(), 2);
        assert!(page.records.iter().all(|r| r.coordinates.is_none()));
        assert!(page.records[1].city.is_none());
    }

    #[test]
    fn test_items_without_name_are_skipped() {
        let body = branch_page(
            3,
            serde_json::json!([
                { "City": "Nowhere" },
                { "Name": 42 },
                { "Name": "Kept" }
            ]),
        );
        let page = parse_branch_page(&body).unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].name, "Kept");
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_fetch_page_sends_limit_and_skip() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .header("content-type", "application/json")
                .body_contains("\"limit\":30")
                .body_contains("\"skip\":60");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(branch_page(
                    61,
                    serde_json::json!([{ "Name": "Last One", "Coordinates": "1.5,2.5" }]),
                ));
        });

        let source = GraphQlBranchSource::new(server.url("/graphql"));
        let page = source.fetch_page(60, 30).await.unwrap();

        api_mock.assert();
        assert_eq!(page.total, 61);
        assert_eq!(page.records[0].name, "Last One");
    }

    #[tokio::test]
    async fn test_fetch_page_sends_bearer_token() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .header("authorization", "Bearer static-token");
            then.status(200).json_body(branch_page(0, serde_json::json!([])));
        });

        let source = GraphQlBranchSource::new(server.url("/graphql")).with_auth_token("static-token");
        let page = source.fetch_page(0, 30).await.unwrap();

        api_mock.assert();
        assert!(page.records.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_page_non_success_status() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(503);
        });

        let source = GraphQlBranchSource::new(server.url("/graphql"));
        let result = source.fetch_page(0, 30).await;

        api_mock.assert_hits(1);
        assert!(matches!(result, Err(FetchError::Status(503))));
    }

    #[tokio::test]
    async fn test_fetch_page_non_json_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).body("<html>maintenance</html>");
        });

        let source = GraphQlBranchSource::new(server.url("/graphql"));
        let result = source.fetch_page(0, 30).await;

        assert!(matches!(result, Err(FetchError::Decode(_))));
    }
}
