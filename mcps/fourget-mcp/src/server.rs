//! MCP Server implementation for 4get search
//!
//! Three read-only tools map one-to-one onto [`FourGetClient`] calls and
//! return the upstream JSON envelope as-is.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::client::{FourGetClient, SearchOptions};
use crate::config::Config;
use crate::engine::SearchEngine;
use crate::error::{FourGetError, FourGetResult};
use crate::params::SCRAPER_PARAM;

/// The main 4get MCP Server
#[derive(Clone)]
pub struct FourGetMcpServer {
    client: FourGetClient,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Parameter Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WebSearchParams {
    #[schemars(description = "The search query string. Ignored when page_token is set.")]
    pub query: String,
    #[schemars(description = "Pagination token from a previous response's 'npt' field")]
    pub page_token: Option<String>,
    #[schemars(description = "Enable extended search for more comprehensive results")]
    #[serde(default)]
    pub extended_search: bool,
    #[schemars(description = "Optional search engine override (maps to the 4get 'scraper' parameter)")]
    pub engine: Option<SearchEngine>,
    #[schemars(description = "Additional 4get query parameters, e.g. {\"lang\": \"en\"}")]
    pub extra_params: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ImageSearchParams {
    #[schemars(description = "The image search query string. Ignored when page_token is set.")]
    pub query: String,
    #[schemars(description = "Pagination token from a previous response's 'npt' field")]
    pub page_token: Option<String>,
    #[schemars(description = "Optional search engine override (maps to the 4get 'scraper' parameter)")]
    pub engine: Option<SearchEngine>,
    #[schemars(description = "Additional 4get query parameters such as size or color filters")]
    pub extra_params: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct NewsSearchParams {
    #[schemars(description = "The news search query string. Ignored when page_token is set.")]
    pub query: String,
    #[schemars(description = "Pagination token from a previous response's 'npt' field")]
    pub page_token: Option<String>,
    #[schemars(description = "Optional search engine override (maps to the 4get 'scraper' parameter)")]
    pub engine: Option<SearchEngine>,
    #[schemars(description = "Additional 4get query parameters such as date range")]
    pub extra_params: Option<Map<String, Value>>,
}

/// Merge the engine selector into the extra parameters, overriding any `scraper` key
fn combine_params(
    engine: Option<SearchEngine>,
    extra: Option<Map<String, Value>>,
) -> Map<String, Value> {
    let mut params = extra.unwrap_or_default();
    if let Some(engine) = engine {
        params.insert(SCRAPER_PARAM.to_string(), Value::from(engine.as_str()));
    }
    params
}

fn envelope_success(payload: &Value) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(payload)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn tool_error(err: FourGetError) -> McpError {
    McpError::internal_error(err.to_string(), Some(json!({ "kind": err.kind().as_str() })))
}

// ============================================================================
// Tool Router Implementation
// ============================================================================

#[tool_router]
impl FourGetMcpServer {
    /// Build a server with its own client and cache
    pub fn new(config: Config) -> FourGetResult<Self> {
        Ok(Self::with_client(FourGetClient::new(config)?))
    }

    pub fn with_client(client: FourGetClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    pub fn client(&self) -> &FourGetClient {
        &self.client
    }

    #[tool(
        description = "Search the web using the 4get meta search engine. Returns web results \
                       with titles, URLs, descriptions, and optional featured answers. \
                       Supports pagination via the 'npt' token and extended search mode.",
        annotations(read_only_hint = true, idempotent_hint = true)
    )]
    async fn fourget_web_search(
        &self,
        Parameters(params): Parameters<WebSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Web search: {} (page token: {})",
            params.query,
            params.page_token.is_some()
        );

        let options = SearchOptions {
            page_token: params.page_token,
            extended_search: Some(params.extended_search),
            params: combine_params(params.engine, params.extra_params),
        };
        let payload = self
            .client
            .web_search(&params.query, options)
            .await
            .map_err(tool_error)?;

        envelope_success(&payload)
    }

    #[tool(
        description = "Search for images using the 4get meta search engine. Returns image \
                       results with URLs, thumbnails, and metadata. Supports pagination \
                       via the 'npt' token and various image filters.",
        annotations(read_only_hint = true, idempotent_hint = true)
    )]
    async fn fourget_image_search(
        &self,
        Parameters(params): Parameters<ImageSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Image search: {} (page token: {})",
            params.query,
            params.page_token.is_some()
        );

        let options = SearchOptions {
            page_token: params.page_token,
            extended_search: None,
            params: combine_params(params.engine, params.extra_params),
        };
        let payload = self
            .client
            .image_search(&params.query, options)
            .await
            .map_err(tool_error)?;

        envelope_success(&payload)
    }

    #[tool(
        description = "Search for news articles using the 4get meta search engine. Returns \
                       recent news with titles, URLs, descriptions, publication dates, and \
                       thumbnails. Supports pagination via the 'npt' token.",
        annotations(read_only_hint = true, idempotent_hint = true)
    )]
    async fn fourget_news_search(
        &self,
        Parameters(params): Parameters<NewsSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "News search: {} (page token: {})",
            params.query,
            params.page_token.is_some()
        );

        let options = SearchOptions {
            page_token: params.page_token,
            extended_search: None,
            params: combine_params(params.engine, params.extra_params),
        };
        let payload = self
            .client
            .news_search(&params.query, options)
            .await
            .map_err(tool_error)?;

        envelope_success(&payload)
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for FourGetMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "4get MCP Server - searches the web, images, and news through a 4get \
                 meta-search instance. Results are the raw 4get JSON responses; pass a \
                 response's 'npt' value as page_token to fetch the next page."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::ServerHandler;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_server(base_url: String) -> FourGetMcpServer {
        FourGetMcpServer::new(Config {
            base_url,
            user_agent: "test-agent".to_string(),
            timeout_secs: 5.0,
            retry_base_delay_secs: 0.1,
            retry_max_delay_secs: 1.0,
            ..Config::default()
        })
        .unwrap()
    }

    fn result_json(result: &CallToolResult) -> Value {
        let text = &result.content[0].as_text().unwrap().text;
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_combine_params_engine_overrides_scraper() {
        let extra = json!({"scraper": "google", "lang": "en"});
        let params = combine_params(
            Some(SearchEngine::Brave),
            extra.as_object().cloned(),
        );
        assert_eq!(params.get("scraper"), Some(&json!("brave")));
        assert_eq!(params.get("lang"), Some(&json!("en")));

        assert!(combine_params(None, None).is_empty());
    }

    #[test]
    fn test_tools_registered_read_only() {
        let server = test_server("https://example.test".to_string());
        let tools = server.tool_router.list_all();
        assert_eq!(tools.len(), 3);

        let mut names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "fourget_image_search",
                "fourget_news_search",
                "fourget_web_search"
            ]
        );

        for tool in &tools {
            let annotations = tool.annotations.as_ref().unwrap();
            assert_eq!(annotations.read_only_hint, Some(true));
            assert_eq!(annotations.idempotent_hint, Some(true));
        }
    }

    #[test]
    fn test_server_info_enables_tools() {
        let server = test_server("https://example.test".to_string());
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains("npt"));
    }

    #[tokio::test]
    async fn test_web_search_tool_returns_payload() {
        let mock = MockServer::start().await;
        let body = json!({"status": "ok", "web": [{"title": "Result", "url": "https://example.com"}]});
        Mock::given(method("GET"))
            .and(path("/api/v1/web"))
            .and(query_param("s", "fastmcp"))
            .and(query_param("extendedsearch", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&mock)
            .await;

        let server = test_server(mock.uri());
        let params = WebSearchParams {
            query: "fastmcp".to_string(),
            page_token: None,
            extended_search: false,
            engine: None,
            extra_params: None,
        };
        let result = server.fourget_web_search(Parameters(params)).await.unwrap();

        assert_eq!(result_json(&result), body);
    }

    #[tokio::test]
    async fn test_web_search_tool_respects_cache() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/web"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&mock)
            .await;

        let server = test_server(mock.uri());
        for _ in 0..2 {
            let params = WebSearchParams {
                query: "cached".to_string(),
                page_token: None,
                extended_search: false,
                engine: None,
                extra_params: None,
            };
            server.fourget_web_search(Parameters(params)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_image_search_tool_targets_images_endpoint() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/images"))
            .and(query_param("s", "python logo"))
            .and(query_param("scraper", "ddg"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "image": []})),
            )
            .expect(1)
            .mount(&mock)
            .await;

        let server = test_server(mock.uri());
        let params = ImageSearchParams {
            query: "python logo".to_string(),
            page_token: None,
            engine: Some(SearchEngine::DuckDuckGo),
            extra_params: None,
        };
        let result = server
            .fourget_image_search(Parameters(params))
            .await
            .unwrap();

        assert_eq!(result_json(&result)["image"], json!([]));
    }

    #[tokio::test]
    async fn test_news_search_tool_targets_news_endpoint() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/news"))
            .and(query_param("npt", "page2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "news": []})),
            )
            .expect(1)
            .mount(&mock)
            .await;

        let server = test_server(mock.uri());
        let params = NewsSearchParams {
            query: "ignored".to_string(),
            page_token: Some("page2".to_string()),
            engine: None,
            extra_params: None,
        };
        server.fourget_news_search(Parameters(params)).await.unwrap();

        let requests = mock.received_requests().await.unwrap();
        assert!(!requests[0].url.query_pairs().any(|(k, _)| k == "s"));
    }

    #[tokio::test]
    async fn test_tool_error_carries_kind() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/web"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "error", "message": "bad query"})),
            )
            .mount(&mock)
            .await;

        let server = test_server(mock.uri());
        let params = WebSearchParams {
            query: "x".to_string(),
            page_token: None,
            extended_search: true,
            engine: None,
            extra_params: None,
        };
        let err = server
            .fourget_web_search(Parameters(params))
            .await
            .unwrap_err();

        assert!(err.message.contains("bad query"));
        assert_eq!(err.data, Some(json!({"kind": "api"})));
    }
}
