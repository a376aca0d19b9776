use serde::Deserialize;
use tracing::debug;

use super::client::{body_excerpt, BookClient};
use crate::error::SearchError;
use crate::models::{FetchResult, ResultRow, SearchState};

/// Envelope returned by the catalog search endpoint. Only the fields the table
/// displays are modelled; everything else in a document is ignored.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "numFound", alias = "num_found", default)]
    num_found: u64,
    #[serde(default)]
    docs: Vec<BookDoc>,
}

#[derive(Debug, Deserialize)]
struct BookDoc {
    #[serde(default)]
    key: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author_name: Vec<String>,
    first_publish_year: Option<i32>,
    #[serde(default)]
    isbn: Vec<String>,
    number_of_pages_median: Option<u32>,
}

impl From<BookDoc> for ResultRow {
    fn from(doc: BookDoc) -> Self {
        ResultRow {
            id: doc.key,
            title: doc.title,
            authors: doc.author_name,
            first_publish_year: doc.first_publish_year,
            isbns: doc.isbn,
            page_count_median: doc.number_of_pages_median,
        }
    }
}

impl BookClient {
    /// Run one search for the given state and map the page of documents into
    /// table rows.
    pub async fn search(&self, state: &SearchState) -> Result<FetchResult, SearchError> {
        let offset = state.offset().to_string();
        let limit = state.page_size.to_string();

        let resp = self
            .http
            .get(self.endpoint.clone())
            .query(&[
                ("q", state.query.as_str()),
                ("offset", offset.as_str()),
                ("limit", limit.as_str()),
                ("sort", state.sort_param()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            return Err(SearchError::Api {
                status,
                message: body_excerpt(&bytes),
            });
        }

        let parsed: SearchResponse = serde_json::from_slice(&bytes)?;
        debug!(
            query = %state.query,
            found = parsed.num_found,
            docs = parsed.docs.len(),
            "search response parsed"
        );
        Ok(into_fetch_result(parsed, state.page_size))
    }
}

/// Keep at most one page of rows and never report fewer hits than rows shown.
fn into_fetch_result(resp: SearchResponse, page_size: u32) -> FetchResult {
    let rows: Vec<ResultRow> = resp
        .docs
        .into_iter()
        .take(page_size as usize)
        .map(ResultRow::from)
        .collect();
    let total_count = resp.num_found.max(rows.len() as u64);
    FetchResult { total_count, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SortField;
    use reqwest::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BookClient {
        let endpoint = Url::parse(&format!("{}/search.json", server.uri())).expect("url");
        BookClient::new(endpoint).expect("client")
    }

    fn docs(count: usize) -> Vec<serde_json::Value> {
        (0..count)
            .map(|i| {
                serde_json::json!({
                    "key": format!("/works/OL{i}W"),
                    "title": format!("Dune {i}"),
                    "author_name": ["Frank Herbert"],
                    "first_publish_year": 1965,
                    "isbn": ["9780441013593", "0441013597"],
                    "number_of_pages_median": 604,
                    "edition_count": 12,
                    "has_fulltext": true
                })
            })
            .collect()
    }

    #[tokio::test]
    async fn search_sends_query_pagination_and_empty_sort() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("q", "dune"))
            .and(query_param("offset", "0"))
            .and(query_param("limit", "10"))
            .and(query_param("sort", ""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "numFound": 42,
                "docs": docs(10)
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .search(&SearchState::new("dune", 10))
            .await
            .expect("search");

        assert_eq!(result.total_count, 42);
        assert_eq!(result.rows.len(), 10);
        let first = &result.rows[0];
        assert_eq!(first.id, "/works/OL0W");
        assert_eq!(first.authors, vec!["Frank Herbert".to_string()]);
        assert_eq!(first.first_publish_year, Some(1965));
        assert_eq!(first.page_count_median, Some(604));
    }

    #[tokio::test]
    async fn search_sends_sort_field_and_page_index() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("offset", "2"))
            .and(query_param("limit", "20"))
            .and(query_param("sort", "first_publish_year"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "numFound": 0,
                "docs": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut state = SearchState::new("dune", 20);
        state.page = 3;
        state.sort = Some(SortField::FirstPublishYear);

        let result = client_for(&server).search(&state).await.expect("search");
        assert_eq!(result, FetchResult::default());
    }

    #[tokio::test]
    async fn search_tolerates_sparse_documents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "num_found": 1,
                "docs": [{"key": "/works/OL9W", "title": "Untitled draft"}]
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .search(&SearchState::new("draft", 10))
            .await
            .expect("search");

        assert_eq!(result.total_count, 1);
        let row = &result.rows[0];
        assert!(row.authors.is_empty());
        assert!(row.isbns.is_empty());
        assert_eq!(row.first_publish_year, None);
        assert_eq!(row.page_count_median, None);
    }

    #[tokio::test]
    async fn search_reports_http_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance window"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .search(&SearchState::new("dune", 10))
            .await
            .expect_err("503 should fail");

        match err {
            SearchError::Api { status, message } => {
                assert_eq!(status.as_u16(), 503);
                assert!(message.contains("maintenance window"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn search_reports_malformed_payloads() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .search(&SearchState::new("dune", 10))
            .await
            .expect_err("html should fail");
        assert!(matches!(err, SearchError::Json(_)));
    }

    #[test]
    fn oversized_pages_are_truncated_to_page_size() {
        let resp: SearchResponse = serde_json::from_value(serde_json::json!({
            "numFound": 3,
            "docs": docs(3)
        }))
        .expect("parse");

        let result = into_fetch_result(resp, 2);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.total_count, 3);
    }

    #[test]
    fn total_count_never_trails_row_count() {
        let resp: SearchResponse = serde_json::from_value(serde_json::json!({
            "docs": docs(4)
        }))
        .expect("parse");

        let result = into_fetch_result(resp, 10);
        assert_eq!(result.total_count, 4);
    }
}
