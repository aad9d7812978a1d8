use serde_json::Value;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Read-through client for the TMDB catalog. Bodies come back as raw JSON;
/// nothing here touches the store.
pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        if api_key.trim().is_empty() {
            tracing::warn!("no TMDB_API_KEY provided, upstream calls will likely be rejected");
        }

        Self { client, api_key, base_url }
    }

    /// The `results` array of `/movie/popular`, unmodified.
    pub async fn fetch_popular(&self) -> AppResult<Value> {
        let url = format!("{}/movie/popular", self.base_url.trim_end_matches('/'));
        let mut body = self
            .get_json(&url, &[("api_key", self.api_key.as_str())], "Error fetching popular movies")
            .await?;

        match body.get_mut("results") {
            Some(results) => Ok(results.take()),
            None => Err(AppError::Upstream {
                status: 502,
                message: "Popular movies response is missing results".to_string(),
            }),
        }
    }

    /// The whole `/search/movie` body, unmodified. Unlike [`fetch_popular`]
    /// this is not narrowed to `results`.
    ///
    /// [`fetch_popular`]: TmdbClient::fetch_popular
    pub async fn search_movies(&self, query: &str) -> AppResult<Value> {
        let url = format!("{}/search/movie", self.base_url.trim_end_matches('/'));
        self.get_json(
            &url,
            &[("api_key", self.api_key.as_str()), ("query", query)],
            "Error searching movies",
        )
        .await
    }

    async fn get_json(
        &self,
        url: &str,
        params: &[(&str, &str)],
        failure: &str,
    ) -> AppResult<Value> {
        let resp = self.client.get(url).query(params).send().await?;
        let status = resp.status();
        debug!(url = %url, status = status.as_u16(), "upstream response");

        if !status.is_success() {
            let status = status.as_u16();
            return Err(AppError::Upstream { status, message: failure.to_string() });
        }

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    use super::*;

    fn client(server: &MockServer) -> TmdbClient {
        TmdbClient::new(reqwest::Client::new(), "test-key".to_string(), server.uri())
    }

    #[tokio::test]
    async fn popular_returns_results_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/popular"))
            .and(query_param("api_key", "test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "page": 1, "results": [{ "movie_id": "1" }] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let results = client(&server).fetch_popular().await.unwrap();
        assert_eq!(results, json!([{ "movie_id": "1" }]));
    }

    #[tokio::test]
    async fn popular_server_error_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/popular"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).fetch_popular().await.unwrap_err();
        match err {
            AppError::Upstream { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Error fetching popular movies");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn popular_without_results_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/popular"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "page": 1 })))
            .mount(&server)
            .await;

        let err = client(&server).fetch_popular().await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { status: 502, .. }));
    }

    #[tokio::test]
    async fn search_returns_full_body() {
        let body = json!({
            "page": 1,
            "results": [{ "id": 438631, "title": "Dune" }],
            "total_pages": 1,
            "total_results": 1,
        });

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("query", "dune part two"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let found = client(&server).search_movies("dune part two").await.unwrap();
        assert_eq!(found, body);
    }

    #[tokio::test]
    async fn search_is_single_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).search_movies("dune").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { status: 503, .. }));
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/popular"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .mount(&server)
            .await;

        let tmdb = TmdbClient::new(
            reqwest::Client::new(),
            "test-key".to_string(),
            format!("{}/", server.uri()),
        );
        assert_eq!(tmdb.fetch_popular().await.unwrap(), json!([]));
    }
}
