use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::{error, info};
use url::Url;

use crate::error::FeedError;
use crate::output::render_cctray;
use crate::providers::ConcourseProvider;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<ConcourseProvider>,
    /// Base for `webUrl` links in both feeds
    pub web_url: Arc<Url>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/cc.xml", get(cc_xml))
        .route("/job-stats", get(job_stats))
        .route(
            "/pipelines/:pipeline/jobs/:job/resources",
            get(job_resources),
        )
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Listening on {addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index() -> &'static str {
    "concourse-feed: GET /cc.xml for CCTray, GET /job-stats for JSON\n"
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn cc_xml(State(state): State<AppState>) -> Response {
    let projects = match state.provider.build_feed(&state.web_url).await {
        Ok(projects) => projects,
        Err(e) => return upstream_failure(&e),
    };

    match render_cctray(&projects) {
        Ok(xml) => {
            ([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml).into_response()
        }
        Err(e) => {
            error!("Failed to render CCTray feed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn job_stats(State(state): State<AppState>) -> Response {
    match state.provider.build_stats(&state.web_url).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => upstream_failure(&e),
    }
}

async fn job_resources(
    State(state): State<AppState>,
    Path((pipeline, job)): Path<(String, String)>,
) -> Response {
    match state.provider.job_resources(&pipeline, &job).await {
        Ok(resources) => Json(resources).into_response(),
        Err(e) => upstream_failure(&e),
    }
}

fn upstream_failure(err: &FeedError) -> Response {
    error!("Feed request failed: {err}");
    (StatusCode::BAD_GATEWAY, format!("upstream error: {err}\n")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use mockito::ServerGuard;
    use serde_json::json;

    fn build_jobs_for(pipeline: &str, jobs: &[&str]) -> String {
        let jobs: Vec<_> = jobs
            .iter()
            .map(|job| {
                json!({
                    "id": 1,
                    "name": job,
                    "pipeline_name": pipeline,
                    "next_build": null,
                    "finished_build": {
                        "id": 2,
                        "name": "1",
                        "status": "succeeded",
                        "job_name": job,
                        "pipeline_name": pipeline,
                        "end_time": 1_502_470_729
                    }
                })
            })
            .collect();
        serde_json::to_string(&jobs).unwrap()
    }

    async fn mock_concourse(server: &mut ServerGuard) -> Vec<mockito::Mock> {
        let mut mocks = vec![
            server
                .mock("GET", "/api/v1/teams/main/auth/token")
                .with_status(200)
                .with_body(r#"{"type": "Bearer", "value": "some-token"}"#)
                .create_async()
                .await,
            server
                .mock("GET", "/api/v1/teams/main/pipelines")
                .with_status(200)
                .with_body(r#"[{"name": "pipeline1"}, {"name": "pipeline2"}]"#)
                .create_async()
                .await,
        ];
        for pipeline in ["pipeline1", "pipeline2"] {
            mocks.push(
                server
                    .mock(
                        "GET",
                        format!("/api/v1/teams/main/pipelines/{pipeline}/jobs").as_str(),
                    )
                    .match_header("authorization", "Bearer some-token")
                    .with_status(200)
                    .with_body(build_jobs_for(pipeline, &["job1", "job2"]))
                    .create_async()
                    .await,
            );
        }
        mocks
    }

    // Starts the app on an ephemeral port and returns its base URL.
    async fn spawn_app(upstream: &ServerGuard) -> String {
        let api_url = Url::parse(&upstream.url()).unwrap();
        let provider =
            ConcourseProvider::new(&api_url, Credentials::new("ci", Some("secret".to_string())))
                .unwrap();
        let state = AppState {
            provider: Arc::new(provider),
            web_url: Arc::new(Url::parse("https://ci.example.com").unwrap()),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_index_and_health_respond_ok() {
        let upstream = mockito::Server::new_async().await;
        let app = spawn_app(&upstream).await;

        let index = reqwest::get(format!("{app}/")).await.unwrap();
        assert_eq!(index.status(), 200);

        let health = reqwest::get(format!("{app}/health")).await.unwrap();
        assert_eq!(health.status(), 200);
        let body: serde_json::Value = health.json().await.unwrap();
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_cc_xml_renders_all_jobs() {
        let mut upstream = mockito::Server::new_async().await;
        let _mocks = mock_concourse(&mut upstream).await;
        let app = spawn_app(&upstream).await;

        let response = reqwest::get(format!("{app}/cc.xml")).await.unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()[reqwest::header::CONTENT_TYPE],
            "application/xml; charset=utf-8"
        );
        let body = response.text().await.unwrap();
        let names: Vec<_> = body
            .match_indices("name=\"")
            .map(|(i, _)| body[i + 6..].split('"').next().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["pipeline1#job1", "pipeline1#job2", "pipeline2#job1", "pipeline2#job2"]
        );
    }

    #[tokio::test]
    async fn test_job_stats_returns_json_array() {
        let mut upstream = mockito::Server::new_async().await;
        let _mocks = mock_concourse(&mut upstream).await;
        let app = spawn_app(&upstream).await;

        let response = reqwest::get(format!("{app}/job-stats")).await.unwrap();

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body.as_array().unwrap().len(), 4);
        assert_eq!(
            body[0],
            json!({
                "id": "pipeline1-job1-id",
                "name": "pipeline1#job1",
                "activity": "Sleeping",
                "lastBuildStatus": "Success",
                "lastBuildLabel": "pipeline1",
                "lastBuildTime": "2017-08-11T16:58:49.000Z",
                "webUrl": "https://ci.example.com/teams/main/pipelines/pipeline1/jobs/job1/builds/2"
            })
        );
    }

    #[tokio::test]
    async fn test_upstream_auth_failure_is_bad_gateway() {
        let mut upstream = mockito::Server::new_async().await;
        let _token = upstream
            .mock("GET", "/api/v1/teams/main/auth/token")
            .with_status(401)
            .create_async()
            .await;
        let app = spawn_app(&upstream).await;

        let response = reqwest::get(format!("{app}/cc.xml")).await.unwrap();

        assert_eq!(response.status(), 502);
    }
}
