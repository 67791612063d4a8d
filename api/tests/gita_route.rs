//! HTTP contract of `POST /api/gita` over an in-memory pipeline.

use std::sync::Arc;
use std::time::Duration;

use ai_llm_service::{
    GenerateOptions, LlmServiceProfiles,
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
};
use api::{AppState, router};
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;
use verse_pipeline::{
    BackendError, BoxFuture, GitaPipeline, PassageIndex, PipelineConfig, TextGenerator,
};
use verse_store::{
    LlmEmbedder, PassageHit, PassageMetadata, Speaker, VerseStore, VerseStoreConfig,
};

struct EchoGenerator;

impl TextGenerator for EchoGenerator {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        _opts: GenerateOptions,
    ) -> BoxFuture<'a, Result<String, BackendError>> {
        let reply = if prompt.contains("Original question:") {
            "what is karma yoga\nhow should one act".to_string()
        } else {
            "Act without attachment to the fruits of action.".to_string()
        };
        Box::pin(async move { Ok(reply) })
    }
}

struct OneVerseIndex {
    down: bool,
}

impl PassageIndex for OneVerseIndex {
    fn search<'a>(
        &'a self,
        _query: &'a str,
        _k: u64,
    ) -> BoxFuture<'a, Result<Vec<PassageHit>, BackendError>> {
        Box::pin(async move {
            if self.down {
                return Err(BackendError::Other("qdrant unreachable".into()));
            }
            Ok(vec![PassageHit {
                text: "You have a right to perform your prescribed duties".into(),
                metadata: PassageMetadata {
                    verse_id: "2.47".into(),
                    variant_index: 1,
                    speaker: Speaker::Krishna,
                    sanskrit_text: "कर्मण्येवाधिकारस्ते".into(),
                },
                score: 0.9,
            }])
        })
    }
}

fn ollama(model: &str) -> LlmModelConfig {
    LlmModelConfig {
        provider: LlmProvider::Ollama,
        model: model.into(),
        endpoint: "http://127.0.0.1:11434".into(),
        api_key: None,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(5),
    }
}

fn app(index_down: bool) -> axum::Router {
    let llm = Arc::new(
        LlmServiceProfiles::new(ollama("llama3"), ollama("nomic-embed-text"), Some(1))
            .unwrap(),
    );
    let store = Arc::new(
        VerseStore::new(
            VerseStoreConfig::new_default("http://127.0.0.1:6334", "gita_test"),
            Arc::new(LlmEmbedder::new(llm.clone(), None)),
        )
        .unwrap(),
    );
    let pipeline = Arc::new(GitaPipeline::new(
        Arc::new(EchoGenerator),
        Arc::new(OneVerseIndex { down: index_down }),
        PipelineConfig::default(),
    ));
    router(
        Arc::new(AppState::new(pipeline, llm, store)),
        Duration::from_secs(5),
    )
}

fn post(body: &str) -> Request<Body> {
    Request::post("/api/gita")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn call(app: axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn answers_with_explained_verses() {
    let (status, body) = call(app(false), post(r#"{"question":"What is my duty?"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let verses = body["data"]["verses"].as_array().unwrap();
    assert_eq!(verses.len(), 1);
    assert_eq!(verses[0]["verse_id"], "2.47");
    assert_eq!(verses[0]["sanskrit_text"], "कर्मण्येवाधिकारस्ते");
    assert_eq!(
        verses[0]["translation"],
        "You have a right to perform your prescribed duties"
    );
    assert_eq!(
        verses[0]["explanation"],
        "Act without attachment to the fruits of action."
    );
}

#[tokio::test]
async fn blank_question_is_rejected() {
    let (status, body) = call(app(false), post(r#"{"question":"   "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn malformed_json_gets_an_envelope() {
    let (status, body) = call(app(false), post("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = call(app(false), post(r#"{"q":"x"}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    assert_eq!(body["error"]["details"][0]["path"], "question");
}

#[tokio::test]
async fn index_outage_is_service_unavailable() {
    let (status, body) = call(app(true), post(r#"{"question":"Who am I?"}"#)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INDEX_UNAVAILABLE");
}
