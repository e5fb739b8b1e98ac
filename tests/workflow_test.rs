//! Integration tests for the completion client and the three workflows.
//!
//! HTTP behavior is pinned with wiremock; session-level slot semantics use
//! scripted in-process backends behind the `CompletionBackend` trait.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use metabolens::config::{
    Config, LlmConfig, LogFormat, LoggingConfig, RequestConfig, SamplingConfig,
};
use metabolens::error::{AppError, ExtractionError, TransportError, TransportResult};
use metabolens::llm::{CompletionBackend, CompletionClient};
use metabolens::session::Session;
use metabolens::workflows::{Hypothesis, HypothesisFocus, HypothesisQuery};

const CSV: &str = "metabolite,log2FC,p_value,pathway\n\
                   Glucose,-1.5,0.001,Glycolysis\n\
                   Lactate,2.3,0.0001,Glycolysis\n";

fn test_config(base_url: &str) -> Config {
    Config {
        llm: LlmConfig {
            api_key: Some("test-api-key".to_string()),
            base_url: base_url.to_string(),
            model: "gpt-4o-mini".to_string(),
        },
        sampling: SamplingConfig::default(),
        request: RequestConfig { timeout_ms: 5000 },
        logging: LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        },
    }
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [{
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 200, "completion_tokens": 100, "total_tokens": 300}
    })
}

fn focus_query() -> Option<HypothesisQuery> {
    HypothesisQuery::from_parts(Some(HypothesisFocus::EnergyMetabolism), "")
}

/// Backend that replays a fixed queue of results.
struct ScriptedBackend {
    responses: Mutex<VecDeque<TransportResult<String>>>,
}

impl ScriptedBackend {
    fn new(responses: Vec<TransportResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _sampling: &SamplingConfig,
    ) -> TransportResult<String> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted backend exhausted")
    }
}

fn scripted_session(responses: Vec<TransportResult<String>>) -> Session {
    let backend: Arc<dyn CompletionBackend> = ScriptedBackend::new(responses);
    let mut session = Session::with_backend(test_config("http://unused"), Some(backend));
    session.load_dataset(CSV).unwrap();
    session
}

mod client_tests {
    use super::*;

    async fn mock_client(server: &MockServer) -> CompletionClient {
        let config = test_config(&server.uri());
        CompletionClient::new("test-api-key", &config.llm, &config.request).unwrap()
    }

    #[tokio::test]
    async fn successful_completion_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-api-key"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("[]")))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let text = client
            .complete("system", "user", &SamplingConfig::default())
            .await
            .unwrap();
        assert_eq!(text, "[]");
    }

    #[tokio::test]
    async fn provider_error_message_is_surfaced_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"error": {"message": "invalid api key"}})),
            )
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let err = client
            .complete("system", "user", &SamplingConfig::default())
            .await
            .unwrap_err();
        match err {
            TransportError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid api key");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_error_body_falls_back_to_status_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let err = client
            .complete("system", "user", &SamplingConfig::default())
            .await
            .unwrap_err();
        match err {
            TransportError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "request failed with status 503");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn response_without_choices_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let err = client
            .complete("system", "user", &SamplingConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidResponse { .. }));
    }
}

mod session_tests {
    use super::*;

    #[tokio::test]
    async fn hypotheses_from_truncated_response_keep_complete_prefix() {
        let truncated =
            r#"[{"rank":1,"title":"A"},{"rank":2,"title":"B"},{"rank":3,"title":"C"#;
        let mut session = scripted_session(vec![Ok(truncated.to_string())]);

        session.generate_hypotheses(focus_query()).await.unwrap();

        let hypotheses = session.hypotheses().unwrap();
        assert_eq!(hypotheses.len(), 2);
        assert_eq!(hypotheses[0].rank, 1);
        assert_eq!(hypotheses[0].title, "A");
        assert_eq!(hypotheses[1].rank, 2);
    }

    #[tokio::test]
    async fn missing_credential_is_a_configuration_error() {
        let mut config = test_config("http://unused");
        config.llm.api_key = None;
        let mut session = Session::with_backend(config, None);
        session.load_dataset(CSV).unwrap();

        let err = session
            .generate_hypotheses(focus_query())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config { .. }));
        assert!(session.hypotheses().is_none());
    }

    #[tokio::test]
    async fn no_query_is_a_no_op() {
        // No backend either: a no-op must not reach the credential check.
        let mut session = Session::with_backend(test_config("http://unused"), None);
        session.load_dataset(CSV).unwrap();

        session.generate_hypotheses(None).await.unwrap();
        assert!(session.hypotheses().is_none());
    }

    #[tokio::test]
    async fn empty_hypothesis_array_is_an_extraction_error() {
        let mut session = scripted_session(vec![Ok("[]".to_string())]);

        let err = session
            .generate_hypotheses(focus_query())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Extraction(ExtractionError::EmptyResult)
        ));
        assert!(session.hypotheses().is_none());
    }

    #[tokio::test]
    async fn unsalvageable_response_hints_at_token_budget() {
        let mut session =
            scripted_session(vec![Ok("I'm sorry, I cannot help with that.".to_string())]);

        let err = session
            .generate_hypotheses(focus_query())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Extraction(ExtractionError::Unrecoverable { .. })
        ));
        assert!(err.to_string().contains("max output tokens"));
    }

    #[tokio::test]
    async fn failed_call_keeps_previous_result() {
        let mut session = scripted_session(vec![
            Ok(r#"[{"rank":1,"title":"First"}]"#.to_string()),
            Err(TransportError::Api {
                status: 500,
                message: "server exploded".to_string(),
            }),
        ]);

        session.generate_hypotheses(focus_query()).await.unwrap();
        assert_eq!(session.hypotheses().unwrap().len(), 1);

        let err = session
            .generate_hypotheses(focus_query())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));

        // The slot still holds the last successful result.
        assert_eq!(session.hypotheses().unwrap()[0].title, "First");
    }

    #[tokio::test]
    async fn one_workflow_failure_leaves_other_slots_intact() {
        let mut session = scripted_session(vec![
            Ok(r#"{"overview":"solid field","gaps":["kinetics"]}"#.to_string()),
            Ok("no structure at all".to_string()),
        ]);

        session.analyze_literature().await.unwrap();
        assert!(session.literature().is_some());

        let err = session
            .generate_hypotheses(focus_query())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));

        assert_eq!(session.literature().unwrap()["overview"], "solid field");
        assert!(session.hypotheses().is_none());
    }

    #[tokio::test]
    async fn design_and_literature_store_opaque_objects() {
        let protocol = json!({
            "title": "LC-MS validation",
            "phases": [{"name": "prep", "duration": "1 week"}]
        });
        let literature = json!({"overview": "well studied"});
        let mut session = scripted_session(vec![
            Ok(protocol.to_string()),
            Ok(literature.to_string()),
        ]);

        let hypothesis = Hypothesis {
            rank: 1,
            title: "Warburg shift".to_string(),
            statement: "Glycolytic flux is upregulated".to_string(),
            ..Hypothesis::default()
        };
        session.design_experiment(&hypothesis).await.unwrap();
        assert_eq!(session.protocol().unwrap()["title"], "LC-MS validation");

        session.analyze_literature().await.unwrap();
        assert_eq!(session.literature().unwrap()["overview"], "well studied");
    }

    #[tokio::test]
    async fn end_to_end_against_mock_http_backend() {
        let server = MockServer::start().await;
        let truncated = r#"[{"rank":1,"title":"Redox imbalance","bayesian":{"prior":0.3,"posterior":0.6}},{"rank":2,"title":"Glycolytic shift"#;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(truncated)))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client =
            CompletionClient::new("test-api-key", &config.llm, &config.request).unwrap();
        let backend: Arc<dyn CompletionBackend> = Arc::new(client);
        let mut session = Session::with_backend(config, Some(backend));
        session.load_dataset(CSV).unwrap();

        session.generate_hypotheses(focus_query()).await.unwrap();

        let hypotheses = session.hypotheses().unwrap();
        assert_eq!(hypotheses.len(), 1);
        assert_eq!(hypotheses[0].title, "Redox imbalance");
        assert_eq!(hypotheses[0].bayesian.prior, 0.3);
        assert_eq!(hypotheses[0].bayesian.posterior, 0.6);
    }
}
