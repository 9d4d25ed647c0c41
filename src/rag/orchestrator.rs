//! Retrieve → render → complete, one linear pipeline per question.

use std::sync::Arc;
use std::time::Instant;

use super::error::{GenerationError, RetrievalError, TurnError};
use super::prompt::PromptTemplate;
use super::retriever::PassageRetriever;
use super::store::ScoredPassage;
use crate::llm::CompletionProvider;

/// Separator between passages in the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// A user question known to contain non-whitespace text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    /// `None` for empty or whitespace-only input. The text is kept as typed.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub temperature: f32,
    /// Answer with an empty context block instead of failing when the
    /// store returns nothing.
    pub allow_empty_context: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            allow_empty_context: false,
        }
    }
}

pub struct RagOrchestrator {
    retriever: Arc<dyn PassageRetriever>,
    completion: Arc<dyn CompletionProvider>,
    template: PromptTemplate,
    settings: OrchestratorSettings,
}

impl RagOrchestrator {
    pub fn new(
        retriever: Arc<dyn PassageRetriever>,
        completion: Arc<dyn CompletionProvider>,
        template: PromptTemplate,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            retriever,
            completion,
            template,
            settings,
        }
    }

    pub fn completion_model(&self) -> &str {
        self.completion.model()
    }

    /// Answers `question` from retrieved context. Has no side effects
    /// beyond the provider calls.
    pub async fn answer(&self, question: &Question) -> Result<String, TurnError> {
        let started = Instant::now();

        let passages = self.retriever.retrieve(question.as_str()).await?;
        if passages.is_empty() {
            if !self.settings.allow_empty_context {
                return Err(RetrievalError::NoResults.into());
            }
            tracing::warn!("No passages retrieved; answering with empty context");
        }

        let context = join_context(&passages);
        let prompt = self.template.render(&context, question.as_str());

        let reply = self
            .completion
            .complete(&prompt, self.settings.temperature)
            .await
            .map_err(GenerationError::from)?;

        tracing::info!(
            passages = passages.len(),
            prompt_chars = prompt.chars().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Answered question with {}",
            self.completion.model()
        );
        Ok(reply)
    }
}

/// Order-preserving concatenation of passage texts.
pub fn join_context(passages: &[ScoredPassage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ProviderError;
    use crate::rag::store::StoreError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubRetriever {
        passages: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl StubRetriever {
        fn new(passages: Vec<&'static str>) -> Self {
            Self {
                passages,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PassageRetriever for StubRetriever {
        async fn retrieve(&self, query: &str) -> Result<Vec<ScoredPassage>, RetrievalError> {
            self.calls.lock().unwrap().push(query.to_string());
            Ok(self
                .passages
                .iter()
                .map(|text| ScoredPassage {
                    text: text.to_string(),
                    score: 1.0,
                    source: None,
                })
                .collect())
        }
    }

    struct DownRetriever;

    #[async_trait]
    impl PassageRetriever for DownRetriever {
        async fn retrieve(&self, _query: &str) -> Result<Vec<ScoredPassage>, RetrievalError> {
            Err(StoreError::Unavailable("connection refused".to_string()).into())
        }
    }

    #[derive(Default)]
    struct EchoCompletion {
        temperatures: Mutex<Vec<f32>>,
    }

    #[async_trait]
    impl CompletionProvider for EchoCompletion {
        fn model(&self) -> &str {
            "echo"
        }

        async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ProviderError> {
            self.temperatures.lock().unwrap().push(temperature);
            Ok(prompt.to_string())
        }
    }

    struct TimeoutCompletion;

    #[async_trait]
    impl CompletionProvider for TimeoutCompletion {
        fn model(&self) -> &str {
            "slow"
        }

        async fn complete(&self, _prompt: &str, _temperature: f32) -> Result<String, ProviderError> {
            Err(ProviderError::Timeout)
        }
    }

    fn question(text: &str) -> Question {
        Question::parse(text).unwrap()
    }

    #[test]
    fn question_rejects_blank_input() {
        assert!(Question::parse("").is_none());
        assert!(Question::parse("  \n\t").is_none());
        assert_eq!(Question::parse(" hi ").unwrap().as_str(), " hi ");
    }

    #[tokio::test]
    async fn answer_contains_question_and_retrieved_passage() {
        let completion = Arc::new(EchoCompletion::default());
        let orchestrator = RagOrchestrator::new(
            Arc::new(StubRetriever::new(vec!["passage about gardens"])),
            completion.clone(),
            PromptTemplate::lavender(),
            OrchestratorSettings::default(),
        );

        let reply = orchestrator
            .answer(&question("What grows here?"))
            .await
            .unwrap();

        assert!(reply.contains("What grows here?"));
        assert!(reply.contains("passage about gardens"));
        assert_eq!(*completion.temperatures.lock().unwrap(), vec![0.7]);
    }

    #[tokio::test]
    async fn passages_are_joined_in_retrieval_order() {
        let orchestrator = RagOrchestrator::new(
            Arc::new(StubRetriever::new(vec!["first", "second", "third"])),
            Arc::new(EchoCompletion::default()),
            PromptTemplate::lavender(),
            OrchestratorSettings::default(),
        );

        let reply = orchestrator.answer(&question("order?")).await.unwrap();
        assert!(reply.contains("first\n\nsecond\n\nthird"));
    }

    #[tokio::test]
    async fn empty_context_fails_unless_allowed() {
        let strict = RagOrchestrator::new(
            Arc::new(StubRetriever::new(vec![])),
            Arc::new(EchoCompletion::default()),
            PromptTemplate::lavender(),
            OrchestratorSettings::default(),
        );
        let err = strict.answer(&question("anything?")).await.unwrap_err();
        assert!(matches!(err, TurnError::Retrieval(RetrievalError::NoResults)));

        let lenient = RagOrchestrator::new(
            Arc::new(StubRetriever::new(vec![])),
            Arc::new(EchoCompletion::default()),
            PromptTemplate::lavender(),
            OrchestratorSettings {
                allow_empty_context: true,
                ..OrchestratorSettings::default()
            },
        );
        let reply = lenient.answer(&question("anything?")).await.unwrap();
        assert!(reply.contains("anything?"));
    }

    #[tokio::test]
    async fn retrieval_failure_skips_generation() {
        let completion = Arc::new(EchoCompletion::default());
        let orchestrator = RagOrchestrator::new(
            Arc::new(DownRetriever),
            completion.clone(),
            PromptTemplate::lavender(),
            OrchestratorSettings::default(),
        );

        let err = orchestrator.answer(&question("hello?")).await.unwrap_err();
        assert_eq!(err.kind(), "retrieval_failure");
        assert!(completion.temperatures.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn generation_failure_is_reported_as_such() {
        let orchestrator = RagOrchestrator::new(
            Arc::new(StubRetriever::new(vec!["ctx"])),
            Arc::new(TimeoutCompletion),
            PromptTemplate::lavender(),
            OrchestratorSettings::default(),
        );

        let err = orchestrator.answer(&question("hello?")).await.unwrap_err();
        assert_eq!(err.kind(), "generation_failure");
        assert!(err.is_timeout());
    }
}
