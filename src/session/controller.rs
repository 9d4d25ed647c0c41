use std::sync::Arc;

use super::transcript::{ChatTurn, Transcript};
use crate::rag::{Question, RagOrchestrator, TurnError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input; nothing was sent and the transcript is unchanged.
    Ignored,
    /// The exchange was appended; carries the assistant's reply.
    Answered(String),
}

pub struct SessionController {
    orchestrator: Arc<RagOrchestrator>,
    transcript: Transcript,
}

impl SessionController {
    pub fn new(orchestrator: Arc<RagOrchestrator>, max_pairs: usize) -> Self {
        Self {
            orchestrator,
            transcript: Transcript::new(max_pairs),
        }
    }

    /// Runs one turn. On error the transcript is left exactly as it was.
    pub async fn submit_turn(&mut self, question: &str) -> Result<TurnOutcome, TurnError> {
        let Some(parsed) = Question::parse(question) else {
            return Ok(TurnOutcome::Ignored);
        };

        let answer = self.orchestrator.answer(&parsed).await?;
        self.transcript
            .push_pair(question.to_string(), answer.clone());
        Ok(TurnOutcome::Answered(answer))
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        self.transcript.turns()
    }
}
