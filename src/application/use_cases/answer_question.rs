use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::application::use_cases::grounding::{build_prompt, ground, parse_proposals, render_context};
use crate::application::{ChatClient, SearchProductsUseCase};
use crate::domain::{DomainError, GroundedAnswer, SearchQuery};

/// Retrieval-augmented answering restricted to what the vector search returned.
///
/// The search hits are the only source of items in the answer; the model can
/// pick, drop and reorder them but never introduce new ones.
pub struct AnswerQuestionUseCase {
    search: SearchProductsUseCase,
    chat_client: Arc<dyn ChatClient>,
}

impl AnswerQuestionUseCase {
    pub fn new(search: SearchProductsUseCase, chat_client: Arc<dyn ChatClient>) -> Self {
        Self {
            search,
            chat_client,
        }
    }

    pub async fn execute(&self, query: &SearchQuery) -> Result<GroundedAnswer, DomainError> {
        let start_time = Instant::now();

        let candidates = self.search.execute(query).await?;
        let context = render_context(&candidates);
        let prompt = build_prompt(&context, query.query());

        let raw = self.chat_client.complete(&prompt).await?;
        debug!("Raw completion: {}", raw);

        let proposals = parse_proposals(&raw)?;
        let grounded = ground(&candidates, &proposals);

        info!(
            "Grounded {} of {} proposals against {} candidates in {:.2}s",
            grounded.len(),
            proposals.len(),
            candidates.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(GroundedAnswer::new(query.query(), grounded))
    }

    pub async fn ask(&self, question: &str, limit: usize) -> Result<GroundedAnswer, DomainError> {
        let query = SearchQuery::new(question).with_limit(limit);
        self.execute(&query).await
    }
}
