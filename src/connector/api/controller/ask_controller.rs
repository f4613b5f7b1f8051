use anyhow::Result;

use crate::SearchQuery;

use super::super::Container;

pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn ask(&self, question: String, top: usize, max_price: Option<f64>) -> Result<String> {
        let query = SearchQuery::new(question)
            .with_limit(top)
            .with_max_price(max_price);

        let answer = self.container.answer_use_case().execute(&query).await?;

        Ok(serde_json::to_string_pretty(&answer)?)
    }
}
