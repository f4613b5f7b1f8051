use anyhow::Result;

use crate::SearchQuery;

use super::super::Container;

pub struct SearchController<'a> {
    container: &'a Container,
}

impl<'a> SearchController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn search(&self, query: String, top: usize, max_price: Option<f64>) -> Result<String> {
        let search_query = SearchQuery::new(query)
            .with_limit(top)
            .with_max_price(max_price);

        let hits = self.container.search_use_case().execute(&search_query).await?;

        Ok(serde_json::to_string_pretty(&hits)?)
    }
}
