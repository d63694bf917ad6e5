//! Two-pass insight requests

use std::sync::Arc;
use ri_core::SchemaDescriptor;
use tracing::{debug, info, warn};

use crate::client::LanguageModel;
use crate::config::ModelConfig;
use crate::prompt::{cleanup_prompt, insight_prompt};
use crate::reply::{parse_reply, ModelReply};
use crate::ModelError;

/// Asks the model for insights: an insight pass, then an optional
/// formatting clean-up pass over its reply.
pub struct InsightRequester {
    model: Arc<dyn LanguageModel>,
    temperature: f32,
    cleanup_temperature: f32,
    cleanup_pass: bool,
}

impl InsightRequester {
    pub fn new(model: Arc<dyn LanguageModel>, config: &ModelConfig) -> Self {
        Self {
            model,
            temperature: config.temperature,
            cleanup_temperature: config.cleanup_temperature,
            cleanup_pass: config.cleanup_pass,
        }
    }

    /// Request insights for `question` over `schemas`.
    ///
    /// `results` is the text form of an executed query, present on the
    /// second round of a question. A failure of the insight pass is
    /// returned; a failure of the clean-up pass is logged and ignored.
    pub async fn request(
        &self,
        question: &str,
        schemas: &[SchemaDescriptor],
        results: Option<&str>,
    ) -> Result<ModelReply, ModelError> {
        let prompt = insight_prompt(question, schemas, results);
        info!(
            "Requesting insights ({} tables, {} prompt chars, results: {})",
            schemas.len(),
            prompt.len(),
            results.is_some()
        );

        let raw = self.model.complete(&prompt, self.temperature).await?;
        debug!("Insight reply: {}", raw);
        let reply = parse_reply(&raw)?;

        if !self.cleanup_pass {
            return Ok(reply);
        }

        match self.clean_up(&reply).await {
            Ok(cleaned) => Ok(cleaned),
            Err(e) => {
                warn!("Clean-up pass failed, keeping first reply: {}", e);
                Ok(reply)
            }
        }
    }

    /// Ask the model to reformat its own reply. Only the insight of the
    /// cleaned reply is taken; the query stays as first generated.
    async fn clean_up(&self, reply: &ModelReply) -> Result<ModelReply, ModelError> {
        let prompt = cleanup_prompt(&reply.to_json().to_string());
        let raw = self.model.complete(&prompt, self.cleanup_temperature).await?;
        debug!("Clean-up reply: {}", raw);

        let cleaned = parse_reply(&raw)?;
        match cleaned.into_insight() {
            Some(insight) => Ok(reply.clone().with_insight(insight)),
            None => Err(ModelError::Response {
                reason: "clean-up reply carries no insight".to_string(),
                raw,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ScriptedModel;
    use ri_core::{ChartKind, ColumnKind, ColumnSchema};

    fn schemas() -> Vec<SchemaDescriptor> {
        vec![SchemaDescriptor {
            table_name: "retail_ingest_data_1".to_string(),
            columns: vec![ColumnSchema::new("total_amount", ColumnKind::Numeric)],
            sample_rows: vec![],
            row_count: 3,
        }]
    }

    fn requester(model: Arc<ScriptedModel>, cleanup_pass: bool) -> InsightRequester {
        let config = ModelConfig {
            cleanup_pass,
            ..ModelConfig::default()
        };
        InsightRequester::new(model, &config)
    }

    const FIRST: &str = r#"{"sql_query": "SELECT SUM(total_amount) AS s FROM retail_ingest_data_1", "answer": "Total  is 450 ,", "visualization": {"type": "none"}}"#;

    #[tokio::test]
    async fn test_two_passes() {
        let model = Arc::new(ScriptedModel::new([
            FIRST,
            r#"{"sql_query": "SELECT 1", "answer": "Total revenue is 450.", "visualization": {"type": "bar", "x_axis": "a", "y_axis": "s"}}"#,
        ]));
        let reply = requester(model.clone(), true)
            .request("What is total revenue?", &schemas(), None)
            .await
            .unwrap();

        assert_eq!(reply.sql(), Some("SELECT SUM(total_amount) AS s FROM retail_ingest_data_1"));
        let insight = reply.insight().unwrap();
        assert_eq!(insight.answer, "Total revenue is 450.");
        assert_eq!(insight.chart.kind, ChartKind::Bar);

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].1, 0.5);
        assert_eq!(prompts[1].1, 0.1);
        assert!(prompts[0].0.contains("Question: What is total revenue?"));
        assert!(prompts[1].0.contains("Total is 450,"));
    }

    #[tokio::test]
    async fn test_cleanup_failure_keeps_first_reply() {
        let model = Arc::new(ScriptedModel::new([FIRST, "sorry, no JSON today"]));
        let reply = requester(model.clone(), true)
            .request("What is total revenue?", &schemas(), None)
            .await
            .unwrap();
        assert_eq!(reply.insight().unwrap().answer, "Total is 450,");

        let model = Arc::new(ScriptedModel::new([FIRST]));
        model.push_error(ModelError::Status {
            status: 503,
            body: "busy".to_string(),
        });
        let reply = requester(model, true)
            .request("What is total revenue?", &schemas(), None)
            .await
            .unwrap();
        assert!(matches!(reply, ModelReply::Query { .. }));
    }

    #[tokio::test]
    async fn test_first_pass_failure_is_surfaced() {
        let model = Arc::new(ScriptedModel::new(["not json at all"]));
        let result = requester(model.clone(), true)
            .request("Q", &schemas(), None)
            .await;
        assert!(matches!(result, Err(ModelError::Response { .. })));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_results_reach_prompt_without_cleanup() {
        let model = Arc::new(ScriptedModel::new([FIRST]));
        requester(model.clone(), false)
            .request("Q", &schemas(), Some("| s |\n| 450 |"))
            .await
            .unwrap();

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].0.ends_with("Query Results:\n| s |\n| 450 |"));
    }
}
