//! Question answering: model, query dispatch and chart rendering

use ri_core::{ChartSpec, RenderedChart};
use ri_data::{QueryDispatcher, ResultSet};
use ri_llm::{Insight, InsightRequester, ModelError, ModelReply};
use ri_views::ChartRenderer;
use tracing::{error, info, warn};

use crate::error::InteractionError;
use crate::session::Session;

const NO_INSIGHTS: &str = "No insights generated.";
const UNABLE_TO_ANSWER: &str = "Unable to generate insights.";

/// Reply shown to the user
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub chart: Option<RenderedChart>,
    /// Query that was executed, if any
    pub sql: Option<String>,
}

pub struct InsightPipeline {
    requester: InsightRequester,
    renderer: ChartRenderer,
}

impl InsightPipeline {
    pub fn new(requester: InsightRequester, renderer: ChartRenderer) -> Self {
        Self { requester, renderer }
    }

    /// Answer `question` from the session's tables and record the exchange
    pub async fn ask(
        &self,
        session: &mut Session,
        question: &str,
    ) -> Result<Answer, InteractionError> {
        session.conversation_mut().push_user(question);
        if !session.has_data() {
            return Err(InteractionError::NoData);
        }

        let schemas = session.schemas()?;
        let first = self.requester.request(question, &schemas, None).await?;

        let answer = match first {
            ModelReply::Query { sql, insight } => {
                let dispatcher = QueryDispatcher::new(session.stores(), session.backend());
                match dispatcher.dispatch(&sql)? {
                    Some(results) => {
                        info!("Query returned {} rows", results.num_rows());
                        let second = self
                            .requester
                            .request(question, &schemas, Some(&results.to_text()))
                            .await?;
                        let insight = second.into_insight().unwrap_or_default();
                        Answer {
                            chart: self.chart(&results, &insight.chart),
                            text: answer_text(&insight, NO_INSIGHTS),
                            sql: Some(sql),
                        }
                    }
                    None => Answer {
                        text: answer_text(&insight, UNABLE_TO_ANSWER),
                        chart: None,
                        sql: None,
                    },
                }
            }
            ModelReply::Sentinel { insight } => Answer {
                text: answer_text(&insight, UNABLE_TO_ANSWER),
                chart: None,
                sql: None,
            },
            ModelReply::Malformed { raw, reason } => {
                return Err(ModelError::Response { reason, raw }.into());
            }
        };

        session
            .conversation_mut()
            .push_assistant(answer.text.clone(), answer.chart.clone());
        Ok(answer)
    }

    /// Like [`ask`](Self::ask), but every failure becomes a reply
    pub async fn respond(&self, session: &mut Session, question: &str) -> Answer {
        match self.ask(session, question).await {
            Ok(answer) => answer,
            Err(e) => {
                error!("Interaction failed: {}", e);
                let text = format!("Analysis error: {}", e);
                session.conversation_mut().push_assistant(text.clone(), None);
                Answer {
                    text,
                    chart: None,
                    sql: None,
                }
            }
        }
    }

    /// Render the requested chart; a rendering failure means no chart
    fn chart(&self, results: &ResultSet, spec: &ChartSpec) -> Option<RenderedChart> {
        match self.renderer.render(results, spec) {
            Ok(chart) => chart,
            Err(e) => {
                warn!("Chart skipped: {}", InteractionError::from(e));
                None
            }
        }
    }
}

fn answer_text(insight: &Insight, fallback: &str) -> String {
    if insight.answer.trim().is_empty() {
        fallback.to_string()
    } else {
        insight.answer.clone()
    }
}
