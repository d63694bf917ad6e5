//! Structured model replies
//!
//! The model is asked for `{"sql_query", "answer", "visualization"}`. A reply
//! is classified into one of three shapes; a malformed one is repaired and
//! classified once more before giving up.

use ri_core::{ChartKind, ChartSpec};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::repair::{repair_json, strip_code_fence};
use crate::ModelError;

/// Answer text and chart request carried by a reply
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Insight {
    pub answer: String,
    pub chart: ChartSpec,
}

/// A classified model reply
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// The model produced a query to run
    Query { sql: String, insight: Insight },
    /// The model said the data cannot answer the question
    Sentinel { insight: Insight },
    /// The reply is not the expected JSON object
    Malformed { raw: String, reason: String },
}

impl ModelReply {
    /// Strict classification, no repair
    pub fn classify(raw: &str) -> Self {
        let text = strip_code_fence(raw);
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => return malformed(raw, e.to_string()),
        };
        let Value::Object(object) = value else {
            return malformed(raw, "expected a JSON object");
        };

        let sql = match object.get("sql_query") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(other) => return malformed(raw, format!("sql_query is not a string: {}", other)),
        };

        let insight = Insight {
            answer: normalize_answer(&text_field(&object, "answer")),
            chart: object
                .get("visualization")
                .and_then(Value::as_object)
                .map(chart_spec)
                .unwrap_or_default(),
        };

        match sql {
            Some(sql) if !is_sentinel(&sql) => ModelReply::Query { sql, insight },
            _ => ModelReply::Sentinel { insight },
        }
    }

    pub fn insight(&self) -> Option<&Insight> {
        match self {
            ModelReply::Query { insight, .. } | ModelReply::Sentinel { insight } => Some(insight),
            ModelReply::Malformed { .. } => None,
        }
    }

    pub fn into_insight(self) -> Option<Insight> {
        match self {
            ModelReply::Query { insight, .. } | ModelReply::Sentinel { insight } => Some(insight),
            ModelReply::Malformed { .. } => None,
        }
    }

    pub fn sql(&self) -> Option<&str> {
        match self {
            ModelReply::Query { sql, .. } => Some(sql),
            _ => None,
        }
    }

    /// Same reply with a different insight; the query is kept
    pub fn with_insight(self, insight: Insight) -> Self {
        match self {
            ModelReply::Query { sql, .. } => ModelReply::Query { sql, insight },
            ModelReply::Sentinel { .. } => ModelReply::Sentinel { insight },
            malformed => malformed,
        }
    }

    /// Back to the wire format
    pub fn to_json(&self) -> Value {
        match self {
            ModelReply::Malformed { raw, .. } => Value::String(raw.clone()),
            ModelReply::Query { sql, insight } => wire(Some(sql), insight),
            ModelReply::Sentinel { insight } => wire(None, insight),
        }
    }
}

/// Classify a reply, repairing it once if it is malformed
pub fn parse_reply(raw: &str) -> Result<ModelReply, ModelError> {
    match ModelReply::classify(raw) {
        ModelReply::Malformed { reason, .. } => {
            warn!("Model reply is malformed ({}); attempting repair", reason);
            let repaired = repair_json(raw);
            debug!("Repaired reply: {}", repaired);
            match ModelReply::classify(&repaired) {
                ModelReply::Malformed { reason, .. } => Err(ModelError::Response {
                    reason,
                    raw: raw.to_string(),
                }),
                reply => Ok(reply),
            }
        }
        reply => Ok(reply),
    }
}

/// Collapse runs of whitespace and tidy spaces before commas
pub fn normalize_answer(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").replace(" ,", ",")
}

fn is_sentinel(sql: &str) -> bool {
    sql.is_empty() || sql.eq_ignore_ascii_case("none") || sql.eq_ignore_ascii_case("null")
}

fn malformed(raw: &str, reason: impl Into<String>) -> ModelReply {
    ModelReply::Malformed {
        raw: raw.to_string(),
        reason: reason.into(),
    }
}

fn text_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn chart_spec(object: &Map<String, Value>) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::parse(&text_field(object, "type")),
        x_axis: text_field(object, "x_axis").trim().to_string(),
        y_axis: text_field(object, "y_axis").trim().to_string(),
        title: text_field(object, "title"),
        description: text_field(object, "description"),
    }
}

fn wire(sql: Option<&str>, insight: &Insight) -> Value {
    json!({
        "sql_query": sql,
        "answer": insight.answer,
        "visualization": {
            "type": insight.chart.kind.name(),
            "x_axis": insight.chart.x_axis,
            "y_axis": insight.chart.y_axis,
            "title": insight.chart.title,
            "description": insight.chart.description,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUERY_REPLY: &str = r#"{
        "sql_query": "SELECT product_name, SUM(total_amount) AS total_sales FROM retail_ingest_data_1 GROUP BY product_name",
        "answer": "Tea  leads sales ,  followed by coffee.",
        "visualization": {"type": "Bar", "x_axis": "product_name", "y_axis": "total_sales", "title": "Sales", "description": "By product"}
    }"#;

    #[test]
    fn test_query_reply() {
        let reply = parse_reply(QUERY_REPLY).unwrap();
        let ModelReply::Query { sql, insight } = reply else {
            panic!("expected a query reply");
        };
        assert!(sql.starts_with("SELECT product_name"));
        assert_eq!(insight.answer, "Tea leads sales, followed by coffee.");
        assert_eq!(insight.chart.kind, ChartKind::Bar);
        assert_eq!(insight.chart.y_axis, "total_sales");
    }

    #[test]
    fn test_sentinel_variants() {
        for raw in [
            r#"{"sql_query": "None", "answer": "No revenue column."}"#,
            r#"{"sql_query": null, "answer": "No revenue column."}"#,
            r#"{"sql_query": " none ", "answer": "No revenue column."}"#,
            r#"{"answer": "No revenue column."}"#,
        ] {
            let reply = parse_reply(raw).unwrap();
            assert_eq!(
                reply,
                ModelReply::Sentinel {
                    insight: Insight {
                        answer: "No revenue column.".to_string(),
                        chart: ChartSpec::default(),
                    }
                }
            );
        }
    }

    #[test]
    fn test_fenced_reply_is_not_malformed() {
        let raw = format!("```json\n{}\n```", QUERY_REPLY);
        assert!(matches!(ModelReply::classify(&raw), ModelReply::Query { .. }));
    }

    #[test]
    fn test_trailing_comma_is_repaired() {
        let raw = r#"{"sql_query": "SELECT 1 FROM retail_ingest_data_1", "answer": "ok",}"#;
        assert!(matches!(ModelReply::classify(raw), ModelReply::Malformed { .. }));
        assert_eq!(parse_reply(raw).unwrap().sql(), Some("SELECT 1 FROM retail_ingest_data_1"));
    }

    #[test]
    fn test_unquoted_key_is_repaired() {
        let raw = r#"{sql_query: "SELECT 1 FROM retail_ingest_data_1", answer: "ok"}"#;
        let reply = parse_reply(raw).unwrap();
        assert_eq!(reply.insight().unwrap().answer, "ok");
    }

    #[test]
    fn test_unrecoverable_reply() {
        match parse_reply("The model is unavailable right now.") {
            Err(ModelError::Response { raw, .. }) => {
                assert_eq!(raw, "The model is unavailable right now.")
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(parse_reply("[1, 2, 3]"), Err(ModelError::Response { .. })));
        assert!(matches!(
            parse_reply(r#"{"sql_query": 42, "answer": "x"}"#),
            Err(ModelError::Response { .. })
        ));
    }

    #[test]
    fn test_null_chart_fields() {
        let reply = parse_reply(
            r#"{"sql_query": "none", "answer": "x", "visualization": {"type": "none", "x_axis": null}}"#,
        )
        .unwrap();
        assert!(!reply.insight().unwrap().chart.wants_chart());
    }

    #[test]
    fn test_wire_round_trip_keeps_query() {
        let reply = parse_reply(QUERY_REPLY).unwrap();
        let again = parse_reply(&reply.to_json().to_string()).unwrap();
        assert_eq!(again, reply);
    }

    #[test]
    fn test_with_insight_keeps_sql() {
        let reply = parse_reply(QUERY_REPLY).unwrap();
        let sql = reply.sql().map(str::to_string);
        let updated = reply.with_insight(Insight::default());
        assert_eq!(updated.sql().map(str::to_string), sql);
        assert_eq!(updated.insight().unwrap().answer, "");
    }
}
