//! Prompt text sent to the model

use ri_core::SchemaDescriptor;

const ANALYSIS_RULES: &str = "\
CRITICAL RULES:
1. ONLY use columns from the listed tables
2. If the available columns are insufficient to answer the question, set sql_query to \"None\" and say so in the answer
3. Keep answers concise and focused
4. Write SQLite SQL. Only write SELECT queries; never modify data
5. For numeric calculations on text columns use CAST(column_name AS REAL)
6. Use exact table names as shown above (e.g., retail_ingest_data_1, retail_ingest_data_2, etc.)
7. If the question doesn't specify a table and multiple tables exist, either infer the most relevant table or state that clarification is needed";

const VISUALIZATION_RULES: &str = "\
VISUALIZATION RULES:
- Only suggest bar, line, or pie charts
- ONLY use column names that exist in the query result
- Bar charts: For comparing categories or groups
- Line charts: For time-based trends
- Pie charts: For showing composition/distribution";

const EXAMPLES: &str = r#"Example Responses:

1. Time-based Question: "Show monthly sales trend from retail_ingest_data_1"
{
    "sql_query": "SELECT strftime('%Y-%m', date) AS month, SUM(total_amount) AS total_sales FROM retail_ingest_data_1 GROUP BY month ORDER BY month",
    "answer": "Monthly sales show an upward trend with peak in December at $50,000",
    "visualization": {
        "type": "line",
        "x_axis": "month",
        "y_axis": "total_sales",
        "title": "Monthly Sales Trend",
        "description": "Line chart shows sales progression over time"
    }
}

2. Category Question: "What's the distribution of sales by product in retail_ingest_data_2?"
{
    "sql_query": "SELECT product_name, SUM(total_amount) AS total_sales FROM retail_ingest_data_2 GROUP BY product_name ORDER BY total_sales DESC",
    "answer": "Product sales distribution shows Product A leading with 45% market share",
    "visualization": {
        "type": "pie",
        "x_axis": "product_name",
        "y_axis": "total_sales",
        "title": "Sales Distribution by Product",
        "description": "Pie chart shows relative market share of each product"
    }
}"#;

const RESPONSE_FORMAT: &str = r#"Respond in this JSON format:
{
    "sql_query": "Your SQLite query here (or 'None' if columns are insufficient)",
    "answer": "Provide clear business insights from the query results",
    "visualization": {
        "type": "none | bar | line | pie",
        "x_axis": "column_name",
        "y_axis": "column_name",
        "title": "Chart title",
        "description": "Why this visualization is relevant"
    }
}"#;

/// Prompt for the insight pass.
///
/// `results` is the text form of a result set from an earlier pass.
pub fn insight_prompt(
    question: &str,
    schemas: &[SchemaDescriptor],
    results: Option<&str>,
) -> String {
    let tables: String = schemas
        .iter()
        .map(|schema| format!("\n{}", schema.to_prompt_block()))
        .collect();

    let mut prompt = format!(
        "You are a data analyst expert in SQL. Analyze this SQLite database with multiple tables:\n\
         {tables}\n\
         {ANALYSIS_RULES}\n\n\
         {VISUALIZATION_RULES}\n\n\
         {EXAMPLES}\n\n\
         Question: {question}\n\n\
         Remember: Only use columns that exist in the data and match table and column names exactly as shown above.\n\n\
         {RESPONSE_FORMAT}"
    );

    if let Some(results) = results {
        prompt.push_str("\n\nQuery Results:\n");
        prompt.push_str(results);
    }
    prompt
}

/// Prompt for the formatting clean-up pass over an earlier reply
pub fn cleanup_prompt(initial: &str) -> String {
    format!(
        "Clean up and format this analysis response, fixing any spacing, formatting, or text artifacts.\n\
         Ensure proper spacing between sentences and maintain the exact same data/numbers.\n\
         Keep the response concise and well-formatted.\n\n\
         Original response:\n\
         {initial}\n\n\
         Return the cleaned response in the exact same JSON format, but with improved formatting."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ri_core::{ColumnKind, ColumnSchema};

    fn schema(name: &str) -> SchemaDescriptor {
        SchemaDescriptor {
            table_name: name.to_string(),
            columns: vec![ColumnSchema::new("total_amount", ColumnKind::Numeric)],
            sample_rows: vec![vec!["100".to_string()]],
            row_count: 1,
        }
    }

    #[test]
    fn test_prompt_lists_every_table() {
        let prompt = insight_prompt(
            "What is total revenue?",
            &[schema("retail_ingest_data_1"), schema("retail_ingest_data_2")],
            None,
        );
        assert!(prompt.contains("Table: retail_ingest_data_1"));
        assert!(prompt.contains("Table: retail_ingest_data_2"));
        assert!(prompt.contains("total_amount (numeric)"));
        assert!(prompt.contains("Question: What is total revenue?"));
        assert!(prompt.trim_end().ends_with('}'));
        assert!(!prompt.contains("Query Results:"));
    }

    #[test]
    fn test_prompt_appends_results() {
        let prompt = insight_prompt("Q", &[schema("retail_ingest_data_1")], Some("| s |\n| 450 |"));
        assert!(prompt.ends_with("Query Results:\n| s |\n| 450 |"));
    }

    #[test]
    fn test_cleanup_prompt_embeds_reply() {
        let prompt = cleanup_prompt(r#"{"answer": "x"}"#);
        assert!(prompt.contains("Original response:\n{\"answer\": \"x\"}"));
    }
}
