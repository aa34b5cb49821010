//! Dataview query blocks, rendered through an injected query engine.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::fence::apply_edits;

/// ```` ```dataview <query>``` ````
static QUERY_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```dataview(.+?)```").expect("valid query block regex"));

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Query failed: {0}")]
    Failed(String),
}

/// Runs a query in the context of a note and renders the result as Markdown.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn run_query(&self, query: &str, context_path: &str) -> Result<String, QueryError>;
}

/// Notice published in place of a block whose query failed.
pub fn query_notice(error: &QueryError) -> String {
    format!("> [!warning] Unable to render dataview query: {}", error)
}

/// Replace each query block of `text` with its rendered result.
///
/// Without an engine the blocks are published as written. A failing block
/// becomes a visible notice and the remaining blocks are still rendered.
pub async fn resolve_query_blocks(text: &str, local_path: &str, engine: Option<&dyn QueryEngine>) -> String {
    let Some(engine) = engine else {
        return text.to_string();
    };

    let mut edits = Vec::new();
    for caps in QUERY_BLOCK.captures_iter(text) {
        let (Some(block), Some(query)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let rendered = match engine.run_query(query.as_str(), local_path).await {
            Ok(markdown) => markdown,
            Err(e) => {
                tracing::warn!("Dataview query in {} failed: {}", local_path, e);
                query_notice(&e)
            }
        };
        edits.push((block.range(), rendered));
    }

    apply_edits(text, edits)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoEngine;

    #[async_trait]
    impl QueryEngine for EchoEngine {
        async fn run_query(&self, query: &str, context_path: &str) -> Result<String, QueryError> {
            let query = query.trim();
            if query.starts_with("BROKEN") {
                return Err(QueryError::Failed("parse error".into()));
            }
            Ok(format!("- {} @ {}", query, context_path))
        }
    }

    #[tokio::test]
    async fn without_engine_blocks_are_kept() {
        let text = "```dataview\nLIST\n```";
        assert_eq!(resolve_query_blocks(text, "n.md", None).await, text);
    }

    #[tokio::test]
    async fn blocks_are_rendered_and_failures_become_notices() {
        let text = "a\n```dataview\nLIST\n```\nb\n```dataview\nBROKEN\n```\nc";
        let out = resolve_query_blocks(text, "n.md", Some(&EchoEngine as &dyn QueryEngine)).await;
        assert_eq!(
            out,
            "a\n- LIST @ n.md\nb\n> [!warning] Unable to render dataview query: Query failed: parse error\nc"
        );
    }
}
