//! assets_rewrite_questions tool implementation.
//!
//! Points already-authored questions at cached assets without fetching.

use quizasset_client::{AssetCache, Question};
use quizasset_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input parameters for the assets_rewrite_questions tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RewriteQuestionsParams {
    /// Questions, each with its text and ordered answer options.
    pub questions: Vec<Question>,
}

/// Output structure for the assets_rewrite_questions tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RewriteQuestionsOutput {
    /// Rewritten copies, in input order.
    pub questions: Vec<Question>,
}

/// Implementation of the assets_rewrite_questions tool.
pub async fn rewrite_impl(cache: &AssetCache, params: RewriteQuestionsParams) -> Result<CallToolResult, McpError> {
    let questions = cache.rewrite_questions(&params.questions).await?;
    let output = RewriteQuestionsOutput { questions };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{output_json, test_cache};
    use quizasset_core::{AssetRecord, digest};

    #[tokio::test]
    async fn test_rewrite_cached_and_uncached() {
        let (db, cache) = test_cache().await;
        db.insert_asset(&AssetRecord::new("example.com/cat.png", "image/png", vec![1, 2]))
            .await
            .unwrap();

        let params = RewriteQuestionsParams {
            questions: vec![Question::new("Which animal? example.com/cat.png", ["example.com/dog.png", "cat"])],
        };

        let result = rewrite_impl(&cache, params).await.unwrap();
        let json = output_json(&result);

        assert_eq!(
            json["questions"][0]["text"],
            format!("Which animal? /assets/{}", digest("example.com/cat.png"))
        );
        assert_eq!(json["questions"][0]["answers"][0]["text"], "example.com/dog.png");
        assert_eq!(json["questions"][0]["answers"][1]["text"], "cat");
        assert_eq!(db.count_assets().await.unwrap(), 1);
    }

    #[test]
    fn test_params_require_question_shape() {
        let ok = serde_json::from_str::<RewriteQuestionsParams>(r#"{"questions": [{"text": "q", "answers": []}]}"#);
        assert!(ok.is_ok());

        let bad = serde_json::from_str::<RewriteQuestionsParams>(r#"{"questions": [{"title": "q"}]}"#);
        assert!(bad.is_err());
    }
}
