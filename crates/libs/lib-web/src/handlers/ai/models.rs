//! `GET /api/ai/models[?capability=..]`

use axum::Json;
use lib_ai::models::{all_models, models_by_capability};
use lib_ai::{AiModel, Capability};
use lib_core::{AppError, Result};
use serde::{Deserialize, Serialize};

use crate::handlers::QueryParams;

#[derive(Debug, Default, Deserialize)]
pub struct ModelsQuery {
    pub capability: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<&'static AiModel>,
    pub total: usize,
}

pub async fn list_models(QueryParams(query): QueryParams<ModelsQuery>) -> Result<Json<ModelsResponse>> {
    let models: Vec<&'static AiModel> = match query.capability.as_deref() {
        Some(value) => {
            let capability = Capability::parse(value)
                .ok_or_else(|| AppError::InvalidInput(format!("Unknown capability: {}", value)))?;
            models_by_capability(capability)
        }
        None => all_models().collect(),
    };

    Ok(Json(ModelsResponse {
        total: models.len(),
        models,
    }))
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{call, test_app, ScriptedAi};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_list_models() {
        // Arrange
        let (app, _store) = test_app(ScriptedAi::healthy());

        // Act
        let (_, all) = call(&app, "GET", "/api/ai/models", None).await;
        let (_, code) = call(&app, "GET", "/api/ai/models?capability=code-assistance", None).await;
        let (bad, _) = call(&app, "GET", "/api/ai/models?capability=telepathy", None).await;

        // Assert
        assert_eq!(all["total"], 8);
        assert_eq!(all["models"][0]["id"], "gpt2-large");
        assert_eq!(code["total"], 1);
        assert_eq!(code["models"][0]["modelId"], "Salesforce/codet5-large");
        assert_eq!(bad, StatusCode::BAD_REQUEST);
    }
}
// endregion: --- Tests
