use super::{
    error::{ApiError, Stage},
    AppState,
};
use crate::{
    codec::EncodedImage,
    error::RoomFlipError,
    logger::Timer,
    models::{AuxParams, PromptRequest, SynthesizedPrompt},
    prompts::StrategyId,
};
use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptBody {
    pub marked_image: Option<String>,
    pub texture_image: Option<String>,
    pub strategy: Option<String>,
    #[serde(default)]
    pub aux_params: AuxParams,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBody {
    pub original_image: Option<String>,
    pub texture_image: Option<String>,
    pub prompt: Option<String>,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.trim().is_empty())
}

fn parse_strategy(raw: Option<&str>) -> Result<StrategyId, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(StrategyId::default()),
        Some(slug) => slug
            .parse()
            .map_err(|e: RoomFlipError| ApiError::new(StatusCode::BAD_REQUEST, "Invalid strategy", e.to_string())),
    }
}

impl PromptBody {
    fn into_request(self) -> Result<PromptRequest, ApiError> {
        let (Some(marked), Some(texture)) = (present(&self.marked_image), present(&self.texture_image)) else {
            return Err(ApiError::missing_fields("markedImage and textureImage are required"));
        };
        let strategy = parse_strategy(self.strategy.as_deref())?;
        PromptRequest::from_data_uris(Some(marked), Some(texture), strategy, self.aux_params)
            .map_err(|e| ApiError::from_error(&e, Stage::Prompt))
    }
}

fn fail(request_id: &str, err: &RoomFlipError, stage: Stage) -> ApiError {
    if err.is_client_error() {
        log::warn!("[req:{}] rejected: {}", request_id, err);
    } else {
        log::error!("[req:{}] {:?} stage failed ({}): {}", request_id, stage, err.kind(), err);
    }
    ApiError::from_error(err, stage)
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("Server is running fine 🚀")
}

pub async fn generate_claude_prompt(
    state: web::Data<AppState>,
    body: web::Json<PromptBody>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let _timer = Timer::for_request("generate_claude_prompt", &request_id);

    let request = body.into_inner().into_request()?;
    log::info!("[req:{}] synthesizing prompt ({})", request_id, request.strategy);

    let prompt = state
        .client
        .prompt()
        .synthesize(&request)
        .await
        .map_err(|e| fail(&request_id, &e, Stage::Prompt))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "prompt": prompt,
        "model": state.client.prompt().model(),
        "strategy": request.strategy,
    })))
}

pub async fn generate_imagen_image(
    state: web::Data<AppState>,
    body: web::Json<ImageBody>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let _timer = Timer::for_request("generate_imagen_image", &request_id);
    let body = body.into_inner();

    let (Some(original), Some(prompt)) = (present(&body.original_image), present(&body.prompt)) else {
        return Err(ApiError::missing_fields("originalImage and prompt are required"));
    };

    let mut images = vec![EncodedImage::decode(original).map_err(|e| fail(&request_id, &e, Stage::Image))?];
    if let Some(texture) = present(&body.texture_image) {
        images.push(EncodedImage::decode(texture).map_err(|e| fail(&request_id, &e, Stage::Image))?);
    }
    let prompt = SynthesizedPrompt::new(prompt).map_err(|e| fail(&request_id, &e, Stage::Image))?;

    log::info!("[req:{}] generating image from caller prompt", request_id);
    let result = state
        .client
        .image()
        .generate(&prompt, &images)
        .await
        .map_err(|e| fail(&request_id, &e, Stage::Image))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "transformedImage": result.image_data_uri,
        "model": result.model_id,
    })))
}

pub async fn transform(
    state: web::Data<AppState>,
    body: web::Json<PromptBody>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let _timer = Timer::for_request("transform", &request_id);

    let request = body.into_inner().into_request()?;
    log::info!("[req:{}] transforming room ({})", request_id, request.strategy);

    let outcome = state
        .client
        .transform(&request)
        .await
        .map_err(|e| fail(&request_id, &e.error, e.stage))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "prompt": outcome.prompt,
        "transformedImage": outcome.result.image_data_uri,
        "model": outcome.result.model_id,
        "strategy": request.strategy,
    })))
}
