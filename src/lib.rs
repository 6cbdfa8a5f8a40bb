//! Room material transformation: validates client image payloads, builds
//! editing prompts from a closed catalog of strategies, asks a vision model to
//! write the final prompt and renders it with an image-generation model.

pub mod codec;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod prompts;
pub mod providers;

#[cfg(feature = "server")]
pub mod server;

pub use codec::EncodedImage;
pub use config::{AnthropicConfig, Config, GoogleConfig, ImageProvider};
pub use error::{Result, RoomFlipError};
pub use models::{AuxParams, PromptRequest, SynthesizedPrompt, TransformResult};
pub use prompts::{build_instruction, StrategyId};
pub use providers::{ImageSynthesisClient, PromptSynthesisClient, RoomFlipClient, Stage, TransformError};
