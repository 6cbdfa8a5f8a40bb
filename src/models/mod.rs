pub mod image;
pub mod prompt;
pub mod text;

pub use image::*;
pub use prompt::*;
pub use text::*;
