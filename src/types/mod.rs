pub mod document;
pub mod kind;
pub mod settings;

pub use document::*;
pub use kind::*;
pub use settings::*;
