pub mod builder;
pub mod category;
pub mod classify;
pub mod main;
pub mod text;

pub use builder::*;
pub use category::*;
pub use classify::*;
pub use main::*;
pub use text::*;
