//! Option handling: caller options, defaults and resolution

pub mod messages;
pub mod options;
pub mod resolver;

pub use messages::MessageKey;
pub use options::UserOptions;
pub use resolver::{resolve, ValidationConfig};
