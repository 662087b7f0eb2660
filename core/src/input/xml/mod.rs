mod entities;
mod error;
mod reader;

pub use self::error::{ErrorCode, TokenizationError};
pub use self::reader::{parse, parse_file, parse_str};
