pub mod config;
pub mod encoding;
pub mod error;
pub mod file;
pub mod native;
pub mod path;

pub use config::PathPolicy;
pub use encoding::{TextEncoding, Utf16Le, Utf8};
pub use error::{FileError, Result};
pub use file::LongFile;
pub use native::{Access, Disposition, FileTimeTriple, NativeFs};
