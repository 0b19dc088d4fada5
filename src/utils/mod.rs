pub mod constants;
pub mod path_utils;

pub use constants::*;
pub use path_utils::{is_external_href, normalize_path, split_href};
