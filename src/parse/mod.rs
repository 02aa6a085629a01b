pub mod segment;
pub mod tokenize;
pub mod types;
pub mod wrappers;

pub use segment::{join_tokens, pipeline_stages, split_segments, token_segments};
pub use tokenize::tokenize;
pub use types::{Token, base_name, is_identifier};
pub use wrappers::{Resolved, WRAPPERS, WrapperSpec, expand_split_string, resolve, skip_wrappers};
