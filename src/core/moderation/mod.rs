// Core moderation module - lexical filtering of user submissions.

pub mod deny_list;
pub mod word_filter;

pub use deny_list::DEFAULT_DENY_LIST;
pub use word_filter::*;
