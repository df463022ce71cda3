pub mod cache;
pub mod catalog;
pub mod categories;
pub mod metrics;
pub mod play_parser;
pub mod player;
pub mod selection;
pub mod slug;
