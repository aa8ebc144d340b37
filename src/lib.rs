pub mod api;
pub mod channel;
pub mod clock;
pub mod config;
pub mod epg;
pub mod errors;
pub mod history;
pub mod loader;
pub mod preview;
pub mod search;
pub mod text;
pub mod time_codec;
pub mod timeline;
