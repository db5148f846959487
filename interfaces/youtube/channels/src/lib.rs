//! Minimal YouTube Data API v3 client: channel statistics and snippets.

pub mod index;

pub use index::{
    ChannelStatistics, ClientBuildError, FetchChannelsError, YouTubeClient, MAX_IDS_PER_REQUEST,
};
