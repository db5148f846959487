//! REST API, mounted under `/api`.
//!
//! One directory per endpoint, each with its own `HandlerError`.

pub mod params;

pub mod health {
    pub mod index;
}

pub mod channels {
    pub mod read {
        pub mod index;
    }
}

pub mod leaderboard {
    pub mod biggest_gainers {
        pub mod index;
    }
    pub mod country {
        pub mod index;
    }
    pub mod fastest_growing {
        pub mod index;
    }
    pub mod global {
        pub mod index;
    }
}

pub mod stats {
    pub mod channel_history {
        pub mod index;
    }
    pub mod map_data {
        pub mod index;
    }
    pub mod ranking_changes {
        pub mod index;
    }
}

pub mod predictions {
    pub mod overtake {
        pub mod index;
    }
}

pub mod admin {
    pub mod refresh_all {
        pub mod index;
    }
    pub mod refresh_channel {
        pub mod index;
    }
    pub mod scheduler {
        pub mod index;
    }
    pub mod stats {
        pub mod index;
    }
}

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::index::handler))
        .route("/channels/{channel_id}", get(channels::read::index::handler))
        .route("/leaderboard/global", get(leaderboard::global::index::handler))
        .route(
            "/leaderboard/country/{code}",
            get(leaderboard::country::index::handler),
        )
        .route(
            "/leaderboard/fastest-growing",
            get(leaderboard::fastest_growing::index::handler),
        )
        .route(
            "/leaderboard/biggest-gainers",
            get(leaderboard::biggest_gainers::index::handler),
        )
        .route(
            "/stats/channel/{channel_id}/history",
            get(stats::channel_history::index::handler),
        )
        .route("/stats/map-data", get(stats::map_data::index::handler))
        .route(
            "/stats/ranking-changes",
            get(stats::ranking_changes::index::handler),
        )
        .route(
            "/predictions/overtake/{channel_id}/{target_id}",
            get(predictions::overtake::index::handler),
        )
        .route(
            "/admin/refresh-channel/{channel_id}",
            post(admin::refresh_channel::index::handler),
        )
        .route("/admin/refresh-all", post(admin::refresh_all::index::handler))
        .route("/admin/stats", get(admin::stats::index::handler))
        .route("/admin/scheduler", get(admin::scheduler::index::handler));

    Router::new().nest("/api", api).layer(Extension(state))
}

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;
