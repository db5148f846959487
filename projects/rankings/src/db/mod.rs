pub mod schema;
pub mod channel;
pub mod stats;
pub mod country;
pub mod rank_history;
pub mod store;
pub mod postgres;
pub mod memory;

use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

pub use store::{Store, StoreError, StoreOverview};
