use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::countries;

/// Static reference data, seeded once.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = countries, primary_key(code))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Country {
    pub code: String,
    pub name: String,
    pub flag_emoji: String,
    pub region: String,
    pub created_at: DateTime<Utc>,
}
