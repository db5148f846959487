use diesel::prelude::*;
use thiserror::Error;

use crate::db::{country::models::*, schema::countries::dsl::*};

#[derive(Debug, Error)]
pub enum CountryQueryError {
    #[error("GetCountry: {source}")]
    GetCountry { source: diesel::result::Error },

    #[error("ListCountryCodes: {source}")]
    ListCountryCodes { source: diesel::result::Error },

    #[error("ListCountries: {source}")]
    ListCountries { source: diesel::result::Error },

    #[error("CountCountries: {source}")]
    CountCountries { source: diesel::result::Error },
}

pub fn get_country(
    conn: &mut PgConnection,
    code_val: &str,
) -> Result<Option<Country>, CountryQueryError> {
    countries
        .filter(code.eq(code_val))
        .select(Country::as_select())
        .first(conn)
        .optional()
        .map_err(|source| CountryQueryError::GetCountry { source })
}

pub fn list_country_codes(conn: &mut PgConnection) -> Result<Vec<String>, CountryQueryError> {
    countries
        .select(code)
        .order(code.asc())
        .load(conn)
        .map_err(|source| CountryQueryError::ListCountryCodes { source })
}

pub fn list_countries(conn: &mut PgConnection) -> Result<Vec<Country>, CountryQueryError> {
    countries
        .select(Country::as_select())
        .order(code.asc())
        .load(conn)
        .map_err(|source| CountryQueryError::ListCountries { source })
}

pub fn count_countries(conn: &mut PgConnection) -> Result<i64, CountryQueryError> {
    countries
        .count()
        .get_result(conn)
        .map_err(|source| CountryQueryError::CountCountries { source })
}
