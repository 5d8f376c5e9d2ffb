//! Archive identifier parsing and broadcast ordering.
//!
//! Archived episodes carry a `data_source_id` that encodes when they aired.
//! Two schemes are in use:
//!
//! - `YYYY_<race>[_<anything>]`, e.g. `2021_monaco_fp1`, where `YYYY` is a
//!   plausible broadcast year (1950 to 2099)
//! - the compact legacy form `YYRR...`, e.g. `1805_qualifying` (2018, race 05)
//!
//! Four leading digits that are not a plausible year, or that are not
//! followed by `_`, are read as the compact form.

use std::cmp::Ordering;

use thiserror::Error;

use crate::dto::Episode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a year/race identifier: {0:?}")]
pub struct ParseError(pub String);

/// Parse the broadcast year and race code out of a data source id.
pub fn parse_year_and_race(data_source_id: &str) -> Result<(String, String), ParseError> {
    let err = || ParseError(data_source_id.to_string());

    let prefix = data_source_id.get(..4).ok_or_else(err)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }

    if is_plausible_year(prefix) {
        if let Some(rest) = data_source_id[4..].strip_prefix('_') {
            let race = rest.split('_').next().unwrap_or_default();
            if race.is_empty() {
                return Err(err());
            }
            return Ok((prefix.to_string(), race.to_string()));
        }
    }

    let (yy, race) = prefix.split_at(2);
    // yy is two ASCII digits, checked above
    let century = if yy < "30" { "20" } else { "19" };
    Ok((format!("{century}{yy}"), race.to_string()))
}

fn is_plausible_year(prefix: &str) -> bool {
    ("1950"..="2099").contains(&prefix)
}

/// Sort episodes into broadcast order: by year, then race code, then title.
/// Episodes without a parseable id go last, ordered by title. The sort is
/// stable, so exact duplicates keep their input order.
pub fn sort_episodes(mut episodes: Vec<Episode>) -> Vec<Episode> {
    episodes.sort_by(|a, b| {
        let ka = parse_year_and_race(&a.data_source_id).ok();
        let kb = parse_year_and_race(&b.data_source_id).ok();
        let by_key = match (ka, kb) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_key.then_with(|| a.title.cmp(&b.title))
    });
    episodes
}
