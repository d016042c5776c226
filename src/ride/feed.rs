//! Feed reduction over already fetched rides. Everything here is pure: the
//! fan-out lives in the service, correctness lives here.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::model::{FeedItem, Ride};
use crate::account::model::DisplayInfo;
use crate::integration::storage::Picture;

/// Rides of one owner as fetched on behalf of one of the caller's groups.
pub struct Batch<'a> {
    pub group: usize,
    pub owner: &'a DisplayInfo,
    pub rides: Vec<Ride>,
}

/// Deduplicates across all batches, drops rides not strictly after `now`,
/// enriches the rest and sorts them by departure.
///
/// `pictures` is indexed by [`Batch::group`]. Rides departing at the same
/// instant keep their fetch order.
pub fn aggregate(batches: Vec<Batch<'_>>, pictures: &[Picture], now: DateTime<Utc>) -> Vec<FeedItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for Batch {
        group,
        owner,
        rides,
    } in batches
    {
        let picture = pictures.get(group).cloned().unwrap_or(Picture::Placeholder);

        for ride in rides {
            if ride.scheduled_at() <= now || !seen.insert(ride.id().clone()) {
                continue;
            }
            items.push(FeedItem::new(ride, owner, picture.clone()));
        }
    }

    items.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at));
    items
}

/// Case-insensitive substring match on source or destination. The query is
/// matched as given, surrounding whitespace included. An empty query keeps
/// everything.
pub fn search(items: Vec<FeedItem>, query: &str) -> Vec<FeedItem> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return items;
    }

    items
        .into_iter()
        .filter(|r| {
            r.source.to_lowercase().contains(&query) || r.destination.to_lowercase().contains(&query)
        })
        .collect()
}
