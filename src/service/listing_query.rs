use std::sync::Arc;

use serde::Serialize;

use crate::db::db::DBClient;
use crate::db::propertydb::PropertyExt;
use crate::dtos::searchdtos::{SearchFilterDto, SortField, SortOrder};
use crate::models::propertymodel::Property;
use crate::service::error::ServiceError;
use crate::service::filter_compiler::{compile_filters, highlight_predicates};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;

#[derive(Debug, Serialize)]
pub struct ListingPage {
    pub properties: Vec<Property>,
    /// 1-based page number; requests are 0-based.
    pub page: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

/// Skip/limit window for the organic segment of one page, given how many
/// sponsored rows exist and how many landed on this page.
///
/// The organic skip only shifts (by the sponsored deficit) when the page
/// holds no sponsored rows at all; a page that mixes both segments always
/// starts the organic segment at zero. Changing this arithmetic breaks the
/// no-repeat/no-gap guarantee across consecutive pages.
pub(crate) fn organic_window(
    page: i64,
    limit: i64,
    count_highlights: i64,
    fetched_highlights: usize,
) -> (i64, i64) {
    let property_skip_aux = (page + 1) * limit - count_highlights;
    let property_limit = limit - fetched_highlights as i64;
    let property_skip = if property_limit == limit {
        property_skip_aux - limit
    } else {
        0
    };
    (property_skip, property_limit)
}

/// Serves one page of listings with sponsored results interleaved ahead of
/// organic ones. Sponsored and organic rows come from two separate queries
/// over the same compiled predicates; the window math keeps page boundaries
/// consistent across both sets.
pub struct ListingQueryEngine {
    db_client: Arc<DBClient>,
}

impl ListingQueryEngine {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn search(
        &self,
        filters: &[SearchFilterDto],
        page: i64,
        limit: i64,
        sort_by: SortField,
        order: SortOrder,
        need_count: bool,
    ) -> Result<ListingPage, ServiceError> {
        let predicates = compile_filters(filters)?;
        let sponsored = highlight_predicates(&predicates);

        let count_highlights = self.db_client.count_properties(&sponsored).await?;
        let highlights = self
            .db_client
            .find_properties(&sponsored, sort_by, order, page * limit, limit)
            .await?;

        let (skip, organic_limit) =
            organic_window(page, limit, count_highlights, highlights.len());

        let organic = if organic_limit > 0 {
            self.db_client
                .find_properties(&predicates, sort_by, order, skip, organic_limit)
                .await?
        } else {
            Vec::new()
        };

        let (total_pages, total_count) = if need_count {
            let count_docs = self.db_client.count_properties(&predicates).await?;
            let total = count_docs + count_highlights;
            (Some((total + limit - 1) / limit), Some(total))
        } else {
            (None, None)
        };

        let mut properties = highlights;
        properties.extend(organic);

        Ok(ListingPage {
            properties,
            page: page + 1,
            total_pages,
            total_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Replays the engine's two-query page assembly over in-memory id lists,
    // using the same window math the real queries use.
    fn assemble_page(
        highlighted: &[i64],
        organic: &[i64],
        page: i64,
        limit: i64,
    ) -> Vec<i64> {
        let hl_skip = (page * limit) as usize;
        let fetched: Vec<i64> = highlighted
            .iter()
            .skip(hl_skip.min(highlighted.len()))
            .take(limit as usize)
            .copied()
            .collect();

        let (skip, organic_limit) =
            organic_window(page, limit, highlighted.len() as i64, fetched.len());

        let mut out = fetched;
        if organic_limit > 0 {
            out.extend(
                organic
                    .iter()
                    .skip((skip as usize).min(organic.len()))
                    .take(organic_limit as usize)
                    .copied(),
            );
        }
        out
    }

    fn walk_all_pages(highlight_count: i64, organic_count: i64, limit: i64) -> Vec<Vec<i64>> {
        // Sponsored ids are negative, organic positive, so provenance is
        // visible in assertions.
        let highlighted: Vec<i64> = (1..=highlight_count).map(|i| -i).collect();
        let organic: Vec<i64> = (1..=organic_count).collect();
        let total = highlight_count + organic_count;
        let pages = (total + limit - 1) / limit;

        (0..pages)
            .map(|p| assemble_page(&highlighted, &organic, p, limit))
            .collect()
    }

    #[test]
    fn window_shifts_by_deficit_only_on_pure_organic_pages() {
        // Page 1 with 3 highlights, limit 10: highlights exhausted, organic
        // resumes 7 rows in.
        assert_eq!(organic_window(1, 10, 3, 0), (7, 10));
        // Mixed page: organic starts at zero.
        assert_eq!(organic_window(0, 10, 3, 3), (0, 7));
        // Page entirely filled by highlights: no organic fetch.
        assert_eq!(organic_window(0, 10, 25, 10), (0, 0));
    }

    #[test]
    fn pages_visit_every_listing_exactly_once_highlights_first() {
        for (h, d, limit) in [
            (3i64, 25i64, 10i64),
            (0, 25, 10),
            (25, 3, 10),
            (10, 10, 10),
            (7, 0, 5),
            (13, 29, 7),
        ] {
            let pages = walk_all_pages(h, d, limit);

            let mut seen = Vec::new();
            for page in &pages {
                // Within a page, sponsored rows strictly precede organic rows.
                let first_organic = page.iter().position(|id| *id > 0);
                if let Some(pos) = first_organic {
                    assert!(page[pos..].iter().all(|id| *id > 0));
                }
                seen.extend(page.iter().copied());
            }

            let mut expected: Vec<i64> = (1..=h).map(|i| -i).collect();
            expected.extend(1..=d);
            let mut sorted = seen.clone();
            sorted.sort();
            expected.sort();
            assert_eq!(sorted, expected, "h={} d={} limit={}", h, d, limit);
            assert_eq!(seen.len(), (h + d) as usize);

            // Every page but the last is full.
            for page in &pages[..pages.len().saturating_sub(1)] {
                assert_eq!(page.len(), limit as usize);
            }
        }
    }

    #[test]
    fn first_page_of_three_highlights_and_twenty_five_organic() {
        let pages = walk_all_pages(3, 25, 10);

        assert_eq!(pages.len(), 3);
        let first = &pages[0];
        assert_eq!(first.len(), 10);
        assert_eq!(&first[..3], &[-1, -2, -3]);
        assert_eq!(&first[3..], &[1, 2, 3, 4, 5, 6, 7]);

        let total = 3 + 25;
        let total_pages = (total + 10 - 1) / 10;
        assert_eq!(total_pages, 3);
    }
}
