//! ACRA rating lookup by ISIN.
//!
//! The search page lists matching documents; the first item tagged as an
//! issue ("Выпуск") links to the issue page whose rating widget holds the
//! grade.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use scraper::{ElementRef, Html, Selector};

use crate::errors::{RatingError, Result};
use crate::fetch::{HttpFetch, BROWSER_USER_AGENT};
use crate::source::{Rating, RatingSource};

const SOURCE_ID: &str = "ACRA";
pub const ACRA_BASE_URL: &str = "https://www.acra-ratings.ru";

const RESULT_COUNT: &str = "div.search-page__all-result.search-tag";
const RESULT_ITEM: &str = "div.search-result__item";
const ITEM_TAG: &str = "div.tag";
const ITEM_LINK: &str = "a.search-result__item-text";
const RATING_WIDGET: &str = "div.rating-widget";

const COUNT_MARKER: &str = "Найдено";
const ISSUE_MARKER: &str = "Выпуск";

pub struct AcraSource {
    fetcher: Arc<dyn HttpFetch>,
    base_url: String,
    courtesy_delay: Duration,
}

impl AcraSource {
    pub fn new(fetcher: Arc<dyn HttpFetch>, courtesy_delay: Duration) -> Self {
        Self {
            fetcher,
            base_url: ACRA_BASE_URL.to_string(),
            courtesy_delay,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self
            .fetcher
            .get(url, &[("User-Agent", BROWSER_USER_AGENT)])
            .await?
            .require_ok(url)?;
        Ok(response.text())
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| RatingError::parse(SOURCE_ID, format!("{}: {}", css, e)))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Number of hits reported by the search page.
fn result_count(document: &Html) -> Result<usize> {
    let indicator = document
        .select(&selector(RESULT_COUNT)?)
        .next()
        .map(element_text)
        .ok_or_else(|| RatingError::parse(SOURCE_ID, "result counter not found"))?;

    let tail = indicator
        .find(COUNT_MARKER)
        .map(|pos| &indicator[pos + COUNT_MARKER.len()..])
        .ok_or_else(|| RatingError::parse(SOURCE_ID, format!("bad counter: {:?}", indicator)))?;

    tail.trim()
        .parse()
        .map_err(|_| RatingError::parse(SOURCE_ID, format!("bad counter: {:?}", indicator)))
}

/// Link of the first result tagged as an issue.
fn issue_link(document: &Html) -> Result<Option<String>> {
    let item_selector = selector(RESULT_ITEM)?;
    let tag_selector = selector(ITEM_TAG)?;
    let link_selector = selector(ITEM_LINK)?;

    for item in document.select(&item_selector) {
        let Some(tag) = item.select(&tag_selector).next() else {
            continue;
        };
        let tag_text: String = element_text(tag).chars().filter(|c| *c != ' ').collect();
        if !tag_text.contains(ISSUE_MARKER) {
            continue;
        }

        let href = item
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| RatingError::parse(SOURCE_ID, "issue item without link"))?;
        return Ok(Some(href.to_string()));
    }

    Ok(None)
}

fn widget_rating(document: &Html) -> Result<Rating> {
    let rating = document
        .select(&selector(RATING_WIDGET)?)
        .next()
        .map(|widget| {
            element_text(widget)
                .chars()
                .filter(|c| *c != ' ' && *c != '\n')
                .collect::<String>()
        });
    Ok(rating.map(Rating::from_text).unwrap_or(Rating::NotRated))
}

#[async_trait]
impl RatingSource for AcraSource {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    async fn lookup(&self, isin: &str) -> Result<Rating> {
        let search_url = format!("{}/search/?q={}", self.base_url, isin);
        let body = self.fetch_page(&search_url).await?;

        let link = {
            let document = Html::parse_document(&body);
            if result_count(&document)? == 0 {
                debug!("ACRA has no results for {}", isin);
                return Ok(Rating::NotRated);
            }
            issue_link(&document)?
        };

        let Some(href) = link else {
            debug!("ACRA has no issue page for {}", isin);
            return Ok(Rating::NotRated);
        };

        tokio::time::sleep(self.courtesy_delay).await;

        let issue_url = format!("{}{}", self.base_url, href);
        let body = self.fetch_page(&issue_url).await?;
        let document = Html::parse_document(&body);
        widget_rating(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StubFetcher;
    use crate::fetch::FetchResponse;

    const SEARCH_URL: &str = "https://www.acra-ratings.ru/search/?q=RU000A105XXX";
    const ISSUE_URL: &str = "https://www.acra-ratings.ru/ratings/issues/1234/";

    fn search_page(count: usize, items: &str) -> String {
        format!(
            r#"<html><body>
            <div class="search-page__all-result search-tag">Найдено {}</div>
            {}
            </body></html>"#,
            count, items
        )
    }

    fn source(fetcher: Arc<StubFetcher>) -> AcraSource {
        AcraSource::new(fetcher, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_follows_issue_item_to_rating_widget() {
        let items = r#"
            <div class="search-result__item">
                <div class="tag">Пресс-релиз</div>
                <a class="search-result__item-text" href="/press/1/">news</a>
            </div>
            <div class="search-result__item">
                <div class="tag">Вы пуск</div>
                <a class="search-result__item-text" href="/ratings/issues/1234/">issue</a>
            </div>"#;
        let fetcher = Arc::new(
            StubFetcher::new()
                .with(SEARCH_URL, FetchResponse::ok(search_page(2, items)))
                .with(
                    ISSUE_URL,
                    FetchResponse::ok(
                        r#"<html><body><div class="rating-widget">
                            AA- (RU)
                        </div></body></html>"#,
                    ),
                ),
        );

        let rating = source(fetcher.clone()).lookup("RU000A105XXX").await.unwrap();

        assert_eq!(rating, Rating::Grade("AA-(RU)".to_string()));
        assert_eq!(fetcher.calls(), vec![SEARCH_URL, ISSUE_URL]);
        assert!(fetcher.headers()[0]
            .iter()
            .any(|(k, v)| k == "User-Agent" && v == BROWSER_USER_AGENT));
    }

    #[tokio::test]
    async fn test_no_matching_item_is_not_rated() {
        let items = r#"
            <div class="search-result__item">
                <a class="search-result__item-text" href="/x/">untagged</a>
            </div>
            <div class="search-result__item">
                <div class="tag">Эмитент</div>
                <a class="search-result__item-text" href="/issuers/9/">issuer</a>
            </div>"#;
        let fetcher =
            Arc::new(StubFetcher::new().with(SEARCH_URL, FetchResponse::ok(search_page(2, items))));

        let rating = source(fetcher.clone()).lookup("RU000A105XXX").await.unwrap();

        assert_eq!(rating, Rating::NotRated);
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_zero_results_is_not_rated() {
        let fetcher =
            Arc::new(StubFetcher::new().with(SEARCH_URL, FetchResponse::ok(search_page(0, ""))));
        let rating = source(fetcher).lookup("RU000A105XXX").await.unwrap();
        assert_eq!(rating, Rating::NotRated);
    }

    #[tokio::test]
    async fn test_missing_widget_is_not_rated() {
        let items = r#"<div class="search-result__item"><div class="tag">Выпуск</div>
            <a class="search-result__item-text" href="/ratings/issues/1234/">issue</a></div>"#;
        let fetcher = Arc::new(
            StubFetcher::new()
                .with(SEARCH_URL, FetchResponse::ok(search_page(1, items)))
                .with(ISSUE_URL, FetchResponse::ok("<html><body></body></html>")),
        );
        let rating = source(fetcher).lookup("RU000A105XXX").await.unwrap();
        assert_eq!(rating, Rating::NotRated);
    }

    #[tokio::test]
    async fn test_bad_status_is_error() {
        let fetcher = Arc::new(StubFetcher::new().with(
            SEARCH_URL,
            FetchResponse::with_status(403, Vec::new()),
        ));
        let err = source(fetcher).lookup("RU000A105XXX").await.unwrap_err();
        assert!(matches!(err, RatingError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_missing_counter_is_parse_error() {
        let fetcher = Arc::new(
            StubFetcher::new().with(SEARCH_URL, FetchResponse::ok("<html><body>maintenance</body></html>")),
        );
        let err = source(fetcher).lookup("RU000A105XXX").await.unwrap_err();
        assert!(matches!(err, RatingError::Parse { source_id: "ACRA", .. }));
    }
}
