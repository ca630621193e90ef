use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::config::ScrapeConfig;
use crate::error::{PipelineError, Result};
use crate::fetch::PageFetcher;
use crate::schema::Position;
use crate::store;

const SITE_ORIGIN: &str = "https://www.playerprofiler.com";

// The site marks player rows with this literal utility-class signature; the
// first span inside each anchor holds the popularity index ("-" = none).
static PLAYER_ANCHOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"a[class="flex items-center justify-between space-x-3 px-4 md:px-8 pt-2"][href]"#,
    )
    .unwrap()
});
static SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());

pub fn listing_url(position: Position) -> String {
    format!("{}/position/{}", SITE_ORIGIN, position.slug())
}

/// Discover profile links for one position.
///
/// With `reuse_links` set, loads the previously persisted list and only
/// falls back to a live fetch when that file is unreadable. A live fetch
/// always re-persists the (possibly filtered) list.
pub async fn discover(
    fetcher: &PageFetcher,
    position: Position,
    cfg: &ScrapeConfig,
) -> Result<Vec<String>> {
    if cfg.reuse_links {
        match store::load_links(position) {
            Ok(links) if !links.is_empty() => {
                info!("reusing {} saved links for {}", links.len(), position);
                return Ok(links);
            }
            Ok(_) => warn!("saved link list for {} is empty, scraping now", position),
            Err(e) => warn!("could not load saved links ({}), scraping now", e),
        }
    }

    let url = listing_url(position);
    let html = fetcher.fetch_html(&url).await?;
    // A listing with no recognizable anchors is a layout change, not a
    // fatal condition: log it and persist an empty list so callers degrade
    // to "nothing found".
    let links = match parse_player_links(&html, cfg.pop_index) {
        Ok(links) => links,
        Err(e) => {
            warn!("{}", e);
            Vec::new()
        }
    };
    info!("retrieved {} players from {}", links.len(), position);
    info!("popularity-index filtering set to: {}", cfg.pop_index);

    store::save_links(position, &links)?;
    Ok(links)
}

/// Pull profile URLs out of a listing page. No anchors matching the
/// expected signature is a `Parse` error; a page where every anchor is
/// filtered out by the popularity index is an empty Ok.
pub fn parse_player_links(html: &str, pop_index: bool) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();
    let mut matched = 0usize;

    for anchor in document.select(&PLAYER_ANCHOR) {
        matched += 1;
        if pop_index {
            let popularity = anchor
                .select(&SPAN)
                .next()
                .map(|s| s.text().collect::<String>().trim().to_string());
            if popularity.as_deref() == Some("-") {
                continue;
            }
        }
        if let Some(href) = anchor.value().attr("href") {
            links.push(absolutize(href));
        }
    }

    if matched == 0 {
        return Err(PipelineError::Parse(
            "no player anchors matched the listing signature".to_string(),
        ));
    }
    Ok(links)
}

fn absolutize(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", SITE_ORIGIN, href)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
        <a class="flex items-center justify-between space-x-3 px-4 md:px-8 pt-2"
           href="/nfl/saquon-barkley/"><span>97</span><span>Saquon Barkley</span></a>
        <a class="flex items-center justify-between space-x-3 px-4 md:px-8 pt-2"
           href="https://www.playerprofiler.com/nfl/bijan-robinson/"><span>95</span></a>
        <a class="flex items-center justify-between space-x-3 px-4 md:px-8 pt-2"
           href="/nfl/obscure-player/"><span>-</span></a>
        <a class="something-else" href="/nfl/not-a-player-row/"><span>12</span></a>
        </body></html>"#;

    #[test]
    fn extracts_and_absolutizes_profile_links() {
        let links = parse_player_links(LISTING, false).unwrap();
        assert_eq!(
            links,
            vec![
                "https://www.playerprofiler.com/nfl/saquon-barkley/",
                "https://www.playerprofiler.com/nfl/bijan-robinson/",
                "https://www.playerprofiler.com/nfl/obscure-player/",
            ]
        );
    }

    #[test]
    fn popularity_filter_drops_dash_spans() {
        let links = parse_player_links(LISTING, true).unwrap();
        assert_eq!(links.len(), 2);
        assert!(!links.iter().any(|l| l.contains("obscure-player")));
    }

    #[test]
    fn layout_change_is_parse_error() {
        let err =
            parse_player_links("<html><body><p>redesigned</p></body></html>", true).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }

    #[test]
    fn all_filtered_is_empty_ok() {
        let html = r#"<a class="flex items-center justify-between space-x-3 px-4 md:px-8 pt-2"
           href="/nfl/obscure-player/"><span>-</span></a>"#;
        assert_eq!(parse_player_links(html, true).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn listing_url_embeds_slug() {
        assert_eq!(
            listing_url(Position::Quarterback),
            "https://www.playerprofiler.com/position/quarterback"
        );
    }
}
