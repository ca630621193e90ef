use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::convert::{height_to_cm, parse_numeric, Value};

// The site has no semantic ids; cards are located by their literal
// utility-class signatures, matched with attribute-equality selectors.
static IDENTITY_CARD: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"div[class="flex flex-col justify-between h-full px-4 pt-4 overflow-hidden"]"#,
    )
    .unwrap()
});
static IDENTITY_NAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static IDENTITY_POSITION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[class="leading-none text-xl md:text-2xl -mb-px md:mb-0"]"#).unwrap()
});
static IDENTITY_TEAM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[class="text-blue-light hover:underline"]"#).unwrap());

static BIOMETRIC_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"span[class="leading-none whitespace-nowrap"]"#).unwrap());

static COMBINE_SPAN: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"span[class="block font-light text-xs sm:text-sm leading-none"]"#).unwrap()
});

static COLLEGE_FRAGMENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[class="flex items-start space-x-1"]"#).unwrap());
static SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());

static SEASON_ROW: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"tr[class="border-t border-solid border-gray-700"]"#).unwrap()
});
static SEASON_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"span[class="text-xxs md:text-base"]"#).unwrap());

fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>().replace('\n', "").trim().to_string()
}

fn text_or_missing(s: Option<String>) -> Value {
    match s {
        Some(t) if !t.is_empty() => Value::Text(t),
        _ => Value::Missing,
    }
}

/// Identity card: name, positional rank (e.g. "RB12"), team. Each field is
/// individually optional; an absent element is a Missing cell.
pub fn identity(doc: &Html) -> Vec<Value> {
    let card = doc.select(&IDENTITY_CARD).next();
    let field = |sel: &Selector| -> Option<String> {
        card.and_then(|c| c.select(sel).next()).map(element_text)
    };
    vec![
        text_or_missing(field(&IDENTITY_NAME)),
        text_or_missing(field(&IDENTITY_POSITION)),
        text_or_missing(field(&IDENTITY_TEAM)),
    ]
}

/// Biometrics card: height, weight, draft, college, age. The card renders
/// six spans; index 2 is a site label cell and is skipped. Height converts
/// to centimeters, weight/age to integers, draft/college stay raw text for
/// the preprocessing stage.
pub fn biometrics(doc: &Html) -> Vec<Value> {
    let spans: Vec<String> = doc.select(&BIOMETRIC_SPAN).map(element_text).collect();
    if spans.len() < 6 {
        debug!("biometrics card absent ({} spans)", spans.len());
        return vec![Value::Missing; 5];
    }
    vec![
        height_to_cm(&spans[0]),
        parse_numeric(&spans[1]),
        text_or_missing(Some(spans[3].clone())),
        text_or_missing(Some(spans[4].clone())),
        parse_numeric(&spans[5]),
    ]
}

/// Combine metrics card: 40-yard, speed, burst, agility, bench.
pub fn combine(doc: &Html) -> Vec<Value> {
    let spans: Vec<String> = doc.select(&COMBINE_SPAN).map(element_text).collect();
    if spans.len() < 5 {
        debug!("combine card absent ({} spans)", spans.len());
        return vec![Value::Missing; 5];
    }
    spans.iter().take(5).map(|s| parse_numeric(s)).collect()
}

/// College-stats card: one span per fragment; fragments containing a
/// parenthesis are auxiliary annotations, not values, and are discarded.
/// The first four survivors are the position's college stats.
pub fn college(doc: &Html) -> Vec<Value> {
    let cells: Vec<String> = doc
        .select(&COLLEGE_FRAGMENT)
        .filter_map(|frag| frag.select(&SPAN).next().map(element_text))
        .filter(|t| !t.contains('('))
        .collect();
    if cells.len() < 4 {
        debug!("college card absent ({} usable fragments)", cells.len());
        return vec![Value::Missing; 4];
    }
    cells.iter().take(4).map(|s| parse_numeric(s)).collect()
}

/// Season-stats card: the "current" table row. Cells 1 through 8 are the
/// eight per-season stats; a player with no current-season row gets eight
/// Missing values instead of failing.
pub fn season(doc: &Html) -> Vec<Value> {
    let Some(row) = doc.select(&SEASON_ROW).next() else {
        debug!("no current-season row");
        return vec![Value::Missing; 8];
    };
    let cells: Vec<String> = row.select(&SEASON_CELL).map(element_text).collect();
    if cells.len() < 9 {
        debug!("season row truncated ({} cells)", cells.len());
        return vec![Value::Missing; 8];
    }
    cells[1..9].iter().map(|s| parse_numeric(s)).collect()
}

/// All five cards in schema group order.
pub fn extract_cards(doc: &Html) -> [Vec<Value>; 5] {
    [
        identity(doc),
        biometrics(doc),
        combine(doc),
        college(doc),
        season(doc),
    ]
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Html {
        let html = std::fs::read_to_string("tests/fixtures/profile.html").unwrap();
        Html::parse_document(&html)
    }

    #[test]
    fn identity_card_fields() {
        let doc = fixture();
        assert_eq!(
            identity(&doc),
            vec![
                Value::text("Saquon Barkley"),
                Value::text("RB1"),
                Value::text("Philadelphia Eagles"),
            ]
        );
    }

    #[test]
    fn biometrics_card_converts_units() {
        let doc = fixture();
        let values = biometrics(&doc);
        // 6'0" → 72 * 2.54
        assert_eq!(values[0], Value::Float(182.9));
        assert_eq!(values[1], Value::Int(233));
        assert_eq!(values[2], Value::text("1.02"));
        assert_eq!(values[3], Value::text("Penn State"));
        assert_eq!(values[4], Value::Int(27));
    }

    #[test]
    fn combine_card_numeric() {
        let doc = fixture();
        assert_eq!(
            combine(&doc),
            vec![
                Value::Float(4.4),
                Value::Float(110.9),
                Value::Float(130.9),
                Value::Int(11),
                Value::Int(29),
            ]
        );
    }

    #[test]
    fn college_card_discards_annotations() {
        let doc = fixture();
        assert_eq!(
            college(&doc),
            vec![
                Value::Float(45.4),
                Value::Float(5.8),
                Value::Float(19.9),
                Value::Float(123.7),
            ]
        );
    }

    #[test]
    fn season_card_takes_cells_one_through_eight() {
        let doc = fixture();
        assert_eq!(
            season(&doc),
            vec![
                Value::Int(16),
                Value::Int(345),
                Value::Int(2005),
                Value::Float(5.8),
                Value::Int(33),
                Value::Int(278),
                Value::Int(15),
                Value::Float(22.2),
            ]
        );
    }

    #[test]
    fn absent_season_row_yields_eight_missing() {
        let doc = Html::parse_document("<html><body><table></table></body></html>");
        assert_eq!(season(&doc), vec![Value::Missing; 8]);
    }

    #[test]
    fn absent_cards_yield_missing_groups() {
        let doc = Html::parse_document("<html><body></body></html>");
        assert_eq!(identity(&doc), vec![Value::Missing; 3]);
        assert_eq!(biometrics(&doc), vec![Value::Missing; 5]);
        assert_eq!(combine(&doc), vec![Value::Missing; 5]);
        assert_eq!(college(&doc), vec![Value::Missing; 4]);
    }
}
