use rust_decimal::Decimal;

pub const UNAVAILABLE_PRICE: &str = "N/A";
pub const NEUTRAL_COLOR: &str = "gray";

/// The four indices carried by every briefing, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketIndex {
    Kospi,
    Kosdaq,
    Sp500,
    DowJones,
}

impl MarketIndex {
    pub const ALL: [MarketIndex; 4] = [
        MarketIndex::Kospi,
        MarketIndex::Kosdaq,
        MarketIndex::Sp500,
        MarketIndex::DowJones,
    ];

    pub fn ticker(self) -> &'static str {
        match self {
            MarketIndex::Kospi => "^KS11",
            MarketIndex::Kosdaq => "^KQ11",
            MarketIndex::Sp500 => "^GSPC",
            MarketIndex::DowJones => "^DJI",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MarketIndex::Kospi => "KOSPI",
            MarketIndex::Kosdaq => "KOSDAQ",
            MarketIndex::Sp500 => "S&P 500",
            MarketIndex::DowJones => "Dow Jones",
        }
    }

    /// Name used inside the Korean prompt text.
    pub fn prompt_name(self) -> &'static str {
        match self {
            MarketIndex::Kospi => "코스피",
            MarketIndex::Kosdaq => "코스닥",
            MarketIndex::Sp500 => "S&P500",
            MarketIndex::DowJones => "다우존스",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn from_change(change: Decimal) -> Self {
        if change > Decimal::ZERO {
            Trend::Up
        } else if change < Decimal::ZERO {
            Trend::Down
        } else {
            Trend::Flat
        }
    }

    // KRX convention: red for gains, blue for losses.
    pub fn color(self) -> &'static str {
        match self {
            Trend::Up => "red",
            Trend::Down => "blue",
            Trend::Flat => NEUTRAL_COLOR,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
            Trend::Flat => "-",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Flat => "flat",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub ticker: String,
    pub latest_price: Decimal,
    pub prior_price: Decimal,
    pub absolute_change: Decimal,
    pub percent_change: Decimal,
    pub trend: Trend,
    pub display_color: &'static str,
    pub glyph: &'static str,
}

impl Quote {
    /// Builds a quote from the two most recent closes. Closes are rounded to cents first and the
    /// trend is the sign of the difference of the rounded closes. Returns `None` when the prior
    /// close is zero, since the percentage move is undefined.
    pub fn from_closes(ticker: &str, latest: Decimal, prior: Decimal) -> Option<Self> {
        let latest_price = latest.round_dp(2);
        let prior_price = prior.round_dp(2);
        if prior_price.is_zero() {
            return None;
        }

        let absolute_change = latest_price - prior_price;
        let percent_change =
            (absolute_change / prior_price * Decimal::ONE_HUNDRED).round_dp(2);
        let trend = Trend::from_change(absolute_change);

        Some(Self {
            ticker: ticker.to_string(),
            latest_price,
            prior_price,
            absolute_change,
            percent_change,
            trend,
            display_color: trend.color(),
            glyph: trend.glyph(),
        })
    }

    pub fn price_display(&self) -> String {
        group_thousands(self.latest_price)
    }

    /// Signed percentage with two decimals, e.g. `+0.78%`. The sign follows the trend, so a
    /// loss that rounds to zero still reads `-0.00%`.
    pub fn percent_display(&self) -> String {
        let sign = match self.trend {
            Trend::Down => '-',
            Trend::Up | Trend::Flat => '+',
        };
        format!("{sign}{:.2}%", self.percent_change.abs())
    }

    /// Glyph, unsigned absolute change and signed percentage, e.g. `▲ 20.45 (+0.78%)`.
    pub fn change_display(&self) -> String {
        format!(
            "{} {:.2} ({})",
            self.glyph,
            self.absolute_change.abs(),
            self.percent_display()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Live(Quote),
    Unavailable,
}

/// One index panel of the briefing. Always renderable: an index whose data could not be
/// fetched carries `Reading::Unavailable` and displays as `N/A`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexFact {
    pub index: MarketIndex,
    pub reading: Reading,
}

impl IndexFact {
    pub fn unavailable(index: MarketIndex) -> Self {
        Self {
            index,
            reading: Reading::Unavailable,
        }
    }

    pub fn name(&self) -> &'static str {
        self.index.display_name()
    }

    pub fn quote(&self) -> Option<&Quote> {
        match &self.reading {
            Reading::Live(q) => Some(q),
            Reading::Unavailable => None,
        }
    }

    pub fn price_display(&self) -> String {
        self.quote()
            .map(Quote::price_display)
            .unwrap_or_else(|| UNAVAILABLE_PRICE.to_string())
    }

    pub fn change_display(&self) -> String {
        self.quote().map(Quote::change_display).unwrap_or_default()
    }

    pub fn color(&self) -> &'static str {
        self.quote().map(|q| q.display_color).unwrap_or(NEUTRAL_COLOR)
    }

    pub fn trend_label(&self) -> &'static str {
        self.quote().map(|q| q.trend.label()).unwrap_or("")
    }

    /// Price and move as one line, e.g. `2,650.55 ▲ 20.45 (+0.78%)`, or `N/A`.
    pub fn summary(&self) -> String {
        match self.quote() {
            Some(q) => format!("{} {}", q.price_display(), q.change_display()),
            None => UNAVAILABLE_PRICE.to_string(),
        }
    }
}

/// Turns a close history (oldest first) into an index fact. Never fails: fewer than two
/// sessions, a zero prior close or a data-source error all yield the `N/A` placeholder.
pub fn normalize(index: MarketIndex, closes: anyhow::Result<Vec<Decimal>>) -> IndexFact {
    let closes = match closes {
        Ok(closes) => closes,
        Err(err) => {
            tracing::warn!(ticker = index.ticker(), error = %err, "quote fetch failed; using placeholder");
            return IndexFact::unavailable(index);
        }
    };

    let [.., prior, latest] = closes.as_slice() else {
        tracing::warn!(
            ticker = index.ticker(),
            sessions = closes.len(),
            "fewer than 2 sessions; using placeholder"
        );
        return IndexFact::unavailable(index);
    };

    match Quote::from_closes(index.ticker(), *latest, *prior) {
        Some(quote) => IndexFact {
            index,
            reading: Reading::Live(quote),
        },
        None => {
            tracing::warn!(ticker = index.ticker(), "prior close is zero; using placeholder");
            IndexFact::unavailable(index)
        }
    }
}

/// Formats with two decimals and comma-grouped integer digits, e.g. `38,654.42`.
pub fn group_thousands(value: Decimal) -> String {
    let formatted = format!("{:.2}", value.abs().round_dp(2));
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i != 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value.is_sign_negative() && !value.is_zero() { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn kospi_gain_renders_red_up_arrow() {
        let fact = normalize(MarketIndex::Kospi, Ok(vec![dec!(2630.10), dec!(2650.55)]));
        let quote = fact.quote().unwrap();

        assert_eq!(quote.absolute_change, dec!(20.45));
        assert_eq!(quote.percent_change, dec!(0.78));
        assert_eq!(quote.trend, Trend::Up);
        assert_eq!(quote.display_color, "red");
        assert_eq!(quote.glyph, "▲");
        assert_eq!(quote.change_display(), "▲ 20.45 (+0.78%)");
        assert_eq!(fact.price_display(), "2,650.55");
    }

    #[test]
    fn loss_is_blue_with_unsigned_change() {
        let quote = Quote::from_closes("^GSPC", dec!(4950.00), dec!(5000.00)).unwrap();
        assert_eq!(quote.trend, Trend::Down);
        assert_eq!(quote.display_color, "blue");
        assert_eq!(quote.change_display(), "▼ 50.00 (-1.00%)");
    }

    #[test]
    fn unchanged_close_is_flat_gray() {
        let quote = Quote::from_closes("^DJI", dec!(38654.42), dec!(38654.42)).unwrap();
        assert_eq!(quote.trend, Trend::Flat);
        assert_eq!(quote.display_color, "gray");
        assert_eq!(quote.change_display(), "- 0.00 (+0.00%)");
        assert_eq!(quote.price_display(), "38,654.42");
    }

    #[test]
    fn tiny_move_is_not_flat() {
        let quote = Quote::from_closes("^KQ11", dec!(850.01), dec!(850.00)).unwrap();
        assert_eq!(quote.trend, Trend::Up);
        assert_eq!(quote.percent_display(), "+0.00%");
    }

    #[test]
    fn tiny_loss_keeps_negative_sign() {
        let quote = Quote::from_closes("^KS11", dec!(9999.99), dec!(10000.00)).unwrap();
        assert_eq!(quote.trend, Trend::Down);
        assert_eq!(quote.change_display(), "▼ 0.01 (-0.00%)");
    }

    #[test]
    fn sub_cent_move_is_flat_after_rounding_closes() {
        let fact = normalize(MarketIndex::Kospi, Ok(vec![dec!(2650.549), dec!(2650.551)]));
        let quote = fact.quote().unwrap();
        assert_eq!(quote.latest_price, quote.prior_price);
        assert_eq!(quote.absolute_change, dec!(0));
        assert_eq!(quote.trend, Trend::Flat);
    }

    #[test]
    fn uses_last_two_of_longer_history() {
        let fact = normalize(
            MarketIndex::Kosdaq,
            Ok(vec![dec!(800), dec!(810), dec!(805.5), dec!(812.25)]),
        );
        let quote = fact.quote().unwrap();
        assert_eq!(quote.prior_price, dec!(805.50));
        assert_eq!(quote.latest_price, dec!(812.25));
    }

    #[test]
    fn single_session_degrades_to_placeholder() {
        let fact = normalize(MarketIndex::Kospi, Ok(vec![dec!(2650.55)]));
        assert_eq!(fact.reading, Reading::Unavailable);
        assert_eq!(fact.price_display(), "N/A");
        assert_eq!(fact.change_display(), "");
        assert_eq!(fact.color(), NEUTRAL_COLOR);
        assert_eq!(fact.trend_label(), "");
    }

    #[test]
    fn source_error_degrades_to_placeholder() {
        let fact = normalize(MarketIndex::Sp500, Err(anyhow::anyhow!("HTTP 500")));
        assert_eq!(fact, IndexFact::unavailable(MarketIndex::Sp500));
        assert_eq!(fact.summary(), "N/A");
    }

    #[test]
    fn zero_prior_close_degrades_to_placeholder() {
        let fact = normalize(MarketIndex::DowJones, Ok(vec![dec!(0), dec!(10)]));
        assert_eq!(fact.reading, Reading::Unavailable);
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(dec!(0.5)), "0.50");
        assert_eq!(group_thousands(dec!(999.99)), "999.99");
        assert_eq!(group_thousands(dec!(1000)), "1,000.00");
        assert_eq!(group_thousands(dec!(1234567.891)), "1,234,567.89");
        assert_eq!(group_thousands(dec!(-2500.1)), "-2,500.10");
    }
}
