//! Heuristic insight composer.
//!
//! Labels a market snapshot as bullish, bearish or neutral and writes a short
//! headline plus a rationale that can quote OCR text captured from the
//! user's screen.

use chrono::{DateTime, Utc};
use lens_core::{InsightResponse, MarketSummary, Sentiment};

/// Percent move above which a snapshot reads as bullish (and below the
/// negation of which it reads as bearish).
pub const SENTIMENT_THRESHOLD_PERCENT: f64 = 1.0;

/// Longest OCR excerpt quoted in a rationale, ellipsis included.
pub const CONTEXT_WIDTH: usize = 160;

const ELLIPSIS: &str = "…";

pub fn determine_sentiment(change_percent: f64) -> Sentiment {
    if change_percent > SENTIMENT_THRESHOLD_PERCENT {
        Sentiment::Bullish
    } else if change_percent < -SENTIMENT_THRESHOLD_PERCENT {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    }
}

/// `"AAPL up 1.25% at $175.42"`. The direction follows the sign of the
/// absolute change; the percentage is always printed as a magnitude.
pub fn craft_headline(summary: &MarketSummary) -> String {
    let direction = if summary.change >= 0.0 { "up" } else { "down" };
    format!(
        "{} {} {:.2}% at ${:.2}",
        summary.symbol,
        direction,
        summary.change_percent.abs(),
        summary.price
    )
}

pub fn build_rationale(summary: &MarketSummary, ocr_text: Option<&str>) -> String {
    let mut pieces = vec![
        format!(
            "Last price ${:.2} ({:+.2}, {:+.2}%).",
            summary.price, summary.change, summary.change_percent
        ),
        format!(
            "Session range ${:.2} – ${:.2}.",
            summary.day_low, summary.day_high
        ),
    ];

    if let Some(volume) = summary.volume.filter(|v| *v > 0) {
        pieces.push(format!("Latest volume {}.", format_thousands(volume)));
    }

    if let Some(context) = ocr_text.and_then(collapse_whitespace) {
        pieces.push(format!("OCR context: {}", shorten(&context, CONTEXT_WIDTH)));
    }

    pieces.join(" ")
}

/// Compose an insight stamped with the current time.
pub fn generate_insight(summary: MarketSummary, ocr_text: Option<&str>) -> InsightResponse {
    compose(summary, ocr_text, Utc::now())
}

pub fn compose(
    summary: MarketSummary,
    ocr_text: Option<&str>,
    generated_at: DateTime<Utc>,
) -> InsightResponse {
    let sentiment = determine_sentiment(summary.change_percent);
    let headline = craft_headline(&summary);
    let rationale = build_rationale(&summary, ocr_text);
    tracing::debug!("{}: {} ({})", summary.symbol, headline, sentiment);

    InsightResponse {
        ticker: summary.symbol.clone(),
        headline,
        rationale,
        sentiment,
        timestamp: generated_at,
        market: summary,
    }
}

/// Collapse every whitespace run to a single space. `None` when nothing is left.
fn collapse_whitespace(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Cut `text` (already whitespace-collapsed) to at most `width` characters,
/// dropping whole words and marking the cut with an ellipsis.
fn shorten(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }

    let budget = width.saturating_sub(ELLIPSIS.chars().count());
    let mut kept = String::new();
    let mut kept_len = 0;
    for word in text.split(' ') {
        let word_len = word.chars().count();
        let needed = if kept.is_empty() { word_len } else { word_len + 1 };
        if kept_len + needed > budget {
            break;
        }
        if !kept.is_empty() {
            kept.push(' ');
        }
        kept.push_str(word);
        kept_len += needed;
    }

    kept.push_str(ELLIPSIS);
    kept
}

fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_summary() -> MarketSummary {
        MarketSummary {
            symbol: "TEST".to_string(),
            price: 110.0,
            change: 10.0,
            change_percent: 10.0,
            day_high: 112.0,
            day_low: 98.0,
            volume: Some(123_456),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 3, 15, 59, 0).unwrap(),
        }
    }

    #[test]
    fn test_sentiment_thresholds() {
        assert_eq!(determine_sentiment(1.5), Sentiment::Bullish);
        assert_eq!(determine_sentiment(-1.5), Sentiment::Bearish);
        assert_eq!(determine_sentiment(1.0), Sentiment::Neutral);
        assert_eq!(determine_sentiment(-1.0), Sentiment::Neutral);
        assert_eq!(determine_sentiment(0.0), Sentiment::Neutral);
        assert_eq!(determine_sentiment(1.01), Sentiment::Bullish);
    }

    #[test]
    fn test_reference_insight() {
        let generated_at = Utc.with_ymd_and_hms(2024, 5, 3, 16, 5, 0).unwrap();
        let insight = compose(sample_summary(), None, generated_at);

        assert_eq!(insight.ticker, "TEST");
        assert_eq!(insight.sentiment, Sentiment::Bullish);
        assert_eq!(insight.headline, "TEST up 10.00% at $110.00");
        assert_eq!(
            insight.rationale,
            "Last price $110.00 (+10.00, +10.00%). Session range $98.00 – $112.00. Latest volume 123,456."
        );
        assert_eq!(insight.timestamp, generated_at);
        assert_eq!(insight.market, sample_summary());
    }

    #[test]
    fn test_headline_direction_follows_change_sign() {
        let summary = MarketSummary {
            price: 97.5,
            change: -2.5,
            change_percent: -2.5,
            ..sample_summary()
        };
        assert_eq!(craft_headline(&summary), "TEST down 2.50% at $97.50");

        // a tiny loss that rounds to 0.00% still reads as down
        let summary = MarketSummary {
            change: -0.001,
            change_percent: 0.0,
            ..sample_summary()
        };
        assert_eq!(craft_headline(&summary), "TEST down 0.00% at $110.00");

        let summary = MarketSummary {
            change: 0.0,
            change_percent: 0.0,
            ..sample_summary()
        };
        assert!(craft_headline(&summary).starts_with("TEST up "));
    }

    #[test]
    fn test_rationale_shows_explicit_signs() {
        let summary = MarketSummary {
            price: 95.0,
            change: -5.0,
            change_percent: -5.0,
            volume: None,
            ..sample_summary()
        };
        assert_eq!(
            build_rationale(&summary, None),
            "Last price $95.00 (-5.00, -5.00%). Session range $98.00 – $112.00."
        );
    }

    #[test]
    fn test_volume_sentence_only_when_present() {
        let mut summary = sample_summary();
        assert!(build_rationale(&summary, None).contains("Latest volume 123,456."));

        summary.volume = None;
        assert!(!build_rationale(&summary, None).contains("Latest volume"));

        summary.volume = Some(0);
        assert!(!build_rationale(&summary, None).contains("Latest volume"));
    }

    #[test]
    fn test_ocr_context_is_collapsed() {
        let rationale = build_rationale(&sample_summary(), Some("  AAPL\n\n  breaks\tout  "));
        assert!(rationale.ends_with(" OCR context: AAPL breaks out"));
    }

    #[test]
    fn test_blank_ocr_context_is_skipped() {
        let rationale = build_rationale(&sample_summary(), Some(" \n\t "));
        assert!(!rationale.contains("OCR context"));
        let rationale = build_rationale(&sample_summary(), Some(""));
        assert!(!rationale.contains("OCR context"));
    }

    #[test]
    fn test_long_context_is_truncated_on_word_boundary() {
        let words: Vec<String> = (0..60).map(|i| format!("word{}", i)).collect();
        let text = words.join(" ");
        let short = shorten(&text, CONTEXT_WIDTH);

        assert!(short.chars().count() <= CONTEXT_WIDTH);
        assert!(short.ends_with(ELLIPSIS));
        let body = short.trim_end_matches(ELLIPSIS);
        for word in body.split(' ') {
            assert!(words.iter().any(|w| w == word), "split word {:?}", word);
        }
        // one more word would not have fit
        let next = words[body.split(' ').count()].chars().count();
        assert!(body.chars().count() + 1 + next + 1 > CONTEXT_WIDTH);
    }

    #[test]
    fn test_context_at_width_is_untouched() {
        let text = "x".repeat(CONTEXT_WIDTH);
        assert_eq!(shorten(&text, CONTEXT_WIDTH), text);
    }

    #[test]
    fn test_single_oversized_word_collapses_to_ellipsis() {
        let text = "y".repeat(CONTEXT_WIDTH + 10);
        assert_eq!(shorten(&text, CONTEXT_WIDTH), ELLIPSIS);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(123_456), "123,456");
        assert_eq!(format_thousands(12_345_678), "12,345,678");
    }
}
