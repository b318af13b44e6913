//! Human-facing text for alerts, firings and heartbeats.

use chrono::Local;
use corelib::{Alert, Direction, Pair};
use engine::{Firing, HeartbeatReport};

pub const CROSS_UP_EMOJI: &str = "📈";
pub const CROSS_DOWN_EMOJI: &str = "📉";
pub const WARNING_EMOJI: &str = "⚠️";
pub const ONLINE_EMOJI: &str = "🟢";
pub const OFFLINE_EMOJI: &str = "🔴";

const SUBSCRIPT_DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];

/// Leading zeros after the decimal point beyond which the count is written
/// as a subscript: `0.00001234` → `0.0₄1234`.
const MAX_PLAIN_ZEROS: usize = 3;

/// Render a price compactly, keeping tiny prices readable.
pub fn format_alert_price(price: f64) -> String {
    if price >= 1.0 || price == 0.0 || !price.is_finite() || price < 0.0 {
        return general(price);
    }

    let fixed = format!("{price:.15}");
    let decimals = fixed.split_once('.').map(|(_, d)| d).unwrap_or("");
    let significant = decimals.trim_start_matches('0');
    let zeros = decimals.len() - significant.len();
    let digits = significant.trim_end_matches('0');

    // Below the fixed precision there is nothing left to subscript.
    if digits.is_empty() {
        return general(price);
    }

    if zeros > MAX_PLAIN_ZEROS {
        let subscript: String = zeros
            .to_string()
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| SUBSCRIPT_DIGITS[d as usize])
            .collect();
        return format!("0.0{subscript}{digits}");
    }

    general(price)
}

/// Six significant digits, trailing zeros dropped, exponent form only for
/// very large or very small magnitudes.
fn general(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }

    let sci = format!("{value:.5e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if !(-4..6).contains(&exp) {
        let mantissa = strip_zeros(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exp.abs());
    }

    let decimals = (5 - exp).max(0) as usize;
    strip_zeros(&format!("{value:.decimals$}")).to_string()
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

pub fn direction_emoji(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => CROSS_UP_EMOJI,
        Direction::Down => CROSS_DOWN_EMOJI,
    }
}

/// `BTC : 100000 USDT (BTC/USDT)`
pub fn alert_label(pair: &Pair, threshold: f64) -> String {
    format!(
        "{} : {} {} ({})",
        pair.base,
        format_alert_price(threshold),
        pair.quote,
        pair.id()
    )
}

pub fn alert_line(alert: &Alert) -> String {
    format!("{}  {}", alert.id, alert_label(&alert.pair, alert.threshold))
}

pub fn crossing_message(firing: &Firing, mention: Option<&str>) -> String {
    let prefix = mention.map(|m| format!("<@{m}> ! ")).unwrap_or_default();
    format!(
        "{prefix}{} pair has crossed the price of {} ! {}",
        firing.alert.pair.symbol(),
        format_alert_price(firing.alert.threshold),
        direction_emoji(firing.direction)
    )
}

pub fn heartbeat_message(report: &HeartbeatReport) -> String {
    let age = report
        .last_tick_age
        .map(|d| format!("{}s", d.as_secs()))
        .unwrap_or_else(|| "never".to_string());
    let status = if report.stream_state.is_live() {
        ONLINE_EMOJI
    } else {
        OFFLINE_EMOJI
    };

    format!(
        "```\n[{}]\n\nlast_websocket_message_age = {age}\npairs_number = {}\nwebsocket = {status} {}\n```",
        report.at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
        report.watched_pairs,
        report.stream_state,
    )
}

pub fn fatal_message(message: &str, mention: Option<&str>) -> String {
    let who = mention.map(|m| format!(" <@{m}>")).unwrap_or_default();
    format!("{WARNING_EMOJI}{who}\n### An error has occurred :\n```\n{message}```")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use engine::StreamState;
    use std::time::Duration;

    #[test]
    fn prices_above_one_drop_trailing_zeros() {
        assert_eq!(format_alert_price(100_000.0), "100000");
        assert_eq!(format_alert_price(2_850.5), "2850.5");
        assert_eq!(format_alert_price(1.0), "1");
    }

    #[test]
    fn plain_fractions_stay_plain() {
        assert_eq!(format_alert_price(0.5), "0.5");
        assert_eq!(format_alert_price(0.001234), "0.001234");
    }

    #[test]
    fn tiny_prices_use_subscript_zero_count() {
        assert_eq!(format_alert_price(0.000_012_34), "0.0₄1234");
        assert_eq!(format_alert_price(0.000_000_000_015), "0.0₁₀15");
    }

    #[test]
    fn prices_below_fixed_precision_keep_their_digits() {
        assert_eq!(format_alert_price(2.5e-16), "2.5e-16");
        assert_eq!(format_alert_price(1e-15), "0.0₁₄1");
    }

    #[test]
    fn huge_prices_use_exponent_form() {
        assert_eq!(format_alert_price(1_234_567.0), "1.23457e+06");
    }

    #[test]
    fn crossing_message_mentions_pair_price_and_direction() {
        let firing = Firing {
            alert: Alert::new(Pair::new("BTC", "USDT"), 100_000.0, None),
            direction: Direction::Up,
            previous: 99_950.0,
            price: 100_010.0,
            at: Utc::now(),
        };

        assert_eq!(
            crossing_message(&firing, None),
            "BTCUSDT pair has crossed the price of 100000 ! 📈"
        );
        assert!(crossing_message(&firing, Some("42")).starts_with("<@42> ! BTCUSDT"));
    }

    #[test]
    fn heartbeat_reports_never_before_first_tick() {
        let mut report = HeartbeatReport {
            at: Utc::now(),
            last_tick_age: None,
            watched_pairs: 3,
            stream_state: StreamState::Idle,
        };

        let text = heartbeat_message(&report);
        assert!(text.contains("last_websocket_message_age = never"));
        assert!(text.contains("pairs_number = 3"));
        assert!(text.contains(OFFLINE_EMOJI));

        report.last_tick_age = Some(Duration::from_millis(12_700));
        report.stream_state = StreamState::Streaming;
        let text = heartbeat_message(&report);
        assert!(text.contains("last_websocket_message_age = 12s"));
        assert!(text.contains(ONLINE_EMOJI));
    }

    #[test]
    fn alert_label_reads_naturally() {
        assert_eq!(
            alert_label(&Pair::new("PEPE", "USDT"), 0.000_012_34),
            "PEPE : 0.0₄1234 USDT (PEPE/USDT)"
        );
    }
}
