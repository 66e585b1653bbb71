//! Rendering of the launch listing.
//!
//! Produces the HTML listing page, the static error page, and plain-text
//! cards for terminal output. Rendering is a pure function of the launches
//! handed in; it never fetches anything.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::launch::Launch;

/// Border and glow colour for successful launches.
pub const SUCCESS_COLOR: &str = "#52C778";

/// Border and glow colour for failed or unknown launches.
pub const FAILURE_COLOR: &str = "#D94C68";

/// Heading of the static error page.
pub const ERROR_TEXT: &str = "ERROR";

const STYLES: &str = r"
body { margin: 0; background: #1b1a21; font-family: sans-serif; }
h1.page-title { margin: 0; padding: 1em 0; color: #e1e5f0; font-size: 64px; text-align: center; }
h1.error { margin: 0; color: #e1e5f0; font-size: 64px; text-align: center; line-height: 100vh; }
.cards { display: flex; flex-wrap: wrap; justify-content: center; margin: 0 1em 1em; }
.card { display: flex; flex-direction: column; justify-content: space-between; width: 27vw; padding: 1em; margin-bottom: 1.3em; color: #e1e5f0; background: #25232e; border: 1px solid; border-radius: 20px; }
.card:not(:nth-child(3n)) { margin-right: 1.3em; }
.card-top { display: flex; justify-content: space-between; align-items: center; }
.flight-name { margin-right: 1em; font-size: 32px; font-weight: 600; }
.patch { height: 3em; }
.details { margin: 1em 0 1.5em; font-size: 18px; line-height: 1.3em; }
.flight-date { font-size: 18px; }
@media (max-width: 1366px) {
  h1.page-title, h1.error { font-size: 48px; }
  .card { width: 42vw; }
  .card:not(:nth-child(3n)) { margin-right: 0; }
  .card:not(:nth-child(2n)) { margin-right: 1.3em; }
  .flight-name { font-size: 24px; }
  .details, .flight-date { font-size: 16px; }
}
@media (max-width: 1000px) {
  .card { width: 86vw; }
  .card:not(:nth-child(2n)) { margin-right: 0; }
}
";

/// Accent colour for a launch card.
#[must_use]
pub fn card_color(launch: &Launch) -> &'static str {
    if launch.is_success() {
        SUCCESS_COLOR
    } else {
        FAILURE_COLOR
    }
}

/// Format a launch time as `DD.MM.YYYY HH:MM` (UTC).
#[must_use]
pub fn format_flight_date(date: &DateTime<Utc>) -> String {
    date.format("%d.%m.%Y %H:%M").to_string()
}

/// Escape text for inclusion in HTML content or a quoted attribute.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{STYLES}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

/// Render one launch as an HTML card.
#[must_use]
pub fn render_card(launch: &Launch) -> String {
    let color = card_color(launch);
    let mut card = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(
        card,
        "<div class=\"card\" id=\"{}\" style=\"border-color: {color}; box-shadow: 0 0 15px {color};\">",
        escape_html(&launch.id)
    );
    card.push_str("<div>\n<div class=\"card-top\">\n");
    let _ = writeln!(
        card,
        "<div class=\"flight-name\">{}</div>",
        escape_html(&launch.name)
    );
    if let Some(patch) = launch.patch_url() {
        let _ = writeln!(
            card,
            "<img class=\"patch\" src=\"{}\" alt=\"{} patch\">",
            escape_html(patch),
            escape_html(&launch.name)
        );
    }
    card.push_str("</div>\n");
    let _ = writeln!(
        card,
        "<div class=\"details\">{}</div>\n</div>",
        escape_html(launch.details())
    );
    let _ = writeln!(
        card,
        "<div class=\"flight-date\">Flight date: {}</div>\n</div>",
        format_flight_date(&launch.date_utc)
    );
    card
}

/// Render the listing page.
#[must_use]
pub fn render_index(title: &str, launches: &[Launch]) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1 class=\"page-title\">{}</h1>", escape_html(title));
    body.push_str("<div class=\"cards\">\n");
    for launch in launches {
        body.push_str(&render_card(launch));
    }
    body.push_str("</div>\n");
    document(title, &body)
}

/// Render the static error page.
#[must_use]
pub fn render_error_page() -> String {
    document(ERROR_TEXT, &format!("<h1 class=\"error\">{ERROR_TEXT}</h1>\n"))
}

/// Render one launch as a plain-text card.
#[must_use]
pub fn render_card_text(launch: &Launch) -> String {
    let outcome = match launch.success {
        Some(true) => "success",
        Some(false) => "failure",
        None => "unknown",
    };
    let mut text = format!("{} [{outcome}]\n", launch.name);
    if !launch.details().is_empty() {
        let _ = writeln!(text, "  {}", launch.details());
    }
    if let Some(patch) = launch.patch_url() {
        let _ = writeln!(text, "  Patch: {patch}");
    }
    let _ = writeln!(text, "  Flight date: {}", format_flight_date(&launch.date_utc));
    text
}

/// Render launches as a fixed-width table.
#[must_use]
pub fn render_table(launches: &[Launch]) -> String {
    let name_width = launches
        .iter()
        .map(|l| l.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut table = format!("{:<4}  {:<name_width$}  {:<16}  OUTCOME\n", "#", "NAME", "FLIGHT DATE");
    for (index, launch) in launches.iter().enumerate() {
        let outcome = match launch.success {
            Some(true) => "success",
            Some(false) => "failure",
            None => "-",
        };
        let _ = writeln!(
            table,
            "{:<4}  {:<name_width$}  {:<16}  {outcome}",
            index + 1,
            launch.name,
            format_flight_date(&launch.date_utc)
        );
    }
    table
}
