//! Dashboard page rendering.
//!
//! Produces one self-contained HTML document: the fetch form, banners, an
//! expandable article list and two inline SVG charts. Every string that came
//! from the user or the API is escaped before it is written.

use crate::models::{Banner, BannerLevel, DashboardState, Report, SearchSection, TopStoriesSection};
use crate::utils::scaled;
use crate::web::DashboardQuery;
use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::{self, Write};

const CHART_W: usize = 760;
const CHART_H: usize = 380;
const MARGIN_LEFT: usize = 60;
const MARGIN_RIGHT: usize = 20;
const MARGIN_TOP: usize = 40;
const MARGIN_BOTTOM: usize = 120;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; background: #f8f9fa; margin: 0; color: #2c3e50; }
header { background: #2c3e50; color: #fff; padding: 1rem 2rem; }
h1 { margin: 0; text-align: center; }
form { display: flex; flex-wrap: wrap; gap: 1rem; align-items: end; padding: 1rem 2rem; background: #fff; border-bottom: 1px solid #dee2e6; }
label { display: flex; flex-direction: column; font-size: .85rem; gap: .25rem; }
main { padding: 1rem 2rem; }
.banner { padding: .6rem 1rem; border-radius: 5px; margin: .5rem 0; }
.banner.success { background: #d4edda; }
.banner.info { background: #e3f2fd; }
.banner.warning { background: #fff3cd; }
.banner.error { background: #f8d7da; }
details { background: #fff; padding: .5rem 1rem; border-radius: 5px; margin: 1rem 0; }
li { margin: .5rem 0; }
.keywords { color: #6c757d; font-size: .8rem; }
.chart { background: #fff; border-radius: 5px; margin: 1rem 0; }
"#;

/// Render the whole dashboard for `state`, with the form prefilled from `query`.
pub fn render_page(state: &DashboardState, query: &DashboardQuery, today: NaiveDate) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_page(&mut out, state, query, today);
    out
}

fn write_page(
    out: &mut String,
    state: &DashboardState,
    query: &DashboardQuery,
    today: NaiveDate,
) -> fmt::Result {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\"><head><meta charset=\"utf-8\">")?;
    writeln!(out, "<title>News Analyzer</title><style>{STYLE}</style></head><body>")?;
    writeln!(out, "<header><h1>📰 New York Times News Analyzer</h1></header>")?;
    write_form(out, query, today)?;
    writeln!(out, "<main>")?;
    match state {
        DashboardState::Idle => writeln!(
            out,
            "<p>Choose a source and section, then press <strong>Fetch Articles</strong>.</p>"
        )?,
        DashboardState::Displaying(report) => write_report(out, report)?,
    }
    writeln!(out, "</main></body></html>")
}

fn write_form(out: &mut String, query: &DashboardQuery, today: NaiveDate) -> fmt::Result {
    let top = query.is_top_stories();
    let chosen = query.section.as_deref().unwrap_or_default();
    let start = query.start_or_default(today).unwrap_or(today);
    let end = query.end_or_default(today).unwrap_or(today);
    let keyword = query.keyword.as_deref().unwrap_or_default();
    let selected = |yes: bool| if yes { " selected" } else { "" };

    writeln!(out, "<form method=\"get\" action=\"/\">")?;
    writeln!(out, "<label>Source<select name=\"mode\">")?;
    writeln!(out, "<option value=\"search\"{}>Article search (date range)</option>", selected(!top))?;
    writeln!(out, "<option value=\"top-stories\"{}>Top stories</option>", selected(top))?;
    writeln!(out, "</select></label>")?;

    writeln!(out, "<label>Section<select name=\"section\">")?;
    writeln!(out, "<optgroup label=\"Article search\">")?;
    for section in SearchSection::ALL {
        writeln!(
            out,
            "<option value=\"{}\"{}>{}</option>",
            section.slug(),
            selected(!top && chosen == section.slug()),
            section.display_name()
        )?;
    }
    writeln!(out, "</optgroup><optgroup label=\"Top stories\">")?;
    for section in TopStoriesSection::ALL {
        writeln!(
            out,
            "<option value=\"{}\"{}>{}</option>",
            section.slug(),
            selected(top && chosen == section.slug()),
            section.slug()
        )?;
    }
    writeln!(out, "</optgroup></select></label>")?;

    writeln!(out, "<label>Start Date<input type=\"date\" name=\"start\" value=\"{start}\"></label>")?;
    writeln!(out, "<label>End Date<input type=\"date\" name=\"end\" value=\"{end}\"></label>")?;
    writeln!(
        out,
        "<label>🔍 Search Keyword (Optional)<input type=\"text\" name=\"keyword\" value=\"{}\"></label>",
        attr(keyword)
    )?;
    writeln!(out, "<button type=\"submit\">Fetch Articles</button>")?;
    writeln!(out, "</form>")
}

fn banner_class(level: BannerLevel) -> &'static str {
    match level {
        BannerLevel::Success => "success",
        BannerLevel::Info => "info",
        BannerLevel::Warning => "warning",
        BannerLevel::Error => "error",
    }
}

fn write_banner(out: &mut String, banner: &Banner) -> fmt::Result {
    writeln!(
        out,
        "<div class=\"banner {}\">{}</div>",
        banner_class(banner.level),
        text(&banner.message)
    )
}

fn is_web_link(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

fn write_report(out: &mut String, report: &Report) -> fmt::Result {
    writeln!(out, "<h2>{}</h2>", text(&report.title))?;
    // Info banners carry the filter summary, which belongs below the list.
    let (notes, status): (Vec<&Banner>, Vec<&Banner>) = report
        .banners
        .iter()
        .partition(|b| b.level == BannerLevel::Info);
    for banner in status {
        write_banner(out, banner)?;
    }

    if !report.articles.is_empty() {
        writeln!(
            out,
            "<details><summary>📝 View Articles ({})</summary><ul>",
            report.articles.len()
        )?;
        for article in &report.articles {
            write!(out, "<li>")?;
            match article.url.as_deref().filter(|u| is_web_link(u)) {
                Some(url) => write!(
                    out,
                    "<strong><a href=\"{}\">{}</a></strong>",
                    attr(url),
                    text(&article.headline)
                )?,
                None => write!(out, "<strong>{}</strong>", text(&article.headline))?,
            }
            write!(out, " ({})", article.published)?;
            if let Some(summary) = &article.summary {
                write!(out, "<p>{}</p>", text(summary))?;
            }
            if !article.keywords.is_empty() {
                write!(
                    out,
                    "<div class=\"keywords\">{}</div>",
                    text(&article.keywords_display())
                )?;
            }
            writeln!(out, "</li>")?;
        }
        writeln!(out, "</ul></details>")?;
    }
    for banner in notes {
        write_banner(out, banner)?;
    }

    if !report.has_charts() {
        return Ok(());
    }
    if !report.keyword_chart.is_empty() {
        writeln!(out, "<h3>📊 Most Frequent Keywords</h3>")?;
        write_bar_chart(out, &report.keyword_chart)?;
    }
    if !report.daily_chart.is_empty() {
        writeln!(out, "<h3>📈 Articles Published Over Time</h3>")?;
        write_line_chart(out, &report.daily_chart)?;
    }
    Ok(())
}

/// Interpolate from light to dark blue as `value` approaches `max`.
fn blue(value: usize, max: usize) -> String {
    const LIGHT: (f64, f64, f64) = (198.0, 219.0, 239.0);
    const DARK: (f64, f64, f64) = (8.0, 81.0, 156.0);
    let t = if max == 0 { 0.0 } else { value as f64 / max as f64 };
    let mix = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        mix(LIGHT.0, DARK.0),
        mix(LIGHT.1, DARK.1),
        mix(LIGHT.2, DARK.2)
    )
}

fn write_chart_frame(out: &mut String, title: &str, x_label: &str, y_label: &str, max: usize) -> fmt::Result {
    let plot_bottom = CHART_H - MARGIN_BOTTOM;
    let plot_right = CHART_W - MARGIN_RIGHT;
    writeln!(
        out,
        "<svg class=\"chart\" viewBox=\"0 0 {CHART_W} {CHART_H}\" width=\"{CHART_W}\" height=\"{CHART_H}\" role=\"img\">"
    )?;
    writeln!(
        out,
        "<text x=\"{}\" y=\"24\" text-anchor=\"middle\" font-size=\"16\">{}</text>",
        CHART_W / 2,
        text(title)
    )?;
    writeln!(
        out,
        "<line x1=\"{MARGIN_LEFT}\" y1=\"{plot_bottom}\" x2=\"{plot_right}\" y2=\"{plot_bottom}\" stroke=\"#555\"/>"
    )?;
    writeln!(
        out,
        "<line x1=\"{MARGIN_LEFT}\" y1=\"{MARGIN_TOP}\" x2=\"{MARGIN_LEFT}\" y2=\"{plot_bottom}\" stroke=\"#555\"/>"
    )?;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"11\">0</text>",
        MARGIN_LEFT - 6,
        plot_bottom + 4
    )?;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"11\">{max}</text>",
        MARGIN_LEFT - 6,
        MARGIN_TOP + 4
    )?;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\">{}</text>",
        (MARGIN_LEFT + plot_right) / 2,
        CHART_H - 8,
        text(x_label)
    )?;
    writeln!(
        out,
        "<text x=\"16\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\" transform=\"rotate(-90 16 {})\">{}</text>",
        (MARGIN_TOP + plot_bottom) / 2,
        (MARGIN_TOP + plot_bottom) / 2,
        text(y_label)
    )
}

fn write_bar_chart(out: &mut String, entries: &[(String, usize)]) -> fmt::Result {
    let max = entries.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let plot_w = CHART_W - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = CHART_H - MARGIN_TOP - MARGIN_BOTTOM;
    let plot_bottom = CHART_H - MARGIN_BOTTOM;
    let slot = plot_w / entries.len().max(1);
    let bar_w = (slot * 7 / 10).max(1);

    let title = format!("Top {} Most Frequent Keywords", entries.len());
    write_chart_frame(out, &title, "Keyword", "Frequency", max)?;
    for (i, (keyword, count)) in entries.iter().enumerate() {
        let h = scaled(*count, max, plot_h);
        let x = MARGIN_LEFT + i * slot + slot.saturating_sub(bar_w) / 2;
        let y = plot_bottom - h;
        let cx = x + bar_w / 2;
        writeln!(
            out,
            "<rect x=\"{x}\" y=\"{y}\" width=\"{bar_w}\" height=\"{h}\" fill=\"{}\"><title>{}: {count}</title></rect>",
            blue(*count, max),
            text(keyword)
        )?;
        writeln!(
            out,
            "<text x=\"{cx}\" y=\"{}\" text-anchor=\"middle\" font-size=\"11\">{count}</text>",
            y.saturating_sub(4)
        )?;
        writeln!(
            out,
            "<text x=\"{cx}\" y=\"{ly}\" text-anchor=\"end\" font-size=\"11\" transform=\"rotate(-40 {cx} {ly})\">{}</text>",
            text(keyword),
            ly = plot_bottom + 14
        )?;
    }
    writeln!(out, "</svg>")
}

fn write_line_chart(out: &mut String, points: &[(NaiveDate, usize)]) -> fmt::Result {
    let max = points.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let plot_w = CHART_W - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = CHART_H - MARGIN_TOP - MARGIN_BOTTOM;
    let plot_bottom = CHART_H - MARGIN_BOTTOM;

    let (first, last) = match (points.first(), points.last()) {
        (Some((first, _)), Some((last, _))) => (*first, *last),
        _ => return Ok(()),
    };
    let span = (last - first).num_days().max(0) as usize;
    let x_of = |day: NaiveDate| {
        if span == 0 {
            MARGIN_LEFT + plot_w / 2
        } else {
            MARGIN_LEFT + ((day - first).num_days() as usize * plot_w) / span
        }
    };
    let y_of = |count: usize| plot_bottom - scaled(count, max, plot_h);

    write_chart_frame(out, "Publication Trend", "Date", "Number of Articles", max)?;
    let path: Vec<String> = points
        .iter()
        .map(|(day, count)| format!("{},{}", x_of(*day), y_of(*count)))
        .collect();
    writeln!(
        out,
        "<polyline points=\"{}\" fill=\"none\" stroke=\"#1f77b4\" stroke-width=\"2\"/>",
        path.join(" ")
    )?;
    for (day, count) in points {
        let (x, y) = (x_of(*day), y_of(*count));
        writeln!(
            out,
            "<circle cx=\"{x}\" cy=\"{y}\" r=\"4\" fill=\"#1f77b4\"><title>{day}: {count}</title></circle>"
        )?;
        writeln!(
            out,
            "<text x=\"{x}\" y=\"{ly}\" text-anchor=\"end\" font-size=\"11\" transform=\"rotate(-40 {x} {ly})\">{day}</text>",
            ly = plot_bottom + 14
        )?;
    }
    writeln!(out, "</svg>")
}
