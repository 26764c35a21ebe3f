//! Presenters for a pipeline [`Report`](crate::models::Report).
//!
//! # Submodules
//!
//! - [`text`]: Terminal output for the `search` and `top-stories` subcommands
//! - [`html`]: The dashboard page with its inline SVG charts
//! - [`json`]: Machine-readable output (`--json`)
//!
//! Every presenter follows the same order: banners, the full article list,
//! the filter summary, the keyword bar chart and the daily line chart.
//! Charts are left out when there is nothing to chart.

pub mod html;
pub mod json;
pub mod text;
