//! Plotly figure specifications and their HTML embedding.
//!
//! Builders are pure: data + theme in, `Figure` out. Rendering to markup is
//! a separate step so figures can be inspected in tests.

pub mod net_debt;
pub mod price;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use self::net_debt::net_debt_change_chart;
pub use self::price::line_chart;

pub const FONT_FAMILY: &str = "Inter, -apple-system, BlinkMacSystemFont, sans-serif";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

// ── Figure model ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Value,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(ScatterTrace),
    Bar(BarTrace),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScatterTrace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub mode: &'static str,
    pub fill: &'static str,
    pub fillcolor: &'static str,
    pub line: Value,
    pub hovertemplate: String,
    pub hoverlabel: Value,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BarTrace {
    pub name: String,
    pub x: Vec<String>,
    /// `None` serialises as `null`, which Plotly leaves as a gap.
    pub y: Vec<Option<f64>>,
    pub text: Vec<String>,
    pub textposition: &'static str,
    pub textfont: Value,
    pub marker: Value,
    pub hovertemplate: &'static str,
    pub hoverlabel: Value,
    pub showlegend: bool,
}

// ── Embedding ─────────────────────────────────────────────────────────────────

/// Plotly `config` object passed next to the figure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotOptions {
    pub responsive: bool,
    pub display_mode_bar: bool,
    pub scroll_zoom: bool,
    pub double_click: &'static str,
    pub show_tips: bool,
    pub editable: bool,
    pub static_plot: bool,
}

impl PlotOptions {
    pub fn price() -> Self {
        Self {
            responsive: true,
            display_mode_bar: false,
            scroll_zoom: true,
            double_click: "reset+autosize",
            show_tips: false,
            editable: false,
            static_plot: false,
        }
    }

    pub fn bars() -> Self {
        Self {
            scroll_zoom: false,
            ..Self::price()
        }
    }
}

/// `<div>` + `<script>` fragment. Expects plotly.js to be loaded by the page.
pub fn to_html(figure: &Figure, div_id: &str, options: &PlotOptions) -> Result<String, serde_json::Error> {
    let id: String = div_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();

    let data = script_safe(serde_json::to_string(&figure.data)?);
    let layout = script_safe(serde_json::to_string(&figure.layout)?);
    let config = script_safe(serde_json::to_string(options)?);

    Ok(format!(
        concat!(
            "<div id=\"{id}\" class=\"plotly-graph-div\" style=\"height:100%; width:100%;\"></div>\n",
            "<script type=\"text/javascript\">",
            "window.PLOTLYENV=window.PLOTLYENV || {{}};",
            "if (document.getElementById(\"{id}\")) {{ Plotly.newPlot(\"{id}\", {data}, {layout}, {config}); }}",
            "</script>"
        ),
        id = id,
        data = data,
        layout = layout,
        config = config,
    ))
}

/// JSON can carry `</script>` inside strings; break it up.
fn script_safe(json: String) -> String {
    json.replace("</", "<\\/")
}
