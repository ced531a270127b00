use super::{Figure, ScatterTrace, Theme, Trace, FONT_FAMILY};
use crate::models::PriceBar;
use serde_json::json;

struct LinePalette {
    line: &'static str,
    fill: &'static str,
    plot_bg: &'static str,
    paper_bg: &'static str,
    grid: &'static str,
    axis_line: &'static str,
    text: &'static str,
    spike: &'static str,
    hover_bg: &'static str,
    hover_border: &'static str,
}

fn palette(theme: Theme) -> LinePalette {
    match theme {
        Theme::Light => LinePalette {
            line: "#667eea",
            fill: "rgba(102, 126, 234, 0.15)",
            plot_bg: "rgba(248, 250, 252, 0.6)",
            paper_bg: "white",
            grid: "rgba(156, 163, 175, 0.3)",
            axis_line: "rgba(156, 163, 175, 0.5)",
            text: "#374151",
            spike: "rgba(102, 126, 234, 0.6)",
            hover_bg: "rgba(102, 126, 234, 0.9)",
            hover_border: "white",
        },
        Theme::Dark => LinePalette {
            line: "#8B5CF6",
            fill: "rgba(139, 92, 246, 0.2)",
            plot_bg: "rgba(17, 24, 39, 0.8)",
            paper_bg: "rgba(31, 41, 55, 1)",
            grid: "rgba(75, 85, 99, 0.4)",
            axis_line: "rgba(75, 85, 99, 0.6)",
            text: "#F9FAFB",
            spike: "rgba(139, 92, 246, 0.8)",
            hover_bg: "rgba(139, 92, 246, 0.9)",
            hover_border: "#1F2937",
        },
    }
}

/// Filled, spline-smoothed close-price line over `bars`.
pub fn line_chart(bars: &[PriceBar], symbol: Option<&str>, theme: Theme) -> Figure {
    let p = palette(theme);

    let hovertemplate = match symbol {
        Some(sym) => format!(
            "<b>%{{x|%d %b %Y}}</b><br><b>Close Price:</b> ₺%{{y:,.2f}}<br><b>Symbol:</b> {}<br><extra></extra>",
            sym
        ),
        None => "<b>%{x|%d %b %Y}</b><br><b>Close Price:</b> ₺%{y:,.2f}<br><extra></extra>".to_string(),
    };

    let trace = ScatterTrace {
        name: "Close Price".to_string(),
        x: bars.iter().map(|b| b.date.format("%Y-%m-%d").to_string()).collect(),
        y: bars.iter().map(|b| b.close).collect(),
        mode: "lines",
        fill: "tozeroy",
        fillcolor: p.fill,
        line: json!({"color": p.line, "width": 3, "shape": "spline", "smoothing": 0.3}),
        hovertemplate,
        hoverlabel: json!({
            "bgcolor": p.hover_bg,
            "bordercolor": p.hover_border,
            "font": {"color": "white", "size": 12}
        }),
    };

    let axis = |extra: serde_json::Value| {
        let mut base = json!({
            "showgrid": true,
            "gridcolor": p.grid,
            "gridwidth": 1,
            "linecolor": p.axis_line,
            "linewidth": 1,
            "tickfont": {"size": 11, "color": p.text},
            "title": {"font": {"size": 12, "color": p.text}},
            "showspikes": true,
            "spikecolor": p.spike,
            "spikethickness": 1,
            "spikedash": "dot"
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        base
    };

    let layout = json!({
        "autosize": true,
        "plot_bgcolor": p.plot_bg,
        "paper_bgcolor": p.paper_bg,
        "font": {"family": FONT_FAMILY, "size": 12, "color": p.text},
        "margin": {"l": 20, "r": 20, "t": 20, "b": 20},
        "showlegend": false,
        "hovermode": "x unified",
        "transition": {"duration": 300},
        "xaxis": axis(json!({"nticks": 8})),
        "yaxis": axis(json!({"nticks": 6, "tickformat": ",.0f"})),
    });

    Figure {
        data: vec![Trace::Scatter(trace)],
        layout,
    }
}
