use super::{BarTrace, Figure, Theme, Trace, FONT_FAMILY};
use crate::models::{
    BalanceSheetHistory, CASH_AND_EQUIVALENTS, OTHER_SHORT_TERM_INVESTMENTS, TOTAL_DEBT,
};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Years whose change against the previous year-end is charted.
pub const CHANGE_YEARS: [i32; 3] = [2021, 2022, 2023];

#[derive(Debug, Error, PartialEq)]
#[error("balance sheet has no '{0}' line")]
pub struct MissingLineItem(pub String);

struct BarPalette {
    fills: [&'static str; 3],
    borders: [&'static str; 3],
    plot_bg: &'static str,
    paper_bg: &'static str,
    text: &'static str,
    grid: &'static str,
    axis_line: &'static str,
    legend_bg: &'static str,
    legend_border: &'static str,
}

fn palette(theme: Theme) -> BarPalette {
    match theme {
        Theme::Light => BarPalette {
            fills: [
                "rgba(102, 126, 234, 0.8)",
                "rgba(245, 184, 73, 0.8)",
                "rgba(34, 197, 94, 0.8)",
            ],
            borders: [
                "rgba(102, 126, 234, 1.0)",
                "rgba(245, 184, 73, 1.0)",
                "rgba(34, 197, 94, 1.0)",
            ],
            plot_bg: "rgba(248, 250, 252, 0.4)",
            paper_bg: "white",
            text: "#374151",
            grid: "rgba(156, 163, 175, 0.2)",
            axis_line: "rgba(156, 163, 175, 0.5)",
            legend_bg: "rgba(255, 255, 255, 0.8)",
            legend_border: "rgba(156, 163, 175, 0.3)",
        },
        Theme::Dark => BarPalette {
            fills: [
                "rgba(139, 92, 246, 0.8)",
                "rgba(251, 191, 36, 0.8)",
                "rgba(34, 197, 94, 0.8)",
            ],
            borders: [
                "rgba(139, 92, 246, 1.0)",
                "rgba(251, 191, 36, 1.0)",
                "rgba(34, 197, 94, 1.0)",
            ],
            plot_bg: "rgba(17, 24, 39, 0.6)",
            paper_bg: "rgba(31, 41, 55, 1)",
            text: "#F9FAFB",
            grid: "rgba(75, 85, 99, 0.3)",
            axis_line: "rgba(75, 85, 99, 0.6)",
            legend_bg: "rgba(55, 65, 81, 0.9)",
            legend_border: "rgba(75, 85, 99, 0.5)",
        },
    }
}

fn year_end(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 12, 31)
}

/// Percent change of one line item for each of `CHANGE_YEARS`.
fn yearly_changes(history: &BalanceSheetHistory, item: &str) -> [Option<f64>; 3] {
    let values = history.item(item);
    CHANGE_YEARS.map(|year| {
        let values = values?;
        let prev = *values.get(&year_end(year - 1)?)?;
        let cur = *values.get(&year_end(year)?)?;
        if prev == 0.0 {
            return None;
        }
        Some((cur / prev - 1.0) * 100.0)
    })
}

fn display_name(item: &str) -> String {
    item.replace(TOTAL_DEBT, "Financial Debt")
}

/// Grouped bars of year-over-year % change in debt and cash positions.
///
/// Fails when debt or cash is missing from the balance sheet altogether.
/// Other short-term investments are charted only when present. A year with
/// no complete pair is left empty; with no complete pair at all the figure
/// has no traces.
pub fn try_net_debt_change_chart(
    history: &BalanceSheetHistory,
    theme: Theme,
) -> Result<Figure, MissingLineItem> {
    let mut items = vec![TOTAL_DEBT, CASH_AND_EQUIVALENTS];
    for required in &items {
        if history.item(required).is_none() {
            return Err(MissingLineItem(required.to_string()));
        }
    }
    if history.item(OTHER_SHORT_TERM_INVESTMENTS).is_some() {
        items.push(OTHER_SHORT_TERM_INVESTMENTS);
    }

    let series: Vec<(&str, [Option<f64>; 3])> = items
        .iter()
        .map(|item| (*item, yearly_changes(history, item)))
        .collect();

    let any_year = series.iter().any(|(_, changes)| changes.iter().any(Option::is_some));
    let p = palette(theme);
    let x: Vec<String> = CHANGE_YEARS.iter().map(|y| y.to_string()).collect();

    let data = if !any_year {
        Vec::new()
    } else {
        series
            .into_iter()
            .enumerate()
            .map(|(i, (item, changes))| {
                Trace::Bar(BarTrace {
                    name: display_name(item),
                    x: x.clone(),
                    y: changes.to_vec(),
                    text: changes
                        .iter()
                        .map(|c| c.map(|v| format!("{:.1}%", v)).unwrap_or_default())
                        .collect(),
                    textposition: "auto",
                    textfont: json!({"size": 12, "color": "white", "family": "Inter, sans-serif"}),
                    marker: json!({
                        "color": p.fills[i],
                        "line": {"color": p.borders[i], "width": 2},
                        "cornerradius": 8
                    }),
                    hovertemplate: "<b>%{fullData.name}</b><br><b>Year:</b> %{x}<br><b>Change:</b> %{y:.1f}%<br><extra></extra>",
                    hoverlabel: json!({
                        "bgcolor": p.borders[i],
                        "bordercolor": "white",
                        "font": {"color": "white"}
                    }),
                    showlegend: true,
                })
            })
            .collect()
    };

    let axis = json!({
        "showline": true,
        "linewidth": 1,
        "linecolor": p.axis_line,
        "showgrid": true,
        "gridcolor": p.grid,
        "tickfont": {"size": 11, "color": p.text},
        "title": {"font": {"size": 12, "color": p.text}}
    });
    let mut yaxis = axis.clone();
    if let Some(y) = yaxis.as_object_mut() {
        y.insert("ticksuffix".into(), json!("%"));
        y.insert("zeroline".into(), json!(true));
        y.insert("zerolinecolor".into(), json!(p.axis_line));
        y.insert("zerolinewidth".into(), json!(2));
    }

    let layout = json!({
        "title": {"text": ""},
        "autosize": true,
        "plot_bgcolor": p.plot_bg,
        "paper_bgcolor": p.paper_bg,
        "barmode": "group",
        "bargap": 0.15,
        "bargroupgap": 0.1,
        "font": {"family": FONT_FAMILY, "size": 12, "color": p.text},
        "margin": {"l": 20, "r": 20, "t": 20, "b": 40},
        "legend": {
            "orientation": "h",
            "yanchor": "bottom",
            "y": -0.15,
            "xanchor": "center",
            "x": 0.5,
            "bgcolor": p.legend_bg,
            "bordercolor": p.legend_border,
            "borderwidth": 1,
            "font": {"size": 11, "color": p.text}
        },
        "hovermode": "x unified",
        "transition": {"duration": 300},
        "xaxis": axis,
        "yaxis": yaxis,
    });

    Ok(Figure { data, layout })
}

/// Like `try_net_debt_change_chart`, but a missing line item is logged and
/// the chart dropped.
pub fn net_debt_change_chart(history: &BalanceSheetHistory, theme: Theme) -> Option<Figure> {
    match try_net_debt_change_chart(history, theme) {
        Ok(fig) => Some(fig),
        Err(e) => {
            error!("Net debt chart omitted: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ye(year: i32) -> NaiveDate {
        year_end(year).unwrap()
    }

    fn history(rows: &[(&str, i32, f64)]) -> BalanceSheetHistory {
        let mut h = BalanceSheetHistory::default();
        for &(item, year, value) in rows {
            h.insert(item, ye(year), value);
        }
        h
    }

    fn assert_changes(actual: &[Option<f64>], expected: &[Option<f64>]) {
        assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
        for (a, e) in actual.iter().zip(expected) {
            match (a, e) {
                (Some(a), Some(e)) => assert!((a - e).abs() < 1e-9, "{:?} vs {:?}", actual, expected),
                (None, None) => {}
                _ => panic!("{:?} vs {:?}", actual, expected),
            }
        }
    }

    fn bars(fig: &Figure) -> Vec<&BarTrace> {
        fig.data
            .iter()
            .map(|t| match t {
                Trace::Bar(b) => b,
                other => panic!("unexpected trace {:?}", other),
            })
            .collect()
    }

    #[test]
    fn full_window_gives_three_grouped_years() {
        let h = history(&[
            (TOTAL_DEBT, 2020, 100.0),
            (TOTAL_DEBT, 2021, 150.0),
            (TOTAL_DEBT, 2022, 120.0),
            (TOTAL_DEBT, 2023, 120.0),
            (CASH_AND_EQUIVALENTS, 2020, 50.0),
            (CASH_AND_EQUIVALENTS, 2021, 25.0),
            (CASH_AND_EQUIVALENTS, 2022, 50.0),
            (CASH_AND_EQUIVALENTS, 2023, 100.0),
        ]);

        let fig = try_net_debt_change_chart(&h, Theme::Light).unwrap();
        let traces = bars(&fig);
        assert_eq!(traces.len(), 2);

        let debt = traces[0];
        assert_eq!(debt.name, "Financial Debt");
        assert_eq!(debt.x, ["2021", "2022", "2023"]);
        assert_changes(&debt.y, &[Some(50.0), Some(-20.0), Some(0.0)]);
        assert_eq!(debt.text, ["50.0%", "-20.0%", "0.0%"]);

        let cash = traces[1];
        assert_eq!(cash.name, "Cash And Cash Equivalents");
        assert_changes(&cash.y, &[Some(-50.0), Some(100.0), Some(100.0)]);

        assert_eq!(fig.layout["barmode"], "group");
        assert_eq!(fig.layout["yaxis"]["ticksuffix"], "%");
        assert!(fig.layout["xaxis"].get("ticksuffix").is_none());
    }

    #[test]
    fn incomplete_year_pairs_are_left_empty() {
        // 2021 lacks the 2020 base; 2023 lacks its own year end.
        let h = history(&[
            (TOTAL_DEBT, 2021, 200.0),
            (TOTAL_DEBT, 2022, 100.0),
            (CASH_AND_EQUIVALENTS, 2021, 10.0),
            (CASH_AND_EQUIVALENTS, 2022, 20.0),
        ]);

        let fig = try_net_debt_change_chart(&h, Theme::Light).unwrap();
        for trace in bars(&fig) {
            assert_eq!(trace.x.len(), 3);
            assert_eq!(trace.y[0], None);
            assert!(trace.y[1].is_some());
            assert_eq!(trace.y[2], None);
            assert_eq!(trace.text[0], "");
        }
    }

    #[test]
    fn other_short_term_investments_only_when_reported() {
        let mut h = history(&[
            (TOTAL_DEBT, 2022, 1.0),
            (TOTAL_DEBT, 2023, 2.0),
            (CASH_AND_EQUIVALENTS, 2022, 1.0),
            (CASH_AND_EQUIVALENTS, 2023, 1.0),
        ]);
        assert_eq!(try_net_debt_change_chart(&h, Theme::Dark).unwrap().data.len(), 2);

        h.insert(OTHER_SHORT_TERM_INVESTMENTS, ye(2022), 4.0);
        h.insert(OTHER_SHORT_TERM_INVESTMENTS, ye(2023), 3.0);
        let fig = try_net_debt_change_chart(&h, Theme::Dark).unwrap();
        let traces = bars(&fig);
        assert_eq!(traces.len(), 3);
        assert_eq!(traces[2].name, OTHER_SHORT_TERM_INVESTMENTS);
        assert_changes(&traces[2].y[2..], &[Some(-25.0)]);
        assert_eq!(traces[2].marker["color"], "rgba(34, 197, 94, 0.8)");
        assert_eq!(traces[0].marker["color"], "rgba(139, 92, 246, 0.8)");
    }

    #[test]
    fn missing_debt_line_drops_the_chart() {
        let h = history(&[(CASH_AND_EQUIVALENTS, 2022, 1.0), (CASH_AND_EQUIVALENTS, 2023, 2.0)]);
        assert_eq!(
            try_net_debt_change_chart(&h, Theme::Light).unwrap_err(),
            MissingLineItem(TOTAL_DEBT.to_string())
        );
        assert!(net_debt_change_chart(&h, Theme::Light).is_none());
    }

    #[test]
    fn no_complete_pair_means_no_traces() {
        let h = history(&[(TOTAL_DEBT, 2019, 1.0), (CASH_AND_EQUIVALENTS, 2024, 1.0)]);
        let fig = try_net_debt_change_chart(&h, Theme::Light).unwrap();
        assert!(fig.data.is_empty());
    }

    #[test]
    fn zero_base_year_leaves_a_gap() {
        let h = history(&[
            (TOTAL_DEBT, 2020, 0.0),
            (TOTAL_DEBT, 2021, 10.0),
            (CASH_AND_EQUIVALENTS, 2020, 5.0),
            (CASH_AND_EQUIVALENTS, 2021, 10.0),
        ]);
        let fig = try_net_debt_change_chart(&h, Theme::Light).unwrap();
        let traces = bars(&fig);
        assert_eq!(traces[0].y[0], None);
        assert_changes(&traces[1].y[..1], &[Some(100.0)]);
    }
}
