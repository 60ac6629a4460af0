//! The spending-breakdown treemap.
//!
//! The chart is rendered client-side by ECharts. The option document is
//! assembled here as JSON: two levels of treemap nodes, category then
//! merchant, sized by amount and colored with the category color table.

use std::collections::HashMap;

use maud::{Markup, PreEscaped, html};
use serde_json::{Value, json};

use crate::{category::Category, transaction::Transaction};

/// The ECharts build loaded into the dashboard page head.
pub(super) const ECHARTS_CDN: &str =
    "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// Round an amount to cents for display in the chart.
fn rounded(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Build the ECharts option document for the filtered spending rows.
pub(super) fn spending_treemap_option(rows: &[Transaction]) -> String {
    let mut by_category: HashMap<Category, HashMap<String, f64>> = HashMap::new();

    for row in rows {
        let merchant = if row.merchant_name.is_empty() {
            row.name.as_str()
        } else {
            row.merchant_name.as_str()
        };
        *by_category
            .entry(row.category)
            .or_default()
            .entry(merchant.to_owned())
            .or_insert(0.0) += row.amount;
    }

    let mut categories: Vec<(Category, HashMap<String, f64>, f64)> = by_category
        .into_iter()
        .map(|(category, merchants)| {
            let total = merchants.values().sum();
            (category, merchants, total)
        })
        .collect();
    categories.sort_by(|(category_a, _, total_a), (category_b, _, total_b)| {
        total_b
            .partial_cmp(total_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| category_a.label().cmp(category_b.label()))
    });

    let data: Vec<Value> = categories
        .into_iter()
        .map(|(category, merchants, total)| {
            let mut children: Vec<(String, f64)> = merchants.into_iter().collect();
            children.sort_by(|(merchant_a, amount_a), (merchant_b, amount_b)| {
                amount_b
                    .partial_cmp(amount_a)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| merchant_a.cmp(merchant_b))
            });

            let children: Vec<Value> = children
                .into_iter()
                .map(|(merchant, amount)| {
                    json!({
                        "name": merchant,
                        "value": rounded(amount),
                    })
                })
                .collect();

            json!({
                "name": category.display_name(),
                "value": rounded(total),
                "itemStyle": { "color": category.color() },
                "children": children,
            })
        })
        .collect();

    json!({
        "tooltip": {},
        "series": [{
            "type": "treemap",
            "roam": false,
            "nodeClick": false,
            "breadcrumb": { "show": false },
            "label": { "show": true },
            "upperLabel": { "show": true, "height": 24 },
            "itemStyle": {
                "borderColor": "white",
                "borderWidth": 2,
                "borderRadius": 8,
            },
            "data": data,
        }]
    })
    .to_string()
}

/// The inline script that mounts the treemap into its container.
///
/// Placed directly after the container div, so it runs both on a full page
/// load and when htmx swaps the dashboard content in.
pub(super) fn treemap_script(chart_id: &str, options: &str) -> Markup {
    let script = format!(
        r#"(function() {{
    const chartDom = document.getElementById("{chart_id}");
    const chart = echarts.init(chartDom);
    chart.setOption({options});
    window.addEventListener('resize', chart.resize);
}})();"#
    );

    html!(
        script { (PreEscaped(script)) }
    )
}
