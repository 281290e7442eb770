//! Live per-market view of the raw product snapshots.

use dioxus::prelude::*;

use crate::domain::AppState;

#[component]
pub fn MarketsPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let markets = state.with(|st| st.markets.clone());
    let groups = state.with(|st| st.groups.clone());
    let mut selected = use_signal(|| None::<u64>);

    if markets.is_empty() {
        return rsx! {
            div { class: "table-wrap",
                p { class: "empty-note", "Scan for markets first." }
            }
        };
    }

    let current = selected()
        .and_then(|base| markets.iter().find(|m| m.base == base))
        .unwrap_or(&markets[0])
        .clone();
    let group_label = groups.group_of(&current.name).unwrap_or("—");

    rsx! {
        div { class: "panel-row",
            div { class: "panel",
                h2 { class: "panel-title", "Markets" }
                div { class: "check-col",
                    for market in markets.clone() {
                        button {
                            class: if market.base == current.base { "nav-btn active" } else { "nav-btn" },
                            onclick: {
                                let base = market.base;
                                move |_| selected.set(Some(base))
                            },
                            "{market.index:02} {market.name}"
                        }
                    }
                }
            }

            div { class: "panel",
                h2 { class: "panel-title", "{current.name}" }
                p { class: "muted", "Group: {group_label} · Limit: {current.limit}" }
                div { class: "table-wrap",
                    table {
                        thead {
                            tr {
                                th { "Product" }
                                th { "Supply" }
                                th { "Available" }
                                th { "Sell" }
                                th { "Buy" }
                            }
                        }
                        tbody {
                            for product in current.products.clone() {
                                tr {
                                    class: if product.stale { "stale" } else { "" },
                                    td { "{product.name}" }
                                    td { class: "num",
                                        if product.stale {
                                            "stale"
                                        } else {
                                            "{product.supply:.3}"
                                        }
                                    }
                                    td { class: "num", "{product.available}" }
                                    td { class: "num", "{product.sell_price}" }
                                    td { class: "num", "{product.buy_price}" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
