use dioxus::prelude::*;

use crate::domain::AppState;

/// The trade route result table, one row per profitable route.
#[component]
pub fn RouteTable() -> Element {
    let state = use_context::<Signal<AppState>>();
    let routes = state.with(|st| st.routes.clone());
    let scanned = state.with(|st| st.scan.is_ok());

    rsx! {
        div { class: "table-wrap",
            if routes.is_empty() {
                p { class: "empty-note",
                    if scanned {
                        "No routes above the profit floor this cycle."
                    } else {
                        "Scan for markets to start finding routes."
                    }
                }
            } else {
                table {
                    thead {
                        tr {
                            th { "From" }
                            th { "To" }
                            th { "Product" }
                            th { "Qnty" }
                            th { "$Buy" }
                            th { "$Sell" }
                            th { "$Profit" }
                            th { "$/Pound" }
                            th { "$/Item" }
                        }
                    }
                    tbody {
                        for route in routes {
                            tr {
                                td { "{route.source_market}" }
                                td { "{route.dest_market}" }
                                td { "{route.product}" }
                                td { class: "num", "{route.quantity_label()}" }
                                td { class: "num", "{route.total_buy}" }
                                td { class: "num", "{route.total_sell}" }
                                td { class: "num profit-pos", "{route.profit}" }
                                td { class: "num", "{route.profit_per_pound}" }
                                td { class: "num", "{route.profit_per_item}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
