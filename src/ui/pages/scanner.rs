//! Main page: scan control, player inputs, group filters, route table.

use dioxus::prelude::*;

use crate::{
    app::{persist_user_state, run_cycle, scan_markets, Backend},
    domain::{AppState, PlayerProfile, ScanStatus},
    ui::components::{
        group_select::GroupSelect,
        route_table::RouteTable,
        toast::{push_toast, ToastKind, ToastMessage},
    },
};

#[component]
pub fn ScannerPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let backend = use_context::<Backend>();

    let player = state.with(|st| st.player);
    let mut principal_input = use_signal(move || format_number(player.principal));
    let mut rate_input = use_signal(move || format_number(player.conversion_rate));
    let mut mass_input = use_signal(move || format_number(player.mass_limit));
    let mut volume_input = use_signal(move || format_number(player.volume_limit));
    let mut min_profit_input = use_signal(move || format_number(player.min_profit));

    let scan = state.with(|st| st.scan.clone());
    let status_class = match scan {
        ScanStatus::Found(_) => "status ok",
        ScanStatus::Failed { .. } => "status err",
        _ => "status",
    };

    let group_names: Vec<String> = state.with(|st| st.groups.names().map(str::to_string).collect());
    let start_selected = state.with(|st| st.start_groups.clone());
    let end_selected = state.with(|st| st.end_groups.clone());

    let on_scan = {
        let backend = backend.clone();
        move |_| scan_markets(state.clone(), toasts.clone(), &backend)
    };

    let on_apply = {
        let mut state = state.clone();
        let backend = backend.clone();
        let toasts = toasts.clone();
        move |_| {
            let parsed = parse_profile(
                principal_input(),
                rate_input(),
                mass_input(),
                volume_input(),
                min_profit_input(),
            );
            match parsed {
                Ok(player) => {
                    state.with_mut(|st| st.player = player);
                    persist_user_state(&state);
                    run_cycle(state.clone(), &backend);
                    push_toast(toasts.clone(), ToastKind::Success, "Updated player values.");
                }
                Err(message) => {
                    // Prior profile stays in effect.
                    push_toast(toasts.clone(), ToastKind::Error, message);
                }
            }
        }
    };

    let on_toggle_start = {
        let mut state = state.clone();
        let backend = backend.clone();
        move |name: String| {
            state.with_mut(|st| st.toggle_start_group(&name));
            persist_user_state(&state);
            run_cycle(state.clone(), &backend);
        }
    };

    let on_toggle_end = {
        let mut state = state.clone();
        let backend = backend.clone();
        move |name: String| {
            state.with_mut(|st| st.toggle_end_group(&name));
            persist_user_state(&state);
            run_cycle(state.clone(), &backend);
        }
    };

    rsx! {
        div { class: "scan-bar",
            button { class: "btn btn-primary", onclick: on_scan, "Scan For Markets" }
            span { class: "{status_class}", "{scan.label()}" }
        }

        div { class: "panel-row",
            div { class: "panel",
                h2 { class: "panel-title", "Player Inputs" }
                div { class: "field-row",
                    label { class: "field-label", "Player Principal:" }
                    input {
                        class: "field-input",
                        title: "Player money in the currency used",
                        value: "{principal_input}",
                        oninput: move |event| principal_input.set(event.value()),
                    }
                }
                div { class: "field-row",
                    label { class: "field-label", "Conversion Rate:" }
                    input {
                        class: "field-input",
                        title: "Lions ~34.0\nDragons ~330\nCrowns ~82.0\nGet this info from currency exchange",
                        value: "{rate_input}",
                        oninput: move |event| rate_input.set(event.value()),
                    }
                }
                div { class: "field-row",
                    label { class: "field-label", "Weight Limit:" }
                    input {
                        class: "field-input",
                        title: "Max weight of supplies in rough seas\n~1000 for dhow, ~4000 for sanbuq",
                        value: "{mass_input}",
                        oninput: move |event| mass_input.set(event.value()),
                    }
                }
                div { class: "field-row",
                    label { class: "field-label", "Volume Limit:" }
                    input {
                        class: "field-input",
                        title: "Max volume of supplies\n~40 for dhow, ~120 for sanbuq\nRegular Crate=3, Barrel=4, Logs=20",
                        value: "{volume_input}",
                        oninput: move |event| volume_input.set(event.value()),
                    }
                }
                div { class: "field-row",
                    label { class: "field-label", "Min Profit:" }
                    input {
                        class: "field-input",
                        title: "Don't show trades that generate\na profit less than this",
                        value: "{min_profit_input}",
                        oninput: move |event| min_profit_input.set(event.value()),
                    }
                }
                button { class: "btn", onclick: on_apply, "Update Values" }
            }

            GroupSelect {
                title: "Start Groups",
                names: group_names.clone(),
                selected: start_selected,
                on_toggle: on_toggle_start,
            }
            GroupSelect {
                title: "End Groups",
                names: group_names,
                selected: end_selected,
                on_toggle: on_toggle_end,
            }
        }

        RouteTable {}
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn parse_profile(
    principal: String,
    conversion_rate: String,
    mass_limit: String,
    volume_limit: String,
    min_profit: String,
) -> Result<PlayerProfile, String> {
    let parse = |label: &str, value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("{label} must be a number."))
    };
    Ok(PlayerProfile {
        principal: parse("Player principal", &principal)?,
        conversion_rate: parse("Conversion rate", &conversion_rate)?,
        mass_limit: parse("Weight limit", &mass_limit)?,
        volume_limit: parse("Volume limit", &volume_limit)?,
        min_profit: parse("Min profit", &min_profit)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_numeric_edits() {
        let result = parse_profile(
            "5000".into(),
            "abc".into(),
            "1000".into(),
            "40".into(),
            "100".into(),
        );
        assert!(result.unwrap_err().contains("Conversion rate"));
    }

    #[test]
    fn parses_a_full_profile() {
        let profile = parse_profile(
            " 5000 ".into(),
            "330".into(),
            "4000".into(),
            "120".into(),
            "100.5".into(),
        )
        .unwrap();
        assert_eq!(profile.principal, 5_000.0);
        assert_eq!(profile.min_profit, 100.5);
    }

    #[test]
    fn numbers_render_without_trailing_zeros() {
        assert_eq!(format_number(311.0), "311");
        assert_eq!(format_number(34.5), "34.5");
    }
}
