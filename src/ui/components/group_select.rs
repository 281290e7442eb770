use std::collections::HashSet;

use dioxus::prelude::*;

/// A titled column of island-group checkboxes.
#[component]
pub fn GroupSelect(
    title: &'static str,
    names: Vec<String>,
    selected: HashSet<String>,
    on_toggle: EventHandler<String>,
) -> Element {
    rsx! {
        div { class: "panel",
            h2 { class: "panel-title", "{title}" }
            div { class: "check-col",
                for name in names {
                    label { class: "check-row",
                        input {
                            r#type: "checkbox",
                            checked: selected.contains(&name),
                            onchange: {
                                let name = name.clone();
                                move |_| on_toggle.call(name.clone())
                            },
                        }
                        span { "{name}" }
                    }
                }
            }
        }
    }
}
