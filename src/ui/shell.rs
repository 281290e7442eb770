use dioxus::prelude::*;

use crate::app::Route;
use crate::util::version::{version_label, APP_NAME};

#[component]
pub fn Shell(children: Element) -> Element {
    let current_route = use_route::<Route>();
    let navigator = use_navigator();

    rsx! {
        div { class: "app",
            header { class: "header",
                h1 { class: "header-title", "{APP_NAME}" }
                span { class: "header-version", "{version_label()}" }
                nav { class: "nav",
                    button {
                        class: if matches!(current_route, Route::Scanner {}) { "nav-btn active" } else { "nav-btn" },
                        onclick: move |_| { navigator.push(Route::Scanner {}); },
                        "Routes"
                    }
                    button {
                        class: if matches!(current_route, Route::Markets {}) { "nav-btn active" } else { "nav-btn" },
                        onclick: move |_| { navigator.push(Route::Markets {}); },
                        "Markets"
                    }
                }
            }
            main { class: "main",
                {children}
            }
        }
    }
}
