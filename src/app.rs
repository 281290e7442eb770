use std::sync::Arc;
use std::time::Duration;

use dioxus::{prelude::*, signals::Signal};

use crate::{
    domain::{search_routes, AppState, ScanStatus},
    infra::{
        config::ScannerConfig,
        discovery::{discover_markets, refresh_markets, DiscoveryError},
        memory::ProcessMemory,
        sim::SimulatedGame,
    },
    ui::{
        components::toast::{push_toast, Toast, ToastKind, ToastMessage},
        pages::{MarketsPage, ScannerPage},
        shell::Shell,
    },
    util::{
        assets,
        persistence::{load_persisted_state, save_persisted_state},
    },
};

/// Markets are re-read and routes recomputed on this cadence.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[route("/")]
    Scanner {},
    #[route("/markets")]
    Markets {},
}

/// Memory backend shared with the UI callbacks.
///
/// Only the simulator is wired in for now; a live process backend drops
/// in behind the same [`ProcessMemory`] trait without touching the app.
#[derive(Clone)]
pub struct Backend(pub Arc<SimulatedGame>);

impl Backend {
    pub fn memory(&self) -> &dyn ProcessMemory {
        self.0.as_ref()
    }

    /// Lets the simulated world move between polling cycles.
    pub fn advance(&self) {
        self.0.tick();
    }
}

#[component]
pub fn App() -> Element {
    let config = use_hook(|| match ScannerConfig::load() {
        Ok(config) => config,
        Err(err) => {
            println!("Failed to load config: {err}; falling back to embedded defaults");
            ScannerConfig::parse(assets::default_config())
                .expect("embedded default config must parse")
        }
    });

    let state = use_signal({
        let config = config.clone();
        move || {
            let mut state = AppState {
                catalog: config.catalog.clone(),
                groups: config.groups.clone(),
                player: config.player,
                ..AppState::default()
            };
            state.select_default_groups();
            if let Some(saved) = load_persisted_state() {
                state.apply_persisted(saved);
            }
            state
        }
    });
    use_context_provider(|| state.clone());

    let toasts = use_signal(Vec::<ToastMessage>::new);
    use_context_provider(|| toasts.clone());

    let backend = use_hook({
        let config = config.clone();
        move || {
            Backend(Arc::new(SimulatedGame::sample(
                &config.market_names(),
                config.catalog.len(),
            )))
        }
    });
    use_context_provider(|| backend.clone());

    // The periodic refresh-and-search cycle. Everything mutates through
    // the one state signal, so each cycle sees a consistent snapshot and
    // publishes a complete one.
    let _poller = use_future({
        let state = state.clone();
        let backend = backend.clone();
        move || {
            let state = state.clone();
            let backend = backend.clone();
            async move {
                loop {
                    tokio::time::sleep(POLL_INTERVAL).await;
                    if state.with(|st| st.scan.is_ok()) {
                        backend.advance();
                        run_cycle(state.clone(), &backend);
                    }
                }
            }
        }
    });

    rsx! {
        document::Link { rel: "icon", href: assets::icon_data_uri() }
        document::Style { "{assets::main_css()}" }
        Router::<Route> {}
        Toast {}
    }
}

/// Runs a market scan and, on success, an immediate first cycle.
/// A failed scan leaves the previous market list untouched.
pub fn scan_markets(
    mut state: Signal<AppState>,
    toasts: Signal<Vec<ToastMessage>>,
    backend: &Backend,
) {
    println!("🔍 Scanning for markets...");
    state.with_mut(|st| st.scan = ScanStatus::Scanning);

    let catalog = state.with(|st| st.catalog.clone());
    match discover_markets(backend.memory(), &catalog) {
        Ok(markets) => {
            let count = markets.len();
            println!("✅ Found {count} markets.");
            state.with_mut(|st| {
                st.markets = markets;
                st.scan = ScanStatus::Found(count);
            });
            run_cycle(state, backend);
            push_toast(toasts, ToastKind::Success, format!("Found {count} markets."));
        }
        Err(err) => {
            let found = match &err {
                DiscoveryError::MarketCount { found } => *found,
                DiscoveryError::Memory(_) => 0,
            };
            println!("⚠️ {err}");
            state.with_mut(|st| st.scan = ScanStatus::Failed { found });
            push_toast(toasts, ToastKind::Error, format!("Market scan failed: {err}"));
        }
    }
}

/// One atomic refresh-and-search cycle: every market refreshes first,
/// then the route search runs over the fresh snapshot.
pub fn run_cycle(mut state: Signal<AppState>, backend: &Backend) {
    let mem = backend.memory();
    state.with_mut(|st| {
        let rate = st.player.conversion_rate;
        refresh_markets(mem, &mut st.markets, rate);
        st.routes = search_routes(
            &st.start_groups,
            &st.end_groups,
            &st.player,
            &st.markets,
            &st.groups,
        );
    });
}

pub fn persist_user_state(state: &Signal<AppState>) {
    let snapshot = state.with(|st| st.to_persisted());
    if let Err(err) = save_persisted_state(&snapshot) {
        println!("Failed to persist user state: {err}");
    }
}

#[component]
pub fn Scanner() -> Element {
    rsx! { Shell { ScannerPage {} } }
}

#[component]
pub fn Markets() -> Element {
    rsx! { Shell { MarketsPage {} } }
}
