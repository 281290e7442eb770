#![allow(dead_code)]

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::entities::{MarketState, PlayerProfile, ProductCatalog};
use super::trade_route::{IslandGroups, TradeRoute};

/// Outcome of the last market scan, shown in the shell header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ScanStatus {
    #[default]
    Idle,
    Scanning,
    Found(usize),
    Failed {
        found: usize,
    },
}

impl ScanStatus {
    pub fn label(&self) -> String {
        match self {
            ScanStatus::Idle => "Not scanned yet".to_string(),
            ScanStatus::Scanning => "Scanning for markets...".to_string(),
            ScanStatus::Found(count) => format!("Found {count} markets"),
            ScanStatus::Failed { found } => {
                format!("Scan failed: found {found} markets, expected 27")
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ScanStatus::Found(_))
    }
}

/// All shared session state, owned by a single Dioxus signal. The polling
/// loop and the UI callbacks both go through this struct; nothing in the
/// domain reads ambient globals.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub catalog: ProductCatalog,
    pub groups: IslandGroups,
    pub player: PlayerProfile,
    /// Discovered markets; empty until a scan finds exactly 27.
    pub markets: Vec<MarketState>,
    /// Result of the latest refresh-and-search cycle.
    pub routes: Vec<TradeRoute>,
    pub start_groups: HashSet<String>,
    pub end_groups: HashSet<String>,
    pub scan: ScanStatus,
}

impl AppState {
    /// Initial group selection: sources restricted to the first configured
    /// group, destinations wide open.
    pub fn select_default_groups(&mut self) {
        self.start_groups = self.groups.first_name().map(str::to_string).into_iter().collect();
        self.end_groups = self.groups.names().map(str::to_string).collect();
    }

    pub fn toggle_start_group(&mut self, name: &str) {
        toggle(&mut self.start_groups, name);
    }

    pub fn toggle_end_group(&mut self, name: &str) {
        toggle(&mut self.end_groups, name);
    }

    pub fn apply_persisted(&mut self, persisted: PersistedState) {
        self.player = persisted.player;
        if !persisted.start_groups.is_empty() {
            self.start_groups = persisted.start_groups.into_iter().collect();
        }
        if !persisted.end_groups.is_empty() {
            self.end_groups = persisted.end_groups.into_iter().collect();
        }
    }

    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            player: self.player,
            start_groups: sorted(&self.start_groups),
            end_groups: sorted(&self.end_groups),
        }
    }
}

fn toggle(selection: &mut HashSet<String>, name: &str) {
    if !selection.remove(name) {
        selection.insert(name.to_string());
    }
}

fn sorted(selection: &HashSet<String>) -> Vec<String> {
    let mut names: Vec<String> = selection.iter().cloned().collect();
    names.sort();
    names
}

/// User state written to disk between sessions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub player: PlayerProfile,
    #[serde(default)]
    pub start_groups: Vec<String>,
    #[serde(default)]
    pub end_groups: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState {
            groups: IslandGroups::new(vec![
                ("Al'Ankh".into(), vec!["Neverisle".into()]),
                ("Aestrin".into(), vec!["Fort Aestrin".into()]),
            ]),
            ..AppState::default()
        }
    }

    #[test]
    fn default_selection_is_first_source_all_dests() {
        let mut state = state();
        state.select_default_groups();
        assert_eq!(state.start_groups.len(), 1);
        assert!(state.start_groups.contains("Al'Ankh"));
        assert_eq!(state.end_groups.len(), 2);
    }

    #[test]
    fn toggling_flips_membership() {
        let mut state = state();
        state.select_default_groups();
        state.toggle_start_group("Al'Ankh");
        assert!(state.start_groups.is_empty());
        state.toggle_start_group("Aestrin");
        assert!(state.start_groups.contains("Aestrin"));
    }

    #[test]
    fn persisted_round_trip() {
        let mut state = state();
        state.select_default_groups();
        state.player.principal = 42_000.0;

        let mut restored = AppState::default();
        restored.apply_persisted(state.to_persisted());
        assert_eq!(restored.player.principal, 42_000.0);
        assert_eq!(restored.start_groups, state.start_groups);
        assert_eq!(restored.end_groups, state.end_groups);
    }

    #[test]
    fn empty_persisted_groups_keep_defaults() {
        let mut state = state();
        state.select_default_groups();
        let before = state.start_groups.clone();
        state.apply_persisted(PersistedState::default());
        assert_eq!(state.start_groups, before);
    }
}
