//! Scrapers supported by 4get
//!
//! The machine value is what goes into the `scraper` query parameter; the
//! label is for humans.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A 4get scraper backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchEngine {
    #[serde(rename = "ddg")]
    DuckDuckGo,
    Brave,
    MullvadBrave,
    Yandex,
    Google,
    GoogleCse,
    MullvadGoogle,
    Startpage,
    Qwant,
    Ghostery,
    Yep,
    Greppr,
    Crowdview,
    Mwmbl,
    Mojeek,
    Baidu,
    Coccoc,
    Solofield,
    Marginalia,
    Wiby,
    Curlie,
}

impl SearchEngine {
    pub const ALL: [SearchEngine; 21] = [
        SearchEngine::DuckDuckGo,
        SearchEngine::Brave,
        SearchEngine::MullvadBrave,
        SearchEngine::Yandex,
        SearchEngine::Google,
        SearchEngine::GoogleCse,
        SearchEngine::MullvadGoogle,
        SearchEngine::Startpage,
        SearchEngine::Qwant,
        SearchEngine::Ghostery,
        SearchEngine::Yep,
        SearchEngine::Greppr,
        SearchEngine::Crowdview,
        SearchEngine::Mwmbl,
        SearchEngine::Mojeek,
        SearchEngine::Baidu,
        SearchEngine::Coccoc,
        SearchEngine::Solofield,
        SearchEngine::Marginalia,
        SearchEngine::Wiby,
        SearchEngine::Curlie,
    ];

    /// Value sent as the `scraper` parameter
    pub fn as_str(&self) -> &'static str {
        self.entry().0
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        self.entry().1
    }

    fn entry(&self) -> (&'static str, &'static str) {
        match self {
            SearchEngine::DuckDuckGo => ("ddg", "DuckDuckGo"),
            SearchEngine::Brave => ("brave", "Brave"),
            SearchEngine::MullvadBrave => ("mullvad_brave", "Mullvad (Brave)"),
            SearchEngine::Yandex => ("yandex", "Yandex"),
            SearchEngine::Google => ("google", "Google"),
            SearchEngine::GoogleCse => ("google_cse", "Google CSE"),
            SearchEngine::MullvadGoogle => ("mullvad_google", "Mullvad (Google)"),
            SearchEngine::Startpage => ("startpage", "Startpage"),
            SearchEngine::Qwant => ("qwant", "Qwant"),
            SearchEngine::Ghostery => ("ghostery", "Ghostery"),
            SearchEngine::Yep => ("yep", "Yep"),
            SearchEngine::Greppr => ("greppr", "Greppr"),
            SearchEngine::Crowdview => ("crowdview", "Crowdview"),
            SearchEngine::Mwmbl => ("mwmbl", "Mwmbl"),
            SearchEngine::Mojeek => ("mojeek", "Mojeek"),
            SearchEngine::Baidu => ("baidu", "Baidu"),
            SearchEngine::Coccoc => ("coccoc", "Coc Coc"),
            SearchEngine::Solofield => ("solofield", "Solofield"),
            SearchEngine::Marginalia => ("marginalia", "Marginalia"),
            SearchEngine::Wiby => ("wiby", "wiby"),
            SearchEngine::Curlie => ("curlie", "Curlie"),
        }
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SearchEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchEngine::ALL
            .iter()
            .copied()
            .find(|engine| engine.as_str() == s)
            .ok_or_else(|| format!("unknown search engine: {}", s))
    }
}
