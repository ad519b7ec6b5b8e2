//! Locale-aware notification text for collection schedules

use crate::schedule::{TrashData, TrashKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ja,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Ja => "ja",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ja" | "ja-jp" => Ok(Locale::Ja),
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            other => Err(format!("unsupported locale '{}' (expected ja|en)", other)),
        }
    }
}

/// Builds the message body for a fired alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleTextBuilder {
    locale: Locale,
}

impl ScheduleTextBuilder {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Text used when nothing is due.
    pub fn fallback(&self) -> &'static str {
        match self.locale {
            Locale::Ja => "今日出せるゴミはありません",
            Locale::En => "No trash to take out today",
        }
    }

    pub fn display_name(&self, trash: &TrashData) -> String {
        if trash.kind == TrashKind::Other {
            if let Some(name) = trash.name.as_deref().map(str::trim) {
                if !name.is_empty() {
                    return name.to_string();
                }
            }
        }
        kind_name(trash.kind, self.locale).to_string()
    }

    /// Comma-joined names of `enabled`, or the fallback when empty.
    pub fn build(&self, enabled: &[&TrashData]) -> String {
        if enabled.is_empty() {
            return self.fallback().to_string();
        }
        enabled
            .iter()
            .map(|trash| self.display_name(trash))
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn kind_name(kind: TrashKind, locale: Locale) -> &'static str {
    match locale {
        Locale::Ja => match kind {
            TrashKind::Burn => "もえるゴミ",
            TrashKind::Unburn => "もえないゴミ",
            TrashKind::Plastic => "プラスチック",
            TrashKind::Bottle => "ビン",
            TrashKind::Can => "カン",
            TrashKind::Petbottle => "ペットボトル",
            TrashKind::Paper => "古紙",
            TrashKind::Resource => "資源ごみ",
            TrashKind::Coarse => "粗大ごみ",
            TrashKind::Other => "その他",
        },
        Locale::En => match kind {
            TrashKind::Burn => "Burnable",
            TrashKind::Unburn => "Non-burnable",
            TrashKind::Plastic => "Plastic",
            TrashKind::Bottle => "Bottles",
            TrashKind::Can => "Cans",
            TrashKind::Petbottle => "PET bottles",
            TrashKind::Paper => "Paper",
            TrashKind::Resource => "Recyclables",
            TrashKind::Coarse => "Bulky waste",
            TrashKind::Other => "Other",
        },
    }
}
