use serde::{Deserialize, Serialize};

/// Semantic slot an edition fills on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Arabic,
    English,
    Bengali,
    Audio,
}

impl Role {
    /// Message shown in this role's region when the whole fetch failed.
    ///
    /// `None` for the recitation, which has no text region.
    pub fn failure_message(&self) -> Option<&'static str> {
        match self {
            Role::Arabic => Some("تعذر تحميل الآية."),
            Role::English => Some("Failed to load English translation."),
            Role::Bengali => Some("বাংলা অনুবাদ লোড করতে ব্যর্থ।"),
            Role::Audio => None,
        }
    }

    /// Placeholder for a translation the response did not carry.
    ///
    /// Only translations are optional: a missing Arabic text fails the fetch and a missing
    /// recitation leaves the transport empty.
    pub fn unavailable_placeholder(&self) -> Option<&'static str> {
        match self {
            Role::English => Some("[English translation not available]"),
            Role::Bengali => Some("[বাংলা অনুবাদ নেই]"),
            Role::Arabic | Role::Audio => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Arabic => "Arabic",
            Role::English => "English",
            Role::Bengali => "বাংলা",
            Role::Audio => "Recitation",
        }
    }
}

/// An API edition identifier bound to the role it fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edition {
    pub identifier: &'static str,
    pub role: Role,
}

const ARABIC: Edition = Edition { identifier: "quran-uthmani", role: Role::Arabic };
const ENGLISH: Edition = Edition { identifier: "en.sahih", role: Role::English };
const BENGALI: Edition = Edition { identifier: "bn.bengali", role: Role::Bengali };
const RECITATION: Edition = Edition { identifier: "ar.alafasy", role: Role::Audio };

/// Which flavour of the page to build: plain verse, with translations, or with recitation too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Basic,
    Translations,
    #[default]
    Recitation,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Basic => "basic",
            Variant::Translations => "translations",
            Variant::Recitation => "recitation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "basic" => Some(Variant::Basic),
            "translations" => Some(Variant::Translations),
            "recitation" | "audio" => Some(Variant::Recitation),
            _ => None,
        }
    }

    pub fn all() -> Vec<Variant> {
        vec![Variant::Basic, Variant::Translations, Variant::Recitation]
    }

    /// Editions requested for this variant, in request order.
    ///
    /// `Basic` requests none and uses the API's single-object form instead.
    pub fn editions(&self) -> &'static [Edition] {
        match self {
            Variant::Basic => &[],
            Variant::Translations => &[ARABIC, ENGLISH, BENGALI],
            Variant::Recitation => &[ARABIC, ENGLISH, BENGALI, RECITATION],
        }
    }

    /// Translation regions shown under the Arabic text.
    pub fn translation_roles(&self) -> Vec<Role> {
        self.editions()
            .iter()
            .map(|e| e.role)
            .filter(|r| matches!(r, Role::English | Role::Bengali))
            .collect()
    }

    pub fn has_audio(&self) -> bool {
        self.editions().iter().any(|e| e.role == Role::Audio)
    }

    pub fn role_for(&self, identifier: &str) -> Option<Role> {
        self.editions()
            .iter()
            .find(|e| e.identifier == identifier)
            .map(|e| e.role)
    }

    /// Comma-separated edition list as it appears in the request path.
    pub fn edition_path(&self) -> Option<String> {
        let editions = self.editions();
        if editions.is_empty() {
            return None;
        }
        Some(
            editions
                .iter()
                .map(|e| e.identifier)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}
