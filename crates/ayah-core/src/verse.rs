//! Verse data model and the mapping from the API's JSON into it.
//!
//! The API answers `{ "code": 200, "data": ... }` where `data` is one verse object for the
//! plain form and an array of per-edition verse objects for the editions form.

use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::trace;

use crate::edition::{Role, Variant};
use crate::error::FetchError;

/// Number of verses in the text; identifiers are 1-based.
pub const TOTAL_VERSES: u32 = 6236;

/// Success sentinel in the body's `code` field.
const API_SUCCESS_CODE: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerseRequest {
    number: u32,
    variant: Variant,
}

impl VerseRequest {
    /// Returns `None` when `number` is outside `1..=TOTAL_VERSES`.
    pub fn new(number: u32, variant: Variant) -> Option<Self> {
        (1..=TOTAL_VERSES)
            .contains(&number)
            .then_some(Self { number, variant })
    }

    /// Uniform draw over every verse. Repeats across calls are allowed.
    pub fn random<R: Rng>(rng: &mut R, variant: Variant) -> Self {
        Self {
            number: rng.random_range(1..=TOTAL_VERSES),
            variant,
        }
    }

    /// Same draw using the thread-local generator.
    pub fn pick(variant: Variant) -> Self {
        Self::random(&mut rand::rng(), variant)
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Request path below the API base, e.g. `262/editions/quran-uthmani,en.sahih`.
    pub fn path(&self) -> String {
        match self.variant.edition_path() {
            Some(editions) => format!("{}/editions/{}", self.number, editions),
            None => self.number.to_string(),
        }
    }
}

/// Where a verse sits: its chapter and its ordinal inside that chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reference {
    pub surah_name: Option<String>,
    pub surah_number: Option<u32>,
    pub number_in_surah: Option<u32>,
}

impl Reference {
    /// English surah name, or `Surah {number}` when the name is missing.
    pub fn surah_label(&self) -> String {
        match (&self.surah_name, self.surah_number) {
            (Some(name), _) if !name.is_empty() => name.clone(),
            (_, Some(number)) => format!("Surah {}", number),
            _ => "Surah Unknown".to_string(),
        }
    }

    /// Display label `"{surah} • {ayah}"`.
    pub fn label(&self) -> String {
        let ayah = self
            .number_in_surah
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string());
        format!("{} • {}", self.surah_label(), ayah)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditionResult {
    pub text: String,
    pub audio: Option<String>,
    pub reference: Reference,
}

/// One fetched verse, demultiplexed by role. The Arabic text is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseResult {
    arabic: EditionResult,
    others: HashMap<Role, EditionResult>,
}

impl VerseResult {
    /// Builds a result from role-tagged editions, failing when no Arabic text is among them.
    pub fn from_editions(
        mut editions: HashMap<Role, EditionResult>,
    ) -> Result<Self, FetchError> {
        let arabic = editions
            .remove(&Role::Arabic)
            .ok_or(FetchError::MissingPrimaryText)?;
        Ok(Self {
            arabic,
            others: editions,
        })
    }

    pub fn arabic(&self) -> &EditionResult {
        &self.arabic
    }

    pub fn get(&self, role: Role) -> Option<&EditionResult> {
        match role {
            Role::Arabic => Some(&self.arabic),
            other => self.others.get(&other),
        }
    }

    /// Non-empty text for `role`, if the response carried one.
    pub fn text(&self, role: Role) -> Option<&str> {
        self.get(role)
            .map(|e| e.text.as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn reference(&self) -> &Reference {
        &self.arabic.reference
    }

    /// Recitation URL taken from the audio edition.
    pub fn audio_url(&self) -> Option<&str> {
        self.get(Role::Audio)
            .and_then(|e| e.audio.as_deref())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    code: Option<i64>,
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AyahObject {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    audio: Option<String>,
    #[serde(default)]
    number_in_surah: Option<u32>,
    #[serde(default)]
    surah: Option<SurahObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SurahObject {
    #[serde(default)]
    english_name: Option<String>,
    #[serde(default)]
    number: Option<u32>,
}

impl From<AyahObject> for EditionResult {
    fn from(obj: AyahObject) -> Self {
        let (surah_name, surah_number) = match obj.surah {
            Some(s) => (s.english_name, s.number),
            None => (None, None),
        };
        Self {
            text: obj.text.unwrap_or_default(),
            audio: obj.audio,
            reference: Reference {
                surah_name,
                surah_number,
                number_in_surah: obj.number_in_surah,
            },
        }
    }
}

/// Maps a response body onto a [`VerseResult`] for `variant`.
pub fn parse_response(variant: Variant, body: &str) -> Result<VerseResult, FetchError> {
    let raw: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::Malformed(format!("invalid JSON: {}", e)))?;
    if !raw.is_object() {
        return Err(FetchError::Malformed("expected a response object".to_string()));
    }
    let envelope: Envelope = serde_json::from_value(raw)
        .map_err(|e| FetchError::Malformed(format!("bad envelope: {}", e)))?;

    if envelope.code != Some(API_SUCCESS_CODE) {
        return Err(FetchError::Malformed(format!(
            "API returned code {:?}",
            envelope.code
        )));
    }

    let data = envelope
        .data
        .ok_or_else(|| FetchError::Malformed("missing data field".to_string()))?;

    let mut editions = HashMap::new();

    if variant.editions().is_empty() {
        if !data.is_object() {
            return Err(FetchError::Malformed("expected a verse object".to_string()));
        }
        let obj: AyahObject = serde_json::from_value(data)
            .map_err(|e| FetchError::Malformed(format!("bad verse object: {}", e)))?;
        editions.insert(Role::Arabic, EditionResult::from(obj));
    } else {
        let Value::Array(items) = data else {
            return Err(FetchError::Malformed(
                "expected a list of edition results".to_string(),
            ));
        };

        for item in items {
            let identifier = item
                .get("edition")
                .and_then(|e| e.get("identifier"))
                .and_then(Value::as_str);
            let Some(role) = identifier.and_then(|id| variant.role_for(id)) else {
                trace!(?identifier, "Ignoring unrequested edition");
                continue;
            };
            let obj: AyahObject = serde_json::from_value(item)
                .map_err(|e| FetchError::Malformed(format!("bad {} edition: {}", role.label(), e)))?;
            editions.insert(role, EditionResult::from(obj));
        }
    }

    VerseResult::from_editions(editions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_request_bounds() {
        assert!(VerseRequest::new(0, Variant::Basic).is_none());
        assert!(VerseRequest::new(1, Variant::Basic).is_some());
        assert!(VerseRequest::new(TOTAL_VERSES, Variant::Basic).is_some());
        assert!(VerseRequest::new(TOTAL_VERSES + 1, Variant::Basic).is_none());
    }

    #[test]
    fn test_random_request_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let n = VerseRequest::random(&mut rng, Variant::Translations).number();
            assert!((1..=TOTAL_VERSES).contains(&n));
        }
    }

    #[test]
    fn test_request_path() {
        let plain = VerseRequest::new(262, Variant::Basic).unwrap();
        assert_eq!(plain.path(), "262");

        let editions = VerseRequest::new(262, Variant::Translations).unwrap();
        assert_eq!(
            editions.path(),
            "262/editions/quran-uthmani,en.sahih,bn.bengali"
        );
    }

    #[test]
    fn test_reference_label_fallbacks() {
        let named = Reference {
            surah_name: Some("Al-Fatihah".to_string()),
            surah_number: Some(1),
            number_in_surah: Some(1),
        };
        assert_eq!(named.label(), "Al-Fatihah • 1");

        let unnamed = Reference {
            surah_name: None,
            surah_number: Some(5),
            number_in_surah: Some(3),
        };
        assert_eq!(unnamed.label(), "Surah 5 • 3");

        let empty_name = Reference {
            surah_name: Some(String::new()),
            surah_number: Some(9),
            number_in_surah: Some(2),
        };
        assert_eq!(empty_name.surah_label(), "Surah 9");

        assert_eq!(Reference::default().surah_label(), "Surah Unknown");
    }

    #[test]
    fn test_parse_editions_form() {
        let body = r#"{"code":200,"data":[
            {"edition":{"identifier":"quran-uthmani"},"text":"بسم الله","surah":{"englishName":"Al-Fatihah","number":1},"numberInSurah":1},
            {"edition":{"identifier":"en.sahih"},"text":"In the name of Allah","surah":{"englishName":"Al-Fatihah","number":1},"numberInSurah":1},
            {"edition":{"identifier":"ar.alafasy"},"text":"بسم الله","audio":"https://cdn.example/1.mp3","surah":{"number":1},"numberInSurah":1},
            {"edition":{"identifier":"fr.hamidullah"},"text":"Au nom d'Allah"}
        ]}"#;

        let result = parse_response(Variant::Recitation, body).unwrap();
        assert_eq!(result.arabic().text, "بسم الله");
        assert_eq!(result.text(Role::English), Some("In the name of Allah"));
        assert_eq!(result.text(Role::Bengali), None);
        assert_eq!(result.audio_url(), Some("https://cdn.example/1.mp3"));
        assert_eq!(result.reference().label(), "Al-Fatihah • 1");
    }

    #[test]
    fn test_parse_single_object_form() {
        let body = r#"{"code":200,"data":{"text":"الحمد لله","surah":{"englishName":"Al-Fatihah","number":1},"numberInSurah":2}}"#;
        let result = parse_response(Variant::Basic, body).unwrap();
        assert_eq!(result.arabic().text, "الحمد لله");
        assert_eq!(result.reference().label(), "Al-Fatihah • 2");
    }

    #[test]
    fn test_parse_rejects_failure_sentinel() {
        let body = r#"{"code":404,"status":"NOT FOUND","data":"Not found"}"#;
        let err = parse_response(Variant::Translations, body).unwrap_err();
        assert_eq!(err.kind(), "malformed_response");
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        let body = r#"{"code":200,"data":{"text":"x"}}"#;
        let err = parse_response(Variant::Translations, body).unwrap_err();
        assert_eq!(err.kind(), "malformed_response");

        let body = r#"{"code":200,"data":[]}"#;
        let err = parse_response(Variant::Basic, body).unwrap_err();
        assert_eq!(err.kind(), "malformed_response");

        let err = parse_response(Variant::Basic, "<html>").unwrap_err();
        assert_eq!(err.kind(), "malformed_response");
    }

    #[test]
    fn test_parse_without_arabic_edition() {
        let body = r#"{"code":200,"data":[
            {"edition":{"identifier":"en.sahih"},"text":"In the name of Allah","surah":{"number":1},"numberInSurah":1}
        ]}"#;
        let err = parse_response(Variant::Translations, body).unwrap_err();
        assert!(matches!(err, FetchError::MissingPrimaryText));
    }

    #[test]
    fn test_items_without_edition_are_ignored() {
        let body = r#"{"code":200,"data":[
            {"text":"orphan"},
            {"edition":{"identifier":"quran-uthmani"},"text":"قل","surah":{"number":112},"numberInSurah":1}
        ]}"#;
        let result = parse_response(Variant::Translations, body).unwrap();
        assert_eq!(result.arabic().text, "قل");
        assert_eq!(result.reference().label(), "Surah 112 • 1");
    }

    #[test]
    fn test_unknown_items_do_not_spoil_the_response() {
        let body = r#"{"code":200,"data":[
            null,
            {"edition":{"identifier":"xx.future"},"numberInSurah":"1","text":42},
            {"edition":"quran-uthmani"},
            {"edition":{"identifier":"quran-uthmani"},"text":"قل هو الله أحد","surah":{"englishName":"Al-Ikhlas","number":112},"numberInSurah":1}
        ]}"#;
        let result = parse_response(Variant::Translations, body).unwrap();
        assert_eq!(result.arabic().text, "قل هو الله أحد");
        assert_eq!(result.reference().label(), "Al-Ikhlas • 1");
        assert_eq!(result.text(Role::English), None);
    }

    #[test]
    fn test_parse_rejects_top_level_array() {
        let err = parse_response(Variant::Translations, r#"[200, []]"#).unwrap_err();
        assert_eq!(err.kind(), "malformed_response");

        let err = parse_response(Variant::Basic, r#"[200, {"text":"x"}]"#).unwrap_err();
        assert_eq!(err.kind(), "malformed_response");
    }
}
