use ayah_core::{
    FetchError, NullMedia, RenderPresenter, Role, Variant, VerseFetcher, VerseRequest,
    VerseSession,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(number: u32, variant: Variant) -> VerseRequest {
    VerseRequest::new(number, variant).expect("verse number in range")
}

#[tokio::test]
async fn editions_request_maps_every_role() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/ayah/1/editions/quran-uthmani,en.sahih,bn.bengali"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "status": "OK",
            "data": [
                {
                    "edition": {"identifier": "quran-uthmani"},
                    "text": "بسم الله",
                    "surah": {"englishName": "Al-Fatihah", "number": 1},
                    "numberInSurah": 1
                },
                {
                    "edition": {"identifier": "en.sahih"},
                    "text": "In the name of Allah",
                    "surah": {"englishName": "Al-Fatihah", "number": 1},
                    "numberInSurah": 1
                },
                {
                    "edition": {"identifier": "bn.bengali"},
                    "text": "আল্লাহর নামে",
                    "surah": {"englishName": "Al-Fatihah", "number": 1},
                    "numberInSurah": 1
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = VerseFetcher::new(&format!("{}/v1/ayah/", server.uri()), Variant::Translations);
    let verse = fetcher
        .fetch_verse(&request(1, Variant::Translations))
        .await
        .expect("fetch should succeed");

    assert_eq!(verse.arabic().text, "بسم الله");
    assert_eq!(verse.text(Role::English), Some("In the name of Allah"));
    assert_eq!(verse.text(Role::Bengali), Some("আল্লাহর নামে"));
    assert_eq!(verse.reference().label(), "Al-Fatihah • 1");
}

#[tokio::test]
async fn plain_request_uses_single_object_form() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/ayah/6236"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": {
                "text": "مِنَ الْجِنَّةِ وَالنَّاسِ",
                "surah": {"number": 114},
                "numberInSurah": 6
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = VerseFetcher::new(&format!("{}/v1/ayah", server.uri()), Variant::Basic);
    let verse = fetcher
        .fetch_verse(&request(6236, Variant::Basic))
        .await
        .expect("fetch should succeed");

    assert_eq!(verse.reference().label(), "Surah 114 • 6");
}

#[tokio::test]
async fn server_error_is_transport_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = VerseFetcher::new(&server.uri(), Variant::Translations);
    let err = fetcher
        .fetch_verse(&request(42, Variant::Translations))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Transport { status: 500 }));
}

#[tokio::test]
async fn failure_sentinel_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 400,
            "status": "Bad Request",
            "data": "Please specify an Ayah number"
        })))
        .mount(&server)
        .await;

    let fetcher = VerseFetcher::new(&server.uri(), Variant::Translations);
    let err = fetcher
        .fetch_verse(&request(42, Variant::Translations))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "malformed_response");
}

#[tokio::test]
async fn random_fetch_hits_a_verse_in_range() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/\d+/editions/quran-uthmani,en\.sahih,bn\.bengali$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": [{
                "edition": {"identifier": "quran-uthmani"},
                "text": "نص",
                "surah": {"number": 3},
                "numberInSurah": 7
            }]
        })))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = VerseFetcher::new(&server.uri(), Variant::Translations);
    for _ in 0..3 {
        fetcher.fetch_random_verse().await.expect("fetch should succeed");
    }

    let requests = server.received_requests().await.expect("recording enabled");
    for req in requests {
        let number: u32 = req.url.path()[1..]
            .split('/')
            .next()
            .and_then(|n| n.parse().ok())
            .expect("numeric verse segment");
        assert!((1..=6236).contains(&number));
    }
}

#[tokio::test]
async fn session_shows_failure_message_on_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = VerseFetcher::new(&server.uri(), Variant::Translations);
    let mut session: VerseSession<NullMedia> =
        VerseSession::new(RenderPresenter::new(Variant::Translations), None);

    assert!(session.refresh(&fetcher).await);

    let view = session.view();
    assert_eq!(view.arabic.text, "تعذر تحميل الآية.");
    assert_eq!(view.translations[0].region.text, "Failed to load English translation.");
    assert_eq!(view.reference.text, "");
    assert!(!view.is_loading());
}
