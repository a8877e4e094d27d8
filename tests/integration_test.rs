use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use imposter::api::{self, ErrorBody, HistoryInfo, SetupInfo};
use imposter::assign::assign;
use imposter::controller::{ControllerOptions, GameController, SessionView, StartReport};
use imposter::error::GameError;
use imposter::setup::GameSetup;
use imposter::store::{FileStore, KeyValueStore, MemoryStore};
use imposter::types::{Language, RevealState, RoleCard, WordOrigin};
use imposter::words::{WordResult, WordSource, WordSourceError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tower::ServiceExt;

struct FixedSource(&'static str);

#[async_trait]
impl WordSource for FixedSource {
    async fn fetch_word(&self, _language: Language) -> WordResult<String> {
        Ok(self.0.to_string())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

struct DownSource;

#[async_trait]
impl WordSource for DownSource {
    async fn fetch_word(&self, _language: Language) -> WordResult<String> {
        Err(WordSourceError::Request("connection refused".to_string()))
    }

    fn name(&self) -> &str {
        "down"
    }
}

fn controller_with(
    store: Arc<dyn KeyValueStore>,
    source: Arc<dyn WordSource>,
    seed: u64,
) -> GameController {
    GameController::new(
        store,
        source,
        ControllerOptions {
            seed: Some(seed),
            ..ControllerOptions::default()
        },
    )
}

/// End-to-end pass through every player's reveal
#[tokio::test]
async fn test_full_game_flow() {
    let controller = controller_with(
        Arc::new(MemoryStore::new()),
        Arc::new(FixedSource("lighthouse")),
        99,
    );

    let setup = GameSetup::from_names(["Ana", "Ben", "Cleo", "Dara", "Eli"], 2, Language::English);
    let report = controller.start_game(setup).await.unwrap();
    assert_eq!(report.word_origin, WordOrigin::Source);
    assert!(report.advisory.is_none());
    assert_eq!(report.session.reveal, RevealState::NotStarted);
    assert_eq!(report.session.player_count, 5);
    assert!(report.session.card.is_none());

    let view = controller.begin().await.unwrap();
    assert_eq!(view.reveal, RevealState::ShowingPlayer(0));
    assert_eq!(view.current_player.unwrap().name, "Ana");

    let mut imposters = 0;
    for i in 0..5 {
        let view = controller.reveal().await.unwrap();
        assert_eq!(view.reveal, RevealState::AwaitingReveal(i));
        match view.card.unwrap() {
            RoleCard::Imposter => {
                imposters += 1;
                assert!(controller.is_imposter(i).await.unwrap());
            }
            RoleCard::Regular { word } => {
                assert_eq!(word, "lighthouse");
                assert!(!controller.is_imposter(i).await.unwrap());
            }
        }

        let view = controller.advance().await.unwrap();
        if i + 1 < 5 {
            assert_eq!(view.reveal, RevealState::ShowingPlayer(i + 1));
            assert!(view.card.is_none());
        } else {
            assert_eq!(view.reveal, RevealState::Finished);
            assert!(view.current_player.is_none());
        }
    }
    assert_eq!(imposters, 2);

    // Finished is terminal; only a reset leaves it
    assert!(matches!(
        controller.advance().await,
        Err(GameError::InvalidTransition { .. })
    ));
    assert!(matches!(
        controller.restart().await,
        Err(GameError::InvalidTransition {
            state: RevealState::Finished,
            action: "restart"
        })
    ));
    assert_eq!(controller.resume().await.unwrap().reveal, RevealState::Finished);

    controller.reset().await.unwrap();
    assert!(matches!(
        controller.resume().await,
        Err(GameError::NoActiveSession)
    ));
}

/// A seeded RNG yields a reproducible assignment
#[tokio::test]
async fn test_seeded_game_is_reproducible() {
    let seed = (0..1000u64)
        .find(|&seed| {
            assign(3, 1, &mut StdRng::seed_from_u64(seed))
                .unwrap()
                .contains(2)
        })
        .expect("some seed picks the last player");

    let controller = controller_with(
        Arc::new(MemoryStore::new()),
        Arc::new(FixedSource("apple")),
        seed,
    );
    let setup = GameSetup::from_names(["A", "B", "C"], 1, Language::English);
    controller.start_game(setup).await.unwrap();

    assert!(!controller.is_imposter(0).await.unwrap());
    assert!(!controller.is_imposter(1).await.unwrap());
    assert!(controller.is_imposter(2).await.unwrap());
    assert!(matches!(
        controller.is_imposter(3).await,
        Err(GameError::PlayerOutOfRange { index: 3, len: 3 })
    ));

    controller.begin().await.unwrap();
    let mut cards = Vec::new();
    for _ in 0..3 {
        cards.push(controller.reveal().await.unwrap().card.unwrap());
        controller.advance().await.unwrap();
    }
    assert_eq!(
        cards,
        vec![
            RoleCard::Regular {
                word: "apple".to_string()
            },
            RoleCard::Regular {
                word: "apple".to_string()
            },
            RoleCard::Imposter,
        ]
    );
}

/// A reload resumes the same session from the data file
#[tokio::test]
async fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("imposter.json");

    let first = controller_with(
        Arc::new(FileStore::new(path.clone())),
        Arc::new(FixedSource("volcano")),
        1,
    );
    let setup = GameSetup::from_names(["Ana", "Ben", "Cleo", "Dara"], 1, Language::German);
    let report = first.start_game(setup).await.unwrap();
    first.begin().await.unwrap();
    first.reveal().await.unwrap();

    let mut expected = Vec::new();
    for i in 0..4 {
        expected.push(first.is_imposter(i).await.unwrap());
    }
    drop(first);

    // Different seed: the stored assignment must win over a fresh draw
    let second = controller_with(
        Arc::new(FileStore::new(path.clone())),
        Arc::new(FixedSource("volcano")),
        2,
    );
    let view = second.resume().await.unwrap();
    assert_eq!(view.session_id, report.session.session_id);
    assert_eq!(view.reveal, RevealState::NotStarted);
    assert_eq!(view.language, Language::German);

    for (i, was_imposter) in expected.into_iter().enumerate() {
        assert_eq!(second.is_imposter(i).await.unwrap(), was_imposter);
    }
    assert_eq!(second.history_len().await, 1);

    let defaults = second.saved_defaults().await;
    assert_eq!(defaults.imposter_count, Some(1));
    assert_eq!(defaults.language, Some(Language::German));

    second.reset().await.unwrap();
    let third = controller_with(
        Arc::new(FileStore::new(path.clone())),
        Arc::new(FixedSource("volcano")),
        3,
    );
    assert!(matches!(
        third.resume().await,
        Err(GameError::NoActiveSession)
    ));
    assert_eq!(third.history_len().await, 1);
}

/// Word service outage falls back to the built-in list
#[tokio::test]
async fn test_outage_uses_builtin_words() {
    let controller = controller_with(Arc::new(MemoryStore::new()), Arc::new(DownSource), 4);
    let setup = GameSetup::from_names(["A", "B", "C"], 1, Language::English);

    let report = controller.start_game(setup).await.unwrap();
    assert_eq!(report.word_origin, WordOrigin::Fallback);
    assert!(report.advisory.is_some());
    assert_eq!(controller.history_len().await, 1);
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(json))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

/// Drive a game over HTTP
#[tokio::test]
async fn test_http_game_flow() {
    let controller = Arc::new(controller_with(
        Arc::new(MemoryStore::new()),
        Arc::new(FixedSource("harbor")),
        8,
    ));
    let app = api::router(controller);

    let (status, body) = send(&app, "GET", "/api/game", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.code, "NO_SESSION");

    let (status, body) = send(&app, "GET", "/api/setup?players=8", None).await;
    assert_eq!(status, StatusCode::OK);
    let info: SetupInfo = serde_json::from_slice(&body).unwrap();
    assert_eq!(info.min_players, 3);
    assert_eq!(info.imposter_options, vec![1, 2, 3]);
    assert!(info.defaults.players.is_none());

    // Too few players
    let setup = GameSetup::from_names(["A", "B"], 1, Language::English);
    let (status, body) = send(
        &app,
        "POST",
        "/api/game",
        Some(serde_json::to_string(&setup).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.code, "INVALID_CONFIGURATION");

    let setup = GameSetup::from_names(["A", "B", "C"], 1, Language::English);
    let (status, body) = send(
        &app,
        "POST",
        "/api/game",
        Some(serde_json::to_string(&setup).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let report: StartReport = serde_json::from_slice(&body).unwrap();
    assert_eq!(report.session.player_count, 3);

    // Reveal before begin
    let (status, body) = send(&app, "POST", "/api/game/reveal", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let error: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.code, "INVALID_TRANSITION");

    let (status, body) = send(&app, "POST", "/api/game/begin", None).await;
    assert_eq!(status, StatusCode::OK);
    let view: SessionView = serde_json::from_slice(&body).unwrap();
    assert_eq!(view.reveal, RevealState::ShowingPlayer(0));

    let (status, body) = send(&app, "POST", "/api/game/reveal", None).await;
    assert_eq!(status, StatusCode::OK);
    let view: SessionView = serde_json::from_slice(&body).unwrap();
    assert!(view.card.is_some());

    let (status, _) = send(&app, "POST", "/api/game/advance", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "POST", "/api/game/restart", None).await;
    assert_eq!(status, StatusCode::OK);
    let view: SessionView = serde_json::from_slice(&body).unwrap();
    assert_eq!(view.reveal, RevealState::NotStarted);

    send(&app, "POST", "/api/game/begin", None).await;
    for _ in 0..3 {
        send(&app, "POST", "/api/game/reveal", None).await;
        send(&app, "POST", "/api/game/advance", None).await;
    }
    let (status, body) = send(&app, "POST", "/api/game/restart", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let error: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.code, "INVALID_TRANSITION");

    let (status, body) = send(&app, "GET", "/api/history", None).await;
    assert_eq!(status, StatusCode::OK);
    let history: HistoryInfo = serde_json::from_slice(&body).unwrap();
    assert_eq!(history.count, 1);
    assert_eq!(history.capacity, 100);

    let (status, body) = send(&app, "POST", "/api/game/cancel", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&body).unwrap()["cancelled"],
        false
    );

    let (status, _) = send(&app, "DELETE", "/api/game", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", "/api/game", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/api/history", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, "GET", "/api/history", None).await;
    let history: HistoryInfo = serde_json::from_slice(&body).unwrap();
    assert_eq!(history.count, 0);

    // Defaults from the started game survive the reset
    let (_, body) = send(&app, "GET", "/api/setup", None).await;
    let info: SetupInfo = serde_json::from_slice(&body).unwrap();
    assert_eq!(info.defaults.players.map(|p| p.len()), Some(3));
    assert_eq!(info.imposter_options, vec![1]);
}
