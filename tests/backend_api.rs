//! Integration tests for the backend client and the flows built on it,
//! using wiremock so no real backend is needed.

use bolo::audio_toolkit::AudioClip;
use serde_json::json;

fn clip() -> AudioClip {
    AudioClip {
        samples: vec![0.05; 1600],
        sample_rate: 16000,
    }
}

fn saree_item() -> serde_json::Value {
    json!({
        "images": ["http://cdn/img1.jpg", "http://cdn/img2.jpg"],
        "description": {
            "structured_data": {
                "title": "Banarasi silk saree",
                "color": "maroon",
                "material": "silk",
                "size": "free size",
                "price": 2499
            }
        }
    })
}

mod transcription_tests {
    use super::*;
    use bolo::api::ApiClient;
    use bolo::Error;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Happy path: the voice note comes back as text plus a language code.
    #[tokio::test]
    async fn test_transcribe_parses_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transcribe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "transcription": "lal rang ki saree",
                "language": "hi"
            })))
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let result = api.transcribe(&clip()).await.unwrap();

        assert_eq!(result.transcription, "lal rang ki saree");
        assert_eq!(result.language.as_deref(), Some("hi"));
    }

    /// A backend failure surfaces as a transcription error with the status.
    #[tokio::test]
    async fn test_transcribe_maps_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transcribe"))
            .respond_with(ResponseTemplate::new(500).set_body_string("whisper crashed"))
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let err = api.transcribe(&clip()).await.unwrap_err();

        match err {
            Error::TranscriptionFailed(msg) => {
                assert!(msg.contains("500"), "message should carry the status: {}", msg)
            }
            other => panic!("expected TranscriptionFailed, got {:?}", other),
        }
    }

    /// An empty clip is rejected before any request goes out.
    #[tokio::test]
    async fn test_empty_clip_never_reaches_the_backend() {
        let mock_server = MockServer::start().await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let empty = AudioClip {
            samples: Vec::new(),
            sample_rate: 16000,
        };
        assert!(api.transcribe(&empty).await.is_err());

        let requests = mock_server.received_requests().await.unwrap();
        assert!(requests.is_empty(), "no request should have been sent");
    }

    /// The chat dictation endpoint is a separate route.
    #[tokio::test]
    async fn test_speech_to_text_uses_api_route() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/speech-to-text"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "transcription": "mera order kahan hai",
                "language": "hi"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let result = api.speech_to_text(&clip()).await.unwrap();
        assert_eq!(result.transcription, "mera order kahan hai");

        mock_server.verify().await;
    }
}

mod generation_tests {
    use super::*;
    use bolo::api::ApiClient;
    use bolo::audio_toolkit::AudioInput;
    use bolo::dialog::{DialogState, GenerationDialog};
    use bolo::managers::RecordingManager;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct SilentInput;

    impl AudioInput for SilentInput {
        fn open(&self, _preferred_device: Option<&str>) -> anyhow::Result<()> {
            Ok(())
        }
        fn start(&self) -> anyhow::Result<()> {
            Ok(())
        }
        fn stop(&self) -> anyhow::Result<Vec<f32>> {
            Ok(vec![0.0; 1600])
        }
        fn close(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn dialog() -> GenerationDialog {
        GenerationDialog::new(RecordingManager::new(Arc::new(SilentInput)))
    }

    fn description() -> serde_json::Value {
        json!({
            "structured_data": {
                "title": "Banarasi silk saree",
                "color": "maroon",
                "price": 2499
            }
        })
    }

    /// Full happy path: attach, dictate, submit, inputs handed over.
    #[tokio::test]
    async fn test_submit_produces_listing_and_empties_dialog() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transcribe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "transcription": "maroon banarasi saree",
                "language": "hi"
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/describe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(description()))
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let mut dialog = dialog();
        dialog.attach_image("saree.jpg", vec![1, 2, 3]);

        dialog.start_voice_note(None).unwrap();
        dialog.finish_voice_note(&api).await.unwrap();
        assert_eq!(dialog.voice_text(), "maroon banarasi saree");

        let listing = dialog.submit(&api).await.unwrap();
        assert_eq!(listing.description, description());
        assert_eq!(listing.images.len(), 1);
        assert_eq!(listing.voice_text, "maroon banarasi saree");

        assert_eq!(*dialog.state(), DialogState::Done);
        assert!(dialog.images().is_empty());
        assert_eq!(dialog.voice_text(), "");
    }

    /// Validation failures never produce a request.
    #[tokio::test]
    async fn test_incomplete_dialog_makes_no_request() {
        let mock_server = MockServer::start().await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let mut dialog = dialog();
        dialog.set_voice_text("words but no images");
        assert!(dialog.submit(&api).await.is_err());

        let mut dialog = dialog_with_image();
        assert!(dialog.submit(&api).await.is_err());

        let requests = mock_server.received_requests().await.unwrap();
        assert!(requests.is_empty(), "guards must fail locally");
    }

    fn dialog_with_image() -> GenerationDialog {
        let mut d = dialog();
        d.attach_image("saree.jpg", vec![1]);
        d
    }

    /// A failed generation keeps every input and allows a retry as-is.
    #[tokio::test]
    async fn test_failed_submit_preserves_inputs_for_retry() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/describe"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/describe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(description()))
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let mut dialog = dialog_with_image();
        dialog.set_voice_text("maroon banarasi saree");

        assert!(dialog.submit(&api).await.is_err());
        assert!(matches!(dialog.state(), DialogState::Error(_)));
        assert_eq!(dialog.images().len(), 1);
        assert_eq!(dialog.voice_text(), "maroon banarasi saree");

        let listing = dialog.submit(&api).await.unwrap();
        assert_eq!(listing.description, description());
        assert_eq!(*dialog.state(), DialogState::Done);
    }

    /// A failed transcription writes nothing into the dialog.
    #[tokio::test]
    async fn test_failed_transcription_writes_no_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transcribe"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let mut dialog = dialog();
        dialog.set_voice_text("typed by hand");

        dialog.start_voice_note(None).unwrap();
        assert_eq!(dialog.voice_text(), "", "starting a note clears the text");
        let clip = dialog.stop_voice_note().unwrap();
        assert!(dialog.transcribe_clip(&api, &clip).await.is_err());
        assert_eq!(dialog.voice_text(), "");
    }
}

mod save_tests {
    use super::*;
    use bolo::api::types::ImageAttachment;
    use bolo::api::ApiClient;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_save_to_db_returns_backend_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/save-to-db"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Saved to DB successfully!"
            })))
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let images = vec![ImageAttachment {
            file_name: "saree.jpg".to_string(),
            bytes: vec![0xFF, 0xD8],
        }];
        let confirmation = api
            .save_to_db(&images, &json!({"structured_data": {"title": "Saree"}}))
            .await
            .unwrap();

        assert_eq!(confirmation.message.as_deref(), Some("Saved to DB successfully!"));
    }

    #[tokio::test]
    async fn test_save_to_sheet_posts_description() {
        let mock_server = MockServer::start().await;

        let description = json!({"structured_data": {"title": "Saree", "price": 2499}});

        Mock::given(method("POST"))
            .and(path("/save-to-sheet"))
            .and(body_partial_json(json!({"description": description})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Saved to Google Sheets!"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let confirmation = api.save_to_sheet(&description).await.unwrap();
        assert_eq!(confirmation.message.as_deref(), Some("Saved to Google Sheets!"));

        mock_server.verify().await;
    }
}

mod catalog_tests {
    use super::*;
    use bolo::api::ApiClient;
    use bolo::catalog::CatalogView;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_products(mock_server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([
                    saree_item(),
                    {
                        "images": [],
                        "description": {"structured_data": {"title": "Cotton scarf"}}
                    }
                ])),
            )
            .mount(mock_server)
            .await;
    }

    #[tokio::test]
    async fn test_refresh_loads_items() {
        let mock_server = MockServer::start().await;
        mount_products(&mock_server).await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let mut view = CatalogView::new();
        assert_eq!(view.refresh(&api).await.unwrap(), 2);
        assert_eq!(view.items()[0].images.len(), 2);
    }

    /// Publishing marks only the chosen position, and a second publish of
    /// the same position sends nothing.
    #[tokio::test]
    async fn test_publish_marks_one_position_and_never_repeats() {
        let mock_server = MockServer::start().await;
        mount_products(&mock_server).await;

        Mock::given(method("POST"))
            .and(path("/list-on-shopify"))
            .and(body_partial_json(
                json!({"description": {"structured_data": {"title": "Banarasi silk saree"}}}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let mut view = CatalogView::new();
        view.refresh(&api).await.unwrap();

        assert!(view.publish(&api, 0).await.unwrap());
        assert!(view.is_listed(0));
        assert!(!view.is_listed(1), "other positions stay untouched");

        // No-op for an already listed position.
        assert!(!view.publish(&api, 0).await.unwrap());

        mock_server.verify().await;
    }

    /// Suggested prices land on their own row and newer ones win.
    #[tokio::test]
    async fn test_predict_annotates_row_and_overwrites() {
        let mock_server = MockServer::start().await;
        mount_products(&mock_server).await;

        Mock::given(method("POST"))
            .and(path("/predict-price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"suggested_price": 2199}
            })))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/predict-price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"suggested_price": "2,350"}
            })))
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let mut view = CatalogView::new();
        view.refresh(&api).await.unwrap();

        assert_eq!(view.predict_price(&api, 0).await.unwrap(), "2199");
        assert_eq!(view.predicted_price(0), Some("2199"));
        assert_eq!(view.predicted_price(1), None);

        assert_eq!(view.predict_price(&api, 0).await.unwrap(), "2,350");
        assert_eq!(view.predicted_price(0), Some("2,350"));
    }

    /// A failed reload keeps the current items and annotations, and the
    /// next reload goes through as usual.
    #[tokio::test]
    async fn test_failed_refresh_keeps_view_intact() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([saree_item()])))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/predict-price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"suggested_price": 999}
            })))
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let mut view = CatalogView::new();
        view.refresh(&api).await.unwrap();
        view.predict_price(&api, 0).await.unwrap();

        assert!(view.refresh(&api).await.is_err());
        assert_eq!(view.items().len(), 1);
        assert_eq!(view.predicted_price(0), Some("999"));

        // The retry lands normally and resets annotations as any reload does.
        assert_eq!(view.refresh(&api).await.unwrap(), 0);
        assert_eq!(view.predicted_price(0), None);
    }

    /// A failed predict for one row leaves every other row's annotation
    /// alone.
    #[tokio::test]
    async fn test_failed_predict_leaves_other_rows_intact() {
        let mock_server = MockServer::start().await;
        mount_products(&mock_server).await;

        Mock::given(method("POST"))
            .and(path("/predict-price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"suggested_price": 1500}
            })))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/predict-price"))
            .respond_with(ResponseTemplate::new(503).set_body_string("pricing model down"))
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let mut view = CatalogView::new();
        view.refresh(&api).await.unwrap();

        view.predict_price(&api, 0).await.unwrap();
        assert!(view.predict_price(&api, 1).await.is_err());

        assert_eq!(view.predicted_price(0), Some("1500"));
        assert_eq!(view.predicted_price(1), None);
    }

    /// Reloading the list wipes both kinds of annotations.
    #[tokio::test]
    async fn test_refresh_resets_annotations() {
        let mock_server = MockServer::start().await;
        mount_products(&mock_server).await;

        Mock::given(method("POST"))
            .and(path("/list-on-shopify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/predict-price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"suggested_price": 999}
            })))
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let mut view = CatalogView::new();
        view.refresh(&api).await.unwrap();

        view.publish(&api, 0).await.unwrap();
        view.predict_price(&api, 1).await.unwrap();

        view.refresh(&api).await.unwrap();
        assert!(!view.is_listed(0));
        assert_eq!(view.predicted_price(1), None);
    }

    /// The ad request carries the structured fields, with fallbacks for
    /// whatever the description is missing.
    #[tokio::test]
    async fn test_advertise_sends_composed_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "images": ["http://cdn/img1.jpg"],
                    "description": {"structured_data": {"title": "Banarasi silk saree", "color": "maroon"}}
                }
            ])))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/scrape-store-info"))
            .and(body_partial_json(json!({
                "title": "Banarasi silk saree",
                "image_url": "http://cdn/img1.jpg",
                "color": "maroon",
                "material": "N/A",
                "size": "N/A",
                "price": "N/A"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let mut view = CatalogView::new();
        view.refresh(&api).await.unwrap();
        view.advertise(&api, 0).await.unwrap();

        mock_server.verify().await;
    }
}

mod chat_tests {
    use super::*;
    use bolo::api::ApiClient;
    use bolo::chat::{voice_for, ChatSession, Sender, FAILURE_REPLY};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_welcome_seeds_transcript() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/chat/welcome"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Namaste! How can I help?"
            })))
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let mut session = ChatSession::new(None);
        let greeting = session.open(&api).await;

        assert_eq!(greeting.sender, Sender::Bot);
        assert_eq!(greeting.text, "Namaste! How can I help?");
    }

    /// The signed-in id travels with every question, and the reply's
    /// language picks the synthesis voice.
    #[tokio::test]
    async fn test_ask_carries_user_id_and_reply_language() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/ask"))
            .and(body_json(json!({"user_id": "u-42", "message": "order status?"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "Aapka order nikal chuka hai.",
                "lang": "hi"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let mut session = ChatSession::new(Some("u-42".to_string()));
        let reply = session.send(&api, "order status?").await.unwrap();

        assert_eq!(reply.text, "Aapka order nikal chuka hai.");
        assert_eq!(voice_for(reply.lang.as_deref()), "hi-IN");

        mock_server.verify().await;
    }

    /// Anonymous sessions omit the user_id field entirely.
    #[tokio::test]
    async fn test_anonymous_ask_omits_user_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/ask"))
            .and(body_json(json!({"message": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "Hi there!"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let mut session = ChatSession::new(None);
        let reply = session.send(&api, "hello").await.unwrap();

        assert_eq!(reply.text, "Hi there!");
        assert_eq!(reply.lang, None);

        mock_server.verify().await;
    }

    /// A server-side failure becomes a canned bot reply, keeping the
    /// transcript ordered and the session usable.
    #[tokio::test]
    async fn test_server_error_becomes_canned_reply() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/ask"))
            .respond_with(ResponseTemplate::new(500).set_body_string("llm unavailable"))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat/ask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "Back online!",
                "lang": "en"
            })))
            .mount(&mock_server)
            .await;

        let api = ApiClient::new(&mock_server.uri()).unwrap();
        let mut session = ChatSession::new(None);

        let reply = session.send(&api, "anyone there?").await.unwrap();
        assert_eq!(reply.text, FAILURE_REPLY);

        let reply = session.send(&api, "still there?").await.unwrap();
        assert_eq!(reply.text, "Back online!");

        let transcript = session.transcript();
        let texts: Vec<&str> = transcript.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["anyone there?", FAILURE_REPLY, "still there?", "Back online!"]
        );
    }
}
