use super::{replay, ReplaySummary};

use std::sync::Arc;

use catalog::HandlerCatalog;
use sdk_integration::{RecordingProvider, SdkCall};
use shared::{
    domain::{EnvContext, EventType},
    protocol::{ActionSpec, CatalogDocument, HandlerRecord},
};

fn hover_catalog() -> HandlerCatalog {
    let record = HandlerRecord::new("19:17")
        .bind(
            EventType::MouseEnter,
            ActionSpec::PresentState {
                from_state: "19:17".into(),
                to_state: "19:28".into(),
                options: Default::default(),
            },
        )
        .bind(EventType::MouseLeave, ActionSpec::DismissState);
    HandlerCatalog::from_document(CatalogDocument {
        handlers: vec![record],
    })
    .expect("catalog")
}

#[tokio::test]
async fn replay_counts_every_line_and_keeps_going() {
    let input = concat!(
        "{\"handler\": \"19:17\", \"event\": {\"type\": \"mouseenter\", \"target\": \"19:17\"}}\n",
        "\n",
        "{\"handler\": \"19:17\", \"event\": {\"type\": \"click\", \"target\": \"19:17\"}}\n",
        "not json\n",
        "{\"handler\": \"0:0\", \"event\": {\"type\": \"click\"}}\n",
        "{\"handler\": \"19:17\", \"event\": {\"type\": \"mouseleave\"}}\n",
        "{\"handler\": \"19:17\", \"event\": {\"type\": \"mouseleave\", \"target\": \"19:17\"}}\n",
    );
    let provider = RecordingProvider::new().with_env(false);

    let summary = replay(
        input.as_bytes(),
        &hover_catalog(),
        Arc::new(provider.clone()),
        None,
    )
    .await
    .expect("replay");

    assert_eq!(
        summary,
        ReplaySummary {
            performed: 2,
            ignored: 1,
            failed: 3,
        }
    );

    let mutating: Vec<_> = provider
        .calls()
        .into_iter()
        .filter(SdkCall::is_state_mutating)
        .map(|call| call.name())
        .collect();
    assert_eq!(mutating, vec!["present_state", "dismiss_state"]);
}

#[tokio::test]
async fn replay_passes_the_configured_env() {
    let input = "{\"handler\": \"19:17\", \"event\": {\"type\": \"mouseleave\", \"target\": \"n\"}}\n";
    let provider = RecordingProvider::new();
    let env = EnvContext::from("viewer");

    replay(
        input.as_bytes(),
        &hover_catalog(),
        Arc::new(provider.clone()),
        Some(&env),
    )
    .await
    .expect("replay");

    assert_eq!(
        provider.calls().first(),
        Some(&SdkCall::SetEnv { env: "viewer".into() })
    );
}
