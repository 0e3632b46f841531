use super::*;
use dispatcher::DispatchOutcome;
use sdk_integration::{RecordingProvider, SdkCall};
use shared::domain::{EventType, UiEvent};

const BUTTON_JSON: &str = r#"{
  "handlers": [
    {
      "id": "19:17",
      "bindings": [
        { "on": "click", "action": { "type": "open_url", "url": "https://example.com/docs" } },
        { "on": "mouseleave", "action": { "type": "dismiss_state" } }
      ]
    }
  ]
}"#;

const MENU_TOML: &str = r#"
[[handlers]]
id = "1:105"

[[handlers.bindings]]
on = "click"
action = { type = "set_state", from_state = "1:105", to_state = "1:51" }
"#;

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("write fixture");
    path
}

#[test]
fn loads_json_and_toml_documents_from_a_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "a_button.json", BUTTON_JSON);
    write(dir.path(), "b_menu.toml", MENU_TOML);
    write(dir.path(), "notes.txt", "not a catalog");

    let catalog = HandlerCatalog::load(dir.path()).expect("catalog");
    assert_eq!(catalog.len(), 2);
    let ids: Vec<_> = catalog.ids().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec!["1:105", "19:17"]);

    let button = catalog.get("19:17").expect("button");
    assert_eq!(button.len(), 2);
    assert!(button.action_for(EventType::MouseEnter).is_none());
}

#[test]
fn single_file_path_is_accepted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write(dir.path(), "menu.toml", MENU_TOML);

    let catalog = HandlerCatalog::load(&file).expect("catalog");
    assert_eq!(catalog.len(), 1);
    assert!(catalog.get("1:105").is_some());
}

#[test]
fn duplicate_handler_ids_across_files_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "one.json", BUTTON_JSON);
    write(dir.path(), "two.json", BUTTON_JSON);

    let err = HandlerCatalog::load(dir.path()).expect_err("duplicate");
    let message = format!("{err:#}");
    assert!(message.contains("two.json"), "{message}");
    assert!(message.contains("19:17"), "{message}");
}

#[test]
fn malformed_document_names_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "broken.json", "{ \"handlers\": [ { \"id\": ");

    let err = HandlerCatalog::load(dir.path()).expect_err("malformed");
    assert!(format!("{err:#}").contains("broken.json"));
}

#[test]
fn unknown_animation_kind_fails_at_load() {
    let raw = r#"{"handlers": [{"id": "4:2", "bindings": [{"on": "click", "action": {
        "type": "present_state", "from_state": "a", "to_state": "b",
        "options": {"animation": {"type": "spin", "timingFunction": "linear", "duration": 0.3}}
    }}]}]}"#;
    assert!(DocumentFormat::Json.parse(raw).is_err());
}

#[test]
fn invalid_binding_is_rejected_by_from_document() {
    let document = CatalogDocument {
        handlers: vec![HandlerRecord::new("7:7").bind(
            EventType::Click,
            shared::protocol::ActionSpec::SetCurrentFrame {
                frame_id: " ".into(),
            },
        )],
    };
    assert!(HandlerCatalog::from_document(document).is_err());
}

#[test]
fn missing_path_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(HandlerCatalog::load(dir.path().join("absent.json")).is_err());
}

#[test]
fn dispatcher_runs_the_catalog_table() {
    let document = DocumentFormat::Json.parse(BUTTON_JSON).expect("document");
    let catalog = HandlerCatalog::from_document(document).expect("catalog");
    let provider = RecordingProvider::new();

    let dispatcher = catalog
        .dispatcher("19:17", Arc::new(provider.clone()), Some("env-1".into()))
        .expect("dispatcher");
    let outcome = dispatcher
        .handle(UiEvent::new("click", Some("19:17".into())))
        .expect("handle");
    assert_eq!(
        outcome,
        DispatchOutcome::Performed {
            event_type: EventType::Click,
            action: "open_url",
        }
    );

    let names: Vec<_> = provider.calls().iter().map(SdkCall::name).collect();
    assert_eq!(names, vec!["set_env", "open_url", "release"]);
    assert!(catalog
        .dispatcher("0:0", Arc::new(provider), None)
        .is_none());
}

#[test]
fn to_document_reloads_to_the_same_catalog() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "a.json", BUTTON_JSON);
    write(dir.path(), "b.toml", MENU_TOML);
    let catalog = HandlerCatalog::load(dir.path()).expect("catalog");

    let exported = serde_json::to_string(&catalog.to_document()).expect("export");
    let reloaded =
        HandlerCatalog::from_document(DocumentFormat::Json.parse(&exported).expect("parse"))
            .expect("reload");
    assert_eq!(reloaded.to_document(), catalog.to_document());
}
