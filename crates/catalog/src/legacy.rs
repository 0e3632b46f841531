//! Import of generated per-node handler scripts.
//!
//! Each script is one exported function that switches on `event.type` and
//! calls a single `vggSdk` method per case. The import turns every case into
//! a [`Binding`] of a [`HandlerRecord`].

use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use shared::{
    domain::{EventType, TransitionOptions},
    protocol::{ActionSpec, Binding, CatalogDocument, HandlerRecord, DEFAULT_URL_TARGET},
};
use tracing::{debug, info};

const FUNCTION_PREFIX: &str = "function fun_";
const SDK_RECEIVER: &str = "vggSdk.";
const EVENT_TARGET: &str = "event.target";
// handle bookkeeping emitted around the switch
const BOOKKEEPING_CALLS: [&str; 2] = ["setEnv(", "delete("];

#[derive(Debug, Clone, PartialEq)]
enum Arg {
    EventTarget,
    Literal(Value),
}

struct OpenCase {
    event_type: EventType,
    line: usize,
    action: Option<ActionSpec>,
}

pub fn import_script(source: &str) -> Result<HandlerRecord> {
    let mut handler_id = None;
    let mut bindings = Vec::new();
    let mut open: Option<OpenCase> = None;

    for (index, raw_line) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();

        if let Some(rest) = line.strip_prefix(FUNCTION_PREFIX) {
            let name = rest
                .split('(')
                .next()
                .filter(|name| !name.is_empty())
                .ok_or_else(|| anyhow!("line {line_no}: malformed handler function"))?;
            handler_id = Some(name.replace('_', ":"));
            continue;
        }

        if let Some(event_name) = parse_case_label(line) {
            close_case(&mut open, &mut bindings);
            let event_type = event_name
                .parse::<EventType>()
                .with_context(|| format!("line {line_no}: unsupported case label"))?;
            open = Some(OpenCase {
                event_type,
                line: line_no,
                action: None,
            });
            continue;
        }

        if line.starts_with("default:") {
            close_case(&mut open, &mut bindings);
            continue;
        }

        if let Some(call) = line.strip_prefix(SDK_RECEIVER) {
            if BOOKKEEPING_CALLS.iter().any(|name| call.starts_with(name)) {
                continue;
            }
            let Some(case) = open.as_mut() else {
                continue;
            };
            if case.action.is_some() {
                bail!(
                    "line {line_no}: case '{}' calls the SDK more than once",
                    case.event_type
                );
            }
            let action =
                parse_sdk_call(call).with_context(|| format!("line {line_no}: bad SDK call"))?;
            case.action = Some(action);
        }
    }
    close_case(&mut open, &mut bindings);

    let id = handler_id.ok_or_else(|| anyhow!("no handler function found"))?;
    Ok(HandlerRecord {
        id: id.into(),
        bindings,
    })
}

/// Imports every `.mjs`/`.js` script of a directory in file-name order.
pub fn import_dir(dir: &Path) -> Result<CatalogDocument> {
    let mut scripts = Vec::new();
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to list script directory '{}'", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let is_script = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "mjs" || ext == "js");
        if path.is_file() && is_script {
            scripts.push(path);
        }
    }
    scripts.sort();

    let mut handlers = Vec::with_capacity(scripts.len());
    for path in &scripts {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read script '{}'", path.display()))?;
        let record = import_script(&source)
            .with_context(|| format!("failed to import script '{}'", path.display()))?;
        debug!(
            path = %path.display(),
            handler = %record.id,
            bindings = record.bindings.len(),
            "script imported"
        );
        handlers.push(record);
    }

    info!(dir = %dir.display(), scripts = handlers.len(), "legacy scripts imported");
    Ok(CatalogDocument { handlers })
}

fn parse_case_label(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("case")?.trim_start();
    let rest = rest.strip_prefix('"')?;
    let (name, tail) = rest.split_once('"')?;
    tail.trim_start().starts_with(':').then_some(name)
}

fn close_case(open: &mut Option<OpenCase>, bindings: &mut Vec<Binding>) {
    let Some(case) = open.take() else {
        return;
    };
    match case.action {
        Some(action) => bindings.push(Binding {
            on: case.event_type,
            action,
        }),
        None => debug!(
            event_type = %case.event_type,
            line = case.line,
            "case has no SDK call"
        ),
    }
}

fn parse_sdk_call(call: &str) -> Result<ActionSpec> {
    let call = call.trim_end_matches(';').trim_end();
    let (method, rest) = call
        .split_once('(')
        .ok_or_else(|| anyhow!("missing argument list"))?;
    let args = rest
        .strip_suffix(')')
        .ok_or_else(|| anyhow!("unterminated argument list"))?;
    let args = split_args(args)?
        .into_iter()
        .map(parse_arg)
        .collect::<Result<Vec<_>>>()?;

    let action = match method.trim() {
        "openUrl" => ActionSpec::OpenUrl {
            url: literal_str(&args, 0)?.to_string(),
            target: optional_str(&args, 1)?.unwrap_or(DEFAULT_URL_TARGET).to_string(),
        },
        "presentState" => {
            expect_event_target(&args, method)?;
            ActionSpec::PresentState {
                from_state: literal_str(&args, 1)?.into(),
                to_state: literal_str(&args, 2)?.into(),
                options: transition_options(&args, 3)?,
            }
        }
        "setState" => {
            expect_event_target(&args, method)?;
            ActionSpec::SetState {
                from_state: literal_str(&args, 1)?.into(),
                to_state: literal_str(&args, 2)?.into(),
                options: transition_options(&args, 3)?,
            }
        }
        "dismissState" => {
            expect_event_target(&args, method)?;
            ActionSpec::DismissState
        }
        "setCurrentFrameById" => ActionSpec::SetCurrentFrame {
            frame_id: literal_str(&args, 0)?.into(),
        },
        "presentFrameById" => ActionSpec::PresentFrame {
            frame_id: literal_str(&args, 0)?.into(),
        },
        "dismissFrame" => ActionSpec::DismissFrame,
        other => bail!("unsupported SDK method '{other}'"),
    };
    Ok(action)
}

/// Splits on commas outside of string literals, objects and arrays.
fn split_args(args: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;

    for (index, ch) in args.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| anyhow!("unbalanced '{ch}' in arguments"))?;
            }
            ',' if depth == 0 => {
                parts.push(args[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    if in_string || depth != 0 {
        bail!("unterminated literal in arguments");
    }

    let last = args[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    Ok(parts)
}

fn parse_arg(raw: &str) -> Result<Arg> {
    if raw == EVENT_TARGET {
        return Ok(Arg::EventTarget);
    }
    serde_json::from_str(raw)
        .map(Arg::Literal)
        .with_context(|| format!("argument '{raw}' is not a literal"))
}

fn expect_event_target(args: &[Arg], method: &str) -> Result<()> {
    match args.first() {
        Some(Arg::EventTarget) => Ok(()),
        _ => bail!("{method} must target event.target"),
    }
}

fn literal_str(args: &[Arg], index: usize) -> Result<&str> {
    optional_str(args, index)?.ok_or_else(|| anyhow!("missing string argument {index}"))
}

fn optional_str(args: &[Arg], index: usize) -> Result<Option<&str>> {
    match args.get(index) {
        None => Ok(None),
        Some(Arg::Literal(Value::String(value))) => Ok(Some(value.as_str())),
        Some(other) => bail!("argument {index} should be a string, got {other:?}"),
    }
}

fn transition_options(args: &[Arg], index: usize) -> Result<TransitionOptions> {
    match args.get(index) {
        None => Ok(TransitionOptions::default()),
        Some(Arg::Literal(value)) => serde_json::from_value(value.clone())
            .with_context(|| format!("argument {index} is not a transition options object")),
        Some(Arg::EventTarget) => bail!("argument {index} should be transition options"),
    }
}
