use std::collections::{btree_map::Entry, BTreeMap};

use shared::{
    domain::{EventType, HandlerId},
    protocol::{ActionSpec, Binding, HandlerRecord},
};

use crate::error::DispatchError;

/// Fixed event-type to action mapping of one handler.
///
/// Built once from a validated [`HandlerRecord`]; there is no way to change
/// the bindings afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerTable {
    id: HandlerId,
    actions: BTreeMap<EventType, ActionSpec>,
}

impl HandlerTable {
    pub fn from_record(record: HandlerRecord) -> Result<Self, DispatchError> {
        record
            .validate()
            .map_err(|source| DispatchError::InvalidAction {
                handler: record.id.clone(),
                source,
            })?;

        let HandlerRecord { id, bindings } = record;
        let mut actions = BTreeMap::new();
        for Binding { on, action } in bindings {
            match actions.entry(on) {
                Entry::Occupied(_) => {
                    return Err(DispatchError::DuplicateBinding {
                        handler: id,
                        event_type: on,
                    })
                }
                Entry::Vacant(slot) => {
                    slot.insert(action);
                }
            }
        }

        Ok(Self { id, actions })
    }

    pub fn id(&self) -> &HandlerId {
        &self.id
    }

    pub fn action_for(&self, event_type: EventType) -> Option<&ActionSpec> {
        self.actions.get(&event_type)
    }

    /// Looks up a raw event type string; names outside [`EventType`] never
    /// match.
    pub fn resolve(&self, raw_event_type: &str) -> Option<(EventType, &ActionSpec)> {
        let event_type = raw_event_type.parse::<EventType>().ok()?;
        self.action_for(event_type)
            .map(|action| (event_type, action))
    }

    pub fn bindings(&self) -> impl Iterator<Item = (EventType, &ActionSpec)> + '_ {
        self.actions.iter().map(|(event_type, action)| (*event_type, action))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn to_record(&self) -> HandlerRecord {
        HandlerRecord {
            id: self.id.clone(),
            bindings: self
                .bindings()
                .map(|(on, action)| Binding {
                    on,
                    action: action.clone(),
                })
                .collect(),
        }
    }
}
