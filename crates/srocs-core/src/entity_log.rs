//! Per-entity trajectory logging.
//!
//! After every tick, tracked entities report their position and any debug
//! annotation as one line each. Where those lines end up is the sink's
//! business; the engine binary writes one CSV file per entity.

use srocs_types::{EntityId, Vec3};
use tracing::warn;

use crate::gateway::EntityGateway;

/// One logged observation of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    /// Entity the line belongs to.
    pub entity: EntityId,
    /// Tick of the observation.
    pub tick: u64,
    /// Body origin position.
    pub position: Vec3,
    /// Free-form annotation, empty if none.
    pub text: String,
}

/// Append-only destination for log lines.
pub trait EntityLogSink {
    /// Append one line.
    fn log_line(&mut self, entity: &EntityId, tick: u64, position: Vec3, text: &str);
}

/// Sink that keeps every line in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogSink {
    /// Lines in the order they were logged.
    pub lines: Vec<LogLine>,
}

impl MemoryLogSink {
    /// Create an empty sink.
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines logged for one entity.
    pub fn for_entity<'a>(&'a self, entity: &'a EntityId) -> impl Iterator<Item = &'a LogLine> {
        self.lines.iter().filter(move |line| &line.entity == entity)
    }
}

impl EntityLogSink for MemoryLogSink {
    fn log_line(&mut self, entity: &EntityId, tick: u64, position: Vec3, text: &str) {
        self.lines.push(LogLine {
            entity: entity.clone(),
            tick,
            position,
            text: text.to_owned(),
        });
    }
}

/// Log every entity of the given types. Returns the number of lines written.
pub fn log_entities(
    tick: u64,
    gateway: &dyn EntityGateway,
    entity_types: &[String],
    sink: &mut dyn EntityLogSink,
) -> usize {
    let mut written: usize = 0;
    for entity_type in entity_types {
        let handles = match gateway.entities_by_type(entity_type) {
            Ok(handles) => handles,
            Err(e) => {
                warn!(entity_type, error = %e, "could not enumerate entities for logging");
                continue;
            }
        };
        for handle in handles {
            let (Some(id), Some(position)) = (gateway.entity_id(handle), gateway.position(handle))
            else {
                continue;
            };
            let text = gateway.annotation(handle).unwrap_or_default();
            sink.log_line(&id, tick, position, &text);
            written = written.saturating_add(1);
        }
    }
    written
}
