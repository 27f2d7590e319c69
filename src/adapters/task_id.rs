use uuid::Uuid;

use crate::ports::TaskIdGenerator;

/// Random (v4) UUID task identifiers: 122 bits of entropy, no registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTaskIdGenerator;

impl TaskIdGenerator for UuidTaskIdGenerator {
    fn generate(&self) -> String {
        generate_task_id()
    }
}

/// Fresh hyphenated v4 UUID.
pub fn generate_task_id() -> String {
    Uuid::new_v4().to_string()
}
