/// Source of fresh resource IDs.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
