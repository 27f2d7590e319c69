/// Source of task identifiers correlating an attempt with a backend job.
pub trait TaskIdGenerator: Send + Sync {
    /// A fresh identifier, unique with overwhelming probability.
    fn generate(&self) -> String;
}
