pub mod definition;
pub mod envelope;
pub mod severity;
pub mod validation;
pub mod violation;

pub use definition::{
    Annotation, Column, Hierarchy, MText, Measure, Model, ModelKind, NamedExpression, Partition,
    PartitionSource, Relationship, Table,
};
pub use envelope::Envelope;
pub use severity::{RuleCategory, Severity};
pub use validation::ValidationResult;
pub use violation::Violation;
