pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;
pub mod timeline;

pub use domain::notes::OrderNotes;
pub use domain::order::{
    ApprovalRecord, ExecutionStage, OrderId, OrderLifecycle, OrderSnapshot, OrderStatus,
};
pub use errors::{ApplicationError, DomainError};
pub use pricing::{resolve_order_price, PriceSource, ResolvedPrice};
pub use timeline::{
    resolve_timeline, resolve_timeline_with, ResolvedTimeline, StepKey, TimelineOptions,
    TimelineStep,
};
