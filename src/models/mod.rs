//! Data models for Inventrack

pub mod assignment;
pub mod enums;
pub mod resource;

// Re-export commonly used types
pub use assignment::{Assignment, AssignmentQuery, CreateAssignment, NewAssignment, UpdateAssignment};
pub use enums::{AssignmentStatus, ResourceStatus, ResourceType, SortDirection, SortField};
pub use resource::{CreateResource, NewResource, Resource, ResourceFilter, ResourceSearch, UpdateResource};
