pub mod allocator;
pub mod link_service;
pub mod resolver;

pub use allocator::IdAllocator;
pub use link_service::{CreateLinkRequest, LinkService};
pub use resolver::Resolver;
