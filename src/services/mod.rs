pub mod audit_service;
pub mod comment_service;
pub mod requester;

pub use audit_service::{AuditError, AuditService, ChangeEvent, ChangePage, ChangeQuery};
pub use comment_service::{CommentError, CommentLimits, CommentPage, CommentService};
pub use requester::{Requester, RequesterResolver};
