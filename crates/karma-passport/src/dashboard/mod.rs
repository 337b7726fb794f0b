//! Read models for the worker dashboard pages.

mod router;
pub mod views;

pub use router::{dashboard_router, TaskQuery};
pub use views::TaskBoardView;
