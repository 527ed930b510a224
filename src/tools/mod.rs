pub mod order;
pub mod paginate;
pub mod suite;

pub use order::{first_violation, is_descending, OrderViolation};
pub use paginate::{collect_articles, PageSource};
pub use suite::{run_suite, SuiteReport};
