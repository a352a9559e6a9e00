//! Page-state controllers for the HealthChain dashboard.
//!
//! Every screen follows the same shape: local state, a fetch that re-runs when
//! one of its dependencies changes, and a pure `view()` that turns
//! `{loading, error, data, filters}` into a render model. The browser layer in
//! `ui/dashboard-wasm` only turns those models into markup.

pub mod config;
pub mod consents;
pub mod fetch;
pub mod format;
pub mod patient_detail;
pub mod patient_list;
pub mod shell;
pub mod stats;
pub mod transactions;
pub mod view;

pub use config::DashboardConfig;
pub use consents::{ConsentBoard, ConsentDraft, ConsentError, StatusFilter};
pub use fetch::Resource;
pub use patient_detail::PatientDetail;
pub use patient_list::PatientList;
pub use shell::{Shell, Tab};
pub use stats::StatsDashboard;
pub use transactions::TransactionHistory;
pub use view::{Notice, NoticeKind, Panel, Redraw};
