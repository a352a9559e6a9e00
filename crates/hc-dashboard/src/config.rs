/// Screen-level knobs. The backend base URL lives in the gateway's own config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub page_size: u32,
    pub transaction_limit: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            transaction_limit: 20,
        }
    }
}
