use std::cell::RefCell;
use std::rc::Rc;

use hc_api_types::PlatformStats;
use hc_gateway::Gateway;

use crate::fetch::{Resource, load_into};
use crate::format::format_date_time;
use crate::view::{Panel, Redraw};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub key: &'static str,
    pub icon: &'static str,
    pub label: &'static str,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsView {
    pub cards: Vec<StatCard>,
    pub last_updated: Option<String>,
}

/// Platform-wide counters. Fetched once per mount; all totals come from
/// the server.
pub struct StatsDashboard {
    gateway: Rc<dyn Gateway>,
    resource: RefCell<Resource<PlatformStats>>,
    redraw: Redraw,
}

impl StatsDashboard {
    pub fn new(gateway: Rc<dyn Gateway>) -> Self {
        Self {
            gateway,
            resource: RefCell::default(),
            redraw: Redraw::default(),
        }
    }

    pub fn on_change(&self, hook: Rc<dyn Fn()>) {
        self.redraw.set(hook);
    }

    pub async fn mount(&self) {
        self.fetch().await;
    }

    pub async fn refresh(&self) {
        self.fetch().await;
    }

    async fn fetch(&self) {
        load_into("stats", &self.resource, &self.redraw, self.gateway.get_stats()).await;
    }

    pub fn view(&self) -> Panel<StatsView> {
        let resource = self.resource.borrow();
        if resource.is_loading() {
            return Panel::Loading("Loading statistics...");
        }
        let stats = match (resource.error(), resource.data()) {
            (Some(err), _) => {
                return Panel::Failed {
                    message: format!("Error loading statistics: {err}"),
                };
            }
            (None, Some(stats)) => stats,
            // not mounted yet
            (None, None) => return Panel::Loading("Loading statistics..."),
        };

        Panel::Ready(StatsView {
            cards: vec![
                StatCard { key: "patients", icon: "👥", label: "Total Patients", value: stats.total_patients },
                StatCard { key: "records", icon: "📋", label: "Medical Records", value: stats.total_records },
                StatCard { key: "consents", icon: "📝", label: "Total Consents", value: stats.total_consents },
                StatCard { key: "active-consents", icon: "✅", label: "Active Consents", value: stats.active_consents },
                StatCard { key: "pending-consents", icon: "⏳", label: "Pending Consents", value: stats.pending_consents },
                StatCard { key: "transactions", icon: "🔗", label: "Blockchain Transactions", value: stats.total_transactions },
            ],
            last_updated: stats
                .last_updated
                .as_ref()
                .map(|ts| format_date_time(Some(ts))),
        })
    }
}
