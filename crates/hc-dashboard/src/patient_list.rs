use std::cell::RefCell;
use std::rc::Rc;

use hc_api_types::{Pagination, Patient, PatientPage};
use hc_gateway::{Gateway, PatientQuery};

use crate::config::DashboardConfig;
use crate::fetch::{Resource, load_into};
use crate::format::format_date;
use crate::view::{Panel, Redraw};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientCard {
    pub id: String,
    pub name: String,
    pub email: String,
    pub gender: String,
    pub date_of_birth: String,
    pub phone: Option<String>,
}

impl From<&Patient> for PatientCard {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id.clone(),
            name: patient.name.clone(),
            email: patient.email.clone(),
            gender: patient.gender.clone(),
            date_of_birth: format_date(patient.date_of_birth.as_ref()),
            phone: patient.phone.clone().filter(|p| !p.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    pub current_page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientListView {
    pub search_term: String,
    pub panel: Panel<Vec<PatientCard>>,
    pub pager: Option<Pager>,
}

#[derive(Debug, Clone)]
struct Filters {
    search_term: String,
    current_page: u32,
}

/// Paged, searchable patient list. Dependencies: `{current_page, search_term}`.
pub struct PatientList {
    gateway: Rc<dyn Gateway>,
    page_size: u32,
    filters: RefCell<Filters>,
    resource: RefCell<Resource<PatientPage>>,
    redraw: Redraw,
}

impl PatientList {
    pub fn new(gateway: Rc<dyn Gateway>, config: &DashboardConfig) -> Self {
        Self {
            gateway,
            page_size: config.page_size,
            filters: RefCell::new(Filters {
                search_term: String::new(),
                current_page: 1,
            }),
            resource: RefCell::default(),
            redraw: Redraw::default(),
        }
    }

    pub fn on_change(&self, hook: Rc<dyn Fn()>) {
        self.redraw.set(hook);
    }

    pub fn search_term(&self) -> String {
        self.filters.borrow().search_term.clone()
    }

    pub fn current_page(&self) -> u32 {
        self.filters.borrow().current_page
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.resource
            .borrow()
            .data()
            .and_then(|page| page.pagination.clone())
    }

    pub async fn mount(&self) {
        self.fetch().await;
    }

    pub async fn refresh(&self) {
        self.fetch().await;
    }

    /// A new search term always starts again from page 1.
    pub async fn set_search_term(&self, term: &str) {
        {
            let mut filters = self.filters.borrow_mut();
            if filters.search_term == term {
                return;
            }
            filters.search_term = term.to_owned();
            filters.current_page = 1;
        }
        self.fetch().await;
    }

    pub async fn go_to_page(&self, page: u32) {
        let mut page = page.max(1);
        if let Some(total_pages) = self.pagination().map(|p| p.total_pages).filter(|n| *n > 0) {
            page = page.min(total_pages);
        }
        {
            let mut filters = self.filters.borrow_mut();
            if filters.current_page == page {
                return;
            }
            filters.current_page = page;
        }
        self.fetch().await;
    }

    pub async fn next_page(&self) {
        self.go_to_page(self.current_page() + 1).await;
    }

    pub async fn previous_page(&self) {
        self.go_to_page(self.current_page().saturating_sub(1)).await;
    }

    async fn fetch(&self) {
        let query = {
            let filters = self.filters.borrow();
            PatientQuery::new(filters.current_page, self.page_size, &filters.search_term)
        };
        load_into(
            "patients",
            &self.resource,
            &self.redraw,
            self.gateway.list_patients(&query),
        )
        .await;
    }

    pub fn view(&self) -> PatientListView {
        let filters = self.filters.borrow();
        let resource = self.resource.borrow();

        let (panel, pager) = if resource.is_loading() {
            (Panel::Loading("Loading patients..."), None)
        } else if let Some(err) = resource.error() {
            (
                Panel::Failed {
                    message: format!("Error: {err}"),
                },
                None,
            )
        } else if let Some(page) = resource.data() {
            let pager = page.pagination.as_ref().map(|p| Pager {
                current_page: filters.current_page,
                total_pages: p.total_pages,
                total: p.total,
                has_previous: filters.current_page > 1,
                has_next: filters.current_page < p.total_pages,
            });
            let panel = if page.patients.is_empty() {
                Panel::Empty {
                    message: "No patients found",
                    hint: (!filters.search_term.is_empty())
                        .then_some("Try adjusting your search term"),
                }
            } else {
                Panel::Ready(page.patients.iter().map(PatientCard::from).collect())
            };
            (panel, pager)
        } else {
            (Panel::Loading("Loading patients..."), None)
        };

        PatientListView {
            search_term: filters.search_term.clone(),
            panel,
            pager,
        }
    }
}
