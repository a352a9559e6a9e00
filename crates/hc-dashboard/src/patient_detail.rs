use std::cell::RefCell;
use std::rc::Rc;

use hc_api_types::{MedicalRecord, Patient};
use hc_gateway::{Gateway, GatewayResult};

use crate::fetch::{Resource, load_into};
use crate::format::{css_token, format_date};
use crate::view::{Panel, Redraw};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientBundle {
    pub patient: Patient,
    pub records: Vec<MedicalRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCard {
    pub id: String,
    pub title: String,
    pub record_type: String,
    pub type_class: String,
    pub date: String,
    pub doctor: Option<String>,
    pub hospital: Option<String>,
    pub status: String,
    pub status_class: String,
    pub description: Option<String>,
    pub blockchain_tx_hash: Option<String>,
}

impl From<&MedicalRecord> for RecordCard {
    fn from(record: &MedicalRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            record_type: record.record_type.clone(),
            type_class: css_token(&record.record_type),
            date: format_date(record.date.as_ref()),
            doctor: non_empty(&record.doctor),
            hospital: non_empty(&record.hospital),
            status: record.status.clone(),
            status_class: css_token(&record.status),
            description: non_empty(&record.description),
            blockchain_tx_hash: non_empty(&record.blockchain_tx_hash),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub date_of_birth: String,
    pub gender: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub wallet_address: Option<String>,
    pub records: Vec<RecordCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientDetailView {
    pub patient_id: Option<String>,
    pub panel: Panel<PatientProfile>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

/// Patient record view. Dependency: `{patient_id}`; nothing is fetched
/// until an id is supplied.
pub struct PatientDetail {
    gateway: Rc<dyn Gateway>,
    patient_id: RefCell<Option<String>>,
    resource: RefCell<Resource<PatientBundle>>,
    redraw: Redraw,
}

impl PatientDetail {
    pub fn new(gateway: Rc<dyn Gateway>) -> Self {
        Self {
            gateway,
            patient_id: RefCell::new(None),
            resource: RefCell::default(),
            redraw: Redraw::default(),
        }
    }

    pub fn on_change(&self, hook: Rc<dyn Fn()>) {
        self.redraw.set(hook);
    }

    pub fn patient_id(&self) -> Option<String> {
        self.patient_id.borrow().clone()
    }

    pub async fn set_patient(&self, patient_id: Option<String>) {
        if *self.patient_id.borrow() == patient_id {
            return;
        }
        *self.patient_id.borrow_mut() = patient_id;
        if self.patient_id.borrow().is_none() {
            self.resource.borrow_mut().reset();
            self.redraw.fire();
            return;
        }
        self.fetch().await;
    }

    pub async fn mount(&self) {
        self.fetch().await;
    }

    async fn fetch(&self) {
        let Some(id) = self.patient_id() else {
            return;
        };
        let gateway = Rc::clone(&self.gateway);
        load_into("patient detail", &self.resource, &self.redraw, async move {
            let (patient, records) = tokio::join!(
                gateway.get_patient(&id),
                gateway.get_patient_records(&id)
            );
            GatewayResult::Ok(PatientBundle {
                patient: patient?,
                records: records?,
            })
        })
        .await;
    }

    pub fn view(&self) -> PatientDetailView {
        let patient_id = self.patient_id();
        let resource = self.resource.borrow();

        let panel = if resource.is_loading() {
            Panel::Loading("Loading patient details...")
        } else if let Some(err) = resource.error() {
            Panel::Failed {
                message: format!("Error loading patient: {err}"),
            }
        } else if let Some(bundle) = resource.data() {
            let patient = &bundle.patient;
            Panel::Ready(PatientProfile {
                id: patient.id.clone(),
                name: patient.name.clone(),
                email: patient.email.clone(),
                date_of_birth: format_date(patient.date_of_birth.as_ref()),
                gender: patient.gender.clone(),
                phone: non_empty(&patient.phone),
                address: non_empty(&patient.address),
                wallet_address: non_empty(&patient.wallet_address),
                records: bundle.records.iter().map(RecordCard::from).collect(),
            })
        } else {
            Panel::Failed {
                message: "Error loading patient: Patient not found".to_owned(),
            }
        };

        PatientDetailView { patient_id, panel }
    }
}
