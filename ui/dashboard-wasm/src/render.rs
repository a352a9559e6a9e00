//! View models to markup.
//!
//! Each screen body is rebuilt as one HTML string. Clickable pieces carry a
//! `data-action` attribute that `events` dispatches on.

use std::fmt::Write;

use hc_dashboard::consents::{ConsentCard, ConsentView};
use hc_dashboard::patient_detail::{PatientDetailView, PatientProfile, RecordCard};
use hc_dashboard::patient_list::{PatientCard, PatientListView};
use hc_dashboard::stats::StatsView;
use hc_dashboard::transactions::{TransactionCard, TransactionView};
use hc_dashboard::{Panel, Shell, Tab};

use crate::dom::{self, Elements};

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Shared loading/error/empty frame around a screen's ready content.
fn panel<T>(panel: &Panel<T>, empty_class: &str, ready: impl FnOnce(&T) -> String) -> String {
    match panel {
        Panel::Loading(text) => format!(r#"<div class="loading">{}</div>"#, escape(text)),
        Panel::Failed { message } => format!(r#"<div class="error">{}</div>"#, escape(message)),
        Panel::Empty { message, hint } => {
            let mut html = format!(r#"<div class="{empty_class}"><p>{}</p>"#, escape(message));
            if let Some(hint) = hint {
                let _ = write!(html, "<p>{}</p>", escape(hint));
            }
            html.push_str("</div>");
            html
        }
        Panel::Ready(content) => ready(content),
    }
}

fn field(html: &mut String, label: &str, value: &str) {
    let _ = write!(html, "<p><strong>{label}:</strong> {}</p>", escape(value));
}

fn hash_block(html: &mut String, hash: Option<&str>) {
    if let Some(hash) = hash {
        let _ = write!(
            html,
            r#"<div class="blockchain-info"><p><strong>Blockchain Hash:</strong></p><code class="tx-hash">{}</code></div>"#,
            escape(hash)
        );
    }
}

// ── Patients ──

pub fn patient_list(view: &PatientListView) -> String {
    let mut html = panel(&view.panel, "no-patients", |cards| {
        let mut list = String::from(r#"<div class="patient-list">"#);
        for card in cards {
            patient_card(&mut list, card);
        }
        list.push_str("</div>");
        list
    });

    if let Some(pager) = &view.pager {
        let _ = write!(
            html,
            r#"<div class="pagination"><button class="pagination-btn" data-action="page" data-page="{prev}"{prev_off}>Previous</button><span class="pagination-info">Page {page} of {pages} ({total} total)</span><button class="pagination-btn" data-action="page" data-page="{next}"{next_off}>Next</button></div>"#,
            prev = pager.current_page.saturating_sub(1),
            next = pager.current_page + 1,
            page = pager.current_page,
            pages = pager.total_pages,
            total = pager.total,
            prev_off = if pager.has_previous { "" } else { " disabled" },
            next_off = if pager.has_next { "" } else { " disabled" },
        );
    }
    html
}

fn patient_card(html: &mut String, card: &PatientCard) {
    let _ = write!(
        html,
        r#"<div class="patient-card" data-action="open-patient" data-id="{id}"><div class="patient-card-header"><h3>{name}</h3><span class="patient-id">ID: {id}</span></div><div class="patient-card-body">"#,
        id = escape(&card.id),
        name = escape(&card.name),
    );
    field(html, "Email", &card.email);
    field(html, "Gender", &card.gender);
    field(html, "Date of Birth", &card.date_of_birth);
    if let Some(phone) = &card.phone {
        field(html, "Phone", phone);
    }
    html.push_str("</div></div>");
}

pub fn patient_detail(view: &PatientDetailView) -> String {
    match &view.panel {
        Panel::Ready(profile) => {
            let mut html = String::from(
                r#"<div class="patient-detail-header"><button class="back-btn" data-action="back">← Back to List</button></div>"#,
            );
            patient_profile(&mut html, profile);
            html
        }
        Panel::Loading(_) => panel(&view.panel, "", |_| String::new()),
        other => {
            let mut html = panel(other, "", |_| String::new());
            html.push_str(r#"<button class="back-btn" data-action="back">Back to List</button>"#);
            html
        }
    }
}

fn patient_profile(html: &mut String, profile: &PatientProfile) {
    html.push_str(r#"<div class="patient-info-section"><h2>Patient Information</h2><div class="patient-info-grid">"#);
    let mut item = |label: &str, value: &str, class: &str| {
        let _ = write!(
            html,
            r#"<div class="info-item"><label>{label}:</label><span class="{class}">{}</span></div>"#,
            escape(value)
        );
    };
    item("Name", &profile.name, "");
    item("Email", &profile.email, "");
    item("Date of Birth", &profile.date_of_birth, "");
    item("Gender", &profile.gender, "");
    if let Some(phone) = &profile.phone {
        item("Phone", phone, "");
    }
    if let Some(address) = &profile.address {
        item("Address", address, "");
    }
    if let Some(wallet) = &profile.wallet_address {
        item("Wallet Address", wallet, "wallet-address");
    }
    html.push_str("</div></div>");

    let _ = write!(
        html,
        r#"<div class="patient-records-section"><h2>Medical Records ({})</h2>"#,
        profile.records.len()
    );
    if profile.records.is_empty() {
        html.push_str(r#"<div class="no-records"><p>No medical records found for this patient.</p></div>"#);
    } else {
        html.push_str(r#"<div class="records-list">"#);
        for record in &profile.records {
            record_card(html, record);
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
}

fn record_card(html: &mut String, record: &RecordCard) {
    let _ = write!(
        html,
        r#"<div class="record-card"><div class="record-header"><h3>{}</h3><span class="record-type {}">{}</span></div><div class="record-details"><div class="record-info">"#,
        escape(&record.title),
        escape(&record.type_class),
        escape(&record.record_type),
    );
    field(html, "Date", &record.date);
    if let Some(doctor) = &record.doctor {
        field(html, "Doctor", doctor);
    }
    if let Some(hospital) = &record.hospital {
        field(html, "Hospital", hospital);
    }
    let _ = write!(
        html,
        r#"<p><strong>Status:</strong> <span class="status {}">{}</span></p></div>"#,
        escape(&record.status_class),
        escape(&record.status),
    );
    hash_block(html, record.blockchain_tx_hash.as_deref());
    if let Some(description) = &record.description {
        let _ = write!(
            html,
            r#"<div class="record-description"><p><strong>Description:</strong></p><p>{}</p></div>"#,
            escape(description)
        );
    }
    html.push_str("</div></div>");
}

// ── Consents ──

pub fn consents(view: &ConsentView) -> String {
    let mut html = format!(
        r#"<div class="consent-header"><h2>Consent Management</h2><button class="create-btn" data-action="toggle-consent-form"{}>{}</button></div>"#,
        if view.can_create { "" } else { " disabled" },
        if view.form_open { "Cancel" } else { "Create New Consent" },
    );
    if view.show_wallet_warning {
        html.push_str(r#"<div class="warning">Please connect your MetaMask wallet to manage consents</div>"#);
    }

    if let Some(form) = &view.form {
        let _ = write!(
            html,
            r#"<div class="create-consent-form"><h3>Create New Consent</h3><div class="form-group"><label>Patient ID</label><input type="text" id="draftPatientId" value="{}" placeholder="e.g., patient-001"></div><div class="form-group"><label>Purpose</label><select id="draftPurpose"><option value="">Select purpose...</option>"#,
            escape(&form.draft.patient_id)
        );
        for purpose in form.purposes {
            let selected = if *purpose == form.draft.purpose { " selected" } else { "" };
            let _ = write!(
                html,
                r#"<option value="{p}"{selected}>{p}</option>"#,
                p = escape(purpose)
            );
        }
        html.push_str(r#"</select></div><button class="submit-btn" data-action="create-consent">Sign &amp; Create Consent</button></div>"#);
    }

    html.push_str(r#"<div class="consent-filters">"#);
    for tab in &view.filters {
        let _ = write!(
            html,
            r#"<button class="{}" data-action="consent-filter" data-filter="{}">{}</button>"#,
            if tab.active { "active" } else { "" },
            tab.filter,
            tab.label,
        );
    }
    html.push_str(r#"</div><div class="consents-list">"#);

    if let Some(error) = &view.error {
        let _ = write!(html, r#"<div class="error">{}</div>"#, escape(error));
    }
    html.push_str(&panel(&view.panel, "no-consents", |cards| {
        let mut list = String::new();
        for card in cards {
            consent_card(&mut list, card);
        }
        list
    }));
    html.push_str("</div>");
    html
}

fn consent_card(html: &mut String, card: &ConsentCard) {
    let _ = write!(
        html,
        r#"<div class="consent-card"><div class="consent-header"><h3>Patient: {}</h3><span class="consent-status {}">{}</span></div><div class="consent-details"><div class="consent-info">"#,
        escape(&card.patient_id),
        escape(&card.status_class),
        card.status,
    );
    field(html, "Purpose", &card.purpose);
    field(html, "Created", &card.created);
    if let Some(wallet) = &card.wallet {
        field(html, "Wallet", wallet);
    }
    html.push_str("</div>");
    hash_block(html, card.blockchain_tx_hash.as_deref());
    if card.can_review {
        let _ = write!(
            html,
            r#"<div class="consent-actions"><button class="action-btn approve" data-action="approve" data-id="{id}">Approve</button><button class="action-btn reject" data-action="reject" data-id="{id}">Reject</button></div>"#,
            id = escape(&card.id)
        );
    }
    html.push_str("</div></div>");
}

// ── Transactions ──

pub fn transactions(view: &TransactionView) -> String {
    let mut html = String::from(r#"<div class="transaction-header"><h2>Transaction History</h2>"#);
    if let Some(account) = &view.filtering_for {
        let _ = write!(
            html,
            r#"<div class="wallet-filter">Filtering for: {}</div>"#,
            escape(account)
        );
    }
    html.push_str("</div>");
    html.push_str(&panel(&view.panel, "no-transactions", |cards| {
        let mut grid = String::from(r#"<div class="transactions-grid">"#);
        for card in cards {
            transaction_card(&mut grid, card);
        }
        grid.push_str("</div>");
        grid
    }));
    html
}

fn transaction_card(html: &mut String, card: &TransactionCard) {
    let _ = write!(
        html,
        r#"<div class="transaction-card"><div class="transaction-header"><span class="transaction-type {}">{}</span><span class="transaction-status {}">{}</span></div><div class="transaction-details"><div class="transaction-addresses">"#,
        escape(&card.type_class),
        escape(&card.tx_type),
        escape(&card.status_class),
        escape(&card.status),
    );
    field(html, "From", &card.from);
    field(html, "To", &card.to);
    html.push_str(r#"</div><div class="transaction-amount">"#);
    field(html, "Amount", &card.amount);
    field(html, "Date", &card.date);
    html.push_str("</div>");
    hash_block(html, card.blockchain_tx_hash.as_deref());
    if let Some(metadata) = &card.metadata {
        let _ = write!(
            html,
            r#"<div class="transaction-metadata"><p><strong>Details:</strong></p><p>{}</p></div>"#,
            escape(metadata)
        );
    }
    html.push_str("</div></div>");
}

// ── Stats ──

pub fn stats(view: &Panel<StatsView>) -> String {
    panel(view, "", |stats| {
        let mut html = String::from(r#"<h2>Platform Statistics</h2><div class="stats-grid">"#);
        for card in &stats.cards {
            let _ = write!(
                html,
                r#"<div class="stat-card {}"><div class="stat-icon">{}</div><div class="stat-content"><h3>{}</h3><div class="stat-number">{}</div></div></div>"#,
                card.key, card.icon, card.label, card.value
            );
        }
        html.push_str("</div>");
        if let Some(updated) = &stats.last_updated {
            let _ = write!(
                html,
                r#"<div class="stats-footer"><p>Last updated: {}</p></div>"#,
                escape(updated)
            );
        }
        html
    })
}

// ── Frame ──

/// Redraw everything from the shell's current state.
/// Puts the refresh control above a screen body.
fn refreshable(body: String) -> String {
    format!(r#"<div class="screen-toolbar"><button class="refresh-btn" data-action="refresh">Refresh</button></div>{body}"#)
}

pub fn render_all(els: &Elements, shell: &Shell) {
    let tab = shell.tab();
    for el in &els.tabs {
        let active = el.get_attribute("data-tab").as_deref() == Some(tab.key());
        dom::toggle_class(el, "active", active);
    }
    for el in &els.panels {
        dom::toggle_class(el, "active", el.id() == tab.key());
    }

    match shell.wallet().account() {
        Some(account) => {
            dom::set_text(&els.wallet_status, &format!("Connected: {account}"));
            dom::set_text(&els.wallet_button, "Disconnect");
        }
        None => {
            dom::set_text(&els.wallet_status, "Not connected");
            dom::set_text(&els.wallet_button, "Connect Wallet");
        }
    }

    let showing_detail = shell.selected_patient().is_some();
    dom::toggle_class(&els.patient_search, "hidden", showing_detail);

    // Only the visible screen is rebuilt.
    let (body, html) = match tab {
        Tab::Patients if showing_detail => (&els.patients_body, patient_detail(&shell.detail.view())),
        Tab::Patients => (&els.patients_body, patient_list(&shell.patients.view())),
        Tab::Consents => (&els.consents_body, consents(&shell.consents.view())),
        Tab::Transactions => (&els.transactions_body, transactions(&shell.transactions.view())),
        Tab::Stats => (&els.stats_body, stats(&shell.stats.view())),
    };
    dom::set_inner_html(body, &refreshable(html));
}
