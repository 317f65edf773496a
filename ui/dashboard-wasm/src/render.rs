//! DOM rendering of the dashboard views.
//!
//! Everything that reaches `innerHTML` goes through [`escape_html`]; metadata
//! and token URIs come from arbitrary third parties.

use gloo_timers::callback::Timeout;
use td_api_types::{Notification, Severity};
use td_dashboard::config::NOTIFICATION_TTL;
use td_dashboard::ui::NOT_CONNECTED;
use td_dashboard::{AssetCard, AssetListView, BalanceView, ConnectionView, DashboardUi, StatusView};

use crate::dom::{self, Elements};

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Only http(s) links are rendered as links.
fn safe_url(url: &str) -> String {
    let lower = url.trim().to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        escape_html(url.trim())
    } else {
        "#".to_owned()
    }
}

fn placeholder_html(text: &str) -> String {
    format!(
        r#"<div class="col-12 text-center p-5 text-muted">{}</div>"#,
        escape_html(text)
    )
}

fn skeleton_html(count: usize) -> String {
    r#"
    <div class="col-md-4">
      <div class="card glass-card border-0 shadow-sm h-100">
        <div class="bg-dark" style="height:200px;"></div>
        <div class="card-body placeholder-glow">
          <span class="placeholder col-8"></span>
          <p class="placeholder mt-2 col-12"></p>
        </div>
      </div>
    </div>"#
        .repeat(count)
}

pub fn card_html(card: &AssetCard) -> String {
    let id = card.token_id;
    format!(
        r#"
    <div class="col-md-4">
      <div class="card nft-card glass-card border-0 shadow-sm h-100">
        <img src="{image}" class="card-img-top" style="height:200px; object-fit:cover;"
             onerror="this.onerror=null;this.src='{fallback}'">
        <div class="card-body">
          <h6 class="fw-bold mb-1">{title}</h6>
          <p class="small text-muted mb-2">{description}</p>
          <p class="small mb-2">
            <strong>Token URI:</strong><br>
            <a href="{uri_link}" target="_blank" rel="noopener noreferrer" class="text-muted small text-break">{uri}</a>
          </p>
          <div class="d-grid gap-2 mt-2">
            <button data-action="transfer" data-token-id="{id}" class="btn btn-sm btn-outline-primary">Send</button>
            <button data-action="burn" data-token-id="{id}" class="btn btn-sm btn-outline-danger">Burn</button>
          </div>
        </div>
      </div>
    </div>"#,
        image = safe_url(&card.image_url),
        fallback = safe_url(&card.fallback_image_url),
        title = escape_html(&card.title),
        description = escape_html(&card.description),
        uri_link = safe_url(&card.token_uri_link),
        uri = escape_html(&card.token_uri_display),
    )
}

pub fn assets_html(view: &AssetListView) -> String {
    match view {
        AssetListView::Loading { skeletons } => skeleton_html(*skeletons),
        AssetListView::Cards(cards) => cards.iter().map(card_html).collect(),
        AssetListView::NotConnected | AssetListView::Empty => {
            placeholder_html(view.placeholder_text().unwrap_or_default())
        }
    }
}

pub struct DomUi {
    els: Elements,
}

impl DomUi {
    pub fn new(els: Elements) -> Self {
        Self { els }
    }

    pub fn elements(&self) -> &Elements {
        &self.els
    }

    fn show_toast(&self, notification: &Notification) -> Result<(), wasm_bindgen::JsValue> {
        let color = match notification.severity {
            Severity::Error => "danger",
            Severity::Success => "success",
            Severity::Info => "primary",
        };
        let toast = dom::create_element("div")?;
        toast.set_class_name(&format!("toast show align-items-center text-white bg-{color} border-0 mb-2"));
        toast.set_attribute("role", "alert")?;
        toast.set_inner_html(&format!(
            r#"<div class="d-flex"><div class="toast-body">{}</div></div>"#,
            escape_html(&notification.message)
        ));
        self.els.toast_container.append_child(&toast)?;

        let ttl = u32::try_from(NOTIFICATION_TTL.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(ttl, move || toast.remove()).forget();
        Ok(())
    }
}

impl DashboardUi for DomUi {
    fn notify(&self, notification: Notification) {
        if self.show_toast(&notification).is_err() {
            gloo_console::warn!("could not show notification:", notification.message.clone());
        }
    }

    fn render_connection(&self, view: &ConnectionView) {
        let els = &self.els;
        dom::set_text(&els.wallet_btn_text, view.wallet_button_label());
        dom::set_text(&els.network_status, view.network_label());
        match view {
            ConnectionView::Connected {
                coin_address,
                nft_address,
                ..
            } => {
                els.network_status.set_class_name("badge rounded-pill bg-success");
                dom::set_text(&els.coin_addr_display, &coin_address.to_checksum());
                dom::set_text(&els.nft_addr_display, &nft_address.to_checksum());
            }
            ConnectionView::Disconnected => {
                els.network_status.set_class_name("badge rounded-pill bg-danger");
                dom::set_text(&els.coin_addr_display, NOT_CONNECTED);
                dom::set_text(&els.nft_addr_display, NOT_CONNECTED);
            }
        }
    }

    fn render_balance(&self, view: &BalanceView) {
        dom::set_text(&self.els.balance_coin, view.text());
    }

    fn render_assets(&self, view: &AssetListView) {
        if let Some(label) = view.count_label() {
            dom::set_text(&self.els.nft_count, &label);
        }
        self.els.nft_list.set_inner_html(&assets_html(view));
    }

    fn render_status(&self, view: &StatusView) {
        let els = &self.els;
        dom::set_text(&els.status_msg, &view.message);
        match &view.tx {
            Some(tx) => {
                dom::set_text(&els.tx_hash_text, &tx.hash.0);
                dom::remove_class(&els.tx_hash, "d-none");
                els.tx_link.set_href(tx.url.as_deref().unwrap_or("#"));
            }
            None => {
                dom::add_class(&els.tx_hash, "d-none");
                dom::set_text(&els.tx_hash_text, "");
            }
        }
    }

    fn prompt(&self, message: &str) -> Option<String> {
        dom::window().prompt_with_message(message).ok().flatten()
    }

    fn confirm(&self, message: &str) -> bool {
        dom::window().confirm_with_message(message).unwrap_or(false)
    }
}
