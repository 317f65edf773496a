//! TokenDeck browser frontend.
//!
//! Binds the dashboard page to the injected wallet provider. All behaviour
//! lives in `td-dashboard`; this crate only supplies the DOM surface, the
//! EIP-1193 bridge and `fetch`-based metadata loading.

pub mod dom;
pub mod events;
pub mod metadata;
pub mod provider;
pub mod render;

use std::rc::Rc;

use td_chain_client::WalletProvider;
use td_dashboard::{ContractInterfaces, Dashboard, DashboardConfig};
use wasm_bindgen::prelude::*;

use metadata::FetchMetadataSource;
use provider::Eip1193Provider;
use render::DomUi;

pub type WebDashboard = Dashboard<Eip1193Provider, FetchMetadataSource, DomUi>;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    init()
}

fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;

    let provider = Eip1193Provider::detect().map(Rc::new);
    if provider.is_none() {
        gloo_console::warn!("no injected wallet provider; connecting will fail until one is installed");
    }

    let interfaces = ContractInterfaces::builtin().map_err(|err| JsValue::from_str(&err.to_string()))?;
    let dashboard: Rc<WebDashboard> = Rc::new(Dashboard::new(
        provider.clone(),
        FetchMetadataSource,
        DomUi::new(els),
        interfaces,
        DashboardConfig::default(),
    ));
    dashboard.show_disconnected();

    // Account and network changes end the session; the listener must not
    // keep the dashboard alive.
    if let Some(provider) = provider {
        let weak = Rc::downgrade(&dashboard);
        provider
            .subscribe(Box::new(move |event| {
                if let Some(dashboard) = weak.upgrade() {
                    dashboard.on_provider_event(event);
                }
            }))
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
    }

    events::bind_events(&dashboard)
}
