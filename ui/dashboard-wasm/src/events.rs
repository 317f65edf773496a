//! Event binding.
//!
//! Wires every UI listener to a dashboard handler. Async handlers run through
//! `wasm_bindgen_futures::spawn_local`; the handlers report failures to the
//! user themselves, so their results are only logged here.

use std::fmt::Display;
use std::rc::Rc;

use td_api_types::TokenId;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, EventTarget, MouseEvent};

use crate::WebDashboard;
use crate::dom;

/// Attach a click listener that lives as long as the page.
fn on_click(target: &EventTarget, handler: impl FnMut(MouseEvent) + 'static) -> Result<(), JsValue> {
    let cb = Closure::<dyn FnMut(MouseEvent)>::new(handler);
    target.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

fn log_failure<T, E: Display>(action: &str, result: Result<T, E>) {
    if let Err(err) = result {
        gloo_console::debug!(format!("{action}: {err}"));
    }
}

/// A card button click, resolved from the event target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Transfer(TokenId),
    Burn(TokenId),
}

impl CardAction {
    pub fn parse(action: &str, token_id: &str) -> Option<Self> {
        let id = TokenId(token_id.trim().parse().ok()?);
        match action {
            "transfer" => Some(CardAction::Transfer(id)),
            "burn" => Some(CardAction::Burn(id)),
            _ => None,
        }
    }

    fn from_target(target: Option<EventTarget>) -> Option<Self> {
        let button = target?.dyn_into::<Element>().ok()?.closest("[data-action]").ok()??;
        Self::parse(
            &button.get_attribute("data-action")?,
            &button.get_attribute("data-token-id")?,
        )
    }
}

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(dashboard: &Rc<WebDashboard>) -> Result<(), JsValue> {
    let els = dashboard.ui().elements().clone();

    // ── Header ──
    {
        let dashboard = Rc::clone(dashboard);
        on_click(&els.connect_wallet, move |_: MouseEvent| {
            let d = Rc::clone(&dashboard);
            wasm_bindgen_futures::spawn_local(async move { d.on_wallet_button_clicked().await });
        })?;
    }

    // ── Forms ──
    {
        let dashboard = Rc::clone(dashboard);
        let (to_address, amount) = (els.to_address.clone(), els.amount_coin.clone());
        on_click(&els.btn_transfer, move |_: MouseEvent| {
            let to = dom::get_input_value(&to_address);
            let value = dom::get_input_value(&amount);
            let d = Rc::clone(&dashboard);
            wasm_bindgen_futures::spawn_local(async move {
                log_failure("transfer", d.on_transfer_coin_clicked(&to, &value).await);
            });
        })?;
    }
    {
        let dashboard = Rc::clone(dashboard);
        let mint_uri = els.mint_uri.clone();
        on_click(&els.btn_mint, move |_: MouseEvent| {
            let uri = dom::get_input_value(&mint_uri);
            let d = Rc::clone(&dashboard);
            wasm_bindgen_futures::spawn_local(async move {
                log_failure("mint", d.on_mint_clicked(&uri).await);
            });
        })?;
    }

    // ── NFT cards ── (delegated: the list is re-rendered on every scan)
    {
        let dashboard = Rc::clone(dashboard);
        on_click(&els.nft_list, move |event: MouseEvent| {
            let Some(action) = CardAction::from_target(event.target()) else {
                return;
            };
            let d = Rc::clone(&dashboard);
            wasm_bindgen_futures::spawn_local(async move {
                match action {
                    CardAction::Transfer(id) => log_failure("send nft", d.on_transfer_nft_clicked(id).await),
                    CardAction::Burn(id) => log_failure("burn nft", d.on_burn_nft_clicked(id).await),
                }
            });
        })?;
    }

    // ── Layout ──
    {
        let sidebar = els.sidebar.clone();
        on_click(&els.sidebar_collapse, move |_: MouseEvent| {
            dom::toggle_class(&sidebar, "active");
        })?;
    }

    Ok(())
}
