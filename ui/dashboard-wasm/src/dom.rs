//! DOM element bindings.
//!
//! All fields are resolved once at startup. A page without one of these ids
//! fails to start with a message naming the id.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlAnchorElement, HtmlElement, HtmlInputElement};

// ── Helpers ──

pub fn document() -> Document {
    gloo_utils::document()
}

pub fn window() -> web_sys::Window {
    gloo_utils::window()
}

pub fn by_id(id: &str) -> Option<Element> {
    document().get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn get_input_value(el: &HtmlInputElement) -> String {
    el.value().trim().to_string()
}

pub fn add_class(el: &Element, cls: &str) {
    let _ = el.class_list().add_1(cls);
}

pub fn remove_class(el: &Element, cls: &str) {
    let _ = el.class_list().remove_1(cls);
}

pub fn toggle_class(el: &Element, cls: &str) {
    let _ = el.class_list().toggle(cls);
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    document().create_element(tag)
}

// ── Elements struct ──

/// Every element the dashboard reads or writes.
/// Clone-friendly (all inner types are reference-counted via JS GC).
#[derive(Clone)]
pub struct Elements {
    // Header
    pub connect_wallet: HtmlElement,
    pub wallet_btn_text: Element,
    pub network_status: Element,
    pub coin_addr_display: Element,
    pub nft_addr_display: Element,

    // Status panel
    pub status_msg: Element,
    pub tx_hash: Element,
    pub tx_hash_text: Element,
    pub tx_link: HtmlAnchorElement,

    // Balances and assets
    pub balance_coin: Element,
    pub nft_count: Element,
    pub nft_list: Element,

    // Forms
    pub to_address: HtmlInputElement,
    pub amount_coin: HtmlInputElement,
    pub btn_transfer: HtmlElement,
    pub mint_uri: HtmlInputElement,
    pub btn_mint: HtmlElement,

    // Layout
    pub toast_container: Element,
    pub sidebar: Element,
    pub sidebar_collapse: HtmlElement,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_typed {
    ($ty:ty, $id:expr) => {
        by_id_typed::<$ty>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing {} #{}", stringify!($ty), $id)))?
    };
}

impl Elements {
    /// Resolve all DOM references. Call once after the document has loaded.
    pub fn bind() -> Result<Elements, JsValue> {
        Ok(Elements {
            connect_wallet: get_typed!(HtmlElement, "connectWallet"),
            wallet_btn_text: get_el!("walletBtnText"),
            network_status: get_el!("networkStatus"),
            coin_addr_display: get_el!("coinAddrDisplay"),
            nft_addr_display: get_el!("nftAddrDisplay"),

            status_msg: get_el!("statusMsg"),
            tx_hash: get_el!("txHash"),
            tx_hash_text: get_el!("txHashText"),
            tx_link: get_typed!(HtmlAnchorElement, "txLink"),

            balance_coin: get_el!("balanceCoin"),
            nft_count: get_el!("nftCount"),
            nft_list: get_el!("nftList"),

            to_address: get_typed!(HtmlInputElement, "toAddress"),
            amount_coin: get_typed!(HtmlInputElement, "amountCoin"),
            btn_transfer: get_typed!(HtmlElement, "btnTransfer"),
            mint_uri: get_typed!(HtmlInputElement, "mintURI"),
            btn_mint: get_typed!(HtmlElement, "btnMint"),

            toast_container: get_el!("toastContainer"),
            sidebar: get_el!("sidebar"),
            sidebar_collapse: get_typed!(HtmlElement, "sidebarCollapse"),
        })
    }
}
