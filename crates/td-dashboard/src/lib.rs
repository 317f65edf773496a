//! Wallet dashboard core: the connection state machine, owned-NFT discovery
//! and the command handlers that drive a [`DashboardUi`].
//!
//! Everything runs on one cooperative thread. Types hold `Rc`/`RefCell` and
//! no borrow is kept across a provider call.

pub mod config;
pub mod dashboard;
pub mod discovery;
pub mod error;
pub mod format;
pub mod session;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ContractInterfaces, DashboardConfig};
pub use dashboard::Dashboard;
pub use discovery::{AssetScan, ScanItem, TokenProbe, discover};
pub use error::DashboardError;
pub use session::{Connection, ConnectionManager, ConnectionState, Session};
pub use ui::{AssetCard, AssetListView, BalanceView, ConnectionView, DashboardUi, StatusView, TxLink};
