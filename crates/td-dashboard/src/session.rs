//! Wallet connection lifecycle.
//!
//! `ConnectionManager` is the only place contract handles are created or
//! dropped. The session moves `Disconnected -> Connecting -> Connected` and
//! every way out of `Connecting` or `Connected` goes back to `Disconnected`.

use std::cell::RefCell;
use std::rc::Rc;
use td_api_types::{Address, ChainId};
use td_chain_client::{CoinContract, NftContract, ProviderEvent, WalletProvider};
use tracing::{debug, info, warn};

use crate::config::{ContractInterfaces, DashboardConfig};
use crate::error::DashboardError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// A live connection: account, chain and the handles bound to them.
pub struct Connection<P> {
    pub account: Address,
    pub chain_id: ChainId,
    pub coin: CoinContract<P>,
    pub nft: NftContract<P>,
}

/// Handles exist exactly when the session is connected to a supported chain.
pub struct Session<P> {
    state: ConnectionState,
    connection: Option<Rc<Connection<P>>>,
    /// The account the wallet granted to an attempt that is still connecting.
    pending_account: Option<Address>,
    /// Advanced whenever the session is cleared, so a connect attempt can tell
    /// that it was overtaken while it was waiting on the wallet.
    epoch: u64,
}

impl<P> Default for Session<P> {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            connection: None,
            pending_account: None,
            epoch: 0,
        }
    }
}

impl<P> Session<P> {
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn connection(&self) -> Option<Rc<Connection<P>>> {
        self.connection.clone()
    }

    /// The live account, or the one granted to the attempt in progress.
    pub fn account(&self) -> Option<&Address> {
        self.connection
            .as_ref()
            .map(|c| &c.account)
            .or(self.pending_account.as_ref())
    }

    pub fn chain_id(&self) -> Option<ChainId> {
        self.connection.as_ref().map(|c| c.chain_id)
    }

    /// Whether `event` only restates what this session already holds. Wallets
    /// announce the granted account while a connect is pending; until the
    /// account is known the wallet's answer to that request decides.
    pub fn is_unchanged_by(&self, event: &ProviderEvent) -> bool {
        match event {
            ProviderEvent::AccountsChanged(accounts) => {
                let Some(reported) = accounts
                    .first()
                    .and_then(|first| Address::parse(&first.to_ascii_lowercase()).ok())
                else {
                    return false;
                };
                match self.account() {
                    Some(account) => *account == reported,
                    None => self.state == ConnectionState::Connecting,
                }
            }
            ProviderEvent::ChainChanged(chain_id) => self.chain_id() == Some(ChainId(*chain_id)),
        }
    }

    fn clear(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.connection = None;
        self.pending_account = None;
        self.epoch += 1;
    }
}

pub struct ConnectionManager<P> {
    provider: Option<Rc<P>>,
    interfaces: ContractInterfaces,
    config: Rc<DashboardConfig>,
    session: RefCell<Session<P>>,
}

impl<P: WalletProvider> ConnectionManager<P> {
    pub fn new(provider: Option<Rc<P>>, interfaces: ContractInterfaces, config: Rc<DashboardConfig>) -> Self {
        Self {
            provider,
            interfaces,
            config,
            session: RefCell::new(Session::default()),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.session.borrow().state()
    }

    pub fn connection(&self) -> Option<Rc<Connection<P>>> {
        self.session.borrow().connection()
    }

    /// True while `connection` is still the live session.
    pub fn is_current(&self, connection: &Rc<Connection<P>>) -> bool {
        self.session
            .borrow()
            .connection
            .as_ref()
            .is_some_and(|live| Rc::ptr_eq(live, connection))
    }

    pub async fn connect(&self) -> Result<Rc<Connection<P>>, DashboardError> {
        let provider = self.provider.clone().ok_or(DashboardError::NoProvider)?;

        let epoch = {
            let mut session = self.session.borrow_mut();
            match session.state {
                ConnectionState::Connecting => return Err(DashboardError::ConnectInProgress),
                ConnectionState::Connected => {
                    if let Some(existing) = session.connection() {
                        return Ok(existing);
                    }
                }
                ConnectionState::Disconnected => {}
            }
            session.state = ConnectionState::Connecting;
            session.epoch
        };

        let outcome = self.establish(provider, epoch).await;

        let mut session = self.session.borrow_mut();
        if session.epoch != epoch {
            warn!("session invalidated while connecting");
            return Err(DashboardError::SessionInvalidated);
        }
        match outcome {
            Ok(connection) => {
                let connection = Rc::new(connection);
                session.state = ConnectionState::Connected;
                session.connection = Some(Rc::clone(&connection));
                session.pending_account = None;
                info!(account = %connection.account, chain_id = %connection.chain_id, "wallet connected");
                Ok(connection)
            }
            Err(err) => {
                session.clear();
                warn!(error = %err, "wallet connection failed");
                Err(err)
            }
        }
    }

    async fn establish(&self, provider: Rc<P>, epoch: u64) -> Result<Connection<P>, DashboardError> {
        let accounts = provider.request_accounts().await?;
        let first = accounts.first().ok_or(DashboardError::NoAccounts)?;
        let account = Address::parse(&first.to_ascii_lowercase()).map_err(|reason| {
            DashboardError::InvalidAddress {
                input: first.clone(),
                reason,
            }
        })?;
        {
            let mut session = self.session.borrow_mut();
            if session.epoch == epoch {
                session.pending_account = Some(account.clone());
            }
        }

        let chain_id = provider.chain_id().await?;
        if !self.config.is_supported(chain_id) {
            return Err(DashboardError::UnsupportedChain(chain_id));
        }

        let (Some(coin_interface), Some(nft_interface)) =
            (self.interfaces.coin.clone(), self.interfaces.nft.clone())
        else {
            return Err(DashboardError::ContractInterfaceMissing(
                "contract interface descriptors are not loaded".to_owned(),
            ));
        };

        let coin = CoinContract::new(self.config.coin_address.clone(), coin_interface, Rc::clone(&provider))
            .map_err(|err| DashboardError::ContractInterfaceMissing(format!("coin: {err}")))?;
        let nft = NftContract::new(self.config.nft_address.clone(), nft_interface, provider)
            .map_err(|err| DashboardError::ContractInterfaceMissing(format!("nft: {err}")))?;

        Ok(Connection {
            account,
            chain_id: ChainId(chain_id),
            coin,
            nft,
        })
    }

    /// Drops the session. Returns whether anything was connected.
    pub fn disconnect(&self) -> bool {
        let mut session = self.session.borrow_mut();
        let was_connected = session.state != ConnectionState::Disconnected;
        session.clear();
        if was_connected {
            info!("wallet disconnected");
        }
        was_connected
    }

    pub fn is_unchanged_by(&self, event: &ProviderEvent) -> bool {
        self.session.borrow().is_unchanged_by(event)
    }

    /// Account or chain switched in the wallet; the session is not carried over.
    pub fn invalidate(&self, event: &ProviderEvent) -> bool {
        info!(?event, "wallet changed, invalidating session");
        self.disconnect()
    }
}
