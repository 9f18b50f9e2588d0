//! Contract state and behaviour of the simulated chains.
//!
//! Every contract is modelled from the outside: balances, limits, peers and
//! the events a real deployment emits. Failures are reported with the custom
//! error name the contracts revert with.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use alloy_primitives::{keccak256, Address, TxHash, B256, U256};
use alloy_rpc_types::Log;

use crate::amount::{
    conversion_rate, remove_dust, OFT_DECIMALS, SHARED_DECIMALS, SOURCE_TOKEN_DECIMALS,
};
use crate::contracts::artifact::DeployRequest;
use crate::error::{BridgeError, Result};
use crate::indexer::{rpc_log, BridgeEvent, EventMeta};
use crate::params::{address_to_bytes32, bytes32_to_address, MessagingFee, SendParam};

/// Seconds between simulated blocks.
pub(crate) const BLOCK_TIME: u64 = 12;
const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

fn revert<T>(reason: &str) -> Result<T> {
    Err(BridgeError::revert(reason))
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Token {
    pub decimals: u8,
    pub total_supply: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

impl Token {
    fn new(decimals: u8) -> Self {
        Self {
            decimals,
            ..Default::default()
        }
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn mint(&mut self, to: Address, amount: U256) {
        *self.balances.entry(to).or_default() += amount;
        self.total_supply += amount;
    }

    fn burn(&mut self, from: Address, amount: U256) -> Result<()> {
        let balance = self.balance_of(from);
        if balance < amount {
            return revert("ERC20InsufficientBalance");
        }
        self.balances.insert(from, balance - amount);
        self.total_supply -= amount;
        Ok(())
    }

    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<()> {
        let balance = self.balance_of(from);
        if balance < amount {
            return revert("ERC20InsufficientBalance");
        }
        self.balances.insert(from, balance - amount);
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }

    fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.insert((owner, spender), amount);
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        let allowance = self
            .allowances
            .get(&(from, spender))
            .copied()
            .unwrap_or_default();
        if allowance < amount {
            return revert("ERC20InsufficientAllowance");
        }
        self.transfer(from, to, amount)?;
        if allowance != U256::MAX {
            self.allowances.insert((from, spender), allowance - amount);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Endpoint {
    eid: u32,
    /// Destination OApp -> endpoint serving it.
    dest_endpoints: HashMap<Address, Address>,
}

/// An OFT adapter (`native == false`, wrapping `token`) or a native OFT
/// (`native == true`, its own token at the same address).
#[derive(Debug, Clone)]
struct OApp {
    owner: Option<Address>,
    initialized: bool,
    endpoint: Address,
    token: Address,
    native: bool,
    rate: U256,
    peers: HashMap<u32, B256>,
}

#[derive(Debug, Clone)]
pub(crate) struct Vault {
    owner: Option<Address>,
    initialized: bool,
    token: Address,
    adapter: Address,
    locked: HashMap<Address, U256>,
    pub total_locked: U256,
    max_lock_amount: U256,
    personal_max: U256,
    personal_min: U256,
}

impl Vault {
    fn locked_of(&self, user: Address) -> U256 {
        self.locked.get(&user).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Chain {
    pub block_number: u64,
    pub timestamp: u64,
    native: HashMap<Address, U256>,
    pub tokens: HashMap<Address, Token>,
    endpoints: HashMap<Address, Endpoint>,
    oapps: HashMap<Address, OApp>,
    pub vaults: HashMap<Address, Vault>,
    logs: Vec<Log>,
}

impl Chain {
    fn new() -> Self {
        Self {
            block_number: 0,
            timestamp: GENESIS_TIMESTAMP,
            native: HashMap::new(),
            tokens: HashMap::new(),
            endpoints: HashMap::new(),
            oapps: HashMap::new(),
            vaults: HashMap::new(),
            logs: Vec::new(),
        }
    }

    pub fn native_balance(&self, account: Address) -> U256 {
        self.native.get(&account).copied().unwrap_or_default()
    }

    pub fn token(&self, token: Address) -> Result<&Token> {
        self.tokens
            .get(&token)
            .ok_or_else(|| BridgeError::ContractCall(format!("no token deployed at {token}")))
    }

    fn token_mut(&mut self, token: Address) -> Result<&mut Token> {
        self.tokens
            .get_mut(&token)
            .ok_or_else(|| BridgeError::ContractCall(format!("no token deployed at {token}")))
    }

    fn vault(&self, vault: Address) -> Result<&Vault> {
        self.vaults
            .get(&vault)
            .ok_or_else(|| BridgeError::ContractCall(format!("no vault deployed at {vault}")))
    }

    fn vault_mut(&mut self, vault: Address) -> Result<&mut Vault> {
        self.vaults
            .get_mut(&vault)
            .ok_or_else(|| BridgeError::ContractCall(format!("no vault deployed at {vault}")))
    }

    fn oapp(&self, oapp: Address) -> Result<&OApp> {
        self.oapps
            .get(&oapp)
            .ok_or_else(|| BridgeError::ContractCall(format!("no OApp deployed at {oapp}")))
    }

    fn debit_native(&mut self, account: Address, amount: U256) -> Result<()> {
        let balance = self.native_balance(account);
        if balance < amount {
            return revert("InsufficientNativeBalance");
        }
        self.native.insert(account, balance - amount);
        Ok(())
    }

    fn credit_native(&mut self, account: Address, amount: U256) {
        *self.native.entry(account).or_default() += amount;
    }

    pub fn logs(&self) -> &[Log] {
        &self.logs
    }
}

/// Event waiting for its transaction to be mined.
#[derive(Debug, Clone)]
struct Emitted {
    chain_id: u64,
    contract: Address,
    event: BridgeEvent,
}

/// State of every simulated chain plus the messaging layer between them.
#[derive(Debug, Clone)]
pub(crate) struct NetworkState {
    pub chains: BTreeMap<u64, Chain>,
    nonce: u64,
    pub native_fee: U256,
    pending: Vec<Emitted>,
}

impl NetworkState {
    pub fn new(native_fee: U256) -> Self {
        Self {
            chains: BTreeMap::new(),
            nonce: 0,
            native_fee,
            pending: Vec::new(),
        }
    }

    pub fn add_chain(&mut self, chain_id: u64) {
        self.chains.entry(chain_id).or_insert_with(Chain::new);
    }

    /// Fresh deterministic 32-byte id.
    pub fn next_id(&mut self, tag: &str) -> B256 {
        self.nonce += 1;
        keccak256([tag.as_bytes(), &self.nonce.to_be_bytes()].concat())
    }

    pub fn chain(&self, chain_id: u64) -> Result<&Chain> {
        self.chains
            .get(&chain_id)
            .ok_or_else(|| BridgeError::Provider(format!("unknown chain id {chain_id}")))
    }

    pub fn chain_mut(&mut self, chain_id: u64) -> Result<&mut Chain> {
        self.chains
            .get_mut(&chain_id)
            .ok_or_else(|| BridgeError::Provider(format!("unknown chain id {chain_id}")))
    }

    pub fn fund(&mut self, chain_id: u64, account: Address, amount: U256) -> Result<()> {
        self.chain_mut(chain_id)?.credit_native(account, amount);
        Ok(())
    }

    fn emit(&mut self, chain_id: u64, contract: Address, event: BridgeEvent) {
        self.pending.push(Emitted {
            chain_id,
            contract,
            event,
        });
    }

    /// Number of the block the current transaction will land in.
    fn pending_block(&self, chain_id: u64) -> Result<u64> {
        Ok(self.chain(chain_id)?.block_number + 1)
    }

    /// Mines the current transaction: one block on the sending chain and on
    /// every chain a message was delivered to. Returns the sending chain's
    /// block number.
    pub fn mine(&mut self, chain_id: u64, tx_hash: TxHash) -> Result<u64> {
        let pending = std::mem::take(&mut self.pending);
        let mut touched: BTreeSet<u64> = pending.iter().map(|e| e.chain_id).collect();
        touched.insert(chain_id);

        let mut mined = 0;
        for id in touched {
            let hash = if id == chain_id {
                tx_hash
            } else {
                keccak256([tx_hash.as_slice(), &id.to_be_bytes()].concat())
            };
            let chain = self.chain_mut(id)?;
            chain.block_number += 1;
            chain.timestamp += BLOCK_TIME;
            if id == chain_id {
                mined = chain.block_number;
            }

            for (log_index, emitted) in pending.iter().filter(|e| e.chain_id == id).enumerate() {
                let meta = EventMeta {
                    contract: emitted.contract,
                    transaction_hash: hash,
                    log_index: log_index as u64,
                    block_number: chain.block_number,
                    timestamp: chain.timestamp,
                };
                chain.logs.push(rpc_log(&meta, &emitted.event));
            }
        }
        Ok(mined)
    }

    pub fn deploy(&mut self, chain_id: u64, request: &DeployRequest) -> Result<Address> {
        let address = Address::from_word(self.next_id("create"));
        let chain = self.chain_mut(chain_id)?;

        match request {
            DeployRequest::TokenMock => {
                chain.tokens.insert(address, Token::new(SOURCE_TOKEN_DECIMALS));
            }
            DeployRequest::EndpointMock { eid } => {
                chain.endpoints.insert(
                    address,
                    Endpoint {
                        eid: *eid,
                        dest_endpoints: HashMap::new(),
                    },
                );
            }
            DeployRequest::OftAdapter { token, endpoint } => {
                let decimals = chain.token(*token)?.decimals;
                if !chain.endpoints.contains_key(endpoint) {
                    return revert("InvalidEndpoint");
                }
                chain.oapps.insert(
                    address,
                    OApp {
                        owner: None,
                        initialized: false,
                        endpoint: *endpoint,
                        token: *token,
                        native: false,
                        rate: conversion_rate(decimals, SHARED_DECIMALS)?,
                        peers: HashMap::new(),
                    },
                );
            }
            DeployRequest::LockVault { token, adapter } => {
                chain.token(*token)?;
                chain.oapp(*adapter)?;
                chain.vaults.insert(
                    address,
                    Vault {
                        owner: None,
                        initialized: false,
                        token: *token,
                        adapter: *adapter,
                        locked: HashMap::new(),
                        total_locked: U256::ZERO,
                        max_lock_amount: U256::MAX,
                        personal_max: U256::MAX,
                        personal_min: U256::ZERO,
                    },
                );
            }
            DeployRequest::Oft {
                endpoint, delegate, ..
            } => {
                if !chain.endpoints.contains_key(endpoint) {
                    return revert("InvalidEndpoint");
                }
                chain.tokens.insert(address, Token::new(OFT_DECIMALS));
                chain.oapps.insert(
                    address,
                    OApp {
                        owner: Some(*delegate),
                        initialized: true,
                        endpoint: *endpoint,
                        token: address,
                        native: true,
                        rate: conversion_rate(OFT_DECIMALS, SHARED_DECIMALS)?,
                        peers: HashMap::new(),
                    },
                );
            }
        }

        Ok(address)
    }

    pub fn initialize(&mut self, chain_id: u64, contract: Address, owner: Address) -> Result<()> {
        let chain = self.chain_mut(chain_id)?;
        let (initialized, current_owner) = if let Some(vault) = chain.vaults.get_mut(&contract) {
            (&mut vault.initialized, &mut vault.owner)
        } else if let Some(oapp) = chain.oapps.get_mut(&contract) {
            (&mut oapp.initialized, &mut oapp.owner)
        } else {
            return revert("InvalidInitialization");
        };

        if *initialized {
            return revert("InvalidInitialization");
        }
        *initialized = true;
        *current_owner = Some(owner);
        Ok(())
    }

    pub fn mint(&mut self, chain_id: u64, token: Address, to: Address, amount: U256) -> Result<()> {
        self.chain_mut(chain_id)?.token_mut(token)?.mint(to, amount);
        Ok(())
    }

    pub fn approve(
        &mut self,
        chain_id: u64,
        from: Address,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<()> {
        self.chain_mut(chain_id)?
            .token_mut(token)?
            .approve(from, spender, amount);
        Ok(())
    }

    pub fn set_dest_lz_endpoint(
        &mut self,
        chain_id: u64,
        endpoint: Address,
        dest_oapp: Address,
        dest_endpoint: Address,
    ) -> Result<()> {
        let endpoint = self
            .chain_mut(chain_id)?
            .endpoints
            .get_mut(&endpoint)
            .ok_or_else(|| BridgeError::ContractCall(format!("no endpoint deployed at {endpoint}")))?;
        endpoint.dest_endpoints.insert(dest_oapp, dest_endpoint);
        Ok(())
    }

    pub fn set_peer(
        &mut self,
        chain_id: u64,
        from: Address,
        oapp: Address,
        eid: u32,
        peer: B256,
    ) -> Result<()> {
        let oapp = self
            .chain_mut(chain_id)?
            .oapps
            .get_mut(&oapp)
            .ok_or_else(|| BridgeError::ContractCall(format!("no OApp deployed at {oapp}")))?;
        if oapp.owner != Some(from) {
            return revert("OwnableUnauthorizedAccount");
        }
        oapp.peers.insert(eid, peer);
        Ok(())
    }

    pub fn peer(&self, chain_id: u64, oapp: Address, eid: u32) -> Result<B256> {
        Ok(self
            .chain(chain_id)?
            .oapp(oapp)?
            .peers
            .get(&eid)
            .copied()
            .unwrap_or_default())
    }

    fn vault_owned_by(&mut self, chain_id: u64, vault: Address, from: Address) -> Result<&mut Vault> {
        let vault = self.chain_mut(chain_id)?.vault_mut(vault)?;
        if vault.owner != Some(from) {
            return revert("OwnableUnauthorizedAccount");
        }
        Ok(vault)
    }

    pub fn set_max_lock_amount(
        &mut self,
        chain_id: u64,
        from: Address,
        vault: Address,
        amount: U256,
    ) -> Result<()> {
        self.vault_owned_by(chain_id, vault, from)?.max_lock_amount = amount;
        Ok(())
    }

    pub fn set_personal_limits(
        &mut self,
        chain_id: u64,
        from: Address,
        vault: Address,
        max_amount: U256,
        min_amount: U256,
    ) -> Result<()> {
        if min_amount > max_amount {
            return revert("InvalidLimits");
        }
        let vault = self.vault_owned_by(chain_id, vault, from)?;
        vault.personal_max = max_amount;
        vault.personal_min = min_amount;
        Ok(())
    }

    pub fn locked_of(&self, chain_id: u64, vault: Address, user: Address) -> Result<U256> {
        Ok(self.chain(chain_id)?.vault(vault)?.locked_of(user))
    }

    pub fn lock(&mut self, chain_id: u64, from: Address, vault_address: Address, amount: U256) -> Result<()> {
        let block_number = self.pending_block(chain_id)?;
        let chain = self.chain_mut(chain_id)?;
        let vault = chain.vault(vault_address)?;

        if amount.is_zero() {
            return revert("ZeroAmount");
        }
        if amount < vault.personal_min {
            return revert("BelowMinimum");
        }
        let locked = vault.locked_of(from);
        if locked.saturating_add(amount) > vault.personal_max {
            return revert("ExceedsPersonalLimit");
        }
        if vault.total_locked.saturating_add(amount) > vault.max_lock_amount {
            return revert("ExceedsGlobalLimit");
        }

        let token = vault.token;
        chain
            .token_mut(token)?
            .transfer_from(vault_address, from, vault_address, amount)?;

        let vault = chain.vault_mut(vault_address)?;
        vault.locked.insert(from, locked + amount);
        vault.total_locked += amount;

        self.emit(
            chain_id,
            vault_address,
            BridgeEvent::Lock {
                user: from,
                amount,
                block_number: U256::from(block_number),
            },
        );
        Ok(())
    }

    pub fn unlock(&mut self, chain_id: u64, from: Address, vault_address: Address, amount: U256) -> Result<()> {
        let block_number = self.pending_block(chain_id)?;
        let chain = self.chain_mut(chain_id)?;
        let vault = chain.vault(vault_address)?;

        if amount.is_zero() {
            return revert("ZeroAmount");
        }
        let locked = vault.locked_of(from);
        if locked < amount {
            return revert("InsufficientLocked");
        }

        let token = vault.token;
        chain
            .token_mut(token)?
            .transfer(vault_address, from, amount)?;

        let vault = chain.vault_mut(vault_address)?;
        vault.locked.insert(from, locked - amount);
        vault.total_locked -= amount;

        self.emit(
            chain_id,
            vault_address,
            BridgeEvent::Unlock {
                user: from,
                amount,
                block_number: U256::from(block_number),
            },
        );
        Ok(())
    }

    /// Sends the sender's locked tokens through the vault's adapter.
    pub fn bridge_locked(
        &mut self,
        chain_id: u64,
        from: Address,
        vault_address: Address,
        params: &SendParam,
        fee: MessagingFee,
    ) -> Result<()> {
        let chain = self.chain_mut(chain_id)?;
        let vault = chain.vault(vault_address)?;
        let amount = params.amount_ld();

        if amount.is_zero() {
            return revert("ZeroAmount");
        }
        let locked = vault.locked_of(from);
        if locked < amount {
            return revert("InsufficientLocked");
        }

        let (token, adapter) = (vault.token, vault.adapter);
        let rate = chain.oapp(adapter)?.rate;
        let amount = remove_dust(amount, rate);

        chain.token_mut(token)?.transfer(vault_address, adapter, amount)?;
        let vault = chain.vault_mut(vault_address)?;
        vault.locked.insert(from, locked - amount);
        vault.total_locked -= amount;

        self.oapp_send(chain_id, from, adapter, params, fee, fee.native_fee, from, true)
    }

    pub fn quote_send(
        &self,
        chain_id: u64,
        oapp: Address,
        params: &SendParam,
        pay_in_lz_token: bool,
    ) -> Result<MessagingFee> {
        if pay_in_lz_token {
            return revert("LzTokenUnavailable");
        }
        let peer = self.peer(chain_id, oapp, params.dst_eid())?;
        if peer.is_zero() {
            return revert("NoPeer");
        }
        Ok(MessagingFee::native(self.native_fee))
    }

    /// OApp `send`: debits the sender (or uses tokens already moved to the
    /// adapter when `prefunded`), charges the fee and delivers the message.
    #[allow(clippy::too_many_arguments)]
    pub fn oapp_send(
        &mut self,
        chain_id: u64,
        from: Address,
        oapp_address: Address,
        params: &SendParam,
        fee: MessagingFee,
        value: U256,
        refund_address: Address,
        prefunded: bool,
    ) -> Result<()> {
        let quoted = self.quote_send(chain_id, oapp_address, params, !fee.lz_token_fee.is_zero())?;
        if fee.native_fee < quoted.native_fee || value < fee.native_fee {
            return revert("InsufficientFee");
        }

        let chain = self.chain(chain_id)?;
        let oapp = chain.oapp(oapp_address)?.clone();
        let src_eid = chain
            .endpoints
            .get(&oapp.endpoint)
            .map(|endpoint| endpoint.eid)
            .ok_or_else(|| BridgeError::revert("InvalidEndpoint"))?;

        let amount_sent = remove_dust(params.amount_ld(), oapp.rate);
        if amount_sent < params.min_amount_ld() {
            return revert("SlippageExceeded");
        }

        let peer = bytes32_to_address(self.peer(chain_id, oapp_address, params.dst_eid())?);
        let dest_endpoint = chain
            .endpoints
            .get(&oapp.endpoint)
            .and_then(|endpoint| endpoint.dest_endpoints.get(&peer))
            .copied()
            .ok_or_else(|| BridgeError::revert("DestinationEndpointNotSet"))?;

        let (dest_chain_id, dest_eid) = self
            .chains
            .iter()
            .find_map(|(id, chain)| chain.endpoints.get(&dest_endpoint).map(|e| (*id, e.eid)))
            .ok_or_else(|| BridgeError::revert("DestinationEndpointNotSet"))?;
        if dest_eid != params.dst_eid() {
            return revert("InvalidDstEid");
        }

        let receiver = self
            .chain(dest_chain_id)?
            .oapps
            .get(&peer)
            .filter(|receiver| receiver.endpoint == dest_endpoint)
            .cloned()
            .ok_or_else(|| BridgeError::revert("InvalidReceiver"))?;
        if receiver.peers.get(&src_eid) != Some(&address_to_bytes32(oapp_address)) {
            return revert("OnlyPeer");
        }

        // source side
        let chain = self.chain_mut(chain_id)?;
        chain.debit_native(from, value)?;
        chain.credit_native(oapp.endpoint, fee.native_fee);
        chain.credit_native(refund_address, value - fee.native_fee);

        let token = chain.token_mut(oapp.token)?;
        if oapp.native {
            token.burn(from, amount_sent)?;
        } else if !prefunded {
            token.transfer_from(oapp_address, from, oapp_address, amount_sent)?;
        }

        // destination side
        let amount_sd = amount_sent / oapp.rate;
        let amount_received = amount_sd
            .checked_mul(receiver.rate)
            .ok_or_else(|| BridgeError::revert("AmountOverflow"))?;
        let recipient = params.recipient();
        let dest_token = self.chain_mut(dest_chain_id)?.token_mut(receiver.token)?;
        if receiver.native {
            dest_token.mint(recipient, amount_received);
        } else {
            dest_token.transfer(peer, recipient, amount_received)?;
        }

        let guid = self.next_id("guid");
        self.emit(
            chain_id,
            oapp_address,
            BridgeEvent::OftSent {
                guid,
                dst_eid: params.dst_eid(),
                from,
                amount_sent_ld: amount_sent,
                amount_received_ld: amount_sent,
            },
        );
        self.emit(
            dest_chain_id,
            peer,
            BridgeEvent::OftReceived {
                guid,
                src_eid,
                to: recipient,
                amount_received_ld: amount_received,
            },
        );
        Ok(())
    }
}
