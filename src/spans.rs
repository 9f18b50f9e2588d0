//! OpenTelemetry-style span helpers for bridge operations
//!
//! Static span names with structured attributes, kept apart from business
//! logic. Tasks open these around each on-chain step; client methods nest
//! their own `#[instrument]` spans underneath.
//!
//! # Example
//!
//! ```rust,no_run
//! use lockbridge::spans;
//! use alloy_chains::Chain;
//! use alloy_primitives::{Address, U256};
//!
//! let span = spans::lock(&Chain::from_id(11155111), &Address::ZERO, &Address::ZERO, &U256::from(50));
//! let _guard = span.enter();
//! // submit the lock transaction here
//! ```

use alloy_chains::Chain;
use alloy_primitives::{Address, TxHash, U256};
use tracing::Span;

/// Create span for locking tokens in the vault.
///
/// Parent: Task span
/// Children: approve and lock transactions
#[inline]
pub fn lock(chain: &Chain, vault: &Address, user: &Address, amount: &U256) -> Span {
    tracing::info_span!(
        "lockbridge.lock",
        chain = %chain,
        vault = %vault,
        user = %user,
        amount = %amount,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for unlocking tokens from the vault.
#[inline]
pub fn unlock(chain: &Chain, vault: &Address, user: &Address, amount: &U256) -> Span {
    tracing::info_span!(
        "lockbridge.unlock",
        chain = %chain,
        vault = %vault,
        user = %user,
        amount = %amount,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for a cross-chain send (direct OFT send or vault bridge).
///
/// Parent: Task span
/// Children: quote, approve and send transactions
#[inline]
pub fn bridge(chain: &Chain, oapp: &Address, dst_eid: u32, amount: &U256, execute: bool) -> Span {
    tracing::info_span!(
        "lockbridge.bridge",
        chain = %chain,
        oapp = %oapp,
        dst_eid = dst_eid,
        amount = %amount,
        execute = execute,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for a deployment sequence.
#[inline]
pub fn deploy(chain: &Chain, network: &str, role: &str) -> Span {
    tracing::info_span!(
        "lockbridge.deploy",
        chain = %chain,
        network = network,
        role = role,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for an administrative call (limits, peers).
#[inline]
pub fn admin(chain: &Chain, contract: &Address, operation: &'static str) -> Span {
    tracing::info_span!(
        "lockbridge.admin",
        chain = %chain,
        contract = %contract,
        operation = operation,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for a seeding run.
#[inline]
pub fn seed(chain: &Chain, network: &str, users: usize) -> Span {
    tracing::info_span!(
        "lockbridge.seed",
        chain = %chain,
        network = network,
        users = users,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for indexing vault events.
#[inline]
pub fn index(chain: &Chain, from_block: u64, contracts: usize) -> Span {
    tracing::info_span!(
        "lockbridge.index",
        chain = %chain,
        from_block = from_block,
        contracts = contracts,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for waiting on a transaction receipt.
///
/// Parent: Operation span
/// Children: Provider RPC calls (polling)
#[inline]
pub fn wait_for_receipt(tx_hash: TxHash, chain: &Chain) -> Span {
    tracing::debug_span!(
        "lockbridge.wait_for_receipt",
        tx_hash = %tx_hash,
        chain = %chain,
    )
}

/// Record error attributes on the current span.
///
/// Follows OpenTelemetry semantic conventions for error tracking:
/// - error.type: The error type/variant
/// - error.message: Human-readable error message
/// - error.source: Underlying cause, when there is one
///
/// # Example
///
/// ```rust,no_run
/// use lockbridge::spans;
/// use lockbridge::BridgeError;
///
/// # fn example() -> Result<(), BridgeError> {
/// let span = tracing::info_span!("lockbridge.operation");
/// let _guard = span.enter();
///
/// let result = some_operation();
/// if let Err(ref e) = result {
///     spans::record_error(e);
/// }
/// result
/// # }
/// # fn some_operation() -> Result<(), BridgeError> { Ok(()) }
/// ```
pub fn record_error<E: std::error::Error>(error: &E) {
    let current_span = tracing::Span::current();
    let message = error.to_string();
    current_span.record("error.type", message.split(':').next().unwrap_or("Unknown"));
    current_span.record("error.message", message.as_str());
    current_span.record("otel.status_code", "ERROR");

    if let Some(source) = error.source() {
        current_span.record("error.source", source.to_string());
    }
}
