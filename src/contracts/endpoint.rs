use alloy_network::Ethereum;
use alloy_primitives::Address;
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use tracing::info;

use super::abi::EndpointV2Mock::EndpointV2MockInstance;

/// Mock messaging endpoint used on local networks
///
/// Mock endpoints deliver messages in-process; each one has to be told which
/// endpoint serves a given destination OApp.
pub struct EndpointMockContract<P: Provider<Ethereum>> {
    instance: EndpointV2MockInstance<P>,
}

impl<P: Provider<Ethereum>> EndpointMockContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            instance: EndpointV2MockInstance::new(address, provider),
        }
    }

    /// Routes messages for `dest_oapp` to `dest_endpoint`.
    pub fn set_dest_lz_endpoint_transaction(
        &self,
        from: Address,
        dest_oapp: Address,
        dest_endpoint: Address,
    ) -> TransactionRequest {
        info!(
            from = %from,
            dest_oapp = %dest_oapp,
            dest_endpoint = %dest_endpoint,
            contract_address = %self.instance.address(),
            event = "set_dest_lz_endpoint_transaction_created"
        );
        self.instance
            .setDestLzEndpoint(dest_oapp, dest_endpoint)
            .from(from)
            .into_transaction_request()
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}
