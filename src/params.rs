use std::fmt;

use alloy_primitives::{Address, Bytes, B256, U256};
use bon::Builder;

/// Parameters for sending tokens to a remote chain
///
/// Mirrors the `SendParam` tuple taken by `quoteSend` / `send`:
/// destination endpoint id, recipient as `bytes32`, amount, minimum acceptable
/// amount, executor options and two reserved byte fields.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct SendParam {
    dst_eid: u32,
    to: B256,
    amount_ld: U256,
    min_amount_ld: U256,
    #[builder(default, into)]
    extra_options: Bytes,
    #[builder(default, into)]
    compose_msg: Bytes,
    #[builder(default, into)]
    oft_cmd: Bytes,
}

impl SendParam {
    /// Send `amount_ld` to `recipient` on `dst_eid` with no slippage allowance.
    pub fn exact(dst_eid: u32, recipient: Address, amount_ld: U256) -> Self {
        Self::builder()
            .dst_eid(dst_eid)
            .to(address_to_bytes32(recipient))
            .amount_ld(amount_ld)
            .min_amount_ld(amount_ld)
            .build()
    }

    pub fn dst_eid(&self) -> u32 {
        self.dst_eid
    }

    pub fn to(&self) -> B256 {
        self.to
    }

    /// Recipient decoded from the `bytes32` field.
    pub fn recipient(&self) -> Address {
        bytes32_to_address(self.to)
    }

    pub fn amount_ld(&self) -> U256 {
        self.amount_ld
    }

    pub fn min_amount_ld(&self) -> U256 {
        self.min_amount_ld
    }

    pub fn extra_options(&self) -> &Bytes {
        &self.extra_options
    }

    pub fn compose_msg(&self) -> &Bytes {
        &self.compose_msg
    }

    pub fn oft_cmd(&self) -> &Bytes {
        &self.oft_cmd
    }
}

/// Fee quoted for a send, paid in native gas token and/or the protocol token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessagingFee {
    pub native_fee: U256,
    pub lz_token_fee: U256,
}

impl MessagingFee {
    pub fn native(native_fee: U256) -> Self {
        Self {
            native_fee,
            lz_token_fee: U256::ZERO,
        }
    }
}

impl fmt::Display for MessagingFee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nativeFee={} lzTokenFee={}",
            self.native_fee, self.lz_token_fee
        )
    }
}

/// Left-pads an address to 32 bytes (`zeroPad(address, 32)`).
pub fn address_to_bytes32(address: Address) -> B256 {
    address.into_word()
}

/// Takes the low 20 bytes of a `bytes32` peer or recipient.
pub fn bytes32_to_address(word: B256) -> Address {
    Address::from_word(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};

    #[test]
    fn test_send_param_builder() {
        let params = SendParam::builder()
            .dst_eid(2)
            .to(B256::ZERO)
            .amount_ld(U256::from(1000))
            .min_amount_ld(U256::from(950))
            .extra_options(bytes!("0003"))
            .build();

        assert_eq!(params.dst_eid(), 2);
        assert_eq!(params.amount_ld(), U256::from(1000));
        assert_eq!(params.min_amount_ld(), U256::from(950));
        assert_eq!(params.extra_options(), &bytes!("0003"));
        assert!(params.compose_msg().is_empty());
        assert!(params.oft_cmd().is_empty());
    }

    #[test]
    fn test_exact_send_param() {
        let recipient = address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d");
        let params = SendParam::exact(40161, recipient, U256::from(7));

        assert_eq!(params.recipient(), recipient);
        assert_eq!(params.amount_ld(), params.min_amount_ld());
        assert_eq!(&params.to()[..12], &[0u8; 12]);
    }

    #[test]
    fn test_address_bytes32_round_trip() {
        let addr = address!("1234567890123456789012345678901234567890");
        assert_eq!(bytes32_to_address(address_to_bytes32(addr)), addr);
    }

    #[test]
    fn test_messaging_fee_display() {
        let fee = MessagingFee::native(U256::from(10));
        assert_eq!(fee.to_string(), "nativeFee=10 lzTokenFee=0");
    }
}
