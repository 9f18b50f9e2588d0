//! Executor options attached to outbound messages
//!
//! Messages carry a type-3 options blob telling the destination executor how
//! much gas (and native value) to use when delivering. Layout:
//!
//! ```text
//! 0x0003 | worker_id (u8) | size (u16) | option_type (u8) | payload
//! ```
//!
//! where `size` covers `option_type` plus the payload, and an `lzReceive`
//! payload is `gas (u128)` optionally followed by `value (u128)`.

use alloy_primitives::{hex, Bytes};

const OPTIONS_TYPE_3: u16 = 3;
const EXECUTOR_WORKER_ID: u8 = 1;
const OPTION_TYPE_LZRECEIVE: u8 = 1;

/// Gas reserved for `lzReceive` by the CLI tasks.
pub const DEFAULT_LZ_RECEIVE_GAS: u128 = 200_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecutorOption {
    LzReceive { gas: u128, value: u128 },
}

impl ExecutorOption {
    fn option_type(&self) -> u8 {
        match self {
            Self::LzReceive { .. } => OPTION_TYPE_LZRECEIVE,
        }
    }

    fn payload(&self) -> Vec<u8> {
        match self {
            Self::LzReceive { gas, value } => {
                let mut payload = gas.to_be_bytes().to_vec();
                if *value > 0 {
                    payload.extend_from_slice(&value.to_be_bytes());
                }
                payload
            }
        }
    }
}

/// Builder for type-3 executor options.
///
/// # Example
///
/// ```rust
/// use lockbridge::options::ExecutorOptions;
///
/// let options = ExecutorOptions::new().add_executor_lz_receive_option(200_000, 0);
/// assert_eq!(
///     options.to_hex(),
///     "0x00030100110100000000000000000000000000030d40"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorOptions {
    options: Vec<ExecutorOption>,
}

impl ExecutorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with a single `lzReceive` gas allowance.
    pub fn lz_receive(gas: u128) -> Self {
        Self::new().add_executor_lz_receive_option(gas, 0)
    }

    pub fn add_executor_lz_receive_option(mut self, gas: u128, value: u128) -> Self {
        self.options.push(ExecutorOption::LzReceive { gas, value });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut out = OPTIONS_TYPE_3.to_be_bytes().to_vec();
        for option in &self.options {
            let payload = option.payload();
            out.push(EXECUTOR_WORKER_ID);
            out.extend_from_slice(&((payload.len() + 1) as u16).to_be_bytes());
            out.push(option.option_type());
            out.extend_from_slice(&payload);
        }
        Bytes::from(out)
    }

    pub fn to_hex(&self) -> String {
        hex::encode_prefixed(self.to_bytes())
    }
}

impl From<ExecutorOptions> for Bytes {
    fn from(options: ExecutorOptions) -> Self {
        options.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_is_type_header_only() {
        let options = ExecutorOptions::new();
        assert!(options.is_empty());
        assert_eq!(options.to_hex(), "0x0003");
    }

    #[test]
    fn test_lz_receive_gas_only() {
        let options = ExecutorOptions::lz_receive(60_000);
        assert_eq!(
            options.to_hex(),
            "0x0003010011010000000000000000000000000000ea60"
        );
    }

    #[test]
    fn test_lz_receive_with_value() {
        let bytes = ExecutorOptions::new()
            .add_executor_lz_receive_option(200_000, 1)
            .to_bytes();

        assert_eq!(bytes.len(), 2 + 1 + 2 + 1 + 32);
        // size field covers option type + gas + value
        assert_eq!(&bytes[3..5], &[0x00, 0x21]);
        assert_eq!(bytes[bytes.len() - 1], 1);
    }

    #[test]
    fn test_multiple_options_are_concatenated() {
        let single = ExecutorOptions::lz_receive(1).to_bytes();
        let double = ExecutorOptions::lz_receive(1)
            .add_executor_lz_receive_option(1, 0)
            .to_bytes();
        assert_eq!(double.len(), single.len() * 2 - 2);
    }
}
