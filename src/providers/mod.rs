//! Production implementation of the [`BridgeClient`](crate::BridgeClient) trait.
//!
//! [`AlloyClient`] talks to a real node through an Alloy provider with a
//! signing wallet. Test code uses [`SimulatedClient`](crate::testing::SimulatedClient)
//! instead.

mod alloy;

pub use self::alloy::AlloyClient;
