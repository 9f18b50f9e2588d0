//! Solidity interfaces of the bridge contracts
//!
//! Only the functions and events the tooling touches are declared. Contracts
//! that are deployed by the tooling also declare their constructor so the
//! creation code can be ABI-encoded.

use alloy_sol_types::sol;

use crate::params;

sol!(
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct SendParam {
        uint32 dstEid;
        bytes32 to;
        uint256 amountLD;
        uint256 minAmountLD;
        bytes extraOptions;
        bytes composeMsg;
        bytes oftCmd;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct MessagingFee {
        uint256 nativeFee;
        uint256 lzTokenFee;
    }

    #[allow(missing_docs)]
    struct MessagingReceipt {
        bytes32 guid;
        uint64 nonce;
        MessagingFee fee;
    }

    #[allow(missing_docs)]
    struct OFTReceipt {
        uint256 amountSentLD;
        uint256 amountReceivedLD;
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    contract DogecoinMock {
        constructor();
        function mint(address to, uint256 amount) external;
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    contract DogeLock {
        constructor(address token, address adapter);
        function initialize(address owner) external;
        function lock(uint256 amount) external;
        function unlock(uint256 amount) external;
        function bridge(SendParam calldata sendParam, MessagingFee calldata fee) external payable;
        function setMaxLockAmount(uint256 amount) external;
        function setPersonalLimits(uint256 maxAmount, uint256 minAmount) external;
        function lockedOf(address user) external view returns (uint256);
        function totalLocked() external view returns (uint256);

        event Lock(address indexed user, uint256 amount, uint256 blockNumber);
        event Unlock(address indexed user, uint256 amount, uint256 blockNumber);
        event OFTSent(bytes32 indexed guid, uint32 dstEid, address indexed fromAddress, uint256 amountSentLD, uint256 amountReceivedLD);
        event OFTReceived(bytes32 indexed guid, uint32 srcEid, address indexed toAddress, uint256 amountReceivedLD);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    contract Oft {
        function initialize(address owner) external;
        function quoteSend(SendParam calldata sendParam, bool payInLzToken) external view returns (MessagingFee memory fee);
        function send(SendParam calldata sendParam, MessagingFee calldata fee, address refundAddress) external payable returns (MessagingReceipt memory msgReceipt, OFTReceipt memory oftReceipt);
        function setPeer(uint32 eid, bytes32 peer) external;
        function peers(uint32 eid) external view returns (bytes32);
        function balanceOf(address account) external view returns (uint256);
    }

    #[allow(missing_docs)]
    contract DogeForGoat {
        constructor(address token, address endpoint);
    }

    #[allow(missing_docs)]
    contract GoatOft {
        constructor(string name, string symbol, address endpoint, address delegate);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    contract EndpointV2Mock {
        constructor(uint32 eid);
        function setDestLzEndpoint(address destAddr, address lzEndpointAddr) external;
    }
);

impl From<&params::SendParam> for SendParam {
    fn from(param: &params::SendParam) -> Self {
        Self {
            dstEid: param.dst_eid(),
            to: param.to(),
            amountLD: param.amount_ld(),
            minAmountLD: param.min_amount_ld(),
            extraOptions: param.extra_options().clone(),
            composeMsg: param.compose_msg().clone(),
            oftCmd: param.oft_cmd().clone(),
        }
    }
}

impl From<params::MessagingFee> for MessagingFee {
    fn from(fee: params::MessagingFee) -> Self {
        Self {
            nativeFee: fee.native_fee,
            lzTokenFee: fee.lz_token_fee,
        }
    }
}

impl From<MessagingFee> for params::MessagingFee {
    fn from(fee: MessagingFee) -> Self {
        Self {
            native_fee: fee.nativeFee,
            lz_token_fee: fee.lzTokenFee,
        }
    }
}
