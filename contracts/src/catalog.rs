//! Function signatures of the contracts the client calls.

use creditnet_client::config::{CURRENCY_NETWORK_CONTRACT, SHIELD_CONTRACT};

/// A contract name and the signatures of its callable functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractInterface {
    /// Contract name as used in [`creditnet_client::ContractCall`].
    pub name: &'static str,
    /// Solidity signatures, e.g. `transfer(address,uint64,uint64,address[])`.
    pub functions: &'static [&'static str],
}

impl ContractInterface {
    /// Signature of `function`, if the contract has it.
    pub fn signature(&self, function: &str) -> Option<&'static str> {
        self.functions.iter().copied().find(|sig| {
            sig.split_once('(')
                .is_some_and(|(name, _)| name == function)
        })
    }
}

/// A trustline currency network.
pub const CURRENCY_NETWORK: ContractInterface = ContractInterface {
    name: CURRENCY_NETWORK_CONTRACT,
    functions: &[
        "transfer(address,uint64,uint64,address[])",
        "transferReceiverPays(address,uint64,uint64,address[])",
        "closeTrustlineByTriangularTransfer(address,uint64,address[])",
    ],
};

/// The Groth16-verifying shield of a currency network.
pub const CURRENCY_NETWORK_SHIELD: ContractInterface = ContractInterface {
    name: SHIELD_CONTRACT,
    functions: &[
        "mint(uint256[],uint256[],uint256,bytes32,address[])",
        "transfer(uint256[],uint256[],bytes32,bytes32,bytes32,bytes32,bytes32)",
        "burn(uint256[],uint256[],bytes32,bytes32,uint256,address[])",
        "registerVerificationKey(uint256[],uint8)",
    ],
};

/// Every interface the default encoder knows.
pub const ALL: &[ContractInterface] = &[CURRENCY_NETWORK, CURRENCY_NETWORK_SHIELD];
