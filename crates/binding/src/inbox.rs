//! Arbitrum Orbit inbox bindings.
//!
//! The parent chain inbox is the entry point for deposits into an Orbit chain.
//! Chains that use ETH as their gas currency expose `depositEth`, chains backed
//! by an ERC20 native token expose `depositERC20` instead.

use alloy_sol_types::sol;

sol! {
    /// Inbox of an Orbit chain whose gas currency is ETH
    #[sol(rpc)]
    interface IInbox {
        /// Deposit `msg.value` to the sender's address on the child chain
        function depositEth() external payable;
    }

    /// Inbox of an Orbit chain whose gas currency is an ERC20 token
    #[sol(rpc)]
    interface IERC20Inbox {
        /// Pull `amount` native tokens from the sender and credit them on the child chain.
        /// Returns the message number of the deposit.
        function depositERC20(uint256 amount) external returns (uint256);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::keccak256;
    use alloy_sol_types::SolCall;

    #[test]
    fn test_deposit_eth_selector() {
        let expected = &keccak256("depositEth()")[..4];
        assert_eq!(IInbox::depositEthCall::SELECTOR.as_slice(), expected);
    }

    #[test]
    fn test_deposit_erc20_selector() {
        let expected = &keccak256("depositERC20(uint256)")[..4];
        assert_eq!(IERC20Inbox::depositERC20Call::SELECTOR.as_slice(), expected);
    }
}
