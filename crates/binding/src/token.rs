//! ERC20 token contract bindings.

use alloy_sol_types::sol;

sol! {
    /// The subset of the ERC20 interface used to fund an inbox deposit
    #[sol(rpc)]
    interface IERC20 {
        /// Get allowance granted by owner to spender
        function allowance(address owner, address spender) external view returns (uint256);

        /// Approve spender to spend tokens
        function approve(address spender, uint256 amount) external returns (bool);

        /// Get token decimals
        function decimals() external view returns (uint8);
    }
}
