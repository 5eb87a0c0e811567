//! Definitions of Solidity functions called during deployment

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IRewardToken {
        function mint(address to, uint256 amount) external;
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }

    interface IMiningPool {
        function add(uint256 allocPoint, address lpToken, bool withUpdate) external;
    }

    interface IMiningPoolV2 {
        function addBatch(
            uint256 startBlock,
            uint256 endBlock,
            uint256 rewardPerBlock,
            address rewardHolder,
            address remainderRecipient
        ) external;
        function addPool(uint256 batch, address lpToken, uint256 weight) external;
    }

    interface ITokenLock {
        function release() external;
    }
}
