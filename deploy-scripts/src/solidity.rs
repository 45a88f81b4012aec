//! Definitions of Solidity functions, events, and constructors used during deployment

#![allow(missing_docs, clippy::missing_docs_in_private_items, clippy::too_many_arguments)]

use alloy::sol;

sol! {
    #![sol(all_derives)]
    #[sol(rpc)]
    contract VRFCoordinatorV2Mock {
        constructor(uint96 _baseFee, uint96 _gasPriceLink);

        event SubscriptionCreated(uint64 indexed subId, address owner);
        event SubscriptionFunded(uint64 indexed subId, uint256 oldBalance, uint256 newBalance);
        event ConsumerAdded(uint64 indexed subId, address consumer);

        function createSubscription() external returns (uint64 _subId);
        function fundSubscription(uint64 _subId, uint96 _amount) public;
        function addConsumer(uint64 _subId, address _consumer) external;
        function getSubscription(uint64 _subId) external view returns (uint96 balance, uint64 reqCount, address owner, address[] memory consumers);
    }
}

sol! {
    #![sol(all_derives)]
    contract MockV3Aggregator {
        constructor(uint8 _decimals, int256 _initialAnswer);
    }
}

sol! {
    #![sol(all_derives)]
    #[sol(rpc)]
    interface AggregatorV3Interface {
        function decimals() external view returns (uint8);
        function latestRoundData() external view returns (uint80 roundId, int256 answer, uint256 startedAt, uint256 updatedAt, uint80 answeredInRound);
    }
}

sol! {
    #![sol(all_derives)]
    contract RandomIpfsNft {
        constructor(address vrfCoordinatorV2, uint64 subscriptionId, bytes32 gasLane, uint32 callbackGasLimit, string[3] memory dogTokenUris, uint256 mintFee);
    }
}

sol! {
    #![sol(all_derives)]
    contract DynamicSvgNft {
        constructor(address priceFeedAddress, string memory lowSvg, string memory highSvg);
    }
}
