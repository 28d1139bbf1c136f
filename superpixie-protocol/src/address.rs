//! Reserved chain addresses
//!
//! Nodes are numbered from the chain head (0) outwards. The top of the
//! address space is reserved for sentinels and is never assigned to a node.

/// Address of the first node in the chain
pub const ADDRESS_CHAIN_HEAD: u8 = 0;

/// Address used by the commander (host) as origin and as reply destination
pub const ADDRESS_COMMANDER: u8 = 253;

/// "No address yet": unassigned nodes, unstamped first-hop fields
pub const ADDRESS_NULL: u8 = 254;

/// Every node executes packets sent to this address
pub const ADDRESS_BROADCAST: u8 = 255;

/// Highest address that can be given to a node
pub const MAX_NODE_ADDRESS: u8 = ADDRESS_COMMANDER - 1;

/// Check whether an address may be held by a node
pub const fn is_node_address(address: u8) -> bool {
    address <= MAX_NODE_ADDRESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_not_node_addresses() {
        assert!(!is_node_address(ADDRESS_COMMANDER));
        assert!(!is_node_address(ADDRESS_NULL));
        assert!(!is_node_address(ADDRESS_BROADCAST));
        assert!(is_node_address(ADDRESS_CHAIN_HEAD));
        assert!(is_node_address(252));
    }
}
